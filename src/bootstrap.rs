//! The grammar of grammar specifications, built against the engine before
//! any specification is read.
//!
//! ```text
//! rules ::= rule+
//! rule  ::= lhs "::=" rhs
//!         | lhs "::=" rhs CODE
//!         | lhs "~" STRING
//! lhs   ::= NAME
//! rhs   ::= names
//!         | NAME MIN
//!         | "null"
//!         | NAME MIN NAME
//! names ::= NAME+
//! ```

use log::debug;

use crate::engine::{Grammar, PrecomputeError, RuleId, SymbolId, ValuedRules};
use crate::lexer::Tok;

#[derive(Copy, Clone, Debug)]
pub struct MetaSymbols {
    pub rules: SymbolId,
    pub rule: SymbolId,
    pub lhs: SymbolId,
    pub rhs: SymbolId,
    pub names: SymbolId,

    pub bnfop: SymbolId,
    pub name: SymbolId,
    pub min: SymbolId,
    pub null: SymbolId,
    pub code: SymbolId,
    pub strop: SymbolId,
    pub string: SymbolId,
}

impl MetaSymbols {
    fn new(g: &mut Grammar) -> Self {
        MetaSymbols {
            rules: g.new_symbol(),
            rule: g.new_symbol(),
            lhs: g.new_symbol(),
            rhs: g.new_symbol(),
            names: g.new_symbol(),
            bnfop: g.new_symbol(),
            name: g.new_symbol(),
            min: g.new_symbol(),
            null: g.new_symbol(),
            code: g.new_symbol(),
            strop: g.new_symbol(),
            string: g.new_symbol(),
        }
    }

    /// The terminal a token is read as.
    pub fn terminal(&self, tok: &Tok<'_>) -> SymbolId {
        match tok {
            Tok::BnfOp => self.bnfop,
            Tok::Null => self.null,
            Tok::Min(_) => self.min,
            Tok::StrOp => self.strop,
            Tok::Name(_) => self.name,
            Tok::Str(_) => self.string,
            Tok::Code(_) => self.code,
        }
    }
}

/// One field per alternative of the grammar above, named after its shape.
#[derive(Copy, Clone, Debug)]
pub struct MetaRules {
    pub rules: RuleId,
    pub rule: RuleId,
    pub rule_with_code: RuleId,
    pub token_rule: RuleId,
    pub lhs: RuleId,
    pub rhs_names: RuleId,
    pub rhs_sequence: RuleId,
    pub rhs_null: RuleId,
    pub rhs_separated: RuleId,
    pub names: RuleId,
}

impl MetaRules {
    fn new(g: &mut Grammar, s: &MetaSymbols) -> Self {
        MetaRules {
            rules: g.new_sequence(s.rules, s.rule, None, 1),
            rule: g.add_rule(s.rule, &[s.lhs, s.bnfop, s.rhs]),
            rule_with_code: g.add_rule(s.rule, &[s.lhs, s.bnfop, s.rhs, s.code]),
            token_rule: g.add_rule(s.rule, &[s.lhs, s.strop, s.string]),
            lhs: g.add_rule(s.lhs, &[s.name]),
            rhs_names: g.add_rule(s.rhs, &[s.names]),
            rhs_sequence: g.add_rule(s.rhs, &[s.name, s.min]),
            rhs_null: g.add_rule(s.rhs, &[s.null]),
            rhs_separated: g.add_rule(s.rhs, &[s.name, s.min, s.name]),
            names: g.new_sequence(s.names, s.name, None, 1),
        }
    }
}

#[derive(Debug)]
pub struct MetaGrammar {
    pub grammar: Grammar,
    pub symbols: MetaSymbols,
    pub rules: MetaRules,
}

impl MetaGrammar {
    /// Builds and precomputes the grammar, with `rules` as the start symbol.
    pub fn new() -> Result<Self, PrecomputeError> {
        let mut grammar = Grammar::new();
        let symbols = MetaSymbols::new(&mut grammar);
        let rules = MetaRules::new(&mut grammar, &symbols);
        grammar.start_symbol(symbols.rules);
        grammar.precompute()?;
        debug!("meta grammar ready: {} rules", grammar.rule_count());
        Ok(MetaGrammar { grammar, symbols, rules })
    }

    pub fn valued_rules(&self) -> ValuedRules { self.grammar.valued_rules() }
}
