use linear_map::LinearMap;
use log::debug;
use thiserror::Error;

use super::forest::ValuedRules;
use super::{RuleId, SymbolId};

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) enum Shape {
    Fixed(Vec<SymbolId>),
    Sequence { item: SymbolId, separator: Option<SymbolId>, min: u8 },
}

#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct RuleData {
    pub(crate) lhs: SymbolId,
    pub(crate) shape: Shape,
}

impl RuleData {
    fn rhs_symbols(&self) -> Vec<SymbolId> {
        match &self.shape {
            Shape::Fixed(rhs) => rhs.clone(),
            Shape::Sequence { item, separator, .. } => {
                std::iter::once(*item).chain(*separator).collect()
            }
        }
    }

    /// The symbol an item of this rule with the given dot is waiting on.
    /// A sequence is always waiting on something: either its next item or,
    /// after an item, the separator.
    pub(crate) fn expected(&self, dot: usize) -> Option<SymbolId> {
        match &self.shape {
            Shape::Fixed(rhs) => rhs.get(dot).copied(),
            Shape::Sequence { separator: Some(sep), .. } if dot % 2 == 1 => Some(*sep),
            Shape::Sequence { item, .. } => Some(*item),
        }
    }

    pub(crate) fn completes(&self, dot: usize) -> bool {
        match &self.shape {
            Shape::Fixed(rhs) => dot == rhs.len(),
            Shape::Sequence { separator, min, .. } => {
                let items = match separator {
                    // no trailing separators
                    Some(_) if dot > 0 && dot % 2 == 0 => return false,
                    Some(_) => (dot + 1) / 2,
                    None => dot,
                };
                items >= usize::from(*min)
            }
        }
    }

    /// Separators are matched but their values are discarded.
    pub(crate) fn is_separator(&self, dot: usize) -> bool {
        matches!(self.shape, Shape::Sequence { separator: Some(_), .. } if dot % 2 == 1)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ErrorCode {
    NoRules,
    NoStartSymbol,
    StartNotLhs,
    InvalidSymbolId,
    InvalidMinimum,
    DuplicateRule,
    SequenceLhsNotUnique,
    CountedNullable,
    UnproductiveStart,
    CycleDetected,
    NotPrecomputed,
    TokenIsNotTerminal,
    InvalidTokenLength,
    UnexpectedToken,
    NoParse,
}

const MESSAGES: &[(ErrorCode, &str)] = &[
    (ErrorCode::NoRules, "grammar has no rules"),
    (ErrorCode::NoStartSymbol, "no start symbol"),
    (ErrorCode::StartNotLhs, "start symbol not on LHS of any rule"),
    (ErrorCode::InvalidSymbolId, "symbol ID is invalid"),
    (ErrorCode::InvalidMinimum, "sequence minimum must be 0 or 1"),
    (ErrorCode::DuplicateRule, "duplicate rule"),
    (ErrorCode::SequenceLhsNotUnique, "LHS of sequence rule would not be unique"),
    (ErrorCode::CountedNullable, "nullable symbol on RHS of a sequence rule"),
    (ErrorCode::UnproductiveStart, "unproductive start symbol"),
    (ErrorCode::CycleDetected, "grammar contains a cycle"),
    (ErrorCode::NotPrecomputed, "grammar not precomputed"),
    (ErrorCode::TokenIsNotTerminal, "token symbol is not a terminal"),
    (ErrorCode::InvalidTokenLength, "token length must be 1"),
    (ErrorCode::UnexpectedToken, "unexpected token"),
    (ErrorCode::NoParse, "no parse"),
];

/// Human readable text for every [`ErrorCode`]. Each grammar owns one, so a
/// caller that wants different wording hands its own table to
/// [`Grammar::with_errors`].
#[derive(Clone, Debug)]
pub struct ErrorTable(LinearMap<ErrorCode, &'static str>);

impl Default for ErrorTable {
    fn default() -> Self {
        let mut map = LinearMap::with_capacity(MESSAGES.len());
        for &(code, message) in MESSAGES {
            map.insert(code, message);
        }
        ErrorTable(map)
    }
}

impl ErrorTable {
    pub fn message(&self, code: ErrorCode) -> &'static str {
        self.0.get(&code).copied().unwrap_or("unknown error")
    }

    pub fn with_message(mut self, code: ErrorCode, message: &'static str) -> Self {
        self.0.insert(code, message);
        self
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("precompute() failed: {message}")]
pub struct PrecomputeError {
    pub code: ErrorCode,
    pub message: &'static str,
}

/// Facts about a precomputed grammar that recognition depends on. Indexed by
/// symbol id.
#[derive(Debug)]
pub(crate) struct Analysis {
    pub(crate) start: SymbolId,
    pub(crate) nullable: Vec<bool>,
    pub(crate) terminal: Vec<bool>,
    pub(crate) rules_by_lhs: Vec<Vec<RuleId>>,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
enum Changed { Changed, Unchanged }

#[derive(Debug)]
pub struct Grammar {
    symbol_count: usize,
    rules: Vec<RuleData>,
    start: Option<SymbolId>,
    errors: ErrorTable,
    /// First problem seen while rules were being created; reported by
    /// `precompute`.
    construction_error: Option<ErrorCode>,
    error: Option<ErrorCode>,
    analysis: Option<Analysis>,
}

impl Default for Grammar {
    fn default() -> Self { Grammar::new() }
}

impl Grammar {
    pub fn new() -> Self { Grammar::with_errors(ErrorTable::default()) }

    pub fn with_errors(errors: ErrorTable) -> Self {
        Grammar {
            symbol_count: 0,
            rules: Vec::new(),
            start: None,
            errors,
            construction_error: None,
            error: None,
            analysis: None,
        }
    }

    pub fn new_symbol(&mut self) -> SymbolId {
        self.analysis = None;
        let id = SymbolId(self.symbol_count);
        self.symbol_count += 1;
        id
    }

    pub fn add_rule(&mut self, lhs: SymbolId, rhs: &[SymbolId]) -> RuleId {
        self.push_rule(RuleData { lhs, shape: Shape::Fixed(rhs.to_vec()) })
    }

    /// `lhs ::= item{min,}`, with `separator` between consecutive items.
    pub fn new_sequence(&mut self, lhs: SymbolId, item: SymbolId, separator: Option<SymbolId>, min: u8) -> RuleId {
        if min > 1 {
            self.note(ErrorCode::InvalidMinimum);
        }
        self.push_rule(RuleData { lhs, shape: Shape::Sequence { item, separator, min } })
    }

    fn push_rule(&mut self, data: RuleData) -> RuleId {
        self.analysis = None;
        let count = self.symbol_count;
        if data.lhs.0 >= count || data.rhs_symbols().iter().any(|s| s.0 >= count) {
            self.note(ErrorCode::InvalidSymbolId);
        }
        if self.rules.contains(&data) {
            self.note(ErrorCode::DuplicateRule);
        }
        let id = RuleId(self.rules.len());
        self.rules.push(data);
        id
    }

    fn note(&mut self, code: ErrorCode) {
        self.error = Some(code);
        self.construction_error.get_or_insert(code);
    }

    pub fn start_symbol(&mut self, symbol: SymbolId) {
        self.analysis = None;
        self.start = Some(symbol);
    }

    pub fn get_start_symbol(&self) -> Option<SymbolId> { self.start }

    pub fn symbol_count(&self) -> usize { self.symbol_count }

    pub fn rule_count(&self) -> usize { self.rules.len() }

    pub fn rule_lhs(&self, rule: RuleId) -> Option<SymbolId> {
        self.rules.get(rule.0).map(|r| r.lhs)
    }

    /// The most recent error, if the last fallible operation failed.
    pub fn error(&self) -> Option<ErrorCode> { self.error }

    pub fn errors(&self) -> &ErrorTable { &self.errors }

    pub fn is_precomputed(&self) -> bool { self.analysis.is_some() }

    /// Every rule of this grammar marked as producing RULE steps.
    pub fn valued_rules(&self) -> ValuedRules {
        ValuedRules::all(self.rules.len())
    }

    pub(crate) fn rule(&self, rule: RuleId) -> &RuleData {
        &self.rules[rule.0]
    }

    pub(crate) fn analysis(&self) -> Option<&Analysis> {
        self.analysis.as_ref()
    }

    pub fn precompute(&mut self) -> Result<(), PrecomputeError> {
        match self.analyze() {
            Ok(analysis) => {
                debug!("precomputed grammar: {} symbols, {} rules", self.symbol_count, self.rules.len());
                self.analysis = Some(analysis);
                self.error = None;
                Ok(())
            }
            Err(code) => {
                self.error = Some(code);
                Err(PrecomputeError { code, message: self.errors.message(code) })
            }
        }
    }

    fn analyze(&self) -> Result<Analysis, ErrorCode> {
        if let Some(code) = self.construction_error {
            return Err(code);
        }
        if self.rules.is_empty() {
            return Err(ErrorCode::NoRules);
        }
        let start = self.start.ok_or(ErrorCode::NoStartSymbol)?;
        if start.0 >= self.symbol_count {
            return Err(ErrorCode::InvalidSymbolId);
        }

        let mut rules_by_lhs = vec![Vec::new(); self.symbol_count];
        for (i, rule) in self.rules.iter().enumerate() {
            rules_by_lhs[rule.lhs.0].push(RuleId(i));
        }
        if rules_by_lhs[start.0].is_empty() {
            return Err(ErrorCode::StartNotLhs);
        }
        for rule in &self.rules {
            if let Shape::Sequence { .. } = rule.shape {
                if rules_by_lhs[rule.lhs.0].len() > 1 {
                    return Err(ErrorCode::SequenceLhsNotUnique);
                }
            }
        }

        let terminal: Vec<bool> = rules_by_lhs.iter().map(|rs| rs.is_empty()).collect();

        let nullable = self.closure(vec![false; self.symbol_count], |known, rule| match &rule.shape {
            Shape::Fixed(rhs) => rhs.iter().all(|s| known[s.0]),
            Shape::Sequence { min, .. } => *min == 0,
        });

        for rule in &self.rules {
            if let Shape::Sequence { item, separator, .. } = rule.shape {
                if nullable[item.0] || separator.map_or(false, |s| nullable[s.0]) {
                    return Err(ErrorCode::CountedNullable);
                }
            }
        }

        let productive = self.closure(terminal.clone(), |known, rule| match &rule.shape {
            Shape::Fixed(rhs) => rhs.iter().all(|s| known[s.0]),
            Shape::Sequence { item, min, .. } => *min == 0 || known[item.0],
        });
        if !productive[start.0] {
            return Err(ErrorCode::UnproductiveStart);
        }

        if self.has_cycle(&nullable) {
            return Err(ErrorCode::CycleDetected);
        }

        Ok(Analysis { start, nullable, terminal, rules_by_lhs })
    }

    /// Least fixpoint over the rules: marks a rule's LHS once `holds` is true
    /// for that rule, until a whole pass marks nothing new.
    fn closure(&self, mut known: Vec<bool>, holds: impl Fn(&[bool], &RuleData) -> bool) -> Vec<bool> {
        loop {
            let mut changed = Changed::Unchanged;
            for rule in &self.rules {
                if !known[rule.lhs.0] && holds(&known, rule) {
                    known[rule.lhs.0] = true;
                    changed = Changed::Changed;
                }
            }
            if let Changed::Unchanged = changed {
                return known;
            }
        }
    }

    //  A ::= α X β,  α and β nullable
    // -------------------------------- unit
    //            A ⇒ X
    //
    // A cycle is a symbol reaching itself through one or more unit steps.
    fn has_cycle(&self, nullable: &[bool]) -> bool {
        let mut units: Vec<Vec<usize>> = vec![Vec::new(); self.symbol_count];
        for rule in &self.rules {
            match &rule.shape {
                Shape::Fixed(rhs) => {
                    for (k, x) in rhs.iter().enumerate() {
                        let rest_nullable = rhs.iter().enumerate()
                            .all(|(m, other)| m == k || nullable[other.0]);
                        if rest_nullable {
                            units[rule.lhs.0].push(x.0);
                        }
                    }
                }
                Shape::Sequence { item, .. } => units[rule.lhs.0].push(item.0),
            }
        }

        (0..self.symbol_count).any(|origin| {
            let mut seen = vec![false; self.symbol_count];
            let mut pending: Vec<usize> = units[origin].clone();
            while let Some(s) = pending.pop() {
                if s == origin {
                    return true;
                }
                if !seen[s] {
                    seen[s] = true;
                    pending.extend(units[s].iter().copied());
                }
            }
            false
        })
    }
}
