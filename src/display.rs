use crate::engine::{RuleStep, Step};
use crate::model::{Cardinality, Lexicon, ModelError, Rhs, Rule, RuleModel, TokenRule};

impl std::fmt::Display for Step {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Step::Initial => write!(w, "INITIAL"),
            Step::Token { result, symbol, value } => {
                write!(w, "TOKEN {} = {} -> [{}]", symbol, value, result)
            }
            Step::Rule(RuleStep { rule, result, arg_0, arg_n }) => {
                write!(w, "RULE {} [{}..={}] -> [{}]", rule, arg_0, arg_n, result)
            }
            Step::NullingSymbol { result, symbol, value } => {
                write!(w, "NULLING {} = {} -> [{}]", symbol, value, result)
            }
            Step::Inactive => write!(w, "INACTIVE"),
        }
    }
}

impl std::fmt::Display for Cardinality {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Cardinality::Fixed => Ok(()),
            Cardinality::Star => write!(w, "*"),
            Cardinality::Plus => write!(w, "+"),
        }
    }
}

/// Model records only hold ids; rendering them as grammar text needs the
/// tables those ids point into.
pub trait Rendered {
    fn rendered(&self, lexicon: &Lexicon, model: &RuleModel) -> Result<String, ModelError>;
}

impl Rendered for Rhs {
    fn rendered(&self, lexicon: &Lexicon, model: &RuleModel) -> Result<String, ModelError> {
        if !self.is_sequence() {
            let names = model.names_list(self.list)?;
            if names.is_empty() {
                return Ok("null".to_string());
            }
            let names: Vec<&str> = names.iter()
                .map(|&n| lexicon.name(n))
                .collect::<Result<_, _>>()?;
            return Ok(names.join(" "));
        }
        let item = lexicon.name(self.list)?;
        match self.separator {
            None => Ok(format!("{}{}", item, self.kind)),
            Some(sep) => Ok(format!("{}{} {}", item, self.kind, lexicon.name(sep)?)),
        }
    }
}

impl Rendered for Rule {
    fn rendered(&self, lexicon: &Lexicon, model: &RuleModel) -> Result<String, ModelError> {
        Ok(format!("{} ::= {}", lexicon.name(self.lhs)?, self.rhs.rendered(lexicon, model)?))
    }
}

impl Rendered for TokenRule {
    fn rendered(&self, lexicon: &Lexicon, _model: &RuleModel) -> Result<String, ModelError> {
        Ok(format!("{} ~ \"{}\"", lexicon.name(self.lhs)?, lexicon.string(self.literal)?))
    }
}

impl RuleModel {
    /// The model as grammar text: one line per rule, then one per token rule.
    pub fn rendered(&self, lexicon: &Lexicon) -> Result<String, ModelError> {
        let mut lines = Vec::new();
        for rule in &self.rules {
            lines.push(rule.rendered(lexicon, self)?);
        }
        for token in &self.token_rules {
            lines.push(token.rendered(lexicon, self)?);
        }
        Ok(lines.join("\n"))
    }
}
