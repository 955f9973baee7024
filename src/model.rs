//! The records a grammar specification is read into.
//!
//! A specification's text is split across two owners. The [`Lexicon`] holds
//! what the tokenizer interns (names, string literals, code blocks, and the
//! verbatim prologue and epilogue); its ids travel through the parser as
//! token values. The [`RuleModel`] holds what the bootstrap actions build
//! from one parse tree, and is thrown away with that tree.

use thiserror::Error;

use crate::table::IndexedTable;

pub type NameId = usize;
pub type StringId = usize;
pub type CodeId = usize;
pub type ListId = usize;
pub type RhsId = usize;

/// Code block 0 is the empty block, meaning "no action".
pub const NO_CODE: CodeId = 0;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum Cardinality {
    /// A names-list, matched exactly.
    Fixed,
    /// Zero or more repetitions.
    Star,
    /// One or more repetitions.
    Plus,
}

impl Cardinality {
    /// Maps the payload of a `*` or `+` token.
    pub fn from_min(min: usize) -> Result<Cardinality, ModelError> {
        match min {
            0 => Ok(Cardinality::Star),
            1 => Ok(Cardinality::Plus),
            n => Err(ModelError::Minimum(n)),
        }
    }

    /// The repetition minimum of a sequence, `None` for a fixed list.
    pub fn min(self) -> Option<u8> {
        match self {
            Cardinality::Fixed => None,
            Cardinality::Star => Some(0),
            Cardinality::Plus => Some(1),
        }
    }
}

/// The right-hand side of a rule. For [`Cardinality::Fixed`], `list` is a
/// names-list id; otherwise it is the name id of the repeated item.
///
/// Two records that differ only by separator are distinct.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Rhs {
    pub list: usize,
    pub kind: Cardinality,
    pub separator: Option<NameId>,
}

impl Rhs {
    /// `null`: a fixed list with nothing in it.
    pub const EMPTY: Rhs = Rhs { list: 0, kind: Cardinality::Fixed, separator: None };

    pub fn names(list: ListId) -> Rhs {
        Rhs { list, kind: Cardinality::Fixed, separator: None }
    }

    pub fn sequence(item: NameId, kind: Cardinality, separator: Option<NameId>) -> Rhs {
        Rhs { list: item, kind, separator }
    }

    pub fn is_sequence(&self) -> bool { self.kind != Cardinality::Fixed }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct Rule {
    pub lhs: NameId,
    pub rhs: Rhs,
    pub code: CodeId,
}

/// `lhs ~ "literal"`
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct TokenRule {
    pub lhs: NameId,
    pub literal: StringId,
}

#[derive(Clone, Debug)]
pub struct Lexicon {
    pub names: IndexedTable<String>,
    pub strings: IndexedTable<String>,
    pub code_blocks: IndexedTable<String>,
    pub prologue: String,
    pub epilogue: String,
}

impl Default for Lexicon {
    fn default() -> Self { Lexicon::new() }
}

impl Lexicon {
    pub fn new() -> Self {
        let mut strings = IndexedTable::new();
        strings.add(String::new());
        let mut code_blocks = IndexedTable::new();
        code_blocks.add(String::new());
        Lexicon {
            names: IndexedTable::new(),
            strings,
            code_blocks,
            prologue: String::new(),
            epilogue: String::new(),
        }
    }

    pub fn name(&self, id: NameId) -> Result<&str, ModelError> {
        self.names.get(id).map(|s| &s[..]).ok_or(ModelError::Name(id))
    }

    pub fn string(&self, id: StringId) -> Result<&str, ModelError> {
        self.strings.get(id).map(|s| &s[..]).ok_or(ModelError::String(id))
    }

    pub fn code_block(&self, id: CodeId) -> Result<&str, ModelError> {
        self.code_blocks.get(id).map(|s| &s[..]).ok_or(ModelError::CodeBlock(id))
    }
}

#[derive(Clone, Debug, Default)]
pub struct RuleModel {
    pub rules: IndexedTable<Rule>,
    pub rhs: IndexedTable<Rhs>,
    pub names_lists: IndexedTable<Vec<NameId>>,
    pub token_rules: IndexedTable<TokenRule>,
}

impl RuleModel {
    /// Reserves id 0 of the RHS and names-list tables for the empty RHS.
    pub fn reserve_empty(&mut self) {
        self.names_lists.add(Vec::new());
        self.rhs.add(Rhs::EMPTY);
    }

    pub fn rhs(&self, id: RhsId) -> Result<Rhs, ModelError> {
        self.rhs.get(id).copied().ok_or(ModelError::Rhs(id))
    }

    pub fn names_list(&self, id: ListId) -> Result<&[NameId], ModelError> {
        self.names_lists.get(id).map(|v| &v[..]).ok_or(ModelError::NamesList(id))
    }

    /// The start symbol of the generated grammar: the LHS of the first rule.
    pub fn start(&self) -> Option<NameId> {
        self.rules.iter().next().map(|r| r.lhs)
    }
}

#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum ModelError {
    #[error("no name with id {0}")]
    Name(NameId),
    #[error("no string literal with id {0}")]
    String(StringId),
    #[error("no code block with id {0}")]
    CodeBlock(CodeId),
    #[error("no right-hand side with id {0}")]
    Rhs(RhsId),
    #[error("no names-list with id {0}")]
    NamesList(ListId),
    #[error("repetition minimum {0} is neither `*` (0) nor `+` (1)")]
    Minimum(usize),
}
