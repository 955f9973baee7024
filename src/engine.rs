//! The Earley engine that generated grammars are built against.
//!
//! The contract mirrors an incremental Earley library: symbols and rules are
//! created one at a time, the grammar is precomputed, tokens are fed to a
//! recognizer one earleme at a time, and every complete parse tree of the
//! final Earley set is walked as a flat stream of evaluation [`Step`]s.
//!
//! Traditional earley: gradually build, from left-to-right, set of "Earley
//! items" for each position in input. Here an item is `(rule, dot, origin)`;
//! for sequence rules the dot counts the items *and* separators consumed so
//! far, since a sequence has no fixed right-hand side to point into.
//!
//! Tree enumeration is exhaustive but lazy: the forest is packed, and each tree
//! is unpacked only when asked for. Nulled subtrees are atomic (one
//! NULLING_SYMBOL step, however many ways the symbol could derive the empty
//! string), and grammars that could yield infinitely many trees (cycles,
//! nullable sequence items) are rejected at precompute time.

use derive_more::{Display, From, Into};

mod forest;
mod grammar;
mod recognizer;

pub use forest::{Bocage, RuleStep, Step, Tree, Trees, Value, ValuedRules};
pub use grammar::{ErrorCode, ErrorTable, Grammar, PrecomputeError};
pub use recognizer::{FeedError, Recognizer};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From, Into)]
pub struct SymbolId(usize);

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Display, From, Into)]
pub struct RuleId(usize);

impl SymbolId {
    pub fn index(self) -> usize { self.0 }
}

impl RuleId {
    pub fn index(self) -> usize { self.0 }
}

#[cfg(test)]
#[path = "tests/engine.rs"]
mod tests_for_engine;
