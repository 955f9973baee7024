use std::collections::HashSet;

use log::trace;
use thiserror::Error;

use super::grammar::{Analysis, ErrorCode, Grammar};
use super::{RuleId, SymbolId};

#[derive(Clone, PartialEq, Eq, Debug, Error)]
#[error("{message} (earley set {earley_set})")]
pub struct FeedError {
    pub code: ErrorCode,
    pub message: &'static str,
    pub earley_set: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub(crate) struct Item {
    pub(crate) rule: RuleId,
    pub(crate) dot: usize,
    pub(crate) origin: usize,
}

impl Item {
    fn advanced(&self) -> Item {
        Item { dot: self.dot + 1, ..*self }
    }
}

#[derive(Default, Debug)]
pub(crate) struct EarleySet {
    pub(crate) items: Vec<Item>,
    seen: HashSet<Item>,
}

impl EarleySet {
    fn insert(&mut self, item: Item) -> bool {
        if self.seen.insert(item) {
            self.items.push(item);
            true
        } else {
            false
        }
    }

    pub(crate) fn contains(&self, item: &Item) -> bool {
        self.seen.contains(item)
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(crate) struct Token {
    pub(crate) symbol: SymbolId,
    pub(crate) value: usize,
}

/// Earley set `k` holds the items that are live after the first `k` tokens.
pub struct Recognizer<'g> {
    grammar: &'g Grammar,
    analysis: &'g Analysis,
    sets: Vec<EarleySet>,
    tokens: Vec<Token>,
}

impl<'g> Recognizer<'g> {
    /// Starts input right away; the grammar must already be precomputed.
    pub fn new(grammar: &'g Grammar) -> Result<Self, FeedError> {
        let analysis = grammar.analysis().ok_or_else(|| FeedError {
            code: ErrorCode::NotPrecomputed,
            message: grammar.errors().message(ErrorCode::NotPrecomputed),
            earley_set: 0,
        })?;
        let mut r = Recognizer { grammar, analysis, sets: Vec::new(), tokens: Vec::new() };
        r.start_input();
        Ok(r)
    }

    //  S ::= γ  ∈ R,  S the start symbol
    // ----------------------------------- init
    //      (S ::= • γ, 0) ∈ set(0)
    pub fn start_input(&mut self) {
        self.sets = vec![EarleySet::default()];
        self.tokens.clear();
        let analysis = self.analysis;
        for &rule in &analysis.rules_by_lhs[analysis.start.index()] {
            self.sets[0].insert(Item { rule, dot: 0, origin: 0 });
        }
        self.close(0);
    }

    pub fn latest_earley_set(&self) -> usize { self.sets.len() - 1 }

    /// Terminals that `read` would accept next.
    pub fn expected_terminals(&self) -> Vec<SymbolId> {
        let grammar = self.grammar;
        let mut expected: Vec<SymbolId> = self.sets[self.latest_earley_set()].items.iter()
            .filter_map(|item| grammar.rule(item.rule).expected(item.dot))
            .filter(|s| self.analysis.terminal[s.index()])
            .collect();
        expected.sort();
        expected.dedup();
        expected
    }

    //  (A ::= α • c β, i) ∈ set(k),  token k+1 is c
    // ----------------------------------------------- scan
    //      (A ::= α c • β, i) ∈ set(k+1)
    pub fn read(&mut self, symbol: SymbolId, value: usize, length: usize) -> Result<(), FeedError> {
        if length != 1 {
            return Err(self.error(ErrorCode::InvalidTokenLength));
        }
        if !self.analysis.terminal.get(symbol.index()).copied().unwrap_or(false) {
            return Err(self.error(ErrorCode::TokenIsNotTerminal));
        }
        let k = self.latest_earley_set();
        let grammar = self.grammar;
        let scanned: Vec<Item> = self.sets[k].items.iter()
            .filter(|item| grammar.rule(item.rule).expected(item.dot) == Some(symbol))
            .map(Item::advanced)
            .collect();
        if scanned.is_empty() {
            return Err(self.error(ErrorCode::UnexpectedToken));
        }
        trace!("earley set {}: read symbol {} value {}", k, symbol, value);

        let mut set = EarleySet::default();
        for item in scanned {
            set.insert(item);
        }
        self.sets.push(set);
        self.tokens.push(Token { symbol, value });
        self.close(k + 1);
        Ok(())
    }

    /// Runs prediction and completion over set `k` until nothing new is added.
    fn close(&mut self, k: usize) {
        let grammar = self.grammar;
        let analysis = self.analysis;
        let mut next = 0;
        while next < self.sets[k].items.len() {
            let item = self.sets[k].items[next];
            next += 1;
            let rule = grammar.rule(item.rule);

            if rule.completes(item.dot) {
                self.complete(k, item.origin, rule.lhs);
            }

            if let Some(symbol) = rule.expected(item.dot) {
                if !analysis.terminal[symbol.index()] {
                    self.predict(k, symbol);
                    // Aycock and Horspool: step over a nullable symbol right
                    // away, so completions at the same set are never missed.
                    if analysis.nullable[symbol.index()] {
                        self.sets[k].insert(item.advanced());
                    }
                }
            }
        }
    }

    //  (A ::= α • B β, i) ∈ set(k),  B ::= γ ∈ R
    // ------------------------------------------- predict
    //        (B ::= • γ, k) ∈ set(k)
    fn predict(&mut self, k: usize, symbol: SymbolId) {
        let analysis = self.analysis;
        for &rule in &analysis.rules_by_lhs[symbol.index()] {
            self.sets[k].insert(Item { rule, dot: 0, origin: k });
        }
    }

    //  (B ::= γ •, j) ∈ set(k),  (A ::= α • B β, i) ∈ set(j)
    // ------------------------------------------------------ complete
    //             (A ::= α B • β, i) ∈ set(k)
    fn complete(&mut self, k: usize, origin: usize, lhs: SymbolId) {
        let grammar = self.grammar;
        let waiting: Vec<Item> = self.sets[origin].items.iter()
            .filter(|item| grammar.rule(item.rule).expected(item.dot) == Some(lhs))
            .map(Item::advanced)
            .collect();
        for item in waiting {
            self.sets[k].insert(item);
        }
    }

    pub(crate) fn error(&self, code: ErrorCode) -> FeedError {
        FeedError {
            code,
            message: self.grammar.errors().message(code),
            earley_set: self.latest_earley_set(),
        }
    }

    pub(crate) fn grammar(&self) -> &'g Grammar { self.grammar }

    pub(crate) fn analysis(&self) -> &'g Analysis { self.analysis }

    pub(crate) fn sets(&self) -> &[EarleySet] { &self.sets }

    pub(crate) fn tokens(&self) -> &[Token] { &self.tokens }
}
