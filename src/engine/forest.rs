//! Parse trees recovered from a finished recognizer, and the evaluation
//! steps each tree is walked as.
//!
//! The Earley sets are the oracle. A nonterminal spans `i..j` through a rule
//! exactly when that rule was completed in set `j` with origin `i`, and the
//! first `d` symbols of a rule span `i..k` exactly when set `k` holds the
//! rule with its dot at `d` and origin `i`. The forest is built from the
//! right end of each rule backwards, so every split it records is backed by
//! an item; nodes are shared, so its size stays polynomial however many
//! trees it packs. Trees are unpacked one at a time, on demand.

use std::collections::HashMap;

use log::debug;

use super::grammar::ErrorCode;
use super::recognizer::{FeedError, Item, Recognizer};
use super::{RuleId, SymbolId};

/// The stack slots of one rule application. Arguments occupy the contiguous
/// slots `arg_0..=arg_n`; the result replaces `arg_0`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct RuleStep {
    pub rule: RuleId,
    pub result: usize,
    pub arg_0: usize,
    pub arg_n: usize,
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Step {
    Initial,
    Token { result: usize, symbol: SymbolId, value: usize },
    Rule(RuleStep),
    NullingSymbol { result: usize, symbol: SymbolId, value: usize },
    Inactive,
}

/// Which rules produce RULE steps. An unvalued rule is still walked, but its
/// result slot is left holding whatever its first argument put there.
#[derive(Clone, Debug)]
pub struct ValuedRules(Vec<bool>);

impl ValuedRules {
    pub fn none(rule_count: usize) -> Self { ValuedRules(vec![false; rule_count]) }

    pub fn all(rule_count: usize) -> Self { ValuedRules(vec![true; rule_count]) }

    pub fn rule_is_valued(&mut self, rule: RuleId, valued: bool) {
        if rule.index() >= self.0.len() {
            self.0.resize(rule.index() + 1, false);
        }
        self.0[rule.index()] = valued;
    }

    pub fn is_valued(&self, rule: RuleId) -> bool {
        self.0.get(rule.index()).copied().unwrap_or(false)
    }
}

/// `symbol` over tokens `i..j`.
type SymbolKey = (SymbolId, usize, usize);

/// The first `dot` symbols of `rule` over tokens `i..j`.
type PrefixKey = (RuleId, usize, usize, usize);

#[derive(Clone, Debug)]
enum SymbolNode {
    Token { value: usize },
    Nulled,
    /// Every `(rule, dot)` completed over the span.
    Rules(Vec<(RuleId, usize)>),
}

#[derive(Clone, Debug)]
struct PrefixNode {
    /// The symbol just before the dot.
    last: SymbolId,
    /// Separators are matched but left out of the tree.
    kept: bool,
    /// Every `k` where the shorter prefix ends and `last` begins.
    splits: Vec<usize>,
}

/// Every complete parse of the input read so far, packed.
#[derive(Debug)]
pub struct Bocage {
    root: SymbolKey,
    symbols: HashMap<SymbolKey, SymbolNode>,
    prefixes: HashMap<PrefixKey, PrefixNode>,
}

impl Bocage {
    pub fn new(recognizer: &Recognizer<'_>) -> Result<Self, FeedError> {
        let end = recognizer.latest_earley_set();
        let root = (recognizer.analysis().start, 0, end);
        let mut builder = Builder::new(recognizer);
        if !builder.symbol(root) {
            return Err(recognizer.error(ErrorCode::NoParse));
        }
        let bocage = Bocage {
            root,
            symbols: builder.symbols.into_iter().filter_map(|(k, n)| Some((k, n?))).collect(),
            prefixes: builder.prefixes.into_iter().filter_map(|(k, n)| Some((k, n?))).collect(),
        };
        debug!("forest of {} symbol and {} prefix node(s) over {} token(s)",
               bocage.symbols.len(), bocage.prefixes.len(), end);
        Ok(bocage)
    }

    /// How many trees `trees` will yield, saturating at `usize::MAX`.
    pub fn tree_count(&self) -> usize {
        Counter { bocage: self, symbols: HashMap::new(), prefixes: HashMap::new() }.symbol(self.root)
    }

    /// Unpacks one tree per call to `next`.
    pub fn trees(&self) -> Trees<'_> {
        Trees { bocage: self, choices: Vec::new(), started: false }
    }

    fn tree(&self, key: SymbolKey, cursor: &mut Cursor<'_>) -> Node {
        let (symbol, i, j) = key;
        match &self.symbols[&key] {
            SymbolNode::Token { value } => Node::Token { symbol, value: *value },
            SymbolNode::Nulled => Node::Nulled { symbol },
            SymbolNode::Rules(alternatives) => {
                let (rule, dot) = alternatives[cursor.choose(alternatives.len())];
                Node::Rule { rule, children: self.children(rule, dot, i, j, cursor) }
            }
        }
    }

    fn children(&self, rule: RuleId, mut dot: usize, i: usize, mut j: usize, cursor: &mut Cursor<'_>) -> Vec<Node> {
        let mut reversed = Vec::new();
        while dot > 0 {
            let prefix = &self.prefixes[&(rule, dot, i, j)];
            let k = prefix.splits[cursor.choose(prefix.splits.len())];
            if prefix.kept {
                reversed.push(self.tree((prefix.last, k, j), cursor));
            }
            dot -= 1;
            j = k;
        }
        reversed.reverse();
        reversed
    }
}

struct Builder<'r, 'g> {
    recognizer: &'r Recognizer<'g>,
    completed: HashMap<SymbolKey, Vec<(RuleId, usize)>>,
    /// `None` marks a span that derives nothing, or one still being built.
    symbols: HashMap<SymbolKey, Option<SymbolNode>>,
    prefixes: HashMap<PrefixKey, Option<PrefixNode>>,
}

impl<'r, 'g> Builder<'r, 'g> {
    fn new(recognizer: &'r Recognizer<'g>) -> Self {
        let grammar = recognizer.grammar();
        let mut completed: HashMap<SymbolKey, Vec<(RuleId, usize)>> = HashMap::new();
        for (j, set) in recognizer.sets().iter().enumerate() {
            for item in &set.items {
                let rule = grammar.rule(item.rule);
                // empty spans are nulled leaves, never rule nodes
                if item.origin < j && rule.completes(item.dot) {
                    completed.entry((rule.lhs, item.origin, j)).or_default().push((item.rule, item.dot));
                }
            }
        }
        Builder { recognizer, completed, symbols: HashMap::new(), prefixes: HashMap::new() }
    }

    /// Whether set `k` holds `rule` with its dot at `dot` and origin `i`.
    fn reaches(&self, rule: RuleId, dot: usize, i: usize, k: usize) -> bool {
        if dot == 0 {
            return i == k;
        }
        self.recognizer.sets()[k].contains(&Item { rule, dot, origin: i })
    }

    fn symbol(&mut self, key: SymbolKey) -> bool {
        if let Some(node) = self.symbols.get(&key) {
            return node.is_some();
        }
        let (symbol, i, j) = key;
        let analysis = self.recognizer.analysis();
        let node = if i == j {
            analysis.nullable[symbol.index()].then_some(SymbolNode::Nulled)
        } else if analysis.terminal[symbol.index()] {
            let token = self.recognizer.tokens()[i];
            (j == i + 1 && token.symbol == symbol).then_some(SymbolNode::Token { value: token.value })
        } else {
            self.symbols.insert(key, None);
            let candidates = self.completed.get(&key).cloned().unwrap_or_default();
            let alternatives: Vec<(RuleId, usize)> = candidates.into_iter()
                .filter(|&(rule, dot)| self.prefix((rule, dot, i, j)))
                .collect();
            (!alternatives.is_empty()).then_some(SymbolNode::Rules(alternatives))
        };
        let found = node.is_some();
        self.symbols.insert(key, node);
        found
    }

    //  (A ::= α • X β, i) ∈ set(k),  X spans k..j
    // -------------------------------------------- split
    //      A ::= α X • β  spans i..j  at k
    fn prefix(&mut self, key: PrefixKey) -> bool {
        let (rule, dot, i, j) = key;
        if dot == 0 {
            return i == j;
        }
        if let Some(node) = self.prefixes.get(&key) {
            return node.is_some();
        }
        self.prefixes.insert(key, None);

        let data = self.recognizer.grammar().rule(rule);
        let node = data.expected(dot - 1).and_then(|last| {
            let kept = !data.is_separator(dot - 1);
            let splits: Vec<usize> = (i..=j)
                .filter(|&k| {
                    self.reaches(rule, dot - 1, i, k)
                        && self.symbol((last, k, j))
                        && self.prefix((rule, dot - 1, i, k))
                })
                .collect();
            (!splits.is_empty()).then_some(PrefixNode { last, kept, splits })
        });
        let found = node.is_some();
        self.prefixes.insert(key, node);
        found
    }
}

struct Counter<'b> {
    bocage: &'b Bocage,
    symbols: HashMap<SymbolKey, usize>,
    prefixes: HashMap<PrefixKey, usize>,
}

impl Counter<'_> {
    fn symbol(&mut self, key: SymbolKey) -> usize {
        if let Some(&count) = self.symbols.get(&key) {
            return count;
        }
        let bocage = self.bocage;
        let count = match &bocage.symbols[&key] {
            SymbolNode::Token { .. } | SymbolNode::Nulled => 1,
            SymbolNode::Rules(alternatives) => alternatives.iter()
                .map(|&(rule, dot)| self.prefix((rule, dot, key.1, key.2)))
                .fold(0, usize::saturating_add),
        };
        self.symbols.insert(key, count);
        count
    }

    fn prefix(&mut self, key: PrefixKey) -> usize {
        let (rule, dot, i, j) = key;
        if dot == 0 {
            return 1;
        }
        if let Some(&count) = self.prefixes.get(&key) {
            return count;
        }
        let bocage = self.bocage;
        let prefix = &bocage.prefixes[&key];
        let count = prefix.splits.iter()
            .map(|&k| {
                let last = if prefix.kept { self.symbol((prefix.last, k, j)) } else { 1 };
                self.prefix((rule, dot - 1, i, k)).saturating_mul(last)
            })
            .fold(0, usize::saturating_add);
        self.prefixes.insert(key, count);
        count
    }
}

#[derive(Copy, Clone, Debug)]
struct Choice {
    taken: usize,
    count: usize,
}

/// Replays the choices of the previous tree, then takes the first
/// alternative at every choice point past them.
struct Cursor<'c> {
    choices: &'c mut Vec<Choice>,
    next: usize,
}

impl Cursor<'_> {
    fn choose(&mut self, count: usize) -> usize {
        if count == 1 {
            return 0;
        }
        if self.next == self.choices.len() {
            self.choices.push(Choice { taken: 0, count });
        }
        let taken = self.choices[self.next].taken;
        self.next += 1;
        taken
    }
}

/// The trees of a [`Bocage`], in odometer order over their choice points.
pub struct Trees<'b> {
    bocage: &'b Bocage,
    choices: Vec<Choice>,
    started: bool,
}

impl Iterator for Trees<'_> {
    type Item = Tree;

    fn next(&mut self) -> Option<Tree> {
        if self.started {
            loop {
                let last = self.choices.last_mut()?;
                if last.taken + 1 < last.count {
                    last.taken += 1;
                    break;
                }
                self.choices.pop();
            }
        }
        self.started = true;
        let mut cursor = Cursor { choices: &mut self.choices, next: 0 };
        let root = self.bocage.tree(self.bocage.root, &mut cursor);
        Some(Tree { root })
    }
}

#[derive(Clone, Debug)]
enum Node {
    Token { symbol: SymbolId, value: usize },
    Nulled { symbol: SymbolId },
    Rule { rule: RuleId, children: Vec<Node> },
}

#[derive(Clone, Debug)]
pub struct Tree {
    root: Node,
}

impl Tree {
    /// The evaluation steps of this tree: INITIAL, then a postorder walk
    /// where the `k`th child of a node at slot `s` lives at slot `s + k`,
    /// then INACTIVE.
    pub fn value(&self, valued: &ValuedRules) -> Value {
        let mut steps = vec![Step::Initial];
        walk(&self.root, 0, valued, &mut steps);
        steps.push(Step::Inactive);
        Value { steps: steps.into_iter() }
    }
}

fn walk(node: &Node, slot: usize, valued: &ValuedRules, steps: &mut Vec<Step>) {
    match node {
        Node::Token { symbol, value } => {
            steps.push(Step::Token { result: slot, symbol: *symbol, value: *value });
        }
        Node::Nulled { symbol } => {
            steps.push(Step::NullingSymbol { result: slot, symbol: *symbol, value: 0 });
        }
        Node::Rule { rule, children } => {
            for (k, child) in children.iter().enumerate() {
                walk(child, slot + k, valued, steps);
            }
            if valued.is_valued(*rule) {
                steps.push(Step::Rule(RuleStep {
                    rule: *rule,
                    result: slot,
                    arg_0: slot,
                    arg_n: slot + children.len().saturating_sub(1),
                }));
            }
        }
    }
}

#[derive(Debug)]
pub struct Value {
    steps: std::vec::IntoIter<Step>,
}

impl Value {
    /// Once the tree is exhausted this keeps answering INACTIVE.
    pub fn step(&mut self) -> Step {
        self.steps.next().unwrap_or(Step::Inactive)
    }
}

impl Iterator for Value {
    type Item = Step;
    fn next(&mut self) -> Option<Step> { self.steps.next() }
}
