//! A table-driven stack machine over the evaluation steps of one parse tree.
//!
//! Every step names a slot of the value stack. Tokens and nulled symbols
//! write their (converted) values into their slot; a rule step hands the
//! contiguous slots of its arguments to the action registered for that rule,
//! and stores what the action produced in its result slot. Since the engine
//! walks trees in postorder, every argument is in place by the time the rule
//! that consumes it fires.

use log::trace;

use crate::engine::{RuleId, RuleStep, Step};
use crate::Error;

/// The state an evaluation threads through its actions.
pub trait Context {
    type Value: Clone + Default;

    /// Called on INITIAL, once the stack has been reset.
    fn initial(&mut self) {}

    /// Called on INACTIVE; the tree is done.
    fn inactive(&mut self) {}

    /// The stack value for a token or nulled symbol carrying `value`.
    fn convert(&mut self, value: usize) -> Self::Value;
}

/// A semantic action: reads the argument slots, writes the result.
///
/// `out` starts out as a copy of whatever the result slot held.
pub type Action<V, C> = fn(&mut C, &[V], &mut V) -> Result<(), Error>;

#[derive(Clone, PartialEq, Eq, Debug, thiserror::Error)]
pub enum EvalError {
    #[error("evaluation must start with INITIAL, not {found:?}")]
    NoInitial { found: Option<Step> },
    #[error("INITIAL in the middle of a tree")]
    Restarted,
    #[error("steps ended without INACTIVE")]
    NoInactive,
    #[error("rule {rule}: arguments {arg_0}..={arg_n} are not on a stack of {len}")]
    Arguments { rule: RuleId, arg_0: usize, arg_n: usize, len: usize },
    #[error("{action}: expected {expected} argument(s), found {found}")]
    Arity { action: &'static str, expected: usize, found: usize },
}

pub struct Evaluator<V, C> {
    stack: Vec<V>,
    actions: Vec<Option<Action<V, C>>>,
    context: C,
}

impl<V, C> Evaluator<V, C>
where
    V: Clone + Default,
    C: Context<Value = V>,
{
    pub fn new(context: C) -> Self {
        Evaluator { stack: Vec::new(), actions: Vec::new(), context }
    }

    /// Registers (or replaces) the action for `rule`.
    pub fn set_rule_func(&mut self, rule: RuleId, action: Action<V, C>) {
        if rule.index() >= self.actions.len() {
            self.actions.resize(rule.index() + 1, None);
        }
        self.actions[rule.index()] = Some(action);
    }

    pub fn context(&self) -> &C { &self.context }

    pub fn context_mut(&mut self) -> &mut C { &mut self.context }

    pub fn into_context(self) -> C { self.context }

    pub fn stack(&self) -> &[V] { &self.stack }

    /// Drains the steps of one tree, from INITIAL through INACTIVE. Anything
    /// after INACTIVE is left unread.
    pub fn evaluate(&mut self, steps: impl IntoIterator<Item = Step>) -> Result<(), Error> {
        let mut steps = steps.into_iter();
        match steps.next() {
            Some(Step::Initial) => {
                self.stack.clear();
                self.stack.push(V::default());
                self.context.initial();
            }
            found => return Err(EvalError::NoInitial { found }.into()),
        }

        for step in steps {
            trace!("step {:?}, stack depth {}", step, self.stack.len());
            match step {
                Step::Initial => return Err(EvalError::Restarted.into()),
                Step::Token { result, value, .. } | Step::NullingSymbol { result, value, .. } => {
                    let value = self.context.convert(value);
                    *self.slot(result) = value;
                }
                Step::Rule(rule) => self.rule(rule)?,
                Step::Inactive => {
                    self.context.inactive();
                    return Ok(());
                }
            }
        }
        Err(EvalError::NoInactive.into())
    }

    fn rule(&mut self, step: RuleStep) -> Result<(), Error> {
        let action = self.actions.get(step.rule.index()).copied().flatten()
            .ok_or(Error::Dispatch { rule: step.rule })?;
        let mut out = self.slot(step.result).clone();
        let len = self.stack.len();
        let args = self.stack.get(step.arg_0..=step.arg_n).ok_or(EvalError::Arguments {
            rule: step.rule,
            arg_0: step.arg_0,
            arg_n: step.arg_n,
            len,
        })?;
        action(&mut self.context, args, &mut out)?;
        self.stack[step.result] = out;
        Ok(())
    }

    /// The stack grows to fit any slot a step names.
    fn slot(&mut self, index: usize) -> &mut V {
        if index >= self.stack.len() {
            self.stack.resize(index + 1, V::default());
        }
        &mut self.stack[index]
    }
}

/// Fails unless an action got exactly `expected` arguments.
pub fn check_arity<V>(action: &'static str, args: &[V], expected: usize) -> Result<(), EvalError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(EvalError::Arity { action, expected, found: args.len() })
    }
}

#[cfg(test)]
#[path = "tests/evaluator.rs"]
mod tests_for_evaluator;
