// This is actually defined at `crate::evaluator::tests_for_evaluator`

use super::*;
use crate::engine::{Bocage, Grammar, Recognizer, SymbolId};

#[derive(Default)]
struct Sum {
    initials: usize,
    inactives: usize,
}

impl Context for Sum {
    type Value = i64;
    fn initial(&mut self) { self.initials += 1; }
    fn inactive(&mut self) { self.inactives += 1; }
    fn convert(&mut self, value: usize) -> i64 { value as i64 }
}

fn add(_ctx: &mut Sum, args: &[i64], out: &mut i64) -> Result<(), Error> {
    *out = args.iter().sum();
    Ok(())
}

fn bump(_ctx: &mut Sum, _args: &[i64], out: &mut i64) -> Result<(), Error> {
    *out += 100;
    Ok(())
}

fn pair(_ctx: &mut Sum, args: &[i64], _out: &mut i64) -> Result<(), Error> {
    check_arity("pair", args, 2)?;
    Ok(())
}

fn rule_id(n: usize) -> RuleId { RuleId::from(n) }

fn token(result: usize, value: usize) -> Step {
    Step::Token { result, symbol: SymbolId::from(0), value }
}

fn rule(rule: usize, result: usize, arg_0: usize, arg_n: usize) -> Step {
    Step::Rule(RuleStep { rule: rule_id(rule), result, arg_0, arg_n })
}

#[test]
fn rule_steps_dispatch_to_registered_actions() {
    let mut e = Evaluator::new(Sum::default());
    e.set_rule_func(rule_id(0), add);
    e.evaluate(vec![Step::Initial, token(0, 2), token(1, 3), rule(0, 0, 0, 1), Step::Inactive]).unwrap();
    assert_eq!(e.stack()[0], 5);
    assert_eq!(e.context().initials, 1);
    assert_eq!(e.context().inactives, 1);
}

#[test]
fn action_table_grows_on_registration() {
    let mut e = Evaluator::new(Sum::default());
    e.set_rule_func(rule_id(7), add);
    e.set_rule_func(rule_id(2), bump);
    e.evaluate(vec![Step::Initial, token(0, 1), rule(2, 0, 0, 0), Step::Inactive]).unwrap();
    assert_eq!(e.stack(), &[101]);
}

#[test]
fn unregistered_rule_is_a_dispatch_error() {
    let mut e = Evaluator::new(Sum::default());
    e.set_rule_func(rule_id(0), add);
    let err = e.evaluate(vec![Step::Initial, token(0, 1), rule(1, 0, 0, 0), Step::Inactive]).unwrap_err();
    assert!(matches!(err, Error::Dispatch { rule } if rule == rule_id(1)), "{:?}", err);
}

#[test]
fn steps_must_start_with_initial() {
    let mut e = Evaluator::new(Sum::default());
    let err = e.evaluate(vec![token(0, 1), Step::Inactive]).unwrap_err();
    assert!(matches!(err, Error::Eval(EvalError::NoInitial { found: Some(Step::Token { .. }) })), "{:?}", err);

    let err = e.evaluate(Vec::new()).unwrap_err();
    assert!(matches!(err, Error::Eval(EvalError::NoInitial { found: None })), "{:?}", err);
}

#[test]
fn steps_must_end_with_inactive() {
    let mut e = Evaluator::new(Sum::default());
    let err = e.evaluate(vec![Step::Initial, token(0, 1)]).unwrap_err();
    assert!(matches!(err, Error::Eval(EvalError::NoInactive)), "{:?}", err);
    assert_eq!(e.context().inactives, 0);

    let err = e.evaluate(vec![Step::Initial, token(0, 1), Step::Initial, Step::Inactive]).unwrap_err();
    assert!(matches!(err, Error::Eval(EvalError::Restarted)), "{:?}", err);
}

#[test]
fn stack_grows_to_fit_and_resets_per_tree() {
    let mut e = Evaluator::new(Sum::default());
    e.evaluate(vec![
        Step::Initial,
        token(5, 9),
        Step::NullingSymbol { result: 2, symbol: SymbolId::from(1), value: 4 },
        Step::Inactive,
    ]).unwrap();
    assert_eq!(e.stack(), &[0, 0, 4, 0, 0, 9]);

    e.evaluate(vec![Step::Initial, Step::Inactive]).unwrap();
    assert_eq!(e.stack(), &[0]);
    assert_eq!(e.context().initials, 2);
}

#[test]
fn arguments_must_be_on_the_stack() {
    let mut e = Evaluator::new(Sum::default());
    e.set_rule_func(rule_id(0), add);
    let err = e.evaluate(vec![Step::Initial, rule(0, 0, 0, 3), Step::Inactive]).unwrap_err();
    assert!(matches!(err, Error::Eval(EvalError::Arguments { arg_n: 3, len: 1, .. })), "{:?}", err);
}

#[test]
fn actions_can_check_their_arity() {
    let mut e = Evaluator::new(Sum::default());
    e.set_rule_func(rule_id(0), pair);
    e.evaluate(vec![Step::Initial, token(0, 1), token(1, 1), rule(0, 0, 0, 1), Step::Inactive]).unwrap();
    let err = e.evaluate(vec![Step::Initial, token(0, 1), rule(0, 0, 0, 0), Step::Inactive]).unwrap_err();
    assert!(matches!(err, Error::Eval(EvalError::Arity { action: "pair", expected: 2, found: 1 })), "{:?}", err);
}

#[test]
fn every_tree_of_an_ambiguous_sum_evaluates_alike() {
    // E ::= E plus E | num
    let mut g = Grammar::new();
    let expr = g.new_symbol();
    let plus = g.new_symbol();
    let num = g.new_symbol();
    let r_add = g.add_rule(expr, &[expr, plus, expr]);
    let r_num = g.add_rule(expr, &[num]);
    g.start_symbol(expr);
    g.precompute().unwrap();

    let mut r = Recognizer::new(&g).unwrap();
    for (symbol, value) in [(num, 1), (plus, 0), (num, 2), (plus, 0), (num, 3)] {
        r.read(symbol, value, 1).unwrap();
    }
    let bocage = Bocage::new(&r).unwrap();

    fn sum_ends(_ctx: &mut Sum, args: &[i64], out: &mut i64) -> Result<(), Error> {
        check_arity("sum", args, 3)?;
        *out = args[0] + args[2];
        Ok(())
    }
    fn number(_ctx: &mut Sum, args: &[i64], out: &mut i64) -> Result<(), Error> {
        *out = args[0];
        Ok(())
    }
    let mut e = Evaluator::new(Sum::default());
    e.set_rule_func(r_add, sum_ends);
    e.set_rule_func(r_num, number);

    let mut results = Vec::new();
    for tree in bocage.trees() {
        e.evaluate(tree.value(&g.valued_rules())).unwrap();
        results.push(e.stack()[0]);
    }
    assert_eq!(results, vec![6, 6]);
    assert_eq!(crate::evaluate_trees(&bocage, &g.valued_rules(), &mut e).unwrap(), 2);
    assert_eq!(e.into_context().initials, 4);
}
