//! The semantic actions of the meta grammar. Evaluating one parse tree of a
//! specification with these actions builds that tree's [`RuleModel`]; the
//! action of the top rule then hands the model to the code generator.
//!
//! Every value on the stack is a table id: token values are the ids the
//! tokenizer interned, and each nonterminal stands for the id of whatever
//! record its action added.

use log::{debug, log_enabled, Level};

use crate::bootstrap::MetaRules;
use crate::codegen;
use crate::evaluator::{check_arity, Context, Evaluator};
use crate::model::{Cardinality, Lexicon, Rhs, Rule, RuleModel, TokenRule, NO_CODE};
use crate::Error;

pub struct BootstrapContext<'l> {
    pub lexicon: &'l Lexicon,
    pub model: RuleModel,
    /// One generated unit per evaluated tree.
    pub output: Vec<String>,
}

impl<'l> BootstrapContext<'l> {
    pub fn new(lexicon: &'l Lexicon) -> Self {
        BootstrapContext { lexicon, model: RuleModel::default(), output: Vec::new() }
    }
}

impl Context for BootstrapContext<'_> {
    type Value = usize;

    /// Each tree starts over with an empty model.
    fn initial(&mut self) {
        self.model = RuleModel::default();
        self.model.reserve_empty();
    }

    fn convert(&mut self, value: usize) -> usize { value }
}

pub type BootstrapEvaluator<'l> = Evaluator<usize, BootstrapContext<'l>>;

/// An evaluator with an action for every rule of the meta grammar.
pub fn evaluator<'l>(rules: &MetaRules, lexicon: &'l Lexicon) -> BootstrapEvaluator<'l> {
    let mut e = Evaluator::new(BootstrapContext::new(lexicon));
    e.set_rule_func(rules.rules, rules_action);
    e.set_rule_func(rules.rule, rule_action);
    e.set_rule_func(rules.rule_with_code, rule_with_code_action);
    e.set_rule_func(rules.token_rule, token_rule_action);
    e.set_rule_func(rules.lhs, lhs_action);
    e.set_rule_func(rules.rhs_names, rhs_names_action);
    e.set_rule_func(rules.rhs_sequence, rhs_sequence_action);
    e.set_rule_func(rules.rhs_null, rhs_null_action);
    e.set_rule_func(rules.rhs_separated, rhs_separated_action);
    e.set_rule_func(rules.names, names_action);
    e
}

type Ctx<'c, 'l> = &'c mut BootstrapContext<'l>;

// rules ::= rule+
fn rules_action(ctx: Ctx<'_, '_>, _args: &[usize], _out: &mut usize) -> Result<(), Error> {
    if log_enabled!(Level::Debug) {
        debug!("{} rule(s), {} token rule(s):\n{}",
               ctx.model.rules.len(), ctx.model.token_rules.len(), ctx.model.rendered(ctx.lexicon)?);
    }
    let unit = codegen::generate(ctx.lexicon, &ctx.model)?;
    ctx.output.push(unit);
    Ok(())
}

fn add_rule(ctx: Ctx<'_, '_>, lhs: usize, rhs: usize, code: usize) -> Result<(), Error> {
    let rhs = ctx.model.rhs(rhs)?;
    ctx.model.rules.add(Rule { lhs, rhs, code });
    Ok(())
}

// rule ::= lhs "::=" rhs
fn rule_action(ctx: Ctx<'_, '_>, args: &[usize], _out: &mut usize) -> Result<(), Error> {
    check_arity("rule", args, 3)?;
    add_rule(ctx, args[0], args[2], NO_CODE)
}

// rule ::= lhs "::=" rhs CODE
fn rule_with_code_action(ctx: Ctx<'_, '_>, args: &[usize], _out: &mut usize) -> Result<(), Error> {
    check_arity("rule with code", args, 4)?;
    add_rule(ctx, args[0], args[2], args[3])
}

// rule ::= lhs "~" STRING
fn token_rule_action(ctx: Ctx<'_, '_>, args: &[usize], _out: &mut usize) -> Result<(), Error> {
    check_arity("token rule", args, 3)?;
    ctx.model.token_rules.add(TokenRule { lhs: args[0], literal: args[2] });
    Ok(())
}

// lhs ::= NAME
fn lhs_action(_ctx: Ctx<'_, '_>, args: &[usize], out: &mut usize) -> Result<(), Error> {
    check_arity("lhs", args, 1)?;
    *out = args[0];
    Ok(())
}

// rhs ::= names
fn rhs_names_action(ctx: Ctx<'_, '_>, args: &[usize], out: &mut usize) -> Result<(), Error> {
    check_arity("names rhs", args, 1)?;
    *out = ctx.model.rhs.add(Rhs::names(args[0]));
    Ok(())
}

// rhs ::= NAME MIN
fn rhs_sequence_action(ctx: Ctx<'_, '_>, args: &[usize], out: &mut usize) -> Result<(), Error> {
    check_arity("sequence rhs", args, 2)?;
    let kind = Cardinality::from_min(args[1])?;
    *out = ctx.model.rhs.add(Rhs::sequence(args[0], kind, None));
    Ok(())
}

// rhs ::= "null"
fn rhs_null_action(ctx: Ctx<'_, '_>, _args: &[usize], out: &mut usize) -> Result<(), Error> {
    *out = ctx.model.rhs.add(Rhs::EMPTY);
    Ok(())
}

// rhs ::= NAME MIN NAME
fn rhs_separated_action(ctx: Ctx<'_, '_>, args: &[usize], out: &mut usize) -> Result<(), Error> {
    check_arity("separated rhs", args, 3)?;
    let kind = Cardinality::from_min(args[1])?;
    *out = ctx.model.rhs.add(Rhs::sequence(args[0], kind, Some(args[2])));
    Ok(())
}

// names ::= NAME+
fn names_action(ctx: Ctx<'_, '_>, args: &[usize], out: &mut usize) -> Result<(), Error> {
    *out = ctx.model.names_lists.add(args.to_vec());
    Ok(())
}

#[cfg(test)]
#[path = "tests/actions.rs"]
mod tests_for_actions;
