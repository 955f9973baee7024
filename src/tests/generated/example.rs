use crate::engine::{Grammar, PrecomputeError, RuleId, RuleStep, SymbolId};

pub type Value = i64;

// Generated by forestgen. Do not edit.

#[allow(non_snake_case)]
pub struct GrammarIds {
    pub rule_id_S_0: RuleId,
    pub R_S: SymbolId,
    pub R_A: SymbolId,
    pub R_B: SymbolId,
}

#[allow(non_snake_case)]
pub fn create_grammar(g: &mut Grammar) -> Result<GrammarIds, PrecomputeError> {
    let R_S = g.new_symbol();
    let R_A = g.new_symbol();
    let R_B = g.new_symbol();
    // S ::= A B
    let rule_id_S_0 = g.add_rule(R_S, &[R_A, R_B]);
    g.start_symbol(R_S);
    g.precompute()?;
    Ok(GrammarIds {
        rule_id_S_0,
        R_S,
        R_A,
        R_B,
    })
}

pub fn create_tokens(ids: &GrammarIds) -> Vec<(&'static str, SymbolId, usize)> {
    vec![
        ("a", ids.R_A, 1),
        ("b", ids.R_B, 1),
    ]
}

pub fn evaluate_rules(ids: &GrammarIds, v: &RuleStep, stack: &mut [Value]) -> Result<(), RuleId> {
    let rule_id = v.rule;
    if rule_id == ids.rule_id_S_0 {
        stack[v.result] = stack[v.arg_0] * 10 + stack[v.arg_0 + 1];
    } else {
        return Err(rule_id);
    }
    Ok(())
}
