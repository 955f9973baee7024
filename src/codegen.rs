//! Emits the Rust source for one grammar specification.
//!
//! The generated unit has four parts between the prologue and the epilogue:
//!
//! * `GrammarIds`, holding a `RuleId` per rule and a `SymbolId` per name;
//! * `create_grammar`, which builds and precomputes the grammar;
//! * `create_tokens`, pairing each token literal with its symbol;
//! * `evaluate_rules`, which runs the action code of the rule a step names.
//!
//! Neither `forestgen::engine` nor the stack element type `Value` is
//! imported by the generated code; the prologue has to bring them in.

use std::fmt::Write;

use linear_map::LinearMap;
use log::{debug, warn};
use regex::{Captures, Regex};

use crate::display::Rendered;
use crate::model::{Lexicon, NameId, Rule, RuleModel, NO_CODE};
use crate::Error;

pub const HEADER: &str = "// Generated by forestgen. Do not edit.";

/// The ordinal of every rule among the rules sharing its LHS, in table order.
pub fn annotate(model: &RuleModel) -> Vec<usize> {
    let mut next: LinearMap<NameId, usize> = LinearMap::new();
    model.rules.iter()
        .map(|rule| {
            let ordinal = next.entry(rule.lhs).or_insert(0);
            let this = *ordinal;
            *ordinal += 1;
            this
        })
        .collect()
}

/// Rewrites the placeholders of an action body into stack accesses:
///
/// | placeholder | becomes                 |
/// |-------------|-------------------------|
/// | `$$`        | `stack[v.result]`       |
/// | `$0`        | `stack[v.arg_0]`        |
/// | `$k`, 1..9  | `stack[v.arg_0 + k]`    |
/// | `$N`        | `stack[v.arg_n + 1]`    |
///
/// Only one digit is read, so `$10` is `$1` followed by `0`. Any other `$`
/// is left as it is.
pub fn rewrite_placeholders(code: &str) -> Result<String, Error> {
    let placeholder = Regex::new(r"(?s)\$(.)?")?;
    Ok(placeholder.replace_all(code, |caps: &Captures| {
        let after = caps.get(1).map_or("", |m| m.as_str());
        match after {
            "$" => "stack[v.result]".to_string(),
            "0" => "stack[v.arg_0]".to_string(),
            "N" => "stack[v.arg_n + 1]".to_string(),
            d if d.len() == 1 && d.as_bytes()[0].is_ascii_digit() => {
                format!("stack[v.arg_0 + {}]", d)
            }
            _ => {
                warn!("unknown placeholder `{}` left as written", &caps[0]);
                caps[0].to_string()
            }
        }
    }).into_owned())
}

fn rule_field(lexicon: &Lexicon, rule: &Rule, ordinal: usize) -> Result<String, Error> {
    Ok(format!("rule_id_{}_{}", lexicon.name(rule.lhs)?, ordinal))
}

fn symbol_field(lexicon: &Lexicon, name: NameId) -> Result<String, Error> {
    Ok(format!("R_{}", lexicon.name(name)?))
}

/// The whole generated unit, prologue and epilogue included.
pub fn generate(lexicon: &Lexicon, model: &RuleModel) -> Result<String, Error> {
    let ordinals = annotate(model);
    let rule_fields: Vec<String> = model.rules.iter().zip(&ordinals)
        .map(|(rule, &ordinal)| rule_field(lexicon, rule, ordinal))
        .collect::<Result<_, _>>()?;
    let symbol_fields: Vec<String> = (0..lexicon.names.len())
        .map(|name| symbol_field(lexicon, name))
        .collect::<Result<_, _>>()?;
    debug!("generating {} rule(s) over {} symbol(s)", rule_fields.len(), symbol_fields.len());

    let mut out = String::new();
    out.push_str(&lexicon.prologue);
    writeln!(out)?;
    writeln!(out, "{}", HEADER)?;
    writeln!(out)?;

    writeln!(out, "#[allow(non_snake_case)]")?;
    writeln!(out, "pub struct GrammarIds {{")?;
    for field in &rule_fields {
        writeln!(out, "    pub {}: RuleId,", field)?;
    }
    for field in &symbol_fields {
        writeln!(out, "    pub {}: SymbolId,", field)?;
    }
    writeln!(out, "}}")?;
    writeln!(out)?;

    write_create_grammar(&mut out, lexicon, model, &rule_fields, &symbol_fields)?;
    writeln!(out)?;
    write_create_tokens(&mut out, lexicon, model)?;
    writeln!(out)?;
    write_evaluate_rules(&mut out, lexicon, model, &rule_fields)?;

    out.push_str(&lexicon.epilogue);
    Ok(out)
}

fn write_create_grammar(
    out: &mut String,
    lexicon: &Lexicon,
    model: &RuleModel,
    rule_fields: &[String],
    symbol_fields: &[String],
) -> Result<(), Error> {
    writeln!(out, "#[allow(non_snake_case)]")?;
    writeln!(out, "pub fn create_grammar(g: &mut Grammar) -> Result<GrammarIds, PrecomputeError> {{")?;
    for field in symbol_fields {
        writeln!(out, "    let {} = g.new_symbol();", field)?;
    }

    for (rule, field) in model.rules.iter().zip(rule_fields) {
        writeln!(out, "    // {}", rule.rendered(lexicon, model)?)?;
        let lhs = symbol_field(lexicon, rule.lhs)?;
        match rule.rhs.kind.min() {
            None => {
                let rhs: Vec<String> = model.names_list(rule.rhs.list)?.iter()
                    .map(|&name| symbol_field(lexicon, name))
                    .collect::<Result<_, _>>()?;
                writeln!(out, "    let {} = g.add_rule({}, &[{}]);", field, lhs, rhs.join(", "))?;
            }
            Some(min) => {
                let item = symbol_field(lexicon, rule.rhs.list)?;
                let separator = match rule.rhs.separator {
                    Some(sep) => format!("Some({})", symbol_field(lexicon, sep)?),
                    None => "None".to_string(),
                };
                writeln!(out, "    let {} = g.new_sequence({}, {}, {}, {});", field, lhs, item, separator, min)?;
            }
        }
    }

    let start = model.start().or(if lexicon.names.is_empty() { None } else { Some(0) });
    if let Some(start) = start {
        writeln!(out, "    g.start_symbol({});", symbol_field(lexicon, start)?)?;
    }
    writeln!(out, "    g.precompute()?;")?;
    writeln!(out, "    Ok(GrammarIds {{")?;
    for field in rule_fields.iter().chain(symbol_fields) {
        writeln!(out, "        {},", field)?;
    }
    writeln!(out, "    }})")?;
    writeln!(out, "}}")?;
    Ok(())
}

fn write_create_tokens(out: &mut String, lexicon: &Lexicon, model: &RuleModel) -> Result<(), Error> {
    writeln!(out, "pub fn create_tokens(ids: &GrammarIds) -> Vec<(&'static str, SymbolId, usize)> {{")?;
    if model.token_rules.is_empty() {
        writeln!(out, "    let _ = ids;")?;
        writeln!(out, "    Vec::new()")?;
        writeln!(out, "}}")?;
        return Ok(());
    }
    writeln!(out, "    vec![")?;
    for token in &model.token_rules {
        let literal = lexicon.string(token.literal)?;
        writeln!(out, "        ({:?}, ids.{}, 1),", literal, symbol_field(lexicon, token.lhs)?)?;
    }
    writeln!(out, "    ]")?;
    writeln!(out, "}}")?;
    Ok(())
}

fn write_evaluate_rules(
    out: &mut String,
    lexicon: &Lexicon,
    model: &RuleModel,
    rule_fields: &[String],
) -> Result<(), Error> {
    writeln!(out, "pub fn evaluate_rules(ids: &GrammarIds, v: &RuleStep, stack: &mut [Value]) -> Result<(), RuleId> {{")?;
    if rule_fields.is_empty() {
        writeln!(out, "    let _ = (ids, stack);")?;
        writeln!(out, "    Err(v.rule)")?;
        writeln!(out, "}}")?;
        return Ok(());
    }
    writeln!(out, "    let rule_id = v.rule;")?;
    for (k, (rule, field)) in model.rules.iter().zip(rule_fields).enumerate() {
        let keyword = if k == 0 { "    if" } else { " else if" };
        writeln!(out, "{} rule_id == ids.{} {{", keyword, field)?;
        if rule.code != NO_CODE {
            let body = rewrite_placeholders(lexicon.code_block(rule.code)?)?;
            let body = body.trim();
            if !body.is_empty() {
                writeln!(out, "        {}", body)?;
            }
        }
        write!(out, "    }}")?;
    }
    writeln!(out, " else {{")?;
    writeln!(out, "        return Err(rule_id);")?;
    writeln!(out, "    }}")?;
    writeln!(out, "    Ok(())")?;
    writeln!(out, "}}")?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/codegen.rs"]
mod tests_for_codegen;
