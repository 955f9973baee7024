//! forestgen reads a grammar specification with embedded action code and
//! writes Rust source that rebuilds the grammar against [`engine`] and runs
//! the action code while a parse tree is evaluated.
//!
//! A specification is read by the same machinery the generated code relies
//! on: the tokenizer feeds the [`bootstrap`] meta grammar to an Earley
//! recognizer, every parse tree is walked by an [`evaluator::Evaluator`], and
//! the meta grammar's [`actions`] build a [`model::RuleModel`] that
//! [`codegen`] turns into source.

use std::path::Path;

use log::{debug, info};
use thiserror::Error;

pub type Spanned<Tok, Loc, Error> = Result<(Loc, Tok, Loc), Error>;

pub mod actions;
pub mod bootstrap;
pub mod codegen;
mod display;
pub mod engine;
pub mod evaluator;
pub mod lexer;
pub mod model;
pub mod table;

pub use display::Rendered;

use crate::engine::{Bocage, FeedError, PrecomputeError, Recognizer, RuleId, ValuedRules};
use crate::evaluator::{Context, EvalError, Evaluator};
use crate::model::{Lexicon, ModelError};

#[derive(Debug, Error)]
pub enum Error {
    #[error("expected two `%%` section markers, found {found}")]
    MissingDelimiter { found: usize },
    #[error("lexical error at offset {offset}: cannot read {remainder:?}")]
    Lexical { offset: usize, remainder: String },
    #[error("at offset {offset}: {error}")]
    Feed { offset: usize, error: FeedError },
    #[error(transparent)]
    Precompute(#[from] PrecomputeError),
    #[error("no action registered for rule {rule}")]
    Dispatch { rule: RuleId },
    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),
    #[error("malformed rule model: {0}")]
    Model(#[from] ModelError),
    #[error("placeholder pattern: {0}")]
    Pattern(#[from] regex::Error),
    #[error("formatting generated code failed")]
    Fmt(#[from] std::fmt::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// The source generated for one specification: one unit per parse tree.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Generated {
    pub units: Vec<String>,
}

impl std::fmt::Display for Generated {
    fn fmt(&self, w: &mut std::fmt::Formatter) -> std::fmt::Result {
        for unit in &self.units {
            write!(w, "{}", unit)?;
        }
        Ok(())
    }
}

/// Runs the whole pipeline over the text of a specification. Nothing is
/// returned unless every tree was evaluated successfully.
pub fn compile(input: &str) -> Result<Generated, Error> {
    let meta = bootstrap::MetaGrammar::new()?;
    let mut lexicon = Lexicon::new();
    let mut recognizer = Recognizer::new(&meta.grammar)
        .map_err(|error| Error::Feed { offset: 0, error })?;
    let end = lexer::tokenize(input, &mut lexicon, &meta.symbols, &mut recognizer)?;
    let bocage = Bocage::new(&recognizer).map_err(|error| Error::Feed { offset: end, error })?;
    debug!("{} name(s), {} string(s), {} code block(s)",
           lexicon.names.len(), lexicon.strings.len(), lexicon.code_blocks.len());

    let mut evaluator = actions::evaluator(&meta.rules, &lexicon);
    evaluate_trees(&bocage, &meta.valued_rules(), &mut evaluator)?;
    Ok(Generated { units: evaluator.into_context().output })
}

pub fn compile_file(path: impl AsRef<Path>) -> Result<Generated, Error> {
    let input = fs_err::read_to_string(path.as_ref())?;
    compile(&input)
}

/// Evaluates every tree of `bocage` in turn, stopping at the first error.
/// Returns how many trees were evaluated.
pub fn evaluate_trees<V, C>(
    bocage: &Bocage,
    valued: &ValuedRules,
    evaluator: &mut Evaluator<V, C>,
) -> Result<usize, Error>
where
    V: Clone + Default,
    C: Context<Value = V>,
{
    let mut count = 0;
    for tree in bocage.trees() {
        evaluator.evaluate(tree.value(valued))?;
        count += 1;
    }
    if count > 1 {
        info!("input is ambiguous: evaluated {} trees", count);
    }
    Ok(count)
}
