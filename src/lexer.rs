//! The specification tokenizer. A specification is three sections separated
//! by `%%` markers:
//!
//! ```text
//! prologue %% grammar %% epilogue
//! ```
//!
//! The prologue and epilogue are copied through verbatim. Only the grammar
//! section is lexed, and there are six kinds of "tokens":
//!
//! 1. name: a maximal run of ASCII letters. The run `null` is a keyword.
//!
//! 2. string: anything between a pair of `"`; there are no escapes.
//!
//! 3. code: anything between `{{` and the first `}}` after it.
//!
//! 4. operators: `::=`, `*`, `+`, and `~`.
//!
//! 5. whitespace, which separates tokens and is otherwise ignored.
//!
//! 6. comments, from `#` through the end of the line, also ignored.

use log::trace;

use crate::bootstrap::MetaSymbols;
use crate::engine::Recognizer;
use crate::model::Lexicon;
use crate::{Error, Spanned};

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Tok<'input> {
    /// `::=`
    BnfOp,
    /// `null`
    Null,
    /// `*` carries 0 and `+` carries 1: the minimum repetition count.
    Min(u8),
    /// `~`
    StrOp,
    Name(&'input str),
    /// Contents of a string literal, quotes removed.
    Str(&'input str),
    /// Contents of a code block, braces removed.
    Code(&'input str),
}

/// Matched by exact prefix, in this order. `null` is not here: it is a
/// word, told apart from names once the whole run of letters is read.
const OPERATORS: &[(&str, Tok<'static>)] = &[
    ("::=", Tok::BnfOp),
    ("*", Tok::Min(0)),
    ("+", Tok::Min(1)),
    ("~", Tok::StrOp),
];

const SECTION_MARK: &str = "%%";

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct Sections<'input> {
    pub prologue: &'input str,
    pub body: &'input str,
    /// Byte offset of `body` within the whole input.
    pub body_offset: usize,
    pub epilogue: &'input str,
}

/// Splits `input` at the first two `%%` markers.
pub fn sections(input: &str) -> Result<Sections<'_>, Error> {
    let first = input.find(SECTION_MARK).ok_or(Error::MissingDelimiter { found: 0 })?;
    let body_offset = first + SECTION_MARK.len();
    let body_len = input[body_offset..].find(SECTION_MARK)
        .ok_or(Error::MissingDelimiter { found: 1 })?;
    let body_end = body_offset + body_len;
    Ok(Sections {
        prologue: &input[..first],
        body: &input[body_offset..body_end],
        body_offset,
        epilogue: &input[body_end + SECTION_MARK.len()..],
    })
}

/// Lexes a grammar section. Offsets in the yielded spans are relative to the
/// whole input, starting from `base`. The first error ends the iteration.
pub struct Lexer<'input> {
    input: &'input str,
    base: usize,
    pos: usize,
}

impl<'input> Lexer<'input> {
    pub fn new(input: &'input str) -> Self { Lexer::with_offset(input, 0) }

    pub fn with_offset(input: &'input str, base: usize) -> Self {
        Lexer { input, base, pos: 0 }
    }

    fn token(&mut self, start: usize, len: usize, tok: Tok<'input>) -> Spanned<Tok<'input>, usize, Error> {
        self.pos = start + len;
        Ok((self.base + start, tok, self.base + self.pos))
    }

    fn fail(&mut self, start: usize) -> Spanned<Tok<'input>, usize, Error> {
        let remainder = self.input[start..].to_string();
        self.pos = self.input.len();
        Err(Error::Lexical { offset: self.base + start, remainder })
    }
}

impl<'input> Iterator for Lexer<'input> {
    type Item = Spanned<Tok<'input>, usize, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        let input = self.input;
        loop {
            let rest = &input[self.pos..];
            let trimmed = rest.trim_start();
            let start = self.pos + (rest.len() - trimmed.len());
            self.pos = start;
            let rest = trimmed;
            let c = rest.chars().next()?;

            if c == '#' {
                self.pos = match rest.find('\n') {
                    Some(newline) => start + newline + 1,
                    None => input.len(),
                };
                continue;
            }

            if c.is_ascii_alphabetic() {
                let len = rest.find(|c: char| !c.is_ascii_alphabetic()).unwrap_or(rest.len());
                let word = &rest[..len];
                let tok = if word == "null" { Tok::Null } else { Tok::Name(word) };
                return Some(self.token(start, len, tok));
            }

            if c == '"' {
                return Some(match rest[1..].find('"') {
                    Some(close) => self.token(start, close + 2, Tok::Str(&rest[1..1 + close])),
                    None => self.fail(start),
                });
            }

            if let Some((op, tok)) = OPERATORS.iter().find(|(op, _)| rest.starts_with(op)) {
                return Some(self.token(start, op.len(), *tok));
            }

            if let Some(code) = rest.strip_prefix("{{") {
                return Some(match code.find("}}") {
                    Some(close) => self.token(start, close + 4, Tok::Code(&code[..close])),
                    None => self.fail(start),
                });
            }

            return Some(self.fail(start));
        }
    }
}

/// Lexes the grammar section of `input` into `recognizer`, interning names,
/// strings and code blocks into `lexicon` so that their ids can travel as
/// token values. Returns the offset where the grammar section ends.
pub fn tokenize(
    input: &str,
    lexicon: &mut Lexicon,
    symbols: &MetaSymbols,
    recognizer: &mut Recognizer<'_>,
) -> Result<usize, Error> {
    let sections = sections(input)?;
    lexicon.prologue = sections.prologue.to_string();
    lexicon.epilogue = sections.epilogue.to_string();

    for spanned in Lexer::with_offset(sections.body, sections.body_offset) {
        let (offset, tok, _) = spanned?;
        let value = match tok {
            Tok::Name(s) => lexicon.names.add(s.to_string()),
            Tok::Str(s) => lexicon.strings.add(s.to_string()),
            Tok::Code(s) => lexicon.code_blocks.add(s.to_string()),
            Tok::Min(min) => usize::from(min),
            Tok::BnfOp | Tok::Null | Tok::StrOp => 0,
        };
        let symbol = symbols.terminal(&tok);
        trace!("{}: {:?} as symbol {} value {}", offset, tok, symbol, value);
        recognizer.read(symbol, value, 1).map_err(|error| Error::Feed { offset, error })?;
    }

    Ok(sections.body_offset + sections.body.len())
}

#[cfg(test)]
#[path = "tests/lexer.rs"]
mod tests_for_lexer;
