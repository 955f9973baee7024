// This is actually defined at `crate::lexer::tests_for_lexer`

use super::*;
use crate::bootstrap::MetaGrammar;
use crate::engine::ErrorCode;

fn toks(input: &str) -> Vec<Tok<'_>> {
    Lexer::new(input)
        .map(|spanned| spanned.map(|(_, tok, _)| tok))
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn rule_with_code_and_token_rule() {
    assert_eq!(toks(r#"S ::= A B {{ $$ = $0 + $1 }} A ~ "a""#), vec![
        Tok::Name("S"),
        Tok::BnfOp,
        Tok::Name("A"),
        Tok::Name("B"),
        Tok::Code(" $$ = $0 + $1 "),
        Tok::Name("A"),
        Tok::StrOp,
        Tok::Str("a"),
    ]);
}

#[test]
fn comments_run_to_end_of_line() {
    assert_eq!(toks("# header\nS ::= null # trailing\n# last"), vec![
        Tok::Name("S"),
        Tok::BnfOp,
        Tok::Null,
    ]);
}

#[test]
fn null_is_only_a_keyword_on_its_own() {
    assert_eq!(toks("nullable null nullx Null"), vec![
        Tok::Name("nullable"),
        Tok::Null,
        Tok::Name("nullx"),
        Tok::Name("Null"),
    ]);
}

#[test]
fn repetition_operators_carry_their_minimum() {
    assert_eq!(toks("Ns ::= A* B+Comma"), vec![
        Tok::Name("Ns"),
        Tok::BnfOp,
        Tok::Name("A"),
        Tok::Min(0),
        Tok::Name("B"),
        Tok::Min(1),
        Tok::Name("Comma"),
    ]);
}

#[test]
fn code_blocks_end_at_the_first_closing_braces() {
    let mut lexer = Lexer::new("{{ if x { y }}} z");
    assert_eq!(lexer.next().unwrap().unwrap(), (0, Tok::Code(" if x { y "), 14));
    match lexer.next() {
        Some(Err(Error::Lexical { offset: 14, remainder })) => assert_eq!(remainder, "} z"),
        other => panic!("expected lexical error, got {:?}", other),
    }
    assert!(lexer.next().is_none());
}

#[test]
fn spans_are_offset_into_the_whole_input() {
    let spans: Vec<(usize, usize)> = Lexer::with_offset(" A ::= \"b\"", 10)
        .map(|spanned| spanned.map(|(i, _, j)| (i, j)))
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(spans, vec![(11, 12), (13, 16), (17, 20)]);
}

#[test]
fn unrecognized_input_is_fatal() {
    let mut lexer = Lexer::new("S ::= 1 A");
    assert_eq!(lexer.next().unwrap().unwrap().1, Tok::Name("S"));
    assert_eq!(lexer.next().unwrap().unwrap().1, Tok::BnfOp);
    match lexer.next() {
        Some(Err(Error::Lexical { offset: 6, remainder })) => assert_eq!(remainder, "1 A"),
        other => panic!("expected lexical error, got {:?}", other),
    }
    assert!(lexer.next().is_none());
}

#[test]
fn unterminated_literals_are_fatal() {
    for input in ["\"abc", "{{ abc }"] {
        match Lexer::new(input).next() {
            Some(Err(Error::Lexical { offset: 0, remainder })) => assert_eq!(remainder, input),
            other => panic!("expected lexical error, got {:?}", other),
        }
    }
}

#[test]
fn sections_split_at_the_first_two_markers() {
    let s = sections("use x; %% S ::= A %% fn main() {} %% trailing").unwrap();
    assert_eq!(s.prologue, "use x; ");
    assert_eq!(s.body, " S ::= A ");
    assert_eq!(s.body_offset, 9);
    assert_eq!(s.epilogue, " fn main() {} %% trailing");
}

#[test]
fn missing_markers_are_fatal() {
    assert!(matches!(sections("S ::= A"), Err(Error::MissingDelimiter { found: 0 })));
    assert!(matches!(sections("P %% S ::= A"), Err(Error::MissingDelimiter { found: 1 })));
}

#[test]
fn tokenize_interns_token_values() {
    let meta = MetaGrammar::new().unwrap();
    let mut lexicon = Lexicon::new();
    let mut r = Recognizer::new(&meta.grammar).unwrap();
    let input = "P\n%%\nS ::= A B {{ go }}\nA ~ \"a\"\nB ~ \"b\"\nA ~ \"a\"\n%%\nE";
    let end = tokenize(input, &mut lexicon, &meta.symbols, &mut r).unwrap();

    assert_eq!(&input[end..], "%%\nE");
    assert_eq!(lexicon.prologue, "P\n");
    assert_eq!(lexicon.epilogue, "\nE");
    assert_eq!(lexicon.names.iter().collect::<Vec<_>>(), ["S", "A", "B"]);
    assert_eq!(lexicon.strings.iter().collect::<Vec<_>>(), ["", "a", "b"]);
    assert_eq!(lexicon.code_blocks.iter().collect::<Vec<_>>(), ["", " go "]);
    assert_eq!(r.latest_earley_set(), 14);
}

#[test]
fn rejected_tokens_report_their_offset() {
    let meta = MetaGrammar::new().unwrap();
    let mut lexicon = Lexicon::new();
    let mut r = Recognizer::new(&meta.grammar).unwrap();
    let err = tokenize("%% S ::= A\nnull ::= B %%", &mut lexicon, &meta.symbols, &mut r).unwrap_err();
    match err {
        Error::Feed { offset, error } => {
            assert_eq!(offset, 11);
            assert_eq!(error.code, ErrorCode::UnexpectedToken);
        }
        other => panic!("expected feed error, got {:?}", other),
    }
}

#[test]
fn operator_table_is_punctuation_only() {
    assert!(OPERATORS.iter().all(|(op, _)| !op.starts_with(|c: char| c.is_ascii_alphabetic())));
    assert_eq!(toks("null*"), vec![Tok::Null, Tok::Min(0)]);
}
