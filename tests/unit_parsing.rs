//! Unit tests for lexer and parser

use chumsky::Parser;
use grepql::ast::*;
use grepql::error::ErrorKind;
use grepql::lexer::{Keyword, Token, lexer};
use grepql::pretty::{pretty_condition, pretty_print};
use grepql::{parse, tokenize};

fn kinds(input: &str) -> Vec<Token> {
    tokenize(input)
        .expect("lex failed")
        .into_iter()
        .map(|(t, _)| t)
        .collect()
}

fn atom(op: AtomicOp, operand: &str) -> (AtomicOp, String) {
    (op, operand.to_string())
}

fn atoms(query: &Query) -> Vec<(AtomicOp, String)> {
    query
        .condition
        .as_ref()
        .map(|c| c.atoms().into_iter().map(|a| (a.op, a.operand.clone())).collect())
        .unwrap_or_default()
}

// ============================================================================
// Lexer tests
// ============================================================================

#[test]
fn test_lex_simple() {
    let tokens = kinds(r#"FIND LINES THAT CONTAINS "abc""#);
    assert_eq!(
        tokens,
        vec![
            Token::Keyword(Keyword::Find),
            Token::Keyword(Keyword::Lines),
            Token::Keyword(Keyword::That),
            Token::Keyword(Keyword::Contains),
            Token::Str("abc".to_string()),
        ]
    );
}

#[test]
fn test_lex_keywords_case_insensitive() {
    let tokens = kinds("find Lines tHaT starts WITH");
    assert_eq!(
        tokens,
        vec![
            Token::Keyword(Keyword::Find),
            Token::Keyword(Keyword::Lines),
            Token::Keyword(Keyword::That),
            Token::Keyword(Keyword::Starts),
            Token::Keyword(Keyword::With),
        ]
    );
}

#[test]
fn test_lex_singular_aliases() {
    let tokens = kinds("START END CONTAIN TIME");
    assert_eq!(
        tokens,
        vec![
            Token::Keyword(Keyword::Starts),
            Token::Keyword(Keyword::Ends),
            Token::Keyword(Keyword::Contains),
            Token::Keyword(Keyword::Times),
        ]
    );
}

#[test]
fn test_lex_string_preserves_whitespace_and_escapes() {
    let tokens = kinds(r#""a  b" "say \"hi\"" "ID:(\d+)""#);
    assert_eq!(
        tokens,
        vec![
            Token::Str("a  b".to_string()),
            Token::Str("say \"hi\"".to_string()),
            Token::Str(r"ID:(\d+)".to_string()),
        ]
    );
}

#[test]
fn test_lex_numbers_and_words() {
    let tokens = kinds("AT LEAST 12 TIMES frobnicate");
    assert_eq!(
        tokens,
        vec![
            Token::Keyword(Keyword::At),
            Token::Keyword(Keyword::Least),
            Token::Number("12".to_string()),
            Token::Keyword(Keyword::Times),
            Token::Word("frobnicate".to_string()),
        ]
    );
}

#[test]
fn test_lex_number_with_leading_zeros() {
    assert_eq!(
        kinds("EXACTLY 007"),
        vec![
            Token::Keyword(Keyword::Exactly),
            Token::Number("007".to_string()),
        ]
    );
    let q = parse(r#"FIND LINES THAT AT LEAST 007 TIMES "a""#).unwrap();
    assert_eq!(atoms(&q), vec![atom(AtomicOp::AtLeast(7), "a")]);
}

#[test]
fn test_lex_number_glued_to_word() {
    let err = tokenize(r#"FIND LINES THAT AT LEAST 2TIMES "a""#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lex);
}

#[test]
fn test_lex_spans() {
    let tokens = lexer().parse(r#"FIND "x y""#).unwrap();
    assert_eq!(tokens[0].1, 0..4);
    assert_eq!(tokens[1].1, 5..10);
}

#[test]
fn test_lex_unterminated_quote() {
    let err = tokenize(r#"FIND LINES THAT CONTAINS "abc"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lex);
}

#[test]
fn test_lex_invalid_character() {
    let err = tokenize("FIND LINES @ THAT").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Lex);
    assert_eq!(err.span().start, 11);
}

#[test]
fn test_lex_empty() {
    assert!(kinds("   ").is_empty());
}

// ============================================================================
// Condition tests
// ============================================================================

#[test]
fn test_parse_all_atomic_forms() {
    let q = parse(
        r#"FIND LINES THAT STARTS WITH "a" AND ENDS WITH "b" AND CONTAINS "c" AND REGEX "d+"
           AND AT LEAST 2 TIMES "e" AND AT MOST 3 TIMES "f" AND EXACTLY 4 TIMES "g"
           AND BETWEEN 1 AND 5 TIMES "h""#,
    )
    .unwrap();
    assert_eq!(
        atoms(&q),
        vec![
            atom(AtomicOp::StartsWith, "a"),
            atom(AtomicOp::EndsWith, "b"),
            atom(AtomicOp::Contains, "c"),
            atom(AtomicOp::Regex, "d+"),
            atom(AtomicOp::AtLeast(2), "e"),
            atom(AtomicOp::AtMost(3), "f"),
            atom(AtomicOp::Exactly(4), "g"),
            atom(AtomicOp::Between(1, 5), "h"),
        ]
    );
}

#[test]
fn test_combinators_fold_left_without_precedence() {
    let q = parse(r#"FIND LINES THAT CONTAINS "a" OR CONTAINS "b" AND CONTAINS "c""#).unwrap();
    match q.condition.unwrap() {
        Condition::Combine { op: Combinator::And, left, right } => {
            assert!(matches!(*left, Condition::Combine { op: Combinator::Or, .. }));
            assert!(matches!(*right, Condition::Atomic(_)));
        }
        other => panic!("Expected AND at the root, got {:?}", other),
    }
}

#[test]
fn test_exclusion_binds_to_preceding_term() {
    let q = parse(r#"FIND LINES THAT CONTAINS "a" AND CONTAINS "b" BUT NOT CONTAINS "c""#).unwrap();
    match q.condition.unwrap() {
        Condition::Combine { op: Combinator::And, left, right } => {
            assert!(matches!(*left, Condition::Atomic(_)));
            assert!(matches!(*right, Condition::Exclude { .. }));
        }
        other => panic!("Expected AND at the root, got {:?}", other),
    }
}

#[test]
fn test_except_is_exclusion() {
    let q = parse(r#"FIND LINES THAT CONTAINS "a" EXCEPT CONTAINS "b""#).unwrap();
    assert!(matches!(q.condition, Some(Condition::Exclude { .. })));
}

#[test]
fn test_chained_exclusions_fold_left() {
    let q = parse(r#"FIND LINES THAT CONTAINS "a" EXCEPT CONTAINS "b" EXCEPT CONTAINS "c""#)
        .unwrap();
    match q.condition.unwrap() {
        Condition::Exclude { base, .. } => {
            assert!(matches!(*base, Condition::Exclude { .. }));
        }
        other => panic!("Expected exclusion, got {:?}", other),
    }
}

#[test]
fn test_between_reversed_bounds_is_syntax_error() {
    let err = parse(r#"FIND LINES THAT BETWEEN 5 AND 2 TIMES "x""#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_between_equal_bounds() {
    let q = parse(r#"COUNT LINES THAT BETWEEN 3 AND 3 TIMES "x""#).unwrap();
    assert_eq!(atoms(&q), vec![atom(AtomicOp::Between(3, 3), "x")]);
}

#[test]
fn test_non_numeric_bound_is_syntax_error() {
    let err = parse(r#"FIND LINES THAT AT LEAST many TIMES "x""#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_empty_literal_is_syntax_error() {
    let err = parse(r#"FIND LINES THAT CONTAINS """#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_missing_literal_is_syntax_error() {
    let err = parse("FIND LINES THAT STARTS WITH").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_trailing_combinator_is_syntax_error() {
    let err = parse(r#"FIND LINES THAT CONTAINS "a" AND"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

// ============================================================================
// Query tests
// ============================================================================

#[test]
fn test_parse_find_query() {
    let q = parse(r#"FIND LINES THAT STARTS WITH "abc" AND ENDS WITH "xyz" IGNORE CASE"#).unwrap();
    assert_eq!(q.command, Command::Find);
    assert_eq!(q.target, Target::Lines);
    assert!(q.modifiers.ignore_case);
    assert!(!q.modifiers.whole_word);
    assert_eq!(
        atoms(&q),
        vec![atom(AtomicOp::StartsWith, "abc"), atom(AtomicOp::EndsWith, "xyz")]
    );
}

#[test]
fn test_target_defaults_to_lines() {
    let q = parse(r#"COUNT THAT CONTAINS "x""#).unwrap();
    assert_eq!(q.command, Command::Count);
    assert_eq!(q.target, Target::Lines);
}

#[test]
fn test_words_target() {
    let q = parse(r#"FIND WORDS THAT EXACTLY 2 TIMES "abc""#).unwrap();
    assert_eq!(q.target, Target::Words);
}

#[test]
fn test_from_overrides_target() {
    let q = parse(r#"FIND LINES THAT CONTAINS "x" FROM WORDS"#).unwrap();
    assert_eq!(q.target, Target::Words);
}

#[test]
fn test_query_without_condition_matches_everything() {
    let q = parse("FIND LINES").unwrap();
    assert!(q.condition.is_none());
}

#[test]
fn test_modifiers_any_order_and_idempotent() {
    let a = parse(r#"FIND LINES THAT CONTAINS "x" WHOLE WORD IGNORE CASE DOTALL"#).unwrap();
    let b = parse(r#"FIND LINES THAT CONTAINS "x" DOTALL IGNORE CASE WHOLE WORD IGNORE CASE"#)
        .unwrap();
    assert_eq!(a.modifiers, b.modifiers);
    assert!(a.modifiers.whole_word && a.modifiers.ignore_case && a.modifiers.dotall);
    assert!(!a.modifiers.multiline);
}

#[test]
fn test_modifiers_around_from() {
    let q = parse(r#"FIND THAT CONTAINS "x" MULTILINE FROM WORDS IGNORE CASE"#).unwrap();
    assert_eq!(q.target, Target::Words);
    assert!(q.modifiers.multiline && q.modifiers.ignore_case);
}

#[test]
fn test_parse_extract_query() {
    let q = parse(r#"EXTRACT REGEX "ID:(\d+)" FROM LINES THAT CONTAINS "ID:""#).unwrap();
    let capture = q.capture().expect("capture pattern");
    assert_eq!(capture.node, r"ID:(\d+)");
    assert_eq!(q.target, Target::Lines);
    assert_eq!(atoms(&q), vec![atom(AtomicOp::Contains, "ID:")]);
}

#[test]
fn test_parse_extract_bare_pattern() {
    let q = parse(r#"EXTRACT "(\w+)@" FROM WORDS THAT CONTAINS "@""#).unwrap();
    assert_eq!(q.capture().unwrap().node, r"(\w+)@");
    assert_eq!(q.target, Target::Words);
}

#[test]
fn test_extract_without_capture_is_syntax_error() {
    let err = parse(r#"EXTRACT FROM LINES THAT CONTAINS "ID:""#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "EXTRACT requires a capture pattern");
    assert_eq!(err.span(), Span::new(8, 12));
}

#[test]
fn test_extract_empty_capture_points_at_pattern() {
    let err = parse(r#"EXTRACT REGEX "" FROM LINES"#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.message(), "capture pattern is empty");
    assert_eq!(err.span(), Span::new(14, 16));
}

#[test]
fn test_find_never_carries_capture() {
    let q = parse(r#"FIND LINES THAT REGEX "(a)""#).unwrap();
    assert!(q.capture().is_none());
}

#[test]
fn test_unknown_command() {
    let err = parse(r#"SEARCH LINES THAT CONTAINS "x""#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.span().start, 0);
    assert!(err.message().contains("SEARCH"));
}

#[test]
fn test_unknown_target() {
    let err = parse(r#"FIND PARAGRAPHS THAT CONTAINS "x""#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_missing_that_is_syntax_error() {
    let err = parse(r#"FIND LINES CONTAINS "x""#).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
    assert_eq!(err.span().start, 11);
}

#[test]
fn test_empty_query() {
    let err = parse("").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Syntax);
}

#[test]
fn test_atomic_operand_span() {
    let q = parse(r#"FIND THAT CONTAINS "abc""#).unwrap();
    let atoms = q.condition.as_ref().unwrap().atoms();
    assert_eq!(atoms[0].span, Span::new(19, 24));
}

// ============================================================================
// Pretty printing
// ============================================================================

#[test]
fn test_pretty_print_canonical_form() {
    let q = parse(r#"find that contain "a\"b" except regex "\d+" from words whole word ignore case"#)
        .unwrap();
    assert_eq!(
        pretty_print(&q),
        r#"FIND WORDS THAT CONTAINS "a\"b" BUT NOT REGEX "\d+" IGNORE CASE WHOLE WORD"#
    );
}

#[test]
fn test_pretty_condition_chained_exclusion() {
    let q = parse(r#"COUNT THAT EXACTLY 2 TIMES "x" EXCEPT ENDS WITH "y" OR STARTS WITH "z""#).unwrap();
    assert_eq!(
        pretty_condition(q.condition.as_ref().unwrap()),
        r#"EXACTLY 2 TIMES "x" BUT NOT ENDS WITH "y" OR STARTS WITH "z""#
    );
}

#[test]
fn test_pretty_print_extract() {
    let q = parse(r#"EXTRACT "id=(\w+)" THAT CONTAINS "id=""#).unwrap();
    assert_eq!(
        pretty_print(&q),
        r#"EXTRACT REGEX "id=(\w+)" FROM LINES THAT CONTAINS "id=""#
    );
}
