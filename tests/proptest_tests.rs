//! Property-based tests for the scanner, parser, and evaluator
//!
//! These use proptest to check that:
//! 1. The scanner and parser never panic, whatever the input
//! 2. String literals survive a scan round trip
//! 3. Evaluation agrees with host arithmetic and is deterministic

use std::io::Cursor;

use lumen::{Evaluator, Parser, Scanner, Token, TokenKind, Value, ValueKind};
use proptest::prelude::*;

fn eval_last(source: &str) -> Option<Value> {
    let mut parser = Parser::new(Scanner::new("test.lum", source)).ok()?;
    let mut evaluator = Evaluator::new("test.lum", Cursor::new(Vec::new()), Vec::new());
    let mut last = None;
    while let Some(node) = parser.parse_unit().ok()? {
        last = evaluator.eval_unit(&node).ok()?;
    }
    last
}

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

/// Tokens that look like Lumen source elements
fn token_soup() -> impl Strategy<Value = String> {
    let word = prop_oneof![
        Just("var".to_string()),
        Just("if".to_string()),
        Just("then".to_string()),
        Just("elif".to_string()),
        Just("else".to_string()),
        Just("while".to_string()),
        Just("for".to_string()),
        Just("do".to_string()),
        Just("function".to_string()),
        Just("end".to_string()),
        Just("+".to_string()),
        Just("-".to_string()),
        Just("*".to_string()),
        Just("/".to_string()),
        Just("**".to_string()),
        Just("==".to_string()),
        Just("=".to_string()),
        Just("(".to_string()),
        Just(")".to_string()),
        Just("[".to_string()),
        Just("]".to_string()),
        Just(",".to_string()),
        Just("\n".to_string()),
        (0u32..1000).prop_map(|n| n.to_string()),
        "[a-z][a-z0-9_]{0,8}".prop_map(|s| s),
        "\"[a-zA-Z0-9 ]{0,12}\"".prop_map(|s| s),
    ];
    prop::collection::vec(word, 0..40).prop_map(|tokens| tokens.join(" "))
}

/// Fully parenthesized arithmetic alongside its host-computed value
fn arith_tree() -> impl Strategy<Value = (String, f64)> {
    let leaf = (0i32..100).prop_map(|n| (n.to_string(), f64::from(n)));
    leaf.prop_recursive(3, 24, 2, |inner| {
        (inner.clone(), 0usize..3, inner).prop_map(|((ls, lv), op, (rs, rv))| match op {
            0 => (format!("({} + {})", ls, rs), lv + rv),
            1 => (format!("({} - {})", ls, rs), lv - rv),
            _ => (format!("({} * {})", ls, rs), lv * rv),
        })
    })
}

// =============================================================================
// SCANNER AND PARSER ROBUSTNESS
// =============================================================================

proptest! {
    /// The scanner should never panic on arbitrary printable input
    #[test]
    fn scanner_never_panics(source in r"[ -~\n\t]{0,300}") {
        let _ = Scanner::new("test.lum", &source).tokenize();
    }

    /// The parser should never panic on token-shaped soup
    #[test]
    fn parser_never_panics(source in token_soup()) {
        if let Ok(mut parser) = Parser::new(Scanner::new("test.lum", &source)) {
            let _ = parser.parse_all();
        }
    }

    /// String literal bodies survive escaping and rescanning
    #[test]
    fn string_literals_round_trip(body in "[a-zA-Z0-9 \n\r\"]{0,30}") {
        let escaped = body
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r");
        let literal = format!("\"{}\"", escaped);

        let tokens = Scanner::new("test.lum", &literal).tokenize().unwrap();
        prop_assert_eq!(tokens.len(), 1);
        prop_assert_eq!(tokens[0].text.clone(), body);
    }

    /// Re-rendering every token's literal and scanning again reproduces
    /// the same kinds and texts
    #[test]
    fn tokens_round_trip_through_rendering(source in token_soup()) {
        if let Ok(tokens) = Scanner::new("test.lum", &source).tokenize() {
            let rendered = tokens
                .iter()
                .map(|tok| match tok.kind {
                    // a scanned string body never holds a backslash, so
                    // re-escaping the three supported characters is exact
                    TokenKind::String => format!(
                        "\"{}\"",
                        tok.text
                            .replace('"', "\\\"")
                            .replace('\n', "\\n")
                            .replace('\r', "\\r")
                    ),
                    _ => tok.text.clone(),
                })
                .collect::<Vec<_>>()
                .join(" ");

            let rescanned = Scanner::new("test.lum", &rendered).tokenize().unwrap();
            let shapes = |tokens: &[Token]| {
                tokens
                    .iter()
                    .map(|tok| (tok.kind, tok.text.clone()))
                    .collect::<Vec<_>>()
            };
            prop_assert_eq!(shapes(&tokens), shapes(&rescanned));
        }
    }
}

// =============================================================================
// EVALUATION PROPERTIES
// =============================================================================

proptest! {
    /// Grouped arithmetic matches the same operations run on host floats
    #[test]
    fn arithmetic_matches_host((source, expected) in arith_tree()) {
        let value = eval_last(&source).unwrap();
        prop_assert_eq!(value, Value::new(ValueKind::Number(expected)));
    }

    /// Running the same program twice gives the same value
    #[test]
    fn evaluation_is_deterministic((source, _) in arith_tree()) {
        prop_assert_eq!(eval_last(&source), eval_last(&source));
    }

    /// number() agrees with Rust's float parsing on signed integers
    #[test]
    fn number_parses_signed_integers(n in -1_000_000i64..1_000_000) {
        let source = format!("number(\"{}\")", n);
        let value = eval_last(&source).unwrap();
        prop_assert_eq!(value, Value::new(ValueKind::Number(n as f64)));
    }

    /// A default-step for loop visits every integer in the range
    #[test]
    fn for_loop_length_matches_range(start in -20i32..20, end in -20i32..20) {
        let source = format!("for i = {}, {} do i end", start, end);
        let expected = if start <= end { (end - start + 1) as usize } else { 0 };

        let value = eval_last(&source).unwrap();
        match &value.kind {
            ValueKind::List(items) => prop_assert_eq!(items.borrow().len(), expected),
            other => prop_assert!(false, "expected a list, got {:?}", other),
        }
    }
}

// =============================================================================
// SPECIFIC REGRESSION CASES
// =============================================================================

#[test]
fn regression_empty_input() {
    let mut parser = Parser::new(Scanner::new("test.lum", "")).unwrap();
    assert!(parser.parse_unit().unwrap().is_none());
}

#[test]
fn regression_only_newlines() {
    let mut parser = Parser::new(Scanner::new("test.lum", "\n\n\n")).unwrap();
    assert!(parser.parse_unit().unwrap().is_none());
}

#[test]
fn regression_very_long_number() {
    let source = "9".repeat(400);
    let value = eval_last(&source).unwrap();
    // overflows to infinity rather than failing
    assert_eq!(value, Value::new(ValueKind::Number(f64::INFINITY)));
}

#[test]
fn regression_very_long_string() {
    let body = "a".repeat(100_000);
    let source = format!("\"{}\"", body);
    let value = eval_last(&source).unwrap();
    assert_eq!(value.to_string_value(), body);
}

#[test]
fn regression_deep_grouping() {
    let source = format!("{}1{}", "(".repeat(200), ")".repeat(200));
    assert_eq!(
        eval_last(&source).unwrap(),
        Value::new(ValueKind::Number(1.0))
    );
}
