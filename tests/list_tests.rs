//! Tests for list construction, shared-reference semantics, and the
//! list built-ins working together

use std::io::Cursor;

use lumen::{Error, Evaluator, Parser, Scanner, Value, ValueKind};

fn eval_source(source: &str) -> Result<Vec<Option<Value>>, Error> {
    let mut parser = Parser::new(Scanner::new("test.lum", source))?;
    let mut evaluator = Evaluator::new("test.lum", Cursor::new(Vec::new()), Vec::new());
    let mut values = Vec::new();
    while let Some(node) = parser.parse_unit()? {
        values.push(evaluator.eval_unit(&node)?);
    }
    Ok(values)
}

fn eval_last(source: &str) -> Value {
    eval_source(source)
        .unwrap()
        .into_iter()
        .next_back()
        .flatten()
        .unwrap()
}

fn number(n: f64) -> Value {
    Value::new(ValueKind::Number(n))
}

fn boolean(b: bool) -> Value {
    Value::new(ValueKind::Boolean(b))
}

fn numbers(ns: &[f64]) -> Value {
    Value::new(ValueKind::list(ns.iter().map(|&n| number(n)).collect()))
}

// ====================
// Construction
// ====================

#[test]
fn test_elements_evaluate_in_order() {
    let source = "var n = 1\n[n, n + 1, n + 2]";
    assert_eq!(eval_last(source), numbers(&[1.0, 2.0, 3.0]));
}

#[test]
fn test_lists_nest() {
    let expected = Value::new(ValueKind::list(vec![numbers(&[1.0]), numbers(&[2.0, 3.0])]));
    assert_eq!(eval_last("[[1], [2, 3]]"), expected);
}

#[test]
fn test_literals_span_lines() {
    assert_eq!(eval_last("[\n  1,\n  2,\n  3\n]"), numbers(&[1.0, 2.0, 3.0]));
}

// ====================
// Reference semantics
// ====================

#[test]
fn test_assignment_aliases_the_same_list() {
    let source = "var a = [1]\nvar b = a\npush(b, 2)\nat(a, 1)";
    assert_eq!(eval_last(source), number(2.0));
}

#[test]
fn test_equality_is_identity() {
    assert_eq!(eval_last("[1] == [1]"), boolean(false));
    assert_eq!(eval_last("var a = [1]\na == a"), boolean(true));
    assert_eq!(eval_last("var a = [1]\nvar b = a\na == b"), boolean(true));
}

#[test]
fn test_functions_mutate_the_callers_list() {
    let source = "function add_to(xs) push(xs, 9) end\nvar a = [1]\nadd_to(a)\na";
    assert_eq!(eval_last(source), numbers(&[1.0, 9.0]));
}

#[test]
fn test_nested_lists_share_too() {
    let source = "var inner = [1]\nvar outer = [inner]\npush(inner, 2)\nat(outer, 0)";
    assert_eq!(eval_last(source), numbers(&[1.0, 2.0]));
}

#[test]
fn test_list_containing_itself_renders_a_placeholder() {
    // pushing a list into itself is legal; rendering marks the revisit
    let source = "var a = [1]\npush(a, a)";
    assert_eq!(eval_last(source).to_string_value(), "[1, [...]]");
}

#[test]
fn test_mutually_referential_lists_render() {
    let source = "var a = []\nvar b = [a]\npush(a, b)";
    assert_eq!(eval_last(source).to_string_value(), "[[[...]]]");
}

#[test]
fn test_repeated_sublists_render_each_occurrence() {
    let source = "var inner = [1]\n[inner, inner]";
    assert_eq!(eval_last(source).to_string_value(), "[[1], [1]]");
}

// ====================
// at / concat / push together
// ====================

#[test]
fn test_nested_indexing() {
    let source = "var m = [[1, 2], [3, 4]]\nat(at(m, 1), 0)";
    assert_eq!(eval_last(source), number(3.0));
}

#[test]
fn test_concat_leaves_operands_alone() {
    let source = "var a = [1]\nvar b = [2]\nvar c = concat(a, b)\npush(c, 3)\na";
    assert_eq!(eval_last(source), numbers(&[1.0]));
}

#[test]
fn test_push_chains_through_its_return() {
    let source = "var a = []\npush(push(a, 1), 2)\na";
    assert_eq!(eval_last(source), numbers(&[1.0, 2.0]));
}

#[test]
fn test_building_a_list_in_a_loop() {
    let source = "var squares = []\nfor i = 1, 4 do push(squares, i * i) end\nsquares";
    assert_eq!(eval_last(source), numbers(&[1.0, 4.0, 9.0, 16.0]));
}

#[test]
fn test_loop_over_list_by_index() {
    let source =
        "var xs = [10, 20, 30]\nvar total = 0\nfor i = 0, 2 do var total = total + at(xs, i) end\ntotal";
    assert_eq!(eval_last(source), number(60.0));
}

#[test]
fn test_loops_can_yield_lists() {
    let source = "for i = 1, 3 do [i] end";
    let expected = Value::new(ValueKind::list(vec![
        numbers(&[1.0]),
        numbers(&[2.0]),
        numbers(&[3.0]),
    ]));
    assert_eq!(eval_last(source), expected);
}
