//! Native functions bound into every root frame
//!
//! Built-ins are arity-checked and parameter-bound exactly like user
//! functions; the implementations then read their arguments back out of
//! the call frame's scope table.

use std::cell::RefCell;
use std::io::{BufRead, Write};
use std::rc::Rc;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{Error, ErrorKind, Result};
use crate::lexer::Location;
use crate::runtime::environment::FrameId;
use crate::runtime::evaluator::Evaluator;
use crate::runtime::value::{Value, ValueKind};

lazy_static! {
    /// Validity pattern for `number`: optional sign, digits, optional
    /// fractional digits. Wider than the lexer's integer-only literal
    /// grammar on purpose.
    static ref NUMBER_RE: Regex = Regex::new(r"^[+-]?[0-9]+(\.[0-9]+)?$").unwrap();
}

/// Identifies one native function
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// Write a value's raw form and a newline
    Print,
    /// Write a prompt, read one line
    Input,
    /// Parse text into a number
    Number,
    /// Render a value as a string
    String,
    /// Index into a list
    At,
    /// Join two lists into a new one
    Concat,
    /// Append to a list in place
    Push,
}

impl Builtin {
    /// Every built-in, in registration order
    pub const ALL: [Builtin; 7] = [
        Builtin::Print,
        Builtin::Input,
        Builtin::Number,
        Builtin::String,
        Builtin::At,
        Builtin::Concat,
        Builtin::Push,
    ];

    /// Name the built-in is bound under
    pub fn name(&self) -> &'static str {
        match self {
            Builtin::Print => "print",
            Builtin::Input => "input",
            Builtin::Number => "number",
            Builtin::String => "string",
            Builtin::At => "at",
            Builtin::Concat => "concat",
            Builtin::Push => "push",
        }
    }

    /// Declared parameter names; the arity is this list's length
    pub fn params(&self) -> &'static [&'static str] {
        match self {
            Builtin::Print => &["value"],
            Builtin::Input => &["prompt"],
            Builtin::Number => &["text"],
            Builtin::String => &["value"],
            Builtin::At => &["list", "index"],
            Builtin::Concat => &["left", "right"],
            Builtin::Push => &["list", "value"],
        }
    }
}

impl<R: BufRead, W: Write> Evaluator<R, W> {
    /// Invokes a built-in: arity check, frame setup, parameter binding,
    /// then the native implementation
    pub(crate) fn call_builtin(
        &mut self,
        builtin: Builtin,
        args: Vec<Value>,
        call_site: Option<Location>,
        caller: FrameId,
    ) -> Result<Option<Value>> {
        let params = builtin.params();
        self.check_arity(
            builtin.name(),
            params.len(),
            args.len(),
            call_site.as_ref(),
            caller,
        )?;

        // built-ins have no captured frame; their parent is the caller
        let frame = self.env.push_frame(builtin.name(), caller, call_site.clone());
        for (param, mut arg) in params.iter().zip(args) {
            arg.frame = Some(frame);
            self.env.define(frame, *param, arg);
        }

        match builtin {
            Builtin::Print => self.builtin_print(frame),
            Builtin::Input => self.builtin_input(frame, call_site),
            Builtin::Number => self.builtin_number(frame, call_site),
            Builtin::String => self.builtin_string(frame, call_site),
            Builtin::At => self.builtin_at(frame),
            Builtin::Concat => self.builtin_concat(frame, call_site),
            Builtin::Push => self.builtin_push(frame),
        }
    }

    /// Reads a bound parameter back out of the call frame
    fn builtin_arg(&self, frame: FrameId, name: &str) -> Result<Value> {
        self.env
            .lookup(frame, name)
            .cloned()
            .ok_or_else(|| Error::new(ErrorKind::UndefinedVariable(name.to_string())))
    }

    fn builtin_print(&mut self, frame: FrameId) -> Result<Option<Value>> {
        let value = self.builtin_arg(frame, "value")?;
        writeln!(self.output, "{}", value.to_string_value())
            .map_err(|e| Error::new(ErrorKind::Io(e.to_string())).with_frame(frame))?;
        Ok(None)
    }

    fn builtin_input(
        &mut self,
        frame: FrameId,
        call_site: Option<Location>,
    ) -> Result<Option<Value>> {
        let prompt = self.builtin_arg(frame, "prompt")?;
        let io_fault =
            |e: std::io::Error| Error::new(ErrorKind::Io(e.to_string())).with_frame(frame);

        write!(self.output, "{}", prompt.to_string_value()).map_err(io_fault)?;
        self.output.flush().map_err(io_fault)?;

        let mut line = String::new();
        self.input.read_line(&mut line).map_err(io_fault)?;
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }

        Ok(Some(Value::at(
            ValueKind::String(line),
            call_site,
            Some(frame),
        )))
    }

    fn builtin_number(
        &mut self,
        frame: FrameId,
        call_site: Option<Location>,
    ) -> Result<Option<Value>> {
        let value = self.builtin_arg(frame, "text")?;
        match &value.kind {
            // numbers pass through unchanged
            ValueKind::Number(_) => Ok(Some(value)),
            ValueKind::String(text) => {
                if !NUMBER_RE.is_match(text) {
                    return Err(self.fault(
                        ErrorKind::InvalidNumber(text.clone()),
                        value.loc.as_ref(),
                        frame,
                    ));
                }
                let n: f64 = text.parse().map_err(|_| {
                    self.fault(
                        ErrorKind::InvalidNumber(text.clone()),
                        value.loc.as_ref(),
                        frame,
                    )
                })?;
                Ok(Some(Value::at(
                    ValueKind::Number(n),
                    call_site,
                    Some(frame),
                )))
            }
            _ => Err(self.fault(
                ErrorKind::TypeMismatch {
                    expected: "string".to_string(),
                    got: value.type_name(),
                },
                value.loc.as_ref(),
                frame,
            )),
        }
    }

    fn builtin_string(
        &mut self,
        frame: FrameId,
        call_site: Option<Location>,
    ) -> Result<Option<Value>> {
        let value = self.builtin_arg(frame, "value")?;
        match &value.kind {
            ValueKind::Function(_) | ValueKind::Builtin(_) => Err(self.fault(
                ErrorKind::NotStringifiable(value.type_name()),
                value.loc.as_ref(),
                frame,
            )),
            _ => Ok(Some(Value::at(
                ValueKind::String(value.to_string_value()),
                call_site,
                Some(frame),
            ))),
        }
    }

    fn builtin_at(&mut self, frame: FrameId) -> Result<Option<Value>> {
        let list = self.builtin_arg(frame, "list")?;
        let index = self.builtin_arg(frame, "index")?;

        let items = self.list_operand(&list, frame)?;
        let n = self.number_operand(&index, frame)?;
        let idx = n.trunc() as i64;

        let items = items.borrow();
        if idx < 0 || idx as usize >= items.len() {
            return Err(self.fault(
                ErrorKind::IndexOutOfRange {
                    index: idx,
                    length: items.len(),
                },
                index.loc.as_ref(),
                frame,
            ));
        }
        Ok(Some(items[idx as usize].clone()))
    }

    fn builtin_concat(
        &mut self,
        frame: FrameId,
        call_site: Option<Location>,
    ) -> Result<Option<Value>> {
        let left = self.builtin_arg(frame, "left")?;
        let right = self.builtin_arg(frame, "right")?;

        let left_items = self.list_operand(&left, frame)?;
        let right_items = self.list_operand(&right, frame)?;

        let mut joined = left_items.borrow().clone();
        joined.extend(right_items.borrow().iter().cloned());

        Ok(Some(Value::at(
            ValueKind::list(joined),
            call_site,
            Some(frame),
        )))
    }

    fn builtin_push(&mut self, frame: FrameId) -> Result<Option<Value>> {
        let list = self.builtin_arg(frame, "list")?;
        let value = self.builtin_arg(frame, "value")?;

        self.list_operand(&list, frame)?.borrow_mut().push(value);

        // hand back the same list so pushes chain
        Ok(Some(list))
    }

    fn list_operand<'v>(
        &self,
        value: &'v Value,
        frame: FrameId,
    ) -> Result<&'v Rc<RefCell<Vec<Value>>>> {
        match &value.kind {
            ValueKind::List(items) => Ok(items),
            _ => Err(self.fault(
                ErrorKind::TypeMismatch {
                    expected: "list".to_string(),
                    got: value.type_name(),
                },
                value.loc.as_ref(),
                frame,
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Scanner;
    use crate::parser::Parser;
    use std::io::Cursor;

    /// Runs a program against the given input, returning the unit
    /// values and everything written to the output stream.
    fn run(source: &str, input: &str) -> Result<(Vec<Option<Value>>, String)> {
        let mut parser = Parser::new(Scanner::new("test.lum", source))?;
        let mut evaluator = Evaluator::new(
            "test.lum",
            Cursor::new(input.as_bytes().to_vec()),
            Vec::new(),
        );
        let mut values = Vec::new();
        while let Some(node) = parser.parse_unit()? {
            values.push(evaluator.eval_unit(&node)?);
        }
        let output = String::from_utf8(evaluator.output).unwrap();
        Ok((values, output))
    }

    fn last_value(source: &str) -> Value {
        let (values, _) = run(source, "").unwrap();
        values.into_iter().next_back().flatten().unwrap()
    }

    fn run_err(source: &str) -> Error {
        run(source, "").unwrap_err()
    }

    fn number(n: f64) -> Value {
        Value::new(ValueKind::Number(n))
    }

    #[test]
    fn test_registry_names_and_arities() {
        assert_eq!(Builtin::ALL.len(), 7);
        assert_eq!(Builtin::Print.name(), "print");
        assert_eq!(Builtin::Print.params(), &["value"]);
        assert_eq!(Builtin::At.params().len(), 2);
        assert_eq!(Builtin::Concat.params(), &["left", "right"]);
    }

    #[test]
    fn test_print_writes_raw_form() {
        let (values, output) = run("print(\"hello\")\nprint(1 + 1)", "").unwrap();
        assert_eq!(output, "hello\n2\n");
        // print produces no value
        assert_eq!(values, vec![None, None]);
    }

    #[test]
    fn test_print_renders_lists_structurally() {
        let (_, output) = run("print([1, \"two\", true])", "").unwrap();
        assert_eq!(output, "[1, \"two\", true]\n");
    }

    #[test]
    fn test_input_prompts_and_reads_one_line() {
        let (values, output) = run("input(\"name? \")", "alice\nrest").unwrap();
        assert_eq!(output, "name? ");
        assert_eq!(
            values[0],
            Some(Value::new(ValueKind::String("alice".to_string())))
        );
    }

    #[test]
    fn test_input_strips_carriage_return() {
        let (values, _) = run("input(\"\")", "alice\r\n").unwrap();
        assert_eq!(
            values[0],
            Some(Value::new(ValueKind::String("alice".to_string())))
        );
    }

    #[test]
    fn test_number_parses_signed_decimals() {
        assert_eq!(last_value("number(\"42\")"), number(42.0));
        assert_eq!(last_value("number(\"-3.5\")"), number(-3.5));
        assert_eq!(last_value("number(\"+7\")"), number(7.0));
    }

    #[test]
    fn test_number_passes_numbers_through() {
        assert_eq!(last_value("number(5)"), number(5.0));
    }

    #[test]
    fn test_number_rejects_invalid_text() {
        let err = run_err("number(\"12a\")");
        assert_eq!(err.kind, ErrorKind::InvalidNumber("12a".to_string()));

        let err = run_err("number(\"\")");
        assert_eq!(err.kind, ErrorKind::InvalidNumber(String::new()));

        let err = run_err("number(\"1.\")");
        assert_eq!(err.kind, ErrorKind::InvalidNumber("1.".to_string()));
    }

    #[test]
    fn test_number_rejects_non_strings() {
        let err = run_err("number([1])");
        assert_eq!(
            err.kind,
            ErrorKind::TypeMismatch {
                expected: "string".to_string(),
                got: "list".to_string()
            }
        );
    }

    #[test]
    fn test_string_renders_values() {
        assert_eq!(
            last_value("string(42)"),
            Value::new(ValueKind::String("42".to_string()))
        );
        assert_eq!(
            last_value("string(true)"),
            Value::new(ValueKind::String("true".to_string()))
        );
        assert_eq!(
            last_value("string([1, 2])"),
            Value::new(ValueKind::String("[1, 2]".to_string()))
        );
    }

    #[test]
    fn test_string_refuses_callables() {
        let err = run_err("string(print)");
        assert_eq!(
            err.kind,
            ErrorKind::NotStringifiable("built-in function".to_string())
        );

        let err = run_err("string(function() 1 end)");
        assert_eq!(err.kind, ErrorKind::NotStringifiable("function".to_string()));
    }

    #[test]
    fn test_at_indexes_lists() {
        assert_eq!(last_value("at([10, 20, 30], 1)"), number(20.0));
        // fractional indexes truncate
        assert_eq!(last_value("at([10, 20, 30], 5 / 2)"), number(30.0));
    }

    #[test]
    fn test_at_range_errors() {
        let err = run_err("at([1, 2], 2)");
        assert_eq!(
            err.kind,
            ErrorKind::IndexOutOfRange {
                index: 2,
                length: 2
            }
        );

        let err = run_err("at([1, 2], 0 - 1)");
        assert_eq!(
            err.kind,
            ErrorKind::IndexOutOfRange {
                index: -1,
                length: 2
            }
        );
    }

    #[test]
    fn test_at_requires_a_list() {
        let err = run_err("at(5, 0)");
        assert_eq!(
            err.kind,
            ErrorKind::TypeMismatch {
                expected: "list".to_string(),
                got: "number".to_string()
            }
        );
    }

    #[test]
    fn test_concat_builds_a_new_list() {
        let source = "var a = [1]\nvar b = [2]\nvar c = concat(a, b)\npush(a, 9)\nc";
        assert_eq!(
            last_value(source),
            Value::new(ValueKind::list(vec![number(1.0), number(2.0)]))
        );
    }

    #[test]
    fn test_push_mutates_through_aliases() {
        let source = "var a = [1, 2]\nvar b = a\npush(b, 3)\na";
        assert_eq!(
            last_value(source),
            Value::new(ValueKind::list(vec![
                number(1.0),
                number(2.0),
                number(3.0)
            ]))
        );
    }

    #[test]
    fn test_push_returns_the_same_list() {
        // the returned alias observes later pushes to the original
        let source = "var a = [1]\nvar b = push(a, 2)\npush(a, 3)\nb == a";
        assert_eq!(
            last_value(source),
            Value::new(ValueKind::Boolean(true))
        );
    }

    #[test]
    fn test_builtin_arity_is_exact() {
        let err = run_err("print(1, 2)");
        assert_eq!(
            err.kind,
            ErrorKind::TooManyArgs {
                extra: 1,
                name: "print".to_string()
            }
        );

        let err = run_err("at([1])");
        assert_eq!(
            err.kind,
            ErrorKind::TooFewArgs {
                missing: 1,
                name: "at".to_string()
            }
        );
    }

    #[test]
    fn test_builtins_are_first_class() {
        let source = "var shout = print\nshout(\"hi\")";
        let (_, output) = run(source, "").unwrap();
        assert_eq!(output, "hi\n");
    }
}
