use std::io::{BufRead, Write};
use std::rc::Rc;

use crate::error::{Error, ErrorKind, Result};
use crate::lexer::{Location, Token, TokenKind};
use crate::parser::Node;
use crate::runtime::builtins::Builtin;
use crate::runtime::environment::{Environment, FrameId};
use crate::runtime::value::{Function, Value, ValueKind};

/// Tree-walking evaluator for Lumen
///
/// Walks one AST node at a time against an environment of call frames.
/// The reader and writer are what `input` and `print` talk to, so tests
/// can drive whole programs against in-memory buffers.
///
/// Evaluation returns `Option<Value>`: constructs like `print(...)` or
/// an `if` with no matching case produce nothing, and only the driver
/// decides whether that is acceptable where the value surfaced.
pub struct Evaluator<R: BufRead, W: Write> {
    pub(crate) env: Environment,
    pub(crate) input: R,
    pub(crate) output: W,
}

impl<R: BufRead, W: Write> Evaluator<R, W> {
    /// Creates an evaluator whose root frame carries the source name
    /// and the pre-bound globals: `null`, `true`, `false`, and every
    /// built-in function.
    pub fn new(source_name: &str, input: R, output: W) -> Self {
        let mut env = Environment::new(source_name);
        let root = env.root();

        env.define(root, "null", Value::new(ValueKind::Number(0.0)));
        env.define(root, "true", Value::new(ValueKind::Boolean(true)));
        env.define(root, "false", Value::new(ValueKind::Boolean(false)));
        for builtin in Builtin::ALL {
            env.define(root, builtin.name(), Value::new(ValueKind::Builtin(builtin)));
        }

        Evaluator { env, input, output }
    }

    /// Evaluates one top-level unit in the root frame
    pub fn eval_unit(&mut self, node: &Node) -> Result<Option<Value>> {
        let root = self.env.root();
        self.eval_node(node, root)
    }

    fn eval_node(&mut self, node: &Node, frame: FrameId) -> Result<Option<Value>> {
        match node {
            Node::Number(tok) => self.eval_number(tok, frame).map(Some),
            Node::String(tok) => Ok(Some(Value::at(
                ValueKind::String(tok.text.clone()),
                Some(tok.loc.clone()),
                Some(frame),
            ))),
            Node::List { items, loc } => self.eval_list(items, loc, frame).map(Some),
            Node::VarAccess(tok) => self.eval_var_access(tok, frame).map(Some),
            Node::VarAssign { name, value, .. } => {
                self.eval_var_assign(name, value, frame).map(Some)
            }
            Node::BinaryOp { left, op, right } => {
                self.eval_binary(left, op, right, frame).map(Some)
            }
            Node::UnaryOp { op, operand } => self.eval_unary(op, operand, frame).map(Some),
            Node::If { cases, else_body } => self.eval_if(cases, else_body.as_deref(), frame),
            Node::While { cond, body, loc } => self.eval_while(cond, body, loc, frame).map(Some),
            Node::For {
                var,
                start,
                end,
                step,
                body,
                loc,
            } => self
                .eval_for(var, start, end, step.as_deref(), body, loc, frame)
                .map(Some),
            Node::FunctionDef {
                name,
                params,
                body,
                loc,
            } => Ok(Some(self.eval_function_def(
                name.as_ref(),
                params,
                body,
                loc,
                frame,
            ))),
            Node::FunctionCall { callee, args } => self.eval_call(callee, args, frame),
        }
    }

    /// Evaluates a node that must produce a value
    fn eval_value(&mut self, node: &Node, frame: FrameId) -> Result<Value> {
        match self.eval_node(node, frame)? {
            Some(value) => Ok(value),
            None => Err(self.fault(ErrorKind::NoValue, node.loc(), frame)),
        }
    }

    fn eval_number(&mut self, tok: &Token, frame: FrameId) -> Result<Value> {
        let n: f64 = tok
            .text
            .parse()
            .map_err(|_| self.fault(ErrorKind::InvalidNumber(tok.text.clone()), Some(&tok.loc), frame))?;
        Ok(Value::at(
            ValueKind::Number(n),
            Some(tok.loc.clone()),
            Some(frame),
        ))
    }

    fn eval_list(&mut self, items: &[Node], loc: &Location, frame: FrameId) -> Result<Value> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            values.push(self.eval_value(item, frame)?);
        }
        Ok(Value::at(
            ValueKind::list(values),
            Some(loc.clone()),
            Some(frame),
        ))
    }

    fn eval_var_access(&mut self, tok: &Token, frame: FrameId) -> Result<Value> {
        match self.env.lookup(frame, &tok.text) {
            Some(value) => {
                // blame the use site, not wherever the value was made
                let mut value = value.clone();
                value.loc = Some(tok.loc.clone());
                value.frame = Some(frame);
                Ok(value)
            }
            None => Err(self.fault(
                ErrorKind::UndefinedVariable(tok.text.clone()),
                Some(&tok.loc),
                frame,
            )),
        }
    }

    fn eval_var_assign(&mut self, name: &Token, value: &Node, frame: FrameId) -> Result<Value> {
        let value = self.eval_value(value, frame)?;
        self.env.define(frame, name.text.clone(), value.clone());
        Ok(value)
    }

    fn eval_binary(
        &mut self,
        left: &Node,
        op: &Token,
        right: &Node,
        frame: FrameId,
    ) -> Result<Value> {
        let left = self.eval_value(left, frame)?;
        let right = self.eval_value(right, frame)?;

        let kind = match op.kind {
            // equality works across every kind; mismatched kinds are
            // simply unequal, lists and functions compare by identity
            TokenKind::Eq => ValueKind::Boolean(values_equal(&left, &right)),
            TokenKind::NotEq => ValueKind::Boolean(!values_equal(&left, &right)),

            // logical operators are eager: both sides evaluate, the
            // result is the combined truthiness
            TokenKind::And => ValueKind::Boolean(left.is_truthy() && right.is_truthy()),
            TokenKind::Or => ValueKind::Boolean(left.is_truthy() || right.is_truthy()),

            TokenKind::Lt | TokenKind::Gt | TokenKind::LtEq | TokenKind::GtEq => {
                self.compare(&left, op, &right, frame)?
            }

            TokenKind::Slash => {
                let (l, r) = self.numeric_operands(&left, op, &right, frame)?;
                if r == 0.0 {
                    return Err(self.fault(
                        ErrorKind::DivisionByZero,
                        right.loc.as_ref(),
                        frame,
                    ));
                }
                ValueKind::Number(l / r)
            }

            TokenKind::Plus
            | TokenKind::Minus
            | TokenKind::Star
            | TokenKind::StarStar
            | TokenKind::Percent => {
                let (l, r) = self.numeric_operands(&left, op, &right, frame)?;
                ValueKind::Number(match op.kind {
                    TokenKind::Plus => l + r,
                    TokenKind::Minus => l - r,
                    TokenKind::Star => l * r,
                    TokenKind::StarStar => l.powf(r),
                    _ => l % r,
                })
            }

            // bitwise operators truncate to 64-bit integers; shift
            // counts are masked to the width
            TokenKind::Amp | TokenKind::Pipe | TokenKind::Caret | TokenKind::Shl
            | TokenKind::Shr => {
                let (l, r) = self.numeric_operands(&left, op, &right, frame)?;
                let (li, ri) = (l as i64, r as i64);
                let n = match op.kind {
                    TokenKind::Amp => li & ri,
                    TokenKind::Pipe => li | ri,
                    TokenKind::Caret => li ^ ri,
                    TokenKind::Shl => li.wrapping_shl((ri & 63) as u32),
                    _ => li.wrapping_shr((ri & 63) as u32),
                };
                ValueKind::Number(n as f64)
            }

            _ => {
                return Err(self.fault(
                    ErrorKind::InvalidOperation {
                        op: op.text.clone(),
                        left_type: left.type_name(),
                        right_type: right.type_name(),
                    },
                    Some(&op.loc),
                    frame,
                ))
            }
        };

        // results inherit the left operand's location
        Ok(Value::at(kind, left.loc.clone(), Some(frame)))
    }

    fn compare(
        &self,
        left: &Value,
        op: &Token,
        right: &Value,
        frame: FrameId,
    ) -> Result<ValueKind> {
        let outcome = match (&left.kind, &right.kind) {
            (ValueKind::Number(l), ValueKind::Number(r)) => match op.kind {
                TokenKind::Lt => l < r,
                TokenKind::Gt => l > r,
                TokenKind::LtEq => l <= r,
                _ => l >= r,
            },
            (ValueKind::String(l), ValueKind::String(r)) => match op.kind {
                TokenKind::Lt => l < r,
                TokenKind::Gt => l > r,
                TokenKind::LtEq => l <= r,
                _ => l >= r,
            },
            _ => {
                return Err(self.fault(
                    ErrorKind::InvalidOperation {
                        op: op.text.clone(),
                        left_type: left.type_name(),
                        right_type: right.type_name(),
                    },
                    Some(&op.loc),
                    frame,
                ))
            }
        };
        Ok(ValueKind::Boolean(outcome))
    }

    fn numeric_operands(
        &self,
        left: &Value,
        op: &Token,
        right: &Value,
        frame: FrameId,
    ) -> Result<(f64, f64)> {
        match (&left.kind, &right.kind) {
            (ValueKind::Number(l), ValueKind::Number(r)) => Ok((*l, *r)),
            _ => Err(self.fault(
                ErrorKind::InvalidOperation {
                    op: op.text.clone(),
                    left_type: left.type_name(),
                    right_type: right.type_name(),
                },
                Some(&op.loc),
                frame,
            )),
        }
    }

    fn eval_unary(&mut self, op: &Token, operand: &Node, frame: FrameId) -> Result<Value> {
        let value = self.eval_value(operand, frame)?;
        match op.kind {
            TokenKind::Minus => {
                let n = self.number_operand(&value, frame)?;
                Ok(Value::at(ValueKind::Number(-n), value.loc, Some(frame)))
            }
            TokenKind::Not => Ok(Value::at(
                ValueKind::Boolean(!value.is_truthy()),
                value.loc,
                Some(frame),
            )),
            TokenKind::Tilde => {
                let n = self.number_operand(&value, frame)?;
                Ok(Value::at(
                    ValueKind::Number(!(n as i64) as f64),
                    value.loc,
                    Some(frame),
                ))
            }
            // unary plus passes the value along untouched
            _ => Ok(value),
        }
    }

    fn eval_if(
        &mut self,
        cases: &[(Node, Node)],
        else_body: Option<&Node>,
        frame: FrameId,
    ) -> Result<Option<Value>> {
        for (cond, body) in cases {
            if self.eval_value(cond, frame)?.is_truthy() {
                return self.eval_node(body, frame);
            }
        }
        match else_body {
            Some(body) => self.eval_node(body, frame),
            None => Ok(None),
        }
    }

    fn eval_while(
        &mut self,
        cond: &Node,
        body: &Node,
        loc: &Location,
        frame: FrameId,
    ) -> Result<Value> {
        let mut results = Vec::new();
        while self.eval_value(cond, frame)?.is_truthy() {
            // the body shares the enclosing frame; bindings made in one
            // iteration are visible to the next
            if let Some(value) = self.eval_node(body, frame)? {
                results.push(value);
            }
        }
        Ok(Value::at(
            ValueKind::list(results),
            Some(loc.clone()),
            Some(frame),
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn eval_for(
        &mut self,
        var: &Token,
        start: &Node,
        end: &Node,
        step: Option<&Node>,
        body: &Node,
        loc: &Location,
        frame: FrameId,
    ) -> Result<Value> {
        let start = self.eval_value(start, frame)?;
        let start_n = self.number_operand(&start, frame)?;
        let end = self.eval_value(end, frame)?;
        let end_n = self.number_operand(&end, frame)?;
        let step_n = match step {
            Some(node) => {
                let step = self.eval_value(node, frame)?;
                self.number_operand(&step, frame)?
            }
            None => 1.0,
        };

        let mut results = Vec::new();
        let mut i = start_n;
        loop {
            // inclusive of the end value; the step's sign picks the
            // direction
            let more = if step_n >= 0.0 { i <= end_n } else { i >= end_n };
            if !more {
                break;
            }
            self.env.define(
                frame,
                var.text.clone(),
                Value::at(ValueKind::Number(i), Some(var.loc.clone()), Some(frame)),
            );
            if let Some(value) = self.eval_node(body, frame)? {
                results.push(value);
            }
            i += step_n;
        }

        Ok(Value::at(
            ValueKind::list(results),
            Some(loc.clone()),
            Some(frame),
        ))
    }

    fn eval_function_def(
        &mut self,
        name: Option<&Token>,
        params: &[Token],
        body: &Rc<Node>,
        loc: &Location,
        frame: FrameId,
    ) -> Value {
        let func = Function {
            name: name.map(|tok| tok.text.clone()),
            params: params.iter().map(|tok| tok.text.clone()).collect(),
            body: Rc::clone(body),
            captured: frame,
        };
        let value = Value::at(
            ValueKind::Function(Rc::new(func)),
            Some(loc.clone()),
            Some(frame),
        );
        if let Some(name) = name {
            self.env.define(frame, name.text.clone(), value.clone());
        }
        value
    }

    fn eval_call(&mut self, callee: &Node, args: &[Node], frame: FrameId) -> Result<Option<Value>> {
        let callee = self.eval_value(callee, frame)?;
        let mut values = Vec::with_capacity(args.len());
        for arg in args {
            values.push(self.eval_value(arg, frame)?);
        }

        match &callee.kind {
            ValueKind::Function(func) => {
                let func = Rc::clone(func);
                self.call_function(&func, values, callee.loc.clone(), frame)
            }
            ValueKind::Builtin(builtin) => {
                let builtin = *builtin;
                self.call_builtin(builtin, values, callee.loc.clone(), frame)
            }
            _ => Err(self.fault(
                ErrorKind::NotCallable(callee.type_name()),
                callee.loc.as_ref(),
                frame,
            )),
        }
    }

    fn call_function(
        &mut self,
        func: &Function,
        args: Vec<Value>,
        call_site: Option<Location>,
        caller: FrameId,
    ) -> Result<Option<Value>> {
        self.check_arity(
            func.display_name(),
            func.params.len(),
            args.len(),
            call_site.as_ref(),
            caller,
        )?;

        tracing::debug!(
            name = %func.display_name(),
            caller = %self.env.frame_name(caller),
            "entering function"
        );

        // the new frame's parent is the frame captured at definition,
        // which is what makes closures lexical
        let frame = self
            .env
            .push_frame(func.display_name(), func.captured, call_site);
        for (param, mut arg) in func.params.iter().zip(args) {
            arg.frame = Some(frame);
            self.env.define(frame, param.clone(), arg);
        }

        self.eval_node(&func.body, frame)
    }

    /// Exact-arity check shared by user functions and built-ins
    pub(crate) fn check_arity(
        &self,
        name: &str,
        expected: usize,
        got: usize,
        loc: Option<&Location>,
        frame: FrameId,
    ) -> Result<()> {
        if got > expected {
            return Err(self.fault(
                ErrorKind::TooManyArgs {
                    extra: got - expected,
                    name: name.to_string(),
                },
                loc,
                frame,
            ));
        }
        if got < expected {
            return Err(self.fault(
                ErrorKind::TooFewArgs {
                    missing: expected - got,
                    name: name.to_string(),
                },
                loc,
                frame,
            ));
        }
        Ok(())
    }

    pub(crate) fn number_operand(&self, value: &Value, frame: FrameId) -> Result<f64> {
        match value.kind {
            ValueKind::Number(n) => Ok(n),
            _ => Err(self.fault(
                ErrorKind::TypeMismatch {
                    expected: "number".to_string(),
                    got: value.type_name(),
                },
                value.loc.as_ref(),
                frame,
            )),
        }
    }

    pub(crate) fn fault(
        &self,
        kind: ErrorKind,
        loc: Option<&Location>,
        frame: FrameId,
    ) -> Error {
        let err = match loc {
            Some(loc) => Error::at(kind, loc.clone()),
            None => Error::new(kind),
        };
        err.with_frame(frame)
    }
}

/// Language-level equality: structural for scalars, identity for lists
/// and callables, mismatched kinds are unequal.
fn values_equal(left: &Value, right: &Value) -> bool {
    match (&left.kind, &right.kind) {
        (ValueKind::Number(l), ValueKind::Number(r)) => l == r,
        (ValueKind::String(l), ValueKind::String(r)) => l == r,
        (ValueKind::Boolean(l), ValueKind::Boolean(r)) => l == r,
        (ValueKind::List(l), ValueKind::List(r)) => Rc::ptr_eq(l, r),
        (ValueKind::Function(l), ValueKind::Function(r)) => Rc::ptr_eq(l, r),
        (ValueKind::Builtin(l), ValueKind::Builtin(r)) => l == r,
        _ => false,
    }
}
