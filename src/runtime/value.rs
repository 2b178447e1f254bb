use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::lexer::Location;
use crate::parser::Node;
use crate::runtime::builtins::Builtin;
use crate::runtime::environment::FrameId;

/// Runtime value: a payload plus the provenance diagnostics blame
///
/// The location is wherever the value came into being (or was last
/// accessed); the frame seeds the backtrace when an operation on the
/// value fails. Neither takes part in equality.
#[derive(Debug, Clone)]
pub struct Value {
    /// The payload
    pub kind: ValueKind,
    /// Originating location, if the value arose from source text
    pub loc: Option<Location>,
    /// Frame the value currently belongs to
    pub frame: Option<FrameId>,
}

/// Value payload representation
#[derive(Debug, Clone)]
pub enum ValueKind {
    /// 64-bit floating-point number
    Number(f64),
    /// String value
    String(String),
    /// Boolean value
    Boolean(bool),
    /// Mutable list, shared by reference: rebinding or passing a list
    /// aliases the same underlying sequence
    List(Rc<RefCell<Vec<Value>>>),
    /// User-defined function (closure)
    Function(Rc<Function>),
    /// Native function provided by the runtime
    Builtin(Builtin),
}

/// A user-defined function together with its captured frame
#[derive(Debug)]
pub struct Function {
    /// Display name; None for anonymous functions
    pub name: Option<String>,
    /// Parameter names in declaration order
    pub params: Vec<String>,
    /// Body expression, shared with the defining AST
    pub body: Rc<Node>,
    /// Frame active at the definition site
    pub captured: FrameId,
}

impl Function {
    /// Name shown in arity errors and diagnostics
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<anonymous>")
    }
}

impl Value {
    /// Creates a value with no recorded provenance
    pub fn new(kind: ValueKind) -> Self {
        Value {
            kind,
            loc: None,
            frame: None,
        }
    }

    /// Creates a value stamped with a location and owning frame
    pub fn at(kind: ValueKind, loc: Option<Location>, frame: Option<FrameId>) -> Self {
        Value { kind, loc, frame }
    }

    /// Returns the type name as a string
    pub fn type_name(&self) -> String {
        match &self.kind {
            ValueKind::Number(_) => "number".to_string(),
            ValueKind::String(_) => "string".to_string(),
            ValueKind::Boolean(_) => "boolean".to_string(),
            ValueKind::List(_) => "list".to_string(),
            ValueKind::Function(_) => "function".to_string(),
            ValueKind::Builtin(_) => "built-in function".to_string(),
        }
    }

    /// Returns true if the value is truthy in a condition
    pub fn is_truthy(&self) -> bool {
        match &self.kind {
            ValueKind::Number(n) => *n != 0.0,
            ValueKind::String(s) => !s.is_empty(),
            ValueKind::Boolean(b) => *b,
            ValueKind::List(items) => !items.borrow().is_empty(),
            ValueKind::Function(_) => true,
            ValueKind::Builtin(_) => true,
        }
    }

    /// Raw string rendering: strings come out unquoted
    ///
    /// This is what `print` and the unit echo emit; `Display` is the
    /// structural form used inside lists.
    pub fn to_string_value(&self) -> String {
        match &self.kind {
            ValueKind::String(s) => s.clone(),
            _ => self.to_string(),
        }
    }
}

/// Raw pointer to a list's shared storage, used as an identity key
type ListPtr = *const RefCell<Vec<Value>>;

impl ValueKind {
    /// Creates a fresh list payload from a vector of values
    pub fn list(items: Vec<Value>) -> Self {
        ValueKind::List(Rc::new(RefCell::new(items)))
    }

    /// Writes the structural form
    ///
    /// `open` holds the lists currently being rendered; a list reached
    /// again while still open prints as `[...]`.
    fn render(&self, f: &mut fmt::Formatter<'_>, open: &mut Vec<ListPtr>) -> fmt::Result {
        match self {
            ValueKind::Number(n) => write!(f, "{}", n),
            ValueKind::String(s) => write!(f, "\"{}\"", s),
            ValueKind::Boolean(b) => write!(f, "{}", b),
            ValueKind::List(items) => {
                let ptr = Rc::as_ptr(items);
                if open.contains(&ptr) {
                    return write!(f, "[...]");
                }
                open.push(ptr);
                write!(f, "[")?;
                for (i, item) in items.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    item.kind.render(f, open)?;
                }
                open.pop();
                write!(f, "]")
            }
            ValueKind::Function(func) => match &func.name {
                Some(name) => write!(f, "<function {}>", name),
                None => write!(f, "<function>"),
            },
            ValueKind::Builtin(builtin) => write!(f, "<built-in function {}>", builtin.name()),
        }
    }

    /// Structural comparison
    ///
    /// `seen` holds the list pairs already under comparison; a pair
    /// reached again compares equal.
    fn equals(&self, other: &ValueKind, seen: &mut Vec<(ListPtr, ListPtr)>) -> bool {
        match (self, other) {
            (ValueKind::Number(a), ValueKind::Number(b)) => a == b,
            (ValueKind::String(a), ValueKind::String(b)) => a == b,
            (ValueKind::Boolean(a), ValueKind::Boolean(b)) => a == b,
            (ValueKind::List(a), ValueKind::List(b)) => {
                if Rc::ptr_eq(a, b) {
                    return true;
                }
                let pair = (Rc::as_ptr(a), Rc::as_ptr(b));
                if seen.contains(&pair) {
                    return true;
                }
                seen.push(pair);
                let (left, right) = (a.borrow(), b.borrow());
                left.len() == right.len()
                    && left
                        .iter()
                        .zip(right.iter())
                        .all(|(x, y)| x.kind.equals(&y.kind, seen))
            }
            (ValueKind::Function(a), ValueKind::Function(b)) => Rc::ptr_eq(a, b),
            (ValueKind::Builtin(a), ValueKind::Builtin(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.render(f, &mut Vec::new())
    }
}

// Equality is structural for scalars and list contents, identity for
// callables; provenance never takes part.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl PartialEq for ValueKind {
    fn eq(&self, other: &Self) -> bool {
        self.equals(other, &mut Vec::new())
    }
}
