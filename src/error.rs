//! Error types for the Lumen interpreter

use std::fmt;

use thiserror::Error;

use crate::lexer::Location;
use crate::runtime::FrameId;

/// Failure kinds raised by the scanner, parser, and evaluator
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorKind {
    // Lexical errors
    /// String literal with no closing quote before end of input
    #[error("unclosed string")]
    UnclosedString,

    /// Backslash at end of input, escape character never read
    #[error("unfinished escape sequence")]
    UnfinishedEscape,

    /// Escape character outside the supported set (`\n`, `\"`, `\r`)
    #[error("unknown escape character '{0}'")]
    UnknownEscape(char),

    /// Input that matches no token rule and no operator prefix
    ///
    /// **Triggered by:** punctuation outside the operator table
    /// **Example:** `var x @ 1`
    #[error("unknown token starts with '{0}'")]
    UnknownToken(char),

    // Syntax errors
    /// Input ended while a production still needed a token
    #[error("expected something, but EOF")]
    UnexpectedEof,

    /// Token mismatch; names the expected grammar element and what was found
    #[error("expected {expected}, but got {found}")]
    UnexpectedToken {
        /// Expected token or grammar element description
        expected: String,
        /// Description of the token actually found
        found: String,
    },

    // Runtime errors
    /// Reference to a name with no binding anywhere on the scope chain
    ///
    /// **Triggered by:** using a variable before any `var` binds it
    /// **Example:** `x + 1` when `x` was never defined
    #[error("\"{0}\" is not defined")]
    UndefinedVariable(String),

    /// Call with more arguments than the callable's parameter list
    #[error("{extra} too many args passed into '{name}'")]
    TooManyArgs {
        /// Surplus argument count
        extra: usize,
        /// Function name, or `<anonymous>`
        name: String,
    },

    /// Call with fewer arguments than the callable's parameter list
    #[error("{missing} too few args passed into '{name}'")]
    TooFewArgs {
        /// Missing argument count
        missing: usize,
        /// Function name, or `<anonymous>`
        name: String,
    },

    /// Division with a zero-valued divisor
    ///
    /// **Triggered by:** `1 / 0`, or any divisor that evaluates to zero
    #[error("can't divide by zero")]
    DivisionByZero,

    /// List index outside `0..length`
    #[error("index {index} is out of range for a list of length {length}")]
    IndexOutOfRange {
        /// Requested index, after truncation
        index: i64,
        /// List length at the time of the access
        length: usize,
    },

    /// `number()` argument that fails the signed-decimal pattern
    #[error("can't convert \"{0}\" to a number")]
    InvalidNumber(String),

    /// `string()` applied to a callable value
    #[error("can't convert a {0} to a string")]
    NotStringifiable(String),

    /// Operator applied to operand types it does not support
    #[error("invalid operation '{op}' on types {left_type} and {right_type}")]
    InvalidOperation {
        /// Operator lexeme
        op: String,
        /// Left operand type
        left_type: String,
        /// Right operand type
        right_type: String,
    },

    /// Built-in argument of the wrong type
    #[error("expected a {expected}, but got a {got}")]
    TypeMismatch {
        /// Expected type name
        expected: String,
        /// Actual type name
        got: String,
    },

    /// Call target that is neither a function nor a built-in
    #[error("can't call a {0}")]
    NotCallable(String),

    /// A value was required where the expression produced none
    ///
    /// **Example:** `var x = if false then 2 end`
    #[error("expression produced no value")]
    NoValue,

    /// Reader/writer failure inside `print` or `input`
    #[error("i/o error: {0}")]
    Io(String),
}

/// A fatal interpreter error: a kind plus the diagnostic context the
/// driver needs to print a backtrace.
///
/// Every failure, lexical through runtime, travels through ordinary
/// `Result` returns as one of these; only the top-level driver turns it
/// into process exit.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    /// What went wrong
    pub kind: ErrorKind,
    /// Where, when known (pre-bound globals have no source position)
    pub loc: Option<Location>,
    /// Frame active when the error arose, for the call backtrace
    pub frame: Option<FrameId>,
}

impl Error {
    /// Create an error with no source position
    pub fn new(kind: ErrorKind) -> Self {
        Error {
            kind,
            loc: None,
            frame: None,
        }
    }

    /// Create an error located at `loc`
    pub fn at(kind: ErrorKind, loc: Location) -> Self {
        Error {
            kind,
            loc: Some(loc),
            frame: None,
        }
    }

    /// Attach the frame the error surfaced in
    pub fn with_frame(mut self, frame: FrameId) -> Self {
        self.frame = Some(frame);
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.loc {
            Some(loc) => write!(f, "{}: ERROR: {}", loc, self.kind),
            None => write!(f, "ERROR: {}", self.kind),
        }
    }
}

impl std::error::Error for Error {}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error::new(kind)
    }
}

/// Result type for Lumen operations
pub type Result<T> = std::result::Result<T, Error>;
