//! # Lumen - A Small Expression-Oriented Scripting Language
//!
//! [![Crates.io](https://img.shields.io/crates/v/lumen.svg)](https://crates.io/crates/lumen)
//! [![Documentation](https://docs.rs/lumen/badge.svg)](https://docs.rs/lumen)
//! [![License: MIT](https://img.shields.io/badge/License-MIT-yellow.svg)](https://opensource.org/licenses/MIT)
//!
//! A tree-walking interpreter for **Lumen**, a compact scripting language
//! where every construct is an expression: assignments yield their value,
//! `if` yields its chosen branch, and loops collect one value per
//! iteration into a list.
//!
//! ## Features
//!
//! - ✅ **Expression-oriented** - `var`, `if`, `while`, `for`, and
//!   `function` are all expressions with values
//! - 🚀 **On-demand pipeline** - tokens are scanned and units parsed only
//!   as execution reaches them
//! - 📍 **Located diagnostics** - every value remembers where it was
//!   made; errors print a full call backtrace
//! - 🔒 **Zero unsafe code** - memory-safe implementation throughout
//!
//! ## Quick Start
//!
//! Add Lumen to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! lumen = "0.3"
//! ```
//!
//! ### Basic Usage
//!
//! Run Lumen code against any reader and writer:
//!
//! ```rust
//! use std::io::Cursor;
//! use lumen::Interpreter;
//!
//! # fn main() -> lumen::Result<()> {
//! let mut interp = Interpreter::new("demo.lum", Cursor::new(Vec::new()), Vec::new());
//! interp.run(r#"
//! print("hello")
//! 1 + 2 * 3
//! "#)?;
//!
//! // print writes directly; the value of the last unit is echoed
//! assert_eq!(String::from_utf8(interp.into_output()).unwrap(), "hello\n7\n");
//! # Ok(())
//! # }
//! ```
//!
//! ### Complete Example Function
//!
//! Create a reusable helper that runs a source and captures its output:
//!
//! ```rust
//! use std::io::Cursor;
//! use lumen::{Interpreter, Result};
//!
//! fn run_lumen(source: &str) -> Result<String> {
//!     let mut interp = Interpreter::new("demo.lum", Cursor::new(Vec::new()), Vec::new());
//!     interp.run(source)?;
//!     Ok(String::from_utf8(interp.into_output()).unwrap())
//! }
//!
//! # fn main() -> Result<()> {
//! // every loop is an expression: iteration values collect into a list
//! let output = run_lumen("var n = 0\nwhile n < 4 do var n = n + 1 end")?;
//! assert_eq!(output, "0\n[1, 2, 3, 4]\n");
//!
//! // closures capture the frame they were written in
//! let output = run_lumen(
//!     "function scale(k)\n  function(x) x * k end\nend\nvar double = scale(2)\nprint(double(21))",
//! )?;
//! assert_eq!(output, "<function scale>\n<function>\n42\n");
//! # Ok(())
//! # }
//! ```
//!
//! ## Language Overview
//!
//! ```text
//! var limit = number(input("how many? "))
//!
//! function fib(n)
//!   if n < 2 then
//!     n
//!   else
//!     fib(n - 1) + fib(n - 2)
//!   end
//! end
//!
//! for i = 0, limit do
//!   print(fib(i))
//! end
//! ```
//!
//! ### Data Types
//!
//! - **Numbers** - 64-bit floats, written as integer literals
//! - **Strings** - double-quoted with `\n`, `\"`, and `\r` escapes
//! - **Booleans** - the globals `true` and `false`
//! - **Lists** - `[1, "two", true]`, shared by reference across bindings
//! - **Functions** - named or anonymous, first-class, closing over their
//!   defining scope
//!
//! ### Control Flow
//!
//! - `if cond then a elif cond2 then b else c end` - yields the chosen branch
//! - `while cond do body end` - collects each iteration's value into a list
//! - `for i = start, end, step do body end` - inclusive bounds, optional step
//! - `var name = expr` - binds in the current scope and yields the value
//!
//! ### Built-in Functions
//!
//! - **I/O**: `print(value)`, `input(prompt)`
//! - **Conversion**: `number(text)`, `string(value)`
//! - **Lists**: `at(list, index)`, `concat(left, right)`, `push(list, value)`
//!
//! ## Architecture
//!
//! Lumen follows a classic interpreter architecture:
//!
//! ```text
//! Source Code → Scanner → Tokens → Parser → AST → Evaluator → Values
//! ```
//!
//! ### Main Components
//!
//! - [`Scanner`] - Produces located tokens from source text, on demand
//! - [`Parser`] - Builds one [`Node`] tree per top-level unit
//! - [`Evaluator`] - Walks the tree and produces [`Value`]s
//! - [`Environment`] - Call frames with lexical parent links
//! - [`Interpreter`] - A session tying the pipeline together over an
//!   input and output stream
//!
//! ## Error Handling
//!
//! Every failure, lexical through runtime, is a [`Error`] carrying the
//! source location and active frame; the driver renders it as a
//! backtrace block and exits:
//!
//! ```rust
//! use std::io::Cursor;
//! use lumen::{ErrorKind, Interpreter};
//!
//! let mut interp = Interpreter::new("demo.lum", Cursor::new(Vec::new()), Vec::new());
//! let err = interp.run("1 / 0").unwrap_err();
//!
//! assert_eq!(err.kind, ErrorKind::DivisionByZero);
//! assert_eq!(
//!     interp.render_fault(&err),
//!     "demo.lum:1:5 ->\ndemo.lum:1:5: ERROR: can't divide by zero"
//! );
//! ```
//!
//! ## License
//!
//! Licensed under the [MIT License](https://opensource.org/licenses/MIT).

/// Version of the Lumen interpreter
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod error;
pub mod interpreter;
pub mod lexer;
pub mod parser;
pub mod runtime;

// Re-export main types
pub use error::{Error, ErrorKind, Result};
pub use interpreter::Interpreter;
pub use lexer::{Location, Scanner, Token, TokenKind};
pub use parser::{Node, Parser};
pub use runtime::{Builtin, Environment, Evaluator, FrameId, Function, Value, ValueKind};
