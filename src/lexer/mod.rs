//! Lexical analysis for Lumen
//!
//! Converts source text into a stream of located tokens, one at a time,
//! on demand.

mod scanner;
mod token;

pub use scanner::Scanner;
pub use token::{Location, Token, TokenKind};
