//! Lumen Parser Module
//!
//! Parses the token stream into expression trees, one node per
//! top-level unit.

mod ast;
mod expr_parser;

pub use ast::Node;
pub use expr_parser::Parser;
