//! Interpreter sessions: scanner, parser, and evaluator wired together
//!
//! A session owns the evaluator state, so bindings made by one `run`
//! call are visible to the next. The driver binary runs one script per
//! session; embedders can feed sources incrementally.

use std::io::{BufRead, Write};

use crate::error::{Error, ErrorKind, Result};
use crate::lexer::Scanner;
use crate::parser::Parser;
use crate::runtime::Evaluator;

/// A persistent interpreter session over an input and output stream
pub struct Interpreter<R: BufRead, W: Write> {
    source_name: String,
    evaluator: Evaluator<R, W>,
}

impl<R: BufRead, W: Write> Interpreter<R, W> {
    /// Creates a session named after its source
    ///
    /// The name labels every diagnostic location and the root frame of
    /// the backtrace.
    pub fn new(source_name: &str, input: R, output: W) -> Self {
        Interpreter {
            source_name: source_name.to_string(),
            evaluator: Evaluator::new(source_name, input, output),
        }
    }

    /// Runs a source text to completion
    ///
    /// Units are parsed one at a time and evaluated immediately; each
    /// unit that produces a value has it echoed to the output stream.
    /// The first error aborts the run, leaving earlier bindings in
    /// place.
    pub fn run(&mut self, source: &str) -> Result<()> {
        tracing::debug!(source = %self.source_name, "running source");
        let mut parser = Parser::new(Scanner::new(&self.source_name, source))?;
        while let Some(node) = parser.parse_unit()? {
            if let Some(value) = self.evaluator.eval_unit(&node)? {
                writeln!(self.evaluator.output, "{}", value.to_string_value())
                    .map_err(|e| Error::new(ErrorKind::Io(e.to_string())))?;
            }
        }
        Ok(())
    }

    /// Renders an error as its full diagnostic block: one line per
    /// call site, outermost last, then the error itself
    pub fn render_fault(&self, err: &Error) -> String {
        let mut lines = self.evaluator.env.backtrace(err.loc.as_ref(), err.frame);
        lines.push(err.to_string());
        lines.join("\n")
    }

    /// Consumes the session and hands back its output sink
    pub fn into_output(self) -> W {
        self.evaluator.output
    }
}
