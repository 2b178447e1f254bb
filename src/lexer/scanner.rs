use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use lazy_static::lazy_static;

use super::token::{Location, Token, TokenKind};
use crate::error::{Error, ErrorKind, Result};

lazy_static! {
    /// Fixed operator table. Multi-character lexemes win through the
    /// scanner's shrink-from-the-right backoff, not through lookahead.
    static ref OPERATORS: HashMap<&'static str, TokenKind> = {
        let mut table = HashMap::new();
        table.insert("(", TokenKind::LeftParen);
        table.insert(")", TokenKind::RightParen);
        table.insert("[", TokenKind::LeftBracket);
        table.insert("]", TokenKind::RightBracket);
        table.insert(",", TokenKind::Comma);
        table.insert("+", TokenKind::Plus);
        table.insert("-", TokenKind::Minus);
        table.insert("*", TokenKind::Star);
        table.insert("/", TokenKind::Slash);
        table.insert("%", TokenKind::Percent);
        table.insert("**", TokenKind::StarStar);
        table.insert("|", TokenKind::Pipe);
        table.insert("||", TokenKind::Or);
        table.insert("&", TokenKind::Amp);
        table.insert("&&", TokenKind::And);
        table.insert("^", TokenKind::Caret);
        table.insert("~", TokenKind::Tilde);
        table.insert("<<", TokenKind::Shl);
        table.insert(">>", TokenKind::Shr);
        table.insert("<", TokenKind::Lt);
        table.insert(">", TokenKind::Gt);
        table.insert("<=", TokenKind::LtEq);
        table.insert(">=", TokenKind::GtEq);
        table.insert("==", TokenKind::Eq);
        table.insert("!=", TokenKind::NotEq);
        table.insert("!", TokenKind::Not);
        table.insert("=", TokenKind::Assign);
        table
    };

    /// Reserved words; a scanned word in this set becomes a `Keyword` token
    static ref KEYWORDS: HashSet<&'static str> = [
        "var", "if", "then", "elif", "else", "end", "while", "do", "for", "function",
    ]
    .into_iter()
    .collect();
}

/// On-demand scanner for Lumen source text
///
/// Produces one token per `next_token` call and never rewinds. End of
/// input is `Ok(None)`, not a token.
pub struct Scanner {
    /// Source name shared into every Location
    source_name: Rc<str>,
    /// Source code as character vector
    source: Vec<char>,
    /// Current position in source
    current: usize,
    /// Current row (0-based)
    row: usize,
    /// Position where the current row starts
    line_start: usize,
}

impl Scanner {
    /// Creates a scanner over `source`, labeling locations with `source_name`
    pub fn new(source_name: &str, source: &str) -> Self {
        Scanner {
            source_name: Rc::from(source_name),
            source: source.chars().collect(),
            current: 0,
            row: 0,
            line_start: 0,
        }
    }

    /// Scans the next token, or `None` once input is exhausted
    pub fn next_token(&mut self) -> Result<Option<Token>> {
        self.skip_blanks_and_comments();

        if self.is_at_end() {
            return Ok(None);
        }

        let loc = self.loc();
        let c = self.peek();

        if c == '\n' || c == '\r' {
            // one token per run of line terminators
            while matches!(self.peek(), '\n' | '\r') {
                self.advance();
            }
            return Ok(Some(Token::new(loc, TokenKind::Newline, "\n")));
        }

        if c.is_ascii_alphabetic() {
            return self.scan_word(loc);
        }
        if c.is_ascii_digit() {
            return self.scan_number(loc);
        }
        if c == '"' {
            return self.scan_string(loc);
        }
        self.scan_operator(loc)
    }

    /// Scans the remaining input into a vector of tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    fn skip_blanks_and_comments(&mut self) {
        loop {
            while matches!(self.peek(), ' ' | '\t') {
                self.advance();
            }
            if self.peek() != '#' {
                return;
            }
            // comment runs to end of line and swallows the terminator
            while !self.is_at_end() && !matches!(self.peek(), '\n' | '\r') {
                self.advance();
            }
            if self.peek() == '\r' {
                self.advance();
            }
            if self.peek() == '\n' {
                self.advance();
            }
        }
    }

    fn scan_word(&mut self, loc: Location) -> Result<Option<Token>> {
        let start = self.current;
        while self.peek().is_ascii_alphanumeric() {
            self.advance();
        }
        let text: String = self.source[start..self.current].iter().collect();
        let kind = if KEYWORDS.contains(text.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };
        Ok(Some(Token::new(loc, kind, text)))
    }

    fn scan_number(&mut self, loc: Location) -> Result<Option<Token>> {
        let start = self.current;
        while self.peek().is_ascii_digit() {
            self.advance();
        }
        let text: String = self.source[start..self.current].iter().collect();
        Ok(Some(Token::new(loc, TokenKind::Number, text)))
    }

    fn scan_string(&mut self, loc: Location) -> Result<Option<Token>> {
        self.advance(); // opening quote
        let mut value = String::new();

        loop {
            if self.is_at_end() {
                return Err(Error::at(ErrorKind::UnclosedString, loc));
            }
            match self.advance() {
                '"' => break,
                '\\' => {
                    let escape_loc = self.loc();
                    if self.is_at_end() {
                        return Err(Error::at(ErrorKind::UnfinishedEscape, escape_loc));
                    }
                    match self.advance() {
                        'n' => value.push('\n'),
                        'r' => value.push('\r'),
                        '"' => value.push('"'),
                        other => {
                            return Err(Error::at(ErrorKind::UnknownEscape(other), escape_loc));
                        }
                    }
                }
                other => value.push(other),
            }
        }

        Ok(Some(Token::new(loc, TokenKind::String, value)))
    }

    /// Longest-match-with-backoff: take the maximal run of characters
    /// that are neither alphanumeric nor blank, then shrink from the
    /// right until the prefix is in the operator table. The remainder is
    /// re-scanned on the next call.
    fn scan_operator(&mut self, loc: Location) -> Result<Option<Token>> {
        let start = self.current;
        let mut end = self.current;
        while end < self.source.len() {
            let c = self.source[end];
            if c.is_ascii_alphanumeric() || c == ' ' || c == '\t' {
                break;
            }
            end += 1;
        }

        while end > start {
            let candidate: String = self.source[start..end].iter().collect();
            if let Some(&kind) = OPERATORS.get(candidate.as_str()) {
                while self.current < end {
                    self.advance();
                }
                return Ok(Some(Token::new(loc, kind, candidate)));
            }
            end -= 1;
        }

        Err(Error::at(ErrorKind::UnknownToken(self.peek()), loc))
    }

    fn loc(&self) -> Location {
        Location::new(
            Rc::clone(&self.source_name),
            self.row,
            self.current - self.line_start,
        )
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        if c == '\n' {
            self.row += 1;
            self.line_start = self.current;
        }
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }
}
