use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// A position in one source text
///
/// Row and column are stored 0-based; `Display` renders them 1-based as
/// `name:row:col`, the form every diagnostic uses. The source name is
/// shared across all locations of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Name of the source (file path, or a label like "repl")
    pub source: Rc<str>,
    /// 0-based row
    pub row: usize,
    /// 0-based column, in characters
    pub col: usize,
}

impl Location {
    /// Creates a location within the named source
    pub fn new(source: Rc<str>, row: usize, col: usize) -> Self {
        Location { source, row, col }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.source, self.row + 1, self.col + 1)
    }
}

/// A single token from the source code
///
/// The kind is a payload-free tag; `text` carries the content (identifier
/// spelling, digit run, unescaped string body, operator lexeme).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Where the token starts
    pub loc: Location,
    /// The type of token
    pub kind: TokenKind,
    /// Literal text of the token
    pub text: String,
}

impl Token {
    /// Creates a new token with the given properties
    pub fn new(loc: Location, kind: TokenKind, text: impl Into<String>) -> Self {
        Token {
            loc,
            kind,
            text: text.into(),
        }
    }

    /// Exact-match predicate against a kind and literal text
    pub fn matches(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }
}

/// All possible token types in Lumen
///
/// End of input is not a kind: the scanner returns `None` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenKind {
    // Literals and words
    /// Number literal (a run of decimal digits)
    Number,
    /// String literal; the token text is the unescaped content
    String,
    /// Identifier (a letter followed by letters/digits)
    Identifier,
    /// Reserved word; the token text says which one
    Keyword,

    // Operators
    /// Plus operator (+)
    Plus,
    /// Minus operator (-)
    Minus,
    /// Star operator (*)
    Star,
    /// Slash operator (/)
    Slash,
    /// Percent operator (%)
    Percent,
    /// Power operator (**)
    StarStar,
    /// Equality operator (==)
    Eq,
    /// Inequality operator (!=)
    NotEq,
    /// Less than operator (<)
    Lt,
    /// Greater than operator (>)
    Gt,
    /// Less than or equal operator (<=)
    LtEq,
    /// Greater than or equal operator (>=)
    GtEq,
    /// Logical AND operator (&&)
    And,
    /// Logical OR operator (||)
    Or,
    /// Logical NOT operator (!)
    Not,
    /// Bitwise AND operator (&)
    Amp,
    /// Bitwise OR operator (|)
    Pipe,
    /// Bitwise XOR operator (^)
    Caret,
    /// Bitwise NOT operator (~)
    Tilde,
    /// Left shift operator (<<)
    Shl,
    /// Right shift operator (>>)
    Shr,
    /// Assignment operator (=)
    Assign,

    // Delimiters
    /// Left parenthesis (
    LeftParen,
    /// Right parenthesis )
    RightParen,
    /// Left bracket [
    LeftBracket,
    /// Right bracket ]
    RightBracket,
    /// Comma delimiter
    Comma,
    /// Newline delimiter (one token per run of `\n`/`\r`)
    Newline,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Number => "number",
            TokenKind::String => "string",
            TokenKind::Identifier => "identifier",
            TokenKind::Keyword => "keyword",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Percent => "'%'",
            TokenKind::StarStar => "'**'",
            TokenKind::Eq => "'=='",
            TokenKind::NotEq => "'!='",
            TokenKind::Lt => "'<'",
            TokenKind::Gt => "'>'",
            TokenKind::LtEq => "'<='",
            TokenKind::GtEq => "'>='",
            TokenKind::And => "'&&'",
            TokenKind::Or => "'||'",
            TokenKind::Not => "'!'",
            TokenKind::Amp => "'&'",
            TokenKind::Pipe => "'|'",
            TokenKind::Caret => "'^'",
            TokenKind::Tilde => "'~'",
            TokenKind::Shl => "'<<'",
            TokenKind::Shr => "'>>'",
            TokenKind::Assign => "'='",
            TokenKind::LeftParen => "'('",
            TokenKind::RightParen => "')'",
            TokenKind::LeftBracket => "'['",
            TokenKind::RightBracket => "']'",
            TokenKind::Comma => "','",
            TokenKind::Newline => "newline",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(row: usize, col: usize) -> Location {
        Location::new(Rc::from("test.lum"), row, col)
    }

    #[test]
    fn test_location_display_is_one_based() {
        assert_eq!(loc(0, 0).to_string(), "test.lum:1:1");
        assert_eq!(loc(4, 11).to_string(), "test.lum:5:12");
    }

    #[test]
    fn test_token_matches() {
        let tok = Token::new(loc(0, 0), TokenKind::Keyword, "end");
        assert!(tok.matches(TokenKind::Keyword, "end"));
        assert!(!tok.matches(TokenKind::Keyword, "then"));
        assert!(!tok.matches(TokenKind::Identifier, "end"));
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(TokenKind::StarStar.to_string(), "'**'");
        assert_eq!(TokenKind::Identifier.to_string(), "identifier");
        assert_eq!(TokenKind::Newline.to_string(), "newline");
    }
}
