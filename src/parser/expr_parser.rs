use std::rc::Rc;

use super::ast::Node;
use crate::error::{Error, ErrorKind, Result};
use crate::lexer::{Location, Scanner, Token, TokenKind};

/// Operators folded at the term tier
const TERM_OPS: &[TokenKind] = &[
    TokenKind::Star,
    TokenKind::Slash,
    TokenKind::StarStar,
    TokenKind::Percent,
    TokenKind::Shl,
    TokenKind::Shr,
];

/// Operators folded at the expr tier
const EXPR_OPS: &[TokenKind] = &[
    TokenKind::Plus,
    TokenKind::Minus,
    TokenKind::Eq,
    TokenKind::NotEq,
    TokenKind::Pipe,
    TokenKind::Caret,
    TokenKind::Amp,
    TokenKind::Or,
    TokenKind::And,
    TokenKind::Lt,
    TokenKind::Gt,
    TokenKind::LtEq,
    TokenKind::GtEq,
];

/// Recursive-descent parser for Lumen
///
/// Pulls tokens from the scanner on demand and produces one AST node per
/// top-level unit. "Current token" always points at the next unconsumed
/// token; every production either consumes and advances or raises a
/// terminal error. No backtracking.
pub struct Parser {
    scanner: Scanner,
    /// Next unconsumed token; `None` once input is exhausted
    cur: Option<Token>,
}

impl Parser {
    /// Creates a parser over the scanner's token stream
    ///
    /// Fails if the very first token is already a lexical error.
    pub fn new(mut scanner: Scanner) -> Result<Self> {
        let cur = scanner.next_token()?;
        Ok(Parser { scanner, cur })
    }

    /// Parses the next top-level unit, or `None` once input is exhausted
    ///
    /// Leading newline tokens are discarded, so blank lines between
    /// statements are not units of their own.
    pub fn parse_unit(&mut self) -> Result<Option<Node>> {
        self.skip_newlines()?;
        if self.cur.is_none() {
            return Ok(None);
        }
        Ok(Some(self.expr()?))
    }

    /// Parses every remaining unit into a vector
    pub fn parse_all(&mut self) -> Result<Vec<Node>> {
        let mut units = Vec::new();
        while let Some(node) = self.parse_unit()? {
            units.push(node);
        }
        Ok(units)
    }

    /// expr: a keyword-led construct, or terms folded by the expr-tier
    /// operators
    fn expr(&mut self) -> Result<Node> {
        if let Some(tok) = self.cur.clone() {
            if tok.kind == TokenKind::Keyword {
                // dispatch on the keyword's literal text
                match tok.text.as_str() {
                    "var" => return self.parse_var(),
                    "if" => return self.parse_if(),
                    "while" => return self.parse_while(tok.loc),
                    "for" => return self.parse_for(tok.loc),
                    "function" => return self.parse_function(tok.loc),
                    _ => {}
                }
            }
        }
        self.fold_binary(Self::term, EXPR_OPS)
    }

    /// term: calls folded by the term-tier operators
    fn term(&mut self) -> Result<Node> {
        self.fold_binary(Self::call, TERM_OPS)
    }

    /// call: a factor optionally followed by one parenthesized argument
    /// list
    fn call(&mut self) -> Result<Node> {
        let node = self.factor()?;
        if !self.check(TokenKind::LeftParen) {
            return Ok(node);
        }
        self.advance()?;

        let mut args = Vec::new();
        if !self.check(TokenKind::RightParen) {
            args.push(self.expr()?);
            while self.check(TokenKind::Comma) {
                self.advance()?;
                args.push(self.expr()?);
            }
        }
        self.expect(TokenKind::RightParen)?;

        Ok(Node::FunctionCall {
            callee: Box::new(node),
            args,
        })
    }

    /// factor: literals, parenthesized expressions, list literals,
    /// identifiers, unary operators
    fn factor(&mut self) -> Result<Node> {
        let tok = match self.cur.clone() {
            Some(tok) => tok,
            None => return Err(Error::new(ErrorKind::UnexpectedEof)),
        };

        match tok.kind {
            TokenKind::Number => {
                self.advance()?;
                Ok(Node::Number(tok))
            }
            TokenKind::String => {
                self.advance()?;
                Ok(Node::String(tok))
            }
            TokenKind::Identifier => {
                self.advance()?;
                Ok(Node::VarAccess(tok))
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let node = self.expr()?;
                self.expect(TokenKind::RightParen)?;
                Ok(node)
            }
            TokenKind::LeftBracket => self.list_literal(tok.loc),
            TokenKind::Plus | TokenKind::Minus | TokenKind::Not | TokenKind::Tilde => {
                self.advance()?;
                let operand = self.factor()?;
                Ok(Node::UnaryOp {
                    op: tok,
                    operand: Box::new(operand),
                })
            }
            // empty statement: drop the separator and re-enter statement
            // parsing
            TokenKind::Newline => {
                self.advance()?;
                self.expr()
            }
            _ => Err(Error::at(
                ErrorKind::UnexpectedToken {
                    expected: "literal".to_string(),
                    found: Self::describe(&tok),
                },
                tok.loc,
            )),
        }
    }

    fn list_literal(&mut self, loc: Location) -> Result<Node> {
        self.advance()?;
        let mut items = Vec::new();
        self.skip_newlines()?;
        if !self.check(TokenKind::RightBracket) {
            items.push(self.expr()?);
            while self.check(TokenKind::Comma) {
                self.advance()?;
                items.push(self.expr()?);
            }
        }
        self.expect(TokenKind::RightBracket)?;
        Ok(Node::List { items, loc })
    }

    fn parse_var(&mut self) -> Result<Node> {
        self.advance()?;
        let name = self.expect(TokenKind::Identifier)?;
        let assign = self.expect(TokenKind::Assign)?;
        let value = self.expr()?;
        Ok(Node::VarAssign {
            loc: assign.loc,
            name,
            value: Box::new(value),
        })
    }

    fn parse_if(&mut self) -> Result<Node> {
        self.advance()?;
        let mut cases = Vec::new();

        let cond = self.expr()?;
        self.expect_keyword("then")?;
        let body = self.expr()?;
        cases.push((cond, body));

        let mut else_body = None;
        loop {
            self.skip_newlines()?;
            if self.check_keyword("elif") {
                self.advance()?;
                let cond = self.expr()?;
                self.expect_keyword("then")?;
                let body = self.expr()?;
                cases.push((cond, body));
            } else if self.check_keyword("else") {
                self.advance()?;
                else_body = Some(Box::new(self.expr()?));
                break;
            } else {
                break;
            }
        }
        self.expect_keyword("end")?;

        Ok(Node::If { cases, else_body })
    }

    fn parse_while(&mut self, loc: Location) -> Result<Node> {
        self.advance()?;
        let cond = self.expr()?;
        self.expect_keyword("do")?;
        let body = self.expr()?;
        self.expect_keyword("end")?;
        Ok(Node::While {
            cond: Box::new(cond),
            body: Box::new(body),
            loc,
        })
    }

    fn parse_for(&mut self, loc: Location) -> Result<Node> {
        self.advance()?;
        let var = self.expect(TokenKind::Identifier)?;
        self.expect(TokenKind::Assign)?;
        let start = self.expr()?;
        self.expect(TokenKind::Comma)?;
        let end = self.expr()?;

        let mut step = None;
        self.skip_newlines()?;
        if self.check(TokenKind::Comma) {
            self.advance()?;
            step = Some(Box::new(self.expr()?));
        }

        self.expect_keyword("do")?;
        let body = self.expr()?;
        self.expect_keyword("end")?;

        Ok(Node::For {
            var,
            start: Box::new(start),
            end: Box::new(end),
            step,
            body: Box::new(body),
            loc,
        })
    }

    fn parse_function(&mut self, loc: Location) -> Result<Node> {
        self.advance()?;

        let name = if self.check(TokenKind::Identifier) {
            Some(self.expect(TokenKind::Identifier)?)
        } else {
            None
        };

        self.expect(TokenKind::LeftParen)?;
        let mut params = Vec::new();
        if self.check(TokenKind::Identifier) {
            params.push(self.expect(TokenKind::Identifier)?);
            while self.check(TokenKind::Comma) {
                self.advance()?;
                params.push(self.expect(TokenKind::Identifier)?);
            }
        }
        self.expect(TokenKind::RightParen)?;

        let body = self.expr()?;
        self.expect_keyword("end")?;

        Ok(Node::FunctionDef {
            name,
            params,
            body: Rc::new(body),
            loc,
        })
    }

    /// Strictly left-associative folding: keep consuming same-tier
    /// operators, growing the tree leftward. Mixed same-tier operators
    /// therefore apply left to right.
    fn fold_binary(
        &mut self,
        operand: fn(&mut Self) -> Result<Node>,
        ops: &[TokenKind],
    ) -> Result<Node> {
        let mut left = operand(self)?;
        loop {
            let op = match &self.cur {
                Some(tok) if ops.contains(&tok.kind) => tok.clone(),
                _ => break,
            };
            self.advance()?;
            let right = operand(self)?;
            left = Node::BinaryOp {
                left: Box::new(left),
                op,
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn advance(&mut self) -> Result<()> {
        self.cur = self.scanner.next_token()?;
        Ok(())
    }

    fn skip_newlines(&mut self) -> Result<()> {
        while self.check(TokenKind::Newline) {
            self.advance()?;
        }
        Ok(())
    }

    fn check(&self, kind: TokenKind) -> bool {
        matches!(&self.cur, Some(tok) if tok.kind == kind)
    }

    fn check_keyword(&self, word: &str) -> bool {
        matches!(&self.cur, Some(tok) if tok.matches(TokenKind::Keyword, word))
    }

    /// Consumes a token of the given kind, skipping newline separators
    /// first; anything else is a syntax error naming both sides.
    fn expect(&mut self, kind: TokenKind) -> Result<Token> {
        self.skip_newlines()?;
        match self.cur.clone() {
            Some(tok) if tok.kind == kind => {
                self.advance()?;
                Ok(tok)
            }
            Some(tok) => Err(Error::at(
                ErrorKind::UnexpectedToken {
                    expected: kind.to_string(),
                    found: Self::describe(&tok),
                },
                tok.loc,
            )),
            None => Err(Error::new(ErrorKind::UnexpectedToken {
                expected: kind.to_string(),
                found: "EOF".to_string(),
            })),
        }
    }

    /// Consumes the given keyword, skipping newline separators first;
    /// this is what lets `if`/`while`/`for`/`function` bodies span lines.
    fn expect_keyword(&mut self, word: &str) -> Result<Token> {
        self.skip_newlines()?;
        match self.cur.clone() {
            Some(tok) if tok.matches(TokenKind::Keyword, word) => {
                self.advance()?;
                Ok(tok)
            }
            Some(tok) => Err(Error::at(
                ErrorKind::UnexpectedToken {
                    expected: format!("\"{}\"", word),
                    found: Self::describe(&tok),
                },
                tok.loc,
            )),
            None => Err(Error::new(ErrorKind::UnexpectedToken {
                expected: format!("\"{}\"", word),
                found: "EOF".to_string(),
            })),
        }
    }

    /// Human-readable description of a token for error messages
    fn describe(token: &Token) -> String {
        match token.kind {
            TokenKind::Identifier => format!("identifier \"{}\"", token.text),
            TokenKind::Keyword => format!("\"{}\"", token.text),
            TokenKind::Number => format!("number {}", token.text),
            TokenKind::String => format!("string \"{}\"", token.text),
            TokenKind::Newline => "newline".to_string(),
            _ => format!("'{}'", token.text),
        }
    }
}
