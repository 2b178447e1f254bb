use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::lexer::{Location, Token};

/// One syntax-tree node
///
/// Data only: the parser builds these and the evaluator walks them.
/// Children are owned exclusively, so the tree is acyclic and immutable
/// after construction; function bodies sit behind `Rc` because every
/// closure made from one definition shares the same body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Number literal; the token text is a run of decimal digits
    Number(Token),

    /// String literal; the token text is the unescaped content
    String(Token),

    /// List literal: [a, b, c]
    List {
        /// Element expressions, left to right
        items: Vec<Node>,
        /// Location of the opening bracket
        loc: Location,
    },

    /// Variable read
    VarAccess(Token),

    /// Variable binding: var name = expr
    VarAssign {
        /// Location of the '=' token
        loc: Location,
        /// Name being bound
        name: Token,
        /// Expression producing the bound value
        value: Box<Node>,
    },

    /// Binary operation, strictly left-folded within a precedence tier
    BinaryOp {
        /// Left operand
        left: Box<Node>,
        /// Operator token
        op: Token,
        /// Right operand
        right: Box<Node>,
    },

    /// Unary operation: + - ! ~
    UnaryOp {
        /// Operator token
        op: Token,
        /// Operand expression
        operand: Box<Node>,
    },

    /// Conditional expression: if/elif chains with an optional else
    If {
        /// (condition, body) cases in source order
        cases: Vec<(Node, Node)>,
        /// Body taken when no case matches
        else_body: Option<Box<Node>>,
    },

    /// While loop; evaluates to the list of per-iteration body values
    While {
        /// Loop condition
        cond: Box<Node>,
        /// Loop body, one expression
        body: Box<Node>,
        /// Location of the 'while' keyword
        loc: Location,
    },

    /// For loop over an inclusive numeric range
    For {
        /// Loop variable name
        var: Token,
        /// Range start
        start: Box<Node>,
        /// Range end (inclusive)
        end: Box<Node>,
        /// Step; the runtime defaults a missing step to 1
        step: Option<Box<Node>>,
        /// Loop body, one expression
        body: Box<Node>,
        /// Location of the 'for' keyword
        loc: Location,
    },

    /// Function definition, named or anonymous
    FunctionDef {
        /// Name to bind the function under, when present
        name: Option<Token>,
        /// Parameter names in declaration order
        params: Vec<Token>,
        /// Function body, one expression
        body: Rc<Node>,
        /// Location of the 'function' keyword
        loc: Location,
    },

    /// Call of a function or built-in
    FunctionCall {
        /// Expression producing the callable
        callee: Box<Node>,
        /// Argument expressions, left to right
        args: Vec<Node>,
    },
}

impl Node {
    /// Location where the construct begins, used when an error must
    /// blame a whole expression rather than one token
    pub fn loc(&self) -> Option<&Location> {
        match self {
            Node::Number(tok) | Node::String(tok) | Node::VarAccess(tok) => Some(&tok.loc),
            Node::List { loc, .. }
            | Node::VarAssign { loc, .. }
            | Node::While { loc, .. }
            | Node::For { loc, .. }
            | Node::FunctionDef { loc, .. } => Some(loc),
            Node::BinaryOp { left, .. } => left.loc(),
            Node::UnaryOp { op, .. } => Some(&op.loc),
            Node::If { cases, .. } => cases.first().and_then(|(cond, _)| cond.loc()),
            Node::FunctionCall { callee, .. } => callee.loc(),
        }
    }
}
