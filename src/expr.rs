use std::rc::Rc;

use crate::stmt::Stmt;
use crate::token::Token;

/// Identity of an expression node, assigned by the parser.
///
/// Only the variants the resolver binds (`Variable`, `Assign`, `This`,
/// `Super`) carry one; the resolver's distance table is keyed on it and the
/// interpreter reads that table when walking the environment chain.
pub type ExprId = usize;

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the *terminal leaves* of the expression tree and do
/// **not** retain a reference to the originating [`Token`]; the parser copies
/// the value at parse time.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal, stored as IEEE-754 `f64`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal.
    Nil,
}

/// An anonymous function literal: parameter list plus body.
///
/// Named function declarations and class methods wrap one of these
/// ([`Stmt::Function`], [`crate::stmt::Method`]); the runtime's `LoxFunction`
/// shares it via `Rc` so closures never deep-copy their declaration.
#[derive(Debug, Clone)]
pub struct FunctionExpr {
    /// Parameter name tokens (arity ≤ 255, enforced by the parser).
    pub params: Vec<Token>,

    /// Body executed when the function is called.
    pub body: Vec<Stmt>,
}

/// **Abstract-syntax-tree node** representing every kind of *expression*.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Prefix unary operator expression, e.g. `!ready` or `-42`.
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        /// Operand to which the operator is applied.
        right: Box<Expr>,
    },

    /// Infix binary operator expression, e.g. `a + b`, `x <= y`, and the
    /// comma sequence operator `a, b`.
    Binary {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Short-circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token,
        right: Box<Expr>,
    },

    /// Conditional `cond ? then : else`.
    Ternary {
        condition: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },

    /// Parenthesised sub-expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Variable access.
    Variable { name: Token, id: ExprId },

    /// Assignment expression: `identifier "=" expression`.
    Assign {
        name: Token,
        value: Box<Expr>,
        id: ExprId,
    },

    /// Function- or method-call expression, e.g. `clock()` or `add(1, 2)`.
    Call {
        /// Expression that evaluates to a callable.
        callee: Box<Expr>,
        /// The closing `)` token, retained for error reporting.
        paren: Token,
        /// Argument list (may be empty).
        arguments: Vec<Expr>,
    },

    /// Anonymous `fun (params) { body }` literal.
    Function(Rc<FunctionExpr>),

    /// Property read: `object.property`.
    Get { object: Box<Expr>, name: Token },

    /// Property write: `object.property = value`.
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This { keyword: Token, id: ExprId },

    /// `super.method` inside a subclass method.
    Super {
        keyword: Token,
        method: Token,
        id: ExprId,
    },
}
