use std::rc::Rc;

use crate::expr::{Expr, FunctionExpr};
use crate::token::Token;

/// A named method inside a class body.
#[derive(Debug, Clone)]
pub struct Method {
    pub name: Token,
    pub function: Rc<FunctionExpr>,
}

/// **Abstract-syntax-tree node** for *statements*.  A program is a sequence
/// of these nodes returned by [`crate::parser::Parser::parse`].
///
/// There is no `for` variant: the parser desugars `for` into an initializer
/// plus a `While` whose body carries the increment.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Stand-alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    ///
    /// A missing initializer leaves the binding in the *uninitialized*
    /// state, which is distinct from `nil` at runtime.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    /// `if` / `else` conditional.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop.
    While { condition: Expr, body: Box<Stmt> },

    /// `break;` — terminates the innermost enclosing loop.
    Break { keyword: Token },

    /// Function declaration: a name bound to a function literal.
    Function {
        name: Token,
        function: Rc<FunctionExpr>,
    },

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for error locations).
        keyword: Token,

        /// Optional expression to return; absent ⇒ `nil`.
        value: Option<Expr>,
    },

    /// Class declaration with optional superclass and the two method tables
    /// (instance methods and `class`-prefixed class-level methods).
    Class {
        name: Token,
        /// Always an [`Expr::Variable`] when present; resolved like any name.
        superclass: Option<Expr>,
        methods: Vec<Method>,
        class_methods: Vec<Method>,
    },
}
