/*!
Static resolution pass between the parser and the evaluator.

Walks the AST once, simulating the runtime's scope stack with a vector of
hash maps, and tells the interpreter how many environment frames separate
each bound-name use (`Variable`, `Assign`, `this`, `super`) from its
definition.  Names that resolve to no lexical scope are left to the global
environment at runtime.

The same walk enforces the static rules that do not need runtime values:

- a local may not be read in its own initializer (`var a = a;`)
- no two declarations of the same name in one local scope
- `return` only inside a function, and never with a value inside `init`
- `this` / `super` only inside (sub)class method bodies
- `break` only inside a loop
- a local binding (variable, function, class, or parameter) that is
  never read is an error

Class-level methods (leading `class` keyword) are resolved before the
implicit `this`/`super` scopes are pushed, so using either keyword in one
reports the usual "outside of a class" error.
*/

use std::collections::HashMap;

use log::{debug, info};

use crate::error::LoxError;
use crate::expr::{Expr, ExprId, FunctionExpr};
use crate::interpreter::Interpreter;
use crate::stmt::{Method, Stmt};
use crate::token::Token;

#[derive(Debug, Clone, Copy, PartialEq)]
enum FunctionType {
    None,
    Function,
    Method,
    Initializer,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum ClassType {
    None,
    Class,
    Subclass,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum BindingState {
    /// Name exists but its initializer has not finished.
    Declared,
    /// Initializer done; reads are legal.
    Defined,
    /// Read at least once.
    Read,
}

#[derive(Debug)]
struct Binding {
    name: Token,
    state: BindingState,
}

pub struct Resolver<'a> {
    interpreter: &'a mut Interpreter,
    scopes: Vec<HashMap<String, Binding>>,
    current_function: FunctionType,
    current_class: ClassType,
    /// Nesting depth of enclosing loops; zero means `break` is illegal.
    loop_depth: usize,
    errors: Vec<LoxError>,
}

impl<'a> Resolver<'a> {
    pub fn new(interpreter: &'a mut Interpreter) -> Self {
        Resolver {
            interpreter,
            scopes: Vec::new(),
            current_function: FunctionType::None,
            current_class: ClassType::None,
            loop_depth: 0,
            errors: Vec::new(),
        }
    }

    /// Resolve a whole program.  An empty error list means the interpreter
    /// may run it.
    pub fn resolve(mut self, statements: &[Stmt]) -> Vec<LoxError> {
        info!("Beginning resolution phase");

        self.resolve_statements(statements);
        self.errors
    }

    fn resolve_statements(&mut self, statements: &[Stmt]) {
        for statement in statements {
            self.resolve_statement(statement);
        }
    }

    fn resolve_statement(&mut self, statement: &Stmt) {
        match statement {
            Stmt::Expression(expr) | Stmt::Print(expr) => self.resolve_expression(expr),

            Stmt::Var { name, initializer } => {
                self.declare(name);
                if let Some(initializer) = initializer {
                    self.resolve_expression(initializer);
                }
                self.define(name);
            }

            Stmt::Block(statements) => {
                self.begin_scope();
                self.resolve_statements(statements);
                self.end_scope();
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expression(condition);
                self.resolve_statement(then_branch);
                if let Some(else_branch) = else_branch {
                    self.resolve_statement(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                self.resolve_expression(condition);

                self.loop_depth += 1;
                self.resolve_statement(body);
                self.loop_depth -= 1;
            }

            Stmt::Break { keyword } => {
                if self.loop_depth == 0 {
                    self.errors
                        .push(LoxError::resolve(keyword, "Can't use 'break' outside of a loop."));
                }
            }

            Stmt::Function { name, function } => {
                // Defined eagerly so the body may refer to itself.
                self.declare(name);
                self.define(name);

                self.resolve_function(function, FunctionType::Function);
            }

            Stmt::Return { keyword, value } => {
                if self.current_function == FunctionType::None {
                    self.errors
                        .push(LoxError::resolve(keyword, "Can't return from top-level code."));
                }

                if let Some(value) = value {
                    if self.current_function == FunctionType::Initializer {
                        self.errors.push(LoxError::resolve(
                            keyword,
                            "Can't return a value from an initializer.",
                        ));
                    }

                    self.resolve_expression(value);
                }
            }

            Stmt::Class {
                name,
                superclass,
                methods,
                class_methods,
            } => self.resolve_class(name, superclass.as_ref(), methods, class_methods),
        }
    }

    fn resolve_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Method],
        class_methods: &[Method],
    ) {
        debug!("Resolving class '{}'", name.lexeme);

        let enclosing_class: ClassType = self.current_class;

        self.declare(name);
        self.define(name);

        if let Some(superclass) = superclass {
            if let Expr::Variable {
                name: superclass_name,
                ..
            } = superclass
            {
                if superclass_name.lexeme == name.lexeme {
                    self.errors.push(LoxError::resolve(
                        superclass_name,
                        "A class can't inherit from itself.",
                    ));
                }
            }

            self.resolve_expression(superclass);
        }

        // Class-level methods see neither `this` nor `super`; resolving
        // them out here makes either keyword an ordinary static error.
        for method in class_methods {
            self.resolve_function(&method.function, FunctionType::Method);
        }

        self.current_class = if superclass.is_some() {
            ClassType::Subclass
        } else {
            ClassType::Class
        };

        if superclass.is_some() {
            self.begin_scope();
            self.declare_synthetic(name, "super");
        }

        self.begin_scope();
        self.declare_synthetic(name, "this");

        for method in methods {
            let declaration: FunctionType = if method.name.lexeme == "init" {
                FunctionType::Initializer
            } else {
                FunctionType::Method
            };

            self.resolve_function(&method.function, declaration);
        }

        self.end_scope();

        if superclass.is_some() {
            self.end_scope();
        }

        self.current_class = enclosing_class;
    }

    fn resolve_function(&mut self, function: &FunctionExpr, ftype: FunctionType) {
        let enclosing_function: FunctionType = self.current_function;
        self.current_function = ftype;

        // A function body is a fresh loop context; `break` cannot cross a
        // call-frame boundary.
        let enclosing_loop_depth: usize = self.loop_depth;
        self.loop_depth = 0;

        self.begin_scope();

        for param in &function.params {
            self.declare(param);
            self.define(param);
        }

        self.resolve_statements(&function.body);

        self.end_scope();

        self.loop_depth = enclosing_loop_depth;
        self.current_function = enclosing_function;
    }

    fn resolve_expression(&mut self, expression: &Expr) {
        match expression {
            Expr::Literal(_) => {}

            Expr::Grouping(inner) => self.resolve_expression(inner),

            Expr::Unary { right, .. } => self.resolve_expression(right),

            Expr::Binary { left, right, .. } | Expr::Logical { left, right, .. } => {
                self.resolve_expression(left);
                self.resolve_expression(right);
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                self.resolve_expression(condition);
                self.resolve_expression(then_branch);
                self.resolve_expression(else_branch);
            }

            Expr::Variable { name, id } => {
                if let Some(scope) = self.scopes.last() {
                    if let Some(binding) = scope.get(&name.lexeme) {
                        if binding.state == BindingState::Declared {
                            self.errors.push(LoxError::resolve(
                                name,
                                "Can't read local variable in its own initializer.",
                            ));
                        }
                    }
                }

                self.resolve_local(*id, name, true);
            }

            Expr::Assign { name, value, id } => {
                self.resolve_expression(value);
                // A bare write does not count as a use.
                self.resolve_local(*id, name, false);
            }

            Expr::Call {
                callee, arguments, ..
            } => {
                self.resolve_expression(callee);
                for argument in arguments {
                    self.resolve_expression(argument);
                }
            }

            Expr::Function(function) => {
                self.resolve_function(function, FunctionType::Function);
            }

            Expr::Get { object, .. } => self.resolve_expression(object),

            Expr::Set { object, value, .. } => {
                self.resolve_expression(value);
                self.resolve_expression(object);
            }

            Expr::This { keyword, id } => {
                if self.current_class == ClassType::None {
                    self.errors
                        .push(LoxError::resolve(keyword, "Can't use 'this' outside of a class."));
                    return;
                }

                self.resolve_local(*id, keyword, true);
            }

            Expr::Super { keyword, id, .. } => {
                match self.current_class {
                    ClassType::None => {
                        self.errors.push(LoxError::resolve(
                            keyword,
                            "Can't use 'super' outside of a class.",
                        ));
                        return;
                    }
                    ClassType::Class => {
                        self.errors.push(LoxError::resolve(
                            keyword,
                            "Can't use 'super' in a class with no superclass.",
                        ));
                        return;
                    }
                    ClassType::Subclass => {}
                }

                self.resolve_local(*id, keyword, true);
            }
        }
    }

    // ───────────────────────── scope bookkeeping ──────────────────

    fn begin_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    fn end_scope(&mut self) {
        let scope = self
            .scopes
            .pop()
            .unwrap_or_else(|| unreachable!("scope stack underflow"));

        for binding in scope.into_values() {
            if binding.state != BindingState::Read {
                self.errors.push(LoxError::resolve(
                    &binding.name,
                    format!("Unused local variable '{}'.", binding.name.lexeme),
                ));
            }
        }
    }

    fn declare(&mut self, name: &Token) {
        let Some(scope) = self.scopes.last_mut() else {
            return; // global scope is not tracked
        };

        if scope.contains_key(&name.lexeme) {
            self.errors.push(LoxError::resolve(
                name,
                "Already a variable with this name in this scope.",
            ));
            return;
        }

        scope.insert(
            name.lexeme.clone(),
            Binding {
                name: name.clone(),
                state: BindingState::Declared,
            },
        );
    }

    fn define(&mut self, name: &Token) {
        if let Some(scope) = self.scopes.last_mut() {
            if let Some(binding) = scope.get_mut(&name.lexeme) {
                if binding.state == BindingState::Declared {
                    binding.state = BindingState::Defined;
                }
            }
        }
    }

    /// Insert an implicit binding (`this`, `super`) already marked as read,
    /// keyed off the class-name token for error locations.
    fn declare_synthetic(&mut self, class_name: &Token, name: &str) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(
                name.to_string(),
                Binding {
                    name: class_name.clone(),
                    state: BindingState::Read,
                },
            );
        }
    }

    /// Find the innermost scope holding `name` and record its hop distance
    /// for the expression node.  Unresolved names fall through to the
    /// global environment at runtime.
    fn resolve_local(&mut self, id: ExprId, name: &Token, is_read: bool) {
        for (distance, scope) in self.scopes.iter_mut().rev().enumerate() {
            if let Some(binding) = scope.get_mut(&name.lexeme) {
                if is_read {
                    binding.state = BindingState::Read;
                }

                debug!(
                    "Resolved '{}' (node {}) at distance {}",
                    name.lexeme, id, distance
                );

                self.interpreter.resolve(id, distance);
                return;
            }
        }
    }
}
