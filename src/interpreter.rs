/*!
Tree-walking evaluator.

Executes resolved statements against a chain of shared environment frames.
Two results flow out of every statement: a `RuntimeError` aborts the whole
program, while a [`Control`] signal (`break`, `return`) unwinds only as far
as the construct that absorbs it.  Keeping the two in separate channels
means a user-level fault can never be mistaken for control flow.

Bound-name expressions carry a node id; the resolver fills `locals` with
the frame distance for each id before execution starts.  Ids absent from
the table are globals.
*/

use std::cell::RefCell;
use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};

use crate::class::{LoxClass, LoxInstance};
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::{Expr, ExprId, LiteralValue};
use crate::function::LoxFunction;
use crate::stmt::{Method, Stmt};
use crate::token::{Token, TokenType};
use crate::value::{NativeFunction, Value};

/// How a statement finished.
///
/// `Break` and `Return` propagate upward through `Ok` until a loop or a
/// call frame absorbs them.
#[derive(Debug)]
pub enum Control {
    Normal,
    Break,
    Return(Value),
}

pub struct Interpreter {
    globals: Rc<RefCell<Environment>>,

    /// Innermost frame; changes as blocks and calls open and close.
    environment: Rc<RefCell<Environment>>,

    /// Resolver output: node id → frame hops to the defining scope.
    locals: HashMap<ExprId, usize>,

    /// Destination for `print`; injectable so tests can capture output.
    output: Rc<RefCell<dyn Write>>,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    pub fn new() -> Self {
        Self::with_output(Rc::new(RefCell::new(io::stdout())))
    }

    pub fn with_output(output: Rc<RefCell<dyn Write>>) -> Self {
        let globals: Rc<RefCell<Environment>> = Rc::new(RefCell::new(Environment::new()));

        globals.borrow_mut().define(
            "clock",
            Value::NativeFunction(Rc::new(NativeFunction {
                name: "clock".to_string(),
                arity: 0,
                func: |_| {
                    let now = SystemTime::now()
                        .duration_since(UNIX_EPOCH)
                        .map_err(|e| e.to_string())?;

                    Ok(Value::Number(now.as_secs_f64()))
                },
            })),
        );

        Interpreter {
            environment: globals.clone(),
            globals,
            locals: HashMap::new(),
            output,
        }
    }

    /// Record the frame distance for a bound-name node.  Called by the
    /// resolver only.
    pub fn resolve(&mut self, id: ExprId, distance: usize) {
        self.locals.insert(id, distance);
    }

    /// Run a resolved program to completion.
    pub fn interpret(&mut self, statements: &[Stmt]) -> Result<(), RuntimeError> {
        info!("Beginning execution phase");

        for statement in statements {
            match self.execute(statement)? {
                Control::Normal => {}
                // The resolver rejects top-level `break` and `return`.
                Control::Break => unreachable!("'break' signal escaped to top level"),
                Control::Return(_) => unreachable!("'return' signal escaped to top level"),
            }
        }

        Ok(())
    }

    // ─────────────────────────── statements ───────────────────────

    fn execute(&mut self, statement: &Stmt) -> Result<Control, RuntimeError> {
        match statement {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
                Ok(Control::Normal)
            }

            Stmt::Print(expr) => {
                let value: Value = self.evaluate(expr)?;

                // A broken pipe on stdout is not a program fault.
                writeln!(self.output.borrow_mut(), "{}", value).ok();

                Ok(Control::Normal)
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(initializer) => self.evaluate(initializer)?,
                    // Distinct from `nil`: reading it is a runtime error.
                    None => Value::Uninit,
                };

                self.environment.borrow_mut().define(&name.lexeme, value);

                Ok(Control::Normal)
            }

            Stmt::Block(statements) => {
                let frame: Environment = Environment::with_enclosing(self.environment.clone());

                self.execute_block(statements, frame)
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.execute(then_branch)
                } else if let Some(else_branch) = else_branch {
                    self.execute(else_branch)
                } else {
                    Ok(Control::Normal)
                }
            }

            Stmt::While { condition, body } => {
                while is_truthy(&self.evaluate(condition)?) {
                    match self.execute(body)? {
                        Control::Normal => {}
                        // Absorbed here: `break` never crosses a loop.
                        Control::Break => break,
                        ret @ Control::Return(_) => return Ok(ret),
                    }
                }

                Ok(Control::Normal)
            }

            Stmt::Break { .. } => Ok(Control::Break),

            Stmt::Function { name, function } => {
                let function = LoxFunction::new(
                    Some(name.lexeme.clone()),
                    function.clone(),
                    self.environment.clone(),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&name.lexeme, Value::Function(Rc::new(function)));

                Ok(Control::Normal)
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(value) => self.evaluate(value)?,
                    None => Value::Nil,
                };

                Ok(Control::Return(value))
            }

            Stmt::Class {
                name,
                superclass,
                methods,
                class_methods,
            } => {
                self.execute_class(name, superclass.as_ref(), methods, class_methods)?;

                Ok(Control::Normal)
            }
        }
    }

    fn execute_class(
        &mut self,
        name: &Token,
        superclass: Option<&Expr>,
        methods: &[Method],
        class_methods: &[Method],
    ) -> Result<(), RuntimeError> {
        debug!("Defining class '{}'", name.lexeme);

        let superclass: Option<Rc<LoxClass>> = match superclass {
            Some(expr) => {
                let value: Value = self.evaluate(expr)?;

                match value {
                    Value::Class(class) => Some(class),
                    _ => {
                        let token: &Token = match expr {
                            Expr::Variable { name, .. } => name,
                            _ => name,
                        };

                        return Err(RuntimeError::new(token, "Superclass must be a class."));
                    }
                }
            }
            None => None,
        };

        // Two-stage binding: the name exists (as nil) while the method
        // closures are built, so methods can refer to the class by name.
        self.environment
            .borrow_mut()
            .define(&name.lexeme, Value::Nil);

        let previous: Option<Rc<RefCell<Environment>>> = superclass.as_ref().map(|superclass| {
            let mut frame = Environment::with_enclosing(self.environment.clone());
            frame.define("super", Value::Class(superclass.clone()));

            std::mem::replace(&mut self.environment, Rc::new(RefCell::new(frame)))
        });

        let mut method_map: HashMap<String, Rc<LoxFunction>> = HashMap::new();
        for method in methods {
            let is_initializer: bool = method.name.lexeme == "init";

            method_map.insert(
                method.name.lexeme.clone(),
                Rc::new(LoxFunction::new(
                    Some(method.name.lexeme.clone()),
                    method.function.clone(),
                    self.environment.clone(),
                    is_initializer,
                )),
            );
        }

        let mut class_method_map: HashMap<String, Rc<LoxFunction>> = HashMap::new();
        for method in class_methods {
            class_method_map.insert(
                method.name.lexeme.clone(),
                Rc::new(LoxFunction::new(
                    Some(method.name.lexeme.clone()),
                    method.function.clone(),
                    self.environment.clone(),
                    false,
                )),
            );
        }

        if let Some(previous) = previous {
            self.environment = previous;
        }

        let class = LoxClass::new(
            name.lexeme.clone(),
            superclass,
            method_map,
            class_method_map,
        );

        self.environment
            .borrow_mut()
            .assign(&name.lexeme, Value::Class(Rc::new(class)));

        Ok(())
    }

    /// Run `statements` inside `frame`, restoring the previous frame
    /// afterwards whether the block finished, signalled, or faulted.
    pub fn execute_block(
        &mut self,
        statements: &[Stmt],
        frame: Environment,
    ) -> Result<Control, RuntimeError> {
        let previous: Rc<RefCell<Environment>> =
            std::mem::replace(&mut self.environment, Rc::new(RefCell::new(frame)));

        let mut outcome: Result<Control, RuntimeError> = Ok(Control::Normal);

        for statement in statements {
            match self.execute(statement) {
                Ok(Control::Normal) => {}
                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;

        outcome
    }

    // ─────────────────────────── expressions ──────────────────────

    pub fn evaluate(&mut self, expression: &Expr) -> Result<Value, RuntimeError> {
        match expression {
            Expr::Literal(literal) => Ok(match literal {
                LiteralValue::Number(n) => Value::Number(*n),
                LiteralValue::Str(s) => Value::Str(s.clone()),
                LiteralValue::True => Value::Bool(true),
                LiteralValue::False => Value::Bool(false),
                LiteralValue::Nil => Value::Nil,
            }),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => {
                let right: Value = self.evaluate(right)?;

                match operator.token_type {
                    TokenType::MINUS => match right {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(RuntimeError::new(operator, "Operand must be a number.")),
                    },
                    TokenType::BANG => Ok(Value::Bool(!is_truthy(&right))),
                    _ => unreachable!("parser produced a non-unary operator"),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                // Short-circuit: yield the deciding operand itself, not a
                // boolean made from it.
                match operator.token_type {
                    TokenType::OR if is_truthy(&left) => Ok(left),
                    TokenType::AND if !is_truthy(&left) => Ok(left),
                    _ => self.evaluate(right),
                }
            }

            Expr::Ternary {
                condition,
                then_branch,
                else_branch,
            } => {
                if is_truthy(&self.evaluate(condition)?) {
                    self.evaluate(then_branch)
                } else {
                    self.evaluate(else_branch)
                }
            }

            Expr::Variable { name, id } => self.look_up_variable(name, *id),

            Expr::Assign { name, value, id } => {
                let value: Value = self.evaluate(value)?;

                let assigned: bool = match self.locals.get(id) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        &name.lexeme,
                        value.clone(),
                    ),
                    None => self.globals.borrow_mut().assign(&name.lexeme, value.clone()),
                };

                if !assigned {
                    return Err(RuntimeError::new(
                        name,
                        format!("Undefined variable '{}'.", name.lexeme),
                    ));
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut args: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    args.push(self.evaluate(argument)?);
                }

                self.call_value(callee, args, paren)
            }

            Expr::Function(function) => {
                let function = LoxFunction::new(
                    None,
                    function.clone(),
                    self.environment.clone(),
                    false,
                );

                Ok(Value::Function(Rc::new(function)))
            }

            Expr::Get { object, name } => {
                let object: Value = self.evaluate(object)?;

                match object {
                    Value::Instance(instance) => LoxInstance::get(&instance, name),

                    // Class-level methods hang off the class value itself.
                    Value::Class(class) => match class.find_class_method(&name.lexeme) {
                        Some(method) => Ok(Value::Function(method)),
                        None => Err(RuntimeError::new(
                            name,
                            format!("Undefined property '{}'.", name.lexeme),
                        )),
                    },

                    _ => Err(RuntimeError::new(name, "Only instances have properties.")),
                }
            }

            Expr::Set {
                object,
                name,
                value,
            } => {
                let object: Value = self.evaluate(object)?;

                let Value::Instance(instance) = object else {
                    return Err(RuntimeError::new(name, "Only instances have fields."));
                };

                let value: Value = self.evaluate(value)?;
                instance.borrow_mut().set(name, value.clone());

                Ok(value)
            }

            Expr::This { keyword, id } => self.look_up_variable(keyword, *id),

            Expr::Super { keyword, method, id } => {
                // The resolver guarantees a distance for every legal `super`.
                let Some(&distance) = self.locals.get(id) else {
                    return Err(RuntimeError::new(keyword, "Unresolved 'super' reference."));
                };

                let superclass: Rc<LoxClass> =
                    match Environment::get_at(&self.environment, distance, "super") {
                        Some(Value::Class(class)) => class,
                        _ => return Err(RuntimeError::new(keyword, "Unresolved 'super' reference.")),
                    };

                // `this` sits in the frame just inside the `super` frame.
                let instance: Rc<RefCell<LoxInstance>> =
                    match Environment::get_at(&self.environment, distance - 1, "this") {
                        Some(Value::Instance(instance)) => instance,
                        _ => return Err(RuntimeError::new(keyword, "Unresolved 'this' reference.")),
                    };

                match superclass.find_method(&method.lexeme) {
                    Some(found) => Ok(Value::Function(Rc::new(found.bind(&instance)))),
                    None => Err(RuntimeError::new(
                        method,
                        format!("Undefined property '{}'.", method.lexeme),
                    )),
                }
            }
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &Expr,
        operator: &Token,
        right: &Expr,
    ) -> Result<Value, RuntimeError> {
        // The comma operator evaluates left for effect only.
        if operator.token_type == TokenType::COMMA {
            self.evaluate(left)?;
            return self.evaluate(right);
        }

        let left: Value = self.evaluate(left)?;
        let right: Value = self.evaluate(right)?;

        match operator.token_type {
            TokenType::PLUS => match (left, right) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),

                // If either side is a string, the other is stringified.
                (Value::Str(a), b) => Ok(Value::Str(format!("{}{}", a, b))),
                (a, Value::Str(b)) => Ok(Value::Str(format!("{}{}", a, b))),

                _ => Err(RuntimeError::new(
                    operator,
                    "Operands must be two numbers or two strings.",
                )),
            },

            TokenType::MINUS => {
                let (a, b) = number_operands(operator, left, right)?;
                Ok(Value::Number(a - b))
            }

            TokenType::STAR => {
                let (a, b) = number_operands(operator, left, right)?;
                Ok(Value::Number(a * b))
            }

            TokenType::SLASH => {
                let (a, b) = number_operands(operator, left, right)?;

                if b == 0.0 {
                    return Err(RuntimeError::new(operator, "Division by zero."));
                }

                Ok(Value::Number(a / b))
            }

            TokenType::GREATER => {
                let (a, b) = number_operands(operator, left, right)?;
                Ok(Value::Bool(a > b))
            }

            TokenType::GREATER_EQUAL => {
                let (a, b) = number_operands(operator, left, right)?;
                Ok(Value::Bool(a >= b))
            }

            TokenType::LESS => {
                let (a, b) = number_operands(operator, left, right)?;
                Ok(Value::Bool(a < b))
            }

            TokenType::LESS_EQUAL => {
                let (a, b) = number_operands(operator, left, right)?;
                Ok(Value::Bool(a <= b))
            }

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left == right)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left != right)),

            _ => unreachable!("parser produced a non-binary operator"),
        }
    }

    fn call_value(
        &mut self,
        callee: Value,
        arguments: Vec<Value>,
        paren: &Token,
    ) -> Result<Value, RuntimeError> {
        match callee {
            Value::Function(function) => {
                check_arity(function.arity(), arguments.len(), paren)?;

                function.call(self, arguments)
            }

            Value::NativeFunction(native) => {
                check_arity(native.arity, arguments.len(), paren)?;

                (native.func)(&arguments).map_err(|message| RuntimeError::new(paren, message))
            }

            Value::Class(class) => {
                check_arity(class.arity(), arguments.len(), paren)?;

                let instance: Rc<RefCell<LoxInstance>> =
                    Rc::new(RefCell::new(LoxInstance::new(class.clone())));

                if let Some(initializer) = class.find_method("init") {
                    initializer.bind(&instance).call(self, arguments)?;
                }

                Ok(Value::Instance(instance))
            }

            _ => Err(RuntimeError::new(
                paren,
                "Can only call functions and classes.",
            )),
        }
    }

    fn look_up_variable(&self, name: &Token, id: ExprId) -> Result<Value, RuntimeError> {
        let value: Option<Value> = match self.locals.get(&id) {
            Some(&distance) => Environment::get_at(&self.environment, distance, &name.lexeme),
            None => self.globals.borrow().get(&name.lexeme),
        };

        match value {
            Some(Value::Uninit) => Err(RuntimeError::new(
                name,
                format!("Uninitialized variable '{}'.", name.lexeme),
            )),
            Some(value) => Ok(value),
            None => Err(RuntimeError::new(
                name,
                format!("Undefined variable '{}'.", name.lexeme),
            )),
        }
    }
}

/// `false` and `nil` are falsey; every other value is truthy.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Bool(false) | Value::Nil)
}

fn check_arity(expected: usize, got: usize, paren: &Token) -> Result<(), RuntimeError> {
    if expected != got {
        return Err(RuntimeError::new(
            paren,
            format!("Expected {} arguments but got {}.", expected, got),
        ));
    }

    Ok(())
}

fn number_operands(
    operator: &Token,
    left: Value,
    right: Value,
) -> Result<(f64, f64), RuntimeError> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok((a, b)),
        _ => Err(RuntimeError::new(operator, "Operands must be numbers.")),
    }
}
