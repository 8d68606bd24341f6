//! User-defined function values: a shared declaration plus the environment
//! frame captured at the definition site.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::class::LoxInstance;
use crate::environment::Environment;
use crate::error::RuntimeError;
use crate::expr::FunctionExpr;
use crate::interpreter::{Control, Interpreter};
use crate::value::Value;

#[derive(Debug)]
pub struct LoxFunction {
    /// `None` for anonymous `fun` literals.
    name: Option<String>,

    declaration: Rc<FunctionExpr>,

    /// Frame active at the definition site.  Shared, never copied: calls
    /// chain their frame off this one, which is what makes scoping lexical
    /// rather than dynamic.
    closure: Rc<RefCell<Environment>>,

    /// `init` methods always return `this`, even through a bare `return;`.
    is_initializer: bool,
}

impl LoxFunction {
    pub fn new(
        name: Option<String>,
        declaration: Rc<FunctionExpr>,
        closure: Rc<RefCell<Environment>>,
        is_initializer: bool,
    ) -> Self {
        LoxFunction {
            name,
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Produce a bound method: same declaration, but closing over a fresh
    /// frame with `this` bound to `instance`.  The result can be stored and
    /// called later, detached from the original property access.
    pub fn bind(&self, instance: &Rc<RefCell<LoxInstance>>) -> LoxFunction {
        let mut environment = Environment::with_enclosing(self.closure.clone());
        environment.define("this", Value::Instance(instance.clone()));

        LoxFunction {
            name: self.name.clone(),
            declaration: self.declaration.clone(),
            closure: Rc::new(RefCell::new(environment)),
            is_initializer: self.is_initializer,
        }
    }

    /// Execute the body in a fresh frame whose parent is the captured
    /// closure frame (not the caller's frame), with parameters bound
    /// positionally.  The caller has already checked arity.
    pub fn call(
        &self,
        interpreter: &mut Interpreter,
        arguments: Vec<Value>,
    ) -> Result<Value, RuntimeError> {
        debug!(
            "Calling function '{}'",
            self.name.as_deref().unwrap_or("<anonymous>")
        );

        let mut environment = Environment::with_enclosing(self.closure.clone());

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            environment.define(&param.lexeme, argument);
        }

        let control = interpreter.execute_block(&self.declaration.body, environment)?;

        let returned: Value = match control {
            Control::Return(value) => value,
            Control::Normal => Value::Nil,
            // The resolver rejects `break` outside a loop, and the loop
            // executors absorb the signal before it reaches a call frame.
            Control::Break => unreachable!("'break' signal escaped its enclosing loop"),
        };

        if self.is_initializer {
            // `init` returns the instance regardless of how the body exited.
            let this = Environment::get_at(&self.closure, 0, "this");
            return Ok(this.unwrap_or(Value::Nil));
        }

        Ok(returned)
    }
}
