//! Runtime representation of classes and their instances.
//!
//! A class carries two method tables: instance methods, looked up through
//! `LoxInstance::get` and bound to the receiver, and class-level methods
//! (declared with a leading `class` keyword), looked up on the class value
//! itself.  Both lookups walk the superclass chain, nearest definition wins.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::RuntimeError;
use crate::function::LoxFunction;
use crate::token::Token;
use crate::value::Value;

#[derive(Debug)]
pub struct LoxClass {
    pub name: String,
    superclass: Option<Rc<LoxClass>>,
    methods: HashMap<String, Rc<LoxFunction>>,
    class_methods: HashMap<String, Rc<LoxFunction>>,
}

impl LoxClass {
    pub fn new(
        name: String,
        superclass: Option<Rc<LoxClass>>,
        methods: HashMap<String, Rc<LoxFunction>>,
        class_methods: HashMap<String, Rc<LoxFunction>>,
    ) -> Self {
        LoxClass {
            name,
            superclass,
            methods,
            class_methods,
        }
    }

    /// Instance-method lookup, walking up the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.methods.get(name) {
            return Some(method.clone());
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_method(name))
    }

    /// Class-level ("static") method lookup, also inherited.
    pub fn find_class_method(&self, name: &str) -> Option<Rc<LoxFunction>> {
        if let Some(method) = self.class_methods.get(name) {
            return Some(method.clone());
        }

        self.superclass
            .as_ref()
            .and_then(|superclass| superclass.find_class_method(name))
    }

    /// A class is called like a function; its arity is `init`'s, or zero.
    pub fn arity(&self) -> usize {
        self.find_method("init")
            .map_or(0, |initializer| initializer.arity())
    }
}

#[derive(Debug)]
pub struct LoxInstance {
    class: Rc<LoxClass>,
    fields: HashMap<String, Value>,
}

impl LoxInstance {
    pub fn new(class: Rc<LoxClass>) -> Self {
        LoxInstance {
            class,
            fields: HashMap::new(),
        }
    }

    pub fn class(&self) -> &Rc<LoxClass> {
        &self.class
    }

    /// Property read: fields shadow methods; a method hit is bound to the
    /// receiver.  Takes the shared handle because binding captures it.
    pub fn get(instance: &Rc<RefCell<LoxInstance>>, name: &Token) -> Result<Value, RuntimeError> {
        if let Some(value) = instance.borrow().fields.get(&name.lexeme) {
            return Ok(value.clone());
        }

        let method = instance.borrow().class.find_method(&name.lexeme);
        if let Some(method) = method {
            return Ok(Value::Function(Rc::new(method.bind(instance))));
        }

        Err(RuntimeError::new(
            name,
            format!("Undefined property '{}'.", name.lexeme),
        ))
    }

    /// Property write: creates or overwrites a field, never a method.
    pub fn set(&mut self, name: &Token, value: Value) {
        self.fields.insert(name.lexeme.clone(), value);
    }
}
