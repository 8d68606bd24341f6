use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::class::{LoxClass, LoxInstance};
use crate::function::LoxFunction;

/// A host function exposed to programs (e.g. `clock`).
pub struct NativeFunction {
    pub name: String,
    pub arity: usize,
    pub func: fn(&[Value]) -> Result<Value, String>,
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<native fn {}>", self.name)
    }
}

/// The closed dynamic value union produced by the evaluator.
///
/// Heap-shaped values (functions, classes, instances) are shared via `Rc`;
/// instances are additionally `RefCell`-wrapped because their field maps are
/// open-ended and mutable.
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,

    /// Sentinel stored for `var x;` without an initializer.  Never escapes
    /// the environment: reading it is a runtime error distinct from reading
    /// an undefined name.
    Uninit,

    NativeFunction(Rc<NativeFunction>),
    Function(Rc<LoxFunction>),
    Class(Rc<LoxClass>),
    Instance(Rc<RefCell<LoxInstance>>),
}

impl PartialEq for Value {
    /// `nil` equals only `nil`; numbers, strings, and booleans compare by
    /// value; callables and instances compare by identity.  No cross-type
    /// coercion.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            (Value::NativeFunction(a), Value::NativeFunction(b)) => Rc::ptr_eq(a, b),
            (Value::Function(a), Value::Function(b)) => Rc::ptr_eq(a, b),
            (Value::Class(a), Value::Class(b)) => Rc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                // 3.0 prints as "3", 3.14 as "3.14"
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::Str(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),

            Value::Uninit => write!(f, "nil"),

            Value::NativeFunction(native) => write!(f, "<native fn {}>", native.name),

            Value::Function(function) => match function.name() {
                Some(name) => write!(f, "<fn {}>", name),
                None => write!(f, "<fn>"),
            },

            Value::Class(class) => write!(f, "{}", class.name),

            Value::Instance(instance) => {
                write!(f, "{} instance", instance.borrow().class().name)
            }
        }
    }
}
