//! Mutable scope frames with parent back-references.
//!
//! Frames are shared (`Rc<RefCell<_>>`): several closures defined in the same
//! block alias one frame and see each other's mutations.  A frame's parent is
//! fixed at creation and never rebound; the chain stays alive as long as any
//! closure below it is reachable.

use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Debug)]
pub struct Environment {
    values: HashMap<String, Value>,
    enclosing: Option<Rc<RefCell<Environment>>>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    pub fn new() -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: None,
        }
    }

    pub fn with_enclosing(enclosing: Rc<RefCell<Environment>>) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind (or rebind) `name` in *this* frame.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Look `name` up in this frame or any enclosing one.  `None` means the
    /// name is undefined; the caller owns the diagnostic (it has the token).
    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.values.get(name) {
            Some(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name)
        } else {
            None
        }
    }

    /// Assign to `name` in the nearest frame that defines it.  Returns
    /// `false` only when no frame in the chain defines the name; a
    /// successful write in an enclosing frame never falls through to the
    /// error path.
    pub fn assign(&mut self, name: &str, value: Value) -> bool {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
            true
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value)
        } else {
            false
        }
    }

    /// The frame exactly `distance` parent hops above `env`.  `None` if the
    /// chain is shorter, which signals a resolver/interpreter mismatch.
    fn ancestor(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
    ) -> Option<Rc<RefCell<Environment>>> {
        let mut frame: Rc<RefCell<Environment>> = env.clone();

        for _ in 0..distance {
            let parent = frame.borrow().enclosing.clone()?;
            frame = parent;
        }

        Some(frame)
    }

    /// Distance-indexed read: operate directly on the frame the resolver
    /// pointed at, without searching.
    pub fn get_at(env: &Rc<RefCell<Environment>>, distance: usize, name: &str) -> Option<Value> {
        let frame = Self::ancestor(env, distance)?;
        let value = frame.borrow().values.get(name).cloned();
        value
    }

    /// Distance-indexed write.  Returns `false` if the resolved frame does
    /// not hold the name.
    pub fn assign_at(
        env: &Rc<RefCell<Environment>>,
        distance: usize,
        name: &str,
        value: Value,
    ) -> bool {
        match Self::ancestor(env, distance) {
            Some(frame) => {
                let mut frame = frame.borrow_mut();
                match frame.values.get_mut(name) {
                    Some(slot) => {
                        *slot = value;
                        true
                    }
                    None => false,
                }
            }
            None => false,
        }
    }
}
