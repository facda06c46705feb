//! Environment frames

use crate::error::{Error, Result};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

pub type Env = Rc<Environment>;

/// A binding frame with an optional parent.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Value>>,
    parent: Option<Env>,
}

impl Environment {
    /// Create a new global frame
    pub fn global() -> Env {
        Rc::new(Self::default())
    }

    /// Create a child frame of `parent`
    pub fn child(parent: &Env) -> Env {
        Rc::new(Self {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    pub fn define(&self, name: impl Into<String>, value: Value) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    pub fn lookup(&self, name: &str) -> Result<Value> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Ok(value.clone());
        }
        match &self.parent {
            Some(parent) => parent.lookup(name),
            None => Err(Error::Unbound(name.to_string())),
        }
    }

    /// Snapshot of this frame's own bindings, sorted by name.
    pub fn bindings(&self) -> Vec<(String, Value)> {
        let mut out: Vec<_> = self
            .bindings
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }
}
