//! Runtime representation of lexical scopes: a rooted tree of frames, each a
//! name→value map with an optional link to its enclosing frame.
//!
//! Frames form a tree rather than a list because several closures may share a
//! common ancestor frame while diverging below it.  Ownership is shared via
//! `Rc<RefCell<_>>`: a frame stays alive as long as any closure captured it or
//! any active call still references it; the global frame lives for the whole
//! session.

use crate::error::{LarchError, Result};
use crate::value::Value;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Shared handle to a frame, the unit the interpreter and closures pass
/// around.
pub type EnvRef = Rc<RefCell<Environment>>;

#[derive(Debug, Default)]
pub struct Environment {
    values: HashMap<String, Value>,
    pub enclosing: Option<EnvRef>,
}

impl Environment {
    /// A root frame with no enclosing link (the global frame).
    pub fn new() -> Self {
        Environment::default()
    }

    /// A child frame chained to `enclosing`.
    pub fn with_enclosing(enclosing: EnvRef) -> Self {
        Environment {
            values: HashMap::new(),
            enclosing: Some(enclosing),
        }
    }

    /// Bind (or rebind) `name` in this frame.
    pub fn define(&mut self, name: &str, value: Value) {
        self.values.insert(name.to_string(), value);
    }

    /// Dynamic lookup: search this frame, then each enclosing frame.
    pub fn get(&self, name: &str, line: usize) -> Result<Value> {
        if let Some(value) = self.values.get(name) {
            Ok(value.clone())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow().get(name, line)
        } else {
            Err(LarchError::name(
                line,
                format!("Undefined variable '{}'", name),
            ))
        }
    }

    /// Dynamic assignment: rebind in the nearest frame already holding `name`.
    pub fn assign(&mut self, name: &str, value: Value, line: usize) -> Result<()> {
        if self.values.contains_key(name) {
            self.values.insert(name.to_string(), value);
            Ok(())
        } else if let Some(enclosing) = &self.enclosing {
            enclosing.borrow_mut().assign(name, value, line)
        } else {
            Err(LarchError::name(
                line,
                format!("Undefined variable '{}'", name),
            ))
        }
    }

    /// Walk exactly `distance` enclosing links up from `env`.
    ///
    /// The resolver only hands out distances it derived from the scope stack,
    /// so the chain is always long enough.
    fn ancestor(env: &EnvRef, distance: usize) -> EnvRef {
        let mut frame: EnvRef = env.clone();

        for _ in 0..distance {
            let next = frame
                .borrow()
                .enclosing
                .clone()
                .expect("environment chain shorter than resolved distance");
            frame = next;
        }

        frame
    }

    /// Read `name` from exactly the frame `distance` hops up the chain.
    pub fn get_at(env: &EnvRef, distance: usize, name: &str, line: usize) -> Result<Value> {
        Environment::ancestor(env, distance).borrow().values.get(name).cloned().ok_or_else(
            || LarchError::name(line, format!("Undefined variable '{}'", name)),
        )
    }

    /// Write `name` in exactly the frame `distance` hops up the chain.
    pub fn assign_at(
        env: &EnvRef,
        distance: usize,
        name: &str,
        value: Value,
        line: usize,
    ) -> Result<()> {
        let frame = Environment::ancestor(env, distance);
        let mut frame = frame.borrow_mut();

        if frame.values.contains_key(name) {
            frame.values.insert(name.to_string(), value);
            Ok(())
        } else {
            Err(LarchError::name(
                line,
                format!("Undefined variable '{}'", name),
            ))
        }
    }
}
