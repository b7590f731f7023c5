use std::rc::Rc;

use crate::callable::{Callable, LarchFunction, NativeFn};

/// A runtime value: one of the four primitives, a native function, or a
/// user-defined function (closure).
#[derive(Debug, Clone)]
pub enum Value {
    Number(f64),
    Str(String),
    Bool(bool),
    Nil,
    Native(Rc<NativeFn>),
    Function(Rc<LarchFunction>),
}

impl Value {
    /// Truthiness rule: only `false` and `nil` are falsey; everything else,
    /// including `0` and the empty string, is truthy.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Bool(false))
    }

    /// View this value through the [`Callable`] capability, if it has one.
    pub fn as_callable(&self) -> Option<&dyn Callable> {
        match self {
            Value::Native(f) => Some(f.as_ref()),
            Value::Function(f) => Some(f.as_ref()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    /// Value equality as used by `==` / `!=`: `nil` equals only `nil`,
    /// numbers compare by value, strings by content, booleans by value.
    /// Every other combination, cross-type pairs and function values
    /// included, is unequal.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Nil, Value::Nil) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 {
                    write!(f, "{:.0}", n)
                } else {
                    write!(f, "{}", n)
                }
            }

            Value::Str(s) => write!(f, "{}", s),

            Value::Bool(b) => write!(f, "{}", b),

            Value::Nil => write!(f, "nil"),

            Value::Native(func) => write!(f, "<native fn {}>", func.name()),

            Value::Function(func) => write!(f, "<fn {}>", func.name()),
        }
    }
}
