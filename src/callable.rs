//! The `Callable` capability and its two implementations: built-in native
//! functions and user-defined function values (closures).

use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

use log::debug;

use crate::ast::{Ast, FunctionDecl};
use crate::environment::{EnvRef, Environment};
use crate::error::Result;
use crate::interpreter::{Control, Interpreter};
use crate::value::Value;

/// Polymorphic call capability: a fixed arity and an invocation against the
/// running interpreter.  The call-site (arity check, depth guard) lives in
/// the interpreter; implementations only perform the call itself.
pub trait Callable {
    /// Fixed number of arguments this callable requires.
    fn arity(&self) -> usize;

    /// Invoke with already-evaluated arguments, in call-site order.
    fn call(&self, interpreter: &mut Interpreter, ast: &Ast, arguments: Vec<Value>)
        -> Result<Value>;

    /// Name used in diagnostics and value display.
    fn name(&self) -> &str;
}

/// A built-in function backed by a plain function pointer.
pub struct NativeFn {
    name: &'static str,
    arity: usize,
    func: fn(&mut Interpreter, &[Value]) -> Result<Value>,
}

impl std::fmt::Debug for NativeFn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeFn")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

impl Callable for NativeFn {
    fn arity(&self) -> usize {
        self.arity
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        _ast: &Ast,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        debug!("Calling native function '{}'", self.name);

        (self.func)(interpreter, &arguments)
    }

    fn name(&self) -> &str {
        self.name
    }
}

/// `clock()`: seconds since the Unix epoch, as a Number.
fn native_clock(_interpreter: &mut Interpreter, _arguments: &[Value]) -> Result<Value> {
    let timestamp: f64 = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0); // pre-epoch host clock reads as 0

    Ok(Value::Number(timestamp))
}

/// `println(v)`: write `v`'s display form and a newline to the interpreter's
/// output sink, return `nil`.
fn native_println(interpreter: &mut Interpreter, arguments: &[Value]) -> Result<Value> {
    interpreter.write_line(arguments[0].to_string());

    Ok(Value::Nil)
}

/// The built-in functions installed into a fresh global frame.
pub fn natives() -> Vec<Rc<NativeFn>> {
    vec![
        Rc::new(NativeFn {
            name: "clock",
            arity: 0,
            func: native_clock,
        }),
        Rc::new(NativeFn {
            name: "println",
            arity: 1,
            func: native_println,
        }),
    ]
}

/// A user-defined function value: the parsed declaration plus a persistent
/// reference to the frame that was current at its definition site.
#[derive(Debug)]
pub struct LarchFunction {
    pub declaration: Rc<FunctionDecl>,
    pub closure: EnvRef,
}

impl Callable for LarchFunction {
    fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    fn call(
        &self,
        interpreter: &mut Interpreter,
        ast: &Ast,
        arguments: Vec<Value>,
    ) -> Result<Value> {
        debug!("Calling function '{}'", self.name());

        // The new frame encloses the *captured* frame, not the caller's.
        // This is what makes scoping lexical rather than dynamic.
        let mut frame = Environment::with_enclosing(self.closure.clone());

        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            frame.define(&param.lexeme, argument);
        }

        match interpreter.execute_block(ast, &self.declaration.body, frame)? {
            Control::Return(value) => Ok(value),
            Control::Complete => Ok(Value::Nil),
        }
    }

    fn name(&self) -> &str {
        &self.declaration.name.lexeme
    }
}
