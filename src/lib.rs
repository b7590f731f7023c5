pub mod ast;
pub mod callable;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod resolver;
pub mod run;
pub mod scanner;
pub mod token;
pub mod value;

pub use error::{ErrorKind, LarchError, Result};
pub use run::{ExecutionResult, Session};
pub use value::Value;
