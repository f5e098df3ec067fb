//! Runtime module - Values, Expression Evaluation, Interpreter

pub mod config;
pub mod value;
pub mod eval;
pub mod interpreter;

pub use config::RunConfig;
pub use interpreter::{Execution, Interpreter};
pub use value::{Environment, FunctionTable, Value};
