//! Inicio
//!
//! Language pipeline for the `inicio ... fin` teaching language:
//!
//! ```text
//! source -> tokenize -> parse -> check   (syntax tree for display)
//! source -> run                          (console output)
//! ```
//!
//! The two paths never share state; the interpreter re-reads the source
//! lines itself.

pub mod feedback;
pub mod frontend;
pub mod runtime;
pub mod utils;

use log::debug;

use frontend::token::Token;
use frontend::tree::SyntaxTree;
use runtime::{Execution, Interpreter, RunConfig};
use utils::{Error, Result};

pub use frontend::lexer::tokenize;
pub use frontend::parser::parse;
pub use frontend::semantic::check;

/// Artifacts of a successful analysis
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub tokens: Vec<Token>,
    pub tree: SyntaxTree,
}

/// Lex, parse and check `source`, stopping at the first diagnostic
pub fn analyze(source: &str) -> Result<Analysis> {
    let tokens = tokenize(source)?;
    let tree = parse(&tokens)?;
    if !check(&tree) {
        return Err(Error::Semantic {
            message: "semantic check failed".to_string(),
        });
    }
    debug!("analysis completed: {} tokens, {} nodes", tokens.len(), tree.len());
    Ok(Analysis { tokens, tree })
}

/// Interpret `source` with no iteration bound
pub fn run(source: &str) -> Execution {
    run_with_config(source, &RunConfig::default())
}

/// Interpret `source` under `config`
pub fn run_with_config(source: &str, config: &RunConfig) -> Execution {
    Interpreter::new(config.clone()).run(source)
}
