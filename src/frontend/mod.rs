//! Frontend module - Lexer, Parser, Semantic Check

pub mod token;
pub mod lexer;
pub mod tree;
pub mod parser;
pub mod semantic;
