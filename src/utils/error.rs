//! Error handling for the inicio pipeline

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Pipeline stage that produced a diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Lex,
    Parse,
    Semantic,
    Runtime,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Lex => "lexical",
            Stage::Parse => "syntax",
            Stage::Semantic => "semantic",
            Stage::Runtime => "runtime",
        };
        f.write_str(name)
    }
}

/// Pipeline error. Every stage stops at the first one.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // ==================== Lexer Errors ====================

    #[error("unexpected character {ch} at line {line}")]
    Lex { line: usize, ch: char },

    // ==================== Parser Errors ====================

    #[error("{expected} (token {index}, line {line})")]
    Syntax {
        expected: String,
        index: usize,
        line: usize,
    },

    // ==================== Semantic Errors ====================

    #[error("{message}")]
    Semantic { message: String },

    // ==================== Runtime Errors ====================

    #[error("{detail} at line {line}")]
    Runtime { line: usize, detail: String },

    #[error("IO error: {0}")]
    Io(String),
}

impl Error {
    /// Stage tag for this error
    pub fn stage(&self) -> Stage {
        match self {
            Self::Lex { .. } => Stage::Lex,
            Self::Syntax { .. } => Stage::Parse,
            Self::Semantic { .. } => Stage::Semantic,
            Self::Runtime { .. } | Self::Io(_) => Stage::Runtime,
        }
    }

    /// Source line, when the stage knows it
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Lex { line, .. } => Some(*line),
            Self::Syntax { line, .. } => Some(*line),
            Self::Runtime { line, .. } => Some(*line),
            Self::Semantic { .. } | Self::Io(_) => None,
        }
    }

    /// Message without location decoration
    pub fn message(&self) -> String {
        match self {
            Self::Lex { .. } => self.to_string(),
            Self::Syntax { expected, .. } => expected.clone(),
            Self::Semantic { message } => message.clone(),
            Self::Runtime { detail, .. } => detail.clone(),
            Self::Io(msg) => msg.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lex_message_names_character_and_line() {
        let err = Error::Lex { line: 3, ch: '@' };
        assert_eq!(err.to_string(), "unexpected character @ at line 3");
        assert_eq!(err.stage(), Stage::Lex);
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_syntax_message_is_bare_expectation() {
        let err = Error::Syntax {
            expected: "expected fin_si".to_string(),
            index: 7,
            line: 2,
        };
        assert_eq!(err.message(), "expected fin_si");
        assert_eq!(err.to_string(), "expected fin_si (token 7, line 2)");
        assert_eq!(err.stage(), Stage::Parse);
    }

    #[test]
    fn test_semantic_has_no_line() {
        let err = Error::Semantic { message: "rejected".to_string() };
        assert_eq!(err.line(), None);
        assert_eq!(err.stage(), Stage::Semantic);
    }
}
