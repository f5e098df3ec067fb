//! Structured Feedback Module
//!
//! Machine-readable results for front ends (editor panes, web launchers):
//! - stage-tagged diagnostics
//! - the syntax tree for outline display
//! - interpreter console output

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::frontend::tree::SyntaxTree;
use crate::runtime::Execution;
use crate::utils::{Error, Stage};
use crate::Analysis;

// ==================== Diagnostic ====================

/// One error, tagged with the stage that produced it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub stage: Stage,
    pub message: String,
    pub line: Option<usize>,
}

impl From<&Error> for Diagnostic {
    fn from(error: &Error) -> Self {
        Self {
            stage: error.stage(),
            message: error.message(),
            line: error.line(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.stage, self.message)?;
        match (self.stage, self.line) {
            // lexer messages already name the line
            (Stage::Lex, _) | (_, None) => Ok(()),
            (_, Some(line)) => write!(f, " (line {})", line),
        }
    }
}

// ==================== Analysis ====================

#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisStats {
    pub token_count: usize,
    pub node_count: usize,
    pub line_count: usize,
}

/// Result of lex + parse + check
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub success: bool,
    pub source_file: String,
    pub diagnostic: Option<Diagnostic>,
    pub tree: Option<SyntaxTree>,
    pub stats: AnalysisStats,
}

impl AnalysisReport {
    pub fn new(source_file: &str, source: &str, result: &Result<Analysis, Error>) -> Self {
        let line_count = source.lines().count();
        match result {
            Ok(analysis) => Self {
                success: true,
                source_file: source_file.to_string(),
                diagnostic: None,
                tree: Some(analysis.tree.clone()),
                stats: AnalysisStats {
                    token_count: analysis.tokens.len(),
                    node_count: analysis.tree.len(),
                    line_count,
                },
            },
            Err(error) => Self {
                success: false,
                source_file: source_file.to_string(),
                diagnostic: Some(Diagnostic::from(error)),
                tree: None,
                stats: AnalysisStats {
                    line_count,
                    ..AnalysisStats::default()
                },
            },
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Output as compact JSON (for programmatic use)
    pub fn to_json_compact(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

// ==================== Run ====================

/// Console output of one interpreter run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub success: bool,
    pub source_file: String,
    pub output: Vec<String>,
    pub diagnostic: Option<Diagnostic>,
}

impl RunReport {
    pub fn new(source_file: &str, execution: &Execution) -> Self {
        Self {
            success: execution.is_ok(),
            source_file: source_file.to_string(),
            output: execution.output.clone(),
            diagnostic: execution.error.as_ref().map(Diagnostic::from),
        }
    }

    /// Output as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
