//! Semantic check over the syntax tree
//!
//! No semantic rules are defined for the language yet, so every tree passes.

use log::debug;

use crate::frontend::tree::SyntaxTree;

/// Checker pass run after parsing
#[derive(Debug, Default)]
pub struct SemanticChecker {
    checked: usize,
}

impl SemanticChecker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check a tree. Always succeeds.
    pub fn check(&mut self, tree: &SyntaxTree) -> bool {
        self.checked += 1;
        debug!("semantic check passed ({} nodes, run {})", tree.len(), self.checked);
        true
    }

    /// Number of trees this checker has seen
    pub fn checked(&self) -> usize {
        self.checked
    }
}

/// Check a tree in one call
pub fn check(tree: &SyntaxTree) -> bool {
    SemanticChecker::new().check(tree)
}
