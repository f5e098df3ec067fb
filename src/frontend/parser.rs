//! Parser for the inicio language
//!
//! Single left-to-right pass over the token sequence that builds a display
//! tree. Block keywords push onto an explicit navigation stack and their
//! closers pop it; a closer that does not match the innermost open block is
//! a syntax error.

use log::{debug, trace};

use crate::frontend::token::{Token, TokenKind};
use crate::frontend::tree::{NodeId, SyntaxTree};
use crate::utils::{Error, Result};

/// Block kinds that open a level in the tree
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Si,
    Sino,
    Funcion,
    Para,
}

impl Block {
    fn opener(&self) -> &'static str {
        match self {
            Block::Si => "si",
            Block::Sino => "sino",
            Block::Funcion => "funcion",
            Block::Para => "para",
        }
    }

    fn closer(&self) -> &'static str {
        match self {
            Block::Si | Block::Sino => "fin_si",
            Block::Funcion => "fin_funcion",
            Block::Para => "fin_para",
        }
    }
}

/// One open block on the navigation stack
#[derive(Debug, Clone, Copy)]
struct Frame {
    node: NodeId,
    block: Block,
    line: usize,
}

/// The parser
pub struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    /// Index of the closing `fin`
    end: usize,
    tree: SyntaxTree,
    stack: Vec<Frame>,
}

impl<'a> Parser<'a> {
    /// Create a parser over pre-tokenized input
    pub fn from_tokens(tokens: &'a [Token]) -> Self {
        Self {
            tokens,
            pos: 0,
            end: 0,
            tree: SyntaxTree::new(),
            stack: Vec::new(),
        }
    }

    // ==================== Helper Methods ====================

    fn error(&self, expected: impl Into<String>, index: usize) -> Error {
        let line = self
            .tokens
            .get(index)
            .or_else(|| self.tokens.last())
            .map(|t| t.line)
            .unwrap_or(1);
        Error::Syntax {
            expected: expected.into(),
            index,
            line,
        }
    }

    fn current(&self) -> NodeId {
        self.stack
            .last()
            .map(|frame| frame.node)
            .unwrap_or_else(|| self.tree.root())
    }

    /// Index of the first NEWLINE at or after `from`, capped at `end`
    fn line_end(&self, from: usize) -> usize {
        (from..self.end)
            .find(|i| self.tokens[*i].kind == TokenKind::Newline)
            .unwrap_or(self.end)
    }

    fn open(&mut self, label: String, block: Block, line: usize) {
        let node = self.tree.push_child(self.current(), label);
        debug!("open {} at line {} (depth {})", block.opener(), line, self.stack.len() + 1);
        self.stack.push(Frame { node, block, line });
    }

    /// Pop the innermost block if it is one of `accepted`
    fn close(&mut self, accepted: &[Block], keyword: &str) -> Result<Frame> {
        match self.stack.last() {
            Some(frame) if accepted.contains(&frame.block) => {
                let frame = *frame;
                self.stack.pop();
                debug!("close {} opened at line {}", frame.block.opener(), frame.line);
                Ok(frame)
            }
            Some(frame) => Err(self.error(
                format!(
                    "expected {} to close {} from line {}, found {}",
                    frame.block.closer(),
                    frame.block.opener(),
                    frame.line,
                    keyword
                ),
                self.pos,
            )),
            None => Err(self.error(format!("{} without an open block", keyword), self.pos)),
        }
    }

    // ==================== Parsing Methods ====================

    /// Parse the token sequence into a syntax tree
    pub fn parse(mut self) -> Result<SyntaxTree> {
        let (first, last) = self.bounds()?;
        self.pos = first + 1;
        self.end = last;

        while self.pos < self.end {
            self.parse_token()?;
        }

        if let Some(frame) = self.stack.last() {
            return Err(self.error(
                format!(
                    "expected {} to close {} from line {}",
                    frame.block.closer(),
                    frame.block.opener(),
                    frame.line
                ),
                self.end,
            ));
        }

        let root = self.tree.root();
        self.tree.push_child(root, "fin");
        debug!("parsed syntax tree with {} nodes", self.tree.len());
        Ok(self.tree)
    }

    /// Indices of the `inicio` and `fin` tokens, ignoring blank lines around them
    fn bounds(&self) -> Result<(usize, usize)> {
        let significant = |t: &&Token| t.kind != TokenKind::Newline;
        let first = self.tokens.iter().position(|t| significant(&t));
        let last = self.tokens.iter().rposition(|t| significant(&t));

        match (first, last) {
            (Some(first), Some(last))
                if first < last
                    && self.tokens[first].kind == TokenKind::Inicio
                    && self.tokens[last].kind == TokenKind::Fin =>
            {
                Ok((first, last))
            }
            _ => Err(self.error("program must start with inicio and end with fin", 0)),
        }
    }

    fn parse_token(&mut self) -> Result<()> {
        let tokens = self.tokens;
        let token = &tokens[self.pos];
        trace!("parse {} {:?} at {}", token.kind, token.text, self.pos);

        match token.kind {
            TokenKind::Newline => {
                self.pos += 1;
            }
            TokenKind::Imprimir => self.parse_imprimir()?,
            TokenKind::Si => self.parse_si()?,
            TokenKind::Sino => {
                let line = token.line;
                self.close(&[Block::Si], "sino")?;
                self.open("sino".to_string(), Block::Sino, line);
                self.pos += 1;
            }
            TokenKind::FinSi => {
                self.close(&[Block::Si, Block::Sino], "fin_si")?;
                self.pos += 1;
            }
            TokenKind::Var => {
                let stop = self.line_end(self.pos + 1);
                let text = join_tokens(&self.tokens[self.pos + 1..stop]);
                let current = self.current();
                self.tree.push_child(current, format!("var {}", text));
                self.pos = stop;
            }
            TokenKind::Funcion => self.parse_funcion()?,
            TokenKind::FinFuncion => {
                self.close(&[Block::Funcion], "fin_funcion")?;
                self.pos += 1;
            }
            TokenKind::Para => self.parse_para()?,
            TokenKind::FinPara => {
                self.close(&[Block::Para], "fin_para")?;
                self.pos += 1;
            }
            _ => {
                let current = self.current();
                self.tree.push_child(current, token.text.clone());
                self.pos += 1;
            }
        }
        Ok(())
    }

    fn parse_imprimir(&mut self) -> Result<()> {
        let operand = self
            .tokens
            .get(self.pos + 1)
            .filter(|_| self.pos + 1 < self.end)
            .filter(|t| matches!(t.kind, TokenKind::Id | TokenKind::Number | TokenKind::String));

        match operand {
            Some(operand) => {
                let label = format!("imprimir {}", operand.text);
                let current = self.current();
                self.tree.push_child(current, label);
                self.pos += 2;
                Ok(())
            }
            None => Err(self.error(
                format!(
                    "expected identifier, number or string after imprimir at token {}",
                    self.pos
                ),
                self.pos,
            )),
        }
    }

    fn parse_si(&mut self) -> Result<()> {
        let line = self.tokens[self.pos].line;
        let stop = self.line_end(self.pos + 1);
        let entonces = (self.pos + 1..stop).find(|i| self.tokens[*i].kind == TokenKind::Entonces);

        let entonces = match entonces {
            Some(i) => i,
            None => return Err(self.error("expected entonces after si condition", self.pos)),
        };
        if entonces == self.pos + 1 {
            return Err(self.error("expected condition after si", self.pos));
        }

        let condition = join_tokens(&self.tokens[self.pos + 1..entonces]);
        self.open(format!("si {} entonces", condition), Block::Si, line);
        self.pos = entonces + 1;
        Ok(())
    }

    fn parse_funcion(&mut self) -> Result<()> {
        let line = self.tokens[self.pos].line;
        let name = self
            .tokens
            .get(self.pos + 1)
            .filter(|_| self.pos + 1 < self.end)
            .filter(|t| t.kind == TokenKind::Id)
            .map(|t| t.text.clone());

        match name {
            Some(name) => {
                self.open(format!("funcion {}", name), Block::Funcion, line);
                self.pos += 2;
                Ok(())
            }
            None => Err(self.error("expected function name after funcion", self.pos)),
        }
    }

    fn parse_para(&mut self) -> Result<()> {
        let line = self.tokens[self.pos].line;
        let stop = self.line_end(self.pos + 1);
        let header = &self.tokens[self.pos + 1..stop];

        let clauses: Vec<&[Token]> = header
            .split(|t| t.kind == TokenKind::Op && t.text == ";")
            .collect();
        if clauses.len() != 3 || clauses.iter().any(|c| c.is_empty()) {
            return Err(self.error(
                "expected three clauses after para: <init>; <condition>; <increment>",
                self.pos,
            ));
        }

        let label = format!(
            "para {}; {}; {}",
            join_tokens(clauses[0]),
            join_tokens(clauses[1]),
            join_tokens(clauses[2])
        );
        self.open(label, Block::Para, line);
        self.pos = stop;
        Ok(())
    }
}

/// Rebuild display text from tokens, re-joining two-character comparisons
fn join_tokens(tokens: &[Token]) -> String {
    let mut out = String::new();
    let mut prev: Option<&Token> = None;
    for token in tokens {
        let glued = prev.map_or(false, |p| {
            p.kind == TokenKind::Op
                && token.kind == TokenKind::Op
                && token.text == "="
                && matches!(p.text.as_str(), "=" | "<" | ">")
        });
        if !out.is_empty() && !glued {
            out.push(' ');
        }
        out.push_str(&token.text);
        // a glued pair never glues again
        prev = if glued { None } else { Some(token) };
    }
    out
}

/// Parse a token sequence in one call
pub fn parse(tokens: &[Token]) -> Result<SyntaxTree> {
    Parser::from_tokens(tokens).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frontend::lexer::tokenize;

    fn parse_source(source: &str) -> Result<SyntaxTree> {
        let tokens = tokenize(source)?;
        parse(&tokens)
    }

    #[test]
    fn test_requires_inicio_and_fin() {
        for source in ["", "\n", "var x = 1", "inicio\nimprimir 1", "imprimir 1\nfin", "fin", "inicio"] {
            let err = parse_source(source).unwrap_err();
            assert_eq!(err.message(), "program must start with inicio and end with fin");
        }
    }

    #[test]
    fn test_minimal_program() {
        let tree = parse_source("inicio\nfin\n").unwrap();
        assert_eq!(tree.child_labels(tree.root()), vec!["fin"]);
    }

    #[test]
    fn test_statements_under_root() {
        let tree = parse_source("inicio\nvar x = 5\nimprimir x\nfin").unwrap();
        assert_eq!(
            tree.child_labels(tree.root()),
            vec!["var x = 5", "imprimir x", "fin"]
        );
    }

    #[test]
    fn test_si_block_nests() {
        let tree = parse_source("inicio\nsi x == 5 entonces\nimprimir \"yes\"\nfin_si\nimprimir x\nfin").unwrap();
        let root = tree.root();
        assert_eq!(
            tree.child_labels(root),
            vec!["si x == 5 entonces", "imprimir x", "fin"]
        );
        let si = tree.children(root)[0];
        assert_eq!(tree.child_labels(si), vec!["imprimir \"yes\""]);
    }

    #[test]
    fn test_sino_is_sibling_of_si() {
        let tree = parse_source(
            "inicio\nsi x == 1 entonces\nimprimir 1\nsino\nimprimir 2\nfin_si\nfin",
        )
        .unwrap();
        let root = tree.root();
        assert_eq!(
            tree.child_labels(root),
            vec!["si x == 1 entonces", "sino", "fin"]
        );
        let sino = tree.children(root)[1];
        assert_eq!(tree.child_labels(sino), vec!["imprimir 2"]);
    }

    #[test]
    fn test_nested_si_blocks() {
        let tree = parse_source(
            "inicio\nsi a == 1 entonces\nsi b == 2 entonces\nimprimir b\nfin_si\nimprimir a\nfin_si\nfin",
        )
        .unwrap();
        let outer = tree.children(tree.root())[0];
        assert_eq!(
            tree.child_labels(outer),
            vec!["si b == 2 entonces", "imprimir a"]
        );
    }

    #[test]
    fn test_para_and_funcion_labels() {
        let tree = parse_source(
            "inicio\nfuncion saludar\nimprimir \"hola\"\nfin_funcion\npara var i = 0; i < 3; i = i + 1\nimprimir i\nfin_para\nfin",
        )
        .unwrap();
        let root = tree.root();
        assert_eq!(
            tree.child_labels(root),
            vec!["funcion saludar", "para var i = 0; i < 3; i = i + 1", "fin"]
        );
        let para = tree.children(root)[1];
        assert_eq!(tree.child_labels(para), vec!["imprimir i"]);
    }

    #[test]
    fn test_comparison_operators_are_rejoined() {
        let tree = parse_source("inicio\nsi a <= 3 entonces\nfin_si\nfin").unwrap();
        assert_eq!(tree.child_labels(tree.root())[0], "si a <= 3 entonces");
    }

    #[test]
    fn test_unknown_tokens_become_leaves() {
        let tree = parse_source("inicio\nretornar 4\nfin").unwrap();
        assert_eq!(tree.child_labels(tree.root()), vec!["retornar", "4", "fin"]);
    }

    #[test]
    fn test_imprimir_needs_operand() {
        let err = parse_source("inicio\nimprimir\nfin").unwrap_err();
        assert!(matches!(err, Error::Syntax { index: 2, line: 2, .. }));
    }

    #[test]
    fn test_si_needs_entonces() {
        let err = parse_source("inicio\nsi x == 1\nimprimir x\nfin_si\nfin").unwrap_err();
        assert_eq!(err.message(), "expected entonces after si condition");
    }

    #[test]
    fn test_mismatched_close() {
        let err = parse_source("inicio\nsi x == 1 entonces\nfin_para\nfin").unwrap_err();
        assert!(err.message().starts_with("expected fin_si"));
    }

    #[test]
    fn test_unclosed_block() {
        let err = parse_source("inicio\npara var i = 0; i < 2; i = i + 1\nimprimir i\nfin").unwrap_err();
        assert!(err.message().starts_with("expected fin_para"));
    }

    #[test]
    fn test_stray_close() {
        let err = parse_source("inicio\nfin_si\nfin").unwrap_err();
        assert_eq!(err.message(), "fin_si without an open block");
    }

    #[test]
    fn test_para_needs_three_clauses() {
        let err = parse_source("inicio\npara var i = 0; i < 2\nfin_para\nfin").unwrap_err();
        assert!(err.message().starts_with("expected three clauses"));
    }

    #[test]
    fn test_parse_is_repeatable() {
        let source = "inicio\nsi x == 1 entonces\nimprimir x\nfin_si\nfin";
        assert_eq!(parse_source(source).unwrap(), parse_source(source).unwrap());
    }
}
