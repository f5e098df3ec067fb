//! Lexer for the inicio language
//!
//! Converts source code into a flat token sequence. At each position the
//! rules are tried in a fixed order and the first that matches wins:
//!
//! 1. STRING   `"` up to the next `"` on the same line
//! 2. NUMBER   one or more ASCII digits
//! 3. ID       letter or `_`, then letters, digits or `_`
//! 4. OP       one of [`OPERATORS`]
//! 5. NEWLINE  `\n`
//! 6. SKIP     spaces, tabs and `\r` (discarded)
//! 7. MISMATCH any other character (fatal)
//!
//! IDs whose text is a reserved word are re-tagged as they are produced.

use log::{debug, trace};

use crate::frontend::token::{Token, TokenKind, OPERATORS};
use crate::utils::{Error, Result};

/// The lexer state
pub struct Lexer {
    /// Source code as chars
    source: Vec<char>,
    /// Current position in source
    pos: usize,
    /// Start position of current token
    start: usize,
    /// Current 1-based line
    line: usize,
}

impl Lexer {
    /// Create a new lexer for the given source code
    pub fn new(source: &str) -> Self {
        Self {
            source: source.chars().collect(),
            pos: 0,
            start: 0,
            line: 1,
        }
    }

    /// Get the current character without advancing
    fn peek(&self) -> Option<char> {
        self.source.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn text(&self) -> String {
        self.source[self.start..self.pos].iter().collect()
    }

    fn make_token(&self, kind: TokenKind) -> Token {
        Token::new(kind, self.text(), self.line)
    }

    /// Length of a string literal starting at the current position, if a
    /// closing quote follows. Literals may span lines.
    fn string_len(&self) -> Option<usize> {
        if self.peek() != Some('"') {
            return None;
        }
        self.source[self.pos + 1..]
            .iter()
            .position(|c| *c == '"')
            .map(|offset| offset + 2)
    }

    fn read_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(c) = self.peek() {
            if !pred(c) {
                break;
            }
            self.advance();
        }
    }

    /// Produce the next token, `Ok(None)` at end of input.
    fn next_token(&mut self) -> Result<Option<Token>> {
        loop {
            self.start = self.pos;
            let c = match self.peek() {
                Some(c) => c,
                None => return Ok(None),
            };

            if let Some(len) = self.string_len() {
                self.pos += len;
                let token = self.make_token(TokenKind::String);
                self.line += token.text.matches('\n').count();
                return Ok(Some(token));
            }

            if c.is_ascii_digit() {
                self.read_while(|c| c.is_ascii_digit());
                return Ok(Some(self.make_token(TokenKind::Number)));
            }

            if c.is_ascii_alphabetic() || c == '_' {
                self.read_while(|c| c.is_alphanumeric() || c == '_');
                let text = self.text();
                let kind = TokenKind::keyword(&text).unwrap_or(TokenKind::Id);
                return Ok(Some(Token::new(kind, text, self.line)));
            }

            if OPERATORS.contains(&c) {
                self.advance();
                return Ok(Some(self.make_token(TokenKind::Op)));
            }

            match c {
                '\n' => {
                    self.advance();
                    let token = self.make_token(TokenKind::Newline);
                    self.line += 1;
                    return Ok(Some(token));
                }
                ' ' | '\t' | '\r' => {
                    self.read_while(|c| matches!(c, ' ' | '\t' | '\r'));
                }
                other => {
                    debug!("lexer rejected {:?} at line {}", other, self.line);
                    return Err(Error::Lex {
                        line: self.line,
                        ch: other,
                    });
                }
            }
        }
    }

    /// Tokenize the entire source and return all tokens
    pub fn tokenize(&mut self) -> Result<Vec<Token>> {
        let mut tokens = Vec::new();
        while let Some(token) = self.next_token()? {
            trace!("{} {:?} line {}", token.kind, token.text, token.line);
            tokens.push(token);
        }
        debug!("lexed {} tokens over {} lines", tokens.len(), self.line);
        Ok(tokens)
    }
}

/// Tokenize `source` in one call
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    Lexer::new(source).tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<TokenKind> {
        tokenize(source)
            .expect("lex failed")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_declaration_and_print() {
        let tokens = tokenize("var x = 5\nimprimir x\n").unwrap();
        let got: Vec<(TokenKind, &str)> =
            tokens.iter().map(|t| (t.kind, t.text.as_str())).collect();

        assert_eq!(
            got,
            vec![
                (TokenKind::Var, "var"),
                (TokenKind::Id, "x"),
                (TokenKind::Op, "="),
                (TokenKind::Number, "5"),
                (TokenKind::Newline, "\n"),
                (TokenKind::Imprimir, "imprimir"),
                (TokenKind::Id, "x"),
                (TokenKind::Newline, "\n"),
            ]
        );
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("inicio\n\nimprimir 1\nfin").unwrap();
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::Fin);
        assert_eq!(last.line, 4);
        assert_eq!(tokens[0].line, 1);
    }

    #[test]
    fn test_keywords_need_exact_text() {
        assert_eq!(
            kinds("si sino fin_si finsi variable"),
            vec![
                TokenKind::Si,
                TokenKind::Sino,
                TokenKind::FinSi,
                TokenKind::Id,
                TokenKind::Id,
            ]
        );
    }

    #[test]
    fn test_string_keeps_quotes() {
        let tokens = tokenize("imprimir \"hola mundo\"").unwrap();
        assert_eq!(tokens[1].kind, TokenKind::String);
        assert_eq!(tokens[1].text, "\"hola mundo\"");
    }

    #[test]
    fn test_number_before_identifier() {
        let tokens = tokenize("12ab").unwrap();
        assert_eq!(tokens[0].kind, TokenKind::Number);
        assert_eq!(tokens[0].text, "12");
        assert_eq!(tokens[1].kind, TokenKind::Id);
        assert_eq!(tokens[1].text, "ab");
    }

    #[test]
    fn test_operators_are_single_characters() {
        let tokens = tokenize("i <= 3;").unwrap();
        let ops: Vec<&str> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Op)
            .map(|t| t.text.as_str())
            .collect();
        assert_eq!(ops, vec!["<", "=", ";"]);
    }

    #[test]
    fn test_unexpected_character_line() {
        let err = tokenize("inicio\nvar x = 1\nimprimir @\nfin").unwrap_err();
        assert_eq!(err, Error::Lex { line: 3, ch: '@' });
    }

    #[test]
    fn test_unterminated_string_is_rejected() {
        let err = tokenize("imprimir \"abierta\nfin").unwrap_err();
        assert_eq!(err, Error::Lex { line: 1, ch: '"' });
    }

    #[test]
    fn test_string_may_span_lines() {
        let tokens = tokenize("imprimir \"dos\nlineas\"\nfin").unwrap();
        assert_eq!(tokens[1], Token::new(TokenKind::String, "\"dos\nlineas\"", 1));
        assert_eq!(tokens[2], Token::new(TokenKind::Newline, "\n", 2));
        assert_eq!(tokens[3], Token::new(TokenKind::Fin, "fin", 3));

        let err = tokenize("imprimir \"a\nb\"\n@").unwrap_err();
        assert_eq!(err, Error::Lex { line: 3, ch: '@' });
    }

    #[test]
    fn test_identifier_must_start_with_ascii_letter() {
        let err = tokenize("var ñandu = 1").unwrap_err();
        assert_eq!(err, Error::Lex { line: 1, ch: 'ñ' });
        assert_eq!(kinds("_x1 añoz"), vec![TokenKind::Id, TokenKind::Id]);
    }

    #[test]
    fn test_crlf_is_a_newline() {
        assert_eq!(
            kinds("inicio\r\nfin"),
            vec![TokenKind::Inicio, TokenKind::Newline, TokenKind::Fin]
        );
    }

    #[test]
    fn test_blank_input_has_no_tokens() {
        assert!(kinds(" \t ").is_empty());
        assert!(kinds("").is_empty());
    }
}
