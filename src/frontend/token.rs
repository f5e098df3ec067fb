//! Token definitions for the inicio language

use serde::{Deserialize, Serialize};
use std::fmt;

/// Reserved words, in the order editors offer them for completion
pub const KEYWORDS: [&str; 14] = [
    "inicio",
    "fin",
    "funcion",
    "retornar",
    "var",
    "mientras",
    "si",
    "entonces",
    "fin_si",
    "sino",
    "para",
    "imprimir",
    "fin_funcion",
    "fin_para",
];

/// Single-character operators the lexer accepts
pub const OPERATORS: [char; 10] = ['+', '-', '*', '/', '=', '<', '>', ';', '(', ')'];

/// A token produced by the lexer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// 1-based source line
    pub line: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
        }
    }
}

/// Token kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenKind {
    // ============ Keywords ============
    /// inicio
    Inicio,
    /// fin
    Fin,
    /// funcion
    Funcion,
    /// retornar
    Retornar,
    /// var
    Var,
    /// mientras
    Mientras,
    /// si
    Si,
    /// entonces
    Entonces,
    /// fin_si
    FinSi,
    /// sino
    Sino,
    /// para
    Para,
    /// imprimir
    Imprimir,
    /// fin_funcion
    FinFuncion,
    /// fin_para
    FinPara,

    // ============ Literals & Names ============
    /// "double quoted"
    String,
    /// 42
    Number,
    /// letters, digits and underscores, not starting with a digit
    Id,

    // ============ Punctuation ============
    /// single-character operator
    Op,
    /// line break
    Newline,
    /// anything else; never leaves the lexer
    Mismatch,
}

impl TokenKind {
    /// Keyword kind for an identifier's text (case-sensitive)
    pub fn keyword(text: &str) -> Option<TokenKind> {
        let kind = match text {
            "inicio" => TokenKind::Inicio,
            "fin" => TokenKind::Fin,
            "funcion" => TokenKind::Funcion,
            "retornar" => TokenKind::Retornar,
            "var" => TokenKind::Var,
            "mientras" => TokenKind::Mientras,
            "si" => TokenKind::Si,
            "entonces" => TokenKind::Entonces,
            "fin_si" => TokenKind::FinSi,
            "sino" => TokenKind::Sino,
            "para" => TokenKind::Para,
            "imprimir" => TokenKind::Imprimir,
            "fin_funcion" => TokenKind::FinFuncion,
            "fin_para" => TokenKind::FinPara,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_keyword(&self) -> bool {
        !matches!(
            self,
            TokenKind::String
                | TokenKind::Number
                | TokenKind::Id
                | TokenKind::Op
                | TokenKind::Newline
                | TokenKind::Mismatch
        )
    }

    /// Upper-case tag, e.g. `FIN_SI`
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Inicio => "INICIO",
            TokenKind::Fin => "FIN",
            TokenKind::Funcion => "FUNCION",
            TokenKind::Retornar => "RETORNAR",
            TokenKind::Var => "VAR",
            TokenKind::Mientras => "MIENTRAS",
            TokenKind::Si => "SI",
            TokenKind::Entonces => "ENTONCES",
            TokenKind::FinSi => "FIN_SI",
            TokenKind::Sino => "SINO",
            TokenKind::Para => "PARA",
            TokenKind::Imprimir => "IMPRIMIR",
            TokenKind::FinFuncion => "FIN_FUNCION",
            TokenKind::FinPara => "FIN_PARA",
            TokenKind::String => "STRING",
            TokenKind::Number => "NUMBER",
            TokenKind::Id => "ID",
            TokenKind::Op => "OP",
            TokenKind::Newline => "NEWLINE",
            TokenKind::Mismatch => "MISMATCH",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_keyword_has_a_kind() {
        for word in KEYWORDS {
            let kind = TokenKind::keyword(word).expect("keyword without kind");
            assert!(kind.is_keyword());
            assert_eq!(kind.name(), word.to_uppercase());
        }
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        assert_eq!(TokenKind::keyword("Inicio"), None);
        assert_eq!(TokenKind::keyword("SI"), None);
        assert_eq!(TokenKind::keyword("si"), Some(TokenKind::Si));
    }
}
