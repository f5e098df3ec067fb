//! Expression evaluator
//!
//! A closed grammar over source text; nothing outside it is accepted.
//!
//! ```text
//! expr       := comparison
//! comparison := additive (("==" | "<" | ">" | "<=" | ">=") additive)*
//! additive   := term (("+" | "-") term)*
//! term       := unary (("*" | "/") unary)*
//! unary      := "-" unary | primary
//! primary    := INTEGER | STRING | NAME | "(" expr ")"
//! ```
//!
//! Comparisons yield `1` or `0`. Operators of one level associate left.

use std::cmp::Ordering;

use thiserror::Error;

use crate::runtime::value::{Environment, Value};

/// Why an expression could not be evaluated
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("empty expression")]
    Empty,

    #[error("unknown identifier `{0}`")]
    UnknownIdentifier(String),

    #[error("division by zero")]
    DivisionByZero,

    #[error("integer overflow")]
    Overflow,

    #[error("unsupported operand types for {op}: {left} and {right}")]
    TypeMismatch {
        op: &'static str,
        left: &'static str,
        right: &'static str,
    },

    #[error("cannot negate a {0}")]
    BadNegation(&'static str),

    #[error("unexpected character `{0}`")]
    UnexpectedChar(char),

    #[error("unterminated string")]
    UnterminatedString,

    #[error("unexpected {0}")]
    UnexpectedToken(String),

    #[error("unexpected end of expression")]
    UnexpectedEnd,
}

type EvalResult<T> = std::result::Result<T, EvalError>;

// ==================== Tokens ====================

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Int(i64),
    Str(String),
    Name(String),
    Plus,
    Minus,
    Star,
    Slash,
    EqEq,
    Lt,
    Gt,
    Le,
    Ge,
    LParen,
    RParen,
}

impl Tok {
    fn describe(&self) -> String {
        match self {
            Tok::Int(i) => format!("number {}", i),
            Tok::Str(s) => format!("string \"{}\"", s),
            Tok::Name(n) => format!("name `{}`", n),
            Tok::Plus => "`+`".to_string(),
            Tok::Minus => "`-`".to_string(),
            Tok::Star => "`*`".to_string(),
            Tok::Slash => "`/`".to_string(),
            Tok::EqEq => "`==`".to_string(),
            Tok::Lt => "`<`".to_string(),
            Tok::Gt => "`>`".to_string(),
            Tok::Le => "`<=`".to_string(),
            Tok::Ge => "`>=`".to_string(),
            Tok::LParen => "`(`".to_string(),
            Tok::RParen => "`)`".to_string(),
        }
    }
}

fn scan(expr: &str) -> EvalResult<Vec<Tok>> {
    let chars: Vec<char> = expr.chars().collect();
    let mut tokens = Vec::new();
    let mut pos = 0;

    while let Some(&c) = chars.get(pos) {
        let next = chars.get(pos + 1).copied();
        match c {
            ' ' | '\t' | '\r' => pos += 1,
            '0'..='9' => {
                let start = pos;
                while chars.get(pos).map_or(false, |c| c.is_ascii_digit()) {
                    pos += 1;
                }
                let text: String = chars[start..pos].iter().collect();
                let value = text.parse::<i64>().map_err(|_| EvalError::Overflow)?;
                tokens.push(Tok::Int(value));
            }
            c if c.is_ascii_alphabetic() || c == '_' => {
                let start = pos;
                while chars
                    .get(pos)
                    .map_or(false, |c| c.is_alphanumeric() || *c == '_')
                {
                    pos += 1;
                }
                tokens.push(Tok::Name(chars[start..pos].iter().collect()));
            }
            '"' => {
                let close = chars[pos + 1..]
                    .iter()
                    .position(|c| *c == '"')
                    .ok_or(EvalError::UnterminatedString)?;
                tokens.push(Tok::Str(chars[pos + 1..pos + 1 + close].iter().collect()));
                pos += close + 2;
            }
            '=' if next == Some('=') => {
                tokens.push(Tok::EqEq);
                pos += 2;
            }
            '<' if next == Some('=') => {
                tokens.push(Tok::Le);
                pos += 2;
            }
            '>' if next == Some('=') => {
                tokens.push(Tok::Ge);
                pos += 2;
            }
            _ => {
                let tok = match c {
                    '+' => Tok::Plus,
                    '-' => Tok::Minus,
                    '*' => Tok::Star,
                    '/' => Tok::Slash,
                    '<' => Tok::Lt,
                    '>' => Tok::Gt,
                    '(' => Tok::LParen,
                    ')' => Tok::RParen,
                    other => return Err(EvalError::UnexpectedChar(other)),
                };
                tokens.push(tok);
                pos += 1;
            }
        }
    }
    Ok(tokens)
}

// ==================== Evaluator ====================

/// Evaluates one expression against a read-only environment
pub struct Evaluator<'a> {
    tokens: Vec<Tok>,
    pos: usize,
    env: &'a Environment,
}

impl<'a> Evaluator<'a> {
    pub fn new(expr: &str, env: &'a Environment) -> EvalResult<Self> {
        Ok(Self {
            tokens: scan(expr)?,
            pos: 0,
            env,
        })
    }

    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    /// Evaluate the whole expression
    pub fn evaluate(mut self) -> EvalResult<Value> {
        if self.tokens.is_empty() {
            return Err(EvalError::Empty);
        }
        let value = self.comparison()?;
        match self.peek() {
            None => Ok(value),
            Some(tok) => Err(EvalError::UnexpectedToken(tok.describe())),
        }
    }

    fn comparison(&mut self) -> EvalResult<Value> {
        let mut left = self.additive()?;
        while let Some(op) = self.peek().cloned() {
            if !matches!(op, Tok::EqEq | Tok::Lt | Tok::Gt | Tok::Le | Tok::Ge) {
                break;
            }
            self.advance();
            let right = self.additive()?;
            left = compare(&op, &left, &right)?;
        }
        Ok(left)
    }

    fn additive(&mut self) -> EvalResult<Value> {
        let mut left = self.term()?;
        while let Some(op) = self.peek().cloned() {
            if !matches!(op, Tok::Plus | Tok::Minus) {
                break;
            }
            self.advance();
            let right = self.term()?;
            left = arithmetic(&op, left, right)?;
        }
        Ok(left)
    }

    fn term(&mut self) -> EvalResult<Value> {
        let mut left = self.unary()?;
        while let Some(op) = self.peek().cloned() {
            if !matches!(op, Tok::Star | Tok::Slash) {
                break;
            }
            self.advance();
            let right = self.unary()?;
            left = arithmetic(&op, left, right)?;
        }
        Ok(left)
    }

    fn unary(&mut self) -> EvalResult<Value> {
        if self.peek() == Some(&Tok::Minus) {
            self.advance();
            return match self.unary()? {
                Value::Int(i) => i.checked_neg().map(Value::Int).ok_or(EvalError::Overflow),
                Value::Float(f) => Ok(Value::Float(-f)),
                other => Err(EvalError::BadNegation(other.type_name())),
            };
        }
        self.primary()
    }

    fn primary(&mut self) -> EvalResult<Value> {
        match self.advance() {
            Some(Tok::Int(i)) => Ok(Value::Int(i)),
            Some(Tok::Str(s)) => Ok(Value::Str(s)),
            Some(Tok::Name(name)) => self
                .env
                .get(&name)
                .cloned()
                .ok_or(EvalError::UnknownIdentifier(name)),
            Some(Tok::LParen) => {
                let value = self.comparison()?;
                match self.advance() {
                    Some(Tok::RParen) => Ok(value),
                    Some(tok) => Err(EvalError::UnexpectedToken(tok.describe())),
                    None => Err(EvalError::UnexpectedEnd),
                }
            }
            Some(tok) => Err(EvalError::UnexpectedToken(tok.describe())),
            None => Err(EvalError::UnexpectedEnd),
        }
    }
}

fn op_symbol(op: &Tok) -> &'static str {
    match op {
        Tok::Plus => "+",
        Tok::Minus => "-",
        Tok::Star => "*",
        Tok::Slash => "/",
        Tok::EqEq => "==",
        Tok::Lt => "<",
        Tok::Gt => ">",
        Tok::Le => "<=",
        _ => ">=",
    }
}

fn arithmetic(op: &Tok, left: Value, right: Value) -> EvalResult<Value> {
    let mismatch = |l: &Value, r: &Value| EvalError::TypeMismatch {
        op: op_symbol(op),
        left: l.type_name(),
        right: r.type_name(),
    };

    match (&left, &right) {
        (Value::Int(a), Value::Int(b)) => {
            let (a, b) = (*a, *b);
            let result = match op {
                Tok::Plus => a.checked_add(b),
                Tok::Minus => a.checked_sub(b),
                Tok::Star => a.checked_mul(b),
                _ => {
                    if b == 0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    if a.checked_rem(b).ok_or(EvalError::Overflow)? != 0 {
                        return Ok(Value::Float(a as f64 / b as f64));
                    }
                    a.checked_div(b)
                }
            };
            result.map(Value::Int).ok_or(EvalError::Overflow)
        }
        (Value::Str(a), Value::Str(b)) if *op == Tok::Plus => Ok(Value::Str(format!("{}{}", a, b))),
        _ => {
            let (a, b) = match (left.as_f64(), right.as_f64()) {
                (Some(a), Some(b)) => (a, b),
                _ => return Err(mismatch(&left, &right)),
            };
            let result = match op {
                Tok::Plus => a + b,
                Tok::Minus => a - b,
                Tok::Star => a * b,
                _ => {
                    if b == 0.0 {
                        return Err(EvalError::DivisionByZero);
                    }
                    a / b
                }
            };
            Ok(Value::Float(result))
        }
    }
}

fn compare(op: &Tok, left: &Value, right: &Value) -> EvalResult<Value> {
    let ordering = match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Some(a.cmp(b)),
        _ => match (left.as_f64(), right.as_f64()) {
            (Some(a), Some(b)) => a.partial_cmp(&b),
            _ if *op == Tok::EqEq => None,
            _ => {
                return Err(EvalError::TypeMismatch {
                    op: op_symbol(op),
                    left: left.type_name(),
                    right: right.type_name(),
                })
            }
        },
    };

    let holds = match (op, ordering) {
        (_, None) => false,
        (Tok::EqEq, Some(o)) => o == Ordering::Equal,
        (Tok::Lt, Some(o)) => o == Ordering::Less,
        (Tok::Gt, Some(o)) => o == Ordering::Greater,
        (Tok::Le, Some(o)) => o != Ordering::Greater,
        (_, Some(o)) => o != Ordering::Less,
    };
    Ok(Value::Int(holds as i64))
}

/// Equality as `==` decides it: numbers by value, strings by content,
/// anything mixed is unequal
pub fn equals(left: &Value, right: &Value) -> bool {
    matches!(compare(&Tok::EqEq, left, right), Ok(Value::Int(1)))
}

/// Evaluate `expr` against `env`
pub fn evaluate(expr: &str, env: &Environment) -> EvalResult<Value> {
    Evaluator::new(expr, env)?.evaluate()
}
