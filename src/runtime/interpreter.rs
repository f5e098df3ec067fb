//! Line-based interpreter
//!
//! Runs directly over the source lines, independent of the syntax tree.
//! Each line is classified by its first word:
//!
//! - `var <name> = <expr>` binds a variable
//! - `imprimir <operand>` emits a line of output
//! - `si <name> == <expr> entonces ... [sino ...] fin_si`
//! - `para <init>; <condition>; <increment> ... fin_para`
//! - `funcion <name> ... fin_funcion` is captured and never called
//!
//! Anything else is skipped. Inside `si` and `para` bodies only `imprimir`
//! runs.

use log::{debug, trace, warn};

use crate::runtime::config::RunConfig;
use crate::runtime::eval::{equals, evaluate};
use crate::runtime::value::{Environment, FunctionTable, Value};
use crate::utils::{Error, Result};

/// Output of one run. `error` is set when the run stopped early.
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    pub output: Vec<String>,
    pub error: Option<Error>,
}

impl Execution {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Split a line into its first word and the trimmed remainder
fn split_keyword(line: &str) -> (&str, &str) {
    match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    }
}

fn keyword(line: &str) -> &str {
    split_keyword(line.trim()).0
}

fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => chars.all(|c| c.is_alphanumeric() || c == '_'),
        _ => false,
    }
}

/// `"..."` with no quote inside
fn string_literal(text: &str) -> Option<&str> {
    let inner = text.strip_prefix('"')?.strip_suffix('"')?;
    if inner.contains('"') {
        None
    } else {
        Some(inner)
    }
}

fn runtime(line: usize, detail: impl Into<String>) -> Error {
    Error::Runtime {
        line,
        detail: detail.into(),
    }
}

/// Block keyword pairs, opener first
const BLOCKS: [(&str, &str); 3] = [("si", "fin_si"), ("para", "fin_para"), ("funcion", "fin_funcion")];

/// The interpreter
pub struct Interpreter {
    config: RunConfig,
    env: Environment,
    functions: FunctionTable,
    output: Vec<String>,
}

impl Interpreter {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            env: Environment::new(),
            functions: FunctionTable::new(),
            output: Vec::new(),
        }
    }

    /// Variables left by the last run
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Functions captured by the last run
    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Run `source` from a clean state
    pub fn run(&mut self, source: &str) -> Execution {
        self.env.clear();
        self.functions.clear();
        self.output.clear();

        let lines: Vec<&str> = source.split('\n').map(str::trim).collect();
        let error = self.execute(&lines).err();
        if let Some(err) = &error {
            debug!("run stopped: {}", err);
        }

        Execution {
            output: std::mem::take(&mut self.output),
            error,
        }
    }

    fn execute(&mut self, lines: &[&str]) -> Result<()> {
        let mut i = 0;
        while i < lines.len() {
            let line = lines[i];
            let (word, rest) = split_keyword(line);
            let number = i + 1;
            trace!("line {}: {}", number, line);

            i = match word {
                "var" => {
                    self.assign(rest, number)?;
                    i + 1
                }
                "imprimir" => {
                    self.print(rest, number)?;
                    i + 1
                }
                "funcion" => self.capture_function(lines, i, rest)?,
                "si" => self.run_si(lines, i, rest)?,
                "para" => self.run_para(lines, i, rest)?,
                _ => {
                    if !line.is_empty() {
                        debug!("skipping line {}: {}", number, line);
                    }
                    i + 1
                }
            };
        }
        Ok(())
    }

    // ==================== Statements ====================

    /// `<name> = <expr>`
    fn assign(&mut self, text: &str, line: usize) -> Result<()> {
        let (name, expr) = text
            .split_once('=')
            .ok_or_else(|| runtime(line, format!("expected <name> = <expr>, found `{}`", text)))?;
        let name = name.trim();
        if !is_identifier(name) {
            return Err(runtime(line, format!("invalid variable name `{}`", name)));
        }

        let value = evaluate(expr.trim(), &self.env)
            .map_err(|e| runtime(line, format!("invalid value for variable {}: {}", name, e)))?;
        trace!("{} = {:?}", name, value);
        self.env.insert(name.to_string(), value);
        Ok(())
    }

    fn print(&mut self, operand: &str, line: usize) -> Result<()> {
        if operand.is_empty() {
            return Err(runtime(line, "imprimir needs an operand"));
        }
        let text = match string_literal(operand) {
            Some(literal) => literal.to_string(),
            None => evaluate(operand, &self.env)
                .map_err(|e| runtime(line, format!("cannot print `{}`: {}", operand, e)))?
                .to_string(),
        };
        self.output.push(text);
        Ok(())
    }

    /// Run a body line; only `imprimir` is recognized
    fn run_body_line(&mut self, lines: &[&str], index: usize) -> Result<()> {
        let (word, rest) = split_keyword(lines[index]);
        if word == "imprimir" {
            self.print(rest, index + 1)
        } else {
            if !lines[index].is_empty() {
                debug!("skipping body line {}: {}", index + 1, lines[index]);
            }
            Ok(())
        }
    }

    fn capture_function(&mut self, lines: &[&str], start: usize, header: &str) -> Result<usize> {
        let name = header
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .next()
            .unwrap_or("");
        if !is_identifier(name) {
            return Err(runtime(start + 1, "expected function name after funcion"));
        }
        let end = find_block_end(lines, start, "funcion", "fin_funcion")
            .ok_or_else(|| runtime(start + 1, format!("funcion {} without fin_funcion", name)))?;

        let body: Vec<String> = lines[start + 1..end].iter().map(|l| l.to_string()).collect();
        if self.functions.insert(name.to_string(), body).is_some() {
            debug!("funcion {} redefined at line {}", name, start + 1);
        }
        Ok(end + 1)
    }

    fn run_si(&mut self, lines: &[&str], start: usize, header: &str) -> Result<usize> {
        let line = start + 1;
        let condition = header
            .strip_suffix("entonces")
            .map(str::trim)
            .ok_or_else(|| runtime(line, "expected entonces after si condition"))?;
        let end = find_block_end(lines, start, "si", "fin_si")
            .ok_or_else(|| runtime(line, "si without fin_si"))?;

        let holds = self.condition(condition, line)?;
        let body = body_lines(lines, start + 1, end);
        let split = body.iter().position(|i| keyword(lines[*i]) == "sino");
        let (then_part, else_part) = match split {
            Some(at) => (&body[..at], &body[at + 1..]),
            None => (&body[..], &body[body.len()..]),
        };

        let chosen = if holds { then_part } else { else_part };
        debug!("si at line {} is {}", line, holds);
        for index in chosen {
            self.run_body_line(lines, *index)?;
        }
        Ok(end + 1)
    }

    /// `<name> == <expr>`
    fn condition(&self, condition: &str, line: usize) -> Result<bool> {
        let unsupported = || {
            runtime(
                line,
                format!("unsupported condition `{}`: expected <name> == <expr>", condition),
            )
        };
        let (name, expr) = condition.split_once("==").ok_or_else(unsupported)?;
        let name = name.trim();
        if !is_identifier(name) || expr.contains("==") {
            return Err(unsupported());
        }

        let expected = evaluate(expr, &self.env)
            .map_err(|e| runtime(line, format!("invalid condition: {}", e)))?;
        match self.env.get(name) {
            Some(value) => Ok(equals(value, &expected)),
            None => {
                debug!("si at line {}: `{}` is unbound, condition is false", line, name);
                Ok(false)
            }
        }
    }

    fn run_para(&mut self, lines: &[&str], start: usize, header: &str) -> Result<usize> {
        let line = start + 1;
        let clauses: Vec<&str> = header.split(';').map(str::trim).collect();
        if clauses.len() != 3 {
            return Err(runtime(
                line,
                "para expects three clauses: <init>; <condition>; <increment>",
            ));
        }
        let end = find_block_end(lines, start, "para", "fin_para")
            .ok_or_else(|| runtime(line, "para without fin_para"))?;
        let body = body_lines(lines, start + 1, end);

        self.assign(strip_var(clauses[0]), line)?;

        let mut iterations: u64 = 0;
        loop {
            let value: Value = evaluate(clauses[1], &self.env)
                .map_err(|e| runtime(line, format!("invalid para condition: {}", e)))?;
            if !value.is_truthy() {
                break;
            }
            if let Some(max) = self.config.max_iterations {
                if iterations >= max {
                    return Err(runtime(line, format!("loop exceeded {} iterations", max)));
                }
            }
            iterations += 1;

            for index in &body {
                self.run_body_line(lines, *index)?;
            }
            self.assign(strip_var(clauses[2]), line)?;
        }
        debug!("para at line {} ran {} iterations", line, iterations);
        Ok(end + 1)
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new(RunConfig::default())
    }
}

/// Drop a leading `var` from a `para` clause
fn strip_var(clause: &str) -> &str {
    match split_keyword(clause) {
        ("var", rest) => rest,
        _ => clause,
    }
}

/// Index of the closer matching the opener at `start`
fn find_block_end(lines: &[&str], start: usize, open: &str, close: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (index, line) in lines.iter().enumerate().skip(start) {
        let word = keyword(line);
        if word == open {
            depth += 1;
        } else if word == close {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// Indices of the lines in `from..to` outside any nested block
fn body_lines(lines: &[&str], from: usize, to: usize) -> Vec<usize> {
    let mut out = Vec::new();
    let mut i = from;
    while i < to {
        let word = keyword(lines[i]);
        match BLOCKS.iter().find(|(open, _)| *open == word) {
            Some((open, close)) => {
                let end = find_block_end(lines, i, open, close).unwrap_or(to).min(to);
                warn!("nested {} at line {} is not executed", open, i + 1);
                i = end + 1;
            }
            None => {
                out.push(i);
                i += 1;
            }
        }
    }
    out
}

/// Run `source` with the default configuration
pub fn run(source: &str) -> Execution {
    Interpreter::default().run(source)
}
