//! Inicio command-line front end
//!
//! Analyzes and runs `inicio ... fin` programs.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use inicio::feedback::{AnalysisReport, Diagnostic, RunReport};
use inicio::frontend::token::KEYWORDS;
use inicio::runtime::RunConfig;

/// Inicio language tools
#[derive(Parser, Debug)]
#[command(name = "inicio")]
#[command(version = "0.1.0")]
#[command(about = "Lexer, syntax outline and interpreter for inicio...fin programs")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file; analyzed, then run
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Print machine-readable JSON reports
    #[arg(long, global = true)]
    json: bool,

    /// Stop any `para` loop after this many iterations
    #[arg(long, global = true, value_name = "N")]
    max_iterations: Option<u64>,

    /// Run configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the token stream of a source file
    Tokens {
        /// Input source file
        input: PathBuf,
    },
    /// Lex, parse and check a source file; print its syntax tree
    Analyze {
        /// Input source file
        input: PathBuf,
    },
    /// Run a source file and print its output
    Run {
        /// Input source file
        input: PathBuf,
    },
    /// Print the reserved words
    Keywords,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Some(Commands::Tokens { input }) => tokens_file(input),
        Some(Commands::Analyze { input }) => analyze_file(input, &cli),
        Some(Commands::Run { input }) => run_file(input, &cli),
        Some(Commands::Keywords) => {
            for word in KEYWORDS {
                println!("{}", word);
            }
            Ok(true)
        }
        None => match &cli.input {
            Some(input) => analyze_file(input, &cli).and_then(|ok| {
                if ok {
                    run_file(input, &cli)
                } else {
                    Ok(false)
                }
            }),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: inicio <FILE> or inicio run <FILE>");
                process::exit(2);
            }
        },
    };

    match result {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(1);
        }
    }
}

fn read_source(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("reading {}", input.display()))
}

fn run_config(cli: &Cli) -> Result<RunConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            RunConfig::from_json(&text)?
        }
        None => RunConfig::default(),
    };
    if let Some(max) = cli.max_iterations {
        config = config.with_max_iterations(max);
    }
    Ok(config)
}

/// Print tokens as `KIND text line`
fn tokens_file(input: &Path) -> Result<bool> {
    let source = read_source(input)?;
    match inicio::tokenize(&source) {
        Ok(tokens) => {
            for token in tokens {
                println!("{:<12} {:<16} {}", token.kind, format!("{:?}", token.text), token.line);
            }
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}", Diagnostic::from(&e));
            Ok(false)
        }
    }
}

/// Returns whether the analysis succeeded
fn analyze_file(input: &Path, cli: &Cli) -> Result<bool> {
    let source = read_source(input)?;
    let result = inicio::analyze(&source);

    if cli.json {
        let report = AnalysisReport::new(&input.to_string_lossy(), &source, &result);
        println!("{}", report.to_json());
        return Ok(report.success);
    }

    match result {
        Ok(analysis) => {
            print!("{}", analysis.tree.to_outline());
            println!("analysis completed successfully");
            Ok(true)
        }
        Err(e) => {
            eprintln!("{}", Diagnostic::from(&e));
            Ok(false)
        }
    }
}

/// Returns whether the run finished without a diagnostic
fn run_file(input: &Path, cli: &Cli) -> Result<bool> {
    let source = read_source(input)?;
    let config = run_config(cli)?;
    let execution = inicio::run_with_config(&source, &config);

    if cli.json {
        let report = RunReport::new(&input.to_string_lossy(), &execution);
        println!("{}", report.to_json());
        return Ok(report.success);
    }

    for line in &execution.output {
        println!("{}", line);
    }
    match &execution.error {
        Some(e) => {
            eprintln!("{}", Diagnostic::from(e));
            Ok(false)
        }
        None => Ok(true),
    }
}
