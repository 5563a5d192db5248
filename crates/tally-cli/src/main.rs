//! Tally CLI - formula checking and evaluation tool

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::{self, Write};
use tally_formula::{
    parse_formula_with, Formula, FormulaLexer, FormulaParser, LogicGrammar, ParseOptions, Scope,
};

#[derive(Parser)]
#[command(name = "tally")]
#[command(author, version, about = "Check and evaluate designer-authored formulas")]
struct Cli {
    /// Log verbosity (-v debug, -vv trace); without it RUST_LOG decides,
    /// defaulting to warnings
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the tokens of a formula
    Tokens {
        /// Formula text, e.g. "[ATK]*2-[DEF]"
        formula: String,

        #[command(flatten)]
        grammar: GrammarArgs,
    },

    /// Validate a formula and list the variables it reads
    Check {
        /// Formula text
        formula: String,

        #[command(flatten)]
        grammar: GrammarArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluate a formula against one or more scopes
    #[command(alias = "evaluate")]
    Eval {
        /// Formula text
        formula: String,

        /// A scope of NAME=VALUE pairs separated by commas. Repeat for layered
        /// scopes; a name defined in several scopes sums their values
        #[arg(short, long = "scope", value_name = "NAME=VALUE,...", value_parser = parse_scope)]
        scopes: Vec<BTreeMap<String, f64>>,

        #[command(flatten)]
        grammar: GrammarArgs,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct GrammarArgs {
    /// Reject tokens left over after the formula instead of ignoring them
    #[arg(long)]
    strict: bool,

    /// Enable the logical operators & | !
    #[arg(long)]
    logic: bool,
}

impl GrammarArgs {
    fn lexer(&self) -> FormulaLexer {
        if self.logic {
            LogicGrammar::lexer()
        } else {
            FormulaLexer::new()
        }
    }

    fn parser(&self) -> FormulaParser {
        let parser = if self.logic {
            LogicGrammar::parser()
        } else {
            FormulaParser::new()
        };

        if self.strict {
            parser.with_options(ParseOptions::strict())
        } else {
            parser
        }
    }

    fn parse(&self, text: &str) -> Result<Formula> {
        parse_formula_with(&self.lexer(), &self.parser(), text)
            .with_context(|| format!("Invalid formula '{}'", text))
    }
}

#[derive(Serialize)]
struct CheckReport<'a> {
    formula: &'a Formula,
    variables: Vec<&'a str>,
}

#[derive(Serialize)]
struct EvalReport<'a> {
    formula: &'a Formula,
    variables: Vec<&'a str>,
    value: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Tokens { formula, grammar } => print_tokens(&mut out, &formula, &grammar),
        Commands::Check {
            formula,
            grammar,
            json,
        } => check(&mut out, &formula, &grammar, json),
        Commands::Eval {
            formula,
            scopes,
            grammar,
            json,
        } => eval(&mut out, &formula, &scopes, &grammar, json),
    }
}

fn init_tracing(verbose: u8) {
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(verbose))
        .with_writer(io::stderr)
        .init();
}

/// `RUST_LOG` when set (warnings otherwise), raised to the `-v` level
fn log_filter(verbose: u8) -> tracing_subscriber::EnvFilter {
    let filter = tracing_subscriber::EnvFilter::builder()
        .with_default_directive(tracing::Level::WARN.into())
        .from_env_lossy();

    match verbose {
        0 => filter,
        1 => filter.add_directive(tracing::Level::DEBUG.into()),
        _ => filter.add_directive(tracing::Level::TRACE.into()),
    }
}

fn print_tokens(out: &mut impl Write, text: &str, grammar: &GrammarArgs) -> Result<()> {
    let tokens = grammar
        .lexer()
        .tokenize(text)
        .with_context(|| format!("Invalid formula '{}'", text))?;

    for token in &tokens {
        writeln!(out, "{}", token)?;
    }
    Ok(())
}

fn check(out: &mut impl Write, text: &str, grammar: &GrammarArgs, json: bool) -> Result<()> {
    let formula = grammar.parse(text)?;
    let report = CheckReport {
        formula: &formula,
        variables: formula.variables().into_iter().collect(),
    };

    if json {
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else if formula.is_none() {
        writeln!(out, "OK (empty formula)")?;
    } else {
        writeln!(out, "OK: {}", formula)?;
        if !report.variables.is_empty() {
            writeln!(out, "Variables: {}", report.variables.join(", "))?;
        }
    }
    Ok(())
}

fn eval(
    out: &mut impl Write,
    text: &str,
    scopes: &[BTreeMap<String, f64>],
    grammar: &GrammarArgs,
    json: bool,
) -> Result<()> {
    let formula = grammar.parse(text)?;
    let layers: Vec<&dyn Scope> = scopes.iter().map(|scope| scope as &dyn Scope).collect();

    let value = formula.evaluate(&layers);
    tracing::debug!("evaluated '{}' against {} scopes", formula, layers.len());

    if json {
        let report = EvalReport {
            formula: &formula,
            variables: formula.variables().into_iter().collect(),
            value,
        };
        serde_json::to_writer_pretty(&mut *out, &report)?;
        writeln!(out)?;
    } else {
        writeln!(out, "{}", value)?;
    }
    Ok(())
}

/// Parse `NAME=VALUE,NAME=VALUE` into a scope
fn parse_scope(arg: &str) -> Result<BTreeMap<String, f64>, String> {
    let mut scope = BTreeMap::new();

    for pair in arg.split(',').map(str::trim).filter(|pair| !pair.is_empty()) {
        let (name, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", pair))?;

        let name = name.trim().trim_start_matches('[').trim_end_matches(']');
        if name.is_empty() {
            return Err(format!("missing variable name in '{}'", pair));
        }

        let value: f64 = value
            .trim()
            .parse()
            .map_err(|_| format!("invalid number '{}' for {}", value.trim(), name))?;

        scope.insert(name.to_string(), value);
    }

    Ok(scope)
}
