//! # tally-formula
//!
//! Formula engine for designer-authored numeric rules.
//!
//! This crate provides:
//! - Formula lexing (text → tokens)
//! - Formula parsing (tokens → immutable expression tree)
//! - Formula evaluation against layered variable scopes
//! - A composition algebra for combining parsed formulas
//! - Extension hooks for adding tokens and grammar rules
//!
//! Variables are written in brackets and read from the scopes passed at
//! evaluation time. A name defined by several scopes contributes the sum of
//! its values, so buff/debuff layers stack.
//!
//! ## Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use tally_formula::parse_formula;
//!
//! let damage = parse_formula("[ATK]*2-[DEF]").unwrap();
//!
//! let base: HashMap<&str, f64> = [("ATK", 10.0), ("DEF", 3.0)].into_iter().collect();
//! let buffs: HashMap<&str, f64> = [("ATK", 5.0)].into_iter().collect();
//!
//! assert_eq!(damage.evaluate(&[&base]), 17.0);
//! assert_eq!(damage.evaluate(&[&base, &buffs]), 27.0);
//! ```

pub mod ast;
pub mod error;
pub mod evaluator;
pub mod extension;
pub mod formula;
pub mod lexer;
pub mod parser;
mod render;
pub mod scope;
pub mod token;

pub use ast::{BinaryOperator, Node, UnaryOperator};
pub use error::{FormulaError, FormulaResult, LexError, LexResult, ParseError, ParseResult};
pub use evaluator::{evaluate, evaluate_node};
pub use extension::{GrammarExtension, LexerExtension, LogicGrammar, NoExtension};
pub use formula::Formula;
#[cfg(feature = "serde")]
pub use formula::with_logic;
pub use lexer::{tokenize, FormulaLexer};
pub use parser::{
    parse, FormulaParser, ParseOptions, TokenParser, TrailingTokens, DEFAULT_MAX_DEPTH,
};
pub use scope::Scope;
pub use token::{Token, TokenKind};

/// Tokenize and parse formula text with the base grammar
///
/// # Example
/// ```rust
/// use tally_formula::parse_formula;
///
/// let formula = parse_formula("[ATK] * (1 + [CRIT])").unwrap();
/// assert!(parse_formula("1.2.3").is_err());
/// assert!(parse_formula("").unwrap().is_none());
/// ```
pub fn parse_formula(text: &str) -> FormulaResult<Formula> {
    parse_formula_with(&FormulaLexer::new(), &FormulaParser::new(), text)
}

/// Tokenize and parse formula text with a configured lexer and parser
pub fn parse_formula_with(
    lexer: &FormulaLexer,
    parser: &FormulaParser,
    text: &str,
) -> FormulaResult<Formula> {
    let tokens = lexer.tokenize(text)?;
    let formula = parser.parse(&tokens)?;
    Ok(formula)
}
