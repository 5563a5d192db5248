//! Formula error types

use thiserror::Error;

/// Result type for tokenization
pub type LexResult<T> = std::result::Result<T, LexError>;

/// Result type for parsing
pub type ParseResult<T> = std::result::Result<T, ParseError>;

/// Result type for the one-shot text → formula path
pub type FormulaResult<T> = std::result::Result<T, FormulaError>;

/// Errors raised while splitting formula text into tokens.
///
/// Positions are byte offsets into the trimmed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LexError {
    /// A numeric literal contained more than one decimal point
    #[error("Second decimal point in number at position {position}")]
    SecondDecimalPoint { position: usize },

    /// `[]` with nothing between the brackets
    #[error("Empty variable name at position {position}")]
    EmptyVariable { position: usize },

    /// `[` without a matching `]`
    #[error("Unterminated variable name starting at position {position}")]
    UnterminatedVariable { position: usize },

    /// A character no rule (base or extension) accepted
    #[error("Unexpected character '{character}' at position {position}")]
    UnexpectedCharacter { character: char, position: usize },
}

/// Errors raised while building an expression tree from tokens.
///
/// Positions are token indices.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// `(` whose sub-expression is not followed by `)`
    #[error("Missing closing parenthesis for '(' at token {position}")]
    UnclosedParenthesis { position: usize },

    /// An operator with nothing after it
    #[error("Operator '{operator}' at token {position} has no right operand")]
    MissingOperand { operator: String, position: usize },

    /// A constant token whose text is not a number, or whose value does not
    /// fit in a finite `f64`
    #[error("Invalid numeric literal '{text}' at token {position}")]
    InvalidNumber { text: String, position: usize },

    /// A token that cannot start a factor
    #[error("Unexpected token {token} at position {position}")]
    UnexpectedToken { token: String, position: usize },

    /// Input ended where a factor was required
    #[error("Unexpected end of formula")]
    UnexpectedEnd,

    /// Nesting beyond [`ParseOptions::max_depth`](crate::ParseOptions::max_depth)
    #[error("Formula nests deeper than {max_depth} levels at token {position}")]
    NestingTooDeep { max_depth: usize, position: usize },

    /// Tokens left over after the top-level expression (strict mode only)
    #[error("Unexpected trailing token {token} at position {position}")]
    TrailingTokens { token: String, position: usize },
}

/// Either stage failing on formula text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormulaError {
    /// Tokenization failed
    #[error("Lex error: {0}")]
    Lex(#[from] LexError),

    /// Parsing failed
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),
}
