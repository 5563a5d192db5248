//! Formula parser
//!
//! A recursive descent parser over the lexer's tokens with three levels:
//!
//! ```text
//! expr   := term   (('+' | '-') expr)?
//! term   := factor (('*' | '/') term)?
//! factor := CONSTANT | VARIABLE | '(' expr ')'
//! ```
//!
//! The right operand of an operator is parsed by recursing into the same
//! level, so chains are right-associative: `1-2-3` is `1-(2-3)`. Authored
//! content depends on this; do not turn the recursion into a loop.
//!
//! When a level meets a token it has no rule for, it asks the parser's
//! [`GrammarExtension`]. By default expression and term levels stop there and
//! return what they have (trailing tokens are ignored), while the factor
//! level fails.
//!
//! Every level entered counts towards [`ParseOptions::max_depth`], so deeply
//! nested or very long chains fail with [`ParseError::NestingTooDeep`]
//! instead of exhausting the stack.

use crate::ast::{BinaryOperator, Node};
use crate::error::{ParseError, ParseResult};
use crate::extension::{GrammarExtension, NoExtension};
use crate::formula::Formula;
use crate::token::{Token, TokenKind};
use std::fmt;
use std::sync::Arc;

/// Parse tokens into a formula with the base grammar and default options
///
/// An empty token list yields [`Formula::NONE`].
///
/// # Example
/// ```rust
/// use tally_formula::{parse, tokenize};
///
/// let formula = parse(&tokenize("1-2-3").unwrap()).unwrap();
/// assert_eq!(formula.evaluate(&[]), 2.0);
/// ```
pub fn parse(tokens: &[Token]) -> ParseResult<Formula> {
    FormulaParser::new().parse(tokens)
}

/// What to do with tokens left after the top-level expression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum TrailingTokens {
    /// Leave them unconsumed and return the parsed prefix
    #[default]
    Ignore,
    /// Fail with [`ParseError::TrailingTokens`]
    Reject,
}

/// Default for [`ParseOptions::max_depth`]
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Parser configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParseOptions {
    pub trailing_tokens: TrailingTokens,
    /// Maximum number of nested grammar levels (expression, term or factor)
    /// open at once. Each `(` opens three; each operator in a chain opens
    /// one. Deeper input fails with [`ParseError::NestingTooDeep`].
    pub max_depth: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            trailing_tokens: TrailingTokens::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParseOptions {
    /// Options that reject unconsumed input
    pub fn strict() -> Self {
        Self {
            trailing_tokens: TrailingTokens::Reject,
            ..Self::default()
        }
    }

    /// Same options with a different nesting limit
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Parser with an injected grammar extension
#[derive(Clone)]
pub struct FormulaParser {
    extension: Arc<dyn GrammarExtension>,
    options: ParseOptions,
}

impl Default for FormulaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormulaParser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaParser")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl FormulaParser {
    /// Parser for the base grammar
    pub fn new() -> Self {
        Self {
            extension: Arc::new(NoExtension),
            options: ParseOptions::default(),
        }
    }

    /// Parser that consults `extension` for tokens the base grammar rejects
    pub fn with_extension(extension: impl GrammarExtension + 'static) -> Self {
        Self::with_shared_extension(Arc::new(extension))
    }

    /// Parser sharing an extension with other components (e.g. a lexer)
    pub fn with_shared_extension(extension: Arc<dyn GrammarExtension>) -> Self {
        Self {
            extension,
            options: ParseOptions::default(),
        }
    }

    /// Replace the parser options
    pub fn with_options(mut self, options: ParseOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> ParseOptions {
        self.options
    }

    /// Parse `tokens` into a formula
    pub fn parse(&self, tokens: &[Token]) -> ParseResult<Formula> {
        if tokens.is_empty() {
            return Ok(Formula::NONE);
        }

        let mut parser = TokenParser::new(tokens, self.extension.as_ref())
            .with_max_depth(self.options.max_depth);
        let root = parser.parse_expression()?;

        if let Some(token) = parser.peek() {
            if self.options.trailing_tokens == TrailingTokens::Reject {
                return Err(ParseError::TrailingTokens {
                    token: token.to_string(),
                    position: parser.position(),
                });
            }
            tracing::debug!(
                "ignoring {} trailing tokens starting at {}",
                tokens.len() - parser.position(),
                token
            );
        }

        tracing::debug!("parsed {} tokens into {} nodes", parser.position(), root.size());
        Ok(Formula::new(root))
    }
}

/// Cursor over a token slice, driving the grammar.
///
/// Extensions receive this handle so they can inspect and consume tokens and
/// recurse into the base grammar levels.
pub struct TokenParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
    max_depth: usize,
    extension: &'a dyn GrammarExtension,
}

impl<'a> TokenParser<'a> {
    pub fn new(tokens: &'a [Token], extension: &'a dyn GrammarExtension) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            extension,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    // === Cursor ===

    /// Index of the next unconsumed token
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    pub fn peek_kind(&self) -> Option<TokenKind> {
        self.peek().map(|token| token.kind)
    }

    /// Consume and return the next token
    pub fn advance(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Error describing the next token (or the end of input) as unexpected
    pub fn unexpected(&self) -> ParseError {
        match self.peek() {
            Some(token) => ParseError::UnexpectedToken {
                token: token.to_string(),
                position: self.pos,
            },
            None => ParseError::UnexpectedEnd,
        }
    }

    // === Grammar levels ===

    /// `expr := term (('+' | '-') expr)?`
    pub fn parse_expression(&mut self) -> ParseResult<Node> {
        self.descend(Self::expression)
    }

    /// `term := factor (('*' | '/') term)?`
    pub fn parse_term(&mut self) -> ParseResult<Node> {
        self.descend(Self::term)
    }

    /// `factor := CONSTANT | VARIABLE | '(' expr ')'`
    pub fn parse_factor(&mut self) -> ParseResult<Node> {
        self.descend(Self::factor)
    }

    fn descend(&mut self, level: fn(&mut Self) -> ParseResult<Node>) -> ParseResult<Node> {
        if self.depth >= self.max_depth {
            return Err(ParseError::NestingTooDeep {
                max_depth: self.max_depth,
                position: self.pos,
            });
        }

        self.depth += 1;
        let result = level(self);
        self.depth -= 1;
        result
    }

    fn expression(&mut self) -> ParseResult<Node> {
        let lhs = self.parse_term()?;

        let op = match self.peek_kind() {
            None => return Ok(lhs),
            Some(TokenKind::Addition) => BinaryOperator::Add,
            Some(TokenKind::Subtraction) => BinaryOperator::Subtract,
            Some(_) => {
                let extension = self.extension;
                return extension.unexpected_expression(self, lhs);
            }
        };

        let rhs = self.parse_right_operand(op, Self::parse_expression)?;
        Ok(Node::binary(op, lhs, rhs))
    }

    fn term(&mut self) -> ParseResult<Node> {
        let lhs = self.parse_factor()?;

        let op = match self.peek_kind() {
            None => return Ok(lhs),
            Some(TokenKind::Multiplication) => BinaryOperator::Multiply,
            Some(TokenKind::Division) => BinaryOperator::Divide,
            Some(_) => {
                let extension = self.extension;
                return extension.unexpected_term(self, lhs);
            }
        };

        let rhs = self.parse_right_operand(op, Self::parse_term)?;
        Ok(Node::binary(op, lhs, rhs))
    }

    fn factor(&mut self) -> ParseResult<Node> {
        let Some(token) = self.peek() else {
            return Err(ParseError::UnexpectedEnd);
        };
        let position = self.pos;

        match token.kind {
            TokenKind::Constant => {
                self.pos += 1;
                parse_number(&token.text)
                    .map(Node::Constant)
                    .ok_or_else(|| ParseError::InvalidNumber {
                        text: token.text.clone(),
                        position,
                    })
            }

            TokenKind::Variable => {
                self.pos += 1;
                Ok(Node::Variable(token.text.clone()))
            }

            TokenKind::LeftParen => {
                self.pos += 1;
                if self.is_at_end() {
                    return Err(ParseError::UnclosedParenthesis { position });
                }

                let inner = self.parse_expression()?;
                match self.peek_kind() {
                    Some(TokenKind::RightParen) => {
                        self.pos += 1;
                        Ok(inner)
                    }
                    _ => Err(ParseError::UnclosedParenthesis { position }),
                }
            }

            _ => {
                let extension = self.extension;
                extension.unexpected_factor(self)
            }
        }
    }

    /// Consume the operator at the cursor, then parse its right operand with
    /// `level`
    pub fn parse_right_operand(
        &mut self,
        op: BinaryOperator,
        level: fn(&mut Self) -> ParseResult<Node>,
    ) -> ParseResult<Node> {
        let position = self.pos;
        self.pos += 1;

        if self.is_at_end() {
            return Err(ParseError::MissingOperand {
                operator: op.symbol().to_string(),
                position,
            });
        }

        level(self)
    }
}

/// `DIGIT+ ('.' DIGIT*)?` with a finite value; anything else is malformed
fn parse_number(text: &str) -> Option<f64> {
    let starts_with_digit = text.chars().next().map_or(false, |c| c.is_ascii_digit());
    let well_formed = text.chars().all(|c| c.is_ascii_digit() || c == '.')
        && text.matches('.').count() <= 1;

    if !(starts_with_digit && well_formed) {
        return None;
    }
    text.parse().ok().filter(|value: &f64| value.is_finite())
}
