//! Extension points for the lexer and parser
//!
//! The base grammar is closed. New tokens and grammar rules are added by
//! injecting a [`LexerExtension`] into a [`FormulaLexer`] and a
//! [`GrammarExtension`] into a [`FormulaParser`]; both are consulted only for
//! input the base rules do not recognise.

use crate::ast::{BinaryOperator, Node};
use crate::error::{LexError, LexResult, ParseResult};
use crate::lexer::FormulaLexer;
use crate::parser::{FormulaParser, TokenParser};
use crate::token::{Token, TokenKind};
use std::sync::Arc;

/// Hook for characters the base lexer does not recognise.
pub trait LexerExtension: Send + Sync {
    /// Handle the character at byte offset `position` of `input`.
    ///
    /// Push any tokens onto `tokens` and return the number of bytes consumed.
    /// Returning `Ok(0)` rejects the character.
    fn unexpected_character(
        &self,
        input: &str,
        position: usize,
        tokens: &mut Vec<Token>,
    ) -> LexResult<usize> {
        let _ = tokens;
        let character = input[position..].chars().next().unwrap_or_default();
        Err(LexError::UnexpectedCharacter {
            character,
            position,
        })
    }
}

/// Hooks for tokens the base grammar has no rule for.
pub trait GrammarExtension: Send + Sync {
    /// An expression's left operand is followed by something other than `+`
    /// or `-`. The default leaves the token unconsumed and returns `lhs`.
    fn unexpected_expression(&self, parser: &mut TokenParser<'_>, lhs: Node) -> ParseResult<Node> {
        let _ = parser;
        Ok(lhs)
    }

    /// A term's left operand is followed by something other than `*` or `/`.
    /// The default leaves the token unconsumed and returns `lhs`.
    fn unexpected_term(&self, parser: &mut TokenParser<'_>, lhs: Node) -> ParseResult<Node> {
        let _ = parser;
        Ok(lhs)
    }

    /// A factor starts with a token that is not a constant, variable or `(`.
    /// The default fails.
    fn unexpected_factor(&self, parser: &mut TokenParser<'_>) -> ParseResult<Node> {
        Err(parser.unexpected())
    }
}

/// The base behaviour for every hook
#[derive(Debug, Clone, Copy, Default)]
pub struct NoExtension;

impl LexerExtension for NoExtension {}

impl GrammarExtension for NoExtension {}

/// `&` token kind
pub const AND: TokenKind = TokenKind::Custom("AND");
/// `|` token kind
pub const OR: TokenKind = TokenKind::Custom("OR");
/// `!` token kind
pub const NOT: TokenKind = TokenKind::Custom("NOT");

/// Logical operators on top of the arithmetic grammar.
///
/// - `a & b`: `1` when both operands are positive, else `0`
/// - `a | b`: `1` when either operand is positive, else `0`
/// - `!a`: `1` when the operand is zero, else `0`
///
/// `&` and `|` are parsed at expression level, right-associative, alongside
/// `+` and `-`: `[A]&[B]+1` is `[A]&([B]+1)`. `!` prefixes a single factor.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogicGrammar;

impl LogicGrammar {
    /// Lexer recognising `& | !`
    pub fn lexer() -> FormulaLexer {
        FormulaLexer::with_shared_extension(Arc::new(LogicGrammar))
    }

    /// Parser building logical nodes
    pub fn parser() -> FormulaParser {
        FormulaParser::with_shared_extension(Arc::new(LogicGrammar))
    }
}

impl LexerExtension for LogicGrammar {
    fn unexpected_character(
        &self,
        input: &str,
        position: usize,
        tokens: &mut Vec<Token>,
    ) -> LexResult<usize> {
        let kind = match input[position..].chars().next() {
            Some('&') => AND,
            Some('|') => OR,
            Some('!') => NOT,
            _ => return NoExtension.unexpected_character(input, position, tokens),
        };
        tokens.push(Token::new(kind));
        Ok(1)
    }
}

impl GrammarExtension for LogicGrammar {
    fn unexpected_expression(&self, parser: &mut TokenParser<'_>, lhs: Node) -> ParseResult<Node> {
        let op = match parser.peek_kind() {
            Some(kind) if kind == AND => BinaryOperator::And,
            Some(kind) if kind == OR => BinaryOperator::Or,
            _ => return Ok(lhs),
        };

        let rhs = parser.parse_right_operand(op, TokenParser::parse_expression)?;
        Ok(Node::binary(op, lhs, rhs))
    }

    fn unexpected_factor(&self, parser: &mut TokenParser<'_>) -> ParseResult<Node> {
        if !parser.peek().is_some_and(|token| token.is(NOT)) {
            return Err(parser.unexpected());
        }

        parser.advance();
        let operand = parser.parse_factor()?;
        Ok(Node::logical_negation(operand))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use crate::formula::Formula;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    fn parse_logic(text: &str) -> Formula {
        let tokens = LogicGrammar::lexer().tokenize(text).unwrap();
        LogicGrammar::parser().parse(&tokens).unwrap()
    }

    #[test]
    fn test_logic_tokens() {
        let tokens = LogicGrammar::lexer().tokenize("![A] & [B] | 1").unwrap();
        let kinds: Vec<_> = tokens.iter().map(|t| t.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NOT,
                TokenKind::Variable,
                AND,
                TokenKind::Variable,
                OR,
                TokenKind::Constant
            ]
        );

        // Still rejects anything else
        assert!(LogicGrammar::lexer().tokenize("1 ^ 2").is_err());
    }

    #[test]
    fn test_logic_tree_shape() {
        assert_eq!(
            parse_logic("[A]&[B]+1").into_root().unwrap(),
            Node::logical_and(
                Node::variable("A"),
                Node::addition(Node::variable("B"), Node::constant(1.0))
            )
        );
        assert_eq!(
            parse_logic("!([A]|[B])").into_root().unwrap(),
            Node::logical_negation(Node::logical_or(Node::variable("A"), Node::variable("B")))
        );
    }

    #[test]
    fn test_logic_evaluation() {
        let scope: HashMap<&str, f64> = [("ALIVE", 1.0), ("STUNNED", 0.0)].into_iter().collect();

        assert_eq!(parse_logic("[ALIVE] & ![STUNNED]").evaluate(&[&scope]), 1.0);
        assert_eq!(parse_logic("[ALIVE] & [STUNNED]").evaluate(&[&scope]), 0.0);
        assert_eq!(parse_logic("[STUNNED] | [ALIVE]").evaluate(&[&scope]), 1.0);
        assert_eq!(parse_logic("([ALIVE] & 1) * 50").evaluate(&[&scope]), 50.0);
    }

    #[test]
    fn test_logic_errors() {
        let tokens = LogicGrammar::lexer().tokenize("[A] &").unwrap();
        assert_eq!(
            LogicGrammar::parser().parse(&tokens),
            Err(ParseError::MissingOperand {
                operator: "&".into(),
                position: 1
            })
        );

        let tokens = LogicGrammar::lexer().tokenize("!").unwrap();
        assert_eq!(
            LogicGrammar::parser().parse(&tokens),
            Err(ParseError::UnexpectedEnd)
        );
    }

    /// `a % b` is `b` percent of `a`, bound as tightly as `*`
    struct Percent;

    const PERCENT: TokenKind = TokenKind::Custom("PERCENT");

    impl LexerExtension for Percent {
        fn unexpected_character(
            &self,
            input: &str,
            position: usize,
            tokens: &mut Vec<Token>,
        ) -> LexResult<usize> {
            if !input[position..].starts_with('%') {
                return NoExtension.unexpected_character(input, position, tokens);
            }
            tokens.push(Token::new(PERCENT));
            Ok(1)
        }
    }

    impl GrammarExtension for Percent {
        fn unexpected_term(&self, parser: &mut TokenParser<'_>, lhs: Node) -> ParseResult<Node> {
            if !parser.peek().is_some_and(|token| token.is(PERCENT)) {
                return Ok(lhs);
            }

            parser.advance();
            let rhs = parser.parse_term()?;
            Ok(Node::division(
                Node::multiplication(lhs, rhs),
                Node::constant(100.0),
            ))
        }
    }

    #[test]
    fn test_term_level_extension() {
        let lexer = FormulaLexer::with_extension(Percent);
        let parser = FormulaParser::with_extension(Percent);
        let scope: HashMap<&str, f64> = [("ATK", 40.0)].into_iter().collect();

        let formula = crate::parse_formula_with(&lexer, &parser, "[ATK] % 50 + 1").unwrap();
        assert_eq!(
            formula.root().unwrap(),
            &Node::addition(
                Node::division(
                    Node::multiplication(Node::variable("ATK"), Node::constant(50.0)),
                    Node::constant(100.0)
                ),
                Node::constant(1.0)
            )
        );
        assert_eq!(formula.evaluate(&[&scope]), 21.0);

        // The hook runs only after a complete factor
        assert!(crate::parse_formula_with(&lexer, &parser, "% 5").is_err());
    }

    #[test]
    fn test_base_parser_ignores_logic_tokens() {
        let tokens = LogicGrammar::lexer().tokenize("[A] & [B]").unwrap();
        let formula = crate::parser::parse(&tokens).unwrap();
        assert_eq!(formula.into_root().unwrap(), Node::variable("A"));
    }
}
