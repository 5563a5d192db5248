//! Formula lexer
//!
//! Splits authored formula text into [`Token`]s. Characters outside the base
//! alphabet are handed to a [`LexerExtension`]; the default one rejects them.

use crate::error::{LexError, LexResult};
use crate::extension::{LexerExtension, NoExtension};
use crate::token::{Token, TokenKind};
use std::fmt;
use std::sync::Arc;

/// Opens a variable reference
pub const VARIABLE_START: char = '[';
/// Closes a variable reference
pub const VARIABLE_END: char = ']';

/// Characters stripped from both ends of the input before scanning
pub const TRIMMED_CHARACTERS: &[char] = &[' ', '\n'];

/// Tokenize formula text with the base rules
///
/// # Example
/// ```rust
/// use tally_formula::{tokenize, Token, TokenKind};
///
/// let tokens = tokenize("[ATK]+2").unwrap();
/// assert_eq!(
///     tokens,
///     vec![
///         Token::variable("ATK"),
///         Token::new(TokenKind::Addition),
///         Token::constant("2"),
///     ]
/// );
/// ```
pub fn tokenize(input: &str) -> LexResult<Vec<Token>> {
    FormulaLexer::new().tokenize(input)
}

/// Lexer with an injected extension for unrecognised characters
#[derive(Clone)]
pub struct FormulaLexer {
    extension: Arc<dyn LexerExtension>,
}

impl Default for FormulaLexer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FormulaLexer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormulaLexer").finish_non_exhaustive()
    }
}

impl FormulaLexer {
    /// Lexer that rejects every character outside the base alphabet
    pub fn new() -> Self {
        Self {
            extension: Arc::new(NoExtension),
        }
    }

    /// Lexer that routes unrecognised characters to `extension`
    pub fn with_extension(extension: impl LexerExtension + 'static) -> Self {
        Self {
            extension: Arc::new(extension),
        }
    }

    /// Lexer sharing an extension with other components (e.g. a parser)
    pub fn with_shared_extension(extension: Arc<dyn LexerExtension>) -> Self {
        Self { extension }
    }

    /// Tokenize `input`.
    ///
    /// Input that is empty after trimming yields an empty token list. Any
    /// failure aborts the whole call.
    pub fn tokenize(&self, input: &str) -> LexResult<Vec<Token>> {
        let input = input.trim_matches(TRIMMED_CHARACTERS);
        let mut scanner = Scanner::new(input);

        while let Some(c) = scanner.peek_char() {
            if c.is_whitespace() {
                scanner.advance();
                continue;
            }

            if c.is_ascii_digit() {
                scanner.scan_number()?;
                continue;
            }

            match c {
                VARIABLE_START => scanner.scan_variable()?,
                '+' => scanner.push_single(TokenKind::Addition),
                '-' => scanner.push_single(TokenKind::Subtraction),
                '*' => scanner.push_single(TokenKind::Multiplication),
                '/' => scanner.push_single(TokenKind::Division),
                '(' => scanner.push_single(TokenKind::LeftParen),
                ')' => scanner.push_single(TokenKind::RightParen),
                _ => {
                    let position = scanner.pos;
                    let consumed = self.extension.unexpected_character(
                        input,
                        position,
                        &mut scanner.tokens,
                    )?;

                    let resume = position + consumed;
                    if consumed == 0 || !input.is_char_boundary(resume) {
                        return Err(LexError::UnexpectedCharacter {
                            character: c,
                            position,
                        });
                    }
                    tracing::trace!("lexer extension consumed {consumed} bytes at {position}");
                    scanner.pos = resume;
                }
            }
        }

        tracing::trace!("tokenized '{}' into {} tokens", input, scanner.tokens.len());
        Ok(scanner.tokens)
    }
}

struct Scanner<'a> {
    input: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn advance(&mut self) {
        if let Some(c) = self.peek_char() {
            self.pos += c.len_utf8();
        }
    }

    fn push_single(&mut self, kind: TokenKind) {
        self.advance();
        self.tokens.push(Token::new(kind));
    }

    fn scan_number(&mut self) -> LexResult<()> {
        let start = self.pos;
        let mut seen_dot = false;

        // First character is a digit
        self.advance();

        while let Some(c) = self.peek_char() {
            if c.is_ascii_digit() {
                self.advance();
            } else if c == '.' {
                if seen_dot {
                    return Err(LexError::SecondDecimalPoint { position: self.pos });
                }
                seen_dot = true;
                self.advance();
            } else {
                break;
            }
        }

        self.tokens.push(Token::constant(&self.input[start..self.pos]));
        Ok(())
    }

    fn scan_variable(&mut self) -> LexResult<()> {
        let start = self.pos;
        self.advance(); // Skip '['

        let rest = &self.input[self.pos..];
        match rest.find(VARIABLE_END) {
            Some(0) => Err(LexError::EmptyVariable { position: start }),
            Some(len) => {
                self.tokens.push(Token::variable(&rest[..len]));
                self.pos += len + VARIABLE_END.len_utf8();
                Ok(())
            }
            None => Err(LexError::UnterminatedVariable { position: start }),
        }
    }
}
