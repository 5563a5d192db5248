//! Token definitions shared by the lexer and the parser

use std::fmt;

/// Token classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Operands
    Constant,
    Variable,

    // Operators
    Addition,
    Subtraction,
    Multiplication,
    Division,

    // Delimiters
    LeftParen,
    RightParen,

    /// Kind emitted by a lexer extension; never produced by the base lexer
    Custom(&'static str),
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Constant => write!(f, "CONSTANT"),
            TokenKind::Variable => write!(f, "VARIABLE"),
            TokenKind::Addition => write!(f, "ADDITION"),
            TokenKind::Subtraction => write!(f, "SUBTRACTION"),
            TokenKind::Multiplication => write!(f, "MULTIPLICATION"),
            TokenKind::Division => write!(f, "DIVISION"),
            TokenKind::LeftParen => write!(f, "LEFT_PAREN"),
            TokenKind::RightParen => write!(f, "RIGHT_PAREN"),
            TokenKind::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// A classified lexical unit.
///
/// `text` holds the unparsed literal for constants and the bracketed name for
/// variables; it is empty for everything the base lexer produces otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    /// Token without text (operators, parentheses)
    pub fn new(kind: TokenKind) -> Self {
        Self {
            kind,
            text: String::new(),
        }
    }

    /// Token carrying literal text
    pub fn with_text(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn constant(text: impl Into<String>) -> Self {
        Self::with_text(TokenKind::Constant, text)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Self::with_text(TokenKind::Variable, name)
    }

    pub fn is(&self, kind: TokenKind) -> bool {
        self.kind == kind
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.text.is_empty() {
            write!(f, "[{}]", self.kind)
        } else {
            write!(f, "[{}: {}]", self.kind, self.text)
        }
    }
}
