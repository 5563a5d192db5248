//! Formula text rendering
//!
//! Writes trees back as formula text with only the parentheses the
//! right-associative grammar needs to rebuild the same tree. Negations (and
//! negative constants) have no base-grammar syntax and are written as
//! `(0 - x)`; logical nodes use the `LogicGrammar` symbols. Non-finite
//! constants, which only arise from trees built in code, are written as the
//! divisions that produce them.

use crate::ast::{Node, UnaryOperator};
use crate::formula::Formula;
use crate::lexer::{VARIABLE_END, VARIABLE_START};
use std::fmt;

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Constant(value) if value.is_nan() => f.write_str("(0 / 0)"),
            Node::Constant(value) if value.is_infinite() => {
                if value.is_sign_negative() {
                    f.write_str("(0 - 1 / 0)")
                } else {
                    f.write_str("(1 / 0)")
                }
            }
            Node::Constant(value) if value.is_sign_negative() => write!(f, "(0 - {})", -value),
            Node::Constant(value) => write!(f, "{}", value),

            Node::Variable(name) => write!(f, "{}{}{}", VARIABLE_START, name, VARIABLE_END),

            Node::Unary {
                op: UnaryOperator::Negate,
                operand,
            } => write!(f, "(0 - {})", operand),

            Node::Unary {
                op: UnaryOperator::Not,
                operand,
            } => {
                f.write_str("!")?;
                write_grouped(f, operand, matches!(**operand, Node::Binary { .. }))
            }

            Node::Binary { op, left, right } => {
                let level = op.precedence();
                // The left operand is parsed one level up, the right operand
                // at the same level
                let left_grouped = binary_level(left).map_or(false, |l| l <= level);
                let right_grouped = binary_level(right).map_or(false, |r| r < level);

                write_grouped(f, left, left_grouped)?;
                write!(f, " {} ", op.symbol())?;
                write_grouped(f, right, right_grouped)
            }
        }
    }
}

fn binary_level(node: &Node) -> Option<u8> {
    match node {
        Node::Binary { op, .. } => Some(op.precedence()),
        _ => None,
    }
}

fn write_grouped(f: &mut fmt::Formatter<'_>, node: &Node, grouped: bool) -> fmt::Result {
    if grouped {
        write!(f, "({})", node)
    } else {
        write!(f, "{}", node)
    }
}

/// `NONE` renders as the empty string
impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.root() {
            Some(root) => write!(f, "{}", root),
            None => Ok(()),
        }
    }
}
