//! Formula Abstract Syntax Tree types

use std::collections::BTreeSet;

/// Expression tree node.
///
/// Every node owns its children; trees are built bottom-up by the parser or
/// the [`Formula`](crate::Formula) algebra and never mutated afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    // === Leaves ===
    /// Numeric literal
    Constant(f64),
    /// Variable reference, resolved against the evaluation scopes
    Variable(String),

    // === Operators ===
    /// Unary operation
    Unary {
        op: UnaryOperator,
        operand: Box<Node>,
    },
    /// Binary operation
    Binary {
        op: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Binary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    // Arithmetic
    Add,
    Subtract,
    Multiply,
    Divide,

    // Logical (only built by grammar extensions)
    And,
    Or,
}

/// Unary operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Negate,
    /// Logical negation (only built by grammar extensions)
    Not,
}

impl BinaryOperator {
    /// Source symbol
    pub fn symbol(self) -> char {
        match self {
            BinaryOperator::Add => '+',
            BinaryOperator::Subtract => '-',
            BinaryOperator::Multiply => '*',
            BinaryOperator::Divide => '/',
            BinaryOperator::And => '&',
            BinaryOperator::Or => '|',
        }
    }

    /// Grammar level the operator is parsed at; higher binds tighter.
    ///
    /// Logical operators are parsed by extensions at expression level, so
    /// they share a level with `+` and `-`.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOperator::Add
            | BinaryOperator::Subtract
            | BinaryOperator::And
            | BinaryOperator::Or => 1,
            BinaryOperator::Multiply | BinaryOperator::Divide => 2,
        }
    }

    /// Apply the operator to already-evaluated operands
    pub fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOperator::Add => left + right,
            BinaryOperator::Subtract => left - right,
            BinaryOperator::Multiply => left * right,
            // No zero guard: IEEE infinity/NaN propagate
            BinaryOperator::Divide => left / right,
            BinaryOperator::And => truth(left > 0.0 && right > 0.0),
            BinaryOperator::Or => truth(left > 0.0 || right > 0.0),
        }
    }
}

impl UnaryOperator {
    /// Apply the operator to an already-evaluated operand
    pub fn apply(self, operand: f64) -> f64 {
        match self {
            UnaryOperator::Negate => -operand,
            UnaryOperator::Not => truth(operand == 0.0),
        }
    }
}

fn truth(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

impl Node {
    pub fn constant(value: f64) -> Self {
        Node::Constant(value)
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Node::Variable(name.into())
    }

    pub fn unary(op: UnaryOperator, operand: Node) -> Self {
        Node::Unary {
            op,
            operand: Box::new(operand),
        }
    }

    pub fn binary(op: BinaryOperator, left: Node, right: Node) -> Self {
        Node::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn negation(operand: Node) -> Self {
        Self::unary(UnaryOperator::Negate, operand)
    }

    pub fn addition(left: Node, right: Node) -> Self {
        Self::binary(BinaryOperator::Add, left, right)
    }

    pub fn subtraction(minuend: Node, subtrahend: Node) -> Self {
        Self::binary(BinaryOperator::Subtract, minuend, subtrahend)
    }

    pub fn multiplication(left: Node, right: Node) -> Self {
        Self::binary(BinaryOperator::Multiply, left, right)
    }

    pub fn division(dividend: Node, divisor: Node) -> Self {
        Self::binary(BinaryOperator::Divide, dividend, divisor)
    }

    pub fn logical_negation(operand: Node) -> Self {
        Self::unary(UnaryOperator::Not, operand)
    }

    pub fn logical_and(left: Node, right: Node) -> Self {
        Self::binary(BinaryOperator::And, left, right)
    }

    pub fn logical_or(left: Node, right: Node) -> Self {
        Self::binary(BinaryOperator::Or, left, right)
    }

    /// Collect every variable name referenced below this node
    pub fn collect_variables<'a>(&'a self, names: &mut BTreeSet<&'a str>) {
        match self {
            Node::Constant(_) => {}
            Node::Variable(name) => {
                names.insert(name.as_str());
            }
            Node::Unary { operand, .. } => operand.collect_variables(names),
            Node::Binary { left, right, .. } => {
                left.collect_variables(names);
                right.collect_variables(names);
            }
        }
    }

    /// Number of nodes in this subtree
    pub fn size(&self) -> usize {
        match self {
            Node::Constant(_) | Node::Variable(_) => 1,
            Node::Unary { operand, .. } => 1 + operand.size(),
            Node::Binary { left, right, .. } => 1 + left.size() + right.size(),
        }
    }
}
