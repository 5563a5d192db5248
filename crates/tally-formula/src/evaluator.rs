//! Formula evaluator
//!
//! Walks an expression tree once, top-down, against caller-supplied scopes.
//! Evaluation cannot fail: unknown variables read as `0` and division follows
//! IEEE-754 (`1/0` is infinity, `0/0` is NaN).

use crate::ast::Node;
use crate::formula::Formula;
use crate::scope::{accumulate, Scope};

/// Evaluate a formula; `NONE` yields `0`
///
/// # Example
/// ```rust
/// use std::collections::HashMap;
/// use tally_formula::{evaluate, parse_formula};
///
/// let formula = parse_formula("[ATK]*2-[DEF]").unwrap();
/// let stats: HashMap<&str, f64> = [("ATK", 10.0), ("DEF", 3.0)].into_iter().collect();
/// assert_eq!(evaluate(&formula, &[&stats]), 17.0);
/// ```
pub fn evaluate(formula: &Formula, scopes: &[&dyn Scope]) -> f64 {
    formula.root().map_or(0.0, |root| evaluate_node(root, scopes))
}

/// Evaluate a single subtree
pub fn evaluate_node(node: &Node, scopes: &[&dyn Scope]) -> f64 {
    match node {
        Node::Constant(value) => *value,

        // Layered scopes stack: every scope defining the name contributes
        Node::Variable(name) => accumulate(scopes, name),

        Node::Unary { op, operand } => op.apply(evaluate_node(operand, scopes)),

        Node::Binary { op, left, right } => {
            let left = evaluate_node(left, scopes);
            let right = evaluate_node(right, scopes);
            op.apply(left, right)
        }
    }
}
