//! Parsed formulas and their composition algebra

use crate::ast::Node;
use crate::error::{FormulaError, FormulaResult};
use crate::evaluator::evaluate_node;
use crate::scope::Scope;
use std::collections::BTreeSet;
use std::ops::{Add, Div, Mul, Sub};
use std::str::FromStr;

/// An immutable, re-evaluatable formula.
///
/// A formula without a root is [`Formula::NONE`]: "no rule supplied". It
/// evaluates to `0` and has its own identity/absorption rules under the
/// `+ - * /` operators, which combine parsed formulas without re-parsing:
///
/// | op  | lhs NONE      | rhs NONE | both present        |
/// |-----|---------------|----------|---------------------|
/// | `+` | rhs           | lhs      | `lhs + rhs`         |
/// | `-` | `-rhs`        | lhs      | `lhs - rhs`         |
/// | `*` | NONE          | NONE     | `lhs * rhs`         |
/// | `/` | NONE          | NONE     | `lhs / rhs`         |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Formula {
    root: Option<Node>,
}

impl Formula {
    /// The empty formula
    pub const NONE: Formula = Formula { root: None };

    pub fn new(root: Node) -> Self {
        Self { root: Some(root) }
    }

    /// Parse formula text with the base lexer and parser
    pub fn parse(text: &str) -> FormulaResult<Self> {
        crate::parse_formula(text)
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_ref()
    }

    pub fn into_root(self) -> Option<Node> {
        self.root
    }

    pub fn is_none(&self) -> bool {
        self.root.is_none()
    }

    /// Evaluate against `scopes`, summing variables across all of them
    pub fn evaluate(&self, scopes: &[&dyn Scope]) -> f64 {
        self.root
            .as_ref()
            .map_or(0.0, |root| evaluate_node(root, scopes))
    }

    /// Sorted, de-duplicated variable names this formula reads
    pub fn variables(&self) -> BTreeSet<&str> {
        let mut names = BTreeSet::new();
        if let Some(root) = &self.root {
            root.collect_variables(&mut names);
        }
        names
    }
}

impl From<Node> for Formula {
    fn from(root: Node) -> Self {
        Self::new(root)
    }
}

impl From<Option<Node>> for Formula {
    fn from(root: Option<Node>) -> Self {
        Self { root }
    }
}

impl FromStr for Formula {
    type Err = FormulaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::parse_formula(s)
    }
}

impl Add for Formula {
    type Output = Formula;

    fn add(self, rhs: Formula) -> Formula {
        match (self.root, rhs.root) {
            (None, rhs) => Formula { root: rhs },
            (lhs, None) => Formula { root: lhs },
            (Some(lhs), Some(rhs)) => Formula::new(Node::addition(lhs, rhs)),
        }
    }
}

impl Sub for Formula {
    type Output = Formula;

    fn sub(self, rhs: Formula) -> Formula {
        match (self.root, rhs.root) {
            (None, rhs) => Formula {
                root: rhs.map(Node::negation),
            },
            (lhs, None) => Formula { root: lhs },
            (Some(lhs), Some(rhs)) => Formula::new(Node::subtraction(lhs, rhs)),
        }
    }
}

impl Mul for Formula {
    type Output = Formula;

    fn mul(self, rhs: Formula) -> Formula {
        match (self.root, rhs.root) {
            (Some(lhs), Some(rhs)) => Formula::new(Node::multiplication(lhs, rhs)),
            _ => Formula::NONE,
        }
    }
}

impl Div for Formula {
    type Output = Formula;

    fn div(self, rhs: Formula) -> Formula {
        match (self.root, rhs.root) {
            (Some(lhs), Some(rhs)) => Formula::new(Node::division(lhs, rhs)),
            _ => Formula::NONE,
        }
    }
}

macro_rules! impl_ref_op {
    ($trait:ident, $method:ident) => {
        impl $trait<&Formula> for &Formula {
            type Output = Formula;

            fn $method(self, rhs: &Formula) -> Formula {
                self.clone().$method(rhs.clone())
            }
        }
    };
}

impl_ref_op!(Add, add);
impl_ref_op!(Sub, sub);
impl_ref_op!(Mul, mul);
impl_ref_op!(Div, div);

/// Serializes as the rendered formula text
#[cfg(feature = "serde")]
impl serde::Serialize for Formula {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Deserializes by parsing text with the base grammar. Fields that may hold
/// logical operators need [`with_logic`].
#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Formula {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = <std::borrow::Cow<'de, str>>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// Serde adapter for formula fields written with [`LogicGrammar`] operators
///
/// ```rust
/// # use serde::Deserialize;
/// # use tally_formula::Formula;
/// #[derive(Deserialize)]
/// struct Trigger {
///     #[serde(with = "tally_formula::with_logic")]
///     condition: Formula,
/// }
///
/// let trigger: Trigger = serde_json::from_str(r#"{"condition": "[HP] & ![STUNNED]"}"#).unwrap();
/// assert_eq!(trigger.condition.to_string(), "[HP] & ![STUNNED]");
/// ```
///
/// [`LogicGrammar`]: crate::LogicGrammar
#[cfg(feature = "serde")]
pub mod with_logic {
    use super::Formula;
    use crate::extension::LogicGrammar;

    pub fn serialize<S: serde::Serializer>(
        formula: &Formula,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(formula, serializer)
    }

    pub fn deserialize<'de, D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Formula, D::Error> {
        let text = <std::borrow::Cow<'de, str> as serde::Deserialize>::deserialize(deserializer)?;
        crate::parse_formula_with(&LogicGrammar::lexer(), &LogicGrammar::parser(), &text)
            .map_err(serde::de::Error::custom)
    }
}
