//! Variable scopes consulted during evaluation

use std::borrow::Borrow;
use std::collections::{BTreeMap, HashMap};
use std::hash::{BuildHasher, Hash};

/// A read-only name → value mapping.
///
/// Scopes are supplied by the caller for a single evaluation and never
/// retained by the formula.
pub trait Scope {
    /// Value bound to `name`, if this scope defines it
    fn value(&self, name: &str) -> Option<f64>;
}

impl<K, S> Scope for HashMap<K, f64, S>
where
    K: Borrow<str> + Hash + Eq,
    S: BuildHasher,
{
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl<K> Scope for ahash::AHashMap<K, f64>
where
    K: Borrow<str> + Hash + Eq,
{
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

impl<K> Scope for BTreeMap<K, f64>
where
    K: Borrow<str> + Ord,
{
    fn value(&self, name: &str) -> Option<f64> {
        self.get(name).copied()
    }
}

/// An absent scope defines nothing
impl<S: Scope> Scope for Option<S> {
    fn value(&self, name: &str) -> Option<f64> {
        self.as_ref().and_then(|scope| scope.value(name))
    }
}

impl<S: Scope + ?Sized> Scope for &S {
    fn value(&self, name: &str) -> Option<f64> {
        (**self).value(name)
    }
}

/// Sum of `name` across every scope that defines it; `0` when none do
pub fn accumulate(scopes: &[&dyn Scope], name: &str) -> f64 {
    scopes
        .iter()
        .filter_map(|scope| scope.value(name))
        .fold(0.0, |total, value| total + value)
}
