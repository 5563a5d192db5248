//! End-to-end tests: formula text through lexer, parser and evaluator

use pretty_assertions::assert_eq;
use std::collections::{BTreeMap, HashMap};
use tally_formula::{
    evaluate, parse, parse_formula, tokenize, Formula, LexError, Node, Scope, Token, TokenKind,
};

fn scope(values: &[(&'static str, f64)]) -> HashMap<&'static str, f64> {
    values.iter().copied().collect()
}

fn eval(text: &str, scopes: &[&dyn Scope]) -> f64 {
    evaluate(&parse(&tokenize(text).unwrap()).unwrap(), scopes)
}

/// Test tokenizing a variable reference followed by an operator and constant
#[test]
fn test_tokenize_reference() {
    assert_eq!(
        tokenize("[ATK]+2").unwrap(),
        vec![
            Token::variable("ATK"),
            Token::new(TokenKind::Addition),
            Token::constant("2"),
        ]
    );
}

/// Test lexer failures
#[test]
fn test_tokenize_failures() {
    assert!(matches!(
        tokenize("1.2.3"),
        Err(LexError::SecondDecimalPoint { .. })
    ));
    assert!(matches!(tokenize("[]"), Err(LexError::EmptyVariable { .. })));
}

/// Test a typical damage formula
#[test]
fn test_damage_formula() {
    let stats = scope(&[("ATK", 10.0), ("DEF", 3.0)]);
    assert_eq!(eval("[ATK]*2-[DEF]", &[&stats]), 17.0);
}

/// Test that + and - chains associate to the right
#[test]
fn test_right_associativity() {
    assert_eq!(eval("1-2-3", &[]), 2.0);
    assert_eq!(eval("10-4+3", &[]), 3.0);
    assert_eq!(eval("16/4/2", &[]), 8.0);
    // Parentheses restore the left-to-right reading
    assert_eq!(eval("(1-2)-3", &[]), -4.0);
}

/// Test that a variable sums across every scope that defines it
#[test]
fn test_cross_scope_summation() {
    let first = scope(&[("X", 2.0)]);
    let second = scope(&[("X", 5.0)]);
    assert_eq!(eval("[X]", &[&first, &second]), 7.0);

    // Different scope types can be layered together
    let ordered: BTreeMap<String, f64> = [("X".to_string(), 0.5)].into_iter().collect();
    assert_eq!(eval("[X]*2", &[&first, &ordered]), 5.0);
}

/// Test that missing variables read as zero
#[test]
fn test_missing_variables() {
    let stats = scope(&[("ATK", 10.0)]);
    assert_eq!(eval("[ATK]+[BONUS]", &[&stats]), 10.0);
    assert_eq!(eval("[BONUS]", &[]), 0.0);
}

/// Test division by zero follows IEEE semantics
#[test]
fn test_division_by_zero() {
    assert_eq!(eval("1/0", &[]), f64::INFINITY);
    assert!(eval("0/0", &[]).is_nan());
    assert!(eval("[A]/[B]", &[]).is_nan());
}

/// Test combinator identities with NONE
#[test]
fn test_combinator_identities() {
    let stats = scope(&[("ATK", 10.0), ("DEF", 3.0)]);
    let f = parse_formula("[ATK]*2-[DEF]").unwrap();

    assert_eq!((Formula::NONE - f.clone()).evaluate(&[&stats]), -f.evaluate(&[&stats]));
    assert!((Formula::NONE * f.clone()).is_none());
    assert!((f.clone() / Formula::NONE).is_none());
    assert_eq!(Formula::NONE + f.clone(), f);
    assert_eq!(Formula::NONE.evaluate(&[&stats]), 0.0);
}

/// Test composing parsed formulas without re-parsing
#[test]
fn test_compose_formulas() {
    let stats = scope(&[("ATK", 10.0), ("DEF", 3.0), ("CRIT", 0.5)]);
    let base = parse_formula("[ATK]-[DEF]").unwrap();
    let multiplier = parse_formula("1+[CRIT]").unwrap();

    let damage = &base * &multiplier;
    assert_eq!(damage.evaluate(&[&stats]), 10.5);
    assert_eq!(
        damage.into_root().unwrap(),
        Node::multiplication(
            Node::subtraction(Node::variable("ATK"), Node::variable("DEF")),
            Node::addition(Node::constant(1.0), Node::variable("CRIT")),
        )
    );
}

/// Test that evaluation is pure and repeatable
#[test]
fn test_idempotent_evaluation() {
    let stats = scope(&[("ATK", 0.1), ("DEF", 0.2)]);
    let formula = parse_formula("[ATK]/3+[DEF]*7.7-(1/[DEF])").unwrap();

    let first = formula.evaluate(&[&stats]);
    let second = formula.evaluate(&[&stats]);
    assert_eq!(first.to_bits(), second.to_bits());
}

/// Test empty and whitespace-only input
#[test]
fn test_empty_formula() {
    assert!(tokenize("").unwrap().is_empty());
    assert!(parse_formula(" \n ").unwrap().is_none());
    assert_eq!(eval("", &[]), 0.0);
}

/// Test evaluating one formula from several threads
#[test]
fn test_concurrent_evaluation() {
    let formula = parse_formula("[LEVEL]*[LEVEL]+10").unwrap();

    std::thread::scope(|s| {
        let handles: Vec<_> = (1..=4)
            .map(|level| {
                let formula = &formula;
                s.spawn(move || {
                    let stats = scope(&[("LEVEL", level as f64)]);
                    formula.evaluate(&[&stats])
                })
            })
            .collect();

        let results: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(results, vec![11.0, 14.0, 19.0, 26.0]);
    });
}
