//! Formulas stored as plain strings in serialized data tables
#![cfg(feature = "serde")]

use pretty_assertions::assert_eq;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tally_formula::Formula;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct SkillRow {
    id: u32,
    damage: Formula,
    #[serde(default)]
    cooldown: Formula,
}

#[test]
fn test_deserialize_row() {
    let row: SkillRow =
        serde_json::from_str(r#"{"id": 7, "damage": "[ATK]*2-[DEF]", "cooldown": ""}"#).unwrap();

    let stats: HashMap<&str, f64> = [("ATK", 10.0), ("DEF", 3.0)].into_iter().collect();
    assert_eq!(row.damage.evaluate(&[&stats]), 17.0);
    assert!(row.cooldown.is_none());
}

#[test]
fn test_missing_column_is_none() {
    let row: SkillRow = serde_json::from_str(r#"{"id": 1, "damage": "5"}"#).unwrap();
    assert!(row.cooldown.is_none());
}

#[test]
fn test_serialize_row() {
    let row = SkillRow {
        id: 3,
        damage: "([ATK]+1)*2".parse().unwrap(),
        cooldown: Formula::NONE,
    };

    let json = serde_json::to_string(&row).unwrap();
    assert_eq!(json, r#"{"id":3,"damage":"([ATK] + 1) * 2","cooldown":""}"#);

    let back: SkillRow = serde_json::from_str(&json).unwrap();
    assert_eq!(back, row);
}

#[test]
fn test_malformed_formula_is_a_data_error() {
    let err = serde_json::from_str::<SkillRow>(r#"{"id": 2, "damage": "[ATK"}"#).unwrap_err();
    assert!(err.to_string().contains("Unterminated variable"), "{err}");
}

#[test]
fn test_oversized_literal_is_rejected() {
    let json = format!(r#"{{"id": 4, "damage": "1{}"}}"#, "0".repeat(400));
    let err = serde_json::from_str::<SkillRow>(&json).unwrap_err();
    assert!(err.to_string().contains("Invalid numeric literal"), "{err}");
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct TriggerRow {
    #[serde(with = "tally_formula::with_logic")]
    condition: Formula,
    bonus: Formula,
}

#[test]
fn test_logic_fields_round_trip() {
    let json = r#"{"condition":"[ALIVE] & ![STUNNED]","bonus":"[ATK] / 2"}"#;
    let row: TriggerRow = serde_json::from_str(json).unwrap();

    let stats: HashMap<&str, f64> = [("ALIVE", 1.0), ("ATK", 8.0)].into_iter().collect();
    assert_eq!(row.condition.evaluate(&[&stats]), 1.0);
    assert_eq!(row.bonus.evaluate(&[&stats]), 4.0);

    assert_eq!(serde_json::to_string(&row).unwrap(), json);
}

#[test]
fn test_logic_text_needs_logic_adapter() {
    let err =
        serde_json::from_str::<SkillRow>(r#"{"id": 5, "damage": "[A] & [B]"}"#).unwrap_err();
    assert!(err.to_string().contains("Unexpected character '&'"), "{err}");

    let err = serde_json::from_str::<SkillRow>(r#"{"id": 5, "damage": "![A]"}"#).unwrap_err();
    assert!(err.to_string().contains("Unexpected character '!'"), "{err}");
}
