//! Validation Invariant Tests
//!
//! - Every required field is enforced, top-level and nested
//! - Every non-negative field rejects negatives; signed fields accept them
//! - Business rules compare against total_production
//! - Validation is deterministic and never mutates its input

use apple_stats::schema::{
    revalidate, validate, validate_update, ValidationErrorCode, CSV_COLUMNS, FRESH,
    FRESH_FIELDS, NumericRule, PROCESSED, PROCESSED_FIELDS, REQUIRED_TOP_LEVEL,
    TOP_LEVEL_FIELDS,
};
use serde_json::{json, Map, Value};

// =============================================================================
// Helper Functions
// =============================================================================

fn valid_record() -> Value {
    json!({
        "marketing_year": "2016/17",
        "area": 480.0,
        "yield": 25.0,
        "total_production": 100.0,
        "losses_and_feed": 5.0,
        "usable_production": 95.0,
        "fresh": {
            "production": 40.0,
            "exports": 10.0,
            "imports": 8.0,
            "consumption": 35.0,
            "per_capita_production": 9.1,
            "ending_stocks": 12.0,
            "stock_change": -3.0,
            "self_sufficiency_rate": 1.05
        },
        "processed": {
            "production": 50.0,
            "exports": 4.0,
            "imports": 2.0,
            "consumption": 47.0,
            "per_capita_production": 11.2,
            "self_sufficiency_rate": 0.98
        },
        "per_capita_production": 20.3
    })
}

fn nested_mut<'a>(doc: &'a mut Value, path: &str) -> (&'a mut Map<String, Value>, String) {
    match path.split_once('.') {
        Some((block, field)) => (doc[block].as_object_mut().unwrap(), field.to_string()),
        None => (doc.as_object_mut().unwrap(), path.to_string()),
    }
}

fn without(path: &str) -> Value {
    let mut doc = valid_record();
    let (obj, field) = nested_mut(&mut doc, path);
    obj.remove(&field);
    doc
}

fn with(path: &str, value: Value) -> Value {
    let mut doc = valid_record();
    let (obj, field) = nested_mut(&mut doc, path);
    obj.insert(field, value);
    doc
}

fn numeric_paths(rule: NumericRule) -> Vec<String> {
    let top = TOP_LEVEL_FIELDS
        .iter()
        .filter(|d| d.rule == rule)
        .map(|d| d.name.to_string());
    let fresh = FRESH_FIELDS
        .iter()
        .filter(|d| d.rule == rule)
        .map(|d| format!("{}.{}", FRESH, d.name));
    let processed = PROCESSED_FIELDS
        .iter()
        .filter(|d| d.rule == rule)
        .map(|d| format!("{}.{}", PROCESSED, d.name));
    top.chain(fresh).chain(processed).collect()
}

// =============================================================================
// Acceptance Tests
// =============================================================================

#[test]
fn test_valid_record_accepted() {
    let record = validate(&valid_record()).unwrap();
    assert_eq!(record.marketing_year, "2016/17");
    assert_eq!(record.fresh.stock_change, -3.0);
}

#[test]
fn test_validation_is_deterministic() {
    let doc = valid_record();
    let first = validate(&doc).unwrap();
    for _ in 0..100 {
        assert_eq!(validate(&doc).unwrap(), first);
    }
    assert_eq!(doc, valid_record());
}

#[test]
fn test_extra_fields_ignored() {
    let record = validate(&with("country", json!("EU-27"))).unwrap();
    assert_eq!(record.area, 480.0);
}

#[test]
fn test_integer_values_accepted() {
    let record = validate(&with("area", json!(480))).unwrap();
    assert_eq!(record.area, 480.0);
}

// =============================================================================
// Required Field Tests
// =============================================================================

#[test]
fn test_every_required_top_level_field_enforced() {
    for field in REQUIRED_TOP_LEVEL {
        let err = validate(&without(field)).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::MissingField, "{}", field);
        assert_eq!(err.field(), Some(field));
    }
}

#[test]
fn test_every_nested_field_enforced() {
    let nested = FRESH_FIELDS
        .iter()
        .map(|d| format!("{}.{}", FRESH, d.name))
        .chain(PROCESSED_FIELDS.iter().map(|d| format!("{}.{}", PROCESSED, d.name)));

    for path in nested {
        let err = validate(&without(&path)).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::MissingField, "{}", path);
        assert_eq!(err.field(), Some(path.as_str()));
    }
}

#[test]
fn test_every_csv_column_is_required() {
    for column in CSV_COLUMNS.iter().skip(1) {
        assert!(validate(&without(column)).is_err(), "{}", column);
    }
}

#[test]
fn test_marketing_year_required() {
    for doc in [
        without("marketing_year"),
        with("marketing_year", Value::Null),
        with("marketing_year", json!("   ")),
    ] {
        let err = validate(&doc).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::MarketingYearRequired);
    }
}

#[test]
fn test_nested_block_must_be_object() {
    let err = validate(&with("fresh", json!([1, 2]))).unwrap_err();
    assert_eq!(err.code(), ValidationErrorCode::NotAnObject);
    assert_eq!(err.field(), Some("fresh"));
}

// =============================================================================
// Sign Tests
// =============================================================================

#[test]
fn test_every_non_negative_field_rejects_negative() {
    let paths = numeric_paths(NumericRule::NonNegative);
    assert_eq!(paths.len(), 16);

    for path in paths {
        let err = validate(&with(&path, json!(-1.0))).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::NegativeValue, "{}", path);
        assert_eq!(err.field(), Some(path.as_str()));
    }
}

#[test]
fn test_signed_fields_accept_negative() {
    let paths = numeric_paths(NumericRule::Signed);
    assert_eq!(paths.len(), 4);

    for path in paths {
        assert!(validate(&with(&path, json!(-0.5))).is_ok(), "{}", path);
    }
}

#[test]
fn test_numeric_strings_not_coerced() {
    let err = validate(&with("area", json!("480"))).unwrap_err();
    assert_eq!(err.code(), ValidationErrorCode::InvalidNumber);
    assert_eq!(err.field(), Some("area"));
}

// =============================================================================
// Business Rule Tests
// =============================================================================

#[test]
fn test_production_sum_exceeding_total_rejected() {
    let err = validate(&with("fresh.production", json!(60.0))).unwrap_err();
    assert_eq!(err.code(), ValidationErrorCode::ProductionSumExceeded);
    assert_eq!(err.field(), Some("total_production"));
    assert!(err.message().contains("60"));
    assert!(err.message().contains("100"));
}

#[test]
fn test_production_sum_equal_to_total_accepted() {
    assert!(validate(&with("fresh.production", json!(50.0))).is_ok());
}

#[test]
fn test_usable_exceeding_total_rejected() {
    let err = validate(&with("usable_production", json!(101.0))).unwrap_err();
    assert_eq!(err.code(), ValidationErrorCode::UsableExceedsTotal);
    assert!(err.code().is_business_rule());
}

#[test]
fn test_losses_exceeding_total_rejected() {
    let err = validate(&with("losses_and_feed", json!(150.0))).unwrap_err();
    assert_eq!(err.code(), ValidationErrorCode::LossesExceedTotal);
    assert_eq!(err.field(), Some("losses_and_feed"));
}

// =============================================================================
// Update Tests
// =============================================================================

#[test]
fn test_update_cannot_rekey() {
    let err = validate_update("2015/16", &valid_record()).unwrap_err();
    assert_eq!(err.code(), ValidationErrorCode::MarketingYearImmutable);
}

#[test]
fn test_revalidate_accepts_stored_record() {
    let record = validate(&valid_record()).unwrap();
    assert_eq!(revalidate(&record).unwrap(), record);
}
