//! Record validator
//!
//! Turns an untyped JSON body into an `AppleRecord` or rejects it whole.
//! Checks run in a fixed order and stop at the first failure:
//!
//! 1. `marketing_year` present and non-empty once trimmed
//! 2. Required top-level fields present
//! 3. `fresh` and `processed` are objects
//! 4. Required nested fields present
//! 5. Numeric fields are numbers, non-negative where required
//! 6. Business rules against `total_production`
//!
//! The validator never mutates its input and never coerces strings to
//! numbers. Undeclared fields are ignored.

use serde_json::{Map, Value};

use super::errors::{ValidationError, ValidationResult};
use super::types::{
    AppleRecord, FieldDef, FreshStats, NumericRule, ProcessedStats, FRESH, FRESH_FIELDS,
    MARKETING_YEAR, PROCESSED, PROCESSED_FIELDS, REQUIRED_TOP_LEVEL, TOP_LEVEL_FIELDS,
};

/// Validates a candidate record.
///
/// # Errors
///
/// Returns the first `ValidationError` encountered; nothing is returned
/// for a partially valid record.
pub fn validate(candidate: &Value) -> ValidationResult<AppleRecord> {
    let obj = candidate.as_object().ok_or_else(|| {
        ValidationError::type_mismatch("$root", "an object", json_type_name(candidate))
    })?;

    let marketing_year = marketing_year(obj)?;

    for field in REQUIRED_TOP_LEVEL {
        if !obj.contains_key(field) {
            return Err(ValidationError::missing_field(field));
        }
    }

    let fresh_obj = nested_object(obj, FRESH)?;
    let processed_obj = nested_object(obj, PROCESSED)?;

    require_fields(fresh_obj, FRESH, &FRESH_FIELDS)?;
    require_fields(processed_obj, PROCESSED, &PROCESSED_FIELDS)?;

    let top = Block::new(obj, None, &TOP_LEVEL_FIELDS);
    let fresh = Block::new(fresh_obj, Some(FRESH), &FRESH_FIELDS);
    let processed = Block::new(processed_obj, Some(PROCESSED), &PROCESSED_FIELDS);

    let record = AppleRecord {
        marketing_year,
        area: top.number("area")?,
        r#yield: top.number("yield")?,
        total_production: top.number("total_production")?,
        losses_and_feed: top.number("losses_and_feed")?,
        usable_production: top.number("usable_production")?,
        fresh: FreshStats {
            production: fresh.number("production")?,
            exports: fresh.number("exports")?,
            imports: fresh.number("imports")?,
            consumption: fresh.number("consumption")?,
            per_capita_production: fresh.number("per_capita_production")?,
            ending_stocks: fresh.number("ending_stocks")?,
            stock_change: fresh.number("stock_change")?,
            self_sufficiency_rate: fresh.number("self_sufficiency_rate")?,
        },
        processed: ProcessedStats {
            production: processed.number("production")?,
            exports: processed.number("exports")?,
            imports: processed.number("imports")?,
            consumption: processed.number("consumption")?,
            per_capita_production: processed.number("per_capita_production")?,
            self_sufficiency_rate: processed.number("self_sufficiency_rate")?,
        },
        per_capita_production: top.number("per_capita_production")?,
    };

    check_business_rules(&record)?;

    Ok(record)
}

/// Validates a replacement for the record stored under `path_year`.
///
/// Runs [`validate`], then rejects a body that would re-key the record.
pub fn validate_update(path_year: &str, candidate: &Value) -> ValidationResult<AppleRecord> {
    let record = validate(candidate)?;

    if record.marketing_year != path_year {
        return Err(ValidationError::marketing_year_immutable(
            path_year,
            &record.marketing_year,
        ));
    }

    Ok(record)
}

fn check_business_rules(record: &AppleRecord) -> ValidationResult<()> {
    let total = record.total_production;

    if record.fresh.production + record.processed.production > total {
        return Err(ValidationError::production_sum_exceeded(
            record.fresh.production,
            record.processed.production,
            total,
        ));
    }

    if record.usable_production > total {
        return Err(ValidationError::usable_exceeds_total(
            record.usable_production,
            total,
        ));
    }

    if record.losses_and_feed > total {
        return Err(ValidationError::losses_exceed_total(
            record.losses_and_feed,
            total,
        ));
    }

    Ok(())
}

/// Re-runs the full validator over a typed record, for records that
/// entered the store without passing [`validate`].
pub fn revalidate(record: &AppleRecord) -> ValidationResult<AppleRecord> {
    let value = serde_json::to_value(record).map_err(|e| {
        ValidationError::type_mismatch("$root", "a serializable record", &e.to_string())
    })?;
    validate(&value)
}

fn marketing_year(obj: &Map<String, Value>) -> ValidationResult<String> {
    match obj.get(MARKETING_YEAR) {
        None | Some(Value::Null) => Err(ValidationError::marketing_year_required()),
        // Stored keys are trimmed; the mirror decoder trims every cell.
        Some(Value::String(s)) => match s.trim() {
            "" => Err(ValidationError::marketing_year_required()),
            year => Ok(year.to_string()),
        },
        Some(other) => Err(ValidationError::type_mismatch(
            MARKETING_YEAR,
            "a string",
            json_type_name(other),
        )),
    }
}

fn nested_object<'a>(
    obj: &'a Map<String, Value>,
    field: &str,
) -> ValidationResult<&'a Map<String, Value>> {
    // Presence was checked in step 2.
    let value = obj.get(field).unwrap_or(&Value::Null);
    value
        .as_object()
        .ok_or_else(|| ValidationError::not_an_object(field, json_type_name(value)))
}

fn require_fields(
    obj: &Map<String, Value>,
    prefix: &str,
    fields: &[FieldDef],
) -> ValidationResult<()> {
    for def in fields {
        if !obj.contains_key(def.name) {
            return Err(ValidationError::missing_field(make_path(prefix, def.name)));
        }
    }
    Ok(())
}

/// One object level of the record with its numeric field table
struct Block<'a> {
    obj: &'a Map<String, Value>,
    prefix: Option<&'static str>,
    fields: &'static [FieldDef],
}

impl<'a> Block<'a> {
    fn new(
        obj: &'a Map<String, Value>,
        prefix: Option<&'static str>,
        fields: &'static [FieldDef],
    ) -> Self {
        Self {
            obj,
            prefix,
            fields,
        }
    }

    fn number(&self, name: &str) -> ValidationResult<f64> {
        let path = make_path(self.prefix.unwrap_or(""), name);
        let rule = self
            .fields
            .iter()
            .find(|def| def.name == name)
            .map(|def| def.rule)
            .unwrap_or(NumericRule::Signed);

        let value = self
            .obj
            .get(name)
            .ok_or_else(|| ValidationError::missing_field(path.clone()))?;

        let number = value
            .as_f64()
            .filter(|n| n.is_finite())
            .ok_or_else(|| {
                ValidationError::invalid_number(path.clone(), rule, json_type_name(value))
            })?;

        if rule == NumericRule::NonNegative && number < 0.0 {
            return Err(ValidationError::negative_value(path, number));
        }

        Ok(number)
    }
}

/// Returns the JSON type name for error messages.
fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Creates a field path from prefix and field name.
fn make_path(prefix: &str, field: &str) -> String {
    if prefix.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", prefix, field)
    }
}
