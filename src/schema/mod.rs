//! Record schema and validator
//!
//! Records are validated at write time: a submitted body either becomes
//! a typed `AppleRecord` or is rejected in full with a `ValidationError`.
//!
//! # Invariants
//!
//! - All required top-level and nested fields are present
//! - `fresh` and `processed` are objects
//! - Quantities are numbers, non-negative where declared
//! - fresh.production + processed.production <= total_production
//! - usable_production <= total_production
//! - losses_and_feed <= total_production

mod errors;
mod types;
mod validator;

pub use errors::{ValidationError, ValidationErrorCode, ValidationResult};
pub use types::{
    AppleRecord, FieldDef, FreshStats, NumericRule, ProcessedStats, CSV_COLUMNS, FRESH,
    FRESH_FIELDS, MARKETING_YEAR, PROCESSED, PROCESSED_FIELDS, REQUIRED_TOP_LEVEL,
    TOP_LEVEL_FIELDS,
};
pub use validator::{revalidate, validate, validate_update};
