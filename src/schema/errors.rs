//! Validation error types
//!
//! Every rejection carries a stable code, the offending field path when
//! there is one, and a message fit for the HTTP error envelope.
//!
//! Error codes:
//! - APPLE_MARKETING_YEAR_REQUIRED
//! - APPLE_MARKETING_YEAR_IMMUTABLE
//! - APPLE_MISSING_FIELD
//! - APPLE_TYPE_MISMATCH
//! - APPLE_NOT_AN_OBJECT
//! - APPLE_INVALID_NUMBER
//! - APPLE_NEGATIVE_VALUE
//! - APPLE_PRODUCTION_SUM_EXCEEDED
//! - APPLE_USABLE_EXCEEDS_TOTAL
//! - APPLE_LOSSES_EXCEED_TOTAL

use std::fmt;

use super::types::NumericRule;

/// Validation error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorCode {
    /// `marketing_year` missing, null or empty
    MarketingYearRequired,
    /// Body tries to re-key an existing record
    MarketingYearImmutable,
    /// Required field absent
    MissingField,
    /// Value has the wrong JSON type (non-numeric cases excluded)
    TypeMismatch,
    /// `fresh` or `processed` is not an object
    NotAnObject,
    /// Numeric field holds a non-numeric or non-finite value
    InvalidNumber,
    /// Non-negative field holds a negative number
    NegativeValue,
    /// fresh + processed production exceeds total production
    ProductionSumExceeded,
    /// usable production exceeds total production
    UsableExceedsTotal,
    /// losses and feed exceed total production
    LossesExceedTotal,
}

impl ValidationErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MarketingYearRequired => "APPLE_MARKETING_YEAR_REQUIRED",
            Self::MarketingYearImmutable => "APPLE_MARKETING_YEAR_IMMUTABLE",
            Self::MissingField => "APPLE_MISSING_FIELD",
            Self::TypeMismatch => "APPLE_TYPE_MISMATCH",
            Self::NotAnObject => "APPLE_NOT_AN_OBJECT",
            Self::InvalidNumber => "APPLE_INVALID_NUMBER",
            Self::NegativeValue => "APPLE_NEGATIVE_VALUE",
            Self::ProductionSumExceeded => "APPLE_PRODUCTION_SUM_EXCEEDED",
            Self::UsableExceedsTotal => "APPLE_USABLE_EXCEEDS_TOTAL",
            Self::LossesExceedTotal => "APPLE_LOSSES_EXCEED_TOTAL",
        }
    }

    /// Returns true for the cross-field business rules
    pub fn is_business_rule(&self) -> bool {
        matches!(
            self,
            Self::ProductionSumExceeded | Self::UsableExceedsTotal | Self::LossesExceedTotal
        )
    }
}

impl fmt::Display for ValidationErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A rejected record
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    code: ValidationErrorCode,
    field: Option<String>,
    message: String,
}

impl ValidationError {
    fn new(code: ValidationErrorCode, field: Option<String>, message: String) -> Self {
        Self {
            code,
            field,
            message,
        }
    }

    pub fn marketing_year_required() -> Self {
        Self::new(
            ValidationErrorCode::MarketingYearRequired,
            Some("marketing_year".into()),
            "Marketing year is required".into(),
        )
    }

    pub fn marketing_year_immutable(existing: &str, attempted: &str) -> Self {
        Self::new(
            ValidationErrorCode::MarketingYearImmutable,
            Some("marketing_year".into()),
            format!(
                "Marketing year is immutable: record '{}' cannot be renamed to '{}'",
                existing, attempted
            ),
        )
    }

    pub fn missing_field(field: impl Into<String>) -> Self {
        let field = field.into();
        Self::new(
            ValidationErrorCode::MissingField,
            Some(field.clone()),
            format!("Missing required field: {}", field),
        )
    }

    pub fn type_mismatch(field: impl Into<String>, expected: &str, actual: &str) -> Self {
        let field = field.into();
        Self::new(
            ValidationErrorCode::TypeMismatch,
            Some(field.clone()),
            format!("Field '{}' must be {}, got {}", field, expected, actual),
        )
    }

    pub fn not_an_object(field: impl Into<String>, actual: &str) -> Self {
        let field = field.into();
        Self::new(
            ValidationErrorCode::NotAnObject,
            Some(field.clone()),
            format!("Field '{}' must be an object, got {}", field, actual),
        )
    }

    pub fn invalid_number(field: impl Into<String>, rule: NumericRule, actual: &str) -> Self {
        let field = field.into();
        Self::new(
            ValidationErrorCode::InvalidNumber,
            Some(field.clone()),
            format!("Field '{}' must be {}, got {}", field, rule.requirement(), actual),
        )
    }

    pub fn negative_value(field: impl Into<String>, value: f64) -> Self {
        let field = field.into();
        Self::new(
            ValidationErrorCode::NegativeValue,
            Some(field.clone()),
            format!("Field '{}' must be a non-negative number, got {}", field, value),
        )
    }

    pub fn production_sum_exceeded(fresh: f64, processed: f64, total: f64) -> Self {
        Self::new(
            ValidationErrorCode::ProductionSumExceeded,
            Some("total_production".into()),
            format!(
                "Sum of fresh and processed production ({} + {} = {}) \
                 exceeds total production ({})",
                fresh,
                processed,
                fresh + processed,
                total
            ),
        )
    }

    pub fn usable_exceeds_total(usable: f64, total: f64) -> Self {
        Self::new(
            ValidationErrorCode::UsableExceedsTotal,
            Some("usable_production".into()),
            format!(
                "Usable production ({}) cannot exceed total production ({})",
                usable, total
            ),
        )
    }

    pub fn losses_exceed_total(losses: f64, total: f64) -> Self {
        Self::new(
            ValidationErrorCode::LossesExceedTotal,
            Some("losses_and_feed".into()),
            format!(
                "Losses and feed ({}) cannot exceed total production ({})",
                losses, total
            ),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> ValidationErrorCode {
        self.code
    }

    /// Returns the offending field path, if any
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the human-readable message
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationError {}

/// Result type for validation
pub type ValidationResult<T> = Result<T, ValidationError>;
