//! Record type definitions
//!
//! One `AppleRecord` per marketing year. Every quantity is an `f64`;
//! nested `fresh` and `processed` blocks carry the per-channel balance.
//!
//! The field tables at the bottom of this file drive both the validator
//! (presence order, sign rules) and the CSV codec (column order).

use serde::{Deserialize, Serialize};

/// Fresh-apple balance for one marketing year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreshStats {
    pub production: f64,
    pub exports: f64,
    pub imports: f64,
    pub consumption: f64,
    pub per_capita_production: f64,
    pub ending_stocks: f64,
    /// May be negative when stocks are drawn down
    pub stock_change: f64,
    pub self_sufficiency_rate: f64,
}

/// Processed-apple balance for one marketing year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedStats {
    pub production: f64,
    pub exports: f64,
    pub imports: f64,
    pub consumption: f64,
    pub per_capita_production: f64,
    pub self_sufficiency_rate: f64,
}

/// Annual statistics record, keyed by `marketing_year`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppleRecord {
    /// Unique key, immutable once stored
    pub marketing_year: String,
    pub area: f64,
    pub r#yield: f64,
    pub total_production: f64,
    pub losses_and_feed: f64,
    pub usable_production: f64,
    pub fresh: FreshStats,
    pub processed: ProcessedStats,
    pub per_capita_production: f64,
}

impl AppleRecord {
    /// Returns the value of a flat column, `None` for `marketing_year`
    /// or an unknown column.
    pub fn numeric_column(&self, column: &str) -> Option<f64> {
        let value = match column {
            "area" => self.area,
            "yield" => self.r#yield,
            "total_production" => self.total_production,
            "losses_and_feed" => self.losses_and_feed,
            "usable_production" => self.usable_production,
            "per_capita_production" => self.per_capita_production,
            "fresh.production" => self.fresh.production,
            "fresh.exports" => self.fresh.exports,
            "fresh.imports" => self.fresh.imports,
            "fresh.consumption" => self.fresh.consumption,
            "fresh.per_capita_production" => self.fresh.per_capita_production,
            "fresh.ending_stocks" => self.fresh.ending_stocks,
            "fresh.stock_change" => self.fresh.stock_change,
            "fresh.self_sufficiency_rate" => self.fresh.self_sufficiency_rate,
            "processed.production" => self.processed.production,
            "processed.exports" => self.processed.exports,
            "processed.imports" => self.processed.imports,
            "processed.consumption" => self.processed.consumption,
            "processed.per_capita_production" => self.processed.per_capita_production,
            "processed.self_sufficiency_rate" => self.processed.self_sufficiency_rate,
            _ => return None,
        };
        Some(value)
    }
}

/// Sign constraint on a numeric field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericRule {
    /// Must be a finite number >= 0
    NonNegative,
    /// Must be a finite number of any sign
    Signed,
}

impl NumericRule {
    /// Requirement text used in error messages
    pub fn requirement(&self) -> &'static str {
        match self {
            NumericRule::NonNegative => "a non-negative number",
            NumericRule::Signed => "a number",
        }
    }
}

/// Numeric field definition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name within its block
    pub name: &'static str,
    /// Sign constraint
    pub rule: NumericRule,
}

impl FieldDef {
    const fn non_negative(name: &'static str) -> Self {
        Self {
            name,
            rule: NumericRule::NonNegative,
        }
    }

    const fn signed(name: &'static str) -> Self {
        Self {
            name,
            rule: NumericRule::Signed,
        }
    }
}

/// Name of the key field
pub const MARKETING_YEAR: &str = "marketing_year";

/// Nested block holding fresh-apple figures
pub const FRESH: &str = "fresh";

/// Nested block holding processed-apple figures
pub const PROCESSED: &str = "processed";

/// Required top-level fields, in the order presence is checked
pub const REQUIRED_TOP_LEVEL: [&str; 8] = [
    "area",
    "yield",
    "total_production",
    "losses_and_feed",
    "usable_production",
    FRESH,
    PROCESSED,
    "per_capita_production",
];

/// Numeric top-level fields
pub const TOP_LEVEL_FIELDS: [FieldDef; 6] = [
    FieldDef::non_negative("area"),
    FieldDef::non_negative("yield"),
    FieldDef::non_negative("total_production"),
    FieldDef::non_negative("losses_and_feed"),
    FieldDef::non_negative("usable_production"),
    FieldDef::non_negative("per_capita_production"),
];

/// Numeric fields of the `fresh` block, in column order
pub const FRESH_FIELDS: [FieldDef; 8] = [
    FieldDef::non_negative("production"),
    FieldDef::non_negative("exports"),
    FieldDef::non_negative("imports"),
    FieldDef::non_negative("consumption"),
    FieldDef::non_negative("per_capita_production"),
    FieldDef::non_negative("ending_stocks"),
    FieldDef::signed("stock_change"),
    FieldDef::signed("self_sufficiency_rate"),
];

/// Numeric fields of the `processed` block, in column order
pub const PROCESSED_FIELDS: [FieldDef; 6] = [
    FieldDef::non_negative("production"),
    FieldDef::non_negative("exports"),
    FieldDef::non_negative("imports"),
    FieldDef::non_negative("consumption"),
    FieldDef::signed("per_capita_production"),
    FieldDef::signed("self_sufficiency_rate"),
];

/// Flat CSV column order
pub const CSV_COLUMNS: [&str; 21] = [
    "marketing_year",
    "area",
    "yield",
    "total_production",
    "losses_and_feed",
    "usable_production",
    "fresh.production",
    "fresh.exports",
    "fresh.imports",
    "fresh.consumption",
    "fresh.per_capita_production",
    "fresh.ending_stocks",
    "fresh.stock_change",
    "fresh.self_sufficiency_rate",
    "processed.production",
    "processed.exports",
    "processed.imports",
    "processed.consumption",
    "processed.per_capita_production",
    "processed.self_sufficiency_rate",
    "per_capita_production",
];
