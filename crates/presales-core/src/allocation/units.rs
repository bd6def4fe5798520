use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PresalesError;
use crate::types::Money;
use crate::PresalesResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A unit offered in the pre-sales pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    /// Opaque unit label (e.g. "A-101"). Need not be unique.
    pub unit: String,
    /// List price of the unit
    pub price: Money,
}

/// A unit row as handed over by a tabular parser, before validation.
///
/// Both fields are optional text because spreadsheets and CSV exports
/// routinely carry blank cells and currency-formatted prices. Spanish
/// `unidad`/`precio` headers are accepted as aliases.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UnitRecord {
    #[serde(default, alias = "unidad")]
    pub unit: Option<String>,
    #[serde(default, alias = "precio")]
    pub price: Option<String>,
}

impl Unit {
    pub fn new(unit: impl Into<String>, price: Money) -> Self {
        Unit {
            unit: unit.into(),
            price,
        }
    }
}

impl UnitRecord {
    /// Convert a raw record into a validated [`Unit`].
    ///
    /// `index` is the record position, reported back on failure.
    pub fn into_unit(self, index: usize) -> PresalesResult<Unit> {
        let unit = match self.unit {
            Some(id) if !id.trim().is_empty() => id.trim().to_string(),
            _ => {
                return Err(PresalesError::malformed(
                    index,
                    "unit",
                    "Unit identifier is missing or blank",
                ))
            }
        };

        let raw_price = self
            .price
            .ok_or_else(|| PresalesError::malformed(index, "price", "Price is missing"))?;
        let price = normalize_amount(&raw_price).ok_or_else(|| {
            PresalesError::malformed(
                index,
                "price",
                format!("'{raw_price}' is not a usable amount"),
            )
        })?;

        let parsed = Unit { unit, price };
        validate_unit(index, &parsed)?;
        Ok(parsed)
    }
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Parse a possibly currency-formatted amount ("$1,250,000.50") into a
/// decimal. Dollar signs, thousands separators and whitespace are stripped
/// before parsing. Returns `None` when nothing numeric remains.
pub fn normalize_amount(raw: &str) -> Option<Money> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .ok()
}

/// Convert an ordered batch of raw records into units.
///
/// The first bad record aborts the whole batch: totals are only meaningful
/// over the complete unit list.
pub fn units_from_records(records: Vec<UnitRecord>) -> PresalesResult<Vec<Unit>> {
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| r.into_unit(i))
        .collect()
}

/// Check that a unit has a usable identifier and a non-negative price.
pub fn validate_unit(index: usize, unit: &Unit) -> PresalesResult<()> {
    validate_unit_fields(index, &unit.unit, unit.price)
}

pub(crate) fn validate_unit_fields(index: usize, unit: &str, price: Money) -> PresalesResult<()> {
    if unit.trim().is_empty() {
        return Err(PresalesError::malformed(
            index,
            "unit",
            "Unit identifier is missing or blank",
        ));
    }
    if price < Decimal::ZERO {
        return Err(PresalesError::malformed(
            index,
            "price",
            format!("Price must be non-negative, got {price}"),
        ));
    }
    Ok(())
}
