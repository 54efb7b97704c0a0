//! Asset positions for marital-property equalization.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The two parties to an equalization calculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Party {
    /// Party A (conventionally the firm's client).
    A,
    /// Party B (conventionally the opposing spouse).
    B,
}

/// Category of a valued asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    /// Real property.
    RealEstate,
    /// Vehicles.
    Vehicle,
    /// Bank and savings accounts.
    Account,
    /// Securities and investment holdings.
    Securities,
    /// Business interests.
    Business,
    /// Anything else.
    Other,
}

/// A single valued item in a start- or end-of-marriage snapshot.
///
/// # Example
///
/// ```
/// use support_engine::models::{AssetCategory, AssetPosition, Party};
/// use chrono::NaiveDate;
/// use rust_decimal::Decimal;
///
/// let position = AssetPosition {
///     description: "Apartment Kiel".to_string(),
///     category: AssetCategory::RealEstate,
///     value: Decimal::from(250_000),
///     owner: Party::A,
///     valuation_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
///     privileged: false,
///     liability: Decimal::from(120_000),
/// };
/// assert_eq!(position.net_value(), Decimal::from(130_000));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetPosition {
    /// Human-readable description of the item.
    pub description: String,
    /// The asset category.
    pub category: AssetCategory,
    /// Valuation of the item.
    pub value: Decimal,
    /// Which party owns the item.
    pub owner: Party,
    /// The date the valuation refers to.
    pub valuation_date: NaiveDate,
    /// Whether the item was acquired through inheritance or gift and is
    /// therefore credited to the start-of-marriage position.
    #[serde(default)]
    pub privileged: bool,
    /// Liability attached to the item (e.g. a mortgage).
    #[serde(default)]
    pub liability: Decimal,
}

impl AssetPosition {
    /// Value net of the attached liability. May be negative.
    pub fn net_value(&self) -> Decimal {
        self.value - self.liability
    }
}
