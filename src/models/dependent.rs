//! Dependent (child) data for support calculations.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which household a dependent resides in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Custodian {
    /// The dependent lives with the firm's client.
    Client,
    /// The dependent lives with the other parent.
    OtherParent,
    /// The dependent alternates between both households.
    Alternating,
}

/// Age bracket of the statutory support table.
///
/// Brackets are fixed age cutoffs: under 6, under 12, under 18, and adult.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgeBracket {
    /// Ages 0-5.
    UnderSix,
    /// Ages 6-11.
    SixToEleven,
    /// Ages 12-17.
    TwelveToSeventeen,
    /// Age 18 and above.
    Adult,
}

impl AgeBracket {
    /// Maps an age in whole years to its bracket.
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=5 => AgeBracket::UnderSix,
            6..=11 => AgeBracket::SixToEleven,
            12..=17 => AgeBracket::TwelveToSeventeen,
            _ => AgeBracket::Adult,
        }
    }

    /// Column index of this bracket in the support table (0-3).
    pub fn index(self) -> usize {
        match self {
            AgeBracket::UnderSix => 0,
            AgeBracket::SixToEleven => 1,
            AgeBracket::TwelveToSeventeen => 2,
            AgeBracket::Adult => 3,
        }
    }
}

/// A dependent child in a child-support calculation.
///
/// Ages are always derived against the calculation's as-of date rather than
/// wall-clock today, so a trace recomputed later reproduces the same figures.
///
/// # Example
///
/// ```
/// use support_engine::models::{AgeBracket, Custodian, Dependent};
/// use chrono::NaiveDate;
///
/// let child = Dependent {
///     name: "Anna".to_string(),
///     birth_date: NaiveDate::from_ymd_opt(2018, 6, 15).unwrap(),
///     custodian: Custodian::OtherParent,
///     own_income: rust_decimal::Decimal::ZERO,
///     privileged: true,
///     in_education: false,
/// };
/// let as_of = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
/// assert_eq!(child.age(as_of), 7);
/// assert_eq!(child.age_bracket(as_of), AgeBracket::SixToEleven);
/// assert!(child.is_minor(as_of));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dependent {
    /// The dependent's given name (used to label trace steps).
    pub name: String,
    /// Date of birth.
    pub birth_date: NaiveDate,
    /// Which parent or household the dependent resides with.
    pub custodian: Custodian,
    /// The dependent's own monthly income, if any.
    #[serde(default)]
    pub own_income: Decimal,
    /// Whether the dependent counts as privileged under simplified-majority
    /// rules.
    #[serde(default = "default_true")]
    pub privileged: bool,
    /// Whether the dependent is in full-time education.
    #[serde(default)]
    pub in_education: bool,
}

fn default_true() -> bool {
    true
}

impl Dependent {
    /// The dependent's age in whole years on the given date.
    pub fn age(&self, as_of: NaiveDate) -> u32 {
        let mut age = as_of.year() - self.birth_date.year();
        if (as_of.month(), as_of.day()) < (self.birth_date.month(), self.birth_date.day()) {
            age -= 1;
        }
        age.max(0) as u32
    }

    /// The support-table age bracket on the given date.
    pub fn age_bracket(&self, as_of: NaiveDate) -> AgeBracket {
        AgeBracket::from_age(self.age(as_of))
    }

    /// Whether the dependent is a minor on the given date.
    pub fn is_minor(&self, as_of: NaiveDate) -> bool {
        self.age(as_of) < 18
    }

    /// Whether the dependent is a privileged adult child on the given date:
    /// under 21, in education, and residing with a parent.
    pub fn is_privileged_adult(&self, as_of: NaiveDate) -> bool {
        let age = self.age(as_of);
        age >= 18
            && age < 21
            && self.in_education
            && matches!(self.custodian, Custodian::Client | Custodian::OtherParent)
    }
}
