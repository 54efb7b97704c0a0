//! Income data for support calculations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Monthly income figures plus optional itemized deductions.
///
/// An `Income` is never mutated after construction; the calculators derive
/// an adjusted net figure from it via pure functions (see
/// [`crate::calculation::adjust_net_income`]).
///
/// # Example
///
/// ```
/// use support_engine::models::Income;
/// use rust_decimal::Decimal;
///
/// let income = Income::new(Decimal::from(4500), Decimal::from(3200));
/// assert_eq!(income.net_monthly, Decimal::from(3200));
/// assert!(!income.self_employed);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Income {
    /// Gross monthly income.
    pub gross_monthly: Decimal,
    /// Net monthly income.
    pub net_monthly: Decimal,

    /// Actual substantiated work-related expenses, if claimed in place of
    /// the flat-rate allowance.
    #[serde(default)]
    pub work_expenses: Option<Decimal>,
    /// Monthly commuting costs.
    #[serde(default)]
    pub commuting_costs: Decimal,
    /// Continuing-education costs.
    #[serde(default)]
    pub education_costs: Decimal,
    /// Union membership dues.
    #[serde(default)]
    pub union_dues: Decimal,
    /// Additional retirement contributions; deductible only up to a
    /// percentage of gross income set by the regional rules.
    #[serde(default)]
    pub retirement_contributions: Decimal,
    /// Monthly debt service.
    #[serde(default)]
    pub debt_service: Decimal,
    /// Prior-ranking support obligations already being paid.
    #[serde(default)]
    pub prior_support: Decimal,

    /// Whether the income stems from self-employment.
    #[serde(default)]
    pub self_employed: bool,
    /// Monthly share of annualized one-time payments (bonuses, 13th month).
    #[serde(default)]
    pub annual_bonus_share: Decimal,
}

impl Income {
    /// Creates an income with the given gross and net figures and no
    /// itemized deductions.
    pub fn new(gross_monthly: Decimal, net_monthly: Decimal) -> Self {
        Self {
            gross_monthly,
            net_monthly,
            work_expenses: None,
            commuting_costs: Decimal::ZERO,
            education_costs: Decimal::ZERO,
            union_dues: Decimal::ZERO,
            retirement_contributions: Decimal::ZERO,
            debt_service: Decimal::ZERO,
            prior_support: Decimal::ZERO,
            self_employed: false,
            annual_bonus_share: Decimal::ZERO,
        }
    }
}
