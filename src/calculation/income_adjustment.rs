//! Net income adjustment shared by the support calculators.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::config::RuleSetRepository;
use crate::models::Income;

/// Breakdown of an adjusted net income.
///
/// Kept as a struct rather than a bare amount so calculators can put the
/// individual components into their step traces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeAdjustment {
    /// Net income before adjustment.
    pub net: Decimal,
    /// Monthly share of annual one-off payments, added to the net.
    pub bonus_share: Decimal,
    /// Work-related expense allowance.
    pub work_expense_allowance: Decimal,
    /// Additional retirement contributions as claimed.
    pub retirement_claimed: Decimal,
    /// Retirement contributions actually deductible after the gross-income cap.
    pub retirement_allowed: Decimal,
    /// Sum of the remaining itemized deductions.
    pub other_deductions: Decimal,
    /// Adjusted net income, never negative.
    pub adjusted: Decimal,
}

/// Adjusts a net income under a region's guideline rules.
///
/// The flat-rate work expense allowance is applied first, then additional
/// retirement contributions capped at the region's fraction of gross income,
/// then the remaining itemized deductions. The result is floored at zero;
/// an obligor is never carried with negative income into the table lookup.
pub fn adjust_net_income(
    income: &Income,
    repo: &RuleSetRepository,
    region: &str,
    as_of: NaiveDate,
) -> IncomeAdjustment {
    let net = income.net_monthly;
    let bonus_share = income.annual_bonus_share;
    let allowance = repo.work_expense_allowance(net, region, income.work_expenses, as_of);
    let cap_rate = repo.resolve(region, as_of).parameters.retirement_cap_rate;
    let retirement_cap = (cap_rate * income.gross_monthly).max(Decimal::ZERO);
    let retirement_allowed = income.retirement_contributions.min(retirement_cap);
    let other_deductions = income.commuting_costs
        + income.education_costs
        + income.union_dues
        + income.debt_service
        + income.prior_support;
    let adjusted = (net + bonus_share - allowance - retirement_allowed - other_deductions)
        .max(Decimal::ZERO)
        .round_dp(2);
    IncomeAdjustment {
        net,
        bonus_share,
        work_expense_allowance: allowance,
        retirement_claimed: income.retirement_contributions,
        retirement_allowed,
        other_deductions,
        adjusted,
    }
}
