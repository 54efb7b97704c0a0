//! Spousal support calculation for separation and post-marital claims.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::{RetentionClass, RuleSetRepository};
use crate::error::{EngineError, EngineResult};
use crate::models::{CalculationKind, CalculationResult, Income, Severity, TraceBuilder};

/// Which spousal support claim is being calculated.
///
/// The arithmetic is identical; the kind tags the result so downstream
/// consumers can tell a separation-period claim from a post-marital one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SupportKind {
    /// Support during separation, before the divorce is final.
    Separation,
    /// Support after the divorce.
    PostMarital,
}

impl SupportKind {
    fn calculation_kind(self) -> CalculationKind {
        match self {
            SupportKind::Separation => CalculationKind::SeparationSupport,
            SupportKind::PostMarital => CalculationKind::PostMaritalSupport,
        }
    }
}

/// Input for a spousal support calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpousalSupportInput {
    /// The paying spouse's income.
    pub obligor_income: Income,
    /// The receiving spouse's income.
    pub obligee_income: Income,
    /// Whether the paying spouse is employed.
    pub obligor_employed: bool,
    /// Whether the receiving spouse is employed.
    pub obligee_employed: bool,
    /// Monthly imputed housing benefit of the paying spouse.
    #[serde(default)]
    pub obligor_housing_benefit: Decimal,
    /// Monthly imputed housing benefit of the receiving spouse.
    #[serde(default)]
    pub obligee_housing_benefit: Decimal,
    /// Child support already owed by the paying spouse, deducted first.
    #[serde(default)]
    pub child_support_deduction: Decimal,
    /// Separation or post-marital claim.
    pub kind: SupportKind,
    /// Region whose guideline parameters apply.
    pub region: String,
    /// Date the calculation refers to.
    pub as_of: NaiveDate,
}

/// Calculates spousal support with a full step trace.
pub struct SpousalSupportCalculator<'a> {
    repo: &'a RuleSetRepository,
}

impl<'a> SpousalSupportCalculator<'a> {
    /// Creates a calculator over a rule-set repository.
    pub fn new(repo: &'a RuleSetRepository) -> Self {
        Self { repo }
    }

    /// Runs the calculation.
    pub fn calculate(&self, input: &SpousalSupportInput) -> EngineResult<CalculationResult> {
        debug!(region = %input.region, kind = ?input.kind, "calculating spousal support");

        let ruleset = self.repo.resolve(&input.region, input.as_of);
        let table = self.repo.table_for(input.as_of);
        let mut trace = TraceBuilder::new();
        if ruleset.fallback_applied {
            trace.warn(
                "REGION_FALLBACK",
                format!(
                    "no rule set for region {:?}, the {} rules were applied",
                    input.region, ruleset.region
                ),
                Severity::Info,
            );
        }

        let obligor_adjusted = self.adjusted(
            &input.obligor_income,
            input.obligor_housing_benefit,
            input,
        );
        let obligee_adjusted = self.adjusted(
            &input.obligee_income,
            input.obligee_housing_benefit,
            input,
        );
        trace.step(
            "Adjusted incomes",
            "net - work expense allowance + housing benefit, floored at zero",
            json!({
                "obligor_net": input.obligor_income.net_monthly,
                "obligor_housing_benefit": input.obligor_housing_benefit,
                "obligee_net": input.obligee_income.net_monthly,
                "obligee_housing_benefit": input.obligee_housing_benefit,
            }),
            json!({
                "obligor": obligor_adjusted,
                "obligee": obligee_adjusted,
            }),
            None,
        );

        let deduction = input.child_support_deduction.max(Decimal::ZERO);
        let after_child_support = (obligor_adjusted - deduction).max(Decimal::ZERO);
        trace.step(
            "Child support priority deduction",
            "obligor income - child support owed, floored at zero",
            json!({
                "obligor_adjusted": obligor_adjusted,
                "child_support_deduction": deduction,
            }),
            json!(after_child_support),
            None,
        );

        let fraction = self.repo.earner_bonus_fraction(&input.region, input.as_of);
        let obligor_bonus = if input.obligor_employed {
            (after_child_support * fraction).round_dp(2)
        } else {
            Decimal::ZERO
        };
        let obligee_bonus = if input.obligee_employed {
            (obligee_adjusted * fraction).round_dp(2)
        } else {
            Decimal::ZERO
        };
        let obligor_counted = after_child_support - obligor_bonus;
        let obligee_counted = obligee_adjusted - obligee_bonus;
        let pool = obligor_counted + obligee_counted;
        let mut target = pool / Decimal::from(2);
        if input.obligee_employed && !input.obligor_employed {
            target += obligee_bonus;
        }
        let target = target.round_dp(2);
        trace.step(
            "Earner bonus and target need",
            "employed parties retain a bonus fraction; target = pooled income / 2",
            json!({
                "bonus_fraction": fraction.round_dp(4),
                "obligor_bonus": obligor_bonus,
                "obligee_bonus": obligee_bonus,
                "pool": pool,
            }),
            json!(target),
            None,
        );

        let obligation = (target - obligee_counted).max(Decimal::ZERO).round_dp(2);
        trace.step(
            "Support obligation",
            "target need - obligee counted income, floored at zero",
            json!({
                "target": target,
                "obligee_counted": obligee_counted,
            }),
            json!(obligation),
            None,
        );

        let threshold = self.repo.minimum_retention(
            &input.region,
            RetentionClass::Spouse,
            input.obligor_employed,
            input.as_of,
        );
        let available = (after_child_support - threshold).max(Decimal::ZERO);
        let feasible = obligation <= available;
        let final_obligation = if feasible { obligation } else { available };
        if !feasible {
            trace.warn(
                "RETENTION_FLOOR",
                format!(
                    "the obligation of {obligation} exceeds the {available} available above the minimum retention"
                ),
                Severity::Warning,
            );
        }
        trace.step(
            "Minimum retention check",
            "payable is capped at obligor income - minimum retention",
            json!({
                "obligation": obligation,
                "after_child_support": after_child_support,
                "minimum_retention": threshold,
            }),
            json!({
                "available": available,
                "final_obligation": final_obligation,
            }),
            None,
        );

        let outputs = json!({
            "target_need": target,
            "obligation": obligation,
            "final_obligation": final_obligation,
            "obligor_adjusted": obligor_adjusted,
            "obligee_adjusted": obligee_adjusted,
            "obligor_after_child_support": after_child_support,
            "minimum_retention": threshold,
            "feasible": feasible,
        });
        let (steps, warnings) = trace.finish();
        let inputs = serde_json::to_value(input).map_err(|e| EngineError::InvalidInput {
            field: "input".to_string(),
            message: e.to_string(),
        })?;
        Ok(CalculationResult::new(
            input.kind.calculation_kind(),
            inputs,
            outputs,
            steps,
            ruleset,
            table.effective_date,
            warnings,
        ))
    }

    fn adjusted(
        &self,
        income: &Income,
        housing_benefit: Decimal,
        input: &SpousalSupportInput,
    ) -> Decimal {
        let allowance = self.repo.work_expense_allowance(
            income.net_monthly,
            &input.region,
            income.work_expenses,
            input.as_of,
        );
        (income.net_monthly - allowance + housing_benefit)
            .max(Decimal::ZERO)
            .round_dp(2)
    }
}
