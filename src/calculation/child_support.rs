//! Child support calculation against the statutory support table.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::income_adjustment::adjust_net_income;
use crate::config::{RetentionClass, RuleSetRepository};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AgeBracket, CalculationKind, CalculationResult, Dependent, Income, Severity, TraceBuilder,
};

/// How the income band is shifted for the number of support obligations.
///
/// The guideline table is calibrated for two obligations. Editions differ in
/// how they compensate for other counts, so the rule is selectable per
/// calculation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BandAdjustmentPolicy {
    /// Shift up for one obligation and down for three or more.
    LegacySymmetric,
    /// Shift down only once the regional threshold count is reached.
    #[default]
    ThresholdDownshiftOnly,
}

fn default_true() -> bool {
    true
}

/// Input for a child support calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChildSupportInput {
    /// The paying parent's income.
    pub income: Income,
    /// Children the payment is calculated for.
    pub dependents: Vec<Dependent>,
    /// Further persons entitled to support, e.g. a spouse, counted for the
    /// band adjustment but not paid out of this calculation.
    #[serde(default)]
    pub additional_dependents: u32,
    /// Region whose guideline parameters apply.
    pub region: String,
    /// Date the calculation refers to; ages are computed against it.
    pub as_of: NaiveDate,
    /// Whether the paying parent is employed.
    #[serde(default = "default_true")]
    pub payor_employed: bool,
    /// Band adjustment rule to apply.
    #[serde(default)]
    pub band_adjustment: BandAdjustmentPolicy,
}

impl ChildSupportInput {
    /// Checks structural validity of the input.
    pub fn validate(&self) -> EngineResult<()> {
        for dependent in &self.dependents {
            if dependent.birth_date > self.as_of {
                return Err(EngineError::InvalidInput {
                    field: "dependents".to_string(),
                    message: format!(
                        "{} is born {} which is after the calculation date {}",
                        dependent.name, dependent.birth_date, self.as_of
                    ),
                });
            }
        }
        Ok(())
    }
}

/// Per-child breakdown of the calculated support.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependentAward {
    /// The child's name.
    pub name: String,
    /// Age at the calculation date.
    pub age: u32,
    /// Age bracket of the table column.
    pub bracket: AgeBracket,
    /// Income band the amount was read from.
    pub band: u32,
    /// Tabulated monthly amount before offsets.
    pub table_amount: Decimal,
    /// Offset for the state child benefit.
    pub benefit_offset: Decimal,
    /// Offset for the child's own income.
    pub income_offset: Decimal,
    /// Monthly amount after offsets, before any shortfall proration.
    pub amount: Decimal,
    /// Prorated monthly amount when the obligor cannot cover the full total.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shortfall_amount: Option<Decimal>,
}

impl DependentAward {
    /// The amount actually payable for this child.
    pub fn payable(&self) -> Decimal {
        self.shortfall_amount.unwrap_or(self.amount)
    }
}

/// Calculates child support with a full step trace.
pub struct ChildSupportCalculator<'a> {
    repo: &'a RuleSetRepository,
}

impl<'a> ChildSupportCalculator<'a> {
    /// Creates a calculator over a rule-set repository.
    pub fn new(repo: &'a RuleSetRepository) -> Self {
        Self { repo }
    }

    /// Runs the calculation.
    ///
    /// Fails only on structurally invalid input; economically impossible
    /// values are floored and surfaced as warnings instead.
    pub fn calculate(&self, input: &ChildSupportInput) -> EngineResult<CalculationResult> {
        input.validate()?;
        debug!(
            region = %input.region,
            dependents = input.dependents.len(),
            "calculating child support"
        );

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

        let adjustment = adjust_net_income(&input.income, self.repo, &input.region, input.as_of);
        trace.step(
            "Adjusted net income",
            "net + bonus share - work expense allowance - capped deductions",
            json!({
                "net": adjustment.net,
                "bonus_share": adjustment.bonus_share,
                "work_expense_allowance": adjustment.work_expense_allowance,
                "retirement_allowed": adjustment.retirement_allowed,
                "other_deductions": adjustment.other_deductions,
            }),
            json!(adjustment.adjusted),
            None,
        );

        let band = self.repo.income_band_for(adjustment.adjusted, input.as_of);
        trace.step(
            "Income band",
            "band whose range contains the adjusted net income",
            json!({ "adjusted_net": adjustment.adjusted }),
            json!(band),
            Some(format!(
                "table effective {}",
                table.effective_date
            )),
        );

        let obligation_count = input.dependents.len() as u32 + input.additional_dependents;
        let applied_band = self.adjusted_band(band, obligation_count, input, table.top_band());
        let note = if applied_band == band {
            "no adjustment".to_string()
        } else {
            format!("band {band} adjusted to {applied_band}")
        };
        trace.step(
            "Obligation count adjustment",
            match input.band_adjustment {
                BandAdjustmentPolicy::LegacySymmetric => {
                    "one obligation shifts up, three or more shift down"
                }
                BandAdjustmentPolicy::ThresholdDownshiftOnly => {
                    "shift down once the regional obligation threshold is reached"
                }
            },
            json!({
                "obligations": obligation_count,
                "band": band,
            }),
            json!(applied_band),
            Some(note),
        );

        let mut awards = Vec::with_capacity(input.dependents.len());
        for dependent in &input.dependents {
            let award = self.award_for(dependent, applied_band, table, input.as_of);
            trace.step(
                &format!("Support for {}", award.name),
                "table amount - benefit offset - own income offset",
                json!({
                    "age": award.age,
                    "bracket": award.bracket,
                    "table_amount": award.table_amount,
                    "benefit_offset": award.benefit_offset,
                    "income_offset": award.income_offset,
                }),
                json!(award.amount),
                None,
            );
            awards.push(award);
        }

        let total: Decimal = awards.iter().map(|a| a.amount).sum();
        let retention_class = if input
            .dependents
            .iter()
            .any(|d| d.is_minor(input.as_of) || d.is_privileged_adult(input.as_of))
        {
            RetentionClass::MinorChild
        } else {
            RetentionClass::AdultChild
        };
        let threshold = self.repo.minimum_retention(
            &input.region,
            retention_class,
            input.payor_employed,
            input.as_of,
        );
        let available = adjustment.adjusted - threshold;
        let shortfall = !awards.is_empty() && total > available;
        trace.step(
            "Ability-to-pay check",
            "adjusted net income - minimum retention must cover the total",
            json!({
                "adjusted_net": adjustment.adjusted,
                "minimum_retention": threshold,
                "total": total,
            }),
            json!({
                "available": available.round_dp(2),
                "shortfall": shortfall,
            }),
            None,
        );

        let payable_total = if shortfall {
            trace.warn(
                "SHORTFALL",
                "the obligor cannot cover the full support total, amounts are prorated by base need"
                    .to_string(),
                Severity::Warning,
            );
            self.distribute_shortfall(&mut awards, &mut trace, adjustment.adjusted, threshold, table)
        } else {
            total
        };

        let outputs = json!({
            "adjusted_net": adjustment.adjusted,
            "band": applied_band,
            "minimum_retention": threshold,
            "total": payable_total.round_dp(2),
            "shortfall": shortfall,
            "dependents": awards,
        });
        let (steps, warnings) = trace.finish();
        let inputs = serde_json::to_value(input).map_err(|e| EngineError::InvalidInput {
            field: "input".to_string(),
            message: e.to_string(),
        })?;
        Ok(CalculationResult::new(
            CalculationKind::ChildSupport,
            inputs,
            outputs,
            steps,
            ruleset,
            table.effective_date,
            warnings,
        ))
    }

    fn adjusted_band(
        &self,
        band: u32,
        obligations: u32,
        input: &ChildSupportInput,
        top: u32,
    ) -> u32 {
        match input.band_adjustment {
            BandAdjustmentPolicy::LegacySymmetric => {
                let shifted = match obligations {
                    0 | 2 => band as i64,
                    1 => band as i64 + 1,
                    n => band as i64 - (n as i64 - 2),
                };
                shifted.clamp(1, top as i64) as u32
            }
            BandAdjustmentPolicy::ThresholdDownshiftOnly => {
                let parameters = self.repo.resolve(&input.region, input.as_of).parameters;
                let rule = &parameters.band_adjustment;
                if obligations >= rule.downshift_at {
                    band.saturating_sub(rule.steps).max(1)
                } else {
                    band
                }
            }
        }
    }

    fn award_for(
        &self,
        dependent: &Dependent,
        band: u32,
        table: &crate::config::SupportTable,
        as_of: NaiveDate,
    ) -> DependentAward {
        let bracket = dependent.age_bracket(as_of);
        let table_amount = table.amount(band, bracket);
        let minor_like = dependent.is_minor(as_of);
        let two = Decimal::from(2);
        let (benefit_offset, income_offset) = if minor_like {
            (table.child_benefit / two, dependent.own_income / two)
        } else {
            (
                table.child_benefit,
                (dependent.own_income - table.adult_income_disregard).max(Decimal::ZERO),
            )
        };
        let amount = (table_amount - benefit_offset - income_offset)
            .max(Decimal::ZERO)
            .round_dp(2);
        DependentAward {
            name: dependent.name.clone(),
            age: dependent.age(as_of),
            bracket,
            band,
            table_amount,
            benefit_offset,
            income_offset,
            amount,
            shortfall_amount: None,
        }
    }

    /// Prorates the available pool over the base needs of the dependents.
    ///
    /// Base need is the bottom-band table amount minus the benefit offset,
    /// so the minimum need of every child is weighted equally regardless of
    /// the obligor's band. Shares are rounded down to whole currency units.
    fn distribute_shortfall(
        &self,
        awards: &mut [DependentAward],
        trace: &mut TraceBuilder,
        adjusted: Decimal,
        threshold: Decimal,
        table: &crate::config::SupportTable,
    ) -> Decimal {
        let pool = (adjusted - threshold).max(Decimal::ZERO);
        let needs: Vec<Decimal> = awards
            .iter()
            .map(|a| {
                (table.amount(1, a.bracket) - a.benefit_offset).max(Decimal::ZERO)
            })
            .collect();
        let need_total: Decimal = needs.iter().copied().sum();
        let mut payable_total = Decimal::ZERO;
        for (award, need) in awards.iter_mut().zip(&needs) {
            let share = if need_total > Decimal::ZERO {
                (pool * *need / need_total).floor()
            } else {
                Decimal::ZERO
            };
            award.shortfall_amount = Some(share);
            payable_total += share;
        }
        trace.step(
            "Proportional distribution",
            "share = pool * base need / total base need, rounded down",
            json!({
                "pool": pool,
                "base_needs": needs,
                "total_base_need": need_total,
            }),
            json!(awards
                .iter()
                .map(|a| json!({ "name": a.name, "amount": a.payable() }))
                .collect::<Vec<_>>()),
            None,
        );
        payable_total
    }
}
