//! Statutory attorney fee calculation over the fee table.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::{RuleSetRepository, FALLBACK_REGION};
use crate::error::{EngineError, EngineResult};
use crate::models::{CalculationKind, CalculationResult, TraceBuilder};

fn default_multiplier() -> Decimal {
    Decimal::new(13, 1)
}

fn default_true() -> bool {
    true
}

/// Input for a fee schedule calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeScheduleInput {
    /// Claim value the fee is based on.
    pub claim_value: Decimal,
    /// Fee rate multiplier, 1.3 for the standard contested matter.
    #[serde(default = "default_multiplier")]
    pub multiplier: Decimal,
    /// Claimants beyond the first; each adds a 0.3 surcharge.
    #[serde(default)]
    pub additional_claimants: u32,
    /// Whether the flat disbursement allowance is added.
    #[serde(default = "default_true")]
    pub with_disbursement_allowance: bool,
    /// Whether value-added tax is added.
    #[serde(default = "default_true")]
    pub with_tax: bool,
}

/// Calculates attorney fees with a full step trace.
pub struct FeeScheduleCalculator<'a> {
    repo: &'a RuleSetRepository,
}

impl<'a> FeeScheduleCalculator<'a> {
    /// Creates a calculator over a rule-set repository.
    pub fn new(repo: &'a RuleSetRepository) -> Self {
        Self { repo }
    }

    /// Runs the calculation.
    pub fn calculate(&self, input: &FeeScheduleInput) -> EngineResult<CalculationResult> {
        debug!(claim_value = %input.claim_value, "calculating fee schedule");

        let fee_table = self.repo.fee_table();
        let ruleset = self.repo.resolve(FALLBACK_REGION, fee_table.effective_date);
        let mut trace = TraceBuilder::new();

        let claim = input.claim_value.max(Decimal::ZERO);
        let base_fee = fee_table.base_fee_for(claim);
        trace.step(
            "Base fee",
            "single statutory fee for the claim value",
            json!({ "claim_value": claim }),
            json!(base_fee),
            None,
        );

        let multiplied = (base_fee * input.multiplier).round_dp(2);
        trace.step(
            "Fee rate",
            "base fee * multiplier",
            json!({
                "base_fee": base_fee,
                "multiplier": input.multiplier,
            }),
            json!(multiplied),
            None,
        );

        let surcharge_rate = Decimal::new(3, 1);
        let uncapped =
            multiplied * surcharge_rate * Decimal::from(input.additional_claimants);
        let cap = multiplied * Decimal::from(2);
        let surcharge = uncapped.min(cap).round_dp(2);
        trace.step(
            "Claimant surcharge",
            "0.3 of the fee per additional claimant, at most twice the fee",
            json!({
                "additional_claimants": input.additional_claimants,
                "fee": multiplied,
            }),
            json!(surcharge),
            None,
        );

        let allowance = if input.with_disbursement_allowance {
            fee_table.disbursement_allowance
        } else {
            Decimal::ZERO
        };
        trace.step(
            "Disbursement allowance",
            "flat allowance for post and telecommunication",
            json!({ "applied": input.with_disbursement_allowance }),
            json!(allowance),
            None,
        );

        let net_total = multiplied + surcharge + allowance;
        trace.step(
            "Net total",
            "fee + surcharge + allowance",
            json!({
                "fee": multiplied,
                "surcharge": surcharge,
                "allowance": allowance,
            }),
            json!(net_total),
            None,
        );

        let tax = if input.with_tax {
            (net_total * fee_table.tax_rate).round_dp(2)
        } else {
            Decimal::ZERO
        };
        let gross_total = net_total + tax;
        trace.step(
            "Value-added tax",
            "net total * tax rate",
            json!({
                "net_total": net_total,
                "tax_rate": fee_table.tax_rate,
            }),
            json!(tax),
            None,
        );
        trace.step(
            "Gross total",
            "net total + tax",
            json!({
                "net_total": net_total,
                "tax": tax,
            }),
            json!(gross_total),
            None,
        );

        let outputs = json!({
            "base_fee": base_fee,
            "fee": multiplied,
            "surcharge": surcharge,
            "disbursement_allowance": allowance,
            "net_total": net_total,
            "tax": tax,
            "gross_total": gross_total,
        });
        let (steps, warnings) = trace.finish();
        let inputs = serde_json::to_value(input).map_err(|e| EngineError::InvalidInput {
            field: "input".to_string(),
            message: e.to_string(),
        })?;
        Ok(CalculationResult::new(
            CalculationKind::FeeSchedule,
            inputs,
            outputs,
            steps,
            ruleset,
            fee_table.effective_date,
            warnings,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn out_dec(value: &serde_json::Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    fn input(claim: &str) -> FeeScheduleInput {
        FeeScheduleInput {
            claim_value: dec(claim),
            multiplier: default_multiplier(),
            additional_claimants: 0,
            with_disbursement_allowance: true,
            with_tax: true,
        }
    }

    #[test]
    fn standard_contested_matter() {
        let repo = RuleSetRepository::builtin();
        let calc = FeeScheduleCalculator::new(&repo);
        let result = calc.calculate(&input("10000")).unwrap();
        let outputs = &result.outputs;
        assert_eq!(out_dec(&outputs["base_fee"]), dec("614"));
        assert_eq!(out_dec(&outputs["fee"]), dec("798.20"));
        assert_eq!(out_dec(&outputs["net_total"]), dec("818.20"));
        assert_eq!(out_dec(&outputs["tax"]), dec("155.46"));
        assert_eq!(out_dec(&outputs["gross_total"]), dec("973.66"));
    }

    #[test]
    fn surcharge_per_additional_claimant() {
        let repo = RuleSetRepository::builtin();
        let calc = FeeScheduleCalculator::new(&repo);
        let mut req = input("10000");
        req.additional_claimants = 2;
        let result = calc.calculate(&req).unwrap();
        // 2 * 0.3 * 798.20
        assert_eq!(out_dec(&result.outputs["surcharge"]), dec("478.92"));
    }

    #[test]
    fn surcharge_is_capped_at_twice_the_fee() {
        let repo = RuleSetRepository::builtin();
        let calc = FeeScheduleCalculator::new(&repo);
        let mut req = input("10000");
        req.additional_claimants = 10;
        let result = calc.calculate(&req).unwrap();
        assert_eq!(
            out_dec(&result.outputs["surcharge"]),
            out_dec(&result.outputs["fee"]) * dec("2")
        );
    }

    #[test]
    fn allowance_and_tax_can_be_disabled() {
        let repo = RuleSetRepository::builtin();
        let calc = FeeScheduleCalculator::new(&repo);
        let mut req = input("10000");
        req.with_disbursement_allowance = false;
        req.with_tax = false;
        let result = calc.calculate(&req).unwrap();
        assert_eq!(out_dec(&result.outputs["tax"]), Decimal::ZERO);
        assert_eq!(
            out_dec(&result.outputs["gross_total"]),
            out_dec(&result.outputs["fee"])
        );
    }

    #[test]
    fn above_table_claims_extrapolate() {
        let repo = RuleSetRepository::builtin();
        let calc = FeeScheduleCalculator::new(&repo);
        let result = calc.calculate(&input("600000")).unwrap();
        // 3629 + 2 * 165 full steps of 50000
        assert_eq!(out_dec(&result.outputs["base_fee"]), dec("3959"));
    }

    #[test]
    fn negative_claim_values_clamp_to_the_lowest_row() {
        let repo = RuleSetRepository::builtin();
        let calc = FeeScheduleCalculator::new(&repo);
        let result = calc.calculate(&input("-500")).unwrap();
        assert_eq!(out_dec(&result.outputs["base_fee"]), dec("49"));
    }

    #[test]
    fn defaults_apply_when_fields_are_omitted() {
        let parsed: FeeScheduleInput =
            serde_json::from_str(r#"{ "claim_value": "5000" }"#).unwrap();
        assert_eq!(parsed.multiplier, dec("1.3"));
        assert_eq!(parsed.additional_claimants, 0);
        assert!(parsed.with_disbursement_allowance);
        assert!(parsed.with_tax);
    }
}
