//! Marital property equalization between the two spouses.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use crate::config::{RuleSetRepository, FALLBACK_REGION};
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AssetPosition, CalculationKind, CalculationResult, Party, Severity, TraceBuilder,
};

/// Input for a property equalization calculation.
///
/// Asset positions are grouped by party and by valuation point (start of the
/// marriage versus the cutoff date). Equalization is governed by federal
/// statute, so no region is part of the input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EqualizationInput {
    /// Date of the marriage.
    pub marriage_date: NaiveDate,
    /// Cutoff date of the equalization claim.
    pub cutoff_date: NaiveDate,
    /// Party A's assets at the start of the marriage.
    pub start_a: Vec<AssetPosition>,
    /// Party A's assets at the cutoff date.
    pub end_a: Vec<AssetPosition>,
    /// Party B's assets at the start of the marriage.
    pub start_b: Vec<AssetPosition>,
    /// Party B's assets at the cutoff date.
    pub end_b: Vec<AssetPosition>,
    /// Overrides the marriage-year price index when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_at_marriage: Option<Decimal>,
    /// Overrides the cutoff-year price index when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_at_cutoff: Option<Decimal>,
}

impl EqualizationInput {
    /// Checks structural validity of the input.
    pub fn validate(&self) -> EngineResult<()> {
        if self.cutoff_date < self.marriage_date {
            return Err(EngineError::InvalidInput {
                field: "cutoff_date".to_string(),
                message: format!(
                    "cutoff date {} precedes the marriage date {}",
                    self.cutoff_date, self.marriage_date
                ),
            });
        }
        for (field, value) in [
            ("index_at_marriage", self.index_at_marriage),
            ("index_at_cutoff", self.index_at_cutoff),
        ] {
            if let Some(index) = value {
                if index <= Decimal::ZERO {
                    return Err(EngineError::InvalidInput {
                        field: field.to_string(),
                        message: format!("price index override must be positive, got {index}"),
                    });
                }
            }
        }
        Ok(())
    }
}

/// Per-party figures of an equalization calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartyOutcome {
    /// Net start position before indexation.
    pub raw_start: Decimal,
    /// Start position after inflation indexation, never negative.
    pub indexed_start: Decimal,
    /// Privileged acquisitions credited to the start position at nominal value.
    pub privileged_credit: Decimal,
    /// Net end position, not indexed.
    pub end: Decimal,
    /// Marital gain, never negative.
    pub gain: Decimal,
}

/// Calculates the equalization claim with a full step trace.
pub struct EqualizationCalculator<'a> {
    repo: &'a RuleSetRepository,
}

impl<'a> EqualizationCalculator<'a> {
    /// Creates a calculator over a rule-set repository.
    pub fn new(repo: &'a RuleSetRepository) -> Self {
        Self { repo }
    }

    /// Runs the calculation.
    pub fn calculate(&self, input: &EqualizationInput) -> EngineResult<CalculationResult> {
        input.validate()?;
        debug!(
            marriage = %input.marriage_date,
            cutoff = %input.cutoff_date,
            "calculating property equalization"
        );

        let ruleset = self.repo.resolve(FALLBACK_REGION, input.cutoff_date);
        let table = self.repo.table_for(input.cutoff_date);
        let mut trace = TraceBuilder::new();

        let index_marriage = input
            .index_at_marriage
            .unwrap_or_else(|| self.repo.price_index_for(input.marriage_date.year()));
        let index_cutoff = input
            .index_at_cutoff
            .unwrap_or_else(|| self.repo.price_index_for(input.cutoff_date.year()));
        let factor = (index_cutoff / index_marriage).round_dp(6);
        trace.step(
            "Price index factor",
            "index at cutoff year / index at marriage year",
            json!({
                "marriage_year": input.marriage_date.year(),
                "index_at_marriage": index_marriage,
                "cutoff_year": input.cutoff_date.year(),
                "index_at_cutoff": index_cutoff,
            }),
            json!(factor),
            None,
        );

        let outcome_a = self.party_outcome(&input.start_a, &input.end_a, factor);
        let outcome_b = self.party_outcome(&input.start_b, &input.end_b, factor);
        for (party, outcome) in [(Party::A, &outcome_a), (Party::B, &outcome_b)] {
            trace.step(
                &format!("Gain of party {party:?}"),
                "end - indexed start - privileged credit, floored at zero",
                json!({
                    "raw_start": outcome.raw_start,
                    "indexed_start": outcome.indexed_start,
                    "privileged_credit": outcome.privileged_credit,
                    "end": outcome.end,
                }),
                json!(outcome.gain),
                None,
            );
            if outcome.end < Decimal::ZERO {
                trace.warn(
                    "NEGATIVE_END_WORTH",
                    format!("party {party:?} ends the marriage with negative net worth"),
                    Severity::Warning,
                );
            }
        }

        let difference = outcome_a.gain - outcome_b.gain;
        let payment = (difference.abs() / Decimal::from(2)).round_dp(2);
        let (payer, payee) = if difference > Decimal::ZERO {
            (Some(Party::A), Some(Party::B))
        } else if difference < Decimal::ZERO {
            (Some(Party::B), Some(Party::A))
        } else {
            (None, None)
        };
        trace.step(
            "Equalization claim",
            "half the difference between the gains, owed by the higher-gain party",
            json!({
                "gain_a": outcome_a.gain,
                "gain_b": outcome_b.gain,
            }),
            json!({
                "payment": payment,
                "payer": payer,
            }),
            None,
        );

        let outputs = json!({
            "party_a": outcome_a,
            "party_b": outcome_b,
            "index_factor": factor,
            "payment": payment,
            "payer": payer,
            "payee": payee,
        });
        let (steps, warnings) = trace.finish();
        let inputs = serde_json::to_value(input).map_err(|e| EngineError::InvalidInput {
            field: "input".to_string(),
            message: e.to_string(),
        })?;
        Ok(CalculationResult::new(
            CalculationKind::PropertyEqualization,
            inputs,
            outputs,
            steps,
            ruleset,
            table.effective_date,
            warnings,
        ))
    }

    fn party_outcome(
        &self,
        start: &[AssetPosition],
        end: &[AssetPosition],
        factor: Decimal,
    ) -> PartyOutcome {
        let raw_start: Decimal = start.iter().map(AssetPosition::net_value).sum();
        let indexed_start = (raw_start * factor).max(Decimal::ZERO).round_dp(2);
        let privileged_credit: Decimal = end
            .iter()
            .filter(|p| p.privileged)
            .map(AssetPosition::net_value)
            .sum();
        let end_worth: Decimal = end.iter().map(AssetPosition::net_value).sum();
        let gain = (end_worth - indexed_start - privileged_credit)
            .max(Decimal::ZERO)
            .round_dp(2);
        PartyOutcome {
            raw_start,
            indexed_start,
            privileged_credit,
            end: end_worth,
            gain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetCategory;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn out_dec(value: &serde_json::Value) -> Decimal {
        value.as_str().unwrap().parse().unwrap()
    }

    fn asset(value: &str, owner: Party) -> AssetPosition {
        AssetPosition {
            description: "account".to_string(),
            category: AssetCategory::Account,
            value: dec(value),
            owner,
            valuation_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            privileged: false,
            liability: Decimal::ZERO,
        }
    }

    fn input() -> EqualizationInput {
        EqualizationInput {
            marriage_date: NaiveDate::from_ymd_opt(2015, 6, 12).unwrap(),
            cutoff_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
            start_a: vec![],
            end_a: vec![],
            start_b: vec![],
            end_b: vec![],
            index_at_marriage: None,
            index_at_cutoff: None,
        }
    }

    #[test]
    fn higher_gain_party_pays_half_the_difference() {
        let repo = RuleSetRepository::builtin();
        let calc = EqualizationCalculator::new(&repo);
        let mut req = input();
        req.end_a = vec![asset("80000", Party::A)];
        req.end_b = vec![asset("20000", Party::B)];
        let result = calc.calculate(&req).unwrap();
        assert_eq!(out_dec(&result.outputs["payment"]), dec("30000"));
        assert_eq!(result.outputs["payer"], serde_json::json!("a"));
        assert_eq!(result.outputs["payee"], serde_json::json!("b"));
    }

    #[test]
    fn equal_gains_mean_no_payment_and_no_payer() {
        let repo = RuleSetRepository::builtin();
        let calc = EqualizationCalculator::new(&repo);
        let mut req = input();
        req.end_a = vec![asset("50000", Party::A)];
        req.end_b = vec![asset("50000", Party::B)];
        let result = calc.calculate(&req).unwrap();
        assert_eq!(out_dec(&result.outputs["payment"]), Decimal::ZERO);
        assert_eq!(result.outputs["payer"], serde_json::Value::Null);
        assert_eq!(result.outputs["payee"], serde_json::Value::Null);
    }

    #[test]
    fn start_position_is_inflation_indexed() {
        let repo = RuleSetRepository::builtin();
        let calc = EqualizationCalculator::new(&repo);
        let mut req = input();
        req.index_at_marriage = Some(dec("100"));
        req.index_at_cutoff = Some(dec("120"));
        req.start_a = vec![asset("10000", Party::A)];
        req.end_a = vec![asset("50000", Party::A)];
        let result = calc.calculate(&req).unwrap();
        let party_a = &result.outputs["party_a"];
        assert_eq!(out_dec(&party_a["indexed_start"]), dec("12000"));
        assert_eq!(out_dec(&party_a["gain"]), dec("38000"));
    }

    #[test]
    fn builtin_index_years_are_used_when_not_overridden() {
        let repo = RuleSetRepository::builtin();
        let calc = EqualizationCalculator::new(&repo);
        let mut req = input();
        req.start_a = vec![asset("9300", Party::A)];
        req.end_a = vec![asset("20000", Party::A)];
        let result = calc.calculate(&req).unwrap();
        // 2015 index 93.0, 2025 index 122.5
        let factor = out_dec(&result.outputs["index_factor"]);
        assert_eq!(factor, (dec("122.5") / dec("93.0")).round_dp(6));
    }

    #[test]
    fn liabilities_reduce_positions_and_losses_floor_at_zero() {
        let repo = RuleSetRepository::builtin();
        let calc = EqualizationCalculator::new(&repo);
        let mut req = input();
        let mut house = asset("200000", Party::A);
        house.liability = dec("230000");
        req.end_a = vec![house];
        req.end_b = vec![asset("10000", Party::B)];
        let result = calc.calculate(&req).unwrap();
        let party_a = &result.outputs["party_a"];
        assert_eq!(out_dec(&party_a["end"]), dec("-30000"));
        assert_eq!(out_dec(&party_a["gain"]), Decimal::ZERO);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.code == "NEGATIVE_END_WORTH"));
        // the solvent party owes half of their own gain
        assert_eq!(out_dec(&result.outputs["payment"]), dec("5000"));
        assert_eq!(result.outputs["payer"], serde_json::json!("b"));
    }

    #[test]
    fn privileged_acquisitions_do_not_count_as_gain() {
        let repo = RuleSetRepository::builtin();
        let calc = EqualizationCalculator::new(&repo);
        let mut req = input();
        let mut inheritance = asset("40000", Party::A);
        inheritance.privileged = true;
        req.end_a = vec![inheritance, asset("30000", Party::A)];
        let result = calc.calculate(&req).unwrap();
        let party_a = &result.outputs["party_a"];
        assert_eq!(out_dec(&party_a["privileged_credit"]), dec("40000"));
        assert_eq!(out_dec(&party_a["gain"]), dec("30000"));
    }

    #[test]
    fn inverted_dates_are_rejected() {
        let repo = RuleSetRepository::builtin();
        let calc = EqualizationCalculator::new(&repo);
        let mut req = input();
        req.cutoff_date = NaiveDate::from_ymd_opt(2014, 1, 1).unwrap();
        let err = calc.calculate(&req).unwrap_err();
        assert!(matches!(err, EngineError::InvalidInput { .. }));
    }

    #[test]
    fn non_positive_index_overrides_are_rejected() {
        let repo = RuleSetRepository::builtin();
        let calc = EqualizationCalculator::new(&repo);

        let mut req = input();
        req.index_at_marriage = Some(Decimal::ZERO);
        let err = calc.calculate(&req).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidInput { ref field, .. } if field == "index_at_marriage"
        ));

        let mut req = input();
        req.index_at_cutoff = Some(dec("-1"));
        let err = calc.calculate(&req).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InvalidInput { ref field, .. } if field == "index_at_cutoff"
        ));
    }
}
