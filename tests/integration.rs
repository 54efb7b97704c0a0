//! End-to-end scenarios for the Support Calculation Engine.
//!
//! This suite runs each calculator against realistic case files and checks:
//! - Child support for a single child and for a shortfall household
//! - Band adjustment policies
//! - Spousal support for separation and post-marital claims
//! - Property equalization with indexation and privileged acquisitions
//! - Fee schedule itemization
//! - Determinism and serialization round-trips of results

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;
use std::str::FromStr;

use support_engine::calculation::{
    BandAdjustmentPolicy, ChildSupportCalculator, ChildSupportInput, EqualizationCalculator,
    EqualizationInput, FeeScheduleCalculator, FeeScheduleInput, SpousalSupportCalculator,
    SpousalSupportInput, SupportKind,
};
use support_engine::config::RuleSetRepository;
use support_engine::models::{
    AssetCategory, AssetPosition, CalculationKind, CalculationResult, Custodian, Dependent,
    Income, Party,
};

// =============================================================================
// Test Helpers
// =============================================================================

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn out_decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

fn as_of() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 1).unwrap()
}

fn child(name: &str, year: i32, month: u32, day: u32) -> Dependent {
    Dependent {
        name: name.to_string(),
        birth_date: NaiveDate::from_ymd_opt(year, month, day).unwrap(),
        custodian: Custodian::OtherParent,
        own_income: Decimal::ZERO,
        privileged: true,
        in_education: false,
    }
}

fn child_support_input(net: &str, gross: &str, dependents: Vec<Dependent>) -> ChildSupportInput {
    ChildSupportInput {
        income: Income::new(decimal(gross), decimal(net)),
        dependents,
        additional_dependents: 0,
        region: "schleswig".to_string(),
        as_of: as_of(),
        payor_employed: true,
        band_adjustment: BandAdjustmentPolicy::default(),
    }
}

fn account(value: &str, owner: Party) -> AssetPosition {
    AssetPosition {
        description: "account".to_string(),
        category: AssetCategory::Account,
        value: decimal(value),
        owner,
        valuation_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        privileged: false,
        liability: Decimal::ZERO,
    }
}

/// Strips per-invocation metadata so two runs can be compared field by field.
fn comparable(result: &CalculationResult) -> Value {
    let mut value = result.to_value();
    let map = value.as_object_mut().unwrap();
    map.remove("calculation_id");
    map.remove("calculated_at");
    value
}

// =============================================================================
// Child Support
// =============================================================================

#[test]
fn single_earner_with_one_child() {
    let repo = RuleSetRepository::builtin();
    let calc = ChildSupportCalculator::new(&repo);
    let result = calc
        .calculate(&child_support_input(
            "3200",
            "4500",
            vec![child("Lena", 2018, 3, 10)],
        ))
        .unwrap();

    assert_eq!(result.kind, CalculationKind::ChildSupport);
    assert_eq!(out_decimal(&result.outputs["adjusted_net"]), decimal("3050"));
    assert_eq!(result.outputs["band"], serde_json::json!(4));
    assert_eq!(out_decimal(&result.outputs["total"]), decimal("510.50"));
    assert!(!result.has_warnings());
    assert_eq!(
        result.table_effective,
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap()
    );
}

#[test]
fn legacy_band_policy_reproduces_the_single_obligation_shift() {
    let repo = RuleSetRepository::builtin();
    let calc = ChildSupportCalculator::new(&repo);
    let mut input = child_support_input("3200", "4500", vec![child("Paul", 2012, 1, 20)]);
    input.band_adjustment = BandAdjustmentPolicy::LegacySymmetric;
    let result = calc.calculate(&input).unwrap();

    // the adjusted band 5 amount for a 13 year old is 779
    assert_eq!(result.outputs["band"], serde_json::json!(5));
    let dependents = result.outputs["dependents"].as_array().unwrap();
    assert_eq!(out_decimal(&dependents[0]["table_amount"]), decimal("779"));
    assert_eq!(out_decimal(&result.outputs["total"]), decimal("651.50"));
}

#[test]
fn low_income_household_is_prorated() {
    let repo = RuleSetRepository::builtin();
    let calc = ChildSupportCalculator::new(&repo);
    let result = calc
        .calculate(&child_support_input(
            "1600",
            "2200",
            vec![
                child("Mia", 2018, 3, 1),
                child("Tom", 2015, 3, 1),
                child("Ben", 2012, 3, 1),
            ],
        ))
        .unwrap();

    assert_eq!(result.outputs["shortfall"], serde_json::json!(true));
    assert!(result.warnings.iter().any(|w| w.code == "SHORTFALL"));

    // the prorated total stays within the pool above the retention threshold
    let pool = out_decimal(&result.outputs["adjusted_net"]) - decimal("1450");
    let total = out_decimal(&result.outputs["total"]);
    assert!(total <= pool);
    assert!(total > Decimal::ZERO);

    // every share is a whole currency unit
    for dependent in result.outputs["dependents"].as_array().unwrap() {
        let share = out_decimal(&dependent["shortfall_amount"]);
        assert_eq!(share, share.floor());
    }
}

#[test]
fn trace_steps_document_each_stage() {
    let repo = RuleSetRepository::builtin();
    let calc = ChildSupportCalculator::new(&repo);
    let result = calc
        .calculate(&child_support_input(
            "3200",
            "4500",
            vec![child("Lena", 2018, 3, 10)],
        ))
        .unwrap();

    let labels: Vec<&str> = result.steps.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(
        labels,
        vec![
            "Adjusted net income",
            "Income band",
            "Obligation count adjustment",
            "Support for Lena",
            "Ability-to-pay check",
        ]
    );
    for (i, step) in result.steps.iter().enumerate() {
        assert_eq!(step.step_number, (i + 1) as u32);
        assert!(!step.formula.is_empty());
    }
}

// =============================================================================
// Spousal Support
// =============================================================================

#[test]
fn separation_support_between_unequal_earners() {
    let repo = RuleSetRepository::builtin();
    let calc = SpousalSupportCalculator::new(&repo);
    let input = SpousalSupportInput {
        obligor_income: Income::new(decimal("4000"), decimal("4000")),
        obligee_income: Income::new(decimal("2000"), decimal("2000")),
        obligor_employed: true,
        obligee_employed: true,
        obligor_housing_benefit: Decimal::ZERO,
        obligee_housing_benefit: Decimal::ZERO,
        child_support_deduction: Decimal::ZERO,
        kind: SupportKind::Separation,
        region: "schleswig".to_string(),
        as_of: as_of(),
    };
    let result = calc.calculate(&input).unwrap();

    assert_eq!(result.kind, CalculationKind::SeparationSupport);
    assert_eq!(
        out_decimal(&result.outputs["final_obligation"]),
        decimal("835.71")
    );
    assert_eq!(result.outputs["feasible"], serde_json::json!(true));
}

#[test]
fn child_support_takes_priority_over_spousal_support() {
    let repo = RuleSetRepository::builtin();
    let calc = SpousalSupportCalculator::new(&repo);
    let input = SpousalSupportInput {
        obligor_income: Income::new(decimal("4000"), decimal("4000")),
        obligee_income: Income::new(Decimal::ZERO, Decimal::ZERO),
        obligor_employed: true,
        obligee_employed: false,
        obligor_housing_benefit: Decimal::ZERO,
        obligee_housing_benefit: Decimal::ZERO,
        child_support_deduction: decimal("600"),
        kind: SupportKind::PostMarital,
        region: "schleswig".to_string(),
        as_of: as_of(),
    };
    let result = calc.calculate(&input).unwrap();

    assert_eq!(result.kind, CalculationKind::PostMaritalSupport);
    assert_eq!(
        out_decimal(&result.outputs["obligor_after_child_support"]),
        decimal("3250")
    );
    assert_eq!(
        out_decimal(&result.outputs["final_obligation"]),
        decimal("1392.86")
    );
}

// =============================================================================
// Property Equalization
// =============================================================================

#[test]
fn equal_gains_produce_a_zero_claim() {
    let repo = RuleSetRepository::builtin();
    let calc = EqualizationCalculator::new(&repo);
    let input = EqualizationInput {
        marriage_date: NaiveDate::from_ymd_opt(2015, 6, 12).unwrap(),
        cutoff_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        start_a: vec![],
        end_a: vec![account("50000", Party::A)],
        start_b: vec![],
        end_b: vec![account("50000", Party::B)],
        index_at_marriage: None,
        index_at_cutoff: None,
    };
    let result = calc.calculate(&input).unwrap();

    assert_eq!(result.kind, CalculationKind::PropertyEqualization);
    assert_eq!(out_decimal(&result.outputs["payment"]), Decimal::ZERO);
    assert_eq!(result.outputs["payer"], Value::Null);
    assert_eq!(result.outputs["payee"], Value::Null);
}

#[test]
fn indexation_and_privileged_acquisitions_reduce_the_gain() {
    let repo = RuleSetRepository::builtin();
    let calc = EqualizationCalculator::new(&repo);
    let mut inheritance = account("40000", Party::A);
    inheritance.privileged = true;
    let input = EqualizationInput {
        marriage_date: NaiveDate::from_ymd_opt(2015, 6, 12).unwrap(),
        cutoff_date: NaiveDate::from_ymd_opt(2025, 3, 31).unwrap(),
        start_a: vec![account("10000", Party::A)],
        end_a: vec![account("90000", Party::A), inheritance],
        start_b: vec![],
        end_b: vec![account("20000", Party::B)],
        index_at_marriage: Some(decimal("100")),
        index_at_cutoff: Some(decimal("120")),
    };
    let result = calc.calculate(&input).unwrap();

    let party_a = &result.outputs["party_a"];
    assert_eq!(out_decimal(&party_a["indexed_start"]), decimal("12000"));
    assert_eq!(out_decimal(&party_a["privileged_credit"]), decimal("40000"));
    // 130000 end - 12000 indexed - 40000 privileged
    assert_eq!(out_decimal(&party_a["gain"]), decimal("78000"));
    // (78000 - 20000) / 2
    assert_eq!(out_decimal(&result.outputs["payment"]), decimal("29000"));
    assert_eq!(result.outputs["payer"], serde_json::json!("a"));
}

// =============================================================================
// Fee Schedule
// =============================================================================

#[test]
fn contested_matter_fee_is_fully_itemized() {
    let repo = RuleSetRepository::builtin();
    let calc = FeeScheduleCalculator::new(&repo);
    let input = FeeScheduleInput {
        claim_value: decimal("10000"),
        multiplier: decimal("1.3"),
        additional_claimants: 0,
        with_disbursement_allowance: true,
        with_tax: true,
    };
    let result = calc.calculate(&input).unwrap();

    assert_eq!(result.kind, CalculationKind::FeeSchedule);
    assert_eq!(out_decimal(&result.outputs["base_fee"]), decimal("614"));
    assert_eq!(out_decimal(&result.outputs["fee"]), decimal("798.20"));
    assert_eq!(out_decimal(&result.outputs["net_total"]), decimal("818.20"));
    assert_eq!(out_decimal(&result.outputs["tax"]), decimal("155.46"));
    assert_eq!(
        out_decimal(&result.outputs["gross_total"]),
        decimal("973.66")
    );
}

// =============================================================================
// Determinism and Serialization
// =============================================================================

#[test]
fn identical_inputs_yield_identical_results_modulo_metadata() {
    let repo = RuleSetRepository::builtin();
    let calc = ChildSupportCalculator::new(&repo);
    let input = child_support_input(
        "3200",
        "4500",
        vec![child("Lena", 2018, 3, 10), child("Paul", 2012, 1, 20)],
    );
    let first = calc.calculate(&input).unwrap();
    let second = calc.calculate(&input).unwrap();

    assert_ne!(first.calculation_id, second.calculation_id);
    assert_eq!(comparable(&first), comparable(&second));
}

#[test]
fn results_survive_a_serialization_round_trip() {
    let repo = RuleSetRepository::builtin();
    let calc = FeeScheduleCalculator::new(&repo);
    let input = FeeScheduleInput {
        claim_value: decimal("25000"),
        multiplier: decimal("1.3"),
        additional_claimants: 1,
        with_disbursement_allowance: true,
        with_tax: true,
    };
    let result = calc.calculate(&input).unwrap();

    let json = result.to_json();
    let parsed: CalculationResult = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, result);
}

#[test]
fn unknown_region_results_are_marked_and_usable() {
    let repo = RuleSetRepository::builtin();
    let calc = ChildSupportCalculator::new(&repo);
    let mut input = child_support_input("3200", "4500", vec![child("Ida", 2018, 1, 1)]);
    input.region = "nirvana".to_string();
    let result = calc.calculate(&input).unwrap();

    assert!(result.ruleset.fallback_applied);
    assert_eq!(result.ruleset.region, "schleswig");
    assert!(result.warnings.iter().any(|w| w.code == "REGION_FALLBACK"));
    assert!(!result.has_fatal_error());
    assert_eq!(out_decimal(&result.outputs["total"]), decimal("510.50"));
}
