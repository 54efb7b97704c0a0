//! The terminal calculation artifact.
//!
//! This module contains the [`CalculationResult`] type returned by every
//! calculator: final figures, the full step trace, the identity of the rule
//! set that was applied, and any warnings, bound together so the computation
//! stays reproducible and legally defensible after future table updates.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::config::RuleSetInfo;

use super::trace::{CalculationStep, CalculationWarning, Severity};

/// The kind of calculation a result was produced by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CalculationKind {
    /// Child support under the progressive income-band table.
    ChildSupport,
    /// Spousal support during separation.
    SeparationSupport,
    /// Spousal support after the marriage is dissolved.
    PostMaritalSupport,
    /// Marital-property gain equalization.
    PropertyEqualization,
    /// Statutory attorney fee schedule.
    FeeSchedule,
}

/// The complete, immutable result of one calculation invocation.
///
/// Constructed once per invocation via [`CalculationResult::new`]; the
/// `calculation_id` and `calculated_at` fields are per-invocation metadata,
/// everything else is a deterministic function of the input and the rule set.
///
/// # Example
///
/// ```
/// use support_engine::models::{CalculationKind, CalculationResult};
/// use support_engine::config::RuleSetRepository;
/// use chrono::NaiveDate;
/// use serde_json::json;
///
/// let repo = RuleSetRepository::builtin();
/// let ruleset = repo.resolve("schleswig", NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
/// let result = CalculationResult::new(
///     CalculationKind::FeeSchedule,
///     json!({"claim_value": "10000"}),
///     json!({"base_fee": "614"}),
///     vec![],
///     ruleset,
///     NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
///     vec![],
/// );
/// assert!(!result.has_warnings());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationResult {
    /// Unique identifier for this calculation.
    pub calculation_id: Uuid,
    /// The kind of calculation performed.
    pub kind: CalculationKind,
    /// Snapshot of the original input values.
    pub inputs: Value,
    /// The final output mapping.
    pub outputs: Value,
    /// The ordered step trace.
    pub steps: Vec<CalculationStep>,
    /// The rule set that was resolved and applied.
    pub ruleset: RuleSetInfo,
    /// Effective date of the statutory reference table used.
    pub table_effective: NaiveDate,
    /// Warnings raised during calculation.
    pub warnings: Vec<CalculationWarning>,
    /// When the calculation was performed.
    pub calculated_at: DateTime<Utc>,
}

impl CalculationResult {
    /// Creates a result, stamping it with a fresh id and the current time.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        kind: CalculationKind,
        inputs: Value,
        outputs: Value,
        steps: Vec<CalculationStep>,
        ruleset: RuleSetInfo,
        table_effective: NaiveDate,
        warnings: Vec<CalculationWarning>,
    ) -> Self {
        Self {
            calculation_id: Uuid::new_v4(),
            kind,
            inputs,
            outputs,
            steps,
            ruleset,
            table_effective,
            warnings,
            calculated_at: Utc::now(),
        }
    }

    /// Returns true if any warning is attached.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Returns true if any warning has error severity.
    pub fn has_fatal_error(&self) -> bool {
        self.warnings.iter().any(|w| w.severity == Severity::Error)
    }

    /// Serializes the result to a nested JSON value with ISO-8601 dates.
    ///
    /// Repeating a calculation on the same inputs and rule set yields an
    /// identical value except for `calculation_id` and `calculated_at`,
    /// which are stamped per invocation. Strip those two fields before
    /// comparing or memoizing results.
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Serializes the result to a JSON string for persistence or transmission.
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "null".to_string())
    }
}
