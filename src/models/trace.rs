//! The step trace model shared by all calculators.
//!
//! Every calculation is documented as an ordered sequence of
//! [`CalculationStep`] records plus any [`CalculationWarning`]s raised along
//! the way. Steps are append-only within one invocation and never mutate
//! once appended; the [`TraceBuilder`] owns the numbering so that sequence
//! numbers are strictly increasing starting at 1.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Severity level of a calculation warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory only; no effect on the result.
    Info,
    /// A non-fatal anomaly that changed the result (e.g. shortfall proration).
    Warning,
    /// A fatal anomaly; the result should not be relied on.
    Error,
}

/// A coded, severity-leveled annotation attached to a result when a
/// non-fatal anomaly occurs during calculation.
///
/// # Example
///
/// ```
/// use support_engine::models::{CalculationWarning, Severity};
///
/// let warning = CalculationWarning {
///     code: "SHORTFALL".to_string(),
///     message: "Obligations exceed the distributable amount".to_string(),
///     severity: Severity::Warning,
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationWarning {
    /// A code identifying the type of warning (e.g. "SHORTFALL").
    pub code: String,
    /// A human-readable description of the warning.
    pub message: String,
    /// The severity level.
    pub severity: Severity,
}

/// An ordered, numbered record of one computation stage.
///
/// The formula string is a human-readable description of the rule applied,
/// not an executable expression. Input and result payloads are structured
/// JSON values so a caseworker can reconstruct the figure by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalculationStep {
    /// The sequential step number, starting at 1.
    pub step_number: u32,
    /// Short label naming the computation stage.
    pub label: String,
    /// Human-readable description of the formula applied.
    pub formula: String,
    /// The input values consumed by this step.
    pub inputs: Value,
    /// The resulting value(s) of this step.
    pub result: Value,
    /// Optional explanatory note.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Append-only accumulator for steps and warnings during one calculation.
///
/// # Example
///
/// ```
/// use support_engine::models::TraceBuilder;
/// use serde_json::json;
///
/// let mut trace = TraceBuilder::new();
/// trace.step(
///     "Adjusted net income",
///     "Net income - work expense allowance",
///     json!({"net": "3200"}),
///     json!("3050"),
///     Some("Allowance capped at 150".to_string()),
/// );
/// assert_eq!(trace.steps()[0].step_number, 1);
/// ```
#[derive(Debug, Default)]
pub struct TraceBuilder {
    steps: Vec<CalculationStep>,
    warnings: Vec<CalculationWarning>,
}

impl TraceBuilder {
    /// Creates an empty trace.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a step, assigning the next sequence number.
    pub fn step(
        &mut self,
        label: &str,
        formula: &str,
        inputs: Value,
        result: Value,
        note: Option<String>,
    ) {
        let step_number = self.steps.len() as u32 + 1;
        self.steps.push(CalculationStep {
            step_number,
            label: label.to_string(),
            formula: formula.to_string(),
            inputs,
            result,
            note,
        });
    }

    /// Attaches a warning to the trace.
    pub fn warn(&mut self, code: &str, message: String, severity: Severity) {
        self.warnings.push(CalculationWarning {
            code: code.to_string(),
            message,
            severity,
        });
    }

    /// Returns the steps appended so far.
    pub fn steps(&self) -> &[CalculationStep] {
        &self.steps
    }

    /// Returns the warnings attached so far.
    pub fn warnings(&self) -> &[CalculationWarning] {
        &self.warnings
    }

    /// Consumes the builder, yielding the ordered steps and warnings.
    pub fn finish(self) -> (Vec<CalculationStep>, Vec<CalculationWarning>) {
        (self.steps, self.warnings)
    }
}
