//! Data models for the Support Calculation Engine.

mod assets;
mod calculation_result;
mod dependent;
mod income;
mod trace;

pub use assets::{AssetCategory, AssetPosition, Party};
pub use calculation_result::{CalculationKind, CalculationResult};
pub use dependent::{AgeBracket, Custodian, Dependent};
pub use income::Income;
pub use trace::{CalculationStep, CalculationWarning, Severity, TraceBuilder};
