//! Rule-set configuration for the Support Calculation Engine.
//!
//! Statutory parameters live in immutable, validated tables loaded once at
//! startup into a read-only [`RuleSetRepository`], which calculators receive
//! by reference rather than touching ambient global state.

mod defaults;
mod repository;
mod types;

pub use repository::{RuleSetRepository, FALLBACK_REGION};
pub use types::{
    BandAdjustmentRule, FeeBand, FeeTable, IncomeBand, PriceIndexTable, RegionConfig,
    RegionParameters, RetentionClass, RetentionThresholds, RuleSetInfo, SupportTable,
    WorkExpenseRule,
};
