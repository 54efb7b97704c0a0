//! Calculation logic for statutory support, equalization and fee amounts.
//!
//! Every calculator follows the same shape: a struct borrowing the
//! [`crate::config::RuleSetRepository`], a `calculate` method taking a
//! validated input and returning a [`crate::models::CalculationResult`]
//! whose step trace documents each intermediate value.

mod child_support;
mod fee_schedule;
mod income_adjustment;
mod property_equalization;
mod spousal_support;

pub use child_support::{
    BandAdjustmentPolicy, ChildSupportCalculator, ChildSupportInput, DependentAward,
};
pub use fee_schedule::{FeeScheduleCalculator, FeeScheduleInput};
pub use income_adjustment::{adjust_net_income, IncomeAdjustment};
pub use property_equalization::{
    EqualizationCalculator, EqualizationInput, PartyOutcome,
};
pub use spousal_support::{SpousalSupportCalculator, SpousalSupportInput, SupportKind};
