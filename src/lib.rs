//! Statutory Support Calculation Engine for family-law matters
//!
//! This crate computes child support, spousal support, marital-property
//! equalization and statutory attorney fees from versioned, dated rule
//! tables. Every calculation returns a [`models::CalculationResult`] that
//! bundles the final figures with an ordered trace of labeled intermediate
//! steps and the identity of the rule set that produced them, so a
//! computation performed today and one performed after a table update stay
//! distinguishable and reproducible.

#![warn(missing_docs)]

pub mod calculation;
pub mod config;
pub mod error;
pub mod models;
