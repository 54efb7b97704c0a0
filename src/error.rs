//! Error types for the Support Calculation Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur during rule loading and
//! calculation input validation.
//!
//! The calculators themselves never fail on domain anomalies (shortfall,
//! negative values, unknown regions); those surface as warnings on the
//! result instead. The only hard failures are malformed configuration and
//! structurally invalid input.

use thiserror::Error;

/// The main error type for the Support Calculation Engine.
///
/// # Example
///
/// ```
/// use support_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/rules.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Rule configuration not found: /missing/rules.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Rule configuration file was not found at the specified path.
    #[error("Rule configuration not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Rule configuration could not be parsed.
    #[error("Failed to parse rule configuration '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A rule table failed structural validation at load time.
    #[error("Invalid rule table: {message}")]
    InvalidTable {
        /// A description of what made the table invalid.
        message: String,
    },

    /// A calculation input violated its structural contract.
    #[error("Invalid input field '{field}': {message}")]
    InvalidInput {
        /// The field that was invalid.
        field: String,
        /// A description of what made the field invalid.
        message: String,
    },
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
