//! Read-only repository over the loaded rule tables.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

use super::defaults;
use super::types::{
    FeeTable, PriceIndexTable, RegionConfig, RetentionClass, RuleSetInfo, SupportTable,
};
use crate::error::{EngineError, EngineResult};

/// Canonical region used when an unknown region is requested.
pub const FALLBACK_REGION: &str = "schleswig";

/// Serialized shape of an external rule-set file.
#[derive(Debug, Serialize, Deserialize)]
struct RuleSetFile {
    regions: Vec<RegionConfig>,
    support_tables: Vec<SupportTable>,
    fee_table: FeeTable,
    price_index: PriceIndexTable,
}

/// Immutable repository of regional parameters and statutory tables.
///
/// Built once at startup, then shared by reference with every calculator.
/// All lookups are pure and infallible; resolution of an unknown region
/// falls back to [`FALLBACK_REGION`] rather than erroring, so a calculation
/// always runs under a well-defined rule set.
#[derive(Debug, Clone)]
pub struct RuleSetRepository {
    regions: HashMap<String, RegionConfig>,
    /// Canonical region used when resolution falls back.
    canonical: RegionConfig,
    /// Support table generations, ascending by effective date.
    support_tables: Vec<SupportTable>,
    fee_table: FeeTable,
    price_index: PriceIndexTable,
}

impl RuleSetRepository {
    /// Builds the repository from the built-in 2025 tables.
    pub fn builtin() -> Self {
        let (regions, canonical) = defaults::regions();
        let repo = Self {
            regions,
            canonical,
            support_tables: defaults::support_tables(),
            fee_table: defaults::fee_table(),
            price_index: defaults::price_index(),
        };
        debug_assert!(repo.check_tables().is_ok(), "built-in tables failed validation");
        repo
    }

    /// Parses and validates a repository from YAML.
    pub fn from_yaml_str(source: &str) -> EngineResult<Self> {
        let file: RuleSetFile =
            serde_yaml::from_str(source).map_err(|e| EngineError::ConfigParseError {
                path: "<inline>".to_string(),
                message: e.to_string(),
            })?;
        Self::from_file(file)
    }

    /// Loads and validates a repository from a YAML file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> EngineResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|_| EngineError::ConfigNotFound {
            path: path.display().to_string(),
        })?;
        let file: RuleSetFile =
            serde_yaml::from_str(&source).map_err(|e| EngineError::ConfigParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;
        debug!(path = %path.display(), "loaded rule set file");
        Self::from_file(file)
    }

    fn from_file(file: RuleSetFile) -> EngineResult<Self> {
        if file.regions.is_empty() {
            return Err(EngineError::InvalidTable {
                message: "rule set file declares no regions".to_string(),
            });
        }
        let mut support_tables = file.support_tables;
        support_tables.sort_by_key(|t| t.effective_date);
        let regions = file
            .regions
            .into_iter()
            .map(|r| (r.region.clone(), r))
            .collect::<HashMap<_, _>>();
        let canonical = match regions.get(FALLBACK_REGION) {
            Some(config) => config.clone(),
            None => {
                return Err(EngineError::InvalidTable {
                    message: format!("rule set file must include the {FALLBACK_REGION} region"),
                });
            }
        };
        let repo = Self {
            regions,
            canonical,
            support_tables,
            fee_table: file.fee_table,
            price_index: file.price_index,
        };
        repo.check_tables()?;
        Ok(repo)
    }

    /// Structural validation shared by the built-in and YAML-loaded tables.
    fn check_tables(&self) -> EngineResult<()> {
        if self.support_tables.is_empty() {
            return Err(EngineError::InvalidTable {
                message: "rule set declares no support tables".to_string(),
            });
        }
        for table in &self.support_tables {
            table.validate()?;
        }
        self.fee_table.validate()?;
        self.price_index.validate()?;
        Ok(())
    }

    /// Resolves the rule set for a region as of a date.
    ///
    /// Unknown regions resolve to [`FALLBACK_REGION`] with
    /// `fallback_applied` set, so this never fails.
    pub fn resolve(&self, region: &str, as_of: NaiveDate) -> RuleSetInfo {
        let requested = region.to_lowercase();
        let (config, fallback_applied) = match self.regions.get(&requested) {
            Some(config) => (config, false),
            None => {
                debug!(requested = %region, "unknown region, using canonical rule set");
                (&self.canonical, true)
            }
        };
        if as_of < config.effective_from {
            debug!(
                region = %config.region,
                %as_of,
                effective_from = %config.effective_from,
                "calculation date precedes the earliest modeled rule edition"
            );
        }
        RuleSetInfo {
            region: config.region.clone(),
            version: config.version.clone(),
            effective_from: config.effective_from,
            fallback_applied,
            parameters: config.parameters.clone(),
        }
    }

    /// Support table generation applicable on a date.
    ///
    /// The latest generation whose effective date is not after `as_of`,
    /// or the earliest generation for dates before all of them.
    pub fn table_for(&self, as_of: NaiveDate) -> &SupportTable {
        self.support_tables
            .iter()
            .rev()
            .find(|t| t.effective_date <= as_of)
            .unwrap_or(&self.support_tables[0])
    }

    /// 1-based income band for a net income.
    ///
    /// Resolves to the highest band whose lower bound does not exceed the
    /// income, so fractional amounts between the integer bounds of two
    /// bands stay in the lower one. Incomes below the bottom band map to
    /// band 1, incomes above the top band to the highest band.
    pub fn income_band_for(&self, net_income: Decimal, as_of: NaiveDate) -> u32 {
        let table = self.table_for(as_of);
        for (i, band) in table.bands.iter().enumerate().rev() {
            if net_income >= band.low {
                return (i + 1) as u32;
            }
        }
        1
    }

    /// Work-expense allowance for a net income under a region's rules.
    pub fn work_expense_allowance(
        &self,
        net_income: Decimal,
        region: &str,
        actual_costs: Option<Decimal>,
        as_of: NaiveDate,
    ) -> Decimal {
        let info = self.resolve(region, as_of);
        info.parameters.work_expense.allowance(net_income, actual_costs)
    }

    /// Minimum monthly retention for an obligor under a region's rules.
    pub fn minimum_retention(
        &self,
        region: &str,
        class: RetentionClass,
        employed: bool,
        as_of: NaiveDate,
    ) -> Decimal {
        let info = self.resolve(region, as_of);
        info.parameters.retention.for_class(class, employed)
    }

    /// Earner bonus fraction of a region.
    pub fn earner_bonus_fraction(&self, region: &str, as_of: NaiveDate) -> Decimal {
        let info = self.resolve(region, as_of);
        info.parameters.earner_bonus_fraction
    }

    /// Consumer price index value for a calendar year.
    pub fn price_index_for(&self, year: i32) -> Decimal {
        self.price_index.index_for(year)
    }

    /// Statutory single fee for a claim value.
    pub fn base_fee_for(&self, claim_value: Decimal) -> Decimal {
        self.fee_table.base_fee_for(claim_value)
    }

    /// The statutory fee table.
    pub fn fee_table(&self) -> &FeeTable {
        &self.fee_table
    }

    /// Region identifiers known to this repository, sorted.
    pub fn available_regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = self.regions.keys().map(String::as_str).collect();
        regions.sort_unstable();
        regions
    }
}
