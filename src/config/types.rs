//! Typed representations of the statutory rule tables.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{EngineError, EngineResult};
use crate::models::AgeBracket;

/// A single net-income band of the support table.
///
/// Bands carry inclusive bounds in euros. Band numbering is 1-based and
/// follows the order of the `bands` vector in [`SupportTable`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeBand {
    /// Inclusive lower bound of the band.
    pub low: Decimal,
    /// Inclusive upper bound of the band.
    pub high: Decimal,
}

/// A generation of the statutory child-support table.
///
/// Holds the per-band, per-age-bracket monthly amounts together with the
/// offsets applied against them. Amounts are row-per-band with four columns,
/// one per age bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupportTable {
    /// Date from which this generation of the table applies.
    pub effective_date: NaiveDate,
    /// Monthly state child benefit per child.
    pub child_benefit: Decimal,
    /// Monthly disregard subtracted from an adult child's own income.
    pub adult_income_disregard: Decimal,
    /// Income bands in ascending order.
    pub bands: Vec<IncomeBand>,
    /// Monthly amounts, one row per band, one column per age bracket.
    pub amounts: Vec<[Decimal; 4]>,
    /// Control amount (minimum residual) per band.
    pub control_amounts: Vec<Decimal>,
}

impl SupportTable {
    /// Looks up the monthly amount for a 1-based band and an age bracket.
    ///
    /// Out-of-range bands are clamped to the table edges so that callers
    /// working with an already-resolved band never observe a gap.
    pub fn amount(&self, band: u32, bracket: AgeBracket) -> Decimal {
        let row = (band.max(1) as usize - 1).min(self.amounts.len() - 1);
        self.amounts[row][bracket.index()]
    }

    /// Returns the control amount for a 1-based band, clamped like [`Self::amount`].
    pub fn control_amount(&self, band: u32) -> Decimal {
        let row = (band.max(1) as usize - 1).min(self.control_amounts.len() - 1);
        self.control_amounts[row]
    }

    /// Highest band number carried by this table.
    pub fn top_band(&self) -> u32 {
        self.bands.len() as u32
    }

    /// Checks structural integrity of the table.
    pub fn validate(&self) -> EngineResult<()> {
        if self.bands.is_empty() {
            return Err(EngineError::InvalidTable {
                message: "support table has no income bands".to_string(),
            });
        }
        if self.amounts.len() != self.bands.len() {
            return Err(EngineError::InvalidTable {
                message: format!(
                    "support table has {} bands but {} amount rows",
                    self.bands.len(),
                    self.amounts.len()
                ),
            });
        }
        if self.control_amounts.len() != self.bands.len() {
            return Err(EngineError::InvalidTable {
                message: format!(
                    "support table has {} bands but {} control amounts",
                    self.bands.len(),
                    self.control_amounts.len()
                ),
            });
        }
        for (i, band) in self.bands.iter().enumerate() {
            if band.low > band.high {
                return Err(EngineError::InvalidTable {
                    message: format!("band {} has low {} above high {}", i + 1, band.low, band.high),
                });
            }
            if i > 0 && band.low != self.bands[i - 1].high + Decimal::ONE {
                return Err(EngineError::InvalidTable {
                    message: format!(
                        "band {} does not start directly above band {}",
                        i + 1,
                        i
                    ),
                });
            }
        }
        for (i, row) in self.amounts.iter().enumerate() {
            if row.iter().any(|v| v.is_sign_negative()) {
                return Err(EngineError::InvalidTable {
                    message: format!("band {} carries a negative amount", i + 1),
                });
            }
        }
        Ok(())
    }
}

/// Flat-rate allowance for work-related expenses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkExpenseRule {
    /// Fraction of net income covered by the flat rate.
    pub rate: Decimal,
    /// Lower clamp of the flat-rate allowance.
    pub minimum: Decimal,
    /// Upper clamp of the flat-rate allowance.
    pub maximum: Decimal,
}

impl WorkExpenseRule {
    /// Allowance for a given net income, preferring higher documented actual costs.
    ///
    /// Zero net income yields a zero allowance regardless of the minimum,
    /// and negative actual costs are ignored.
    pub fn allowance(&self, net: Decimal, actual: Option<Decimal>) -> Decimal {
        if net <= Decimal::ZERO {
            return Decimal::ZERO;
        }
        let flat = (self.rate * net).clamp(self.minimum, self.maximum);
        match actual {
            Some(cost) if cost > flat => cost,
            _ => flat,
        }
    }
}

/// Which statutory minimum-retention threshold applies to an obligation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetentionClass {
    /// Support owed to a minor child.
    MinorChild,
    /// Support owed to an adult child.
    AdultChild,
    /// Support owed to a separated or divorced spouse.
    Spouse,
    /// Support owed to a parent.
    Parent,
}

/// Minimum monthly amounts an obligor keeps for their own subsistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionThresholds {
    /// Threshold towards minor children when the obligor is employed.
    pub minor_employed: Decimal,
    /// Threshold towards minor children when the obligor is not employed.
    pub minor_not_employed: Decimal,
    /// Threshold towards adult children.
    pub adult_child: Decimal,
    /// Threshold towards a spouse when the obligor is employed.
    pub spouse_employed: Decimal,
    /// Threshold towards a spouse when the obligor is not employed.
    pub spouse_not_employed: Decimal,
    /// Threshold towards a parent.
    pub parent: Decimal,
}

impl RetentionThresholds {
    /// Resolves the threshold for a retention class and employment status.
    pub fn for_class(&self, class: RetentionClass, employed: bool) -> Decimal {
        match (class, employed) {
            (RetentionClass::MinorChild, true) => self.minor_employed,
            (RetentionClass::MinorChild, false) => self.minor_not_employed,
            (RetentionClass::AdultChild, _) => self.adult_child,
            (RetentionClass::Spouse, true) => self.spouse_employed,
            (RetentionClass::Spouse, false) => self.spouse_not_employed,
            (RetentionClass::Parent, _) => self.parent,
        }
    }
}

/// Regional rule for shifting the income band by dependent count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandAdjustmentRule {
    /// Number of dependents at which the downshift starts.
    pub downshift_at: u32,
    /// How many bands to shift down once the threshold is reached.
    pub steps: u32,
}

/// The full parameter set of one region.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionParameters {
    /// Flat-rate work expense allowance rule.
    pub work_expense: WorkExpenseRule,
    /// Cap on deductible additional retirement provisions, as a fraction of gross income.
    pub retirement_cap_rate: Decimal,
    /// Fraction of employment income retained as an earner bonus.
    pub earner_bonus_fraction: Decimal,
    /// Minimum retention thresholds.
    pub retention: RetentionThresholds,
    /// Band shift rule for large numbers of dependents.
    pub band_adjustment: BandAdjustmentRule,
}

/// One region's versioned rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    /// Region identifier, lower-case.
    pub region: String,
    /// Human-readable version label of the guideline edition.
    pub version: String,
    /// Date from which this edition applies.
    pub effective_from: NaiveDate,
    /// The region's parameters.
    pub parameters: RegionParameters,
}

/// Snapshot of the rule set a calculation actually ran under.
///
/// Embedded into every [`crate::models::CalculationResult`] so the applied
/// parameters can be audited without access to the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleSetInfo {
    /// Region that was resolved, after any fallback.
    pub region: String,
    /// Version label of the applied edition.
    pub version: String,
    /// Date from which the applied edition is effective.
    pub effective_from: NaiveDate,
    /// Whether resolution fell back to the canonical region.
    pub fallback_applied: bool,
    /// The parameters that were applied.
    pub parameters: RegionParameters,
}

/// One row of the statutory fee table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeBand {
    /// Inclusive upper claim-value bound of the row.
    pub threshold: Decimal,
    /// Single statutory fee up to that claim value.
    pub fee: Decimal,
}

/// Statutory attorney fee table with extrapolation above the last row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeTable {
    /// Date from which this edition of the table applies.
    pub effective_date: NaiveDate,
    /// Rows in ascending threshold order.
    pub entries: Vec<FeeBand>,
    /// Claim-value step size above the last row.
    pub extrapolation_step: Decimal,
    /// Fee increment per full extrapolation step.
    pub extrapolation_increment: Decimal,
    /// Flat disbursement allowance added per matter.
    pub disbursement_allowance: Decimal,
    /// Value-added tax rate applied to the net total.
    pub tax_rate: Decimal,
}

impl FeeTable {
    /// Single statutory fee for a claim value.
    ///
    /// Claim values above the last row extrapolate by a fixed increment per
    /// started step of [`Self::extrapolation_step`], counting full steps only.
    pub fn base_fee_for(&self, claim_value: Decimal) -> Decimal {
        let claim = claim_value.max(Decimal::ZERO);
        for entry in &self.entries {
            if claim <= entry.threshold {
                return entry.fee;
            }
        }
        // claim exceeds the table, extrapolate from the last row
        let last = &self.entries[self.entries.len() - 1];
        let excess = claim - last.threshold;
        let steps = (excess / self.extrapolation_step).floor();
        last.fee + steps * self.extrapolation_increment
    }

    /// Checks structural integrity of the fee table.
    pub fn validate(&self) -> EngineResult<()> {
        if self.entries.is_empty() {
            return Err(EngineError::InvalidTable {
                message: "fee table has no rows".to_string(),
            });
        }
        for window in self.entries.windows(2) {
            if window[1].threshold <= window[0].threshold {
                return Err(EngineError::InvalidTable {
                    message: format!(
                        "fee table thresholds are not strictly ascending near {}",
                        window[1].threshold
                    ),
                });
            }
        }
        if self.extrapolation_step <= Decimal::ZERO {
            return Err(EngineError::InvalidTable {
                message: "fee table extrapolation step must be positive".to_string(),
            });
        }
        Ok(())
    }
}

/// Yearly consumer price index values used to inflation-adjust asset values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceIndexTable {
    /// Index value per calendar year.
    pub values: BTreeMap<i32, Decimal>,
}

impl PriceIndexTable {
    /// Index value for a year.
    ///
    /// Years outside the covered range return the nearest boundary value.
    /// Years inside the range without an exact entry are linearly
    /// interpolated between the neighbouring entries.
    pub fn index_for(&self, year: i32) -> Decimal {
        if let Some(value) = self.values.get(&year) {
            return *value;
        }
        // values is validated non-empty, so both iterators yield an entry
        let (first_year, first_value) = match self.values.iter().next() {
            Some((y, v)) => (*y, *v),
            None => return Decimal::ONE_HUNDRED,
        };
        let (last_year, last_value) = match self.values.iter().next_back() {
            Some((y, v)) => (*y, *v),
            None => return Decimal::ONE_HUNDRED,
        };
        if year <= first_year {
            return first_value;
        }
        if year >= last_year {
            return last_value;
        }
        let (below_year, below_value) = match self.values.range(..year).next_back() {
            Some((y, v)) => (*y, *v),
            None => return first_value,
        };
        let (above_year, above_value) = match self.values.range(year + 1..).next() {
            Some((y, v)) => (*y, *v),
            None => return last_value,
        };
        let span = Decimal::from(above_year - below_year);
        let offset = Decimal::from(year - below_year);
        below_value + (above_value - below_value) * offset / span
    }

    /// Checks structural integrity of the index table.
    pub fn validate(&self) -> EngineResult<()> {
        if self.values.is_empty() {
            return Err(EngineError::InvalidTable {
                message: "price index table has no entries".to_string(),
            });
        }
        if let Some((year, value)) = self.values.iter().find(|(_, v)| **v <= Decimal::ZERO) {
            return Err(EngineError::InvalidTable {
                message: format!("price index for {year} is not positive ({value})"),
            });
        }
        Ok(())
    }
}
