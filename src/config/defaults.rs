//! Built-in 2025 rule tables.
//!
//! These mirror the published statutory tables and guideline parameters for
//! the canonical region and serve as the default rule set when no external
//! configuration file is supplied.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

use super::types::{
    BandAdjustmentRule, FeeBand, FeeTable, IncomeBand, PriceIndexTable, RegionConfig,
    RegionParameters, RetentionThresholds, SupportTable, WorkExpenseRule,
};

/// Band bounds in euros, ascending.
const INCOME_BANDS: [(i64, i64); 15] = [
    (0, 2100),
    (2101, 2500),
    (2501, 2900),
    (2901, 3300),
    (3301, 3700),
    (3701, 4100),
    (4101, 4500),
    (4501, 4900),
    (4901, 5300),
    (5301, 5700),
    (5701, 6400),
    (6401, 7200),
    (7201, 8200),
    (8201, 9700),
    (9701, 11200),
];

/// Monthly amounts per band, columns are the four age brackets.
const TABLE_AMOUNTS: [[i64; 4]; 15] = [
    [482, 554, 649, 693],
    [507, 582, 682, 728],
    [531, 610, 714, 763],
    [555, 638, 747, 797],
    [579, 665, 779, 832],
    [617, 710, 831, 888],
    [656, 754, 883, 943],
    [695, 798, 935, 998],
    [733, 843, 987, 1054],
    [772, 887, 1039, 1109],
    [810, 931, 1090, 1164],
    [849, 976, 1142, 1220],
    [888, 1020, 1194, 1275],
    [927, 1065, 1247, 1331],
    [965, 1109, 1299, 1387],
];

/// Control amounts per band.
const CONTROL_AMOUNTS: [i64; 15] = [
    1200, 1500, 1600, 1700, 1800, 1900, 2000, 2100, 2200, 2300, 2400, 2500, 2600, 2700, 2800,
];

/// Statutory single fee per claim-value threshold.
const FEE_ROWS: [(i64, i64); 41] = [
    (500, 49),
    (1000, 88),
    (1500, 127),
    (2000, 166),
    (3000, 222),
    (4000, 278),
    (5000, 334),
    (6000, 390),
    (7000, 446),
    (8000, 502),
    (9000, 558),
    (10000, 614),
    (13000, 666),
    (16000, 718),
    (19000, 770),
    (22000, 822),
    (25000, 874),
    (30000, 955),
    (35000, 1036),
    (40000, 1117),
    (45000, 1198),
    (50000, 1279),
    (65000, 1373),
    (80000, 1467),
    (95000, 1561),
    (110000, 1655),
    (125000, 1749),
    (140000, 1843),
    (155000, 1937),
    (170000, 2031),
    (185000, 2125),
    (200000, 2219),
    (230000, 2360),
    (260000, 2501),
    (290000, 2642),
    (320000, 2783),
    (350000, 2924),
    (380000, 3065),
    (410000, 3206),
    (440000, 3347),
    (470000, 3488),
];

const FEE_TOP: (i64, i64) = (500000, 3629);

/// Consumer price index per year, base 2020 = 100.
const PRICE_INDEX: [(i32, &str); 11] = [
    (2015, "93.0"),
    (2016, "93.5"),
    (2017, "95.0"),
    (2018, "96.7"),
    (2019, "98.1"),
    (2020, "100.0"),
    (2021, "103.1"),
    (2022, "110.4"),
    (2023, "117.4"),
    (2024, "120.2"),
    (2025, "122.5"),
];

fn dec(s: &str) -> Decimal {
    // literals above are well-formed, an invalid one is a programming error
    debug_assert!(s.parse::<Decimal>().is_ok(), "malformed decimal literal {s}");
    s.parse().unwrap_or_default()
}

pub(super) fn support_tables() -> Vec<SupportTable> {
    let bands = INCOME_BANDS
        .iter()
        .map(|(low, high)| IncomeBand {
            low: Decimal::from(*low),
            high: Decimal::from(*high),
        })
        .collect();
    let amounts = TABLE_AMOUNTS
        .iter()
        .map(|row| {
            [
                Decimal::from(row[0]),
                Decimal::from(row[1]),
                Decimal::from(row[2]),
                Decimal::from(row[3]),
            ]
        })
        .collect();
    let control_amounts = CONTROL_AMOUNTS.iter().map(|v| Decimal::from(*v)).collect();
    vec![SupportTable {
        effective_date: NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap_or(NaiveDate::MIN),
        child_benefit: Decimal::from(255),
        adult_income_disregard: Decimal::from(100),
        bands,
        amounts,
        control_amounts,
    }]
}

pub(super) fn regions() -> (HashMap<String, RegionConfig>, RegionConfig) {
    let schleswig = RegionConfig {
        region: "schleswig".to_string(),
        version: "2025.1".to_string(),
        effective_from: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or(NaiveDate::MIN),
        parameters: RegionParameters {
            work_expense: WorkExpenseRule {
                rate: dec("0.05"),
                minimum: Decimal::from(50),
                maximum: Decimal::from(150),
            },
            retirement_cap_rate: dec("0.04"),
            earner_bonus_fraction: Decimal::ONE / Decimal::from(7),
            retention: RetentionThresholds {
                minor_employed: Decimal::from(1450),
                minor_not_employed: Decimal::from(1200),
                adult_child: Decimal::from(1750),
                spouse_employed: Decimal::from(1600),
                spouse_not_employed: Decimal::from(1475),
                parent: Decimal::from(2650),
            },
            band_adjustment: BandAdjustmentRule {
                downshift_at: 4,
                steps: 1,
            },
        },
    };
    let mut regions = HashMap::new();
    regions.insert(schleswig.region.clone(), schleswig.clone());
    (regions, schleswig)
}

pub(super) fn fee_table() -> FeeTable {
    let mut entries: Vec<FeeBand> = FEE_ROWS
        .iter()
        .map(|(threshold, fee)| FeeBand {
            threshold: Decimal::from(*threshold),
            fee: Decimal::from(*fee),
        })
        .collect();
    entries.push(FeeBand {
        threshold: Decimal::from(FEE_TOP.0),
        fee: Decimal::from(FEE_TOP.1),
    });
    FeeTable {
        effective_date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap_or(NaiveDate::MIN),
        entries,
        extrapolation_step: Decimal::from(50000),
        extrapolation_increment: Decimal::from(165),
        disbursement_allowance: Decimal::from(20),
        tax_rate: dec("0.19"),
    }
}

pub(super) fn price_index() -> PriceIndexTable {
    let values = PRICE_INDEX
        .iter()
        .map(|(year, value)| (*year, dec(value)))
        .collect::<BTreeMap<_, _>>();
    PriceIndexTable { values }
}

#[cfg(test)]
mod tests {
    use super::*;

    // dec() debug-asserts on malformed literals, so constructing every
    // table exercises each constant.
    #[test]
    fn every_builtin_literal_parses() {
        assert!(!support_tables().is_empty());
        let (map, canonical) = regions();
        assert!(map.contains_key(&canonical.region));
        assert!(!fee_table().entries.is_empty());
        assert!(!price_index().values.is_empty());
    }
}
