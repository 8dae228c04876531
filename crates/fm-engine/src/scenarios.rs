//! Outcome scenarios, resale valuation and expected profit.

use fm_core::{Item, StatMap, StatWeightTable};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

/// The three possible results of a forging attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    /// "SC": the full target lands.
    CriticalSuccess,
    /// "SN": stats land slightly short.
    Neutral,
    /// "EC": the attempt degrades the item.
    CriticalFailure,
}

impl OutcomeKind {
    pub const ALL: [OutcomeKind; 3] = [
        OutcomeKind::CriticalSuccess,
        OutcomeKind::Neutral,
        OutcomeKind::CriticalFailure,
    ];

    /// Fixed probability; the three sum to exactly one.
    pub fn probability(self) -> Decimal {
        match self {
            OutcomeKind::CriticalSuccess => Decimal::new(15, 2),
            OutcomeKind::Neutral => Decimal::new(70, 2),
            OutcomeKind::CriticalFailure => Decimal::new(15, 2),
        }
    }

    /// Percentage of each requested stat value that survives this outcome.
    fn stat_retention_pct(self) -> i64 {
        match self {
            OutcomeKind::CriticalSuccess => 100,
            OutcomeKind::Neutral => 90,
            OutcomeKind::CriticalFailure => 60,
        }
    }

    pub fn code(self) -> &'static str {
        match self {
            OutcomeKind::CriticalSuccess => "SC",
            OutcomeKind::Neutral => "SN",
            OutcomeKind::CriticalFailure => "EC",
        }
    }
}

/// One weighted outcome with its resulting stats and monetary value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub kind: OutcomeKind,
    pub probability: Decimal,
    pub result: StatMap,
    pub value: Decimal,
}

/// Probability-weighted summary of a scenario set.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Valuation {
    pub expected_value: Decimal,
    pub expected_profit: Decimal,
    /// Expected profit over total outlay, in percent; 0 when the outlay is 0.
    pub profitability_percent: Decimal,
}

/// Resale estimate: reference price plus a per-stat premium for every point
/// gained over the item's current roll.
pub fn estimate_value(weights: &StatWeightTable, item: &Item, final_stats: &StatMap) -> Decimal {
    final_stats
        .iter()
        .fold(weights.item_price(item), |acc, (stat, value)| {
            let gain = value
                .saturating_sub(item.base_stats.value_or_zero(stat.as_str()))
                .max(0);
            acc + Decimal::from(gain) * weights.value_multiplier(stat.as_str())
        })
}

/// Round `value * pct / 100` half up, matching the game's display rounding.
fn retain(value: i64, pct: i64) -> i64 {
    let scaled = (i128::from(value) * i128::from(pct) + 50).div_euclid(100);
    i64::try_from(scaled).unwrap_or(if scaled < 0 { i64::MIN } else { i64::MAX })
}

/// Build the critical-success, neutral and critical-failure scenarios.
///
/// Success and neutral are valued on the full target (success at a 30 %
/// premium); a critical failure is worth 70 % of the rune spend as salvage.
pub fn build_scenarios(
    weights: &StatWeightTable,
    item: &Item,
    targets: &StatMap,
    total_cost: Decimal,
) -> [Scenario; 3] {
    let target_value = estimate_value(weights, item, targets);
    let scenarios = OutcomeKind::ALL.map(|kind| {
        let value = match kind {
            OutcomeKind::CriticalSuccess => target_value * Decimal::new(13, 1),
            OutcomeKind::Neutral => target_value,
            OutcomeKind::CriticalFailure => total_cost * Decimal::new(7, 1),
        };
        let pct = kind.stat_retention_pct();
        Scenario {
            kind,
            probability: kind.probability(),
            result: targets.map_values(|v| retain(v, pct)),
            value,
        }
    });
    debug_assert_eq!(
        scenarios.iter().map(|s| s.probability).sum::<Decimal>(),
        Decimal::ONE
    );
    scenarios
}

/// Expected value, profit and profitability of `scenarios` for a given spend.
pub fn valuate(
    weights: &StatWeightTable,
    item: &Item,
    scenarios: &[Scenario],
    total_cost: Decimal,
) -> Valuation {
    let expected_value: Decimal = scenarios.iter().map(|s| s.value * s.probability).sum();
    let outlay = total_cost + weights.item_price(item);
    let expected_profit = expected_value - outlay;
    let profitability_percent = if outlay.is_zero() {
        Decimal::ZERO
    } else {
        expected_profit / outlay * Decimal::ONE_HUNDRED
    };
    debug!(%expected_value, %expected_profit, %profitability_percent, "valuation");
    Valuation {
        expected_value,
        expected_profit,
        profitability_percent,
    }
}

/// Realized outcomes of repeated simulated attempts.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeTally {
    pub runs: u32,
    pub counts: BTreeMap<OutcomeKind, u32>,
    /// Mean scenario value over all runs; 0 when no run was drawn.
    pub mean_value: Decimal,
}

/// Draw `runs` outcomes from the scenario distribution.
///
/// Sampling is seeded for reproducibility: the same seed always yields the
/// same tally.
pub fn sample_outcomes(scenarios: &[Scenario], runs: u32, seed: u64) -> OutcomeTally {
    if runs == 0 || scenarios.is_empty() {
        return OutcomeTally::default();
    }
    // cumulative thresholds in basis points
    let mut acc = 0u32;
    let thresholds: Vec<u32> = scenarios
        .iter()
        .map(|s| {
            let bp = (s.probability * Decimal::from(10_000)).round().to_u32().unwrap_or(0);
            acc = acc.saturating_add(bp);
            acc
        })
        .collect();

    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut counts = BTreeMap::new();
    let mut total = Decimal::ZERO;
    for _ in 0..runs {
        let draw: u32 = rng.gen_range(0..10_000);
        let idx = thresholds
            .iter()
            .position(|&t| draw < t)
            .unwrap_or(scenarios.len() - 1);
        let s = &scenarios[idx];
        *counts.entry(s.kind).or_insert(0) += 1;
        total += s.value;
    }
    OutcomeTally {
        runs,
        counts,
        mean_value: total / Decimal::from(runs),
    }
}
