//! End-to-end analysis: capacity gate, rune selection, valuation.

use crate::capacity::{capacity_available, capacity_required};
use crate::scenarios::{build_scenarios, valuate, Scenario};
use crate::selection::select;
use crate::EngineError;
use fm_core::{Item, Modifier, StatMap, StatWeightTable};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Result of one analysis request. Built once by [`analyze`] and read-only
/// afterwards; selected runes borrow from the caller's catalog.
#[derive(Clone, Debug, Serialize)]
pub struct Analysis<'c> {
    item: Item,
    targets: StatMap,
    removals: StatMap,
    modifiers: Vec<&'c Modifier>,
    total_cost: Decimal,
    capacity_used: u64,
    capacity_available: u64,
    scenarios: [Scenario; 3],
    expected_profit: Decimal,
    profitability_percent: Decimal,
}

impl<'c> Analysis<'c> {
    pub fn item(&self) -> &Item {
        &self.item
    }

    pub fn targets(&self) -> &StatMap {
        &self.targets
    }

    pub fn removals(&self) -> &StatMap {
        &self.removals
    }

    /// Selected rune units in application order; repeats are repeated uses.
    pub fn modifiers(&self) -> &[&'c Modifier] {
        &self.modifiers
    }

    pub fn total_cost(&self) -> Decimal {
        self.total_cost
    }

    pub fn capacity_used(&self) -> u64 {
        self.capacity_used
    }

    pub fn capacity_available(&self) -> u64 {
        self.capacity_available
    }

    pub fn capacity_remaining(&self) -> u64 {
        self.capacity_available - self.capacity_used
    }

    pub fn scenarios(&self) -> &[Scenario; 3] {
        &self.scenarios
    }

    pub fn expected_profit(&self) -> Decimal {
        self.expected_profit
    }

    pub fn profitability_percent(&self) -> Decimal {
        self.profitability_percent
    }

    /// Distinct runes with their use counts, in order of first use.
    pub fn modifier_counts(&self) -> Vec<(&'c Modifier, u32)> {
        let mut counts: Vec<(&'c Modifier, u32)> = Vec::new();
        for &m in &self.modifiers {
            match counts.iter_mut().find(|(seen, _)| seen.id == m.id) {
                Some((_, n)) => *n += 1,
                None => counts.push((m, 1)),
            }
        }
        counts
    }
}

/// Run the full analysis for one item.
///
/// Fails with [`EngineError::CapacityInsufficient`] before any selection when
/// the targets need more capacity than the item (plus removals) offers.
/// Runes are then selected against the required capacity only.
pub fn analyze<'c>(
    weights: &StatWeightTable,
    item: Item,
    targets: StatMap,
    catalog: &'c [Modifier],
    removals: StatMap,
) -> Result<Analysis<'c>, EngineError> {
    let available = capacity_available(weights, &item, &removals);
    let required = capacity_required(weights, &item, &targets);
    debug!(item = %item.name, required, available, "capacity check");
    if required > available {
        return Err(EngineError::CapacityInsufficient {
            required,
            available,
        });
    }

    let modifiers = select(required, &targets, &item.base_stats, catalog);
    let total_cost: Decimal = modifiers.iter().map(|m| m.price).sum();
    let scenarios = build_scenarios(weights, &item, &targets, total_cost);
    let valuation = valuate(weights, &item, &scenarios, total_cost);
    debug!(
        item = %item.name,
        units = modifiers.len(),
        %total_cost,
        expected_profit = %valuation.expected_profit,
        "analysis complete"
    );

    Ok(Analysis {
        item,
        targets,
        removals,
        modifiers,
        total_cost,
        capacity_used: required,
        capacity_available: available,
        scenarios,
        expected_profit: valuation.expected_profit,
        profitability_percent: valuation.profitability_percent,
    })
}
