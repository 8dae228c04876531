#![deny(warnings)]

//! Forgemagerie profitability engine.
//!
//! This crate provides pure, synchronous helpers for:
//! - Capacity ("puits") accounting for over-capped targets and stat removals
//! - Greedy rune selection by density within a capacity budget
//! - Three-outcome scenario valuation and expected profit
//! - Seeded sampling of outcomes for what-if runs
//!
//! [`ForgeEngine`] bundles these behind one injected [`StatWeightTable`].

mod analysis;
mod capacity;
mod scenarios;
mod selection;

pub use analysis::{analyze, Analysis};
pub use capacity::{capacity_available, capacity_required};
pub use scenarios::{
    build_scenarios, estimate_value, sample_outcomes, valuate, OutcomeKind, OutcomeTally,
    Scenario, Valuation,
};
pub use selection::{combination_for, select};

use fm_core::{Item, Modifier, StatMap, StatWeightTable, ValidationError};
use thiserror::Error;

/// Errors produced by the engine.
#[derive(Debug, Error, PartialEq)]
pub enum EngineError {
    /// The targets need more capacity than the item offers.
    #[error("insufficient capacity: {required} required, {available} available")]
    CapacityInsufficient { required: u64, available: u64 },
}

/// Engine configured with a single weight table.
///
/// Holds no mutable state; share it freely across threads.
#[derive(Clone, Debug)]
pub struct ForgeEngine {
    weights: StatWeightTable,
}

impl ForgeEngine {
    pub fn new(weights: StatWeightTable) -> Self {
        Self { weights }
    }

    /// Engine over the embedded weight table.
    pub fn builtin() -> Result<Self, ValidationError> {
        StatWeightTable::builtin().map(Self::new)
    }

    pub fn weights(&self) -> &StatWeightTable {
        &self.weights
    }

    /// Capacity the targets consume, without running selection.
    pub fn capacity_used(&self, item: &Item, targets: &StatMap) -> u64 {
        capacity_required(&self.weights, item, targets)
    }

    /// Capacity the item offers once `removals` are applied.
    pub fn capacity_available(&self, item: &Item, removals: &StatMap) -> u64 {
        capacity_available(&self.weights, item, removals)
    }

    /// Lightweight feasibility pre-check.
    pub fn check(
        &self,
        item: &Item,
        targets: &StatMap,
        removals: &StatMap,
    ) -> Result<u64, EngineError> {
        let required = self.capacity_used(item, targets);
        let available = self.capacity_available(item, removals);
        if required > available {
            return Err(EngineError::CapacityInsufficient {
                required,
                available,
            });
        }
        Ok(available - required)
    }

    pub fn analyze<'c>(
        &self,
        item: Item,
        targets: StatMap,
        catalog: &'c [Modifier],
        removals: StatMap,
    ) -> Result<Analysis<'c>, EngineError> {
        analyze(&self.weights, item, targets, catalog, removals)
    }
}
