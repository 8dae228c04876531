//! Per-stat capacity weights, overflow caps and resale multipliers.

use crate::{Item, StatId, ValidationError};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Constants attached to a single stat.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatWeights {
    /// Capacity consumed (or freed) per point of the stat.
    pub base_weight: u64,
    /// Largest amount the stat may exceed its natural maximum.
    #[serde(default)]
    pub max_overflow: i64,
    /// Resale value per point gained; the table default applies when absent.
    #[serde(default)]
    pub value_multiplier: Option<Decimal>,
}

/// Single source of truth for every stat constant used by capacity accounting
/// and valuation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatWeightTable {
    #[serde(default = "default_base_weight")]
    pub default_base_weight: u64,
    #[serde(default = "default_value_multiplier")]
    pub default_value_multiplier: Decimal,
    #[serde(default = "default_item_price")]
    pub default_item_price: Decimal,
    #[serde(default)]
    pub stats: BTreeMap<StatId, StatWeights>,
}

fn default_base_weight() -> u64 {
    1
}

fn default_value_multiplier() -> Decimal {
    Decimal::new(50, 0)
}

fn default_item_price() -> Decimal {
    Decimal::new(10_000, 0)
}

const BUILTIN_WEIGHTS: &str = include_str!("../../../assets/stat_weights.yaml");

impl StatWeightTable {
    /// Table covering the 25 standard stats, embedded from `assets/stat_weights.yaml`.
    pub fn builtin() -> Result<Self, ValidationError> {
        Self::from_yaml_str(BUILTIN_WEIGHTS)
    }

    /// Parse and validate a table from YAML.
    pub fn from_yaml_str(text: &str) -> Result<Self, ValidationError> {
        let table: StatWeightTable =
            serde_yaml::from_str(text).map_err(|e| ValidationError::Config(e.to_string()))?;
        validate_weight_table(&table)?;
        Ok(table)
    }

    fn entry(&self, stat: &str) -> Option<&StatWeights> {
        self.stats.get(stat)
    }

    pub fn base_weight(&self, stat: &str) -> u64 {
        self.entry(stat)
            .map_or(self.default_base_weight, |w| w.base_weight)
    }

    /// Overflow cap; unknown stats may not exceed their maximum at all.
    pub fn max_overflow(&self, stat: &str) -> i64 {
        self.entry(stat).map_or(0, |w| w.max_overflow)
    }

    pub fn value_multiplier(&self, stat: &str) -> Decimal {
        self.entry(stat)
            .and_then(|w| w.value_multiplier)
            .unwrap_or(self.default_value_multiplier)
    }

    /// The item's reference price, falling back to the configured default.
    pub fn item_price(&self, item: &Item) -> Decimal {
        item.base_price.unwrap_or(self.default_item_price)
    }
}

/// Reject negative caps, multipliers and prices.
pub fn validate_weight_table(table: &StatWeightTable) -> Result<(), ValidationError> {
    if table.default_value_multiplier < Decimal::ZERO || table.default_item_price < Decimal::ZERO
    {
        return Err(ValidationError::NegativeMoney);
    }
    for (stat, w) in &table.stats {
        if w.max_overflow < 0 {
            return Err(ValidationError::NegativeOverflow(stat.0.clone()));
        }
        if w.value_multiplier.is_some_and(|m| m < Decimal::ZERO) {
            return Err(ValidationError::NegativeMoney);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_lookups_and_defaults() {
        let t = StatWeightTable::builtin().unwrap();
        assert_eq!(t.stats.len(), 25);
        assert_eq!(t.base_weight("vitalite"), 1);
        assert_eq!(t.max_overflow("vitalite"), 40);
        assert_eq!(t.base_weight("pa"), 300);
        assert_eq!(t.value_multiplier("pa"), Decimal::new(50_000, 0));
        // fuite has no explicit multiplier
        assert_eq!(t.value_multiplier("fuite"), Decimal::new(50, 0));
        assert_eq!(t.base_weight("unknown"), 1);
        assert_eq!(t.max_overflow("unknown"), 0);
        assert!(validate_weight_table(&t).is_ok());
    }

    #[test]
    fn yaml_overrides() {
        let text = r#"
default_item_price: 2500
stats:
  vitalite:
    base_weight: 2
    max_overflow: 60
    value_multiplier: 20
"#;
        let t = StatWeightTable::from_yaml_str(text).unwrap();
        assert_eq!(t.base_weight("vitalite"), 2);
        assert_eq!(t.max_overflow("vitalite"), 60);
        assert_eq!(t.value_multiplier("vitalite"), Decimal::new(20, 0));
        assert_eq!(t.default_item_price, Decimal::new(2500, 0));
        assert_eq!(t.default_base_weight, 1);
        assert_eq!(t.base_weight("pa"), 1);
    }

    #[test]
    fn yaml_rejects_negative_cap() {
        let text = "stats:\n  pa:\n    base_weight: 300\n    max_overflow: -1\n";
        assert_eq!(
            StatWeightTable::from_yaml_str(text),
            Err(ValidationError::NegativeOverflow("pa".to_string()))
        );
    }
}
