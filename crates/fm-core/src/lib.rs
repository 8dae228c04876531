#![deny(warnings)]

//! Core domain models and invariants for the forgemagerie engine.
//!
//! This crate defines the serializable item and modifier ("rune") records,
//! the insertion-ordered [`StatMap`], the [`StatWeightTable`] configuration
//! and the boundary validation helpers callers run before invoking the engine.

mod stat_map;
mod weights;

pub use stat_map::StatMap;
pub use weights::{validate_weight_table, StatWeightTable, StatWeights};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Stat identifier, e.g. "vitalite", "pa", "resistance_feu".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatId(pub String);

impl StatId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StatId {
    fn from(s: &str) -> Self {
        StatId(s.to_string())
    }
}

impl From<String> for StatId {
    fn from(s: String) -> Self {
        StatId(s)
    }
}

impl Borrow<str> for StatId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

/// An equipment piece as supplied by the item lookup collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: u32,
    pub name: String,
    /// Equipment slot or family, e.g. "Anneau".
    pub category: String,
    pub level: u32,
    /// Current rolled values.
    pub base_stats: StatMap,
    /// Natural maximum per stat before any over-capping.
    pub max_stats: StatMap,
    /// Base capacity ("puits") budget.
    pub capacity_total: u64,
    /// Reference market price; the weight table default applies when absent.
    #[serde(default)]
    pub base_price: Option<Decimal>,
}

/// Rune tiers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModifierCategory {
    /// Plain runes ("ra").
    Standard,
    /// Greater runes ("ga").
    Greater,
    /// AP/MP/range runes ("pa").
    ActionPoint,
    /// Exotic runes that push a stat the item does not naturally carry.
    Exotic,
}

impl ModifierCategory {
    /// Stat amount delivered per use when the rune's name carries no number.
    pub fn default_unit_value(self) -> i64 {
        match self {
            ModifierCategory::Greater => 10,
            ModifierCategory::Standard
            | ModifierCategory::ActionPoint
            | ModifierCategory::Exotic => 1,
        }
    }
}

/// Serialized form of a [`Modifier`]; `unit_value` may be left to derivation.
#[derive(Clone, Debug, Deserialize)]
pub struct ModifierRecord {
    pub id: u32,
    pub name: String,
    pub target_stat: StatId,
    pub unit_weight: u64,
    #[serde(default)]
    pub unit_value: Option<i64>,
    pub category: ModifierCategory,
    pub price: Decimal,
}

/// Immutable catalog entry. Density is computed once at construction.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(from = "ModifierRecord")]
pub struct Modifier {
    pub id: u32,
    pub name: String,
    pub target_stat: StatId,
    pub unit_weight: u64,
    pub unit_value: i64,
    pub category: ModifierCategory,
    pub price: Decimal,
    density: f64,
}

impl Modifier {
    /// Build a modifier whose unit value is derived from its name and category.
    pub fn new(
        id: u32,
        name: impl Into<String>,
        target_stat: impl Into<StatId>,
        unit_weight: u64,
        category: ModifierCategory,
        price: Decimal,
    ) -> Self {
        let name = name.into();
        let unit_value = derive_unit_value(&name, category);
        Self::with_parts(id, name, target_stat.into(), unit_weight, unit_value, category, price)
    }

    /// Override the derived unit value.
    pub fn with_unit_value(self, unit_value: i64) -> Self {
        Self::with_parts(
            self.id,
            self.name,
            self.target_stat,
            self.unit_weight,
            unit_value,
            self.category,
            self.price,
        )
    }

    fn with_parts(
        id: u32,
        name: String,
        target_stat: StatId,
        unit_weight: u64,
        unit_value: i64,
        category: ModifierCategory,
        price: Decimal,
    ) -> Self {
        let density = if unit_weight == 0 {
            0.0
        } else {
            unit_value as f64 / unit_weight as f64
        };
        Self {
            id,
            name,
            target_stat,
            unit_weight,
            unit_value,
            category,
            price,
            density,
        }
    }

    /// Stat delivered per unit of capacity.
    pub fn density(&self) -> f64 {
        self.density
    }
}

impl From<ModifierRecord> for Modifier {
    fn from(r: ModifierRecord) -> Self {
        let unit_value = r
            .unit_value
            .unwrap_or_else(|| derive_unit_value(&r.name, r.category));
        Modifier::with_parts(
            r.id,
            r.name,
            r.target_stat,
            r.unit_weight,
            unit_value,
            r.category,
            r.price,
        )
    }
}

/// First integer embedded in the name ("Rune Vi 3" -> 3), else the category default.
pub fn derive_unit_value(name: &str, category: ModifierCategory) -> i64 {
    name.split(|c: char| !c.is_ascii_digit())
        .find(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| category.default_unit_value())
}

/// Validation errors for caller-supplied input.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Names must not be blank.
    #[error("name must not be blank")]
    BlankName,
    /// Price or multiplier must be non-negative.
    #[error("negative monetary value is invalid")]
    NegativeMoney,
    /// At least one target stat is required.
    #[error("target stats must not be empty")]
    EmptyTargets,
    /// A stat was given twice in one mapping.
    #[error("stat `{0}` given more than once")]
    DuplicateStat(String),
    /// Removal amounts must be non-negative.
    #[error("removal amount for `{0}` must be >= 0")]
    NegativeRemoval(String),
    /// A modifier must cost capacity.
    #[error("modifier {0} must have a positive unit weight")]
    NonPositiveWeight(u32),
    /// A modifier must deliver something.
    #[error("modifier {0} must have a positive unit value")]
    NonPositiveValue(u32),
    /// Two catalog entries share an id.
    #[error("duplicate modifier id: {0}")]
    DuplicateModifier(u32),
    /// Overflow caps must be non-negative.
    #[error("overflow cap for `{0}` must be >= 0")]
    NegativeOverflow(String),
    /// Configuration document could not be parsed.
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Validate an item record.
pub fn validate_item(item: &Item) -> Result<(), ValidationError> {
    if item.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    if item.base_price.is_some_and(|p| p < Decimal::ZERO) {
        return Err(ValidationError::NegativeMoney);
    }
    Ok(())
}

/// Validate a single modifier.
pub fn validate_modifier(m: &Modifier) -> Result<(), ValidationError> {
    if m.name.trim().is_empty() {
        return Err(ValidationError::BlankName);
    }
    if m.unit_weight == 0 {
        return Err(ValidationError::NonPositiveWeight(m.id));
    }
    if m.unit_value <= 0 {
        return Err(ValidationError::NonPositiveValue(m.id));
    }
    if m.price < Decimal::ZERO {
        return Err(ValidationError::NegativeMoney);
    }
    Ok(())
}

/// Validate every modifier and require unique ids.
pub fn validate_catalog(modifiers: &[Modifier]) -> Result<(), ValidationError> {
    let mut ids = BTreeSet::new();
    for m in modifiers {
        validate_modifier(m)?;
        if !ids.insert(m.id) {
            return Err(ValidationError::DuplicateModifier(m.id));
        }
    }
    Ok(())
}

/// Validate an analysis request: non-empty targets and non-negative removals.
pub fn validate_request(
    item: &Item,
    targets: &StatMap,
    removals: &StatMap,
) -> Result<(), ValidationError> {
    validate_item(item)?;
    if targets.is_empty() {
        return Err(ValidationError::EmptyTargets);
    }
    if let Some((stat, _)) = removals.iter().find(|(_, v)| *v < 0) {
        return Err(ValidationError::NegativeRemoval(stat.0.clone()));
    }
    Ok(())
}
