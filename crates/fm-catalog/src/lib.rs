#![deny(warnings)]

//! Reference data for the forgemagerie engine: the rune catalog and a small
//! set of reference items.
//!
//! Both ship as embedded YAML documents and can be replaced by caller files
//! (YAML or JSON, picked by extension).

use fm_core::{
    validate_catalog, validate_item, Item, Modifier, ModifierCategory, ValidationError,
};
use serde::de::DeserializeOwned;
use std::collections::BTreeSet;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

const BUILTIN_RUNES: &str = include_str!("../../../assets/runes.yaml");
const BUILTIN_ITEMS: &str = include_str!("../../../assets/items.yaml");

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("io error: {0}")]
    Io(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("invalid entry: {0}")]
    Invalid(#[from] ValidationError),
    #[error("duplicate item id: {0}")]
    DuplicateItem(u32),
}

impl From<std::io::Error> for CatalogError {
    fn from(e: std::io::Error) -> Self {
        CatalogError::Io(e.to_string())
    }
}

impl From<serde_yaml::Error> for CatalogError {
    fn from(e: serde_yaml::Error) -> Self {
        CatalogError::Parse(e.to_string())
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(e: serde_json::Error) -> Self {
        CatalogError::Parse(e.to_string())
    }
}

fn read_records<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>, CatalogError> {
    let text = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(serde_yaml::from_str(&text)?)
    }
}

/// Validated, read-only list of runes.
#[derive(Clone, Debug, Default)]
pub struct ModifierCatalog {
    modifiers: Vec<Modifier>,
}

impl ModifierCatalog {
    /// Validate and wrap a list of runes.
    pub fn new(modifiers: Vec<Modifier>) -> Result<Self, CatalogError> {
        validate_catalog(&modifiers)?;
        Ok(Self { modifiers })
    }

    /// The embedded catalog: standard, greater, AP and exotic runes.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_yaml_str(BUILTIN_RUNES)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, CatalogError> {
        Self::new(serde_yaml::from_str(text)?)
    }

    pub fn from_json_str(text: &str) -> Result<Self, CatalogError> {
        Self::new(serde_json::from_str(text)?)
    }

    /// Load from a `.json` file, or YAML for any other extension.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let catalog = Self::new(read_records(path)?)?;
        info!(path = %path.display(), runes = catalog.len(), "rune catalog loaded");
        Ok(catalog)
    }

    pub fn as_slice(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn len(&self) -> usize {
        self.modifiers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modifiers.is_empty()
    }

    pub fn get(&self, id: u32) -> Option<&Modifier> {
        self.modifiers.iter().find(|m| m.id == id)
    }

    pub fn by_category(
        &self,
        category: ModifierCategory,
    ) -> impl Iterator<Item = &Modifier> + '_ {
        self.modifiers
            .iter()
            .filter(move |m| m.category == category)
    }

    pub fn for_stat<'a>(&'a self, stat: &'a str) -> impl Iterator<Item = &'a Modifier> + 'a {
        self.modifiers
            .iter()
            .filter(move |m| m.target_stat.as_str() == stat)
    }

    /// Stats at least one rune can raise, sorted.
    pub fn stats(&self) -> BTreeSet<&str> {
        self.modifiers.iter().map(|m| m.target_stat.as_str()).collect()
    }
}

/// Reference items keyed by id and searchable by name.
#[derive(Clone, Debug, Default)]
pub struct ItemCatalog {
    items: Vec<Item>,
}

impl ItemCatalog {
    pub fn new(items: Vec<Item>) -> Result<Self, CatalogError> {
        let mut ids = BTreeSet::new();
        for item in &items {
            validate_item(item)?;
            if !ids.insert(item.id) {
                return Err(CatalogError::DuplicateItem(item.id));
            }
        }
        debug!(items = items.len(), "item catalog ready");
        Ok(Self { items })
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(serde_yaml::from_str(BUILTIN_ITEMS)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        Self::new(read_records(path.as_ref())?)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn get(&self, id: u32) -> Option<&Item> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Items of one family, e.g. "Anneau", ignoring case.
    pub fn by_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |i| i.category.eq_ignore_ascii_case(category))
    }

    pub fn by_level(&self, levels: RangeInclusive<u32>) -> impl Iterator<Item = &Item> + '_ {
        self.items
            .iter()
            .filter(move |i| levels.contains(&i.level))
    }

    /// Items that naturally roll `stat`.
    pub fn with_stat<'a>(&'a self, stat: &'a str) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |i| i.max_stats.contains(stat))
    }

    /// Exact name match, ignoring case and surrounding whitespace.
    pub fn find_by_name(&self, name: &str) -> Option<&Item> {
        let name = name.trim().to_lowercase();
        self.items.iter().find(|i| i.name.to_lowercase() == name)
    }

    /// Items whose name contains `query`, ignoring case.
    pub fn search(&self, query: &str) -> Vec<&Item> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }
        self.items
            .iter()
            .filter(|i| i.name.to_lowercase().contains(&query))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    #[test]
    fn builtin_runes_parse_and_validate() {
        let c = ModifierCatalog::builtin().unwrap();
        assert_eq!(c.len(), 42);
        assert_eq!(c.by_category(ModifierCategory::Exotic).count(), 10);
        assert_eq!(c.by_category(ModifierCategory::Greater).count(), 8);
        let gvi = c.get(50).unwrap();
        assert_eq!(gvi.unit_value, 10);
        assert!((gvi.density() - 10.0 / 3.0).abs() < 1e-9);
        let pa = c.get(1).unwrap();
        assert_eq!(pa.unit_value, 1);
        assert_eq!(pa.price, Decimal::new(150_000, 0));
        assert_eq!(c.for_stat("vitalite").count(), 3);
        assert!(c.stats().contains("invocations"));
    }

    #[test]
    fn duplicate_rune_ids_are_rejected() {
        let yaml = r#"
- { id: 1, name: Rune Vi, target_stat: vitalite, unit_weight: 1, category: standard, price: 50 }
- { id: 1, name: Rune Fo, target_stat: force, unit_weight: 3, category: standard, price: 150 }
"#;
        assert!(matches!(
            ModifierCatalog::from_yaml_str(yaml),
            Err(CatalogError::Invalid(ValidationError::DuplicateModifier(1)))
        ));
    }

    #[test]
    fn json_catalog_with_explicit_value() {
        let json = r#"[{"id":7,"name":"Rune Vi","target_stat":"vitalite","unit_weight":1,
                        "unit_value":2,"category":"standard","price":"45.5"}]"#;
        let c = ModifierCatalog::from_json_str(json).unwrap();
        assert_eq!(c.get(7).map(|m| m.unit_value), Some(2));
        assert_eq!(c.get(7).map(|m| m.price), Some(Decimal::new(455, 1)));
    }

    #[test]
    fn malformed_document_is_a_parse_error() {
        assert!(matches!(
            ModifierCatalog::from_yaml_str("- id: [oops"),
            Err(CatalogError::Parse(_))
        ));
    }

    #[test]
    fn builtin_items_lookup() {
        let items = ItemCatalog::builtin().unwrap();
        let gelano = items.find_by_name("  gelano ").unwrap();
        assert_eq!(gelano.id, 2010);
        assert_eq!(gelano.capacity_total, 90);
        let first: Vec<&str> = gelano.base_stats.stats().map(|s| s.as_str()).take(2).collect();
        assert_eq!(first, ["vitalite", "force"]);
        assert_eq!(items.search("minotot").len(), 2);
        assert!(items.search("").is_empty());
        assert_eq!(items.get(2030).map(|i| i.name.as_str()), Some("Bottes du Bouftou Royal"));
    }

    #[test]
    fn item_filters() {
        let items = ItemCatalog::builtin().unwrap();
        let rings: Vec<u32> = items.by_category("anneau").map(|i| i.id).collect();
        assert_eq!(rings, [2010, 2011, 2012, 2013]);
        assert!(items.by_level(0..=0).next().is_none());
        assert_eq!(items.by_level(0..=200).count(), items.items().len());
        assert!(items.with_stat("vitalite").any(|i| i.id == 2010));
        assert!(items.with_stat("mystery").next().is_none());
    }

    #[test]
    fn files_load_by_extension() {
        let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets");
        let c = ModifierCatalog::load(root.join("runes.yaml")).unwrap();
        assert_eq!(c.len(), 42);
        assert!(matches!(
            ModifierCatalog::load(root.join("missing.json")),
            Err(CatalogError::Io(_))
        ));
        assert!(ItemCatalog::load(root.join("items.yaml")).is_ok());
    }
}
