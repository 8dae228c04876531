//! Insertion-ordered stat mapping.

use crate::{StatId, ValidationError};
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Stat name to integer value, iterated in insertion order.
///
/// Order matters: when capacity runs low, the stat inserted first is serviced
/// first. Keys are unique; inserting an existing key replaces its value in place.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatMap {
    entries: Vec<(StatId, i64)>,
}

impl StatMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a value. Returns the previous value if the stat was present.
    pub fn insert(&mut self, stat: impl Into<StatId>, value: i64) -> Option<i64> {
        let stat = stat.into();
        match self.entries.iter_mut().find(|(s, _)| *s == stat) {
            Some((_, v)) => Some(std::mem::replace(v, value)),
            None => {
                self.entries.push((stat, value));
                None
            }
        }
    }

    pub fn get(&self, stat: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(s, _)| s.as_str() == stat)
            .map(|(_, v)| *v)
    }

    /// Value of `stat`, or 0 when absent.
    pub fn value_or_zero(&self, stat: &str) -> i64 {
        self.get(stat).unwrap_or(0)
    }

    pub fn contains(&self, stat: &str) -> bool {
        self.get(stat).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&StatId, i64)> + '_ {
        self.entries.iter().map(|(s, v)| (s, *v))
    }

    pub fn stats(&self) -> impl Iterator<Item = &StatId> + '_ {
        self.entries.iter().map(|(s, _)| s)
    }

    /// Build from caller pairs, rejecting a stat that appears twice.
    pub fn try_from_pairs<S, I>(pairs: I) -> Result<Self, ValidationError>
    where
        S: Into<StatId>,
        I: IntoIterator<Item = (S, i64)>,
    {
        let mut map = StatMap::new();
        for (stat, value) in pairs {
            let stat = stat.into();
            if map.contains(stat.as_str()) {
                return Err(ValidationError::DuplicateStat(stat.0));
            }
            map.entries.push((stat, value));
        }
        Ok(map)
    }

    /// New map with the same keys in the same order and transformed values.
    pub fn map_values(&self, f: impl Fn(i64) -> i64) -> StatMap {
        StatMap {
            entries: self.entries.iter().map(|(s, v)| (s.clone(), f(*v))).collect(),
        }
    }
}

impl<S: Into<StatId>> FromIterator<(S, i64)> for StatMap {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut map = StatMap::new();
        for (stat, value) in iter {
            map.insert(stat, value);
        }
        map
    }
}

impl Serialize for StatMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (stat, value) in &self.entries {
            map.serialize_entry(stat.as_str(), value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for StatMap {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct StatMapVisitor;

        impl<'de> Visitor<'de> for StatMapVisitor {
            type Value = StatMap;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map of stat names to integer values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<StatMap, A::Error> {
                let mut map = StatMap::new();
                while let Some((stat, value)) = access.next_entry::<String, i64>()? {
                    if map.contains(&stat) {
                        return Err(serde::de::Error::custom(format!(
                            "duplicate stat `{stat}`"
                        )));
                    }
                    map.insert(stat, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(StatMapVisitor)
    }
}
