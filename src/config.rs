//! Schema data: stat catalogs and per-subject configs.
//!
//! A [`StatCatalog`] holds the shared [`StatDefinition`]s of a game. A
//! [`StatsConfig`] lists which stats a kind of subject starts with and at
//! what base value; [`StatsContainer::apply_config`](crate::StatsContainer::apply_config)
//! seeds a container from it. Both can be loaded from JSON.

use crate::definition::StatDefinition;
use crate::error::StatError;
use crate::stat_id::StatId;
use serde::Deserialize;
use std::collections::HashMap;

/// Shared definitions, looked up by key.
///
/// # Examples
///
/// ```rust
/// use zzattr::StatCatalog;
///
/// let catalog = StatCatalog::from_json(r#"{
///     "stats": [
///         { "key": "HP", "default_base_value": 100 },
///         { "key": "Crit", "default_base_value": 0.05, "clamp": true, "max_value": 1 }
///     ]
/// }"#).unwrap();
///
/// assert_eq!(catalog.len(), 2);
/// assert_eq!(catalog.get("HP").unwrap().default_base_value(), 100.0);
/// assert!(catalog.get("Mana").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct StatCatalog {
    definitions: HashMap<StatId, StatDefinition>,
    order: Vec<StatId>,
}

#[derive(Deserialize)]
struct CatalogData {
    stats: Vec<StatDefinition>,
}

impl StatCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a catalog of the form `{"stats": [definition, ...]}`.
    pub fn from_json(json: &str) -> Result<Self, StatError> {
        let data: CatalogData = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for definition in data.stats {
            catalog.insert(definition)?;
        }
        Ok(catalog)
    }

    /// Add a definition.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` for an empty key, `DuplicateStat` for a key that is
    /// already present.
    pub fn insert(&mut self, definition: StatDefinition) -> Result<(), StatError> {
        if !definition.is_valid() {
            return Err(StatError::InvalidConfig(format!(
                "stat definition with empty key `{}`",
                definition.key()
            )));
        }
        let key = definition.key().clone();
        if self.definitions.contains_key(&key) {
            return Err(StatError::DuplicateStat(key));
        }
        self.order.push(key.clone());
        self.definitions.insert(key, definition);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&StatDefinition> {
        self.definitions.get(&StatId::from_str(key))
    }

    /// Definitions in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &StatDefinition> {
        self.order.iter().filter_map(|key| self.definitions.get(key))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

/// One stat a subject starts with.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigEntry {
    pub stat: StatDefinition,
    pub base_value: f64,
    /// Use the definition's default base value instead of `base_value`.
    pub use_stat_default: bool,
}

impl ConfigEntry {
    /// Entry using the definition's default base value.
    pub fn new(stat: StatDefinition) -> Self {
        Self {
            stat,
            base_value: 0.0,
            use_stat_default: true,
        }
    }

    /// Entry with an explicit base value.
    pub fn with_base_value(stat: StatDefinition, base_value: f64) -> Self {
        Self {
            stat,
            base_value,
            use_stat_default: false,
        }
    }

    /// The base value this entry seeds.
    pub fn resolved_base_value(&self) -> f64 {
        if self.use_stat_default {
            self.stat.default_base_value()
        } else {
            self.base_value
        }
    }
}

#[derive(Deserialize)]
struct ConfigEntryData {
    stat: StatId,
    #[serde(default)]
    base_value: Option<f64>,
    #[serde(default)]
    use_stat_default: Option<bool>,
}

#[derive(Deserialize)]
struct ConfigData {
    entries: Vec<ConfigEntryData>,
}

/// Initial base values for one kind of subject.
///
/// # Examples
///
/// ```rust
/// use zzattr::{StatCatalog, StatsConfig, StatsContainer};
///
/// let catalog = StatCatalog::from_json(
///     r#"{"stats": [{"key": "HP", "default_base_value": 100}, {"key": "Speed", "default_base_value": 4}]}"#,
/// ).unwrap();
/// let config = StatsConfig::from_json(
///     r#"{"entries": [{"stat": "HP", "base_value": 250}, {"stat": "Speed"}]}"#,
///     &catalog,
/// ).unwrap();
///
/// let mut stats = StatsContainer::new();
/// stats.apply_config(&config);
///
/// let hp = catalog.get("HP").unwrap();
/// let speed = catalog.get("Speed").unwrap();
/// assert_eq!(stats.get_value(hp, 0.0), 250.0);
/// assert_eq!(stats.get_value(speed, 0.0), 4.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsConfig {
    pub entries: Vec<ConfigEntry>,
}

impl StatsConfig {
    pub fn new(entries: Vec<ConfigEntry>) -> Self {
        Self { entries }
    }

    /// Parse `{"entries": [{"stat": key, "base_value"?: n, "use_stat_default"?: b}]}`.
    ///
    /// `use_stat_default` defaults to `true` only when `base_value` is absent.
    pub fn from_json(json: &str, catalog: &StatCatalog) -> Result<Self, StatError> {
        let data: ConfigData = serde_json::from_str(json)?;
        let entries = data
            .entries
            .into_iter()
            .map(|entry| -> Result<ConfigEntry, StatError> {
                let stat = catalog
                    .get(entry.stat.as_str())
                    .cloned()
                    .ok_or_else(|| StatError::UnknownStat(entry.stat.clone()))?;
                Ok(ConfigEntry {
                    stat,
                    base_value: entry.base_value.unwrap_or_default(),
                    use_stat_default: entry
                        .use_stat_default
                        .unwrap_or(entry.base_value.is_none()),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { entries })
    }

    /// `(definition, base value)` for every entry with a valid definition.
    pub fn enumerate(&self) -> impl Iterator<Item = (&StatDefinition, f64)> {
        self.entries
            .iter()
            .filter(|entry| entry.stat.is_valid())
            .map(|entry| (&entry.stat, entry.resolved_base_value()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> StatCatalog {
        let mut catalog = StatCatalog::new();
        catalog.insert(StatDefinition::new("HP", 100.0)).unwrap();
        catalog.insert(StatDefinition::new("Damage", 12.0)).unwrap();
        catalog
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let mut catalog = catalog();
        let err = catalog.insert(StatDefinition::new("HP", 1.0)).unwrap_err();
        assert_eq!(err, StatError::DuplicateStat(StatId::from_str("HP")));
        assert_eq!(catalog.get("HP").unwrap().default_base_value(), 100.0);
    }

    #[test]
    fn test_catalog_rejects_empty_key() {
        let err = StatCatalog::from_json(r#"{"stats": [{"key": " "}]}"#).unwrap_err();
        assert!(matches!(err, StatError::InvalidConfig(_)));
    }

    #[test]
    fn test_catalog_malformed_json() {
        let err = StatCatalog::from_json("{").unwrap_err();
        assert!(matches!(err, StatError::InvalidConfig(_)));
    }

    #[test]
    fn test_catalog_iter_keeps_order() {
        let catalog = catalog();
        let keys: Vec<&str> = catalog.iter().map(|d| d.key().as_str()).collect();
        assert_eq!(keys, vec!["HP", "Damage"]);
    }

    #[test]
    fn test_config_unknown_stat() {
        let err = StatsConfig::from_json(r#"{"entries": [{"stat": "Mana"}]}"#, &catalog())
            .unwrap_err();
        assert_eq!(err, StatError::UnknownStat(StatId::from_str("Mana")));
    }

    #[test]
    fn test_config_use_stat_default_rules() {
        let config = StatsConfig::from_json(
            r#"{"entries": [
                {"stat": "HP"},
                {"stat": "Damage", "base_value": 30},
                {"stat": "HP", "base_value": 5, "use_stat_default": true}
            ]}"#,
            &catalog(),
        )
        .unwrap();

        let values: Vec<f64> = config.enumerate().map(|(_, v)| v).collect();
        assert_eq!(values, vec![100.0, 30.0, 100.0]);
    }

    #[test]
    fn test_enumerate_skips_invalid_definitions() {
        let config = StatsConfig::new(vec![
            ConfigEntry::new(StatDefinition::new("", 1.0)),
            ConfigEntry::with_base_value(StatDefinition::new("HP", 100.0), 80.0),
        ]);
        let entries: Vec<(&StatDefinition, f64)> = config.enumerate().collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].0.key().as_str(), "HP");
        assert_eq!(entries[0].1, 80.0);
    }
}
