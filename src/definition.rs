//! Stat definitions.
//!
//! A [`StatDefinition`] is static schema data: the key a stat is stored
//! under, the base value a fresh instance starts from, and an optional
//! clamp range. Definitions are never mutated by the engine.

use crate::modifier::{EffectSource, ModifierKind, StatModifier};
use crate::stat_id::StatId;
use serde::{Deserialize, Serialize};

const DEFAULT_MAX_VALUE: f64 = 999_999.0;

fn default_max_value() -> f64 {
    DEFAULT_MAX_VALUE
}

fn default_upgrade_value() -> f64 {
    1.0
}

fn default_upgrade_kind() -> ModifierKind {
    ModifierKind::Flat
}

/// The increment upgrade systems apply to a stat when nothing more specific
/// is configured (for example on level up).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DefaultUpgrade {
    #[serde(default = "default_upgrade_kind")]
    pub kind: ModifierKind,
    /// `Flat`: `+value`. `PercentAdd`/`Mult`: `0.1` means +10%.
    #[serde(default = "default_upgrade_value")]
    pub value: f64,
    #[serde(default)]
    pub order: i32,
}

impl Default for DefaultUpgrade {
    fn default() -> Self {
        Self {
            kind: default_upgrade_kind(),
            value: default_upgrade_value(),
            order: 0,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct DefinitionData {
    key: StatId,
    #[serde(default)]
    default_base_value: f64,
    #[serde(default)]
    clamp: bool,
    #[serde(default)]
    min_value: f64,
    #[serde(default = "default_max_value")]
    max_value: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_upgrade: Option<DefaultUpgrade>,
}

impl From<DefinitionData> for StatDefinition {
    fn from(data: DefinitionData) -> Self {
        let definition = StatDefinition::new(data.key, data.default_base_value);
        let definition = if data.clamp {
            definition.with_clamp(data.min_value, data.max_value)
        } else {
            definition.with_range(data.min_value, data.max_value)
        };
        match data.default_upgrade {
            Some(upgrade) => definition.with_default_upgrade(upgrade),
            None => definition,
        }
    }
}

impl From<StatDefinition> for DefinitionData {
    fn from(definition: StatDefinition) -> Self {
        Self {
            key: definition.key,
            default_base_value: definition.default_base_value,
            clamp: definition.clamp,
            min_value: definition.min_value,
            max_value: definition.max_value,
            default_upgrade: definition.default_upgrade,
        }
    }
}

/// Immutable schema for one attribute.
///
/// If clamping is enabled, `max_value >= min_value` always holds: a max
/// below the min is raised to the min at construction.
///
/// # Examples
///
/// ```rust
/// use zzattr::StatDefinition;
///
/// let crit = StatDefinition::new("CritChance", 0.05).with_clamp(0.0, 1.0);
/// assert_eq!(crit.key().as_str(), "CritChance");
/// assert_eq!(crit.default_base_value(), 0.05);
/// assert!(crit.clamp());
///
/// let broken = StatDefinition::new("Armor", 0.0).with_clamp(10.0, 5.0);
/// assert_eq!(broken.max_value(), 10.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DefinitionData", into = "DefinitionData")]
pub struct StatDefinition {
    key: StatId,
    default_base_value: f64,
    clamp: bool,
    min_value: f64,
    max_value: f64,
    default_upgrade: Option<DefaultUpgrade>,
}

impl StatDefinition {
    /// Create an unclamped definition.
    ///
    /// The key is not validated here; a definition with an empty key is
    /// simply ignored by every container operation.
    pub fn new(key: impl Into<StatId>, default_base_value: f64) -> Self {
        Self {
            key: key.into(),
            default_base_value,
            clamp: false,
            min_value: 0.0,
            max_value: DEFAULT_MAX_VALUE,
            default_upgrade: None,
        }
    }

    /// Enable clamping of the final value into `[min, max]`.
    pub fn with_clamp(self, min: f64, max: f64) -> Self {
        Self {
            clamp: true,
            ..self.with_range(min, max)
        }
    }

    fn with_range(mut self, min: f64, max: f64) -> Self {
        self.min_value = min;
        self.max_value = if max < min { min } else { max };
        self
    }

    /// Attach the increment upgrade systems should use for this stat.
    pub fn with_default_upgrade(mut self, upgrade: DefaultUpgrade) -> Self {
        self.default_upgrade = Some(upgrade);
        self
    }

    pub fn key(&self) -> &StatId {
        &self.key
    }

    pub fn default_base_value(&self) -> f64 {
        self.default_base_value
    }

    pub fn clamp(&self) -> bool {
        self.clamp
    }

    pub fn min_value(&self) -> f64 {
        self.min_value
    }

    pub fn max_value(&self) -> f64 {
        self.max_value
    }

    pub fn default_upgrade(&self) -> Option<&DefaultUpgrade> {
        self.default_upgrade.as_ref()
    }

    /// Whether the key can be used for lookups.
    pub fn is_valid(&self) -> bool {
        self.key.is_valid()
    }

    /// Build the default upgrade modifier, tagged with `source` if given.
    ///
    /// Returns `None` when the definition has no default upgrade.
    pub fn default_upgrade_modifier(&self, source: Option<&EffectSource>) -> Option<StatModifier> {
        let upgrade = self.default_upgrade?;
        let modifier = StatModifier::new(upgrade.kind, upgrade.value).with_order(upgrade.order);
        Some(match source {
            Some(source) => modifier.with_source(source),
            None => modifier,
        })
    }
}
