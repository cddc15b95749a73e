//! Stat identifier module.
//!
//! Provides the `StatId` type, the stable key a [`StatDefinition`](crate::StatDefinition)
//! is looked up by. Uses `Arc<str>` so cloning a key is a reference count bump.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::sync::Arc;

/// Interned string identifier for stats.
///
/// Two `StatId`s compare equal when their text is equal. A key that is
/// empty or only whitespace is *invalid*: every container operation treats
/// a definition with such a key as absent.
///
/// # Examples
///
/// ```rust
/// use zzattr::StatId;
///
/// let hp = StatId::from_str("HP");
/// let hp2: StatId = "HP".into();
/// let hp3: StatId = String::from("HP").into();
///
/// assert_eq!(hp, hp2);
/// assert_eq!(hp, hp3);
/// assert!(hp.is_valid());
/// assert!(!StatId::from_str("   ").is_valid());
/// ```
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct StatId(Arc<str>);

impl Serialize for StatId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.0.as_ref().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for StatId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(StatId::from(s))
    }
}

impl StatId {
    /// Create a new `StatId` from a string slice.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Self {
        Self(Arc::from(s))
    }

    /// Get the string representation of this `StatId`.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this key can be used for lookups (not empty, not whitespace).
    pub fn is_valid(&self) -> bool {
        !self.0.trim().is_empty()
    }
}

impl From<&str> for StatId {
    fn from(s: &str) -> Self {
        Self::from_str(s)
    }
}

impl From<String> for StatId {
    fn from(s: String) -> Self {
        Self(Arc::from(s))
    }
}

impl std::fmt::Display for StatId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stat_id_creation() {
        let id1 = StatId::from_str("HP");
        let id2 = StatId::from_str("HP");
        assert_eq!(id1, id2);
        assert_eq!(id1.as_str(), "HP");
    }

    #[test]
    fn test_stat_id_validity() {
        assert!(StatId::from_str("MoveSpeed").is_valid());
        assert!(!StatId::from_str("").is_valid());
        assert!(!StatId::from_str(" \t").is_valid());
    }

    #[test]
    fn test_stat_id_serde() {
        let id = StatId::from_str("Damage");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"Damage\"");
        let back: StatId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }
}
