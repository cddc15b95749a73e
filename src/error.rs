//! Error types.
//!
//! Everyday misuse (unknown keys, stale handles, invalid definitions) never
//! produces an error: those paths return a neutral value instead. `StatError`
//! only covers structural failures: dependency cycles and bad schema data.

use crate::stat_id::StatId;
use thiserror::Error;

/// Format a cycle path as a readable string.
fn format_cycle_path(path: &[StatId]) -> String {
    if path.is_empty() {
        return String::from("(empty cycle)");
    }
    path.iter()
        .map(|id| id.as_str())
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// Errors returned by the fallible parts of the engine.
///
/// # Examples
///
/// ```rust
/// use zzattr::{StatError, StatId};
///
/// let err = StatError::UnknownStat(StatId::from_str("HP"));
/// assert_eq!(err.to_string(), "Unknown stat: HP");
/// ```
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StatError {
    /// Registering a computed stat would close a dependency cycle.
    ///
    /// The path starts and ends with the same stat, e.g. `[A, B, A]`.
    #[error("Cycle detected: {}", format_cycle_path(.path))]
    Cycle { path: Vec<StatId> },

    /// A config entry references a key the catalog does not define.
    #[error("Unknown stat: {0}")]
    UnknownStat(StatId),

    /// A catalog declares the same key more than once.
    #[error("Duplicate stat definition: {0}")]
    DuplicateStat(StatId),

    /// Schema data could not be parsed or is structurally invalid.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

impl From<serde_json::Error> for StatError {
    fn from(err: serde_json::Error) -> Self {
        StatError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StatError::DuplicateStat(StatId::from_str("HP"));
        assert!(err.to_string().contains("HP"));
    }

    #[test]
    fn test_cycle_error_display() {
        let a = StatId::from_str("A");
        let b = StatId::from_str("B");
        let c = StatId::from_str("C");
        let err = StatError::Cycle {
            path: vec![a.clone(), b, c, a],
        };
        assert_eq!(err.to_string(), "Cycle detected: A -> B -> C -> A");
    }

    #[test]
    fn test_empty_cycle_display() {
        let err = StatError::Cycle { path: Vec::new() };
        assert!(err.to_string().contains("(empty cycle)"));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        let err: StatError = json_err.into();
        assert!(matches!(err, StatError::InvalidConfig(_)));
    }
}
