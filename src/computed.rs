//! Computed stats.
//!
//! A computed stat is an ordinary stat whose *base* value is produced by a
//! [`StatFormula`] reading other stats. Modifiers still apply on top.

use crate::container::StatsContainer;
use crate::definition::StatDefinition;
use crate::stat_id::StatId;
use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Produces the base value of a computed stat.
///
/// Implemented for every `Fn(&mut StatsContainer) -> f64`, so closures can
/// be registered directly. Implement it by hand for formulas that carry
/// their own data.
///
/// # Examples
///
/// ```rust
/// use zzattr::{StatDefinition, StatFormula, StatsContainer};
///
/// struct Scaled {
///     stat: StatDefinition,
///     factor: f64,
/// }
///
/// impl StatFormula for Scaled {
///     fn compute(&self, stats: &mut StatsContainer) -> f64 {
///         stats.get_value(&self.stat, 0.0) * self.factor
///     }
/// }
///
/// let strength = StatDefinition::new("STR", 10.0);
/// let attack = StatDefinition::new("ATK", 0.0);
///
/// let mut stats = StatsContainer::new();
/// let formula = Scaled { stat: strength.clone(), factor: 2.5 };
/// stats.register_formula(&attack, formula, [&strength]).unwrap();
/// assert_eq!(stats.get_value(&attack, 0.0), 25.0);
/// ```
pub trait StatFormula: Send + Sync {
    fn compute(&self, stats: &mut StatsContainer) -> f64;
}

impl<F> StatFormula for F
where
    F: Fn(&mut StatsContainer) -> f64 + Send + Sync,
{
    fn compute(&self, stats: &mut StatsContainer) -> f64 {
        self(stats)
    }
}

/// Registration record for one computed stat.
pub(crate) struct ComputedStat {
    definition: StatDefinition,
    formula: Arc<dyn StatFormula>,
    dependency_keys: HashSet<StatId>,
    updating: Arc<AtomicBool>,
}

impl ComputedStat {
    pub(crate) fn new(
        definition: StatDefinition,
        formula: Arc<dyn StatFormula>,
        dependency_keys: HashSet<StatId>,
    ) -> Self {
        Self {
            definition,
            formula,
            dependency_keys,
            updating: Arc::new(AtomicBool::new(false)),
        }
    }

    pub(crate) fn definition(&self) -> &StatDefinition {
        &self.definition
    }

    pub(crate) fn formula(&self) -> Arc<dyn StatFormula> {
        Arc::clone(&self.formula)
    }

    pub(crate) fn depends_on(&self, key: &StatId) -> bool {
        self.dependency_keys.contains(key)
    }

    pub(crate) fn is_updating(&self) -> bool {
        self.updating.load(Ordering::Acquire)
    }

    /// Mark this stat as updating until the returned guard is dropped.
    ///
    /// Returns `None` if an update of this stat is already in progress.
    pub(crate) fn begin_update(&self) -> Option<UpdateGuard> {
        if self.updating.swap(true, Ordering::AcqRel) {
            return None;
        }
        Some(UpdateGuard {
            flag: Arc::clone(&self.updating),
        })
    }
}

impl fmt::Debug for ComputedStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComputedStat")
            .field("stat", self.definition.key())
            .field("dependency_keys", &self.dependency_keys)
            .field("updating", &self.is_updating())
            .finish_non_exhaustive()
    }
}

/// Clears the updating flag on drop, including during unwinding.
pub(crate) struct UpdateGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for UpdateGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ComputedStat {
        let formula: Arc<dyn StatFormula> = Arc::new(|_: &mut StatsContainer| 1.0);
        let deps = [StatId::from_str("A")].into_iter().collect();
        ComputedStat::new(StatDefinition::new("C", 0.0), formula, deps)
    }

    #[test]
    fn test_guard_is_exclusive() {
        let computed = entry();
        let guard = computed.begin_update();
        assert!(guard.is_some());
        assert!(computed.is_updating());
        assert!(computed.begin_update().is_none());

        drop(guard);
        assert!(!computed.is_updating());
        assert!(computed.begin_update().is_some());
    }

    #[test]
    fn test_guard_clears_on_panic() {
        let computed = entry();
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _guard = computed.begin_update();
            panic!("formula failed");
        }));
        assert!(result.is_err());
        assert!(!computed.is_updating());
    }

    #[test]
    fn test_depends_on() {
        let computed = entry();
        assert!(computed.depends_on(&StatId::from_str("A")));
        assert!(!computed.depends_on(&StatId::from_str("C")));
    }
}
