//! Modifier bundles.
//!
//! A [`ModifierApplier`] groups the modifiers one effect grants (a buff, an
//! item, an aura) under a single [`EffectSource`]. Enabling it adds them,
//! disabling it removes them all, and entries with a duration expire on
//! their own as the host advances time with [`ModifierApplier::tick`].

use crate::container::StatsContainer;
use crate::definition::StatDefinition;
use crate::handle::ModifierHandle;
use crate::modifier::{EffectSource, ModifierKind, StatModifier};
use std::time::Duration;
use tracing::debug;

/// One modifier an applier grants.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplierEntry {
    pub stat: StatDefinition,
    pub kind: ModifierKind,
    pub value: f64,
    pub order: i32,
    /// `None` lasts until the applier is disabled.
    pub duration: Option<Duration>,
}

impl ApplierEntry {
    /// A permanent entry with order `0`.
    pub fn new(stat: StatDefinition, kind: ModifierKind, value: f64) -> Self {
        Self {
            stat,
            kind,
            value,
            order: 0,
            duration: None,
        }
    }

    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    pub fn lasting(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }
}

#[derive(Debug)]
struct Timer {
    stat: StatDefinition,
    handle: ModifierHandle,
    remaining: Duration,
}

/// Applies and removes a bundle of modifiers as one effect.
///
/// # Examples
///
/// ```rust
/// use std::time::Duration;
/// use zzattr::{ApplierEntry, ModifierApplier, ModifierKind, StatDefinition, StatsContainer};
///
/// let speed = StatDefinition::new("Speed", 10.0);
/// let mut stats = StatsContainer::new();
///
/// let mut haste = ModifierApplier::new(
///     "haste",
///     vec![ApplierEntry::new(speed.clone(), ModifierKind::PercentAdd, 0.5)
///         .lasting(Duration::from_secs(3))],
/// );
///
/// haste.enable(&mut stats);
/// assert_eq!(stats.get_value(&speed, 0.0), 15.0);
///
/// haste.tick(&mut stats, Duration::from_secs(2));
/// assert_eq!(stats.get_value(&speed, 0.0), 15.0);
///
/// haste.tick(&mut stats, Duration::from_secs(1));
/// assert_eq!(stats.get_value(&speed, 0.0), 10.0);
/// ```
#[derive(Debug)]
pub struct ModifierApplier {
    source: EffectSource,
    entries: Vec<ApplierEntry>,
    remove_on_disable: bool,
    enabled: bool,
    timers: Vec<Timer>,
}

impl ModifierApplier {
    pub fn new(label: impl Into<String>, entries: Vec<ApplierEntry>) -> Self {
        Self {
            source: EffectSource::new(label),
            entries,
            remove_on_disable: true,
            enabled: false,
            timers: Vec::new(),
        }
    }

    /// Keep the modifiers in place when the applier is disabled.
    pub fn with_remove_on_disable(mut self, remove_on_disable: bool) -> Self {
        self.remove_on_disable = remove_on_disable;
        self
    }

    /// The identity every granted modifier is tagged with.
    pub fn source(&self) -> &EffectSource {
        &self.source
    }

    pub fn entries(&self) -> &[ApplierEntry] {
        &self.entries
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Number of timed modifiers still running.
    pub fn active_timers(&self) -> usize {
        self.timers.len()
    }

    /// Add every entry to `stats`. Does nothing if already enabled.
    ///
    /// Returns the number of modifiers added.
    pub fn enable(&mut self, stats: &mut StatsContainer) -> usize {
        if self.enabled {
            return 0;
        }
        self.enabled = true;

        let mut applied = 0;
        for entry in &self.entries {
            let modifier = StatModifier::new(entry.kind, entry.value)
                .with_order(entry.order)
                .with_source(&self.source);
            let handle = stats.add_modifier(&entry.stat, modifier);
            if !handle.is_valid() {
                continue;
            }
            applied += 1;
            if let Some(remaining) = entry.duration {
                self.timers.push(Timer {
                    stat: entry.stat.clone(),
                    handle,
                    remaining,
                });
            }
        }
        debug!(source = self.source.label(), applied, "enabled modifier applier");
        applied
    }

    /// Advance timed entries by `elapsed` and remove the ones that ran out.
    ///
    /// Returns the number of modifiers removed.
    pub fn tick(&mut self, stats: &mut StatsContainer, elapsed: Duration) -> usize {
        let mut expired = 0;
        self.timers.retain_mut(|timer| {
            timer.remaining = timer.remaining.saturating_sub(elapsed);
            if !timer.remaining.is_zero() {
                return true;
            }
            if stats.remove_modifier(&timer.stat, timer.handle) {
                expired += 1;
            }
            false
        });
        expired
    }

    /// Stop the effect.
    ///
    /// Removes every modifier tagged with this applier's source unless
    /// `remove_on_disable` is off. Returns the number removed.
    pub fn disable(&mut self, stats: &mut StatsContainer) -> usize {
        if !self.enabled {
            return 0;
        }
        self.enabled = false;
        self.timers.clear();

        if !self.remove_on_disable {
            return 0;
        }
        let removed = stats.remove_all_from_source(&self.source);
        debug!(source = self.source.label(), removed, "disabled modifier applier");
        removed
    }
}
