//! Stat instances.
//!
//! A [`StatInstance`] owns one attribute's base value and modifier list and
//! caches the result of the evaluation pipeline:
//!
//! ```text
//! value = (base + Σ flat) × (1 + Σ percent_add) × Π (1 + mult_i)  → clamp
//! ```
//!
//! Modifiers are kept sorted by `(kind, order, insertion)` at all times, so
//! evaluation is deterministic down to floating-point rounding.

use crate::breakdown::StatBreakdown;
use crate::definition::StatDefinition;
use crate::handle::ModifierHandle;
use crate::modifier::{ModifierKind, SourceKey, StatModifier};
use crate::numeric::{clamp_value, has_changed, nearly_equal};

#[derive(Debug, Clone)]
struct ModifierEntry {
    id: u64,
    modifier: StatModifier,
}

impl ModifierEntry {
    fn sort_key(&self) -> (ModifierKind, i32, u64) {
        (self.modifier.kind(), self.modifier.order(), self.id)
    }
}

/// One attribute's live state.
///
/// Every mutation recomputes eagerly and records a pending change if the
/// final value moved by more than [`EPSILON`](crate::numeric::EPSILON).
/// The owner collects it with [`take_change`](Self::take_change).
///
/// # Examples
///
/// ```rust
/// use zzattr::{StatDefinition, StatInstance, StatModifier};
///
/// let mut damage = StatInstance::new(StatDefinition::new("Damage", 100.0));
/// let sword = damage.add_modifier(StatModifier::flat(15.0));
/// damage.add_modifier(StatModifier::percent_add(0.15));
///
/// assert!((damage.value() - 132.25).abs() < 1e-9);
///
/// assert!(damage.remove_modifier(sword));
/// assert!(!damage.remove_modifier(sword));
/// assert!((damage.value() - 115.0).abs() < 1e-9);
/// ```
#[derive(Debug, Clone)]
pub struct StatInstance {
    definition: StatDefinition,
    base_value: f64,
    modifiers: Vec<ModifierEntry>,
    cached_value: f64,
    dirty: bool,
    next_modifier_id: u64,
    pending_change: Option<f64>,
}

impl StatInstance {
    /// Create an instance seeded with the definition's default base value.
    pub fn new(definition: StatDefinition) -> Self {
        let base_value = definition.default_base_value();
        Self::with_base_value(definition, base_value)
    }

    /// Create an instance with an explicit base value.
    pub fn with_base_value(definition: StatDefinition, base_value: f64) -> Self {
        Self {
            definition,
            base_value,
            modifiers: Vec::new(),
            cached_value: 0.0,
            dirty: true,
            next_modifier_id: 1,
            pending_change: None,
        }
    }

    pub fn definition(&self) -> &StatDefinition {
        &self.definition
    }

    pub fn base_value(&self) -> f64 {
        self.base_value
    }

    /// Number of attached modifiers.
    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    /// Attached modifiers in evaluation order.
    pub fn modifiers(&self) -> impl Iterator<Item = (ModifierHandle, &StatModifier)> {
        self.modifiers
            .iter()
            .map(|entry| (ModifierHandle::new(entry.id), &entry.modifier))
    }

    /// Current value, recomputed first if the cache is stale.
    pub fn value(&mut self) -> f64 {
        if self.dirty {
            self.cached_value = self.evaluate();
            self.dirty = false;
        }
        self.cached_value
    }

    /// Overwrite the base value.
    ///
    /// A write within epsilon of the current base value is ignored.
    pub fn set_base_value(&mut self, value: f64) {
        if nearly_equal(self.base_value, value) {
            return;
        }
        let before = self.value();
        self.base_value = value;
        self.mark_dirty_and_notify(before);
    }

    /// Attach a modifier and return the handle that removes it.
    pub fn add_modifier(&mut self, modifier: StatModifier) -> ModifierHandle {
        let before = self.value();

        self.next_modifier_id += 1;
        let entry = ModifierEntry {
            id: self.next_modifier_id,
            modifier,
        };
        // Ids only grow, so the new entry sorts after every equal (kind, order).
        let key = entry.sort_key();
        let position = self.modifiers.partition_point(|e| e.sort_key() < key);
        self.modifiers.insert(position, entry);

        self.mark_dirty_and_notify(before);
        ModifierHandle::new(self.next_modifier_id)
    }

    /// Remove the modifier behind `handle`.
    ///
    /// Returns `false` for the invalid handle and for handles that were
    /// already removed.
    pub fn remove_modifier(&mut self, handle: ModifierHandle) -> bool {
        if !handle.is_valid() {
            return false;
        }
        let Some(position) = self.modifiers.iter().position(|e| e.id == handle.id()) else {
            return false;
        };

        let before = self.value();
        self.modifiers.remove(position);
        self.mark_dirty_and_notify(before);
        true
    }

    /// Remove every modifier tagged with exactly this source.
    ///
    /// Returns how many were removed. Notifies at most once.
    pub fn remove_all_from_source(&mut self, source: &SourceKey) -> usize {
        self.remove_where(|modifier| modifier.is_from(source))
    }

    /// Remove every modifier whose source has been dropped.
    pub fn remove_dead_sources(&mut self) -> usize {
        self.remove_where(StatModifier::has_dead_source)
    }

    fn remove_where(&mut self, mut predicate: impl FnMut(&StatModifier) -> bool) -> usize {
        let before = self.value();
        let count = self.modifiers.len();
        self.modifiers.retain(|entry| !predicate(&entry.modifier));
        let removed = count - self.modifiers.len();

        if removed > 0 {
            self.mark_dirty_and_notify(before);
        }
        removed
    }

    /// Take the value of the last net change since the previous call.
    pub fn take_change(&mut self) -> Option<f64> {
        self.pending_change.take()
    }

    /// Evaluate the pipeline and record every intermediate value.
    pub fn breakdown(&self) -> StatBreakdown {
        let flat_sum = self.sum_of(ModifierKind::Flat);
        let after_flat = self.base_value + flat_sum;

        let percent_add_sum = self.sum_of(ModifierKind::PercentAdd);
        let after_percent_add = after_flat * (1.0 + percent_add_sum);

        let multipliers: Vec<f64> = self
            .of_kind(ModifierKind::Mult)
            .map(StatModifier::value)
            .collect();
        let after_mult = multipliers
            .iter()
            .fold(after_percent_add, |value, m| value * (1.0 + m));

        let value = self.apply_clamp(after_mult);
        StatBreakdown {
            stat_id: self.definition.key().clone(),
            base_value: self.base_value,
            flat_sum,
            after_flat,
            percent_add_sum,
            after_percent_add,
            multipliers,
            after_mult,
            clamped: value != after_mult,
            value,
        }
    }

    fn evaluate(&self) -> f64 {
        let mut value = self.base_value;
        value += self.sum_of(ModifierKind::Flat);
        value *= 1.0 + self.sum_of(ModifierKind::PercentAdd);
        for modifier in self.of_kind(ModifierKind::Mult) {
            value *= 1.0 + modifier.value();
        }
        self.apply_clamp(value)
    }

    fn apply_clamp(&self, value: f64) -> f64 {
        if self.definition.clamp() {
            clamp_value(value, self.definition.min_value(), self.definition.max_value())
        } else {
            value
        }
    }

    fn of_kind(&self, kind: ModifierKind) -> impl Iterator<Item = &StatModifier> {
        self.modifiers
            .iter()
            .map(|entry| &entry.modifier)
            .filter(move |modifier| modifier.kind() == kind)
    }

    fn sum_of(&self, kind: ModifierKind) -> f64 {
        self.of_kind(kind).fold(0.0, |sum, modifier| sum + modifier.value())
    }

    fn mark_dirty_and_notify(&mut self, before: f64) {
        self.dirty = true;
        let after = self.value();
        if has_changed(before, after) {
            self.pending_change = Some(after);
        }
    }
}
