//! Modifiers module.
//!
//! A [`StatModifier`] is an immutable adjustment attached to one stat.
//! Modifiers can be tagged with the identity of an [`EffectSource`] so that
//! everything a buff, item or upgrade added can be removed in one call.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Weak};

/// How a modifier combines with the base value.
///
/// Kinds are evaluated in declaration order: all `Flat` first, then all
/// `PercentAdd`, then every `Mult` one at a time.
///
/// # Examples
///
/// ```rust
/// use zzattr::ModifierKind;
///
/// assert!(ModifierKind::Flat < ModifierKind::PercentAdd);
/// assert!(ModifierKind::PercentAdd < ModifierKind::Mult);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ModifierKind {
    /// Added to the base value before any percentage. `+5` damage.
    Flat,
    /// Summed with the other additive percentages, then applied once.
    /// `0.10` means +10%.
    PercentAdd,
    /// Applied one by one, compounding. `0.10` means ×1.10.
    Mult,
}

impl fmt::Display for ModifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModifierKind::Flat => write!(f, "Flat"),
            ModifierKind::PercentAdd => write!(f, "PercentAdd"),
            ModifierKind::Mult => write!(f, "Mult"),
        }
    }
}

struct SourceInner {
    label: String,
}

/// An owning identity token for anything that applies modifiers.
///
/// Clones share identity. Two sources created separately are always
/// distinct, even with the same label.
///
/// # Examples
///
/// ```rust
/// use zzattr::EffectSource;
///
/// let haste = EffectSource::new("haste");
/// let other = EffectSource::new("haste");
///
/// assert_eq!(haste, haste.clone());
/// assert_ne!(haste, other);
/// ```
#[derive(Clone)]
pub struct EffectSource {
    inner: Arc<SourceInner>,
}

impl EffectSource {
    /// Create a new, unique source.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(SourceInner {
                label: label.into(),
            }),
        }
    }

    /// Human-readable label, used for logging only.
    pub fn label(&self) -> &str {
        &self.inner.label
    }

    /// A non-owning key identifying this source.
    pub fn key(&self) -> SourceKey {
        SourceKey {
            inner: Arc::downgrade(&self.inner),
        }
    }
}

impl PartialEq for EffectSource {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for EffectSource {}

impl fmt::Debug for EffectSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EffectSource").field(&self.inner.label).finish()
    }
}

/// Non-owning reference to an [`EffectSource`], stored inside modifiers.
///
/// Equality is identity, never label equality. A key stays comparable after
/// its source has been dropped, so stale modifiers can still be found.
#[derive(Clone)]
pub struct SourceKey {
    inner: Weak<SourceInner>,
}

impl SourceKey {
    /// Whether the owning [`EffectSource`] still exists.
    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// The source label, if the source is still alive.
    pub fn label(&self) -> Option<String> {
        self.inner.upgrade().map(|inner| inner.label.clone())
    }
}

impl PartialEq for SourceKey {
    fn eq(&self, other: &Self) -> bool {
        Weak::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for SourceKey {}

impl fmt::Debug for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.label() {
            Some(label) => f.debug_tuple("SourceKey").field(&label).finish(),
            None => f.write_str("SourceKey(<dropped>)"),
        }
    }
}

impl From<&EffectSource> for SourceKey {
    fn from(source: &EffectSource) -> Self {
        source.key()
    }
}

impl From<&SourceKey> for SourceKey {
    fn from(key: &SourceKey) -> Self {
        key.clone()
    }
}

/// One immutable adjustment to a stat.
///
/// `order` breaks ties between modifiers of the same kind (ascending);
/// insertion order breaks the remaining ties.
///
/// # Examples
///
/// ```rust
/// use zzattr::{EffectSource, ModifierKind, StatModifier};
///
/// let rage = EffectSource::new("rage");
/// let modifier = StatModifier::percent_add(0.25)
///     .with_order(10)
///     .with_source(&rage);
///
/// assert_eq!(modifier.kind(), ModifierKind::PercentAdd);
/// assert_eq!(modifier.value(), 0.25);
/// assert_eq!(modifier.order(), 10);
/// assert!(modifier.is_from(&rage.key()));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StatModifier {
    kind: ModifierKind,
    value: f64,
    order: i32,
    source: Option<SourceKey>,
}

impl StatModifier {
    /// Create a modifier of the given kind with order `0` and no source.
    pub fn new(kind: ModifierKind, value: f64) -> Self {
        Self {
            kind,
            value,
            order: 0,
            source: None,
        }
    }

    /// Flat modifier: `+value`.
    pub fn flat(value: f64) -> Self {
        Self::new(ModifierKind::Flat, value)
    }

    /// Additive percentage: `0.1` is +10%, summed with the others.
    pub fn percent_add(value: f64) -> Self {
        Self::new(ModifierKind::PercentAdd, value)
    }

    /// Compounding multiplier: `0.1` is ×1.1.
    pub fn mult(value: f64) -> Self {
        Self::new(ModifierKind::Mult, value)
    }

    /// Set the tiebreak order within the same kind.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }

    /// Tag this modifier with a source for bulk removal.
    pub fn with_source(mut self, source: impl Into<SourceKey>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn kind(&self) -> ModifierKind {
        self.kind
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn order(&self) -> i32 {
        self.order
    }

    pub fn source(&self) -> Option<&SourceKey> {
        self.source.as_ref()
    }

    /// Whether this modifier was tagged with exactly `source`.
    pub fn is_from(&self, source: &SourceKey) -> bool {
        self.source.as_ref() == Some(source)
    }

    /// Whether this modifier's source has been dropped.
    pub(crate) fn has_dead_source(&self) -> bool {
        self.source.as_ref().is_some_and(|key| !key.is_alive())
    }
}

impl fmt::Display for StatModifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let source = self
            .source
            .as_ref()
            .and_then(SourceKey::label)
            .unwrap_or_else(|| String::from("none"));
        write!(
            f,
            "{} {} (order={}, source={})",
            self.kind, self.value, self.order, source
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_identity_not_label() {
        let a = EffectSource::new("aura");
        let b = EffectSource::new("aura");
        assert_eq!(a.key(), a.clone().key());
        assert_ne!(a.key(), b.key());
    }

    #[test]
    fn test_source_key_survives_drop() {
        let source = EffectSource::new("potion");
        let key = source.key();
        let modifier = StatModifier::flat(5.0).with_source(&source);
        assert!(key.is_alive());
        assert!(!modifier.has_dead_source());

        drop(source);
        assert!(!key.is_alive());
        assert_eq!(key.label(), None);
        assert!(modifier.is_from(&key));
        assert!(modifier.has_dead_source());
    }

    #[test]
    fn test_untagged_modifier_matches_nothing() {
        let source = EffectSource::new("x");
        let modifier = StatModifier::mult(0.5);
        assert!(!modifier.is_from(&source.key()));
        assert!(!modifier.has_dead_source());
    }

    #[test]
    fn test_modifier_display() {
        let source = EffectSource::new("shrine");
        let modifier = StatModifier::flat(3.0).with_order(2).with_source(&source);
        assert_eq!(modifier.to_string(), "Flat 3 (order=2, source=shrine)");
        assert_eq!(
            StatModifier::mult(0.5).to_string(),
            "Mult 0.5 (order=0, source=none)"
        );
    }
}
