//! Stats container module.
//!
//! Provides the `StatsContainer` type, the registry one subject (a player,
//! an enemy) owns. It is the only surface gameplay code talks to: reads,
//! base writes, modifiers, computed stats and change notifications all go
//! through it.
//!
//! When an instance's value changes the container first notifies its
//! subscribers, then refreshes every computed stat that declared a
//! dependency on the changed key. Refreshing sets that stat's base value,
//! which may in turn notify and refresh further dependents.

use crate::breakdown::StatBreakdown;
use crate::computed::{ComputedStat, StatFormula};
use crate::config::StatsConfig;
use crate::definition::StatDefinition;
use crate::error::StatError;
use crate::graph::DependencyGraph;
use crate::handle::ModifierHandle;
use crate::instance::StatInstance;
use crate::modifier::{EffectSource, SourceKey, StatModifier};
use crate::stat_id::StatId;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace, warn};

/// A net change of one stat's value.
#[derive(Debug, Clone, PartialEq)]
pub struct StatChanged {
    pub definition: StatDefinition,
    pub value: f64,
}

/// Identifies one listener registered with [`StatsContainer::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&StatChanged) + Send>;

fn valid(definition: &StatDefinition) -> bool {
    definition.is_valid()
}

/// Registry of one subject's stats.
///
/// Instances are created lazily, seeded with the definition's default base
/// value, the first time any operation touches their key. A definition
/// with an empty key makes reads return the fallback and writes do nothing.
///
/// # Examples
///
/// ```rust
/// use zzattr::{StatDefinition, StatModifier, StatsContainer};
///
/// let damage = StatDefinition::new("Damage", 10.0);
/// let mut stats = StatsContainer::new();
///
/// let handle = stats.add_modifier(&damage, StatModifier::flat(5.0));
/// assert_eq!(stats.get_value(&damage, 0.0), 15.0);
///
/// assert!(stats.remove_modifier(&damage, handle));
/// assert_eq!(stats.get_value(&damage, 0.0), 10.0);
///
/// assert_eq!(stats.get_value(None::<&StatDefinition>, 42.0), 42.0);
/// ```
#[derive(Default)]
pub struct StatsContainer {
    stats: HashMap<StatId, StatInstance>,
    computed: HashMap<StatId, ComputedStat>,
    graph: DependencyGraph,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl StatsContainer {
    /// Create an empty container.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether an instance already exists for this definition's key.
    pub fn has(&self, definition: &StatDefinition) -> bool {
        valid(definition) && self.stats.contains_key(definition.key())
    }

    /// Number of live stat instances.
    pub fn len(&self) -> usize {
        self.stats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stats.is_empty()
    }

    /// Keys of every live instance, in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &StatId> {
        self.stats.keys()
    }

    /// The instance for this definition, if it exists.
    pub fn instance(&self, definition: &StatDefinition) -> Option<&StatInstance> {
        self.stats.get(definition.key())
    }

    /// Current value of a stat.
    ///
    /// Returns `fallback` for `None` or a definition with an invalid key;
    /// otherwise creates the instance if needed and returns its value.
    pub fn get_value<'a>(
        &mut self,
        definition: impl Into<Option<&'a StatDefinition>>,
        fallback: f64,
    ) -> f64 {
        match definition.into() {
            Some(definition) if valid(definition) => self.instance_mut(definition).value(),
            _ => fallback,
        }
    }

    /// Unmodified base value, if the instance exists.
    pub fn base_value(&self, definition: &StatDefinition) -> Option<f64> {
        self.stats
            .get(definition.key())
            .map(StatInstance::base_value)
    }

    /// Number of modifiers attached to a stat (0 if it does not exist).
    pub fn modifier_count(&self, definition: &StatDefinition) -> usize {
        self.stats
            .get(definition.key())
            .map_or(0, StatInstance::modifier_count)
    }

    /// Overwrite a stat's base value.
    pub fn set_base_value(&mut self, definition: &StatDefinition, value: f64) {
        if !valid(definition) {
            return;
        }
        self.instance_mut(definition).set_base_value(value);
        self.flush_change(definition.key());
    }

    /// Attach a modifier. Returns the invalid handle for an invalid definition.
    pub fn add_modifier(
        &mut self,
        definition: &StatDefinition,
        modifier: StatModifier,
    ) -> ModifierHandle {
        if !valid(definition) {
            return ModifierHandle::default();
        }
        let handle = self.instance_mut(definition).add_modifier(modifier);
        self.flush_change(definition.key());
        handle
    }

    /// Remove one modifier by handle. `false` if nothing was removed.
    pub fn remove_modifier(&mut self, definition: &StatDefinition, handle: ModifierHandle) -> bool {
        if !valid(definition) {
            return false;
        }
        let Some(instance) = self.stats.get_mut(definition.key()) else {
            return false;
        };
        let removed = instance.remove_modifier(handle);
        if removed {
            self.flush_change(definition.key());
        }
        removed
    }

    /// Remove every modifier tagged with `source` from every stat.
    ///
    /// Returns the total number removed.
    pub fn remove_all_from_source(&mut self, source: impl Into<SourceKey>) -> usize {
        let source = source.into();
        let removed = self.remove_from_all(|instance| instance.remove_all_from_source(&source));
        if removed > 0 {
            debug!(source = ?source, removed, "removed modifiers by source");
        }
        removed
    }

    /// Remove every modifier whose [`EffectSource`] has been dropped.
    pub fn prune_dead_sources(&mut self) -> usize {
        let removed = self.remove_from_all(StatInstance::remove_dead_sources);
        if removed > 0 {
            debug!(removed, "pruned modifiers of dropped sources");
        }
        removed
    }

    fn remove_from_all(&mut self, mut remove: impl FnMut(&mut StatInstance) -> usize) -> usize {
        let keys: Vec<StatId> = self.stats.keys().cloned().collect();
        let mut total = 0;
        for key in keys {
            if let Some(instance) = self.stats.get_mut(&key) {
                total += remove(instance);
            }
            self.flush_change(&key);
        }
        total
    }

    /// Seed base values from configuration data.
    pub fn apply_config(&mut self, config: &StatsConfig) {
        let mut applied = 0usize;
        for (definition, base_value) in config.enumerate() {
            self.set_base_value(definition, base_value);
            applied += 1;
        }
        debug!(applied, "applied stats config");
    }

    /// Add the default upgrade of every configured stat that has one.
    ///
    /// Each modifier is tagged with `source`. Returns the handles in config
    /// order.
    pub fn apply_default_upgrades(
        &mut self,
        config: &StatsConfig,
        source: &EffectSource,
    ) -> Vec<ModifierHandle> {
        let mut handles = Vec::new();
        for (definition, _) in config.enumerate() {
            if let Some(modifier) = definition.default_upgrade_modifier(Some(source)) {
                handles.push(self.add_modifier(definition, modifier));
            }
        }
        debug!(source = source.label(), upgrades = handles.len(), "applied default upgrades");
        handles
    }

    /// Register `definition` as a computed stat driven by a closure.
    ///
    /// See [`register_formula`](Self::register_formula).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use zzattr::{StatDefinition, StatsContainer};
    ///
    /// let a = StatDefinition::new("A", 10.0);
    /// let b = StatDefinition::new("B", 20.0);
    /// let c = StatDefinition::new("C", 0.0);
    ///
    /// let mut stats = StatsContainer::new();
    /// let (da, db) = (a.clone(), b.clone());
    /// stats
    ///     .register_computed(&c, move |s| s.get_value(&da, 0.0) + s.get_value(&db, 0.0), [&a, &b])
    ///     .unwrap();
    /// assert_eq!(stats.get_value(&c, 0.0), 30.0);
    ///
    /// stats.set_base_value(&a, 15.0);
    /// assert_eq!(stats.get_value(&c, 0.0), 35.0);
    /// ```
    pub fn register_computed<'a, F>(
        &mut self,
        definition: &StatDefinition,
        formula: F,
        dependencies: impl IntoIterator<Item = &'a StatDefinition>,
    ) -> Result<(), StatError>
    where
        F: Fn(&mut StatsContainer) -> f64 + Send + Sync + 'static,
    {
        self.install_computed(definition, Arc::new(formula), dependencies)
    }

    /// Register `definition` as a computed stat.
    ///
    /// The formula is evaluated immediately and becomes the stat's base
    /// value. Afterwards it is re-evaluated whenever one of `dependencies`
    /// changes. A dependency on the stat itself is ignored. Registering an
    /// already computed stat replaces its formula and dependencies.
    ///
    /// # Errors
    ///
    /// Returns `StatError::Cycle` if the dependencies would close a cycle
    /// with other computed stats. Nothing is changed in that case.
    pub fn register_formula<'a>(
        &mut self,
        definition: &StatDefinition,
        formula: impl StatFormula + 'static,
        dependencies: impl IntoIterator<Item = &'a StatDefinition>,
    ) -> Result<(), StatError> {
        self.install_computed(definition, Arc::new(formula), dependencies)
    }

    fn install_computed<'a>(
        &mut self,
        definition: &StatDefinition,
        formula: Arc<dyn StatFormula>,
        dependencies: impl IntoIterator<Item = &'a StatDefinition>,
    ) -> Result<(), StatError> {
        if !valid(definition) {
            return Ok(());
        }
        let key = definition.key().clone();
        let dependency_keys: HashSet<StatId> = dependencies
            .into_iter()
            .filter(|dependency| valid(dependency) && dependency.key() != &key)
            .map(|dependency| dependency.key().clone())
            .collect();

        if let Err(err) = self
            .graph
            .set_dependencies(&key, dependency_keys.iter().cloned())
        {
            warn!(stat = %key, error = %err, "rejected computed stat");
            return Err(err);
        }

        debug!(stat = %key, dependencies = dependency_keys.len(), "registered computed stat");
        self.computed.insert(
            key.clone(),
            ComputedStat::new(definition.clone(), formula, dependency_keys),
        );

        self.instance_mut(definition);
        self.refresh_dependent(&key);
        Ok(())
    }

    /// Turn a computed stat back into a plain stat.
    ///
    /// The stat keeps its current base value and modifiers.
    pub fn unregister_computed(&mut self, definition: &StatDefinition) -> bool {
        let removed = self.computed.remove(definition.key()).is_some();
        if removed {
            self.graph.clear_dependencies(definition.key());
            debug!(stat = %definition.key(), "unregistered computed stat");
        }
        removed
    }

    /// Whether `definition` is currently registered as computed.
    pub fn is_computed(&self, definition: &StatDefinition) -> bool {
        self.computed.contains_key(definition.key())
    }

    /// Re-evaluate every computed stat, dependencies first.
    ///
    /// Needed only when formulas read state outside the container.
    pub fn refresh_computed(&mut self) {
        // The graph never holds a cycle, so the sort cannot fail.
        let order = self.graph.topological_sort().unwrap_or_default();
        for key in order {
            self.refresh_dependent(&key);
        }
    }

    /// Evaluation breakdown of a stat, if it exists.
    pub fn breakdown(&self, definition: &StatDefinition) -> Option<StatBreakdown> {
        self.stats.get(definition.key()).map(StatInstance::breakdown)
    }

    /// Register a listener for value changes.
    ///
    /// Listeners run synchronously, in subscription order, on every net
    /// change and before computed dependents are refreshed.
    pub fn subscribe(&mut self, listener: impl FnMut(&StatChanged) + Send + 'static) -> SubscriptionId {
        self.next_subscription += 1;
        let id = SubscriptionId(self.next_subscription);
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. `false` if it was not subscribed.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let count = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != count
    }

    fn instance_mut(&mut self, definition: &StatDefinition) -> &mut StatInstance {
        self.stats
            .entry(definition.key().clone())
            .or_insert_with(|| {
                debug!(stat = %definition.key(), base = definition.default_base_value(), "created stat instance");
                StatInstance::new(definition.clone())
            })
    }

    fn flush_change(&mut self, key: &StatId) {
        let Some(instance) = self.stats.get_mut(key) else {
            return;
        };
        let Some(value) = instance.take_change() else {
            return;
        };
        let event = StatChanged {
            definition: instance.definition().clone(),
            value,
        };
        trace!(stat = %key, value, "stat value changed");

        for (_, listener) in self.listeners.iter_mut() {
            listener(&event);
        }

        for dependent in self.graph.dependents_of(key) {
            let depends = self
                .computed
                .get(&dependent)
                .is_some_and(|computed| computed.depends_on(key));
            if depends {
                self.refresh_dependent(&dependent);
            }
        }
    }

    fn refresh_dependent(&mut self, key: &StatId) {
        let Some(computed) = self.computed.get(key) else {
            return;
        };
        let Some(_guard) = computed.begin_update() else {
            trace!(stat = %key, "skipped re-entrant refresh");
            return;
        };
        let formula = computed.formula();
        let definition = computed.definition().clone();

        let value = formula.compute(self);
        trace!(stat = %key, base = value, "refreshed computed stat");
        self.set_base_value(&definition, value);
    }
}

impl fmt::Debug for StatsContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatsContainer")
            .field("stats", &self.stats)
            .field("computed", &self.computed)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
