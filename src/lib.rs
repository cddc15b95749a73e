//! # zzattr - Deterministic Attribute Engine
//!
//! A runtime for named numeric attributes ("stats") that provides:
//! - **Typed modifiers** (flat, additive percent, compounding multiplier)
//! - **Stable handles** for removing one modifier, and **source tags** for
//!   removing everything an effect granted
//! - **Cached, deterministic** evaluation with change notifications only on
//!   net changes
//! - **Computed stats** whose base value is derived from other stats and
//!   refreshed automatically when a dependency changes
//!
//! ## Core Concepts
//!
//! ### Evaluation Pipeline
//!
//! ```text
//! base → + Σ Flat → × (1 + Σ PercentAdd) → × Π (1 + Mult) → clamp
//! ```
//!
//! Modifiers are kept sorted by `(kind, order, insertion)`, so the same
//! inputs always round the same way.
//!
//! ### Containers
//!
//! Each subject (a player, an enemy) owns one [`StatsContainer`]. Containers
//! share no state; there is no global registry.
//!
//! ## Example
//!
//! ```rust
//! use zzattr::*;
//!
//! let damage = StatDefinition::new("Damage", 100.0);
//! let mut stats = StatsContainer::new();
//!
//! stats.add_modifier(&damage, StatModifier::flat(10.0));
//! stats.add_modifier(&damage, StatModifier::flat(5.0));
//! stats.add_modifier(&damage, StatModifier::percent_add(0.10));
//! stats.add_modifier(&damage, StatModifier::percent_add(0.05));
//! stats.add_modifier(&damage, StatModifier::mult(0.20));
//!
//! // (100 + 10 + 5) * (1 + 0.10 + 0.05) * (1 + 0.20)
//! assert!((stats.get_value(&damage, 0.0) - 158.7).abs() < 1e-9);
//! ```
//!
//! ## Modules
//!
//! - [`stat_id`] - Stat identifier type
//! - [`definition`] - Immutable stat schema
//! - [`modifier`] - Modifiers and effect sources
//! - [`handle`] - Modifier removal handles
//! - [`instance`] - One stat's live state and the evaluation pipeline
//! - [`container`] - Per-subject registry and change propagation
//! - [`computed`] - Formulas for computed stats
//! - [`graph`] - Computed-stat dependency graph
//! - [`config`] - Catalogs and initial values
//! - [`applier`] - Modifier bundles with optional durations
//! - [`breakdown`] - Evaluation breakdowns
//! - [`numeric`] - Epsilon and clamping helpers
//! - [`error`] - Error types

pub mod applier;
pub mod breakdown;
pub mod computed;
pub mod config;
pub mod container;
pub mod definition;
pub mod error;
pub mod graph;
pub mod handle;
pub mod instance;
pub mod modifier;
pub mod numeric;
pub mod stat_id;

pub use applier::{ApplierEntry, ModifierApplier};
pub use breakdown::StatBreakdown;
pub use computed::StatFormula;
pub use config::{ConfigEntry, StatCatalog, StatsConfig};
pub use container::{StatChanged, StatsContainer, SubscriptionId};
pub use definition::{DefaultUpgrade, StatDefinition};
pub use error::StatError;
pub use handle::ModifierHandle;
pub use instance::StatInstance;
pub use modifier::{EffectSource, ModifierKind, SourceKey, StatModifier};
pub use stat_id::StatId;
