//! Evaluation breakdowns.
//!
//! A [`StatBreakdown`] records every intermediate value of one pass through
//! the evaluation pipeline. It is produced on demand for debugging and
//! tooling; the hot path never builds one.

use crate::stat_id::StatId;
use serde::{Deserialize, Serialize};

/// Step-by-step record of evaluating one stat.
///
/// # Examples
///
/// ```rust
/// use zzattr::{StatDefinition, StatInstance, StatModifier};
///
/// let mut hp = StatInstance::new(StatDefinition::new("HP", 100.0));
/// hp.add_modifier(StatModifier::flat(20.0));
/// hp.add_modifier(StatModifier::mult(0.5));
///
/// let breakdown = hp.breakdown();
/// assert_eq!(breakdown.after_flat, 120.0);
/// assert_eq!(breakdown.multipliers, vec![0.5]);
/// assert_eq!(breakdown.value, 180.0);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatBreakdown {
    /// The stat this breakdown belongs to.
    pub stat_id: StatId,

    /// Base value the pipeline started from.
    pub base_value: f64,

    /// Sum of all `Flat` modifiers.
    pub flat_sum: f64,

    /// `base_value + flat_sum`.
    pub after_flat: f64,

    /// Sum of all `PercentAdd` modifiers.
    pub percent_add_sum: f64,

    /// `after_flat * (1 + percent_add_sum)`.
    pub after_percent_add: f64,

    /// Every `Mult` modifier value, in application order.
    pub multipliers: Vec<f64>,

    /// Value after all multipliers, before clamping.
    pub after_mult: f64,

    /// Whether clamping changed the value.
    pub clamped: bool,

    /// Final value, identical to the stat's cached value.
    pub value: f64,
}
