//! Numeric helpers shared by the evaluation pipeline.
//!
//! Stat values are plain `f64`. Change detection always goes through
//! [`has_changed`] so that rounding noise never counts as a change.

/// Tolerance used for every "did the value actually change" check.
pub const EPSILON: f64 = 1e-6;

/// Returns `true` if `after` differs from `before` by more than [`EPSILON`].
///
/// # Examples
///
/// ```rust
/// use zzattr::numeric::has_changed;
///
/// assert!(!has_changed(1.0, 1.0 + 1e-9));
/// assert!(has_changed(1.0, 1.1));
/// ```
pub fn has_changed(before: f64, after: f64) -> bool {
    (before - after).abs() > EPSILON
}

/// Returns `true` if `a` and `b` are within [`EPSILON`] of each other.
///
/// This is the complement of [`has_changed`] except at exactly `EPSILON`,
/// where base-value writes are still treated as a change.
pub fn nearly_equal(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Clamp `value` into `[min, max]`.
///
/// Unlike [`f64::clamp`] this never panics; callers guarantee `max >= min`.
pub fn clamp_value(value: f64, min: f64, max: f64) -> f64 {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_changed_ignores_rounding_noise() {
        assert!(!has_changed(0.1 + 0.2, 0.3));
        assert!(has_changed(0.0, 0.001));
    }

    #[test]
    fn test_nearly_equal() {
        assert!(nearly_equal(100.0, 100.0000001));
        assert!(!nearly_equal(100.0, 100.1));
    }

    #[test]
    fn test_clamp_value() {
        assert_eq!(clamp_value(-5.0, 0.0, 50.0), 0.0);
        assert_eq!(clamp_value(75.0, 0.0, 50.0), 50.0);
        assert_eq!(clamp_value(25.0, 0.0, 50.0), 25.0);
    }
}
