//! Confidence-interval aware metric values.

use serde::{Deserialize, Serialize};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div};

/// A numeric estimate with optional lower and upper confidence bounds.
///
/// Each component is independently optional: `None` means the quantity is
/// unknown or not applicable, which is distinct from zero. The default value
/// (all components `None`) is the "no data" marker threaded through every
/// computation.
///
/// By convention `lower <= value <= upper` when all three are present; this
/// is not enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricWithCI {
    pub value: Option<f64>,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
}

impl MetricWithCI {
    pub fn new(value: Option<f64>, lower: Option<f64>, upper: Option<f64>) -> Self {
        Self {
            value,
            lower,
            upper,
        }
    }

    /// A fully-known metric with a central value and both bounds.
    pub fn with_bounds(value: f64, lower: f64, upper: f64) -> Self {
        Self::new(Some(value), Some(lower), Some(upper))
    }

    /// A point estimate whose bounds collapse onto the value.
    pub fn point(value: f64) -> Self {
        Self::with_bounds(value, value, value)
    }

    /// Returns `true` when no component carries data.
    pub fn is_empty(&self) -> bool {
        self.value.is_none() && self.lower.is_none() && self.upper.is_none()
    }

    /// Applies `f` to every present component.
    pub(crate) fn map<F>(self, f: F) -> Self
    where
        F: Fn(f64) -> f64,
    {
        Self {
            value: self.value.map(&f),
            lower: self.lower.map(&f),
            upper: self.upper.map(&f),
        }
    }
}

/// `None + None` stays `None`; otherwise the absent side counts as zero.
fn add_component(lhs: Option<f64>, rhs: Option<f64>) -> Option<f64> {
    match (lhs, rhs) {
        (None, None) => None,
        (lhs, rhs) => Some(lhs.unwrap_or(0.0) + rhs.unwrap_or(0.0)),
    }
}

impl Add for MetricWithCI {
    type Output = MetricWithCI;

    fn add(self, rhs: MetricWithCI) -> MetricWithCI {
        MetricWithCI {
            value: add_component(self.value, rhs.value),
            lower: add_component(self.lower, rhs.lower),
            upper: add_component(self.upper, rhs.upper),
        }
    }
}

impl AddAssign for MetricWithCI {
    fn add_assign(&mut self, rhs: MetricWithCI) {
        *self = *self + rhs;
    }
}

impl Div<f64> for MetricWithCI {
    type Output = MetricWithCI;

    /// Division by zero (or NaN) yields an empty metric instead of NaN/∞.
    fn div(self, divisor: f64) -> MetricWithCI {
        if divisor == 0.0 || divisor.is_nan() {
            return MetricWithCI::default();
        }
        self.map(|component| component / divisor)
    }
}

impl Sum for MetricWithCI {
    fn sum<I: Iterator<Item = MetricWithCI>>(iter: I) -> MetricWithCI {
        iter.fold(MetricWithCI::default(), Add::add)
    }
}

impl<'a> Sum<&'a MetricWithCI> for MetricWithCI {
    fn sum<I: Iterator<Item = &'a MetricWithCI>>(iter: I) -> MetricWithCI {
        iter.copied().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> MetricWithCI {
        MetricWithCI::new(Some(10.0), None, Some(14.0))
    }

    #[test]
    fn test_empty_is_additive_identity() {
        let x = sample();
        assert_eq!(MetricWithCI::default() + x, x);
        assert_eq!(x + MetricWithCI::default(), x);
    }

    #[test]
    fn test_empty_plus_empty_stays_empty() {
        let empty = MetricWithCI::new(None, None, None);
        let sum = empty + empty;
        assert!(sum.is_empty());
        assert_eq!(sum, MetricWithCI::default());
    }

    #[test]
    fn test_missing_component_counts_as_zero_against_present_one() {
        let a = MetricWithCI::new(Some(1.0), None, Some(3.0));
        let b = MetricWithCI::new(Some(2.0), Some(1.5), None);
        let sum = a + b;
        assert_eq!(sum, MetricWithCI::new(Some(3.0), Some(1.5), Some(3.0)));
    }

    #[test]
    fn test_addition_commutative_and_associative() {
        let a = MetricWithCI::with_bounds(1.0, 0.5, 2.0);
        let b = MetricWithCI::new(Some(4.0), None, Some(6.0));
        let c = MetricWithCI::new(None, Some(0.25), None);

        assert_eq!(a + b, b + a);
        assert_eq!((a + b) + c, a + (b + c));
    }

    #[test]
    fn test_sum_of_nothing_is_empty() {
        let total: MetricWithCI = Vec::<MetricWithCI>::new().into_iter().sum();
        assert!(total.is_empty());
    }

    #[test]
    fn test_division_scales_present_components() {
        let m = MetricWithCI::new(Some(10.0), None, Some(20.0)) / 4.0;
        assert_eq!(m, MetricWithCI::new(Some(2.5), None, Some(5.0)));
    }

    #[test]
    fn test_division_by_zero_is_empty() {
        let m = MetricWithCI::with_bounds(10.0, 5.0, 15.0) / 0.0;
        assert!(m.is_empty());
        let m = MetricWithCI::default() / 0.0;
        assert!(m.is_empty());
    }

    #[test]
    fn test_division_never_produces_non_finite_values() {
        let m = MetricWithCI::with_bounds(1.0, 0.0, 2.0) / f64::NAN;
        assert!(m.is_empty());
    }

    #[test]
    fn test_serializes_as_value_lower_upper() {
        let json = serde_json::to_value(MetricWithCI::new(Some(1.0), None, Some(2.0))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "value": 1.0, "lower": null, "upper": 2.0 })
        );
    }
}
