use std::{fmt, ops::Deref, slice};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Closed bounds `[min, max]` for a single parameter component.
///
/// Bounds are validated when a [`ParameterRange`] is constructed, so a
/// `ParameterBounds` held by a range always satisfies `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub min: f64,
    pub max: f64,
}

impl ParameterBounds {
    /// Creates bounds from a `(min, max)` pair.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Returns the width `max - min` of the bounds.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    /// Returns `true` if `value` lies within `[min, max]`.
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

impl From<(f64, f64)> for ParameterBounds {
    fn from((min, max): (f64, f64)) -> Self {
        Self { min, max }
    }
}

/// An ordered, immutable sequence of per-component parameter bounds.
///
/// A `ParameterRange` describes the box in parameter space from which
/// training and testing points are drawn.
/// It is validated at construction: the bounds list must be non-empty and
/// every component must satisfy `min <= max`.
/// Because non-emptiness is a type invariant, consumers that accept a
/// `ParameterRange` never observe an empty range.
///
/// # Examples
///
/// ```
/// use rombus_core::ParameterRange;
///
/// let range = ParameterRange::new([(0.1, 1.0), (-1.0, 1.0)]).unwrap();
/// assert_eq!(range.dimension(), 2);
///
/// assert!(ParameterRange::new([(2.0, 1.0)]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange(Vec<ParameterBounds>);

/// Error type returned when constructing an invalid [`ParameterRange`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum RangeError {
    #[error("parameter range must have at least one component")]
    Empty,

    #[error("component {index} has inverted bounds: min {min} > max {max}")]
    Inverted { index: usize, min: f64, max: f64 },
}

impl ParameterRange {
    /// Constructs a range from an ordered sequence of bounds.
    ///
    /// Accepts anything convertible into bounds, such as `(f64, f64)`
    /// tuples or [`ParameterBounds`] values.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::Empty`] if the sequence is empty, or
    /// [`RangeError::Inverted`] if any component has `min > max`.
    pub fn new<I, B>(bounds: I) -> Result<Self, RangeError>
    where
        I: IntoIterator<Item = B>,
        B: Into<ParameterBounds>,
    {
        let bounds: Vec<ParameterBounds> = bounds.into_iter().map(Into::into).collect();
        if bounds.is_empty() {
            return Err(RangeError::Empty);
        }
        if let Some((index, b)) = bounds.iter().enumerate().find(|(_, b)| b.min > b.max) {
            return Err(RangeError::Inverted {
                index,
                min: b.min,
                max: b.max,
            });
        }
        Ok(Self(bounds))
    }

    /// Returns the number of parameter components.
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.0.len()
    }

    /// Returns the per-component bounds, in order.
    #[must_use]
    pub fn bounds(&self) -> &[ParameterBounds] {
        &self.0
    }

    /// Returns an iterator over the per-component bounds.
    pub fn iter(&self) -> slice::Iter<'_, ParameterBounds> {
        self.0.iter()
    }

    /// Returns `true` if `point` has matching dimension and every component
    /// lies within its bounds.
    #[must_use]
    pub fn contains(&self, point: &ParameterPoint) -> bool {
        point.len() == self.dimension()
            && self
                .0
                .iter()
                .zip(point.iter())
                .all(|(bounds, &value)| bounds.contains(value))
    }
}

impl<'a> IntoIterator for &'a ParameterRange {
    type Item = &'a ParameterBounds;
    type IntoIter = slice::Iter<'a, ParameterBounds>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A single point in parameter space.
///
/// Components are ordered to match the [`ParameterRange`] the point was
/// drawn from.
/// Dereferences to a slice of `f64` for transparent component access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterPoint(Vec<f64>);

impl ParameterPoint {
    /// Creates a point from its components.
    #[must_use]
    pub fn new(components: Vec<f64>) -> Self {
        Self(components)
    }

    /// Consumes the point and returns its components.
    #[must_use]
    pub fn into_components(self) -> Vec<f64> {
        self.0
    }
}

impl From<Vec<f64>> for ParameterPoint {
    fn from(components: Vec<f64>) -> Self {
        Self(components)
    }
}

impl Deref for ParameterPoint {
    type Target = [f64];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl fmt::Display for ParameterPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{value}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_range_fails() {
        let bounds: Vec<(f64, f64)> = Vec::new();
        assert_eq!(ParameterRange::new(bounds), Err(RangeError::Empty));
    }

    #[test]
    fn inverted_bounds_fail() {
        let err = ParameterRange::new([(0.0, 1.0), (3.0, 2.0)]).unwrap_err();
        assert_eq!(
            err,
            RangeError::Inverted {
                index: 1,
                min: 3.0,
                max: 2.0
            }
        );
    }

    #[test]
    fn contains_checks_dimension_and_bounds() {
        let range = ParameterRange::new([(0.0, 1.0), (10.0, 20.0)]).unwrap();

        assert!(range.contains(&ParameterPoint::new(vec![0.5, 15.0])));
        assert!(!range.contains(&ParameterPoint::new(vec![0.5])));
        assert!(!range.contains(&ParameterPoint::new(vec![0.5, 25.0])));
    }

    #[test]
    fn point_displays_components() {
        let point = ParameterPoint::new(vec![1.0, 2.5]);
        assert_eq!(point.to_string(), "(1, 2.5)");
    }
}
