use std::{ops::Deref, slice, vec};

use serde::{Deserialize, Serialize};

/// An ordered sequence of per-timestep values.
///
/// A `TimeSeries` holds one value per discretization step of a
/// time-dependent solve: solution snapshots, their time derivatives, or
/// output functional values.
/// The step size is owned by the problem that produced the series; the
/// series itself only preserves ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries<T>(Vec<T>);

impl<T> TimeSeries<T> {
    /// Creates an empty series.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Creates an empty series with room for `capacity` steps.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self(Vec::with_capacity(capacity))
    }

    /// Appends the value for the next timestep.
    pub fn push(&mut self, value: T) {
        self.0.push(value);
    }

    /// Consumes the series and returns the underlying values.
    #[must_use]
    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for TimeSeries<T> {
    fn from(values: Vec<T>) -> Self {
        Self(values)
    }
}

impl<T> FromIterator<T> for TimeSeries<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T> Deref for TimeSeries<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> IntoIterator for TimeSeries<T> {
    type Item = T;
    type IntoIter = vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a TimeSeries<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
