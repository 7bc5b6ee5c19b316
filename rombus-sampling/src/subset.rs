use std::{fs, io, ops::Index, slice};

use thiserror::Error;
use tracing::debug;

use rombus_core::{ParameterPoint, ParameterRange};

use crate::{Folder, Sampling, SamplingError};

/// An ordered collection of parameter points drawn from a range.
///
/// A reduction method owns two independent subsets over the same range:
/// the training set (basis construction) and the testing set (error
/// analysis).
/// Subsets persist themselves as JSON under a named file in a [`Folder`],
/// and reload only when the persisted content is usable; any load problem
/// is reported as "not imported" so the caller regenerates instead.
#[derive(Debug, Clone)]
pub struct ParameterSpaceSubset {
    range: ParameterRange,
    points: Vec<ParameterPoint>,
}

/// Error type returned when a subset cannot be persisted.
#[derive(Debug, Error)]
pub enum SubsetIoError {
    #[error("failed to write sample set")]
    Write(#[source] io::Error),

    #[error("failed to encode sample set")]
    Encode(#[source] serde_json::Error),
}

impl ParameterSpaceSubset {
    /// Creates an empty subset over `range`.
    #[must_use]
    pub fn new(range: ParameterRange) -> Self {
        Self {
            range,
            points: Vec::new(),
        }
    }

    /// The range this subset draws from.
    #[must_use]
    pub fn range(&self) -> &ParameterRange {
        &self.range
    }

    /// Returns the number of points in the subset.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the subset holds no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns an iterator over the points, in generation order.
    pub fn iter(&self) -> slice::Iter<'_, ParameterPoint> {
        self.points.iter()
    }

    /// Returns the points as a slice.
    #[must_use]
    pub fn points(&self) -> &[ParameterPoint] {
        &self.points
    }

    /// Replaces the subset's points with `count` fresh draws from
    /// `sampling`.
    ///
    /// # Errors
    ///
    /// Returns a [`SamplingError`] if the strategy cannot produce the
    /// requested points.
    pub fn generate(
        &mut self,
        count: usize,
        sampling: &mut dyn Sampling,
    ) -> Result<(), SamplingError> {
        self.points = sampling.sample(&self.range, count)?;
        debug_assert_eq!(self.points.len(), count);
        Ok(())
    }

    /// Persists the subset to `<folder>/<name>.json`, overwriting any
    /// prior content.
    ///
    /// # Errors
    ///
    /// Returns a [`SubsetIoError`] if encoding or writing fails.
    pub fn save(&self, folder: &Folder, name: &str) -> Result<(), SubsetIoError> {
        let encoded = serde_json::to_string(&self.points).map_err(SubsetIoError::Encode)?;
        fs::write(Self::file_path(folder, name), encoded).map_err(SubsetIoError::Write)
    }

    /// Attempts to reload the subset from `<folder>/<name>.json`.
    ///
    /// Returns `true` only if the file exists, parses, and the points were
    /// loaded.
    /// Every failure mode is reported as `false` rather than an error:
    /// a failed import is the designed trigger for regeneration, not a
    /// fault to propagate.
    pub fn load(&mut self, folder: &Folder, name: &str) -> bool {
        let path = Self::file_path(folder, name);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(error) => {
                debug!(path = %path.display(), %error, "sample set not importable");
                return false;
            }
        };
        match serde_json::from_str::<Vec<ParameterPoint>>(&contents) {
            Ok(points) => {
                self.points = points;
                true
            }
            Err(error) => {
                debug!(path = %path.display(), %error, "sample set file did not parse");
                false
            }
        }
    }

    fn file_path(folder: &Folder, name: &str) -> std::path::PathBuf {
        folder.path().join(format!("{name}.json"))
    }
}

impl Index<usize> for ParameterSpaceSubset {
    type Output = ParameterPoint;

    fn index(&self, index: usize) -> &Self::Output {
        &self.points[index]
    }
}

impl<'a> IntoIterator for &'a ParameterSpaceSubset {
    type Item = &'a ParameterPoint;
    type IntoIter = slice::Iter<'a, ParameterPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
