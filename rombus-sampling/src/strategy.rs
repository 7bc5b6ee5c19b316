use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

use rombus_core::{ParameterBounds, ParameterPoint, ParameterRange};

/// A strategy for drawing parameter points from a range.
///
/// Implementations must return exactly `count` points, each lying inside
/// the range.
/// Randomized strategies are seedable so that sample generation is
/// reproducible across runs.
pub trait Sampling {
    /// Draws `count` points from `range`.
    ///
    /// # Errors
    ///
    /// Returns a [`SamplingError`] if the strategy cannot produce points
    /// for the given range or count.
    fn sample(
        &mut self,
        range: &ParameterRange,
        count: usize,
    ) -> Result<Vec<ParameterPoint>, SamplingError>;
}

/// Error type returned when a sampling strategy cannot run.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum SamplingError {
    /// A log-uniform draw requires strictly positive bounds.
    #[error("component {index} has non-positive bound {bound}, log-uniform sampling requires positive bounds")]
    NonPositiveBound { index: usize, bound: f64 },

    /// An equispaced grid requires `count` to be a perfect power of the
    /// parameter dimension.
    #[error("cannot arrange {count} points as an equispaced grid over {dimension} components")]
    NotAGrid { count: usize, dimension: usize },
}

/// Independent per-component uniform draws.
///
/// The default strategy for training- and testing-set generation.
///
/// # Examples
///
/// ```
/// use rombus_core::ParameterRange;
/// use rombus_sampling::{Sampling, UniformSampling};
///
/// let range = ParameterRange::new([(0.0, 1.0), (10.0, 20.0)]).unwrap();
/// let points = UniformSampling::seeded(7).sample(&range, 100).unwrap();
///
/// assert_eq!(points.len(), 100);
/// assert!(points.iter().all(|p| range.contains(p)));
/// ```
#[derive(Debug, Clone)]
pub struct UniformSampling {
    rng: StdRng,
}

impl UniformSampling {
    /// Creates a strategy seeded from system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a strategy with a fixed seed, for reproducible sets.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for UniformSampling {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampling for UniformSampling {
    fn sample(
        &mut self,
        range: &ParameterRange,
        count: usize,
    ) -> Result<Vec<ParameterPoint>, SamplingError> {
        let points = (0..count)
            .map(|_| {
                let components = range
                    .iter()
                    .map(|bounds| self.rng.gen_range(bounds.min..=bounds.max))
                    .collect();
                ParameterPoint::new(components)
            })
            .collect();
        Ok(points)
    }
}

/// Per-component draws uniform in the logarithm of the parameter.
///
/// Suited to parameters that vary over orders of magnitude.
/// Every bound must be strictly positive.
#[derive(Debug, Clone)]
pub struct LogUniformSampling {
    rng: StdRng,
}

impl LogUniformSampling {
    /// Creates a strategy seeded from system entropy.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a strategy with a fixed seed, for reproducible sets.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for LogUniformSampling {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampling for LogUniformSampling {
    fn sample(
        &mut self,
        range: &ParameterRange,
        count: usize,
    ) -> Result<Vec<ParameterPoint>, SamplingError> {
        if let Some((index, bounds)) = range
            .iter()
            .enumerate()
            .find(|(_, bounds)| bounds.min <= 0.0)
        {
            return Err(SamplingError::NonPositiveBound {
                index,
                bound: bounds.min,
            });
        }

        let points = (0..count)
            .map(|_| {
                let components = range
                    .iter()
                    .map(|bounds| {
                        let exponent = self.rng.gen_range(bounds.min.ln()..=bounds.max.ln());
                        exponent.exp()
                    })
                    .collect();
                ParameterPoint::new(components)
            })
            .collect();
        Ok(points)
    }
}

/// A deterministic tensor-product grid with the same number of points per
/// component.
///
/// For a `d`-dimensional range, `count` must equal `n.pow(d)` for some
/// integer `n`; the grid then places `n` equispaced values (bounds
/// included) along each component.
#[derive(Debug, Clone, Copy, Default)]
pub struct EquispacedSampling;

impl EquispacedSampling {
    /// Number of grid points per component for `count` total points, if
    /// `count` is an exact `dimension`-th power.
    fn points_per_component(count: usize, dimension: usize) -> Option<usize> {
        let n = (count as f64).powf(1.0 / dimension as f64).round() as usize;
        (n.checked_pow(dimension as u32) == Some(count)).then_some(n)
    }
}

impl Sampling for EquispacedSampling {
    fn sample(
        &mut self,
        range: &ParameterRange,
        count: usize,
    ) -> Result<Vec<ParameterPoint>, SamplingError> {
        let dimension = range.dimension();
        let n = Self::points_per_component(count, dimension).ok_or(SamplingError::NotAGrid {
            count,
            dimension,
        })?;

        let axis_value = |bounds: &ParameterBounds, i: usize| {
            if n == 1 {
                bounds.min
            } else {
                bounds.min + bounds.width() * i as f64 / (n - 1) as f64
            }
        };

        let points = (0..count)
            .map(|flat| {
                // Decompose the flat index with the last component fastest.
                let mut remainder = flat;
                let mut indices = vec![0; dimension];
                for axis in (0..dimension).rev() {
                    indices[axis] = remainder % n;
                    remainder /= n;
                }
                let components = range
                    .iter()
                    .zip(&indices)
                    .map(|(bounds, &i)| axis_value(bounds, i))
                    .collect();
                ParameterPoint::new(components)
            })
            .collect();
        Ok(points)
    }
}
