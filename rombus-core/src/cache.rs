use std::collections::HashMap;

use crate::{ParameterPoint, TimeSeries};

/// A hashable cache key derived from a parameter point.
///
/// Components are canonicalized through their IEEE-754 bit patterns, so two
/// points compare equal as keys exactly when every component is
/// bit-identical.
/// This makes `f64`-valued parameters usable as map keys without imposing a
/// tolerance; cache hits are only expected for parameter values that were
/// produced by the same sampling pass.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(Vec<u64>);

impl CacheKey {
    /// Builds a key from a parameter point.
    #[must_use]
    pub fn from_point(point: &ParameterPoint) -> Self {
        Self(point.iter().map(|value| value.to_bits()).collect())
    }
}

impl From<&ParameterPoint> for CacheKey {
    fn from(point: &ParameterPoint) -> Self {
        Self::from_point(point)
    }
}

/// A lazily populated store of solve results keyed by parameter point.
///
/// Caches are filled by the solve layer as solutions are computed and
/// consulted on subsequent solves at the same parameter.
/// The reduction lifecycle only ever mutates a cache through
/// [`clear`](SolutionCache::clear), which is how a speed-up analysis forces
/// recomputation.
#[derive(Debug, Clone)]
pub struct SolutionCache<V> {
    entries: HashMap<CacheKey, V>,
}

impl<V> SolutionCache<V> {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Stores `value` for `key`, replacing any prior entry.
    pub fn insert(&mut self, key: CacheKey, value: V) {
        self.entries.insert(key, value);
    }

    /// Returns the cached value for `key`, if present.
    #[must_use]
    pub fn get(&self, key: &CacheKey) -> Option<&V> {
        self.entries.get(key)
    }

    /// Returns `true` if an entry exists for `key`.
    #[must_use]
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V> Default for SolutionCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// The named solution caches carried by a time-dependent problem.
///
/// `S` is the problem's solution type and `O` its output type.
/// Single-step caches hold one value per parameter; the `*_over_time`
/// caches hold a full [`TimeSeries`] per parameter.
#[derive(Debug, Clone)]
pub struct SolutionCaches<S, O> {
    /// Steady/current-step solutions.
    pub solution: SolutionCache<S>,
    /// Time derivatives of the current-step solution.
    pub solution_dot: SolutionCache<S>,
    /// Full solution trajectories.
    pub solution_over_time: SolutionCache<TimeSeries<S>>,
    /// Full time-derivative trajectories.
    pub solution_dot_over_time: SolutionCache<TimeSeries<S>>,
    /// Output functional values along the trajectory.
    pub output_over_time: SolutionCache<TimeSeries<O>>,
}

impl<S, O> SolutionCaches<S, O> {
    /// Creates a set of empty caches.
    #[must_use]
    pub fn new() -> Self {
        Self {
            solution: SolutionCache::new(),
            solution_dot: SolutionCache::new(),
            solution_over_time: SolutionCache::new(),
            solution_dot_over_time: SolutionCache::new(),
            output_over_time: SolutionCache::new(),
        }
    }

    /// Empties every named cache.
    ///
    /// After this call any solve must recompute from scratch; this is the
    /// invalidation step a speed-up analysis performs before timing.
    pub fn clear_all(&mut self) {
        self.solution.clear();
        self.solution_dot.clear();
        self.solution_over_time.clear();
        self.solution_dot_over_time.clear();
        self.output_over_time.clear();
    }

    /// Returns `true` if every named cache is empty.
    #[must_use]
    pub fn is_all_empty(&self) -> bool {
        self.solution.is_empty()
            && self.solution_dot.is_empty()
            && self.solution_over_time.is_empty()
            && self.solution_dot_over_time.is_empty()
            && self.output_over_time.is_empty()
    }
}

impl<S, O> Default for SolutionCaches<S, O> {
    fn default() -> Self {
        Self::new()
    }
}
