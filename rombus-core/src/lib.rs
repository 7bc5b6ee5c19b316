//! Core types and capability traits for the Rombus reduced-order-modeling
//! framework.
//!
//! This crate defines the shared abstractions the sampling and reduction
//! layers build on:
//!
//! - [`ParameterRange`], [`ParameterPoint`] — the parameter-space data model
//! - [`TimeSeries`] — ordered per-timestep values
//! - [`SolutionCache`], [`SolutionCaches`] — keyed solve-result stores
//! - [`ParametrizedProblem`], [`TimeDependentProblem`] — problem capability
//!   traits implemented by truth and reduced problems
//! - [`SolutionIo`], [`PersistenceMode`], [`PersistenceGuard`] — solution
//!   persistence with an explicit, restorable on/off mode

mod cache;
mod parameter;
mod persistence;
mod problem;
mod time_series;

pub use cache::{CacheKey, SolutionCache, SolutionCaches};
pub use parameter::{ParameterBounds, ParameterPoint, ParameterRange, RangeError};
pub use persistence::{PersistenceGuard, PersistenceMode, SolutionIo, SolutionIoRequest};
pub use problem::{ParametrizedProblem, TimeDependentProblem};
pub use time_series::TimeSeries;
