//! Reduction-method lifecycle management for the Rombus framework.
//!
//! This crate drives the offline/online decomposition of a reduced-order
//! model built from a parametrized truth problem:
//!
//! - [`ReductionLifecycle`] — training set, testing set, and the
//!   basis-growth bound `Nmax`, with idempotent import-or-regenerate
//!   sample-set initialization
//! - [`ReductionMethod`] — the capability trait concrete methods
//!   implement: `offline`, `error_analysis`, and their bracketing hooks
//! - [`TimeDependentReduction`] — composable time-axis extension:
//!   reduction indices for temporal downsampling, per-timestep snapshot
//!   post-processing, and cache invalidation around speed-up analysis
//! - [`CustomizerRegistry`] — per-problem-family lifecycle customization,
//!   consulted at construction time
//! - [`AnalysisTable`] — aggregated error/speed-up analysis results

mod customize;
mod lifecycle;
mod method;
mod report;
mod time_dependent;

#[cfg(test)]
mod test_utils;

pub use customize::{
    customized_lifecycle, global_registry, CustomizerRegistry, ProblemFamily,
    ReductionCustomizer, RegistryError,
};
pub use lifecycle::{ReductionLifecycle, SampleSetError};
pub use method::ReductionMethod;
pub use report::AnalysisTable;
pub use time_dependent::{
    TimeDependentError, TimeDependentMethod, TimeDependentReduction, TimeReductionError,
};
