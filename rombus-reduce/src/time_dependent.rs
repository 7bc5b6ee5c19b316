use std::{iter::StepBy, ops::RangeInclusive};

use approx::relative_eq;
use thiserror::Error;
use tracing::debug;
use uom::si::{f64::Time, time::second};

use rombus_core::{
    PersistenceMode, SolutionIo, TimeDependentProblem, TimeSeries,
};

use crate::{ReductionLifecycle, ReductionMethod};

/// Relative tolerance for deciding that one time step is an exact multiple
/// of another, absorbing floating-point rounding in the quotient.
const STEP_TOLERANCE: f64 = 1.0e-6;

/// Error type for invalid time-axis reduction settings.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum TimeReductionError {
    #[error("reduction initial time {t0} s precedes the truth initial time {truth_t0} s")]
    InitialTimeBeforeTruth { t0: f64, truth_t0: f64 },

    #[error("reduction time step {dt} s is smaller than the truth time step {truth_dt} s")]
    StepSmallerThanTruth { dt: f64, truth_dt: f64 },

    #[error("reduction time step {dt} s is not a multiple of the truth time step {truth_dt} s")]
    StepNotAMultiple { dt: f64, truth_dt: f64 },

    #[error("reduction final time {t} s exceeds the truth final time {truth_t} s")]
    FinalTimeAfterTruth { t: f64, truth_t: f64 },

    #[error(
        "reduced problem time step {reduced_dt} s does not match the expected {expected_dt} s"
    )]
    MisalignedReducedStep { reduced_dt: f64, expected_dt: f64 },
}

/// Error type for failures in a time-dependent reduction operation.
///
/// Groups the wrapped method's own failure with time-axis configuration
/// failures detected by the wrapper.
#[derive(Debug, Error)]
pub enum TimeDependentError<E: std::error::Error> {
    #[error("reduction method failed: {0}")]
    Method(E),

    #[error(transparent)]
    Time(#[from] TimeReductionError),
}

/// The contract a concrete reduction method satisfies to gain time-axis
/// behavior through [`TimeDependentReduction`].
///
/// Implementors expose their truth and reduced problems, post-process a
/// single snapshot, and may override the speed-up-analysis hooks.
/// The provided hooks implement the steady-state behavior: disable truth
/// persistence on entry, restore it on exit.
pub trait TimeDependentMethod: ReductionMethod {
    /// The full-order problem, with persistence control.
    type Truth: SolutionIo;

    /// The reduced-order surrogate problem.
    type Reduced: TimeDependentProblem;

    /// A single solution snapshot.
    type Snapshot;

    /// The full-order problem.
    fn truth_problem(&self) -> &Self::Truth;

    /// Mutable access to the full-order problem.
    fn truth_problem_mut(&mut self) -> &mut Self::Truth;

    /// The reduced-order problem.
    fn reduced_problem(&self) -> &Self::Reduced;

    /// Mutable access to the reduced-order problem.
    fn reduced_problem_mut(&mut self) -> &mut Self::Reduced;

    /// Post-processes one snapshot before it joins the basis (projection,
    /// output-functional evaluation, lifting).
    ///
    /// `snapshot_index` identifies the parameter point the snapshot was
    /// computed at.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if post-processing fails.
    fn postprocess_snapshot(
        &mut self,
        snapshot: Self::Snapshot,
        snapshot_index: usize,
    ) -> Result<Self::Snapshot, Self::Error>;

    /// Prepares for a speed-up analysis by disabling truth persistence so
    /// timed solves cannot read or write stored solutions.
    fn init_speedup_analysis(&mut self) {
        self.truth_problem_mut()
            .set_persistence_mode(PersistenceMode::Disabled);
    }

    /// Re-enables truth persistence after a speed-up analysis.
    fn finalize_speedup_analysis(&mut self) {
        self.truth_problem_mut()
            .set_persistence_mode(PersistenceMode::Normal);
    }
}

/// Time-axis extension of a concrete reduction method.
///
/// `TimeDependentReduction` composes a [`TimeDependentMethod`] with three
/// optional reduction indices that downsample the truth time axis:
/// first index (skip an initial transient), delta index (keep every
/// `delta`-th step), and last index (truncate the tail).
/// All three default to `None`, meaning the truth problem's own bounds and
/// step are used unchanged.
///
/// The wrapper still implements [`ReductionMethod`] by delegation, so
/// drivers sequence it exactly like the method it wraps.
///
/// # Index derivation
///
/// Indices are derived from the truth discretization, never stored
/// verbatim: `first = floor(t0 / dt)`, `delta = round(dt_red / dt)`
/// (with `dt_red` required to be an exact multiple of `dt` up to a
/// relative tolerance), `last = floor(T / dt)`.
/// Calling a setter again re-derives its index.
pub struct TimeDependentReduction<M: TimeDependentMethod> {
    inner: M,
    reduction_first_index: Option<usize>,
    reduction_delta_index: Option<usize>,
    reduction_last_index: Option<usize>,
    speedup_prior_mode: Option<PersistenceMode>,
}

impl<M: TimeDependentMethod> TimeDependentReduction<M> {
    /// Wraps `inner` with full-resolution, full-range time defaults.
    #[must_use]
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            reduction_first_index: None,
            reduction_delta_index: None,
            reduction_last_index: None,
            speedup_prior_mode: None,
        }
    }

    /// The wrapped method.
    #[must_use]
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Mutable access to the wrapped method.
    pub fn inner_mut(&mut self) -> &mut M {
        &mut self.inner
    }

    /// Consumes the wrapper and returns the wrapped method.
    #[must_use]
    pub fn into_inner(self) -> M {
        self.inner
    }

    /// Index of the first truth timestep kept for reduction, if set.
    #[must_use]
    pub fn reduction_first_index(&self) -> Option<usize> {
        self.reduction_first_index
    }

    /// Stride between kept truth timesteps, if set.
    #[must_use]
    pub fn reduction_delta_index(&self) -> Option<usize> {
        self.reduction_delta_index
    }

    /// Index of the last truth timestep kept for reduction, if set.
    #[must_use]
    pub fn reduction_last_index(&self) -> Option<usize> {
        self.reduction_last_index
    }

    /// Starts the reduced time axis at `t0`, skipping earlier truth
    /// timesteps (typically an initial transient).
    ///
    /// # Errors
    ///
    /// Returns [`TimeReductionError::InitialTimeBeforeTruth`] if `t0`
    /// precedes the truth problem's initial time.
    pub fn set_reduction_initial_time(&mut self, t0: Time) -> Result<(), TimeReductionError> {
        let truth = self.inner.truth_problem();
        let t0_s = t0.get::<second>();
        let truth_t0_s = truth.initial_time().get::<second>();
        if t0_s < truth_t0_s {
            return Err(TimeReductionError::InitialTimeBeforeTruth {
                t0: t0_s,
                truth_t0: truth_t0_s,
            });
        }
        let dt_s = truth.time_step_size().get::<second>();
        self.reduction_first_index = Some((t0_s / dt_s).floor() as usize);
        Ok(())
    }

    /// Coarsens the reduced time axis to step size `dt`, keeping every
    /// `round(dt / truth.dt)`-th truth timestep.
    ///
    /// # Errors
    ///
    /// Returns [`TimeReductionError::StepSmallerThanTruth`] if `dt` is
    /// finer than the truth step, or
    /// [`TimeReductionError::StepNotAMultiple`] if `dt` is not an exact
    /// multiple of the truth step within a relative tolerance.
    pub fn set_reduction_time_step_size(&mut self, dt: Time) -> Result<(), TimeReductionError> {
        let truth_dt_s = self.inner.truth_problem().time_step_size().get::<second>();
        let dt_s = dt.get::<second>();
        if dt_s < truth_dt_s {
            return Err(TimeReductionError::StepSmallerThanTruth {
                dt: dt_s,
                truth_dt: truth_dt_s,
            });
        }
        let delta = (dt_s / truth_dt_s).round();
        if !relative_eq!(delta * truth_dt_s, dt_s, max_relative = STEP_TOLERANCE) {
            return Err(TimeReductionError::StepNotAMultiple {
                dt: dt_s,
                truth_dt: truth_dt_s,
            });
        }
        self.reduction_delta_index = Some(delta as usize);
        Ok(())
    }

    /// Ends the reduced time axis at `t`, truncating later truth
    /// timesteps.
    ///
    /// # Errors
    ///
    /// Returns [`TimeReductionError::FinalTimeAfterTruth`] if `t` exceeds
    /// the truth problem's final time.
    pub fn set_reduction_final_time(&mut self, t: Time) -> Result<(), TimeReductionError> {
        let truth = self.inner.truth_problem();
        let t_s = t.get::<second>();
        let truth_t_s = truth.final_time().get::<second>();
        if t_s > truth_t_s {
            return Err(TimeReductionError::FinalTimeAfterTruth {
                t: t_s,
                truth_t: truth_t_s,
            });
        }
        let dt_s = truth.time_step_size().get::<second>();
        self.reduction_last_index = Some((t_s / dt_s).floor() as usize);
        Ok(())
    }

    /// The effective truth-timestep indices kept for reduction:
    /// `first..=last` with stride `delta`, defaulting to the full axis at
    /// full resolution.
    pub fn reduction_indices(&self) -> StepBy<RangeInclusive<usize>> {
        let truth = self.inner.truth_problem();
        let first = self.reduction_first_index.unwrap_or(0);
        let delta = self.reduction_delta_index.unwrap_or(1);
        let last = self.reduction_last_index.unwrap_or_else(|| {
            let dt_s = truth.time_step_size().get::<second>();
            (truth.final_time().get::<second>() / dt_s).floor() as usize
        });
        (first..=last).step_by(delta)
    }

    /// Selects the kept timesteps from a truth-resolution series.
    ///
    /// Indices beyond the end of the series are skipped, so a series
    /// shorter than the configured range yields a shorter result rather
    /// than a panic.
    #[must_use]
    pub fn downsample<T: Clone>(&self, series: &TimeSeries<T>) -> TimeSeries<T> {
        self.reduction_indices()
            .take_while(|&index| index < series.len())
            .map(|index| series[index].clone())
            .collect()
    }

    /// Checks that the reduced problem's step size matches the configured
    /// downsampling of the truth step.
    ///
    /// With `reduction_delta_index = d`, the reduced step must equal
    /// `d * truth.dt`; with no delta configured it must equal `truth.dt`.
    ///
    /// # Errors
    ///
    /// Returns [`TimeReductionError::MisalignedReducedStep`] on mismatch.
    pub fn check_time_alignment(&self) -> Result<(), TimeReductionError> {
        let truth_dt_s = self.inner.truth_problem().time_step_size().get::<second>();
        let reduced_dt_s = self
            .inner
            .reduced_problem()
            .time_step_size()
            .get::<second>();
        let expected_dt_s = truth_dt_s * self.reduction_delta_index.unwrap_or(1) as f64;
        if !relative_eq!(reduced_dt_s, expected_dt_s, max_relative = STEP_TOLERANCE) {
            return Err(TimeReductionError::MisalignedReducedStep {
                reduced_dt: reduced_dt_s,
                expected_dt: expected_dt_s,
            });
        }
        Ok(())
    }

    /// Post-processes a trajectory of snapshots, one timestep at a time.
    ///
    /// For each timestep `k`, the reduced problem's clock is set to
    /// `k * reduced.dt` before the wrapped method's single-snapshot hook
    /// runs, so time-varying post-processing observes the timestep it is
    /// applied to.
    /// The result preserves length and order.
    ///
    /// # Errors
    ///
    /// Returns [`TimeDependentError::Time`] if the reduced step is
    /// misaligned with the configured downsampling, or
    /// [`TimeDependentError::Method`] if the wrapped hook fails.
    pub fn postprocess_snapshot(
        &mut self,
        snapshot_over_time: TimeSeries<M::Snapshot>,
        snapshot_index: usize,
    ) -> Result<TimeSeries<M::Snapshot>, TimeDependentError<M::Error>> {
        self.check_time_alignment()?;

        let mut postprocessed = TimeSeries::with_capacity(snapshot_over_time.len());
        for (k, snapshot) in snapshot_over_time.into_iter().enumerate() {
            let dt = self.inner.reduced_problem().time_step_size();
            self.inner.reduced_problem_mut().set_time(dt * k as f64);
            let step = self
                .inner
                .postprocess_snapshot(snapshot, snapshot_index)
                .map_err(TimeDependentError::Method)?;
            postprocessed.push(step);
        }
        Ok(postprocessed)
    }

    /// Prepares a side-by-side truth-vs-reduced timing comparison.
    ///
    /// In order: runs the wrapped method's own speed-up initialization,
    /// restores the persistence mode it toggled, clears every solution
    /// cache on both problems so timed solves measure real cost, then
    /// disables truth persistence for the duration of the analysis,
    /// remembering the prior mode for
    /// [`finalize_speedup_analysis`](Self::finalize_speedup_analysis).
    ///
    /// Afterwards `import_solution` reports "not available" and
    /// `export_solution` does nothing, for any request.
    pub fn init_speedup_analysis(&mut self) {
        let prior = self.inner.truth_problem().persistence_mode();
        self.inner.init_speedup_analysis();
        self.inner.truth_problem_mut().set_persistence_mode(prior);

        self.inner.truth_problem_mut().caches_mut().clear_all();
        self.inner.reduced_problem_mut().caches_mut().clear_all();
        debug!("solution caches cleared for speed-up analysis");

        self.speedup_prior_mode = Some(prior);
        self.inner
            .truth_problem_mut()
            .set_persistence_mode(PersistenceMode::Disabled);
    }

    /// Restores the persistence mode recorded by
    /// [`init_speedup_analysis`](Self::init_speedup_analysis).
    ///
    /// Idempotent when no speed-up analysis is active.
    pub fn finalize_speedup_analysis(&mut self) {
        self.inner.finalize_speedup_analysis();
        if let Some(prior) = self.speedup_prior_mode.take() {
            self.inner.truth_problem_mut().set_persistence_mode(prior);
        }
    }

    /// Runs `f` between speed-up initialization and finalization, with
    /// finalization guaranteed on both success and failure.
    ///
    /// # Errors
    ///
    /// Propagates the result of `f`.
    pub fn speedup_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, M::Error>,
    ) -> Result<T, M::Error> {
        self.init_speedup_analysis();
        let result = f(self);
        self.finalize_speedup_analysis();
        result
    }
}

impl<M: TimeDependentMethod> ReductionMethod for TimeDependentReduction<M> {
    type Report = M::Report;
    type Error = M::Error;

    fn lifecycle(&self) -> &ReductionLifecycle {
        self.inner.lifecycle()
    }

    fn lifecycle_mut(&mut self) -> &mut ReductionLifecycle {
        self.inner.lifecycle_mut()
    }

    fn offline(&mut self) -> Result<(), Self::Error> {
        self.inner.offline()
    }

    fn error_analysis(&mut self, n: Option<usize>) -> Result<Self::Report, Self::Error> {
        self.inner.error_analysis(n)
    }

    fn init_offline(&mut self) -> Result<(), Self::Error> {
        self.inner.init_offline()
    }

    fn finalize_offline(&mut self) -> Result<(), Self::Error> {
        self.inner.finalize_offline()
    }

    fn init_error_analysis(&mut self) -> Result<(), Self::Error> {
        self.inner.init_error_analysis()
    }

    fn finalize_error_analysis(&mut self) -> Result<(), Self::Error> {
        self.inner.finalize_error_analysis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use uom::si::time::second;

    use crate::test_utils::MockMethod;

    fn wrapped() -> TimeDependentReduction<MockMethod> {
        let dir = tempfile::tempdir().unwrap();
        TimeDependentReduction::new(MockMethod::new(dir.path()))
    }

    fn seconds(value: f64) -> Time {
        Time::new::<second>(value)
    }

    #[test]
    fn indices_default_to_none() {
        let reduction = wrapped();
        assert_eq!(reduction.reduction_first_index(), None);
        assert_eq!(reduction.reduction_delta_index(), None);
        assert_eq!(reduction.reduction_last_index(), None);
    }

    #[test]
    fn derives_indices_from_truth_discretization() {
        // Truth problem in MockMethod: t0 = 0, dt = 0.01, T = 1.
        let mut reduction = wrapped();

        reduction.set_reduction_initial_time(seconds(0.2)).unwrap();
        assert_eq!(reduction.reduction_first_index(), Some(20));

        reduction
            .set_reduction_time_step_size(seconds(0.02))
            .unwrap();
        assert_eq!(reduction.reduction_delta_index(), Some(2));

        reduction.set_reduction_final_time(seconds(0.8)).unwrap();
        assert_eq!(reduction.reduction_last_index(), Some(80));
    }

    #[test]
    fn setters_re_derive_on_reinvocation() {
        let mut reduction = wrapped();

        reduction.set_reduction_initial_time(seconds(0.2)).unwrap();
        reduction.set_reduction_initial_time(seconds(0.5)).unwrap();
        assert_eq!(reduction.reduction_first_index(), Some(50));
    }

    #[test]
    fn rejects_out_of_range_times() {
        let mut reduction = wrapped();

        assert_eq!(
            reduction.set_reduction_initial_time(seconds(-0.1)),
            Err(TimeReductionError::InitialTimeBeforeTruth {
                t0: -0.1,
                truth_t0: 0.0
            })
        );
        assert_eq!(
            reduction.set_reduction_final_time(seconds(1.5)),
            Err(TimeReductionError::FinalTimeAfterTruth {
                t: 1.5,
                truth_t: 1.0
            })
        );
    }

    #[test]
    fn rejects_non_multiple_step() {
        let mut reduction = wrapped();

        assert_eq!(
            reduction.set_reduction_time_step_size(seconds(0.015)),
            Err(TimeReductionError::StepNotAMultiple {
                dt: 0.015,
                truth_dt: 0.01
            })
        );
        assert_eq!(
            reduction.set_reduction_time_step_size(seconds(0.005)),
            Err(TimeReductionError::StepSmallerThanTruth {
                dt: 0.005,
                truth_dt: 0.01
            })
        );
    }

    #[test]
    fn reduction_indices_honor_settings() {
        let mut reduction = wrapped();

        let full: Vec<usize> = reduction.reduction_indices().collect();
        assert_eq!(full.len(), 101);
        assert_eq!(full[0], 0);
        assert_eq!(full[100], 100);

        reduction.set_reduction_initial_time(seconds(0.2)).unwrap();
        reduction
            .set_reduction_time_step_size(seconds(0.02))
            .unwrap();
        reduction.set_reduction_final_time(seconds(0.3)).unwrap();
        let indices: Vec<usize> = reduction.reduction_indices().collect();
        assert_eq!(indices, vec![20, 22, 24, 26, 28, 30]);
    }

    #[test]
    fn downsample_selects_kept_steps() {
        let mut reduction = wrapped();
        reduction.set_reduction_initial_time(seconds(0.02)).unwrap();
        reduction
            .set_reduction_time_step_size(seconds(0.03))
            .unwrap();
        reduction.set_reduction_final_time(seconds(0.1)).unwrap();

        let series: TimeSeries<usize> = (0..11).collect();
        let kept = reduction.downsample(&series);
        assert_eq!(&kept[..], &[2, 5, 8]);
    }

    #[test]
    fn postprocess_sets_time_per_step() {
        // Reduced problem in MockMethod: dt = 0.1; leave delta unset and
        // align the truth step to match.
        let mut reduction = wrapped();
        reduction
            .set_reduction_time_step_size(seconds(0.1))
            .unwrap();

        let series = TimeSeries::from(vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        let result = reduction.postprocess_snapshot(series, 7).unwrap();

        assert_eq!(result.len(), 5);
        assert_eq!(&result[..], &[2.0, 4.0, 6.0, 8.0, 10.0]);

        let calls = &reduction.inner().postprocess_calls;
        assert_eq!(calls.len(), 5);
        for (call, expected_time) in calls.iter().zip([0.0, 0.1, 0.2, 0.3, 0.4]) {
            assert!(relative_eq!(call.0, expected_time, max_relative = 1e-12));
            assert_eq!(call.1, 7);
        }
    }

    #[test]
    fn postprocess_rejects_misaligned_reduced_step() {
        // Truth dt = 0.01 and reduced dt = 0.1 diverge unless the delta
        // index accounts for the factor of 10.
        let mut reduction = wrapped();

        let series = TimeSeries::from(vec![1.0]);
        let err = reduction.postprocess_snapshot(series, 0).unwrap_err();
        assert!(matches!(
            err,
            TimeDependentError::Time(TimeReductionError::MisalignedReducedStep { .. })
        ));
    }

    #[test]
    fn speedup_init_clears_caches_and_disables_persistence() {
        let mut reduction = wrapped();
        reduction.inner_mut().populate_caches();

        reduction.init_speedup_analysis();

        assert!(reduction.inner().truth.caches().is_all_empty());
        assert!(reduction.inner().reduced.caches().is_all_empty());
        assert_eq!(
            reduction.inner().truth.persistence_mode(),
            PersistenceMode::Disabled
        );

        reduction.finalize_speedup_analysis();
        assert_eq!(
            reduction.inner().truth.persistence_mode(),
            PersistenceMode::Normal
        );
    }

    #[test]
    fn speedup_scope_restores_on_failure() {
        let mut reduction = wrapped();

        let result: Result<(), _> = reduction.speedup_scope(|r| {
            assert_eq!(
                r.inner().truth.persistence_mode(),
                PersistenceMode::Disabled
            );
            Err(crate::test_utils::MockError)
        });

        assert!(result.is_err());
        assert_eq!(
            reduction.inner().truth.persistence_mode(),
            PersistenceMode::Normal
        );
    }
}
