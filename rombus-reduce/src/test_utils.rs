//! Mock problems and a recording reduction method for unit tests.

use std::{cell::Cell, fmt, io, path::Path};

use uom::si::{f64::Time, time::second};

use rombus_core::{
    CacheKey, ParameterPoint, ParameterRange, ParametrizedProblem, PersistenceMode,
    SolutionCaches, SolutionIo, SolutionIoRequest, TimeDependentProblem, TimeSeries,
};

use crate::{ReductionLifecycle, ReductionMethod, TimeDependentMethod};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MockError;

impl fmt::Display for MockError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "mock failure")
    }
}

impl std::error::Error for MockError {}

/// A time-dependent problem over `t0 = 0`, `T = 1` with a configurable
/// step size.
pub struct MockProblem {
    range: ParameterRange,
    parameter: ParameterPoint,
    dt: Time,
    current_time: Time,
    caches: SolutionCaches<f64, f64>,
    mode: PersistenceMode,
    stored: Option<TimeSeries<f64>>,
    pub writes: Cell<usize>,
}

impl MockProblem {
    pub fn new(dt_seconds: f64) -> Self {
        Self {
            range: ParameterRange::new([(1.0, 3.0)]).unwrap(),
            parameter: ParameterPoint::new(vec![2.0]),
            dt: Time::new::<second>(dt_seconds),
            current_time: Time::new::<second>(0.0),
            caches: SolutionCaches::new(),
            mode: PersistenceMode::Normal,
            stored: None,
            writes: Cell::new(0),
        }
    }

}

impl ParametrizedProblem for MockProblem {
    fn parameter_range(&self) -> &ParameterRange {
        &self.range
    }

    fn current_parameter(&self) -> &ParameterPoint {
        &self.parameter
    }

    fn set_parameter(&mut self, parameter: &ParameterPoint) {
        self.parameter = parameter.clone();
    }
}

impl TimeDependentProblem for MockProblem {
    type Solution = f64;
    type Output = f64;

    fn initial_time(&self) -> Time {
        Time::new::<second>(0.0)
    }

    fn time_step_size(&self) -> Time {
        self.dt
    }

    fn final_time(&self) -> Time {
        Time::new::<second>(1.0)
    }

    fn current_time(&self) -> Time {
        self.current_time
    }

    fn set_time(&mut self, time: Time) {
        self.current_time = time;
    }

    fn caches(&self) -> &SolutionCaches<f64, f64> {
        &self.caches
    }

    fn caches_mut(&mut self) -> &mut SolutionCaches<f64, f64> {
        &mut self.caches
    }
}

impl SolutionIo for MockProblem {
    fn persistence_mode(&self) -> PersistenceMode {
        self.mode
    }

    fn set_persistence_mode(&mut self, mode: PersistenceMode) {
        self.mode = mode;
    }

    fn read_solution(
        &mut self,
        _request: &SolutionIoRequest<'_>,
        solution_over_time: &mut TimeSeries<f64>,
    ) -> bool {
        match &self.stored {
            Some(series) => {
                *solution_over_time = series.clone();
                true
            }
            None => false,
        }
    }

    fn write_solution(
        &self,
        _request: &SolutionIoRequest<'_>,
        _solution_over_time: &TimeSeries<f64>,
    ) -> io::Result<()> {
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}

/// A reduction method that records every hook and post-processing call.
///
/// Truth step size is 0.01 s, reduced step size 0.1 s.
pub struct MockMethod {
    lifecycle: ReductionLifecycle,
    pub truth: MockProblem,
    pub reduced: MockProblem,
    pub basis_size: usize,
    pub hook_log: Vec<&'static str>,
    pub postprocess_calls: Vec<(f64, usize)>,
}

impl MockMethod {
    pub fn new(folder_prefix: &Path) -> Self {
        let truth = MockProblem::new(0.01);
        Self {
            lifecycle: ReductionLifecycle::for_problem(folder_prefix, &truth),
            truth,
            reduced: MockProblem::new(0.1),
            basis_size: 0,
            hook_log: Vec::new(),
            postprocess_calls: Vec::new(),
        }
    }

    pub fn populate_caches(&mut self) {
        let key = CacheKey::from_point(self.truth.current_parameter());
        for problem in [&mut self.truth, &mut self.reduced] {
            let caches = problem.caches_mut();
            caches.solution.insert(key.clone(), 1.0);
            caches.solution_dot.insert(key.clone(), 2.0);
            caches
                .solution_over_time
                .insert(key.clone(), TimeSeries::from(vec![1.0, 2.0]));
            caches
                .solution_dot_over_time
                .insert(key.clone(), TimeSeries::from(vec![0.1, 0.2]));
            caches
                .output_over_time
                .insert(key.clone(), TimeSeries::from(vec![3.0]));
        }
    }
}

impl ReductionMethod for MockMethod {
    type Report = usize;
    type Error = MockError;

    fn lifecycle(&self) -> &ReductionLifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut ReductionLifecycle {
        &mut self.lifecycle
    }

    fn offline(&mut self) -> Result<(), Self::Error> {
        self.hook_log.push("offline");
        self.basis_size = self.lifecycle.nmax();
        Ok(())
    }

    fn error_analysis(&mut self, _n: Option<usize>) -> Result<usize, Self::Error> {
        self.hook_log.push("error_analysis");
        Ok(self.lifecycle.testing_set().len())
    }

    fn init_offline(&mut self) -> Result<(), Self::Error> {
        self.hook_log.push("init_offline");
        Ok(())
    }

    fn finalize_offline(&mut self) -> Result<(), Self::Error> {
        self.hook_log.push("finalize_offline");
        Ok(())
    }

    fn init_error_analysis(&mut self) -> Result<(), Self::Error> {
        self.hook_log.push("init_error_analysis");
        Ok(())
    }

    fn finalize_error_analysis(&mut self) -> Result<(), Self::Error> {
        self.hook_log.push("finalize_error_analysis");
        Ok(())
    }
}

impl TimeDependentMethod for MockMethod {
    type Truth = MockProblem;
    type Reduced = MockProblem;
    type Snapshot = f64;

    fn truth_problem(&self) -> &MockProblem {
        &self.truth
    }

    fn truth_problem_mut(&mut self) -> &mut MockProblem {
        &mut self.truth
    }

    fn reduced_problem(&self) -> &MockProblem {
        &self.reduced
    }

    fn reduced_problem_mut(&mut self) -> &mut MockProblem {
        &mut self.reduced
    }

    fn postprocess_snapshot(
        &mut self,
        snapshot: f64,
        snapshot_index: usize,
    ) -> Result<f64, Self::Error> {
        self.postprocess_calls
            .push((self.reduced.current_time().get::<second>(), snapshot_index));
        Ok(snapshot * 2.0)
    }
}
