//! A parametrized exponential-decay problem and a minimal reduction
//! method over it, used for end-to-end lifecycle tests.

use std::{fs, io, path::Path};

use thiserror::Error;
use uom::si::{f64::Time, time::second};

use rombus_core::{
    CacheKey, ParameterPoint, ParameterRange, ParametrizedProblem, PersistenceMode,
    SolutionCaches, SolutionIo, SolutionIoRequest, TimeDependentProblem, TimeSeries,
};
use rombus_reduce::{AnalysisTable, ReductionLifecycle, ReductionMethod, TimeDependentMethod};

/// Scalar decay `du/dt = -mu * u`, `u(0) = 1`, integrated with forward
/// Euler over `t in [0, 1]`.
///
/// Solutions are cached per parameter and persisted as JSON files, so the
/// problem exercises the real cache and persistence surfaces.
pub struct DecayProblem {
    range: ParameterRange,
    parameter: ParameterPoint,
    dt: Time,
    current_time: Time,
    caches: SolutionCaches<f64, f64>,
    mode: PersistenceMode,
}

impl DecayProblem {
    pub fn new(dt_seconds: f64) -> Self {
        Self {
            range: ParameterRange::new([(0.5, 2.0)]).unwrap(),
            parameter: ParameterPoint::new(vec![1.0]),
            dt: Time::new::<second>(dt_seconds),
            current_time: Time::new::<second>(0.0),
            caches: SolutionCaches::new(),
            mode: PersistenceMode::Normal,
        }
    }

    /// Integrates the decay equation at the current parameter, caching the
    /// trajectory and its terminal output.
    pub fn solve_over_time(&mut self) -> TimeSeries<f64> {
        let key = CacheKey::from_point(&self.parameter);
        if let Some(series) = self.caches.solution_over_time.get(&key) {
            return series.clone();
        }

        let mu = self.parameter[0];
        let dt = self.dt.get::<second>();
        let steps = (self.final_time().get::<second>() / dt).round() as usize;

        let mut series = TimeSeries::with_capacity(steps + 1);
        let mut u = 1.0;
        series.push(u);
        for _ in 0..steps {
            u *= 1.0 - mu * dt;
            series.push(u);
        }

        self.caches
            .solution_over_time
            .insert(key.clone(), series.clone());
        self.caches
            .output_over_time
            .insert(key.clone(), series.iter().map(|u| u * u).collect());
        if let Some(&terminal) = series.last() {
            self.caches.solution.insert(key, terminal);
        }
        series
    }

    /// The trajectory's terminal value at the current parameter.
    pub fn terminal_value(&mut self) -> f64 {
        self.solve_over_time().last().copied().unwrap_or(1.0)
    }

    fn file_name(request: &SolutionIoRequest<'_>) -> String {
        let mut name = request.filename.to_owned();
        if let Some(component) = request.component {
            name.push('_');
            name.push_str(component);
        }
        if let Some(suffix) = request.suffix {
            name.push('_');
            name.push_str(&suffix.to_string());
        }
        name + ".json"
    }

    fn file_path(request: &SolutionIoRequest<'_>) -> std::path::PathBuf {
        request.folder.join(Self::file_name(request))
    }
}

impl ParametrizedProblem for DecayProblem {
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

impl TimeDependentProblem for DecayProblem {
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

impl SolutionIo for DecayProblem {
    fn persistence_mode(&self) -> PersistenceMode {
        self.mode
    }

    fn set_persistence_mode(&mut self, mode: PersistenceMode) {
        self.mode = mode;
    }

    fn read_solution(
        &mut self,
        request: &SolutionIoRequest<'_>,
        solution_over_time: &mut TimeSeries<f64>,
    ) -> bool {
        let Ok(contents) = fs::read_to_string(Self::file_path(request)) else {
            return false;
        };
        match serde_json::from_str::<TimeSeries<f64>>(&contents) {
            Ok(series) => {
                *solution_over_time = series;
                true
            }
            Err(_) => false,
        }
    }

    fn write_solution(
        &self,
        request: &SolutionIoRequest<'_>,
        solution_over_time: &TimeSeries<f64>,
    ) -> io::Result<()> {
        fs::create_dir_all(request.folder)?;
        let encoded = serde_json::to_string(solution_over_time)
            .map_err(|error| io::Error::new(io::ErrorKind::InvalidData, error))?;
        fs::write(Self::file_path(request), encoded)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DecayReductionError {
    #[error("offline stage has not built a basis yet")]
    EmptyBasis,
}

/// A minimal reduction method over [`DecayProblem`].
///
/// The "basis" is the list of terminal truth values at the training
/// parameters; the reduced approximation at dimension `n` is their mean
/// over the first `n` entries.
/// Crude as an approximation, but it exercises the full lifecycle:
/// training solves during the offline stage, testing solves during error
/// analysis, caches and persistence on both problems.
pub struct DecayReduction {
    lifecycle: ReductionLifecycle,
    pub truth: DecayProblem,
    pub reduced: DecayProblem,
    pub basis: Vec<f64>,
}

impl DecayReduction {
    pub fn new(folder_prefix: &Path, truth_dt: f64, reduced_dt: f64) -> Self {
        let truth = DecayProblem::new(truth_dt);
        Self {
            lifecycle: ReductionLifecycle::for_problem(folder_prefix, &truth),
            truth,
            reduced: DecayProblem::new(reduced_dt),
            basis: Vec::new(),
        }
    }

    fn reduced_approximation(&self, n: usize) -> Result<f64, DecayReductionError> {
        let n = n.min(self.basis.len());
        if n == 0 {
            return Err(DecayReductionError::EmptyBasis);
        }
        Ok(self.basis[..n].iter().sum::<f64>() / n as f64)
    }
}

impl ReductionMethod for DecayReduction {
    type Report = AnalysisTable;
    type Error = DecayReductionError;

    fn lifecycle(&self) -> &ReductionLifecycle {
        &self.lifecycle
    }

    fn lifecycle_mut(&mut self) -> &mut ReductionLifecycle {
        &mut self.lifecycle
    }

    fn offline(&mut self) -> Result<(), Self::Error> {
        let points: Vec<ParameterPoint> = self.lifecycle.training_set().points().to_vec();
        let target = self.lifecycle.nmax().min(points.len());
        for point in points.iter().take(target).skip(self.basis.len()) {
            self.truth.set_parameter(point);
            let terminal = self.truth.terminal_value();
            self.basis.push(terminal);
        }
        Ok(())
    }

    fn error_analysis(&mut self, n: Option<usize>) -> Result<AnalysisTable, Self::Error> {
        let n = n.unwrap_or(self.basis.len());
        let approximation = self.reduced_approximation(n)?;

        let mut table = AnalysisTable::new("error_analysis");
        let points: Vec<ParameterPoint> = self.lifecycle.testing_set().points().to_vec();
        for point in &points {
            self.truth.set_parameter(point);
            let exact = self.truth.terminal_value();
            table.record("error_u", n, (exact - approximation).abs());
        }
        Ok(table)
    }
}

impl TimeDependentMethod for DecayReduction {
    type Truth = DecayProblem;
    type Reduced = DecayProblem;
    type Snapshot = f64;

    fn truth_problem(&self) -> &DecayProblem {
        &self.truth
    }

    fn truth_problem_mut(&mut self) -> &mut DecayProblem {
        &mut self.truth
    }

    fn reduced_problem(&self) -> &DecayProblem {
        &self.reduced
    }

    fn reduced_problem_mut(&mut self) -> &mut DecayProblem {
        &mut self.reduced
    }

    fn postprocess_snapshot(
        &mut self,
        snapshot: f64,
        _snapshot_index: usize,
    ) -> Result<f64, Self::Error> {
        // Undo the decay accumulated up to the current reduced time so
        // snapshots are comparable across timesteps.
        let mu = self.truth.current_parameter()[0];
        let t = self.reduced.current_time().get::<second>();
        Ok(snapshot * (mu * t).exp())
    }
}
