use std::{io, path::Path};

use tracing::debug;

use crate::{problem::TimeDependentProblem, TimeSeries};

/// Whether a problem's solution persistence is active.
///
/// In `Normal` mode, [`SolutionIo::import_solution`] and
/// [`SolutionIo::export_solution`] delegate to the problem's storage
/// backend.
/// In `Disabled` mode, imports report "not available" and exports do
/// nothing, which forces fresh solves during a timed comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PersistenceMode {
    #[default]
    Normal,
    Disabled,
}

/// A solution import/export request.
///
/// Bundles the full call signature used for time-dependent solutions:
/// destination folder, base filename, an optional solution component, and
/// an optional filename suffix (commonly a snapshot index).
#[derive(Debug, Clone, Copy)]
pub struct SolutionIoRequest<'a> {
    pub folder: &'a Path,
    pub filename: &'a str,
    pub component: Option<&'a str>,
    pub suffix: Option<usize>,
}

impl<'a> SolutionIoRequest<'a> {
    /// Creates a request with no component or suffix.
    #[must_use]
    pub fn new(folder: &'a Path, filename: &'a str) -> Self {
        Self {
            folder,
            filename,
            component: None,
            suffix: None,
        }
    }

    /// Returns a copy of the request restricted to a solution component.
    #[must_use]
    pub fn with_component(mut self, component: &'a str) -> Self {
        self.component = Some(component);
        self
    }

    /// Returns a copy of the request with a filename suffix.
    #[must_use]
    pub fn with_suffix(mut self, suffix: usize) -> Self {
        self.suffix = Some(suffix);
        self
    }
}

/// Solution persistence for a time-dependent problem.
///
/// Implementors provide the raw storage operations
/// ([`read_solution`](SolutionIo::read_solution) and
/// [`write_solution`](SolutionIo::write_solution)) together with a
/// [`PersistenceMode`] slot.
/// Callers go through the provided [`import_solution`] and
/// [`export_solution`] methods, which gate on the mode: a disabled problem
/// reports every import as unavailable and silently drops every export,
/// whatever the request contains.
///
/// [`import_solution`]: SolutionIo::import_solution
/// [`export_solution`]: SolutionIo::export_solution
pub trait SolutionIo: TimeDependentProblem {
    /// The problem's current persistence mode.
    fn persistence_mode(&self) -> PersistenceMode;

    /// Switches the problem's persistence mode.
    fn set_persistence_mode(&mut self, mode: PersistenceMode);

    /// Reads a persisted solution trajectory into `solution_over_time`.
    ///
    /// Returns `true` only if the trajectory was found and fully loaded.
    /// A missing or unreadable file is reported as `false`, never as an
    /// error: the caller's fallback is to recompute.
    fn read_solution(
        &mut self,
        request: &SolutionIoRequest<'_>,
        solution_over_time: &mut TimeSeries<Self::Solution>,
    ) -> bool;

    /// Writes a solution trajectory to storage.
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory cannot be written.
    fn write_solution(
        &self,
        request: &SolutionIoRequest<'_>,
        solution_over_time: &TimeSeries<Self::Solution>,
    ) -> io::Result<()>;

    /// Attempts to import a persisted solution trajectory.
    ///
    /// Returns `false` without touching storage when persistence is
    /// [`Disabled`](PersistenceMode::Disabled).
    fn import_solution(
        &mut self,
        request: &SolutionIoRequest<'_>,
        solution_over_time: &mut TimeSeries<Self::Solution>,
    ) -> bool {
        match self.persistence_mode() {
            PersistenceMode::Disabled => false,
            PersistenceMode::Normal => self.read_solution(request, solution_over_time),
        }
    }

    /// Exports a solution trajectory.
    ///
    /// Does nothing and returns `Ok(())` when persistence is
    /// [`Disabled`](PersistenceMode::Disabled).
    ///
    /// # Errors
    ///
    /// Returns an error if the trajectory cannot be written in
    /// [`Normal`](PersistenceMode::Normal) mode.
    fn export_solution(
        &self,
        request: &SolutionIoRequest<'_>,
        solution_over_time: &TimeSeries<Self::Solution>,
    ) -> io::Result<()> {
        match self.persistence_mode() {
            PersistenceMode::Disabled => Ok(()),
            PersistenceMode::Normal => self.write_solution(request, solution_over_time),
        }
    }
}

/// Scoped persistence-mode override with guaranteed restoration.
///
/// Installs `mode` on construction and restores the prior mode when
/// dropped, so an override cannot leak past the scope that requested it.
///
/// # Examples
///
/// ```ignore
/// let guard = PersistenceGuard::new(&mut problem, PersistenceMode::Disabled);
/// // ... timed solves, no imports or exports ...
/// drop(guard); // prior mode restored
/// ```
pub struct PersistenceGuard<'a, P: SolutionIo + ?Sized> {
    problem: &'a mut P,
    prior: PersistenceMode,
}

impl<'a, P: SolutionIo + ?Sized> PersistenceGuard<'a, P> {
    /// Installs `mode` on `problem`, remembering the prior mode.
    pub fn new(problem: &'a mut P, mode: PersistenceMode) -> Self {
        let prior = problem.persistence_mode();
        problem.set_persistence_mode(mode);
        debug!(?prior, ?mode, "persistence mode overridden");
        Self { problem, prior }
    }

    /// The problem under the override.
    pub fn problem(&mut self) -> &mut P {
        &mut *self.problem
    }
}

impl<P: SolutionIo + ?Sized> Drop for PersistenceGuard<'_, P> {
    fn drop(&mut self) {
        self.problem.set_persistence_mode(self.prior);
        debug!(restored = ?self.prior, "persistence mode restored");
    }
}
