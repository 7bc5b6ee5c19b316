use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;
use tracing::debug;

use rombus_core::{ParameterRange, ParametrizedProblem};
use rombus_sampling::{
    Folder, Folders, ParameterSpaceSubset, Sampling, SamplingError, SubsetIoError,
    UniformSampling,
};

const TRAINING_SET: &str = "training_set";
const TESTING_SET: &str = "testing_set";

/// Shared lifecycle state of a reduction method.
///
/// A `ReductionLifecycle` owns the training set, the testing set, the
/// basis-growth bound `Nmax`, and the folder registry their persistence is
/// rooted in.
/// Concrete reduction methods hold one and expose it through
/// [`ReductionMethod::lifecycle`](crate::ReductionMethod::lifecycle).
///
/// Phase sequencing is the driver's responsibility: nothing here prevents
/// re-running the offline stage after raising `Nmax`, and sample-set
/// initialization is idempotent: re-running against a populated folder
/// reuses the persisted set instead of regenerating it.
#[derive(Debug, Clone)]
pub struct ReductionLifecycle {
    folder_prefix: PathBuf,
    folders: Folders,
    nmax: usize,
    training_set: ParameterSpaceSubset,
    testing_set: ParameterSpaceSubset,
}

/// Error type returned when a sample set cannot be initialized.
///
/// A failed or mismatched import is *not* among these cases: import
/// problems fall back to regeneration.
#[derive(Debug, Error)]
pub enum SampleSetError {
    #[error("failed to create sample-set folder")]
    Folder(#[source] io::Error),

    #[error(transparent)]
    Sampling(#[from] SamplingError),

    #[error(transparent)]
    Persist(#[from] SubsetIoError),
}

impl ReductionLifecycle {
    /// Creates the lifecycle state for a problem parametrized over
    /// `range`, persisting sample sets under `folder_prefix`.
    ///
    /// `Nmax` starts at 0 and both sample sets start empty.
    /// The range cannot be empty: [`ParameterRange`] enforces
    /// non-emptiness at construction.
    #[must_use]
    pub fn new(folder_prefix: impl Into<PathBuf>, range: ParameterRange) -> Self {
        let folder_prefix = folder_prefix.into();
        let mut folders = Folders::new();
        folders.insert(TRAINING_SET, folder_prefix.join(TRAINING_SET));
        folders.insert(TESTING_SET, folder_prefix.join(TESTING_SET));
        Self {
            training_set: ParameterSpaceSubset::new(range.clone()),
            testing_set: ParameterSpaceSubset::new(range),
            folder_prefix,
            folders,
            nmax: 0,
        }
    }

    /// Creates the lifecycle state for `problem`, taking the parameter
    /// range from the problem itself.
    #[must_use]
    pub fn for_problem(folder_prefix: impl Into<PathBuf>, problem: &impl ParametrizedProblem) -> Self {
        Self::new(folder_prefix, problem.parameter_range().clone())
    }

    /// The prefix every persisted artifact is rooted at.
    #[must_use]
    pub fn folder_prefix(&self) -> &Path {
        &self.folder_prefix
    }

    /// The registry of named storage folders.
    #[must_use]
    pub fn folders(&self) -> &Folders {
        &self.folders
    }

    /// The bound on the reduced-space dimension.
    #[must_use]
    pub fn nmax(&self) -> usize {
        self.nmax
    }

    /// Overwrites the bound on the reduced-space dimension.
    ///
    /// The offline stage consumes this as its stopping criterion when
    /// growing the basis.
    pub fn set_nmax(&mut self, nmax: usize) {
        self.nmax = nmax;
    }

    /// The training set used by the offline stage.
    #[must_use]
    pub fn training_set(&self) -> &ParameterSpaceSubset {
        &self.training_set
    }

    /// The testing set used by error analysis.
    #[must_use]
    pub fn testing_set(&self) -> &ParameterSpaceSubset {
        &self.testing_set
    }

    /// Initializes the training set with `count` points using the default
    /// configuration: import enabled, uniform sampling.
    ///
    /// A training set is expensive to rebuild downstream (each point costs
    /// a truth solve during the offline stage), so re-runs reuse the
    /// persisted set whenever its size matches.
    ///
    /// Returns `true` if the set was imported from storage, `false` if it
    /// was (re)generated.
    ///
    /// # Errors
    ///
    /// Returns a [`SampleSetError`] if the storage folder cannot be
    /// created, sampling fails, or the regenerated set cannot be saved.
    pub fn initialize_training_set(&mut self, count: usize) -> Result<bool, SampleSetError> {
        self.initialize_training_set_with(count, true, &mut UniformSampling::new())
    }

    /// Initializes the training set with explicit import and sampling
    /// configuration.
    ///
    /// Contract, in order: ensure the storage folder exists (idempotent);
    /// if `enable_import`, attempt to load the persisted set and accept it
    /// only if its size equals `count`; otherwise generate exactly `count`
    /// fresh points and persist them, overwriting prior content.
    ///
    /// # Errors
    ///
    /// See [`initialize_training_set`](Self::initialize_training_set).
    pub fn initialize_training_set_with(
        &mut self,
        count: usize,
        enable_import: bool,
        sampling: &mut dyn Sampling,
    ) -> Result<bool, SampleSetError> {
        let folder = self
            .folders
            .get(TRAINING_SET)
            .expect("training-set folder is registered at construction");
        Self::initialize_set(
            folder,
            &mut self.training_set,
            TRAINING_SET,
            count,
            enable_import,
            sampling,
        )
    }

    /// Initializes the testing set with `count` points using the default
    /// configuration: **import disabled**, uniform sampling.
    ///
    /// Unlike the training set, the testing set is regenerated on every
    /// run by default: reusing a persisted testing set would bias repeated
    /// error analyses toward one stale sample of the parameter space.
    ///
    /// Returns `true` if the set was imported from storage, `false` if it
    /// was (re)generated.
    ///
    /// # Errors
    ///
    /// See [`initialize_training_set`](Self::initialize_training_set).
    pub fn initialize_testing_set(&mut self, count: usize) -> Result<bool, SampleSetError> {
        self.initialize_testing_set_with(count, false, &mut UniformSampling::new())
    }

    /// Initializes the testing set with explicit import and sampling
    /// configuration.
    ///
    /// Same contract as
    /// [`initialize_training_set_with`](Self::initialize_training_set_with).
    ///
    /// # Errors
    ///
    /// See [`initialize_training_set`](Self::initialize_training_set).
    pub fn initialize_testing_set_with(
        &mut self,
        count: usize,
        enable_import: bool,
        sampling: &mut dyn Sampling,
    ) -> Result<bool, SampleSetError> {
        let folder = self
            .folders
            .get(TESTING_SET)
            .expect("testing-set folder is registered at construction");
        Self::initialize_set(
            folder,
            &mut self.testing_set,
            TESTING_SET,
            count,
            enable_import,
            sampling,
        )
    }

    fn initialize_set(
        folder: &Folder,
        set: &mut ParameterSpaceSubset,
        name: &str,
        count: usize,
        enable_import: bool,
        sampling: &mut dyn Sampling,
    ) -> Result<bool, SampleSetError> {
        folder.create().map_err(SampleSetError::Folder)?;

        let imported = enable_import && set.load(folder, name) && set.len() == count;
        if !imported {
            set.generate(count, sampling)?;
            set.save(folder, name)?;
        }
        debug!(name, count, imported, "sample set initialized");
        Ok(imported)
    }
}
