use tracing::debug;

use crate::ReductionLifecycle;

/// The offline/online capability contract of a reduction method.
///
/// A concrete method owns a [`ReductionLifecycle`] (training set, testing
/// set, `Nmax`, folders) and provides the two phase bodies the framework
/// cannot supply: [`offline`](Self::offline), which builds the reduced
/// basis, and [`error_analysis`](Self::error_analysis), which compares the
/// reduced model against the truth model over the testing set.
/// Omitting either is a compile error; the contract is enforced when the
/// implementing type is defined, not on first call.
///
/// The `init_*`/`finalize_*` hooks default to no-ops and exist so that
/// implementors can set up or tear down transient phase state without
/// restating the phase driver.
/// Drivers call [`offline_phase`](Self::offline_phase) and
/// [`error_analysis_phase`](Self::error_analysis_phase), which bracket the
/// phase bodies with their hooks; a failure anywhere propagates unchanged
/// and skips the remaining bracket steps.
///
/// Phases may be re-entered: raising `Nmax` and re-running
/// `offline_phase` extends the basis, and `error_analysis_phase` may be
/// invoked repeatedly with different reduced dimensions.
pub trait ReductionMethod {
    /// The error-analysis result.
    type Report;

    /// The phase failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// The method's shared lifecycle state.
    fn lifecycle(&self) -> &ReductionLifecycle;

    /// Mutable access to the method's shared lifecycle state.
    fn lifecycle_mut(&mut self) -> &mut ReductionLifecycle;

    /// Performs the offline stage: the (expensive, one-time) construction
    /// of the reduced basis, stopping at the lifecycle's `Nmax`.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if basis construction fails.
    fn offline(&mut self) -> Result<(), Self::Error>;

    /// Computes the reduced-vs-truth error over the testing set,
    /// optionally restricted to reduced dimension `n`.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if the analysis fails.
    fn error_analysis(&mut self, n: Option<usize>) -> Result<Self::Report, Self::Error>;

    /// Prepares transient state for the offline stage.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if preparation fails.
    fn init_offline(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Tears down transient state after the offline stage.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if teardown fails.
    fn finalize_offline(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Prepares transient state for error analysis.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if preparation fails.
    fn init_error_analysis(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Tears down transient state after error analysis.
    ///
    /// # Errors
    ///
    /// Returns `Err(Self::Error)` if teardown fails.
    fn finalize_error_analysis(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Runs the offline stage bracketed by its hooks.
    ///
    /// # Errors
    ///
    /// Propagates the first hook or phase failure unchanged.
    fn offline_phase(&mut self) -> Result<(), Self::Error> {
        debug!(nmax = self.lifecycle().nmax(), "offline phase started");
        self.init_offline()?;
        self.offline()?;
        self.finalize_offline()?;
        debug!("offline phase finished");
        Ok(())
    }

    /// Runs error analysis bracketed by its hooks.
    ///
    /// # Errors
    ///
    /// Propagates the first hook or phase failure unchanged.
    fn error_analysis_phase(&mut self, n: Option<usize>) -> Result<Self::Report, Self::Error> {
        debug!(?n, "error analysis started");
        self.init_error_analysis()?;
        let report = self.error_analysis(n)?;
        self.finalize_error_analysis()?;
        debug!("error analysis finished");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::test_utils::MockMethod;

    #[test]
    fn offline_phase_brackets_with_hooks() {
        let dir = tempfile::tempdir().unwrap();
        let mut method = MockMethod::new(dir.path());

        method.offline_phase().unwrap();
        assert_eq!(
            method.hook_log,
            vec!["init_offline", "offline", "finalize_offline"]
        );
    }

    #[test]
    fn error_analysis_phase_brackets_with_hooks() {
        let dir = tempfile::tempdir().unwrap();
        let mut method = MockMethod::new(dir.path());
        method.lifecycle_mut().initialize_testing_set(6).unwrap();

        let report = method.error_analysis_phase(Some(2)).unwrap();
        assert_eq!(report, 6);
        assert_eq!(
            method.hook_log,
            vec![
                "init_error_analysis",
                "error_analysis",
                "finalize_error_analysis"
            ]
        );
    }

    #[test]
    fn offline_extends_after_nmax_raise() {
        let dir = tempfile::tempdir().unwrap();
        let mut method = MockMethod::new(dir.path());

        method.lifecycle_mut().set_nmax(3);
        method.offline_phase().unwrap();
        assert_eq!(method.basis_size, 3);

        method.lifecycle_mut().set_nmax(5);
        method.offline_phase().unwrap();
        assert_eq!(method.basis_size, 5);
    }
}
