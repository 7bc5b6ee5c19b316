use approx::assert_relative_eq;
use uom::si::{f64::Time, time::second};

use integration_tests::test_problems::DecayReduction;
use rombus_core::{
    PersistenceGuard, PersistenceMode, SolutionIo, SolutionIoRequest, TimeDependentProblem,
    TimeSeries,
};
use rombus_reduce::{ReductionMethod, TimeDependentReduction};

fn seconds(value: f64) -> Time {
    Time::new::<second>(value)
}

#[test]
fn full_offline_online_cycle() {
    let dir = tempfile::tempdir().unwrap();
    let mut method = DecayReduction::new(dir.path(), 0.01, 0.01);

    assert!(!method.lifecycle_mut().initialize_training_set(8).unwrap());
    method.lifecycle_mut().set_nmax(4);
    method.offline_phase().unwrap();
    assert_eq!(method.basis.len(), 4);

    assert!(!method.lifecycle_mut().initialize_testing_set(5).unwrap());
    let report = method.error_analysis_phase(Some(2)).unwrap();

    assert!(report.mean("error_u", 2).is_some());
    assert!(report.max("error_u", 2).unwrap() >= report.min("error_u", 2).unwrap());
}

#[test]
fn offline_reentry_extends_basis() {
    let dir = tempfile::tempdir().unwrap();
    let mut method = DecayReduction::new(dir.path(), 0.01, 0.01);
    method.lifecycle_mut().initialize_training_set(6).unwrap();

    method.lifecycle_mut().set_nmax(2);
    method.offline_phase().unwrap();
    let head = method.basis.clone();

    method.lifecycle_mut().set_nmax(5);
    method.offline_phase().unwrap();

    assert_eq!(method.basis.len(), 5);
    assert_eq!(&method.basis[..2], &head[..]);
}

#[test]
fn training_set_persists_across_methods() {
    let dir = tempfile::tempdir().unwrap();

    let mut first = DecayReduction::new(dir.path(), 0.01, 0.01);
    assert!(!first.lifecycle_mut().initialize_training_set(10).unwrap());
    let points = first.lifecycle().training_set().points().to_vec();

    let mut reopened = DecayReduction::new(dir.path(), 0.01, 0.01);
    assert!(reopened.lifecycle_mut().initialize_training_set(10).unwrap());
    assert_eq!(reopened.lifecycle().training_set().points(), &points[..]);
}

#[test]
fn testing_set_regenerates_for_each_run() {
    let dir = tempfile::tempdir().unwrap();
    let mut method = DecayReduction::new(dir.path(), 0.01, 0.01);

    method.lifecycle_mut().initialize_testing_set(6).unwrap();
    let first = method.lifecycle().testing_set().points().to_vec();

    method.lifecycle_mut().initialize_testing_set(6).unwrap();
    assert_ne!(method.lifecycle().testing_set().points(), &first[..]);
}

#[test]
fn speedup_analysis_invalidates_caches_and_blocks_io() {
    let dir = tempfile::tempdir().unwrap();
    let solutions_dir = dir.path().join("solutions");
    let mut reduction = TimeDependentReduction::new(DecayReduction::new(dir.path(), 0.01, 0.01));

    // Populate caches on both problems and persist one truth trajectory.
    let series = reduction.inner_mut().truth.solve_over_time();
    reduction.inner_mut().reduced.solve_over_time();
    let request = SolutionIoRequest::new(&solutions_dir, "truth_solution")
        .with_component("u")
        .with_suffix(0);
    reduction
        .inner()
        .truth
        .export_solution(&request, &series)
        .unwrap();
    assert!(!reduction.inner().truth.caches().is_all_empty());

    reduction.init_speedup_analysis();

    let inner = reduction.inner_mut();
    assert!(inner.truth.caches().is_all_empty());
    assert!(inner.reduced.caches().is_all_empty());

    // The persisted trajectory exists, but import must report "not
    // available" and export must write nothing while the analysis runs.
    let mut loaded = TimeSeries::new();
    assert!(!inner.truth.import_solution(&request, &mut loaded));
    assert!(loaded.is_empty());

    let blocked = SolutionIoRequest::new(&solutions_dir, "blocked");
    inner.truth.export_solution(&blocked, &series).unwrap();
    assert!(!solutions_dir.join("blocked.json").exists());

    reduction.finalize_speedup_analysis();

    let inner = reduction.inner_mut();
    assert_eq!(inner.truth.persistence_mode(), PersistenceMode::Normal);
    let mut reloaded = TimeSeries::new();
    assert!(inner.truth.import_solution(&request, &mut reloaded));
    assert_eq!(reloaded.len(), series.len());
}

#[test]
fn postprocess_walks_the_reduced_clock() {
    let dir = tempfile::tempdir().unwrap();
    // Truth dt 0.02 downsampled by 5 to the reduced dt 0.1.
    let mut reduction = TimeDependentReduction::new(DecayReduction::new(dir.path(), 0.02, 0.1));
    reduction.set_reduction_time_step_size(seconds(0.1)).unwrap();

    let series = TimeSeries::from(vec![1.0; 4]);
    let result = reduction.postprocess_snapshot(series, 0).unwrap();

    assert_eq!(result.len(), 4);
    // mu = 1, so each snapshot is rescaled by exp(k * 0.1).
    for (k, value) in result.iter().enumerate() {
        assert_relative_eq!(*value, (k as f64 * 0.1).exp(), max_relative = 1e-12);
    }
    assert_relative_eq!(
        reduction.inner().reduced.current_time().get::<second>(),
        0.3,
        max_relative = 1e-12
    );
}

#[test]
fn persistence_guard_restores_prior_mode() {
    let dir = tempfile::tempdir().unwrap();
    let mut method = DecayReduction::new(dir.path(), 0.01, 0.01);

    {
        let mut guard = PersistenceGuard::new(&mut method.truth, PersistenceMode::Disabled);
        assert_eq!(
            guard.problem().persistence_mode(),
            PersistenceMode::Disabled
        );
    }
    assert_eq!(method.truth.persistence_mode(), PersistenceMode::Normal);
}
