use uom::si::f64::Time;

use crate::{ParameterPoint, ParameterRange, SolutionCaches};

/// A full-order or reduced-order problem parametrized over a box in
/// parameter space.
///
/// The reduction lifecycle treats problems as collaborators: it reads the
/// parameter range to build sample sets and sets the current parameter
/// before delegating a solve.
/// Assembly and the solve itself belong to the discretization backend.
pub trait ParametrizedProblem {
    /// Returns the box in parameter space this problem is defined over.
    fn parameter_range(&self) -> &ParameterRange;

    /// Returns the parameter the problem is currently configured for.
    fn current_parameter(&self) -> &ParameterPoint;

    /// Configures the problem for a new parameter value.
    fn set_parameter(&mut self, parameter: &ParameterPoint);
}

/// A parametrized problem discretized over a time axis.
///
/// The problem owns its discretization (`t0`, `dt`, `T`), a mutable
/// current time, and the named [`SolutionCaches`] populated by its solve
/// layer.
/// Time quantities are unit-safe [`Time`] values; index arithmetic in the
/// reduction layer extracts seconds explicitly.
pub trait TimeDependentProblem: ParametrizedProblem {
    /// A single solution snapshot.
    type Solution;

    /// An output functional value.
    type Output;

    /// Start of the time interval.
    fn initial_time(&self) -> Time;

    /// Discretization step size.
    fn time_step_size(&self) -> Time;

    /// End of the time interval.
    fn final_time(&self) -> Time;

    /// The time the problem is currently positioned at.
    fn current_time(&self) -> Time;

    /// Repositions the problem's clock.
    ///
    /// Called by the reduction layer while post-processing a trajectory so
    /// that time-varying hooks observe the timestep they are applied to.
    fn set_time(&mut self, time: Time);

    /// The problem's solution caches.
    fn caches(&self) -> &SolutionCaches<Self::Solution, Self::Output>;

    /// Mutable access to the problem's solution caches.
    fn caches_mut(&mut self) -> &mut SolutionCaches<Self::Solution, Self::Output>;
}
