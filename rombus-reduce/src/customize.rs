use std::{
    any::{type_name, TypeId},
    collections::HashMap,
    path::PathBuf,
    sync::{Arc, Mutex, OnceLock},
};

use thiserror::Error;
use tracing::debug;

use rombus_core::ParameterRange;

use crate::ReductionLifecycle;

/// Marker for an abstract family of problems.
///
/// Customizations are keyed by family so they survive later specialization
/// of the concrete problem (lifting, interpolation, or constraint
/// decorations applied afterwards).
/// Implement this for the *trait-object* type of the family's problem
/// trait, which is exactly the type no concrete problem instance has:
///
/// ```
/// use rombus_reduce::ProblemFamily;
///
/// trait EllipticProblem {}
/// impl ProblemFamily for dyn EllipticProblem {}
/// ```
pub trait ProblemFamily: 'static {}

/// Alternative lifecycle behavior for one problem family.
pub trait ReductionCustomizer: Send + Sync {
    /// A short name for diagnostics.
    fn name(&self) -> &str;

    /// Adjusts a freshly constructed lifecycle.
    fn customize(&self, lifecycle: &mut ReductionLifecycle);
}

/// Error type returned on invalid registry use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("customizer registry is sealed; registration must happen before reduction methods are constructed")]
    Sealed,
}

/// A registry of per-family lifecycle customizers.
///
/// Lookups are keyed by the exact family type; there is no
/// inheritance-aware fallback.
/// The intended discipline is a registration phase during process startup,
/// then [`seal`](CustomizerRegistry::seal), then read-only lookups at
/// reduction-method construction time.
/// Entries accumulate for the registry's lifetime; there is no removal.
#[derive(Default)]
pub struct CustomizerRegistry {
    entries: HashMap<TypeId, Arc<dyn ReductionCustomizer>>,
    sealed: bool,
}

impl CustomizerRegistry {
    /// Creates an empty, unsealed registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Associates `customizer` with the family `F`, replacing any prior
    /// association.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Sealed`] if the registration phase has
    /// ended.
    pub fn register<F: ProblemFamily + ?Sized>(
        &mut self,
        customizer: Arc<dyn ReductionCustomizer>,
    ) -> Result<(), RegistryError> {
        if self.sealed {
            return Err(RegistryError::Sealed);
        }
        debug!(
            family = type_name::<F>(),
            customizer = customizer.name(),
            "reduction-method customizer registered"
        );
        self.entries.insert(TypeId::of::<F>(), customizer);
        Ok(())
    }

    /// Returns the customizer registered for the family `F`, if any.
    #[must_use]
    pub fn customizer_for<F: ProblemFamily + ?Sized>(
        &self,
    ) -> Option<Arc<dyn ReductionCustomizer>> {
        self.entries.get(&TypeId::of::<F>()).cloned()
    }

    /// Ends the registration phase; later registrations fail.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Returns `true` once the registration phase has ended.
    #[must_use]
    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns the number of registered customizers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no customizer is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The process-wide registry, for registration during module startup.
///
/// An injectable [`CustomizerRegistry`] is preferable wherever one can be
/// passed in; this accessor exists for programs that register customizers
/// from scattered initialization code.
pub fn global_registry() -> &'static Mutex<CustomizerRegistry> {
    static GLOBAL: OnceLock<Mutex<CustomizerRegistry>> = OnceLock::new();
    GLOBAL.get_or_init(|| Mutex::new(CustomizerRegistry::new()))
}

/// Builds the lifecycle state for a problem of family `F`, applying the
/// family's registered customizer when present.
#[must_use]
pub fn customized_lifecycle<F: ProblemFamily + ?Sized>(
    registry: &CustomizerRegistry,
    folder_prefix: impl Into<PathBuf>,
    range: ParameterRange,
) -> ReductionLifecycle {
    let mut lifecycle = ReductionLifecycle::new(folder_prefix, range);
    if let Some(customizer) = registry.customizer_for::<F>() {
        debug!(
            family = type_name::<F>(),
            customizer = customizer.name(),
            "applying reduction-method customization"
        );
        customizer.customize(&mut lifecycle);
    }
    lifecycle
}
