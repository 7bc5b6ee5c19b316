//! Parameter-space sampling for the Rombus framework.
//!
//! This crate provides:
//!
//! - [`Sampling`] — the strategy trait, with [`UniformSampling`],
//!   [`LogUniformSampling`], and [`EquispacedSampling`] implementations
//! - [`ParameterSpaceSubset`] — an ordered, persistable collection of
//!   parameter points (training and testing sets)
//! - [`Folders`], [`Folder`] — a registry of named storage locations with
//!   lazy, idempotent directory creation

mod folders;
mod strategy;
mod subset;

pub use folders::{Folder, Folders};
pub use strategy::{
    EquispacedSampling, LogUniformSampling, Sampling, SamplingError, UniformSampling,
};
pub use subset::{ParameterSpaceSubset, SubsetIoError};
