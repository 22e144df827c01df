#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

/// Configuration mapping consumed from YAML files.
pub mod config;
/// Centralized constants for the on-disk dataset layout.
pub mod constants;
/// Dataset index construction and item access.
pub mod dataset;
/// Closed geometry, feature-kind, and load-mode sets.
pub mod geometry;
/// Item materialization from resolved path tables.
pub mod loader;
/// Simulation metadata table.
pub mod metadata;
/// Per-simulation path resolution.
pub mod paths;
/// Array file read/write contract.
pub mod store;
/// Shared type aliases.
pub mod types;

mod errors;

pub use config::{ConfigFile, DatasetConfig};
pub use dataset::{FemDataset, FemDatasetBuilder};
pub use errors::DatasetError;
pub use geometry::{validate_geometries, FeatureKind, Geometry, LoadMode};
pub use loader::{load_item, EdgeFeatures, SimulationItem};
pub use metadata::SimulationTable;
pub use paths::{
    resolve_simulation_paths, FeatureBundle, GeometryPaths, SimulationPaths,
};
pub use types::{ParameterVector, SimulationId, Tensor, TimestepIndex};
