use std::path::PathBuf;

use ndarray::{concatenate, stack, Axis};

use crate::errors::DatasetError;
use crate::paths::{FeatureBundle, SimulationPaths};
use crate::store;
use crate::types::{ParameterVector, Tensor};

/// Node-index and edge-feature tensors for one features-capable geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeFeatures {
    /// Node-to-edge index tensor read from the bundle's index file.
    pub node_index: Tensor,
    /// Per-kind tensors stacked along a new leading axis, each kind built by
    /// concatenating its selected timesteps along the trailing axis. Shape:
    /// `(num_kinds, ..., concatenated timesteps)`.
    pub features: Tensor,
}

/// One simulation's materialized payload.
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationItem {
    /// Metadata row as a flat numeric vector (id first when requested).
    pub parameters: ParameterVector,
    /// One stacked point-cloud tensor per geometry, in geometry-list order;
    /// the leading axis is the selected timesteps.
    pub node_clouds: Vec<Tensor>,
    /// Present in combined mode when a features-capable geometry was selected.
    pub edge_features: Option<EdgeFeatures>,
}

/// Materialize one simulation from its resolved path table entry.
///
/// Every call re-reads storage and allocates fresh output buffers; nothing is
/// cached or shared between calls, so disjoint indices can be loaded from
/// multiple worker threads without coordination.
pub fn load_item(
    paths: &SimulationPaths,
    parameters: ParameterVector,
) -> Result<SimulationItem, DatasetError> {
    let mut node_clouds = Vec::with_capacity(paths.geometries.len());
    let mut edge_features = None;
    for entry in paths.geometries.values() {
        node_clouds.push(stack_timesteps(&entry.point_clouds)?);
        if edge_features.is_none() {
            if let Some(bundle) = &entry.features {
                edge_features = Some(load_edge_features(bundle)?);
            }
        }
    }
    Ok(SimulationItem {
        parameters,
        node_clouds,
        edge_features,
    })
}

/// Read a selected file sequence and stack it along a new leading axis.
fn stack_timesteps(files: &[PathBuf]) -> Result<Tensor, DatasetError> {
    let arrays = read_all(files)?;
    let views: Vec<_> = arrays.iter().map(Tensor::view).collect();
    stack(Axis(0), &views).map_err(|err| shape_error(files, err))
}

/// Read a selected file sequence and concatenate it along the trailing axis.
fn concatenate_timesteps(files: &[PathBuf]) -> Result<Tensor, DatasetError> {
    let arrays = read_all(files)?;
    let Some(first) = arrays.first() else {
        return Err(shape_error(
            files,
            ndarray::ShapeError::from_kind(ndarray::ErrorKind::IncompatibleShape),
        ));
    };
    let trailing = Axis(first.ndim().saturating_sub(1));
    let views: Vec<_> = arrays.iter().map(Tensor::view).collect();
    concatenate(trailing, &views).map_err(|err| shape_error(files, err))
}

fn load_edge_features(bundle: &FeatureBundle) -> Result<EdgeFeatures, DatasetError> {
    let node_index = store::read_array(&bundle.node_index)?;
    let mut per_kind = Vec::with_capacity(bundle.features.len());
    for files in bundle.features.values() {
        per_kind.push(concatenate_timesteps(files)?);
    }
    let views: Vec<_> = per_kind.iter().map(Tensor::view).collect();
    let features = stack(Axis(0), &views).map_err(|err| DatasetError::Array {
        path: bundle.node_index.clone(),
        reason: format!("edge-feature kinds have mismatched shapes: {err}"),
    })?;
    Ok(EdgeFeatures {
        node_index,
        features,
    })
}

fn read_all(files: &[PathBuf]) -> Result<Vec<Tensor>, DatasetError> {
    files.iter().map(|path| store::read_array(path)).collect()
}

fn shape_error(files: &[PathBuf], err: ndarray::ShapeError) -> DatasetError {
    DatasetError::Array {
        path: files.first().cloned().unwrap_or_default(),
        reason: err.to_string(),
    }
}
