use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::constants::layout::{ARRAY_EXTENSION, EDGE_FEATURE_DIR, POINT_CLOUD_DIR};
use crate::errors::DatasetError;
use crate::geometry::{FeatureKind, Geometry, LoadMode};
use crate::types::{SimulationId, TimestepIndex};

/// Edge-feature file bundle for one features-capable geometry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureBundle {
    /// Node-to-edge index file: the first file in sorted order, included
    /// regardless of timestep selection.
    pub node_index: PathBuf,
    /// Selected per-timestep files, grouped by feature kind in declared order.
    pub features: IndexMap<FeatureKind, Vec<PathBuf>>,
}

/// Resolved files for one geometry within one simulation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeometryPaths {
    /// Point-cloud files selected by timestep, in selector order.
    pub point_clouds: Vec<PathBuf>,
    /// Edge-feature bundle; present only for features-capable geometries when
    /// the load mode asks for features.
    pub features: Option<FeatureBundle>,
}

/// Path table entry for one simulation, keyed in requested geometry order.
///
/// Identical directory contents always resolve to an identical entry: the
/// only ordering applied is an explicit lexicographic sort on file names, so
/// OS listing order never leaks through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SimulationPaths {
    /// Per-geometry resolved files, in requested geometry order.
    pub geometries: IndexMap<Geometry, GeometryPaths>,
}

/// Resolve the full path table entry for one simulation.
pub fn resolve_simulation_paths(
    base_dir: &Path,
    sim_id: &SimulationId,
    geometries: &[Geometry],
    timesteps: &[TimestepIndex],
    load_mode: LoadMode,
) -> Result<SimulationPaths, DatasetError> {
    let pc_dir = base_dir.join(POINT_CLOUD_DIR).join(sim_id);
    if !pc_dir.is_dir() {
        return Err(DatasetError::MissingDirectory { path: pc_dir });
    }
    let ef_dir = base_dir.join(EDGE_FEATURE_DIR).join(sim_id);
    if load_mode.wants_features() && !ef_dir.is_dir() {
        return Err(DatasetError::MissingDirectory { path: ef_dir });
    }

    let mut table = IndexMap::with_capacity(geometries.len());
    for &geometry in geometries {
        let discovered = list_geometry_files(&pc_dir, geometry)?;
        let point_clouds = select_timesteps(&pc_dir, &discovered, timesteps)?;
        let features = if load_mode.wants_features() && geometry.has_edge_features() {
            Some(resolve_feature_bundle(&ef_dir, geometry, timesteps)?)
        } else {
            None
        };
        table.insert(
            geometry,
            GeometryPaths {
                point_clouds,
                features,
            },
        );
    }
    debug!(
        simulation = %sim_id,
        geometries = table.len(),
        "resolved simulation path table"
    );
    Ok(SimulationPaths { geometries: table })
}

/// List a geometry's array files in `dir`, sorted lexicographically by name.
///
/// File naming is assumed to embed timestep order lexicographically, so this
/// sort is the canonical timestep ordering.
fn list_geometry_files(dir: &Path, geometry: Geometry) -> Result<Vec<PathBuf>, DatasetError> {
    let mut files: Vec<PathBuf> = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry.map_err(std::io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let starts_with_geometry = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(geometry.as_str()))
            .unwrap_or(false);
        if starts_with_geometry && is_array_file(path) {
            files.push(path.to_path_buf());
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// True if the path has the array-store extension (case-insensitive).
fn is_array_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(ARRAY_EXTENSION))
        .unwrap_or(false)
}

/// Select entries of a sorted file sequence by timestep, preserving selector order.
fn select_timesteps(
    dir: &Path,
    files: &[PathBuf],
    timesteps: &[TimestepIndex],
) -> Result<Vec<PathBuf>, DatasetError> {
    timesteps
        .iter()
        .map(|&step| {
            let resolved =
                resolve_index(step, files.len()).ok_or_else(|| DatasetError::FileCountMismatch {
                    path: dir.to_path_buf(),
                    requested: step,
                    available: files.len(),
                })?;
            Ok(files[resolved].clone())
        })
        .collect()
}

/// Map a sequence index onto `len`; negative values count from the end.
fn resolve_index(step: TimestepIndex, len: usize) -> Option<usize> {
    if step >= 0 {
        let idx = step as usize;
        (idx < len).then_some(idx)
    } else {
        let back = step.unsigned_abs() as usize;
        (back <= len).then(|| len - back)
    }
}

/// Resolve the edge-feature bundle for one features-capable geometry.
fn resolve_feature_bundle(
    ef_dir: &Path,
    geometry: Geometry,
    timesteps: &[TimestepIndex],
) -> Result<FeatureBundle, DatasetError> {
    let discovered = list_geometry_files(ef_dir, geometry)?;
    let Some((node_index, feature_files)) = discovered.split_first() else {
        return Err(DatasetError::FileCountMismatch {
            path: ef_dir.to_path_buf(),
            requested: 0,
            available: 0,
        });
    };

    let mut grouped: IndexMap<FeatureKind, Vec<PathBuf>> = FeatureKind::ALL
        .iter()
        .map(|&kind| (kind, Vec::new()))
        .collect();
    for path in feature_files {
        match feature_kind_for(path) {
            Some(kind) => grouped.entry(kind).or_default().push(path.clone()),
            None => warn!(
                path = %path.display(),
                "edge-feature file matches no known feature kind; skipping"
            ),
        }
    }

    let mut features = IndexMap::with_capacity(FeatureKind::ALL.len());
    for (kind, kind_files) in grouped {
        let selected = select_timesteps(ef_dir, &kind_files, timesteps)?;
        features.insert(kind, selected);
    }
    Ok(FeatureBundle {
        node_index: node_index.clone(),
        features,
    })
}

/// Classify an edge-feature file by kind.
///
/// Prefers an exact match on delimiter-separated stem tokens. Falls back to
/// unanchored substring membership in declared kind order, which keeps
/// grouping compatible with datasets whose names embed the kind mid-token; a
/// kind name nested inside another token (e.g. "constraint" containing
/// "strain") is then misassigned, the same way the substring scheme always
/// grouped it.
fn feature_kind_for(path: &Path) -> Option<FeatureKind> {
    let stem = path.file_stem()?.to_str()?;
    FeatureKind::ALL
        .iter()
        .copied()
        .find(|kind| stem.split(['_', '-', '.']).any(|token| token == kind.as_str()))
        .or_else(|| {
            FeatureKind::ALL
                .iter()
                .copied()
                .find(|kind| stem.contains(kind.as_str()))
        })
}
