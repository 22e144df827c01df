use std::path::PathBuf;

use tracing::debug;

use crate::config::DatasetConfig;
use crate::constants::layout::{EDGE_FEATURE_DIR, POINT_CLOUD_DIR};
use crate::constants::selection::DEFAULT_TIMESTEPS;
use crate::errors::DatasetError;
use crate::geometry::{features_capable_names, validate_geometries, Geometry, LoadMode};
use crate::loader::{load_item, SimulationItem};
use crate::metadata::SimulationTable;
use crate::paths::{resolve_simulation_paths, SimulationPaths};
use crate::types::TimestepIndex;

/// Builder for [`FemDataset`]. All validation happens in [`build`](Self::build).
#[derive(Clone, Debug)]
pub struct FemDatasetBuilder {
    base_dir: PathBuf,
    geometries: Option<Vec<Geometry>>,
    timesteps: Vec<TimestepIndex>,
    load_mode: LoadMode,
    include_id: bool,
}

impl FemDatasetBuilder {
    /// Start a builder rooted at the dataset base directory.
    ///
    /// Defaults: all geometries, timesteps `[0, -1]`, combined load mode, id
    /// excluded from the parameter vector.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            geometries: None,
            timesteps: DEFAULT_TIMESTEPS.to_vec(),
            load_mode: LoadMode::default(),
            include_id: false,
        }
    }

    /// Builder seeded from a loaded configuration mapping.
    pub fn from_config(config: &DatasetConfig) -> Result<Self, DatasetError> {
        let mut builder = Self::new(&config.base_dir);
        if let Some(names) = &config.geometries {
            let geometries = names
                .iter()
                .map(|name| Geometry::parse(name))
                .collect::<Result<Vec<_>, _>>()?;
            builder = builder.with_geometries(geometries);
        }
        Ok(builder)
    }

    /// Restrict loading to an explicit geometry list (default: all parts).
    pub fn with_geometries(mut self, geometries: impl IntoIterator<Item = Geometry>) -> Self {
        self.geometries = Some(geometries.into_iter().collect());
        self
    }

    /// Timestep selectors applied to every sorted per-geometry file sequence.
    pub fn with_timesteps(mut self, timesteps: impl IntoIterator<Item = TimestepIndex>) -> Self {
        self.timesteps = timesteps.into_iter().collect();
        self
    }

    /// Choose between point clouds only and the combined payload.
    pub fn with_load_mode(mut self, load_mode: LoadMode) -> Self {
        self.load_mode = load_mode;
        self
    }

    /// Prepend the numeric simulation id to each parameter vector.
    pub fn with_include_id(mut self, include_id: bool) -> Self {
        self.include_id = include_id;
        self
    }

    /// Validate the configuration, load metadata, and resolve every path table.
    ///
    /// Fail-fast: any configuration, metadata, or path-resolution problem is
    /// reported here; a built dataset never fails on those grounds later.
    pub fn build(self) -> Result<FemDataset, DatasetError> {
        if !self.base_dir.is_dir() {
            return Err(DatasetError::MissingDirectory {
                path: self.base_dir,
            });
        }
        let pc_root = self.base_dir.join(POINT_CLOUD_DIR);
        if !pc_root.is_dir() {
            return Err(DatasetError::MissingDirectory { path: pc_root });
        }
        if self.load_mode.wants_features() {
            let ef_root = self.base_dir.join(EDGE_FEATURE_DIR);
            if !ef_root.is_dir() {
                return Err(DatasetError::MissingDirectory { path: ef_root });
            }
        }
        if self.timesteps.is_empty() {
            return Err(DatasetError::Configuration {
                reason: "timestep selector list must not be empty (e.g. [0, -1])".to_string(),
            });
        }

        let geometries = self
            .geometries
            .unwrap_or_else(|| Geometry::ALL.to_vec());
        validate_geometries(&geometries)?;
        if self.load_mode.wants_features()
            && !geometries.iter().any(Geometry::has_edge_features)
        {
            return Err(DatasetError::Configuration {
                reason: format!(
                    "load mode '{}' requires at least one features-capable geometry (capable: {})",
                    self.load_mode,
                    features_capable_names()
                ),
            });
        }

        let table = SimulationTable::load(&self.base_dir)?;
        if self.include_id {
            table.ensure_numeric_ids()?;
        }

        let mut path_tables = Vec::with_capacity(table.len());
        for sim_id in table.ids() {
            path_tables.push(resolve_simulation_paths(
                &self.base_dir,
                sim_id,
                &geometries,
                &self.timesteps,
                self.load_mode,
            )?);
        }
        debug!(
            simulations = path_tables.len(),
            geometries = geometries.len(),
            timesteps = self.timesteps.len(),
            load_mode = %self.load_mode,
            "built dataset index"
        );
        Ok(FemDataset {
            table,
            path_tables,
            geometries,
            load_mode: self.load_mode,
            include_id: self.include_id,
        })
    }
}

/// Indexed FEM simulation dataset.
///
/// The metadata table and path tables are immutable once built. [`get`](Self::get)
/// reads storage fresh on every call, so disjoint indices can be fetched from
/// multiple worker threads without locks.
#[derive(Clone, Debug)]
pub struct FemDataset {
    table: SimulationTable,
    path_tables: Vec<SimulationPaths>,
    geometries: Vec<Geometry>,
    load_mode: LoadMode,
    include_id: bool,
}

impl FemDataset {
    /// Number of indexed simulations (= metadata row count).
    pub fn len(&self) -> usize {
        self.path_tables.len()
    }

    /// True when the metadata table held no simulations.
    pub fn is_empty(&self) -> bool {
        self.path_tables.is_empty()
    }

    /// Geometries this dataset resolves, in requested order.
    pub fn geometries(&self) -> &[Geometry] {
        &self.geometries
    }

    /// Load mode fixed at construction.
    pub fn load_mode(&self) -> LoadMode {
        self.load_mode
    }

    /// Simulation metadata table, in dataset order.
    pub fn metadata(&self) -> &SimulationTable {
        &self.table
    }

    /// Resolved path table for one simulation (index order = metadata order).
    pub fn paths(&self, index: usize) -> Result<&SimulationPaths, DatasetError> {
        self.path_tables.get(index).ok_or(DatasetError::IndexRange {
            index,
            len: self.path_tables.len(),
        })
    }

    /// Materialize one simulation's tensors.
    pub fn get(&self, index: usize) -> Result<SimulationItem, DatasetError> {
        let paths = self.paths(index)?;
        let parameters = self.table.parameter_vector(index, self.include_id)?;
        load_item(paths, parameters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    use crate::constants::layout::METADATA_FILENAME;

    /// Minimal on-disk dataset: directories and stub array files only, enough
    /// for construction-time validation (nothing is read until `get`).
    fn build_tree(base: &Path, sim_ids: &[&str], with_ef: bool) {
        fs::write(
            base.join(METADATA_FILENAME),
            sim_ids
                .iter()
                .fold("id,thickness\n".to_string(), |acc, id| {
                    acc + &format!("{id},1.0\n")
                }),
        )
        .unwrap();
        for sim_id in sim_ids {
            let pc_dir = base.join(POINT_CLOUD_DIR).join(sim_id);
            fs::create_dir_all(&pc_dir).unwrap();
            for geometry in Geometry::ALL {
                fs::write(pc_dir.join(format!("{geometry}_0000.npy")), b"stub").unwrap();
                fs::write(pc_dir.join(format!("{geometry}_0001.npy")), b"stub").unwrap();
            }
            if with_ef {
                let ef_dir = base.join(EDGE_FEATURE_DIR).join(sim_id);
                fs::create_dir_all(&ef_dir).unwrap();
                fs::write(ef_dir.join("blank_0000_index.npy"), b"stub").unwrap();
                for kind in crate::geometry::FeatureKind::ALL {
                    fs::write(ef_dir.join(format!("blank_{kind}_0000.npy")), b"stub").unwrap();
                    fs::write(ef_dir.join(format!("blank_{kind}_0001.npy")), b"stub").unwrap();
                }
            }
        }
    }

    #[test]
    fn length_matches_metadata_rows() {
        let temp = tempdir().unwrap();
        build_tree(temp.path(), &["001", "002", "003"], true);
        let dataset = FemDatasetBuilder::new(temp.path()).build().unwrap();
        assert_eq!(dataset.len(), 3);
        assert!(!dataset.is_empty());
    }

    #[test]
    fn default_geometries_cover_the_full_set() {
        let temp = tempdir().unwrap();
        build_tree(temp.path(), &["001"], true);
        let dataset = FemDatasetBuilder::new(temp.path()).build().unwrap();
        assert_eq!(dataset.geometries(), Geometry::ALL);
    }

    #[test]
    fn missing_base_dir_fails_fast() {
        let err = FemDatasetBuilder::new("/definitely/not/here")
            .build()
            .unwrap_err();
        assert!(matches!(err, DatasetError::MissingDirectory { .. }));
    }

    #[test]
    fn missing_ef_root_only_fails_combined_mode() {
        let temp = tempdir().unwrap();
        build_tree(temp.path(), &["001"], false);

        let err = FemDatasetBuilder::new(temp.path()).build().unwrap_err();
        match err {
            DatasetError::MissingDirectory { path } => {
                assert!(path.ends_with(EDGE_FEATURE_DIR));
            }
            other => panic!("unexpected error: {other}"),
        }

        let dataset = FemDatasetBuilder::new(temp.path())
            .with_load_mode(LoadMode::Nodes)
            .build()
            .unwrap();
        assert_eq!(dataset.load_mode(), LoadMode::Nodes);
    }

    #[test]
    fn combined_mode_requires_a_features_capable_geometry() {
        let temp = tempdir().unwrap();
        build_tree(temp.path(), &["001"], true);
        let err = FemDatasetBuilder::new(temp.path())
            .with_geometries([Geometry::Punch, Geometry::Die])
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            DatasetError::Configuration { ref reason } if reason.contains("features-capable")
        ));
    }

    #[test]
    fn duplicate_geometries_are_rejected() {
        let temp = tempdir().unwrap();
        build_tree(temp.path(), &["001"], true);
        let err = FemDatasetBuilder::new(temp.path())
            .with_geometries([Geometry::Blank, Geometry::Blank])
            .build()
            .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidGeometry { .. }));
    }

    #[test]
    fn empty_timestep_list_is_a_configuration_error() {
        let temp = tempdir().unwrap();
        build_tree(temp.path(), &["001"], true);
        let err = FemDatasetBuilder::new(temp.path())
            .with_timesteps([])
            .build()
            .unwrap_err();
        assert!(matches!(err, DatasetError::Configuration { .. }));
    }

    #[test]
    fn include_id_requires_numeric_ids_at_build_time() {
        let temp = tempdir().unwrap();
        build_tree(temp.path(), &["run_a"], true);
        let err = FemDatasetBuilder::new(temp.path())
            .with_include_id(true)
            .build()
            .unwrap_err();
        assert!(matches!(err, DatasetError::InvalidMetadata { .. }));
    }

    #[test]
    fn out_of_bounds_access_is_index_range() {
        let temp = tempdir().unwrap();
        build_tree(temp.path(), &["001"], true);
        let dataset = FemDatasetBuilder::new(temp.path()).build().unwrap();
        assert!(matches!(
            dataset.get(1).unwrap_err(),
            DatasetError::IndexRange { index: 1, len: 1 }
        ));
    }

    #[test]
    fn from_config_wires_base_dir_and_geometries() {
        let temp = tempdir().unwrap();
        build_tree(temp.path(), &["001"], true);
        let config = crate::config::DatasetConfig {
            base_dir: temp.path().to_path_buf(),
            geometries: Some(vec!["blank".to_string(), "die".to_string()]),
        };
        let dataset = FemDatasetBuilder::from_config(&config)
            .unwrap()
            .build()
            .unwrap();
        assert_eq!(dataset.geometries(), [Geometry::Blank, Geometry::Die]);
    }

    #[test]
    fn from_config_rejects_unknown_geometry_names() {
        let config = crate::config::DatasetConfig {
            base_dir: PathBuf::from("/anywhere"),
            geometries: Some(vec!["tool".to_string()]),
        };
        let err = FemDatasetBuilder::from_config(&config).unwrap_err();
        assert!(matches!(err, DatasetError::InvalidGeometry { .. }));
    }
}
