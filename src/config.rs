use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::errors::DatasetError;

/// Top-level configuration mapping read from a YAML file.
#[derive(Clone, Debug, Deserialize)]
pub struct ConfigFile {
    /// Dataset location and selection settings.
    pub dataset: DatasetConfig,
}

/// `dataset:` section of the configuration mapping.
#[derive(Clone, Debug, Deserialize)]
pub struct DatasetConfig {
    /// Base directory holding `metadata.csv`, `pc/`, and `ef/`.
    pub base_dir: PathBuf,
    /// Optional geometry names; omitted means every part.
    #[serde(default)]
    pub geometries: Option<Vec<String>>,
}

impl ConfigFile {
    /// Parse a configuration mapping from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, DatasetError> {
        serde_yaml::from_str(yaml).map_err(|err| DatasetError::Configuration {
            reason: format!("failed to parse config: {err}"),
        })
    }

    /// Load and parse the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self, DatasetError> {
        let text = fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }
}
