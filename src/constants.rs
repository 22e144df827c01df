/// Constants describing the on-disk dataset layout.
pub mod layout {
    /// Metadata table filename inside the base directory.
    pub const METADATA_FILENAME: &str = "metadata.csv";
    /// Required metadata column holding simulation ids.
    pub const ID_COLUMN: &str = "id";
    /// Point-cloud subtree root under the base directory.
    pub const POINT_CLOUD_DIR: &str = "pc";
    /// Edge-feature subtree root under the base directory.
    pub const EDGE_FEATURE_DIR: &str = "ef";
    /// File extension used by the array store.
    pub const ARRAY_EXTENSION: &str = "npy";
}

/// Constants controlling timestep selection defaults.
pub mod selection {
    use crate::types::TimestepIndex;

    /// Default timestep selectors: first and last frame of every sequence.
    pub const DEFAULT_TIMESTEPS: [TimestepIndex; 2] = [0, -1];
}
