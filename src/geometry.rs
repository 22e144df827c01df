use std::fmt;

use crate::errors::DatasetError;

/// Geometric part of the deep-drawing setup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Geometry {
    /// Sheet blank being formed; the only part recording edge features today.
    Blank,
    /// Binder holding the blank in place.
    Binder,
    /// Punch driving the forming stroke.
    Punch,
    /// Die the blank is pressed into.
    Die,
}

impl Geometry {
    /// All parts, in canonical declaration order.
    pub const ALL: [Geometry; 4] = [
        Geometry::Blank,
        Geometry::Binder,
        Geometry::Punch,
        Geometry::Die,
    ];

    /// Name used in file prefixes and configuration lists.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Geometry::Blank => "blank",
            Geometry::Binder => "binder",
            Geometry::Punch => "punch",
            Geometry::Die => "die",
        }
    }

    /// True when the part records per-edge scalar fields alongside its point clouds.
    pub const fn has_edge_features(&self) -> bool {
        matches!(self, Geometry::Blank)
    }

    /// Parse a configuration name into a part of the closed set.
    pub fn parse(name: &str) -> Result<Geometry, DatasetError> {
        Geometry::ALL
            .iter()
            .copied()
            .find(|geometry| geometry.as_str() == name)
            .ok_or_else(|| DatasetError::InvalidGeometry {
                name: name.to_string(),
                reason: "not a known part".to_string(),
                allowed: allowed_geometry_names(),
            })
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-edge scalar field recorded by the solver.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FeatureKind {
    /// Von Mises equivalent stress.
    Mieses,
    /// Effective plastic strain.
    Strain,
    /// Sheet thickness.
    Thickness,
}

impl FeatureKind {
    /// All kinds, in canonical declaration order (also the grouping order).
    pub const ALL: [FeatureKind; 3] = [
        FeatureKind::Mieses,
        FeatureKind::Strain,
        FeatureKind::Thickness,
    ];

    /// Name embedded in edge-feature filenames.
    pub const fn as_str(&self) -> &'static str {
        match self {
            FeatureKind::Mieses => "mieses",
            FeatureKind::Strain => "strain",
            FeatureKind::Thickness => "thickness",
        }
    }
}

impl fmt::Display for FeatureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What each item access materializes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadMode {
    /// Point clouds only.
    Nodes,
    /// Point clouds plus node indices and edge features.
    #[default]
    NodesAndFeatures,
}

impl LoadMode {
    /// Name used in configuration and error messages.
    pub const fn as_str(&self) -> &'static str {
        match self {
            LoadMode::Nodes => "nodes",
            LoadMode::NodesAndFeatures => "nodes_and_features",
        }
    }

    /// True when edge features and node indices must be resolved and loaded.
    pub const fn wants_features(&self) -> bool {
        matches!(self, LoadMode::NodesAndFeatures)
    }
}

impl fmt::Display for LoadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Render the closed geometry set for error messages.
pub(crate) fn allowed_geometry_names() -> String {
    Geometry::ALL
        .iter()
        .map(|geometry| geometry.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render the features-capable subset for error messages.
pub(crate) fn features_capable_names() -> String {
    Geometry::ALL
        .iter()
        .filter(|geometry| geometry.has_edge_features())
        .map(|geometry| geometry.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validate a requested geometry list: every part may appear at most once.
pub fn validate_geometries(geometries: &[Geometry]) -> Result<(), DatasetError> {
    for (idx, geometry) in geometries.iter().enumerate() {
        if geometries[..idx].contains(geometry) {
            return Err(DatasetError::InvalidGeometry {
                name: geometry.as_str().to_string(),
                reason: "listed more than once".to_string(),
                allowed: allowed_geometry_names(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_every_canonical_name() {
        for geometry in Geometry::ALL {
            assert_eq!(Geometry::parse(geometry.as_str()).unwrap(), geometry);
        }
    }

    #[test]
    fn parse_rejects_unknown_names_with_allowed_set() {
        let err = Geometry::parse("tool").unwrap_err();
        match err {
            DatasetError::InvalidGeometry { name, allowed, .. } => {
                assert_eq!(name, "tool");
                assert!(allowed.contains("blank"));
                assert!(allowed.contains("die"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn duplicates_are_rejected_regardless_of_position() {
        for geometry in Geometry::ALL {
            let list = vec![Geometry::Punch, geometry, geometry];
            let result = validate_geometries(&list);
            if geometry == Geometry::Punch {
                // First entry already collides with the fixed leading punch.
                assert!(result.is_err());
                continue;
            }
            let err = result.unwrap_err();
            assert!(matches!(
                err,
                DatasetError::InvalidGeometry { ref reason, .. } if reason.contains("more than once")
            ));
        }
    }

    #[test]
    fn only_blank_carries_edge_features() {
        let capable: Vec<Geometry> = Geometry::ALL
            .iter()
            .copied()
            .filter(Geometry::has_edge_features)
            .collect();
        assert_eq!(capable, vec![Geometry::Blank]);
    }

    #[test]
    fn load_mode_defaults_to_combined() {
        assert_eq!(LoadMode::default(), LoadMode::NodesAndFeatures);
        assert!(LoadMode::NodesAndFeatures.wants_features());
        assert!(!LoadMode::Nodes.wants_features());
    }
}
