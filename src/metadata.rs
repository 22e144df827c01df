use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::layout::{ID_COLUMN, METADATA_FILENAME};
use crate::errors::DatasetError;
use crate::types::{ParameterVector, SimulationId};

/// Ordered simulation metadata loaded from `metadata.csv`.
///
/// Row order is file order and defines dataset order. Ids are kept as raw
/// strings because they double as directory names and leading zeros matter.
/// All other columns are numeric simulation parameters.
#[derive(Clone, Debug)]
pub struct SimulationTable {
    path: PathBuf,
    columns: Vec<String>,
    ids: Vec<SimulationId>,
    rows: Vec<ParameterVector>,
}

impl SimulationTable {
    /// Load the table from `base_dir/metadata.csv`.
    pub fn load(base_dir: &Path) -> Result<Self, DatasetError> {
        let path = base_dir.join(METADATA_FILENAME);
        if !path.is_file() {
            return Err(DatasetError::MissingMetadata { path });
        }
        let mut reader = csv::Reader::from_path(&path)
            .map_err(|err| invalid(&path, err.to_string()))?;
        let headers = reader
            .headers()
            .map_err(|err| invalid(&path, err.to_string()))?
            .clone();
        let id_pos = headers
            .iter()
            .position(|header| header == ID_COLUMN)
            .ok_or_else(|| invalid(&path, format!("missing required '{ID_COLUMN}' column")))?;
        let columns: Vec<String> = headers
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != id_pos)
            .map(|(_, header)| header.to_string())
            .collect();

        let mut ids = Vec::new();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|err| invalid(&path, err.to_string()))?;
            let id = record
                .get(id_pos)
                .ok_or_else(|| invalid(&path, format!("row {} has no id cell", ids.len() + 1)))?
                .trim()
                .to_string();
            let mut row = Vec::with_capacity(record.len().saturating_sub(1));
            for (cell_idx, cell) in record.iter().enumerate() {
                if cell_idx == id_pos {
                    continue;
                }
                let value: f64 = cell.trim().parse().map_err(|_| {
                    let column = headers.get(cell_idx).unwrap_or("?");
                    invalid(
                        &path,
                        format!("non-numeric value '{cell}' in column '{column}' for simulation '{id}'"),
                    )
                })?;
                row.push(value);
            }
            ids.push(id);
            rows.push(row);
        }
        debug!(
            simulations = ids.len(),
            parameters = columns.len(),
            "loaded metadata table"
        );
        Ok(Self {
            path,
            columns,
            ids,
            rows,
        })
    }

    /// Number of simulation rows.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// True when the table holds no simulations.
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Simulation ids in file order.
    pub fn ids(&self) -> &[SimulationId] {
        &self.ids
    }

    /// Parameter column names (the id column excluded), in file order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Verify that every id parses as a number.
    ///
    /// Required up front when ids are to join the parameter vector, so the
    /// failure surfaces at construction rather than on a later access.
    pub fn ensure_numeric_ids(&self) -> Result<(), DatasetError> {
        for id in &self.ids {
            if id.parse::<f64>().is_err() {
                return Err(invalid(
                    &self.path,
                    format!("id '{id}' is not numeric and cannot join the parameter vector"),
                ));
            }
        }
        Ok(())
    }

    /// Flat numeric vector for one row, optionally with the id first.
    pub fn parameter_vector(
        &self,
        row: usize,
        include_id: bool,
    ) -> Result<ParameterVector, DatasetError> {
        let values = self.rows.get(row).ok_or(DatasetError::IndexRange {
            index: row,
            len: self.rows.len(),
        })?;
        if !include_id {
            return Ok(values.clone());
        }
        let id = &self.ids[row];
        let id_value: f64 = id.parse().map_err(|_| {
            invalid(
                &self.path,
                format!("id '{id}' is not numeric and cannot join the parameter vector"),
            )
        })?;
        let mut out = Vec::with_capacity(values.len() + 1);
        out.push(id_value);
        out.extend_from_slice(values);
        Ok(out)
    }
}

fn invalid(path: &Path, reason: String) -> DatasetError {
    DatasetError::InvalidMetadata {
        path: path.to_path_buf(),
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write_metadata(contents: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(METADATA_FILENAME), contents).unwrap();
        dir
    }

    #[test]
    fn loads_rows_in_file_order() {
        let dir = write_metadata("id,thickness,force\n003,1.0,10.5\n001,1.2,11.0\n");
        let table = SimulationTable::load(dir.path()).unwrap();
        assert_eq!(table.len(), 2);
        assert_eq!(table.ids(), ["003", "001"]);
        assert_eq!(table.columns(), ["thickness", "force"]);
        assert_eq!(table.parameter_vector(1, false).unwrap(), vec![1.2, 11.0]);
    }

    #[test]
    fn include_id_prepends_the_numeric_id() {
        let dir = write_metadata("id,thickness\n007,1.5\n");
        let table = SimulationTable::load(dir.path()).unwrap();
        assert_eq!(table.parameter_vector(0, true).unwrap(), vec![7.0, 1.5]);
    }

    #[test]
    fn missing_file_is_missing_metadata() {
        let dir = tempdir().unwrap();
        let err = SimulationTable::load(dir.path()).unwrap_err();
        assert!(matches!(err, DatasetError::MissingMetadata { .. }));
    }

    #[test]
    fn missing_id_column_is_invalid_metadata() {
        let dir = write_metadata("name,thickness\nfoo,1.0\n");
        let err = SimulationTable::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::InvalidMetadata { ref reason, .. } if reason.contains("'id'")
        ));
    }

    #[test]
    fn non_numeric_parameter_fails_at_load() {
        let dir = write_metadata("id,thickness\n001,soft\n");
        let err = SimulationTable::load(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::InvalidMetadata { ref reason, .. } if reason.contains("soft")
        ));
    }

    #[test]
    fn non_numeric_ids_only_fail_when_requested() {
        let dir = write_metadata("id,thickness\nrun_a,1.0\n");
        let table = SimulationTable::load(dir.path()).unwrap();
        assert_eq!(table.parameter_vector(0, false).unwrap(), vec![1.0]);
        assert!(table.ensure_numeric_ids().is_err());
        assert!(matches!(
            table.parameter_vector(0, true).unwrap_err(),
            DatasetError::InvalidMetadata { .. }
        ));
    }

    #[test]
    fn out_of_range_row_is_index_range() {
        let dir = write_metadata("id,thickness\n001,1.0\n");
        let table = SimulationTable::load(dir.path()).unwrap();
        assert!(matches!(
            table.parameter_vector(3, false).unwrap_err(),
            DatasetError::IndexRange { index: 3, len: 1 }
        ));
    }
}
