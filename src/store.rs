use std::fmt;
use std::fs;
use std::path::Path;

use ndarray::IxDyn;
use npyz::WriterBuilder;

use crate::errors::DatasetError;
use crate::types::Tensor;

/// Read one array file into a dynamic-rank f32 tensor.
///
/// Accepts little-endian float and integer payloads (`f4`, `f8`, `i4`, `i8`);
/// wider types are narrowed to f32, matching the training pipeline's tensor
/// dtype. Fortran-order payloads are rejected; the converter always writes
/// C order.
pub fn read_array(path: &Path) -> Result<Tensor, DatasetError> {
    let bytes = fs::read(path)?;
    let npy = parse(path, &bytes)?;
    if npy.order() != npyz::Order::C {
        return Err(decode_error(path, "fortran-order arrays are not supported"));
    }
    let shape: Vec<usize> = npy.shape().iter().map(|&dim| dim as usize).collect();
    let data = read_values(path, npy, &bytes)?;
    Tensor::from_shape_vec(IxDyn(&shape), data).map_err(|err| decode_error(path, err))
}

/// Write one f32 tensor as a little-endian `f4` array file.
///
/// Used by the simulation-file conversion interface and by test fixtures.
pub fn write_array(path: &Path, tensor: &Tensor) -> Result<(), DatasetError> {
    let shape: Vec<u64> = tensor.shape().iter().map(|&dim| dim as u64).collect();
    let mut buffer = Vec::new();
    let mut writer = npyz::WriteOptions::new()
        .default_dtype()
        .shape(&shape)
        .writer(&mut buffer)
        .begin_nd()?;
    writer.extend(tensor.iter().copied())?;
    writer.finish()?;
    fs::write(path, buffer)?;
    Ok(())
}

fn parse<'a>(path: &Path, bytes: &'a [u8]) -> Result<npyz::NpyFile<&'a [u8]>, DatasetError> {
    npyz::NpyFile::new(bytes).map_err(|err| decode_error(path, err))
}

/// Decode the payload, trying each accepted dtype in turn.
fn read_values(
    path: &Path,
    npy: npyz::NpyFile<&[u8]>,
    bytes: &[u8],
) -> Result<Vec<f32>, DatasetError> {
    if let Ok(values) = npy.into_vec::<f32>() {
        return Ok(values);
    }
    if let Ok(values) = parse(path, bytes)?.into_vec::<f64>() {
        return Ok(values.into_iter().map(|value| value as f32).collect());
    }
    if let Ok(values) = parse(path, bytes)?.into_vec::<i64>() {
        return Ok(values.into_iter().map(|value| value as f32).collect());
    }
    parse(path, bytes)?
        .into_vec::<i32>()
        .map(|values| values.into_iter().map(|value| value as f32).collect())
        .map_err(|err| decode_error(path, err))
}

fn decode_error(path: &Path, reason: impl fmt::Display) -> DatasetError {
    DatasetError::Array {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
