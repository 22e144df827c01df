/// Simulation identifier as written in the metadata `id` column.
/// Doubles as the per-simulation directory name, so leading zeros are kept.
/// Example: `001`
pub type SimulationId = String;
/// Timestep selector into a sorted per-geometry file sequence.
/// Negative values count from the end (`-1` = last frame).
pub type TimestepIndex = i64;
/// Flat numeric parameter vector for one simulation row.
/// Example: `[1.0, 0.85, 210000.0]`
pub type ParameterVector = Vec<f64>;
/// Dynamic-rank float tensor produced by the loader.
pub type Tensor = ndarray::ArrayD<f32>;
