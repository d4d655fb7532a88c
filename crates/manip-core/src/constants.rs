//! Global constants for manip-core

/// Tolerance below which a length or size is treated as zero
pub const KINDA_SMALL_NUMBER: f32 = 1.0e-4;

/// Tolerance for ray/plane parallelism tests
pub const PARALLEL_EPSILON: f32 = 1.0e-6;

/// Longest timestep the smoothing blend will integrate in one frame (seconds)
pub const MAX_SMOOTH_SNAP_STEP: f32 = 1.0 / 30.0;
