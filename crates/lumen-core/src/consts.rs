/// Minimum element count to switch elementwise kernels to Rayon parallelism.
pub const PARALLEL_ELEMENT_THRESHOLD: usize = 65_536;

/// Number of channels in an RGB/HSV image.
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Trailing image dimensions: (C, H, W).
pub const IMAGE_TRAILING_DIMS: usize = 3;

/// Full hue circle in radians. Hue values live in [0, HUE_RANGE).
pub const HUE_RANGE: f32 = std::f32::consts::TAU;

/// Number of hue sectors in the piecewise RGB <-> HSV formulas.
pub const HUE_SECTORS: f32 = 6.0;

/// Default finite-difference step for numerical gradients (f32 precision).
pub const DEFAULT_GRADCHECK_EPS: f32 = 1e-3;

/// Default absolute tolerance for gradient checks.
pub const DEFAULT_GRADCHECK_ATOL: f32 = 1e-2;

/// Default relative tolerance for gradient checks.
pub const DEFAULT_GRADCHECK_RTOL: f32 = 1e-2;
