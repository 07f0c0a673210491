use std::time::Duration;

/// Bits in each perceptual hash. Normalisation always divides by this, never by a compared length.
pub const HASH_BITS: u32 = 64;

/// Side of the grayscale grid every image is resampled to
pub const GRID_SIZE: u32 = 32;
/// Side of the sample lattice taken from the grid
pub const SAMPLE_SIZE: u32 = 8;
/// Distance between two sample points on the grid
pub const SAMPLE_STRIDE: u32 = GRID_SIZE / SAMPLE_SIZE;

/// ITU-R BT.601 luma coefficients
pub const LUMA_RED: f64 = 0.299;
pub const LUMA_GREEN: f64 = 0.587;
pub const LUMA_BLUE: f64 = 0.114;

/// Upper bound of the quantized audit score
pub const MAX_SCORE: u32 = 1023;

/// Slack applied to the match threshold so pairs sitting exactly on it survive fusion rounding
pub const MATCH_EPSILON: f64 = 1e-9;

pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FETCH_PARALLELISM: usize = 16;
pub const DEFAULT_MAX_IMAGE_BYTES: usize = 20 * 1024 * 1024;

pub const DEFAULT_PORT: u16 = 50051;

pub const CONFIG_ENV_PREFIX: &str = "MEDIA_AUDIT";
