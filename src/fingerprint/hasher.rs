use image::{imageops::FilterType, DynamicImage};

use super::{Fingerprint, HashBits};
use crate::consts::{GRID_SIZE, HASH_BITS, LUMA_BLUE, LUMA_GREEN, LUMA_RED, SAMPLE_SIZE, SAMPLE_STRIDE};
use crate::error::Result;

const GRID_CELLS: usize = (GRID_SIZE * GRID_SIZE) as usize;

/// Luminance of an image resampled to the fixed 32x32 grid, row-major
#[derive(Clone, Debug, PartialEq)]
pub struct LumaGrid {
    cells: Box<[f64; GRID_CELLS]>,
}

impl LumaGrid {
    pub fn from_fn(mut f: impl FnMut(u32, u32) -> f64) -> Self {
        let mut cells = Box::new([0.0; GRID_CELLS]);
        for y in 0..GRID_SIZE {
            for x in 0..GRID_SIZE {
                cells[(y * GRID_SIZE + x) as usize] = f(x, y);
            }
        }
        Self { cells }
    }

    pub fn from_image(img: &DynamicImage) -> Self {
        let rgb = img
            .resize_exact(GRID_SIZE, GRID_SIZE, FilterType::Triangle)
            .to_rgb8();

        Self::from_fn(|x, y| {
            let pixel = rgb.get_pixel(x, y);
            LUMA_RED * pixel[0] as f64 + LUMA_GREEN * pixel[1] as f64 + LUMA_BLUE * pixel[2] as f64
        })
    }

    #[inline]
    pub fn get(&self, x: u32, y: u32) -> f64 {
        self.cells[(y * GRID_SIZE + x) as usize]
    }

    pub fn mean(&self) -> f64 {
        self.cells.iter().sum::<f64>() / GRID_CELLS as f64
    }

    /// Sets one bit per 8x8 sample point, row-major, leftmost bit first
    fn sample_bits(&self, mut bit: impl FnMut(u32, u32) -> bool) -> HashBits {
        let mut hash = 0u64;
        let mut bit_pos = 0;

        for row in 0..SAMPLE_SIZE {
            for col in 0..SAMPLE_SIZE {
                if bit(col * SAMPLE_STRIDE, row * SAMPLE_STRIDE) {
                    hash |= 1 << (HASH_BITS - 1 - bit_pos);
                }
                bit_pos += 1;
            }
        }

        HashBits::new(hash)
    }

    /// Sample point at or above the global mean
    pub fn mean_hash(&self) -> HashBits {
        let mean = self.mean();
        self.sample_bits(|x, y| self.get(x, y) >= mean)
    }

    /// Sample point darker than its right neighbour on the full grid
    pub fn gradient_hash(&self) -> HashBits {
        self.sample_bits(|x, y| self.get(x, y) < self.get(x + 1, y))
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::new(self.gradient_hash(), self.mean_hash())
    }
}

pub fn fingerprint_image(img: &DynamicImage) -> Fingerprint {
    LumaGrid::from_image(img).fingerprint()
}

/// Decodes an encoded image (any format the `image` crate detects) and fingerprints it
pub fn fingerprint_bytes(bytes: &[u8]) -> Result<Fingerprint> {
    let img = image::load_from_memory(bytes)?;
    Ok(fingerprint_image(&img))
}
