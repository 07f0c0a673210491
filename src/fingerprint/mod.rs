pub mod fetch;
pub mod hamming;
pub mod hasher;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_with::{serde_as, DisplayFromStr};
use utoipa::ToSchema;

use crate::consts::HASH_BITS;
use crate::error::{Error, Result};

const HEX_DIGITS: usize = HASH_BITS as usize / 4;

pub use fetch::{FrameFetcher, FrameSource};
pub use hamming::{hamming_distance, hamming_distance_str};
pub use hasher::{fingerprint_bytes, fingerprint_image, LumaGrid};

/// A 64-bit perceptual hash.
///
/// Bit `i` of the textual form (left to right) is stored at `1 << (63 - i)`, so the row-major
/// sample order of the hasher reads left to right in the bit-string.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HashBits(u64);

impl HashBits {
    pub const fn new(bits: u64) -> Self {
        Self(bits)
    }

    pub const fn bits(self) -> u64 {
        self.0
    }

    /// Bit at textual position `index` (0 = leftmost)
    pub fn bit(self, index: u32) -> bool {
        debug_assert!(index < HASH_BITS);
        self.0 & (1 << (HASH_BITS - 1 - index)) != 0
    }

    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != HEX_DIGITS {
            return Err(Error::MalformedFingerprint(format!(
                "hex hash must be {} characters, got {}",
                HEX_DIGITS,
                hex.len()
            )));
        }
        // from_str_radix alone would let a leading '+' through
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(Error::MalformedFingerprint(format!(
                "invalid character in hex hash: {}",
                hex
            )));
        }

        u64::from_str_radix(hex, 16)
            .map(Self)
            .map_err(|e| Error::MalformedFingerprint(format!("invalid hex hash {}: {}", hex, e)))
    }

    pub fn to_hex(self) -> String {
        format!("{:016x}", self.0)
    }
}

impl FromStr for HashBits {
    type Err = Error;

    /// Accepts the 64-character bit-string or the 16-digit hex form
    fn from_str(bit_str: &str) -> Result<Self> {
        if bit_str.len() == HEX_DIGITS {
            return Self::from_hex(bit_str);
        }
        if bit_str.len() != HASH_BITS as usize {
            return Err(Error::MalformedFingerprint(format!(
                "binary string must be {} bits, got {}",
                HASH_BITS,
                bit_str.len()
            )));
        }

        let mut result = 0u64;
        for (i, ch) in bit_str.chars().enumerate() {
            match ch {
                '1' => result |= 1 << (HASH_BITS as usize - 1 - i),
                '0' => {}
                _ => {
                    return Err(Error::MalformedFingerprint(format!(
                        "invalid character in binary string: {}",
                        ch
                    )))
                }
            }
        }

        Ok(Self(result))
    }
}

impl fmt::Display for HashBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:064b}", self.0)
    }
}

impl fmt::Debug for HashBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HashBits({:016x})", self.0)
    }
}

impl From<u64> for HashBits {
    fn from(bits: u64) -> Self {
        Self(bits)
    }
}

/// Gradient and mean hashes of one image
#[serde_as]
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, ToSchema)]
pub struct Fingerprint {
    #[serde_as(as = "DisplayFromStr")]
    #[schema(value_type = String, example = "0110100101101001011010010110100101101001011010010110100101101001")]
    pub gradient_hash: HashBits,
    #[serde_as(as = "DisplayFromStr")]
    #[schema(value_type = String, example = "1111111100000000111111110000000011111111000000001111111100000000")]
    pub mean_hash: HashBits,
}

impl Fingerprint {
    pub fn new(gradient_hash: HashBits, mean_hash: HashBits) -> Self {
        Self {
            gradient_hash,
            mean_hash,
        }
    }
}
