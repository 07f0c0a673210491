use crate::config::ScoringConfig;
use crate::consts::HASH_BITS;
use crate::fingerprint::{hamming_distance, Fingerprint, HashBits};

/// Hamming distance scaled by the fixed hash length into [0, 1]
#[inline]
pub fn normalized_distance(a: HashBits, b: HashBits) -> f64 {
    hamming_distance(a, b) as f64 / HASH_BITS as f64
}

/// Weighted blend of the gradient and mean hash distances of one frame pair
pub fn fused_distance(reference: &Fingerprint, candidate: &Fingerprint, conf: &ScoringConfig) -> f64 {
    let gradient = normalized_distance(reference.gradient_hash, candidate.gradient_hash);
    let mean = normalized_distance(reference.mean_hash, candidate.mean_hash);

    conf.gradient_weight * gradient + conf.mean_weight * mean
}
