use rayon::prelude::*;

use super::fusion::fused_distance;
use super::types::{CandidateFrame, FrameMatchResult, ReferenceFrame};
use crate::config::ScoringConfig;
use crate::consts::MATCH_EPSILON;

/// Smallest fused distance over every reference/candidate pair of a run
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GlobalBest {
    pub reference_index: usize,
    pub candidate_index: usize,
    pub distance: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MatchOutcome {
    /// One entry per reference, in input order
    pub frame_details: Vec<FrameMatchResult>,
    /// `None` when there was no pair to compare
    pub global_best: Option<GlobalBest>,
}

impl MatchOutcome {
    pub fn matched_count(&self) -> usize {
        self.frame_details.iter().filter(|d| d.is_match).count()
    }
}

/// Nearest candidate for one reference; on ties the earliest candidate wins
pub fn best_candidate(
    reference: &ReferenceFrame,
    candidates: &[CandidateFrame],
    conf: &ScoringConfig,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;

    for (idx, candidate) in candidates.iter().enumerate() {
        let distance = fused_distance(&reference.fingerprint, &candidate.fingerprint, conf);
        if best.map_or(true, |(_, best_distance)| distance < best_distance) {
            best = Some((idx, distance));
        }
    }

    best
}

pub fn is_match(distance: f64, conf: &ScoringConfig) -> bool {
    distance <= conf.match_threshold + MATCH_EPSILON
}

/// Greedy nearest-neighbour search: every reference independently scans all candidates, so one
/// candidate may be the best match of several references.
pub fn match_references(
    references: &[ReferenceFrame],
    candidates: &[CandidateFrame],
    conf: &ScoringConfig,
) -> MatchOutcome {
    let per_reference: Vec<Option<(usize, f64)>> = references
        .par_iter()
        .map(|reference| best_candidate(reference, candidates, conf))
        .collect();

    let global_best = per_reference
        .par_iter()
        .enumerate()
        .filter_map(|(reference_index, best)| {
            best.map(|(candidate_index, distance)| GlobalBest {
                reference_index,
                candidate_index,
                distance,
            })
        })
        .min_by(|a, b| {
            a.distance
                .total_cmp(&b.distance)
                .then(a.reference_index.cmp(&b.reference_index))
        });

    let frame_details = references
        .iter()
        .zip(per_reference)
        .map(|(reference, best)| match best {
            Some((candidate_index, distance)) => FrameMatchResult {
                reference_label: reference.label.clone(),
                best_candidate_id: Some(candidates[candidate_index].id.clone()),
                visual_distance: distance,
                is_match: is_match(distance, conf),
            },
            None => FrameMatchResult {
                reference_label: reference.label.clone(),
                best_candidate_id: None,
                visual_distance: 1.0,
                is_match: false,
            },
        })
        .collect();

    MatchOutcome {
        frame_details,
        global_best,
    }
}
