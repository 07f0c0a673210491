pub mod fusion;
pub mod matcher;
pub mod scorer;
pub mod types;

#[cfg(test)]
mod audit_tests;

use std::collections::HashSet;
use std::time::Instant;

use crate::config::ScoringConfig;
use crate::error::{Error, Result};

pub use fusion::fused_distance;
pub use matcher::{match_references, GlobalBest, MatchOutcome};
pub use types::{
    AuditResult, AuditSignals, Band, CandidateFrame, FrameMatchResult, ReferenceFrame,
};

/// Rejects duplicate reference labels, weights outside [0, 1] and an out of range audio distance.
/// Takes `(label, weight)` pairs so request payloads can be checked before any frame is fetched.
pub fn validate_inputs<'a>(
    references: impl IntoIterator<Item = (&'a str, f64)>,
    audio_distance: Option<f64>,
) -> Result<()> {
    let mut labels = HashSet::new();
    for (label, weight) in references {
        if !labels.insert(label) {
            return Err(Error::DuplicateLabel(label.to_string()));
        }
        if !(0.0..=1.0).contains(&weight) {
            return Err(Error::InvalidWeight {
                label: label.to_string(),
                weight,
            });
        }
    }

    if let Some(audio) = audio_distance {
        if !(0.0..=1.0).contains(&audio) {
            return Err(Error::InvalidSignal {
                name: "audio_distance",
                value: audio,
            });
        }
    }

    Ok(())
}

/// Scores how closely the candidate frames reproduce the reference frames.
///
/// Empty inputs are valid: without candidates every reference is unmatched at distance 1.0, and
/// without references the temporal distance is 0.
pub fn run_audit(
    references: &[ReferenceFrame],
    candidates: &[CandidateFrame],
    audio_distance: Option<f64>,
    conf: &ScoringConfig,
) -> Result<AuditResult> {
    validate_inputs(
        references.iter().map(|r| (r.label.as_str(), r.weight)),
        audio_distance,
    )?;

    let start = Instant::now();
    let outcome = match_references(references, candidates, conf);
    let result = scorer::aggregate(references, outcome, audio_distance, conf);

    log::info!(
        "Audited {} references against {} candidates in {:?}: score={} band={} matched={}/{}",
        references.len(),
        candidates.len(),
        start.elapsed(),
        result.score,
        result.band,
        result.matched_references,
        result.total_references
    );

    Ok(result)
}
