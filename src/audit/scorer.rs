use super::matcher::MatchOutcome;
use super::types::{AuditResult, AuditSignals, Band, ReferenceFrame};
use crate::config::{BandLimits, ScoringConfig};
use crate::consts::MAX_SCORE;

/// Share of references without an acceptable match. With no references there is no evidence of
/// drift, so the distance is 0.
pub fn temporal_distance(matched: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    1.0 - matched as f64 / total as f64
}

pub fn composite_distance(signals: &AuditSignals, conf: &ScoringConfig) -> f64 {
    match signals.audio_distance {
        None => {
            let w = &conf.visual_only;
            w.visual * signals.visual_distance + w.temporal * signals.temporal_distance
        }
        Some(audio) => {
            let w = &conf.multi_modal;
            w.visual * signals.visual_distance
                + w.audio * audio
                + w.temporal * signals.temporal_distance
        }
    }
}

pub fn quantize(distance: f64) -> u32 {
    if distance.is_nan() {
        return MAX_SCORE;
    }
    (distance * MAX_SCORE as f64)
        .round()
        .clamp(0.0, MAX_SCORE as f64) as u32
}

pub fn classify(score: u32, limits: &BandLimits) -> Band {
    if score <= limits.verified_original_max {
        Band::VerifiedOriginal
    } else if score <= limits.platform_consistent_max {
        Band::PlatformConsistent
    } else if score <= limits.modified_content_max {
        Band::ModifiedContent
    } else {
        Band::DivergentSource
    }
}

pub fn confidence(distance: f64) -> f64 {
    (1.0 - distance).max(0.0)
}

/// Folds the matcher output and the optional audio signal into the final report
pub fn aggregate(
    references: &[ReferenceFrame],
    outcome: MatchOutcome,
    audio_distance: Option<f64>,
    conf: &ScoringConfig,
) -> AuditResult {
    let total_references = outcome.frame_details.len();
    let matched_references = outcome.matched_count();

    let signals = AuditSignals {
        visual_distance: outcome.global_best.map_or(1.0, |best| best.distance),
        temporal_distance: temporal_distance(matched_references, total_references),
        audio_distance,
    };

    let distance = composite_distance(&signals, conf);
    let score = quantize(distance);

    let best_reference = outcome
        .global_best
        .and_then(|best| references.get(best.reference_index));

    AuditResult {
        score,
        band: classify(score, &conf.bands),
        signals,
        best_match_label: best_reference.map(|r| r.label.clone()),
        best_match_metadata: best_reference.map(|r| r.metadata.clone()),
        confidence: confidence(distance),
        matched_references,
        total_references,
        frame_details: outcome.frame_details,
    }
}
