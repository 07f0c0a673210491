use image::{DynamicImage, Rgb, RgbImage};
use serde_json::json;

use super::*;
use crate::error::Error;
use crate::fingerprint::{fingerprint_image, Fingerprint, HashBits};

fn fp(gradient: u64, mean: u64) -> Fingerprint {
    Fingerprint::new(HashBits::new(gradient), HashBits::new(mean))
}

fn lane(i: usize) -> u64 {
    0xFFFF << (16 * i)
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_identical_frames_are_verified_original() -> Result<()> {
    let conf = ScoringConfig::default();
    let refs: Vec<_> = (0..4)
        .map(|i| ReferenceFrame::new(format!("t{}", i), fp(lane(i), !lane(i))))
        .collect();
    let cands: Vec<_> = (0..4)
        .map(|i| CandidateFrame::new(format!("c{}", i), fp(lane(i), !lane(i))))
        .collect();

    let result = run_audit(&refs, &cands, None, &conf)?;

    assert_eq!(result.signals.visual_distance, 0.0);
    assert_eq!(result.signals.temporal_distance, 0.0);
    assert_eq!(result.score, 0);
    assert_eq!(result.band, Band::VerifiedOriginal);
    assert_eq!(result.confidence, 1.0);
    assert_eq!(result.matched_references, 4);

    Ok(())
}

#[test]
fn test_fully_divergent_frames() -> Result<()> {
    let conf = ScoringConfig::default();
    let refs = vec![
        ReferenceFrame::new("a", fp(0, 0)),
        ReferenceFrame::new("b", fp(0, 0)),
    ];
    let cands = vec![
        CandidateFrame::new("x", fp(u64::MAX, u64::MAX)),
        CandidateFrame::new("y", fp(u64::MAX, u64::MAX)),
    ];

    let result = run_audit(&refs, &cands, None, &conf)?;

    assert!(close(result.signals.visual_distance, 1.0));
    assert_eq!(result.signals.temporal_distance, 1.0);
    assert_eq!(result.score, 1023);
    assert_eq!(result.band, Band::DivergentSource);
    assert!(close(result.confidence, 0.0));
    assert_eq!(result.matched_references, 0);

    Ok(())
}

#[test]
fn test_eight_bit_drift_is_platform_consistent() -> Result<()> {
    let conf = ScoringConfig::default();

    // each candidate clears 8 bits of its own reference's 16-bit lane on both hashes,
    // and sits 24 bits away from every other reference
    let refs: Vec<_> = (0..4)
        .map(|i| ReferenceFrame::new(format!("t{}", i), fp(lane(i), lane(i))))
        .collect();
    let cands: Vec<_> = (0..4)
        .map(|i| {
            let drifted = lane(i) ^ (0xFF << (16 * i));
            CandidateFrame::new(format!("c{}", i), fp(drifted, drifted))
        })
        .collect();

    let result = run_audit(&refs, &cands, None, &conf)?;

    for (i, detail) in result.frame_details.iter().enumerate() {
        assert_eq!(detail.reference_label, format!("t{}", i));
        assert_eq!(detail.best_candidate_id, Some(format!("c{}", i)));
        assert!(close(detail.visual_distance, 0.125));
        assert!(detail.is_match);
    }
    assert!(close(result.signals.visual_distance, 0.125));
    assert_eq!(result.signals.temporal_distance, 0.0);
    assert_eq!(result.score, 83);
    assert_eq!(result.band, Band::PlatformConsistent);
    assert!(close(result.confidence, 1.0 - 0.08125));

    Ok(())
}

#[test]
fn test_zero_candidates() -> Result<()> {
    let conf = ScoringConfig::default();
    let refs: Vec<_> = (0..3)
        .map(|i| ReferenceFrame::new(format!("t{}", i), fp(lane(i), 0)))
        .collect();

    let result = run_audit(&refs, &[], None, &conf)?;

    assert_eq!(result.frame_details.len(), 3);
    assert!(result
        .frame_details
        .iter()
        .all(|d| d.visual_distance == 1.0 && !d.is_match));
    assert_eq!(result.signals.visual_distance, 1.0);
    assert_eq!(result.signals.temporal_distance, 1.0);
    assert_eq!(result.score, 1023);
    assert_eq!(result.band, Band::DivergentSource);
    assert_eq!(result.best_match_label, None);
    assert_eq!(result.best_match_metadata, None);

    Ok(())
}

#[test]
fn test_zero_references() -> Result<()> {
    let conf = ScoringConfig::default();
    let cands = vec![CandidateFrame::new("c0", fp(0, 0))];

    let result = run_audit(&[], &cands, None, &conf)?;

    assert!(result.frame_details.is_empty());
    assert_eq!(result.total_references, 0);
    assert_eq!(result.signals.temporal_distance, 0.0);
    assert_eq!(result.signals.visual_distance, 1.0);
    // only the visual weight contributes
    assert_eq!(result.score, 665);
    assert_eq!(result.band, Band::DivergentSource);

    Ok(())
}

#[test]
fn test_audio_distance_uses_multi_modal_weights() -> Result<()> {
    let conf = ScoringConfig::default();
    let refs = vec![ReferenceFrame::new("t0", fp(1, 2))];
    let cands = vec![CandidateFrame::new("c0", fp(1, 2))];

    let result = run_audit(&refs, &cands, Some(0.2), &conf)?;

    assert_eq!(result.signals.audio_distance, Some(0.2));
    // 0.35 * 0.2 = 0.07, 0.07 * 1023 = 71.61
    assert_eq!(result.score, 72);
    assert_eq!(result.band, Band::PlatformConsistent);
    assert!(close(result.confidence, 0.93));

    Ok(())
}

#[test]
fn test_partial_coverage() -> Result<()> {
    let conf = ScoringConfig::default();
    let refs = vec![
        ReferenceFrame::new("kept", fp(0, 0)),
        ReferenceFrame::new("cut", fp(u64::MAX, u64::MAX)),
    ];
    let cands = vec![CandidateFrame::new("c0", fp(0, 0))];

    let result = run_audit(&refs, &cands, None, &conf)?;

    assert_eq!(result.matched_references, 1);
    assert_eq!(result.signals.visual_distance, 0.0);
    assert_eq!(result.signals.temporal_distance, 0.5);
    // 0.35 * 0.5 = 0.175, 0.175 * 1023 = 179.025
    assert_eq!(result.score, 179);
    assert_eq!(result.band, Band::ModifiedContent);

    Ok(())
}

#[test]
fn test_best_match_reports_reference_metadata() -> Result<()> {
    let conf = ScoringConfig::default();
    let refs = vec![
        ReferenceFrame::new("opening", fp(0, 0)).with_metadata(json!({ "t": 0 })),
        ReferenceFrame::new("closing", fp(0xF0, 0)).with_metadata(json!({ "t": 42 })),
    ];
    let cands = vec![CandidateFrame::new("thumb", fp(0xF0, 0)).with_timestamp(41)];

    let result = run_audit(&refs, &cands, None, &conf)?;

    assert_eq!(result.best_match_label.as_deref(), Some("closing"));
    assert_eq!(result.best_match_metadata, Some(json!({ "t": 42 })));
    assert_eq!(result.signals.visual_distance, 0.0);

    Ok(())
}

#[test]
fn test_rejects_duplicate_labels() {
    let conf = ScoringConfig::default();
    let refs = vec![
        ReferenceFrame::new("same", fp(0, 0)),
        ReferenceFrame::new("same", fp(1, 1)),
    ];

    let result = run_audit(&refs, &[], None, &conf);
    assert!(matches!(result, Err(Error::DuplicateLabel(label)) if label == "same"));
}

#[test]
fn test_rejects_out_of_range_inputs() {
    let conf = ScoringConfig::default();
    let refs = vec![ReferenceFrame::new("heavy", fp(0, 0)).with_weight(1.5)];
    assert!(matches!(
        run_audit(&refs, &[], None, &conf),
        Err(Error::InvalidWeight { .. })
    ));

    let refs = vec![ReferenceFrame::new("ok", fp(0, 0))];
    assert!(matches!(
        run_audit(&refs, &[], Some(1.2), &conf),
        Err(Error::InvalidSignal { .. })
    ));
    assert!(run_audit(&refs, &[], Some(f64::NAN), &conf).is_err());
}

fn quadrants(size: u32, invert: bool) -> DynamicImage {
    DynamicImage::ImageRgb8(RgbImage::from_fn(size, size, |x, y| {
        let bright = (x < size / 2) == (y < size / 2);
        let v = if bright != invert { 230 } else { 30 };
        Rgb([v, v, v])
    }))
}

#[test]
fn test_pipeline_from_pixels() -> Result<()> {
    let conf = ScoringConfig::default();
    let refs = vec![ReferenceFrame::new("master", fingerprint_image(&quadrants(256, false)))];

    let rescaled = vec![CandidateFrame::new("copy", fingerprint_image(&quadrants(128, false)))];
    let result = run_audit(&refs, &rescaled, None, &conf)?;
    assert!(result.frame_details[0].is_match);
    assert!(result.score <= 120, "score {}", result.score);

    let inverted = vec![CandidateFrame::new("negative", fingerprint_image(&quadrants(256, true)))];
    let result = run_audit(&refs, &inverted, None, &conf)?;
    assert!(!result.frame_details[0].is_match);
    assert_eq!(result.band, Band::DivergentSource);

    Ok(())
}
