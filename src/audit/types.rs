use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::fingerprint::Fingerprint;

/// Frame taken from the trusted source
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct ReferenceFrame {
    /// Unique within one audit run
    pub label: String,
    pub fingerprint: Fingerprint,
    /// Reserved, not used by the scoring formula
    pub weight: f64,
    /// Opaque payload echoed back when this frame holds the best match
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

impl ReferenceFrame {
    pub fn new(label: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            label: label.into(),
            fingerprint,
            weight: 1.0,
            metadata: serde_json::Value::Null,
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

/// Frame taken from the untrusted source
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct CandidateFrame {
    pub id: String,
    pub timestamp: Option<i64>,
    pub fingerprint: Fingerprint,
}

impl CandidateFrame {
    pub fn new(id: impl Into<String>, fingerprint: Fingerprint) -> Self {
        Self {
            id: id.into(),
            timestamp: None,
            fingerprint,
        }
    }

    pub fn with_timestamp(mut self, timestamp: i64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// Best candidate found for one reference frame
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct FrameMatchResult {
    pub reference_label: String,
    /// `None` when there were no candidates to compare against
    pub best_candidate_id: Option<String>,
    /// Fused distance to the best candidate, 1.0 without candidates
    pub visual_distance: f64,
    pub is_match: bool,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, ToSchema)]
pub struct AuditSignals {
    pub visual_distance: f64,
    pub temporal_distance: f64,
    pub audio_distance: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Band {
    VerifiedOriginal,
    PlatformConsistent,
    ModifiedContent,
    DivergentSource,
}

impl Band {
    pub fn as_str(self) -> &'static str {
        match self {
            Band::VerifiedOriginal => "VERIFIED_ORIGINAL",
            Band::PlatformConsistent => "PLATFORM_CONSISTENT",
            Band::ModifiedContent => "MODIFIED_CONTENT",
            Band::DivergentSource => "DIVERGENT_SOURCE",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Band::VerifiedOriginal => "near-identical to the reference",
            Band::PlatformConsistent => "compression or transcoding level drift",
            Band::ModifiedContent => "structurally edited",
            Band::DivergentSource => "unrelated or heavily altered",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final report of one audit run
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, ToSchema)]
pub struct AuditResult {
    /// Quantized composite distance in 0..=1023, lower is more similar
    pub score: u32,
    pub band: Band,
    pub signals: AuditSignals,
    pub best_match_label: Option<String>,
    #[schema(value_type = Option<Object>)]
    pub best_match_metadata: Option<serde_json::Value>,
    pub confidence: f64,
    pub matched_references: usize,
    pub total_references: usize,
    /// One entry per reference frame, in input order
    pub frame_details: Vec<FrameMatchResult>,
}
