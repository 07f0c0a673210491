use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::audit::AuditResult;
use crate::fingerprint::FrameSource;

fn default_weight() -> f64 {
    1.0
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct ReferenceInput {
    pub label: String,
    pub source: FrameSource,
    #[serde(default = "default_weight")]
    pub weight: f64,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: serde_json::Value,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct CandidateInput {
    pub id: String,
    #[serde(default)]
    pub timestamp: Option<i64>,
    pub source: FrameSource,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
#[schema(examples(json!({
    "references": [
        {
            "label": "opening",
            "source": { "url": "https://example.com/reference/frame-0001.jpg" },
            "metadata": { "offset_secs": 0 }
        }
    ],
    "candidates": [
        {
            "id": "thumb-1",
            "timestamp": 1718000000,
            "source": { "url": "https://example.com/candidate/thumbnail.jpg" }
        }
    ],
    "audio_distance": null
})))]
pub struct AuditRequest {
    pub references: Vec<ReferenceInput>,
    pub candidates: Vec<CandidateInput>,
    #[serde(default)]
    pub audio_distance: Option<f64>,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct AuditReport {
    #[schema(value_type = String)]
    pub run_id: Uuid,
    pub result: AuditResult,
    /// Human-readable meaning of `result.band`
    pub band_description: String,
    /// Reference labels whose frame could not be fingerprinted
    pub missing_references: Vec<String>,
    /// Candidate ids whose frame could not be fingerprinted
    pub missing_candidates: Vec<String>,
    /// No usable reference or no usable candidate was left after exclusion
    pub insufficient_data: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, ToSchema)]
pub struct FingerprintRequest {
    pub source: FrameSource,
}
