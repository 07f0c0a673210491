pub mod types;

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};
use utoipa_swagger_ui::SwaggerUi;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::audit::{run_audit, validate_inputs, CandidateFrame, ReferenceFrame};
use crate::config::ScoringConfig;
use crate::error::{AppError, Error, Result};
use crate::fingerprint::Fingerprint;
use crate::utils::api_response::ApiResponse;
use types::{AuditReport, AuditRequest, FingerprintRequest};

#[derive(OpenApi)]
#[openapi(
    info(title = "Media audit API"),
    tags((name = "audit", description = "Reference vs candidate frame similarity scoring"))
)]
struct ApiDoc;

pub fn audit_router(state: Arc<AppState>) -> OpenApiRouter {
    OpenApiRouter::new()
        .routes(routes!(handle_audit))
        .routes(routes!(handle_fingerprint))
        .routes(routes!(handle_scoring_config))
        .with_state(state)
}

/// Full application router: versioned API, Swagger UI and health check
pub fn app(state: Arc<AppState>) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/v1", audit_router(state))
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/explorer").url("/api-doc/openapi.json", api))
        .route("/healthz", get(health_handler))
}

async fn health_handler() -> (StatusCode, &'static str) {
    (StatusCode::OK, "OK")
}

type ApiResult<T> = std::result::Result<(StatusCode, Json<ApiResponse<T>>), AppError>;

/// Caller-side failures become an enveloped 4xx, everything else a 500
fn respond<T>(result: Result<T>) -> ApiResult<T> {
    match result {
        Ok(data) => Ok((StatusCode::OK, Json(ApiResponse::ok(data)))),
        Err(err) => {
            let status = if err.is_client_error() {
                StatusCode::BAD_REQUEST
            } else if err.is_frame_error() {
                StatusCode::UNPROCESSABLE_ENTITY
            } else {
                return Err(err.into());
            };
            Ok((status, Json(ApiResponse::failure(&err))))
        }
    }
}

/// Body deserialisation failures, malformed fingerprints included, are caller errors
fn parse_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::InvalidRequest(rejection.body_text()))
}

async fn build_report(state: &AppState, request: AuditRequest) -> Result<AuditReport> {
    validate_inputs(
        request.references.iter().map(|r| (r.label.as_str(), r.weight)),
        request.audio_distance,
    )?;

    let reference_sources: Vec<_> = request.references.iter().map(|r| r.source.clone()).collect();
    let candidate_sources: Vec<_> = request.candidates.iter().map(|c| c.source.clone()).collect();

    // all fingerprints are collected before scoring starts
    let (reference_fps, candidate_fps) = tokio::join!(
        state.fetcher.fingerprint_all(&reference_sources),
        state.fetcher.fingerprint_all(&candidate_sources),
    );

    let mut references = Vec::with_capacity(request.references.len());
    let mut missing_references = Vec::new();
    for (input, fingerprint) in request.references.into_iter().zip(reference_fps) {
        match fingerprint {
            Some(fingerprint) => references.push(
                ReferenceFrame::new(input.label, fingerprint)
                    .with_weight(input.weight)
                    .with_metadata(input.metadata),
            ),
            None => missing_references.push(input.label),
        }
    }

    let mut candidates = Vec::with_capacity(request.candidates.len());
    let mut missing_candidates = Vec::new();
    for (input, fingerprint) in request.candidates.into_iter().zip(candidate_fps) {
        match fingerprint {
            Some(fingerprint) => candidates.push(CandidateFrame {
                id: input.id,
                timestamp: input.timestamp,
                fingerprint,
            }),
            None => missing_candidates.push(input.id),
        }
    }

    let insufficient_data = references.is_empty() || candidates.is_empty();
    let audio_distance = request.audio_distance;
    let scoring = state.scoring.clone();

    let result = tokio::task::spawn_blocking(move || {
        run_audit(&references, &candidates, audio_distance, &scoring)
    })
    .await??;

    Ok(AuditReport {
        run_id: Uuid::new_v4(),
        band_description: result.band.description().to_string(),
        result,
        missing_references,
        missing_candidates,
        insufficient_data,
    })
}

/// Fingerprints every frame and scores the candidates against the references
#[utoipa::path(
    post,
    path = "/audit",
    request_body = AuditRequest,
    tag = "audit",
    responses(
        (status = 200, description = "Audit completed", body = ApiResponse<AuditReport>),
        (status = 400, description = "Invalid audit request or malformed fingerprint", body = ApiResponse<AuditReport>),
        (status = 500, description = "Internal server error"),
    )
)]
#[instrument(skip(state, payload))]
async fn handle_audit(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<AuditRequest>, JsonRejection>,
) -> ApiResult<AuditReport> {
    let request = match parse_body(payload) {
        Ok(request) => request,
        Err(err) => return respond(Err(err)),
    };

    log::info!(
        "Audit requested: {} references, {} candidates, audio={}",
        request.references.len(),
        request.candidates.len(),
        request.audio_distance.is_some()
    );

    let report = build_report(&state, request).await;
    if let Ok(report) = &report {
        if report.insufficient_data {
            log::warn!(
                "Audit {} ran on insufficient data: {} references and {} candidates missing",
                report.run_id,
                report.missing_references.len(),
                report.missing_candidates.len()
            );
        }
    }

    respond(report)
}

/// Fingerprints a single frame
#[utoipa::path(
    post,
    path = "/fingerprint",
    request_body = FingerprintRequest,
    tag = "audit",
    responses(
        (status = 200, description = "Fingerprint computed", body = ApiResponse<Fingerprint>),
        (status = 400, description = "Invalid frame source", body = ApiResponse<Fingerprint>),
        (status = 422, description = "Frame could not be fetched or decoded", body = ApiResponse<Fingerprint>),
    )
)]
#[instrument(skip(state, payload))]
async fn handle_fingerprint(
    State(state): State<Arc<AppState>>,
    payload: std::result::Result<Json<FingerprintRequest>, JsonRejection>,
) -> ApiResult<Fingerprint> {
    let request = match parse_body(payload) {
        Ok(request) => request,
        Err(err) => return respond(Err(err)),
    };

    respond(state.fetcher.fingerprint_source(&request.source).await)
}

/// Scoring weights, thresholds and band limits in effect
#[utoipa::path(
    get,
    path = "/scoring-config",
    tag = "audit",
    responses(
        (status = 200, description = "Active scoring configuration", body = ScoringConfig),
    )
)]
async fn handle_scoring_config(State(state): State<Arc<AppState>>) -> Json<ScoringConfig> {
    Json(state.scoring.clone())
}
