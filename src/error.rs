use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to load config {0}")]
    Config(#[from] config::ConfigError),
    #[error("io error {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("invalid request body: {0}")]
    InvalidRequest(String),
    #[error("malformed fingerprint: {0}")]
    MalformedFingerprint(String),
    #[error("failed to fetch image: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("image fetch timed out after {0:?}")]
    FetchTimeout(std::time::Duration),
    #[error("image fetch returned status {0}")]
    HttpStatus(u16),
    #[error("image is larger than {limit} bytes")]
    ImageTooLarge { limit: usize },
    #[error("failed to decode image {0}")]
    Decode(#[from] image::ImageError),
    #[error("invalid base64 image {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("fingerprint task failed {0}")]
    Task(#[from] tokio::task::JoinError),
    #[error("duplicate reference label {0}")]
    DuplicateLabel(String),
    #[error("reference {label} has weight {weight} outside [0, 1]")]
    InvalidWeight { label: String, weight: f64 },
    #[error("{name} must be within [0, 1], got {value}")]
    InvalidSignal { name: &'static str, value: f64 },
}

impl Error {
    /// Errors caused by the caller's input rather than by the engine or its collaborators
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Error::InvalidRequest(_)
                | Error::MalformedFingerprint(_)
                | Error::DuplicateLabel(_)
                | Error::InvalidWeight { .. }
                | Error::InvalidSignal { .. }
                | Error::Base64(_)
        )
    }

    /// The frame itself could not be retrieved or decoded
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            Error::Fetch(_)
                | Error::FetchTimeout(_)
                | Error::HttpStatus(_)
                | Error::ImageTooLarge { .. }
                | Error::Decode(_)
        )
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

pub struct AppError(anyhow::Error);

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log::error!("request failed: {:#}", self.0);

        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Something went wrong: {}", self.0),
        )
            .into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
