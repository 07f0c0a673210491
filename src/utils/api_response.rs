use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::Error;

/// Envelope shared by every JSON endpoint
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub error: Option<String>,
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            error: None,
            data: Some(data),
        }
    }

    pub fn failure(err: &Error) -> Self {
        Self {
            success: false,
            error: Some(err.to_string()),
            data: None,
        }
    }
}

impl<T> From<Result<T, Error>> for ApiResponse<T> {
    fn from(value: Result<T, Error>) -> Self {
        match value {
            Ok(data) => Self::ok(data),
            Err(err) => Self::failure(&err),
        }
    }
}
