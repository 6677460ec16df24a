use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    NotFound(String),

    #[error("Unsupported file type: '{extension}'. Allowed: {}", .allowed.join(", "))]
    UnsupportedFileType {
        extension: String,
        allowed: &'static [&'static str],
    },

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// JSON body of every error response
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed: Option<Vec<String>>,
}

impl ErrorResponse {
    fn detail(detail: impl Into<String>) -> Self {
        Self {
            detail: detail.into(),
            extension: None,
            allowed: None,
        }
    }
}

impl AppError {
    /// Classifies a failure while reading the request body.
    ///
    /// The body limit surfaces deep inside the multipart error chain, so the
    /// whole chain is inspected before falling back to a plain bad request.
    pub fn from_upload_stream(err: &(dyn std::error::Error + 'static)) -> Self {
        let mut source = Some(err);
        while let Some(e) = source {
            if e.to_string().contains("length limit exceeded") {
                return AppError::PayloadTooLarge(
                    "Request body exceeds the maximum allowed limit".to_string(),
                );
            }
            source = e.source();
        }
        AppError::BadRequest(format!("Invalid upload body: {}", err))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::UnsupportedFileType { .. }
            | AppError::InvalidFilename(_)
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = self.to_string();
        let body = match self {
            AppError::UnsupportedFileType { extension, allowed } => ErrorResponse {
                detail,
                extension: Some(extension),
                allowed: Some(allowed.iter().map(|ext| ext.to_string()).collect()),
            },
            AppError::Io(e) => {
                tracing::error!("I/O error: {:?}", e);
                ErrorResponse::detail("Internal Server Error")
            }
            _ => ErrorResponse::detail(detail),
        };

        (status, Json(body)).into_response()
    }
}
