use crate::api::error::AppError;
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;

/// Hides dot-files (including in-flight `.upload-*.part` staging files)
/// from the static file service they are layered on
pub async fn reject_hidden_files(req: Request, next: Next) -> Response {
    let path = percent_decode_str(req.uri().path()).decode_utf8_lossy();
    if path.split(['/', '\\']).any(|segment| segment.starts_with('.')) {
        tracing::warn!("Refused request for hidden path: {}", req.uri().path());
        return AppError::NotFound("File not found.".to_string()).into_response();
    }

    next.run(req).await
}
