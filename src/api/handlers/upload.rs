use crate::AppState;
use crate::api::error::AppError;
use crate::services::upload_service::UploadResponse;
use axum::{
    Json,
    extract::{Multipart, State},
};
use futures::TryStreamExt;
use tokio_util::io::StreamReader;
use utoipa::ToSchema;

/// Multipart form accepted by the upload endpoint
#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadForm {
    /// Mesh file: .stl, .obj, .ply, .glb or .gltf
    #[schema(value_type = String, format = Binary)]
    file: Vec<u8>,
}

#[utoipa::path(
    post,
    path = "/api/upload",
    request_body(content = UploadForm, description = "Mesh upload", content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File stored", body = UploadResponse),
        (status = 400, description = "Unsupported file type or malformed request", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse)
    ),
    tag = "files"
)]
pub async fn upload_mesh(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let result: Result<Json<UploadResponse>, AppError> = async {
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::from_upload_stream(&e))?
        {
            if field.name() != Some("file") {
                continue;
            }

            let filename = field.file_name().unwrap_or_default().to_string();
            let reader = StreamReader::new(field.map_err(std::io::Error::other));

            let response = state
                .upload_service
                .upload(&filename, Box::new(reader))
                .await?;
            return Ok(Json(response));
        }

        Err(AppError::BadRequest("No file provided".to_string()))
    }
    .await;

    match result {
        Ok(res) => Ok(res),
        Err(e) => {
            // Drain the rest of the body, otherwise browsers report a reset connection
            tracing::warn!("Upload failed early: {}. Consuming remaining stream...", e);
            while let Ok(Some(mut field)) = multipart.next_field().await {
                while let Ok(Some(_)) = field.chunk().await {}
            }
            Err(e)
        }
    }
}
