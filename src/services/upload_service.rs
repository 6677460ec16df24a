use crate::api::error::AppError;
use crate::services::storage::StorageService;
use crate::utils::validation::validate_upload;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use serde::Serialize;
use std::sync::Arc;
use tokio::io::AsyncRead;
use utoipa::ToSchema;

/// Route prefix under which stored uploads are served
pub const FILES_ROUTE: &str = "/files";

/// Bytes that cannot appear verbatim in a URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    /// Name the file was stored under
    pub filename: String,
    /// Locator for fetching the file back
    pub url: String,
}

pub struct UploadService {
    storage: Arc<dyn StorageService>,
}

impl UploadService {
    pub fn new(storage: Arc<dyn StorageService>) -> Self {
        Self { storage }
    }

    /// Validates `filename` and persists the stream under its sanitized name
    pub async fn upload<'a>(
        &self,
        filename: &str,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Result<UploadResponse, AppError> {
        let stored_name = validate_upload(filename).inspect_err(|e| {
            tracing::warn!("Rejected upload '{}': {}", filename, e);
        })?;

        let stored = self.storage.store_stream(&stored_name, reader).await?;
        tracing::info!("Stored upload {} ({} bytes)", stored.filename, stored.size);

        Ok(UploadResponse {
            url: file_url(&stored.filename),
            filename: stored.filename,
        })
    }
}

/// Reference locator for a stored file
pub fn file_url(filename: &str) -> String {
    format!(
        "{}/{}",
        FILES_ROUTE,
        utf8_percent_encode(filename, PATH_SEGMENT)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::storage::LocalStorageService;
    use tempfile::TempDir;

    #[test]
    fn test_file_url() {
        assert_eq!(file_url("cube.stl"), "/files/cube.stl");
        assert_eq!(file_url("my part.obj"), "/files/my%20part.obj");
        assert_eq!(file_url("50%#1.glb"), "/files/50%25%231.glb");
    }

    #[tokio::test]
    async fn test_upload_returns_locator() {
        let dir = TempDir::new().unwrap();
        let service = UploadService::new(Arc::new(LocalStorageService::new(dir.path(), 1024)));

        let response = service
            .upload("../../scan 01.PLY", Box::new(&b"ply\nformat ascii 1.0\n"[..]))
            .await
            .unwrap();

        assert_eq!(response.filename, "scan 01.PLY");
        assert_eq!(response.url, "/files/scan%2001.PLY");
        assert!(dir.path().join("scan 01.PLY").exists());
    }

    #[tokio::test]
    async fn test_rejected_upload_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let service = UploadService::new(Arc::new(LocalStorageService::new(dir.path(), 1024)));

        let err = service
            .upload("notes.txt", Box::new(&b"hello"[..]))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::UnsupportedFileType { .. }));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
