use crate::api::error::AppError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

const BUFFER_SIZE: usize = 64 * 1024;

/// A file that has been fully written to storage
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub size: u64,
}

#[async_trait]
pub trait StorageService: Send + Sync {
    /// Writes the whole stream under `filename`, replacing any previous file.
    /// Either the complete stream becomes visible or nothing does.
    async fn store_stream<'a>(
        &self,
        filename: &str,
        reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Result<StoredFile, AppError>;
}

/// Stores uploads as plain files in a single directory
pub struct LocalStorageService {
    root: PathBuf,
    max_file_size: u64,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>, max_file_size: usize) -> Self {
        Self {
            root: root.into(),
            max_file_size: max_file_size as u64,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, filename: &str) -> Result<PathBuf, AppError> {
        if filename.is_empty()
            || filename == "."
            || filename == ".."
            || filename.contains(['/', '\\'])
        {
            return Err(AppError::InvalidFilename(format!(
                "'{}' is not a plain file name",
                filename
            )));
        }
        Ok(self.root.join(filename))
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn store_stream<'a>(
        &self,
        filename: &str,
        mut reader: Box<dyn AsyncRead + Unpin + Send + 'a>,
    ) -> Result<StoredFile, AppError> {
        let dest = self.path_for(filename)?;

        // Staged next to the destination so the final rename stays on one filesystem.
        // Dropping the handle on any early return removes the staging file.
        let staged = tempfile::Builder::new()
            .prefix(".upload-")
            .suffix(".part")
            .tempfile_in(&self.root)?;
        let mut staged_async = tokio::fs::File::from_std(staged.reopen()?);

        let mut buffer = vec![0u8; BUFFER_SIZE];
        let mut total_size: u64 = 0;

        loop {
            let n = reader
                .read(&mut buffer)
                .await
                .map_err(|e| AppError::from_upload_stream(&e))?;
            if n == 0 {
                break;
            }

            total_size += n as u64;
            if total_size > self.max_file_size {
                tracing::warn!(
                    "Upload of {} aborted after {} bytes (limit {})",
                    filename,
                    total_size,
                    self.max_file_size
                );
                return Err(AppError::PayloadTooLarge(format!(
                    "File exceeds the maximum allowed size of {} bytes",
                    self.max_file_size
                )));
            }

            staged_async.write_all(&buffer[..n]).await?;
        }

        staged_async.flush().await?;
        staged_async.sync_all().await?;
        drop(staged_async);

        staged.persist(&dest).map_err(|e| AppError::Io(e.error))?;

        Ok(StoredFile {
            filename: filename.to_string(),
            size: total_size,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::pin::Pin;
    use std::task::{Context, Poll};
    use tempfile::TempDir;
    use tokio::io::ReadBuf;

    /// Fails every read, like a client that hung up mid-body
    struct Disconnected;

    impl AsyncRead for Disconnected {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<io::Result<()>> {
            Poll::Ready(Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                "client went away",
            )))
        }
    }

    fn reader(data: &'static [u8]) -> Box<dyn AsyncRead + Unpin + Send + 'static> {
        Box::new(data)
    }

    fn cut_off_after(data: &'static [u8]) -> Box<dyn AsyncRead + Unpin + Send + 'static> {
        Box::new(data.chain(Disconnected))
    }

    fn entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn test_store_and_read_back() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorageService::new(dir.path(), 1024);

        let stored = storage
            .store_stream("cube.stl", reader(b"solid cube\nendsolid cube\n"))
            .await
            .unwrap();

        assert_eq!(stored.filename, "cube.stl");
        assert_eq!(stored.size, 25);
        assert_eq!(
            std::fs::read(dir.path().join("cube.stl")).unwrap(),
            b"solid cube\nendsolid cube\n"
        );
        assert_eq!(entries(dir.path()), vec!["cube.stl"]);
    }

    #[tokio::test]
    async fn test_overwrite_replaces_content() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorageService::new(dir.path(), 1024);

        storage.store_stream("part.obj", reader(b"v 0 0 0")).await.unwrap();
        storage.store_stream("part.obj", reader(b"v 1 1 1\nv 2 2 2")).await.unwrap();

        assert_eq!(
            std::fs::read(dir.path().join("part.obj")).unwrap(),
            b"v 1 1 1\nv 2 2 2"
        );
        assert_eq!(entries(dir.path()), vec!["part.obj"]);
    }

    #[tokio::test]
    async fn test_empty_stream_creates_empty_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorageService::new(dir.path(), 1024);

        let stored = storage.store_stream("empty.ply", reader(b"")).await.unwrap();
        assert_eq!(stored.size, 0);
        assert!(std::fs::read(dir.path().join("empty.ply")).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_size_limit_leaves_nothing_behind() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorageService::new(dir.path(), 4);

        storage.store_stream("keep.glb", reader(b"old")).await.unwrap();
        let err = storage
            .store_stream("keep.glb", reader(b"much too large"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::PayloadTooLarge(_)));
        assert_eq!(std::fs::read(dir.path().join("keep.glb")).unwrap(), b"old");
        assert_eq!(entries(dir.path()), vec!["keep.glb"]);
    }

    #[tokio::test]
    async fn test_broken_stream_leaves_no_file() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorageService::new(dir.path(), 1024);

        let err = storage
            .store_stream("half.stl", cut_off_after(b"solid half\nfacet"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::BadRequest(_)));
        assert!(entries(dir.path()).is_empty());
    }

    #[tokio::test]
    async fn test_broken_stream_keeps_previous_version() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorageService::new(dir.path(), 1024);

        storage.store_stream("gear.obj", reader(b"v 0 0 0")).await.unwrap();
        let result = storage
            .store_stream("gear.obj", cut_off_after(b"v 9 9 9\nv 8"))
            .await;

        assert!(result.is_err());
        assert_eq!(std::fs::read(dir.path().join("gear.obj")).unwrap(), b"v 0 0 0");
        assert_eq!(entries(dir.path()), vec!["gear.obj"]);
    }

    #[tokio::test]
    async fn test_rejects_non_plain_names() {
        let dir = TempDir::new().unwrap();
        let storage = LocalStorageService::new(dir.path(), 1024);

        for name in ["", "..", "../escape.stl", "nested/part.stl", "..\\part.stl"] {
            let err = storage.store_stream(name, reader(b"x")).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidFilename(_)), "{}", name);
        }
        assert!(entries(dir.path()).is_empty());
    }
}
