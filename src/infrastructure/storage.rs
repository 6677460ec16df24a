use crate::config::AppConfig;
use crate::services::storage::{LocalStorageService, StorageService};
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &AppConfig) -> anyhow::Result<Arc<dyn StorageService>> {
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    let storage = LocalStorageService::new(&config.upload_dir, config.max_file_size);
    info!("📁 Upload storage ready at {}", storage.root().display());

    Ok(Arc::new(storage))
}
