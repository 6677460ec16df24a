use std::env;
use std::path::{Path, PathBuf};

/// Runtime configuration for the viewer backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// HTML pages served at `/`, `/viewer`, `/data` and `/results`
    pub templates_dir: PathBuf,

    /// Viewer assets mounted at `/static`
    pub static_dir: PathBuf,

    /// Destination of uploaded meshes, mounted at `/files`
    pub upload_dir: PathBuf,

    /// DOE tables mounted at `/doe_data`
    pub doe_data_dir: PathBuf,

    /// Profilometer exports mounted at `/mahr_data`
    pub mahr_data_dir: PathBuf,

    /// Bind address (default: "0.0.0.0")
    pub host: String,

    /// Bind port (default: 8000)
    pub port: u16,

    /// Maximum accepted upload size in bytes (default: 1 GB)
    pub max_file_size: usize,

    /// Allowed CORS origins, "*" allows any origin (default: "*")
    pub allowed_origins: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::with_base_dir("app")
    }
}

impl AppConfig {
    /// Lays out every directory beneath `base`, the way the bundled frontend expects
    pub fn with_base_dir(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            templates_dir: base.join("templates"),
            static_dir: base.join("static"),
            upload_dir: base.join("uploads"),
            doe_data_dir: base.join("doe_data"),
            mahr_data_dir: base.join("mahr_data"),
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_file_size: 1024 * 1024 * 1024, // 1 GB
            allowed_origins: vec!["*".to_string()],
        }
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = match env::var("APP_BASE_DIR") {
            Ok(base) => Self::with_base_dir(base),
            Err(_) => Self::default(),
        };
        let dir = |key: &str, fallback: PathBuf| env::var(key).map(PathBuf::from).unwrap_or(fallback);

        Self {
            templates_dir: dir("TEMPLATES_DIR", default.templates_dir),
            static_dir: dir("STATIC_DIR", default.static_dir),
            upload_dir: dir("UPLOAD_DIR", default.upload_dir),
            doe_data_dir: dir("DOE_DATA_DIR", default.doe_data_dir),
            mahr_data_dir: dir("MAHR_DATA_DIR", default.mahr_data_dir),

            host: env::var("HOST").unwrap_or(default.host),

            port: env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.port),

            max_file_size: env::var("MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),
        }
    }

    pub fn allows_any_origin(&self) -> bool {
        self.allowed_origins.iter().any(|origin| origin == "*")
    }
}
