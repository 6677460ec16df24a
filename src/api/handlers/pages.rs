//! HTML pages of the viewer frontend.
//!
//! Pages are read from the templates directory on every request so that
//! frontend edits show up without restarting the server.

use crate::AppState;
use crate::api::error::AppError;
use axum::{extract::State, response::Html};
use std::io::ErrorKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Index,
    Viewer,
    DataExplorer,
    Results,
}

impl Page {
    pub const fn file_name(self) -> &'static str {
        match self {
            Page::Index => "index.html",
            Page::Viewer => "3DObjectViewer.html",
            Page::DataExplorer => "data_explorer.html",
            Page::Results => "results.html",
        }
    }
}

async fn render(state: &AppState, page: Page) -> Result<Html<String>, AppError> {
    let path = state.config.templates_dir.join(page.file_name());
    match tokio::fs::read_to_string(&path).await {
        Ok(html) => Ok(Html(html)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            tracing::warn!("Page template missing: {}", path.display());
            Err(AppError::NotFound(format!("{} not found.", page.file_name())))
        }
        Err(e) => Err(e.into()),
    }
}

#[utoipa::path(
    get,
    path = "/",
    responses(
        (status = 200, description = "Landing page", body = String, content_type = "text/html"),
        (status = 404, description = "index.html missing", body = ErrorResponse)
    ),
    tag = "pages"
)]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, Page::Index).await
}

#[utoipa::path(
    get,
    path = "/viewer",
    responses(
        (status = 200, description = "3D object viewer", body = String, content_type = "text/html"),
        (status = 404, description = "3DObjectViewer.html missing", body = ErrorResponse)
    ),
    tag = "pages"
)]
pub async fn viewer(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, Page::Viewer).await
}

#[utoipa::path(
    get,
    path = "/data",
    responses(
        (status = 200, description = "Data explorer", body = String, content_type = "text/html"),
        (status = 404, description = "data_explorer.html missing", body = ErrorResponse)
    ),
    tag = "pages"
)]
pub async fn data_explorer(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, Page::DataExplorer).await
}

#[utoipa::path(
    get,
    path = "/results",
    responses(
        (status = 200, description = "Results page", body = String, content_type = "text/html"),
        (status = 404, description = "results.html missing", body = ErrorResponse)
    ),
    tag = "pages"
)]
pub async fn results(State(state): State<AppState>) -> Result<Html<String>, AppError> {
    render(&state, Page::Results).await
}
