//! Public read access to stored objects.

use axum::{
    extract::{Path, State},
    http::header::CONTENT_TYPE,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};

use crate::error::{AppError, Missing};
use crate::state::AppState;
use crate::storage::ObjectStore;

pub fn routes() -> Router<AppState> {
    Router::new().route("/files/:name", get(download))
}

fn content_type(name: &str) -> &'static str {
    let extension = name.rsplit_once('.').map(|(_, ext)| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        Some("pdf") => "application/pdf",
        Some("txt") => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

async fn download(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let bytes = state
        .objects
        .get(&name)
        .await?
        .ok_or(AppError::NotFound(Missing::File))?;
    Ok(([(CONTENT_TYPE, content_type(&name))], bytes).into_response())
}
