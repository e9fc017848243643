//! HTTP API over the shared document plus the bundled UI.

mod error;

pub use error::ApiError;

use axum::{
    extract::{Path, State},
    routing::{get, patch, post},
    Json, Router,
};
use companion_hub_core::{Document, DocumentFile, ExportDir};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path as FsPath;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::TraceLayer,
};
use tracing::debug;

/// Shared handler state. Holds paths only; the document is re-read on
/// every request.
#[derive(Clone)]
pub struct AppState {
    pub documents: DocumentFile,
    pub exports: Option<ExportDir>,
}

#[derive(Serialize)]
struct SuccessResponse {
    success: bool,
}

#[derive(Serialize)]
struct UpdatedResponse {
    success: bool,
    updated: Document,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SaveFileRequest {
    file_name: String,
    content: String,
}

#[derive(Serialize)]
struct MessageResponse {
    message: String,
}

/// Build the router. `assets_dir` must contain `frontend/` and `favicon.ico`.
pub fn router(state: AppState, assets_dir: &FsPath) -> Router {
    let frontend = assets_dir.join("frontend");
    Router::new()
        .route("/api/data", get(get_data).post(replace_data))
        .route("/api/data/{field}", patch(update_field))
        .route("/save-file", post(save_file))
        .route("/health", get(|| async { "OK" }))
        .route_service(
            "/",
            ServeFile::new(frontend.join("pages").join("homepage.html")),
        )
        .route_service("/favicon.ico", ServeFile::new(assets_dir.join("favicon.ico")))
        .nest_service("/frontend", ServeDir::new(frontend))
        .layer(
            ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
        )
        .with_state(state)
}

/// Run blocking storage work off the async workers.
async fn blocking<T, F>(work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce() -> companion_hub_core::Result<T> + Send + 'static,
{
    Ok(tokio::task::spawn_blocking(work).await??)
}

async fn get_data(State(state): State<AppState>) -> Result<Json<Document>, ApiError> {
    let documents = state.documents;
    let doc = blocking(move || Ok(documents.load())).await?;
    Ok(Json(doc))
}

async fn replace_data(
    State(state): State<AppState>,
    Json(doc): Json<Document>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let documents = state.documents;
    let keys = doc.len();
    blocking(move || documents.replace(&doc)).await?;
    debug!(keys, "document replaced");
    Ok(Json(SuccessResponse { success: true }))
}

/// Upsert one top-level key. The read-modify-write is not isolated from
/// concurrent writers.
async fn update_field(
    State(state): State<AppState>,
    Path(field): Path<String>,
    Json(value): Json<Value>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let documents = state.documents;
    let updated = blocking(move || {
        let mut doc = documents.load();
        doc.insert(field.clone(), value.clone());
        documents.replace(&doc)?;
        let mut updated = Document::new();
        updated.insert(field, value);
        Ok(updated)
    })
    .await?;
    Ok(Json(UpdatedResponse {
        success: true,
        updated,
    }))
}

// TODO: decide whether file_name should be confined to the downloads directory;
// today `../` and absolute names escape it.
async fn save_file(
    State(state): State<AppState>,
    Json(req): Json<SaveFileRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    let exports = state.exports.ok_or(ApiError::NoDownloadsDir)?;
    let SaveFileRequest { file_name, content } = req;
    let name = file_name.clone();
    blocking(move || exports.save(&name, &content)).await?;
    Ok(Json(MessageResponse {
        message: format!("File {file_name} saved successfully in Downloads."),
    }))
}
