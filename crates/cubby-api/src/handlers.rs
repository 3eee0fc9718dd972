//! HTTP handlers and error mapping.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use cubby_core::defaults::SEARCH_TOP_K;
use cubby_core::{
    DeleteOutcome, Error, FileMetadata, IdentityContext, SearchHit, WriteOutcome,
};

use crate::AppState;

/// Error wrapper translating domain errors into HTTP responses.
pub struct ApiError(Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            Error::AuthRequired(_) => StatusCode::UNAUTHORIZED,
            Error::InvalidName(_) => StatusCode::BAD_REQUEST,
            Error::AlreadyExists(_) => StatusCode::CONFLICT,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::IndexUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = Json(serde_json::json!({ "error": self.0.to_string() }));
        (status, body).into_response()
    }
}

type ApiResult<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Deserialize)]
pub struct UploadRequest {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateNoteRequest {
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ModifyRequest {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    SEARCH_TOP_K
}

#[derive(Debug, Serialize)]
pub struct FileContentResponse {
    pub filename: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
    pub files: Vec<FileMetadata>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
}

/// Health probe. Does not touch storage or the index.
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/v1/files` — store a new file.
pub async fn upload_file(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Json(req): Json<UploadRequest>,
) -> ApiResult<(StatusCode, Json<WriteOutcome>)> {
    let outcome = state.service.upload(&ctx, &req.filename, &req.content).await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// `POST /api/v1/notes` — create a markdown note from a title.
pub async fn create_note(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Json(req): Json<CreateNoteRequest>,
) -> ApiResult<(StatusCode, Json<WriteOutcome>)> {
    let outcome = state
        .service
        .create_note(&ctx, &req.title, &req.content)
        .await?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// `GET /api/v1/files` — list the caller's files.
pub async fn list_files(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
) -> ApiResult<Json<ListResponse>> {
    let files = state.service.list(&ctx).await?;
    Ok(Json(ListResponse { files }))
}

/// `GET /api/v1/files/{filename}` — read one file.
pub async fn read_file(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Path(filename): Path<String>,
) -> ApiResult<Json<FileContentResponse>> {
    let content = state.service.read(&ctx, &filename).await?;
    Ok(Json(FileContentResponse { filename, content }))
}

/// `PUT /api/v1/files/{filename}` — overwrite an existing file.
pub async fn modify_file(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Path(filename): Path<String>,
    Json(req): Json<ModifyRequest>,
) -> ApiResult<Json<WriteOutcome>> {
    let outcome = state.service.modify(&ctx, &filename, &req.content).await?;
    Ok(Json(outcome))
}

/// `DELETE /api/v1/files/{filename}` — delete a file.
pub async fn delete_file(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Path(filename): Path<String>,
) -> ApiResult<Json<DeleteOutcome>> {
    let outcome = state.service.delete(&ctx, &filename).await?;
    Ok(Json(outcome))
}

#[derive(Debug, Deserialize)]
pub struct SearchQueryParams {
    pub q: Option<String>,
    pub top_k: Option<usize>,
}

/// `POST /api/v1/search` — semantic search over the caller's files.
pub async fn search_files(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Json(req): Json<SearchRequest>,
) -> ApiResult<Json<SearchResponse>> {
    let results = state.service.search(&ctx, &req.query, req.top_k).await?;
    Ok(Json(SearchResponse { results }))
}

/// `GET /api/v1/search?q=...` — query-string variant of search.
pub async fn search_files_get(
    State(state): State<AppState>,
    Extension(ctx): Extension<IdentityContext>,
    Query(params): Query<SearchQueryParams>,
) -> ApiResult<Json<SearchResponse>> {
    let query = params.q.unwrap_or_default();
    let top_k = params.top_k.unwrap_or(SEARCH_TOP_K);
    let results = state.service.search(&ctx, &query, top_k).await?;
    Ok(Json(SearchResponse { results }))
}
