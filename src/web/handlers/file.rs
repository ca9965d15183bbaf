//! File handlers for Web API.

use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::Response,
    Json,
};
use http_body_util::LengthLimitError;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::file::UploadRequest;
use crate::web::dto::{
    ApiResponse, DeleteResponse, FileEntryResponse, ListQuery, UploadResponse, ValidatedQuery,
    WorkspaceFileResponse,
};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Build a Content-Disposition value that survives any filename.
///
/// The quoted `filename` is an ASCII fallback with control characters,
/// quotes and backslashes replaced; `filename*` carries the exact name
/// (RFC 5987).
fn content_disposition_header(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            ' ' => ' ',
            '"' | '\\' => '_',
            c if c.is_ascii_graphic() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}

/// Read the whole request body within the configured size and time limits.
async fn read_body(state: &AppState, headers: &HeaderMap, body: Body) -> Result<Bytes, ApiError> {
    let declared = headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());
    if declared.is_some_and(|len| len > state.max_upload_bytes as u64) {
        return Err(too_large(state));
    }

    match tokio::time::timeout(
        state.upload_timeout,
        axum::body::to_bytes(body, state.max_upload_bytes),
    )
    .await
    {
        Ok(Ok(bytes)) => Ok(bytes),
        Ok(Err(e)) => {
            let inner = e.into_inner();
            if inner.downcast_ref::<LengthLimitError>().is_some() {
                Err(too_large(state))
            } else {
                tracing::warn!("Failed to read upload body: {}", inner);
                Err(ApiError::bad_request("Failed to read request body"))
            }
        }
        Err(_) => {
            tracing::warn!(
                timeout_secs = state.upload_timeout.as_secs(),
                "Upload body timed out"
            );
            Err(ApiError::request_timeout("Upload took too long"))
        }
    }
}

fn too_large(state: &AppState) -> ApiError {
    ApiError::payload_too_large(format!(
        "Upload exceeds the {} byte limit",
        state.max_upload_bytes
    ))
}

/// GET /api/files - List stored files, newest first.
#[utoipa::path(
    get,
    path = "/files",
    tag = "files",
    params(ListQuery),
    responses(
        (status = 200, description = "Stored files, newest first", body = Vec<FileEntryResponse>),
        (status = 400, description = "Unparseable query"),
        (status = 422, description = "Limit out of range")
    )
)]
pub async fn list_files(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Json<ApiResponse<Vec<FileEntryResponse>>> {
    let limit = query.limit.or(state.default_list_limit);
    let files = state
        .files
        .list(limit)
        .into_iter()
        .map(FileEntryResponse::from)
        .collect();

    Json(ApiResponse::new(files))
}

/// POST /api/files/upload - Store every file part of a multipart body.
#[utoipa::path(
    post,
    path = "/files/upload",
    tag = "files",
    request_body(content = String, content_type = "multipart/form-data", description = "One or more file parts"),
    responses(
        (status = 200, description = "All files stored in both roots", body = UploadResponse),
        (status = 207, description = "At least one file stored in only one root", body = UploadResponse),
        (status = 400, description = "Missing boundary or no parts"),
        (status = 408, description = "Body not received in time"),
        (status = 413, description = "Body over the size limit"),
        (status = 500, description = "Storage failure")
    )
)]
pub async fn upload_file(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Body,
) -> Result<(StatusCode, Json<ApiResponse<UploadResponse>>), ApiError> {
    let bytes = read_body(&state, &headers, body).await?;

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let report = state
        .files
        .upload(&UploadRequest::new(content_type, &bytes))?;

    let status = if report.is_partial() {
        StatusCode::MULTI_STATUS
    } else {
        StatusCode::OK
    };

    Ok((status, Json(ApiResponse::new(UploadResponse::from(report)))))
}

/// GET /api/files/download/:name - Stream a stored file.
#[utoipa::path(
    get,
    path = "/files/download/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let download = state.files.download(&name)?;

    tracing::debug!(name = %download.name, source = %download.source, "Serving download");

    let stream = ReaderStream::new(tokio::fs::File::from_std(download.file));

    Response::builder()
        .header(header::CONTENT_TYPE, download.mime)
        .header(header::CONTENT_LENGTH, download.size_bytes)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(download.name.as_str()),
        )
        .body(Body::from_stream(stream))
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })
}

/// DELETE /api/files/:name - Delete a file from every root.
#[utoipa::path(
    delete,
    path = "/files/{name}",
    tag = "files",
    params(
        ("name" = String, Path, description = "Stored file name")
    ),
    responses(
        (status = 200, description = "File deleted", body = DeleteResponse),
        (status = 404, description = "File not found")
    )
)]
pub async fn delete_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Json<ApiResponse<DeleteResponse>>, ApiError> {
    let removed_from = state.files.delete(&name)?;

    Ok(Json(ApiResponse::new(DeleteResponse {
        name,
        removed_from,
    })))
}

/// GET /api/workspace/files - List the read-only workspace.
#[utoipa::path(
    get,
    path = "/workspace/files",
    tag = "workspace",
    params(ListQuery),
    responses(
        (status = 200, description = "Workspace files, newest first", body = Vec<WorkspaceFileResponse>),
        (status = 422, description = "Limit out of range")
    )
)]
pub async fn list_workspace_files(
    State(state): State<Arc<AppState>>,
    ValidatedQuery(query): ValidatedQuery<ListQuery>,
) -> Json<ApiResponse<Vec<WorkspaceFileResponse>>> {
    let files = state
        .files
        .list_workspace(query.limit)
        .into_iter()
        .map(WorkspaceFileResponse::from)
        .collect();

    Json(ApiResponse::new(files))
}
