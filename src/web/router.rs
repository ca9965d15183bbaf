//! Router configuration for Web API.

use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::dto::{
    DeleteResponse, FileEntryResponse, UploadResponse, UploadedFileResponse,
    WorkspaceFileResponse,
};
use super::handlers::{self, AppState};
use super::middleware::{create_cors_layer, security_headers};
use crate::file::{Category, Root};

/// OpenAPI document for the drive API.
#[derive(OpenApi)]
#[openapi(
    info(title = "teamdrive API", description = "Shared drive file API"),
    servers((url = "/api")),
    paths(
        handlers::list_files,
        handlers::upload_file,
        handlers::download_file,
        handlers::delete_file,
        handlers::list_workspace_files,
    ),
    components(schemas(
        Category,
        Root,
        FileEntryResponse,
        WorkspaceFileResponse,
        UploadedFileResponse,
        UploadResponse,
        DeleteResponse,
    )),
    tags(
        (name = "files", description = "Upload, download and delete stored files"),
        (name = "workspace", description = "Read-only workspace listing")
    )
)]
pub struct ApiDoc;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let file_routes = Router::new()
        .route("/", get(handlers::list_files))
        .route("/upload", post(handlers::upload_file))
        .route("/download/:name", get(handlers::download_file))
        .route("/:name", delete(handlers::delete_file));

    let workspace_routes = Router::new().route("/files", get(handlers::list_workspace_files));

    let api_routes = Router::new()
        .nest("/files", file_routes)
        .nest("/workspace", workspace_routes);

    Router::new()
        .nest("/api", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins))
                .layer(middleware::from_fn(security_headers)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router serving the OpenAPI document.
pub fn create_swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_file_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        assert!(paths.iter().any(|p| p.as_str() == "/files"));
        assert!(paths.iter().any(|p| p.as_str() == "/files/upload"));
        assert!(paths.iter().any(|p| p.as_str() == "/files/download/{name}"));
        assert!(paths.iter().any(|p| p.as_str() == "/files/{name}"));
        assert!(paths.iter().any(|p| p.as_str() == "/workspace/files"));
    }

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
    }
}
