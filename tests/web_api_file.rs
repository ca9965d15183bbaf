//! Web API File Tests
//!
//! Integration tests for the upload, download, delete and listing endpoints.

use axum::body::{Body, Bytes};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use axum_test::TestServer;
use serde_json::Value;
use std::fs::{self, File, FileTimes};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;
use teamdrive::config::StorageConfig;
use teamdrive::file::{FileService, FileStorage};
use teamdrive::web::handlers::AppState;
use teamdrive::web::router::create_router;
use tokio::io::AsyncWriteExt;
use tokio_util::io::ReaderStream;
use tower::ServiceExt;

const BOUNDARY: &str = "----teamdrive-test-boundary";

struct TestDrive {
    server: TestServer,
    temp_dir: TempDir,
}

impl TestDrive {
    fn primary(&self) -> PathBuf {
        self.temp_dir.path().join("uploads")
    }

    fn mirror(&self) -> PathBuf {
        self.temp_dir.path().join("mirror")
    }

    fn workspace(&self) -> PathBuf {
        self.temp_dir.path().join("workspace")
    }
}

/// Create a test server over fresh storage roots.
fn create_test_server() -> TestDrive {
    create_test_server_with(|_| {})
}

fn create_test_server_with(adjust: impl FnOnce(&mut AppState)) -> TestDrive {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let router = create_test_router(&temp_dir, adjust);
    let server = TestServer::new(router).expect("Failed to create test server");

    TestDrive { server, temp_dir }
}

fn create_test_router(temp_dir: &TempDir, adjust: impl FnOnce(&mut AppState)) -> Router {
    let storage = FileStorage::new(temp_dir.path().join("uploads"), temp_dir.path().join("mirror"))
        .expect("Failed to create storage");
    let service = FileService::new(storage).with_workspace(temp_dir.path().join("workspace"), 50);

    let mut state = AppState::with_limits(service, &StorageConfig::default());
    adjust(&mut state);

    create_router(Arc::new(state), &[])
}

/// Build a multipart body from `(field, filename, payload)` parts.
fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Bytes {
    let mut body = Vec::new();
    for (field, filename, payload) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        let disposition = match filename {
            Some(filename) => {
                format!("Content-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n")
            }
            None => format!("Content-Disposition: form-data; name=\"{field}\"\r\n\r\n"),
        };
        body.extend_from_slice(disposition.as_bytes());
        body.extend_from_slice(payload);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    Bytes::from(body)
}

fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

async fn upload(drive: &TestDrive, parts: &[(&str, Option<&str>, &[u8])]) -> axum_test::TestResponse {
    drive
        .server
        .post("/api/files/upload")
        .content_type(&multipart_content_type())
        .bytes(multipart_body(parts))
        .await
}

fn write_at(path: &Path, content: &[u8], secs_ago: u64) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
    let when = SystemTime::UNIX_EPOCH + Duration::from_secs(1_760_000_000 - secs_ago);
    let file = File::options().write(true).open(path).unwrap();
    file.set_times(FileTimes::new().set_modified(when)).unwrap();
}

#[tokio::test]
async fn test_upload_download_delete_roundtrip() {
    let drive = create_test_server();
    let payload: &[u8] = b"%PDF-1.4 quarterly numbers";

    let response = upload(&drive, &[("file", Some("report.PDF"), payload)]).await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["data"]["complete"], true);
    assert_eq!(json["data"]["files"][0]["name"], "report.PDF");
    assert_eq!(json["data"]["files"][0]["category"], "documents");
    assert_eq!(json["data"]["files"][0]["size_bytes"], payload.len());

    assert_eq!(fs::read(drive.primary().join("report.PDF")).unwrap(), payload);
    assert_eq!(fs::read(drive.mirror().join("report.PDF")).unwrap(), payload);

    // Listing shows one entry per root.
    let response = drive.server.get("/api/files").await;
    response.assert_status_ok();
    let json = response.json::<Value>();
    let files = json["data"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert!(files.iter().all(|f| f["name"] == "report.PDF"));
    assert!(files.iter().all(|f| f["extension"] == ".pdf"));
    assert!(files.iter().all(|f| f["mime"] == "application/pdf"));

    let response = drive.server.get("/api/files/download/report.PDF").await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), payload);
    let headers = response.headers();
    assert_eq!(headers.get("content-type").unwrap(), "application/pdf");
    assert_eq!(
        headers.get("content-length").unwrap(),
        &payload.len().to_string()
    );
    let disposition = headers.get("content-disposition").unwrap().to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"report.PDF\""));

    let response = drive.server.delete("/api/files/report.PDF").await;
    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(
        json["data"]["removed_from"],
        serde_json::json!(["primary", "mirror"])
    );

    assert!(!drive.primary().join("report.PDF").exists());
    assert!(!drive.mirror().join("report.PDF").exists());

    let response = drive.server.get("/api/files/download/report.PDF").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_upload_traversal_name_is_contained() {
    let drive = create_test_server();

    let response = upload(&drive, &[("file", Some("../../etc/passwd"), b"root:x:0:0".as_slice())]).await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["data"]["files"][0]["name"], "passwd");
    assert_eq!(json["data"]["files"][0]["original_name"], "../../etc/passwd");
    assert!(drive.primary().join("passwd").is_file());
    assert!(!drive.temp_dir.path().join("etc").exists());
}

#[tokio::test]
async fn test_upload_zero_byte_file() {
    let drive = create_test_server();

    let response = upload(&drive, &[("file", Some("empty.txt"), b"".as_slice())]).await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    assert_eq!(json["data"]["files"][0]["size_bytes"], 0);
    assert_eq!(fs::metadata(drive.primary().join("empty.txt")).unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_multiple_files_with_plain_field() {
    let drive = create_test_server();

    let response = upload(
        &drive,
        &[
            ("note", None, b"just text".as_slice()),
            ("file", Some("photo.JPG"), b"\xFF\xD8\xFF".as_slice()),
            ("file", Some("data.xlsx"), b"PK".as_slice()),
        ],
    )
    .await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    let files = json["data"]["files"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["category"], "images");
    assert_eq!(files[1]["category"], "spreadsheets");
    assert!(!drive.primary().join("note").exists());
}

#[tokio::test]
async fn test_upload_without_boundary() {
    let drive = create_test_server();

    let response = drive
        .server
        .post("/api/files/upload")
        .content_type("application/octet-stream")
        .bytes(Bytes::from_static(b"raw bytes"))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_upload_without_file_parts() {
    let drive = create_test_server();

    let response = upload(&drive, &[("note", None, b"no files here".as_slice())]).await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["data"]["complete"], true);
    assert_eq!(json["data"]["files"], serde_json::json!([]));
    assert_eq!(fs::read_dir(drive.primary()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_upload_body_timeout() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let router = create_test_router(&temp_dir, |state| {
        state.upload_timeout = Duration::from_millis(50)
    });

    // The writer stays open, so the body never finishes.
    let (mut writer, reader) = tokio::io::duplex(1024);
    writer
        .write_all(format!("--{BOUNDARY}\r\nContent-Disposition: form-data; ").as_bytes())
        .await
        .unwrap();

    let request = Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header(header::CONTENT_TYPE, multipart_content_type())
        .body(Body::from_stream(ReaderStream::new(reader)))
        .unwrap();

    let response = router.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"]["code"], "REQUEST_TIMEOUT");
    assert_eq!(fs::read_dir(temp_dir.path().join("uploads")).unwrap().count(), 0);
    assert_eq!(fs::read_dir(temp_dir.path().join("mirror")).unwrap().count(), 0);

    drop(writer);
}

#[tokio::test]
async fn test_upload_too_large() {
    let drive = create_test_server_with(|state| state.max_upload_bytes = 64);

    let big = vec![b'x'; 1024];
    let response = upload(&drive, &[("file", Some("big.bin"), big.as_slice())]).await;

    response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert!(!drive.primary().join("big.bin").exists());
}

#[tokio::test]
async fn test_upload_partial_write_returns_multi_status() {
    let drive = create_test_server();
    // A directory where the mirror copy should go makes that write fail.
    fs::create_dir_all(drive.mirror().join("blocked.txt")).unwrap();

    let response = upload(&drive, &[("file", Some("blocked.txt"), b"hello".as_slice())]).await;

    response.assert_status(StatusCode::MULTI_STATUS);
    let json = response.json::<Value>();
    assert_eq!(json["data"]["complete"], false);
    assert_eq!(json["data"]["files"][0]["stored_in"], serde_json::json!(["primary"]));
    assert_eq!(json["data"]["files"][0]["failed_in"], "mirror");
    assert_eq!(fs::read(drive.primary().join("blocked.txt")).unwrap(), b"hello");
}

#[tokio::test]
async fn test_download_traversal_is_not_found() {
    let drive = create_test_server();
    write_at(&drive.temp_dir.path().join("secret.txt"), b"secret", 0);

    let response = drive
        .server
        .get("/api/files/download/..%2Fsecret.txt")
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_download_falls_back_to_mirror() {
    let drive = create_test_server();
    write_at(&drive.mirror().join("mirror-only.md"), b"# notes", 10);

    let response = drive.server.get("/api/files/download/mirror-only.md").await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"# notes");
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/markdown"
    );
}

#[tokio::test]
async fn test_delete_mirror_only_file() {
    let drive = create_test_server();
    write_at(&drive.mirror().join("stale.log"), b"x", 10);

    let response = drive.server.delete("/api/files/stale.log").await;

    response.assert_status_ok();
    let json = response.json::<Value>();
    assert_eq!(json["data"]["removed_from"], serde_json::json!(["mirror"]));
    assert!(!drive.mirror().join("stale.log").exists());
}

#[tokio::test]
async fn test_delete_missing_file() {
    let drive = create_test_server();

    let response = drive.server.delete("/api/files/ghost.txt").await;

    response.assert_status(StatusCode::NOT_FOUND);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_list_order_and_limit() {
    let drive = create_test_server();
    write_at(&drive.primary().join("old.txt"), b"1", 300);
    write_at(&drive.primary().join("newest.zip"), b"22", 5);
    write_at(&drive.mirror().join("middle.png"), b"333", 60);

    let response = drive.server.get("/api/files").await;
    response.assert_status_ok();
    let json = response.json::<Value>();
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["newest.zip", "middle.png", "old.txt"]);
    assert_eq!(json["data"][1]["source"], "mirror");
    assert_eq!(json["data"][1]["category"], "images");

    let response = drive
        .server
        .get("/api/files")
        .add_query_param("limit", 2)
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["data"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_list_skips_hidden_entries() {
    let drive = create_test_server();
    write_at(&drive.primary().join(".DS_Store"), b"x", 5);
    write_at(&drive.primary().join("visible.txt"), b"x", 5);

    let response = drive.server.get("/api/files").await;
    let json = response.json::<Value>();

    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["name"], "visible.txt");
}

#[tokio::test]
async fn test_list_invalid_limit() {
    let drive = create_test_server();

    let response = drive.server.get("/api/files?limit=0").await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let json = response.json::<Value>();
    assert_eq!(json["error"]["code"], "VALIDATION_ERROR");
    assert!(json["error"]["details"]["limit"].is_array());

    let response = drive.server.get("/api/files?limit=lots").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_workspace_listing() {
    let drive = create_test_server();
    let workspace = drive.workspace();
    write_at(&workspace.join("docs/plan.docx"), b"x", 30);
    write_at(&workspace.join("src/lib.rs"), b"x", 10);
    write_at(&workspace.join("node_modules/pkg/index.js"), b"x", 1);
    write_at(&workspace.join(".git/HEAD"), b"x", 1);

    let response = drive.server.get("/api/workspace/files").await;
    response.assert_status_ok();

    let json = response.json::<Value>();
    let files = json["data"].as_array().unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["path"], "src/lib.rs");
    assert_eq!(files[0]["category"], "code");
    assert_eq!(files[1]["path"], "docs/plan.docx");
    assert_eq!(files[1]["category"], "documents");
}

#[tokio::test]
async fn test_security_headers_on_api() {
    let drive = create_test_server();

    let response = drive.server.get("/api/files").await;

    assert_eq!(
        response.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
}
