//! Web File Relay Tests
//!
//! Integration tests for the upload page, the raw download route and the
//! form-based download route.

use axum::http::{header, StatusCode};
use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use filerelay::file::{FileStorage, MAX_NAME_BYTES};
use filerelay::web::handlers::AppState;
use filerelay::web::router::create_router;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Create a test server backed by a temporary storage root.
fn create_test_server() -> (TestServer, TempDir) {
    create_test_server_with_limit(None)
}

fn create_test_server_with_limit(limit: Option<usize>) -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let storage =
        FileStorage::new(temp_dir.path().join("uploads")).expect("Failed to create storage");

    let mut app_state = AppState::new(storage);
    if let Some(limit) = limit {
        app_state = app_state.with_max_upload_size(limit);
    }

    let router = create_router(Arc::new(app_state));
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, temp_dir)
}

fn uploads_dir(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("uploads")
}

/// List storage names currently in the root.
fn stored_names(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(root)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Pull the storage name out of the confirmation message.
fn confirmed_name(html: &str) -> String {
    let start = html
        .find("Upload complete: ")
        .expect("confirmation message missing")
        + "Upload complete: ".len();
    let end = html[start..].find('<').unwrap() + start;
    html[start..end].trim().to_string()
}

fn file_form(tag: Option<&str>, file_name: &str, content: &[u8]) -> MultipartForm {
    let mut form = MultipartForm::new();
    if let Some(tag) = tag {
        form = form.add_text("tag", tag.to_string());
    }
    form.add_part(
        "file",
        Part::bytes(content.to_vec())
            .file_name(file_name.to_string())
            .mime_type("application/octet-stream"),
    )
}

// ============================================================================
// Index
// ============================================================================

#[tokio::test]
async fn test_index_renders_both_forms() {
    let (server, _temp_dir) = create_test_server();

    let response = server.get("/").await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains(r#"action="/upload""#));
    assert!(html.contains(r#"action="/download""#));
    assert_eq!(
        response.header(header::X_CONTENT_TYPE_OPTIONS),
        "nosniff"
    );
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn test_upload_and_round_trip() {
    let (server, temp_dir) = create_test_server();
    let content: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    let response = server
        .post("/upload")
        .multipart(file_form(Some("t1"), "report.pdf", &content))
        .await;

    response.assert_status_ok();
    let storage_name = confirmed_name(&response.text());
    assert!(storage_name.starts_with("t1_"));
    assert!(storage_name.ends_with("_report.pdf"));
    assert_eq!(stored_names(&uploads_dir(&temp_dir)), vec![storage_name.clone()]);

    let response = server.get(&format!("/file/{storage_name}")).await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), content.as_slice());
    assert_eq!(
        response.header(header::CONTENT_DISPOSITION),
        format!("attachment; filename=\"{storage_name}\"").as_str()
    );
    assert_eq!(response.header(header::CONTENT_TYPE), "application/pdf");
}

#[tokio::test]
async fn test_upload_storage_name_format() {
    let (server, _temp_dir) = create_test_server();

    let response = server
        .post("/upload")
        .multipart(file_form(Some("t1"), "report.pdf", b"x"))
        .await;

    let storage_name = confirmed_name(&response.text());
    let parts: Vec<&str> = storage_name.splitn(4, '_').collect();

    assert_eq!(parts.len(), 4);
    assert_eq!(parts[0], "t1");
    assert_eq!(parts[1].len(), 8);
    assert!(parts[1].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[2].len(), 6);
    assert!(parts[2].chars().all(|c| c.is_ascii_digit()));
    assert_eq!(parts[3], "report.pdf");
}

#[tokio::test]
async fn test_upload_default_tag() {
    let (server, _temp_dir) = create_test_server();

    let response = server
        .post("/upload")
        .multipart(file_form(None, "a.txt", b"absent tag"))
        .await;
    assert!(confirmed_name(&response.text()).starts_with("unknown_"));

    let response = server
        .post("/upload")
        .multipart(file_form(Some(""), "b.txt", b"empty tag"))
        .await;
    assert!(confirmed_name(&response.text()).starts_with("unknown_"));
}

#[tokio::test]
async fn test_upload_traversal_name_is_sanitized() {
    let (server, temp_dir) = create_test_server();

    let response = server
        .post("/upload")
        .multipart(file_form(Some("t"), "../../etc/passwd", b"root:x:0:0"))
        .await;

    response.assert_status_ok();
    let storage_name = confirmed_name(&response.text());
    assert!(!storage_name.contains('/'));
    assert!(!storage_name.contains('\\'));
    assert!(storage_name.ends_with("_etc_passwd"));

    // Nothing was written outside the root
    assert!(!temp_dir.path().join("etc").exists());
    assert_eq!(stored_names(&uploads_dir(&temp_dir)).len(), 1);
}

#[tokio::test]
async fn test_upload_unicode_name_uses_placeholder() {
    let (server, temp_dir) = create_test_server();

    let response = server
        .post("/upload")
        .multipart(file_form(Some("t"), "日本語", b"data"))
        .await;

    let storage_name = confirmed_name(&response.text());
    assert!(storage_name.ends_with("_file"));
    assert!(uploads_dir(&temp_dir).join(&storage_name).is_file());
}

#[tokio::test]
async fn test_upload_overlong_tag_and_name() {
    let (server, temp_dir) = create_test_server();
    let tag = "a".repeat(300);
    let file_name = format!("{}.pdf", "b".repeat(300));

    let response = server
        .post("/upload")
        .multipart(file_form(Some(&tag), &file_name, b"long names"))
        .await;

    response.assert_status_ok();
    let storage_name = confirmed_name(&response.text());
    assert!(storage_name.len() <= MAX_NAME_BYTES);
    assert!(storage_name.ends_with(".pdf"));
    assert_eq!(stored_names(&uploads_dir(&temp_dir)), vec![storage_name.clone()]);

    let response = server.get(&format!("/file/{storage_name}")).await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"long names");
}

#[tokio::test]
async fn test_upload_without_file() {
    let (server, temp_dir) = create_test_server();

    let response = server
        .post("/upload")
        .multipart(MultipartForm::new().add_text("tag", "t1"))
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("No file attached."));
    assert!(stored_names(&uploads_dir(&temp_dir)).is_empty());
}

#[tokio::test]
async fn test_upload_nothing_selected() {
    let (server, temp_dir) = create_test_server();

    let response = server
        .post("/upload")
        .multipart(file_form(Some("t1"), "", b""))
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("No file attached."));
    assert!(stored_names(&uploads_dir(&temp_dir)).is_empty());
}

#[tokio::test]
async fn test_upload_too_large() {
    let (server, temp_dir) = create_test_server_with_limit(Some(1024));

    let response = server
        .post("/upload")
        .multipart(file_form(Some("big"), "big.bin", &vec![0u8; 64 * 1024]))
        .expect_failure()
        .await;

    assert!(response.status_code().is_client_error());
    assert!(response.text().contains("Upload failed"));
    assert!(stored_names(&uploads_dir(&temp_dir)).is_empty());
}

// ============================================================================
// Raw download
// ============================================================================

#[tokio::test]
async fn test_raw_download_not_found() {
    let (server, _temp_dir) = create_test_server();

    let response = server.get("/file/nonexistent.txt").expect_failure().await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "File not found");
    assert!(response
        .header(header::CONTENT_TYPE)
        .to_str()
        .unwrap()
        .starts_with("text/plain"));
}

#[tokio::test]
async fn test_raw_download_undecodable_name() {
    let (server, _temp_dir) = create_test_server();

    let response = server.get("/file/%FF%FE").expect_failure().await;

    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.text(), "File not found");
}

#[tokio::test]
async fn test_raw_download_traversal_is_confined() {
    let (server, temp_dir) = create_test_server();
    std::fs::write(temp_dir.path().join("secret.txt"), b"outside").unwrap();

    // Outside file is unreachable while nothing of that name is inside
    let response = server
        .get("/file/..%2F..%2Fsecret.txt")
        .expect_failure()
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    let response = server
        .get("/file/..%5C..%5Csecret.txt")
        .expect_failure()
        .await;
    response.assert_status(StatusCode::NOT_FOUND);

    // With a same-named file inside the root, that one is served
    std::fs::write(uploads_dir(&temp_dir).join("secret.txt"), b"inside").unwrap();

    let response = server.get("/file/..%2F..%2Fsecret.txt").await;
    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"inside");
}

// ============================================================================
// Form download
// ============================================================================

#[tokio::test]
async fn test_form_download() {
    let (server, _temp_dir) = create_test_server();

    let response = server
        .post("/upload")
        .multipart(file_form(Some("t2"), "notes.txt", b"hello relay"))
        .await;
    let storage_name = confirmed_name(&response.text());

    let response = server
        .get("/download")
        .add_query_param("filename", &storage_name)
        .await;

    response.assert_status_ok();
    assert_eq!(response.as_bytes().as_ref(), b"hello relay");
    assert!(response
        .header(header::CONTENT_DISPOSITION)
        .to_str()
        .unwrap()
        .starts_with("attachment;"));
}

#[tokio::test]
async fn test_form_download_missing_parameter() {
    let (server, _temp_dir) = create_test_server();

    let response = server.get("/download").await;
    response.assert_status_ok();
    assert!(response.text().contains("Enter a filename."));

    let response = server
        .get("/download")
        .add_query_param("filename", "")
        .await;
    response.assert_status_ok();
    assert!(response.text().contains("Enter a filename."));
}

#[tokio::test]
async fn test_form_download_not_found() {
    let (server, _temp_dir) = create_test_server();

    let response = server
        .get("/download")
        .add_query_param("filename", "nonexistent.txt")
        .await;

    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("File does not exist."));
    assert!(html.contains(r#"action="/upload""#));
}

#[tokio::test]
async fn test_form_download_traversal_is_confined() {
    let (server, temp_dir) = create_test_server();
    std::fs::write(temp_dir.path().join("secret.txt"), b"outside").unwrap();

    let response = server
        .get("/download")
        .add_query_param("filename", "../secret.txt")
        .await;

    response.assert_status_ok();
    assert!(response.text().contains("File does not exist."));
}
