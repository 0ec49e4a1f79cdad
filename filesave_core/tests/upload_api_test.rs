use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use filesave_core::{create_app, AppState, FileManager, FileStorage};
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "upload-api-boundary";

struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    content_type: Option<&'a str>,
    data: &'a [u8],
}

fn file_part<'a>(file_name: &'a str, content_type: &'a str, data: &'a [u8]) -> Part<'a> {
    Part {
        name: "files",
        file_name: Some(file_name),
        content_type: Some(content_type),
        data,
    }
}

fn upload_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                    part.name, file_name
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name).as_bytes(),
            ),
        }
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

fn test_app(mount: &Path) -> Router {
    let manager = FileManager::with_default_config().with_storage(FileStorage::new(mount));
    create_app(AppState::new(manager))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

#[tokio::test]
async fn test_single_upload_is_stored_under_dated_directory() {
    let mount = TempDir::new().unwrap();
    let app = test_app(mount.path());

    let request = upload_request(
        "/api/upload",
        &[file_part("photo.png", "image/png", b"png bytes")],
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 200);
    assert_eq!(body["msg"], "success");

    let url = body["data"].as_str().unwrap();
    assert!(url.starts_with("upload/"));
    assert!(url.ends_with(".png"));
    assert_eq!(url.split('/').count(), 5);
    assert_eq!(std::fs::read(mount.path().join(url)).unwrap(), b"png bytes");
}

#[tokio::test]
async fn test_stored_file_is_served_from_mount() {
    let mount = TempDir::new().unwrap();
    let app = test_app(mount.path());

    let request = upload_request(
        "/api/upload",
        &[file_part("notes.txt", "text/plain", b"served back")],
    );
    let (_, body) = send(&app, request).await;
    let url = body["data"].as_str().unwrap().to_string();

    let request = Request::builder()
        .uri(format!("/{}", url))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let content = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&content[..], b"served back");
}

#[tokio::test]
async fn test_single_endpoint_rejects_two_files() {
    let mount = TempDir::new().unwrap();
    let app = test_app(mount.path());

    let request = upload_request(
        "/api/upload",
        &[
            file_part("a.png", "image/png", b"a"),
            file_part("b.png", "image/png", b"b"),
        ],
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1004);
    assert_eq!(body["msg"], "Multiple files are not allowed");
    assert!(!mount.path().join("upload").exists());
}

#[tokio::test]
async fn test_disallowed_type_is_localized() {
    let mount = TempDir::new().unwrap();
    let app = test_app(mount.path());

    let request = upload_request(
        "/api/upload?lang=zh",
        &[file_part("notes.md", "application/octet-stream", b"# notes")],
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1001);
    assert!(body["msg"].as_str().unwrap().starts_with("无效的文件类型"));
}

#[tokio::test]
async fn test_missing_files_are_reported() {
    let mount = TempDir::new().unwrap();
    let app = test_app(mount.path());

    let request = upload_request(
        "/api/upload",
        &[Part {
            name: "avatar",
            file_name: Some("a.png"),
            content_type: Some("image/png"),
            data: b"png",
        }],
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1003);
    assert_eq!(body["msg"], "No files received");
}

#[tokio::test]
async fn test_text_field_gets_generic_invalid_file_reply() {
    let mount = TempDir::new().unwrap();
    let app = test_app(mount.path());

    let request = upload_request(
        "/api/upload",
        &[Part {
            name: "files",
            file_name: None,
            content_type: None,
            data: b"not a file",
        }],
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
    assert_eq!(body["msg"], "Please upload a valid file");
}

#[tokio::test]
async fn test_batch_upload_returns_every_path() {
    let mount = TempDir::new().unwrap();
    let app = test_app(mount.path());

    let request = upload_request(
        "/api/upload/batch",
        &[
            file_part("a.csv", "text/csv", b"a,b"),
            file_part("b.pdf", "application/pdf", b"%PDF"),
        ],
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    let urls = body["data"].as_array().unwrap();
    assert_eq!(urls.len(), 2);
    assert!(urls[0].as_str().unwrap().ends_with(".csv"));
    assert!(urls[1].as_str().unwrap().ends_with(".pdf"));
    for url in urls {
        assert!(mount.path().join(url.as_str().unwrap()).is_file());
    }
}

#[tokio::test]
async fn test_batch_upload_limit() {
    let mount = TempDir::new().unwrap();
    let app = test_app(mount.path());

    let request = upload_request(
        "/api/upload/batch",
        &[
            file_part("1.txt", "text/plain", b"1"),
            file_part("2.txt", "text/plain", b"2"),
            file_part("3.txt", "text/plain", b"3"),
            file_part("4.txt", "text/plain", b"4"),
        ],
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1005);
    assert_eq!(body["msg"], "Number of files exceeded, Maximum allowed: 3");
}

#[tokio::test]
async fn test_unwritable_mount_reports_upload_failure() {
    let temp_dir = TempDir::new().unwrap();
    let blocker = temp_dir.path().join("blocker");
    std::fs::write(&blocker, b"regular file").unwrap();
    let app = test_app(&blocker);

    let request = upload_request(
        "/api/upload",
        &[file_part("photo.png", "image/png", b"png bytes")],
    );
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["code"], 1008);
    assert_eq!(body["msg"], "Error uploading file");
}

#[tokio::test]
async fn test_health_endpoint() {
    let mount = TempDir::new().unwrap();
    let app = test_app(mount.path());

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app, request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
