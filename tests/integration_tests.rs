//! End-to-end tests driving the HTTP router.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use std::io::Cursor;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

use convert_hub::api::router;
use convert_hub::{ConfigBuilder, ConversionService, ExecutionMode, JobId, JobStatus};

const BOUNDARY: &str = "convert-hub-test-boundary";

async fn build_test_app(temp_dir: &TempDir, mode: ExecutionMode) -> (Router, ConversionService) {
    let config = ConfigBuilder::new()
        .with_uploads_dir(temp_dir.path().join("uploads"))
        .with_execution(mode)
        .with_max_concurrent_jobs(2)
        .build();
    let service = ConversionService::new(config).await.unwrap();
    (router(service.clone()), service)
}

fn multipart_body(file: Option<(&str, &[u8])>, tool_slug: Option<&str>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(slug) = tool_slug {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"toolSlug\"\r\n\r\n{slug}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn submit(app: Router, file: Option<(&str, &[u8])>, tool_slug: Option<&str>) -> Response {
    let request = Request::builder()
        .method("POST")
        .uri("/api/jobs")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(file, tool_slug)))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

async fn get(app: Router, uri: &str) -> Response {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.oneshot(request).await.unwrap()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

fn png_bytes() -> Vec<u8> {
    let mut bytes = Vec::new();
    image::RgbImage::from_pixel(16, 16, image::Rgb([30, 144, 255]))
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .unwrap();
    bytes
}

// ---------------------------------------------------------------------------
// Submission and download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn png_to_jpg_end_to_end() {
    let temp_dir = TempDir::new().unwrap();
    let (app, _) = build_test_app(&temp_dir, ExecutionMode::Inline).await;

    let png = png_bytes();
    let response = submit(app.clone(), Some(("holiday photo.png", &png)), Some("png-to-jpg")).await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["status"], "completed");
    let job_id = json["jobId"].as_str().unwrap().to_string();
    let download_url = json["downloadUrl"].as_str().unwrap().to_string();
    assert_eq!(download_url, format!("/api/jobs/{}/download", job_id));

    let response = get(app.clone(), &download_url).await;
    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"holiday%20photo.jpg\""
    );

    let bytes = body_bytes(response).await;
    assert_eq!(headers[header::CONTENT_LENGTH], bytes.len().to_string().as_str());
    let decoded = image::load_from_memory(&bytes).unwrap();
    assert_eq!(decoded.width(), 16);

    // The status record is terminal and stable across reads
    let first = body_json(get(app.clone(), &format!("/api/jobs/{}", job_id)).await).await;
    let second = body_json(get(app, &format!("/jobs/{}", job_id)).await).await;
    assert_eq!(first, second);
    assert_eq!(first["status"], "completed");
    assert!(first.get("error").is_none());
}

#[tokio::test]
async fn wrong_extension_lists_accepted_types() {
    let temp_dir = TempDir::new().unwrap();
    let (app, _) = build_test_app(&temp_dir, ExecutionMode::Inline).await;

    let response = submit(app, Some(("notes.txt", b"hello")), Some("jpg-to-png")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(response).await;
    let error = json["error"].as_str().unwrap();
    assert!(error.contains(".jpg"));
    assert!(error.contains(".jpeg"));

    // Nothing was stored for a rejected submission
    let stored = std::fs::read_dir(temp_dir.path().join("uploads")).unwrap().count();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn missing_fields_and_unknown_tool() {
    let temp_dir = TempDir::new().unwrap();
    let (app, _) = build_test_app(&temp_dir, ExecutionMode::Inline).await;

    let response = submit(app.clone(), None, Some("jpg-to-png")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "A file is required");

    let response = submit(app.clone(), Some(("a.jpg", b"data")), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "A tool slug is required");

    let response = submit(app, Some(("a.jpg", b"data")), Some("jpg-to-nothing")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Unknown conversion tool");
}

#[tokio::test]
async fn failed_conversion_returns_details() {
    let temp_dir = TempDir::new().unwrap();
    let (app, _) = build_test_app(&temp_dir, ExecutionMode::Inline).await;

    let response = submit(app, Some(("fake.png", b"definitely not a png")), Some("png-to-jpg")).await;
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let json = body_json(response).await;
    assert_eq!(json["error"], "Conversion failed");
    assert!(json["details"].is_string());
}

#[tokio::test]
async fn missing_capabilities_report_not_implemented() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigBuilder::new()
        .with_uploads_dir(temp_dir.path().join("uploads"))
        .with_ffmpeg_path(PathBuf::from("/nonexistent/ffmpeg"))
        .build();
    let app = router(ConversionService::new(config).await.unwrap());

    let response = submit(app.clone(), Some(("clip.mp4", b"not really video")), Some("mp4-to-mov")).await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
    assert_eq!(body_json(response).await["error"], "Conversion not available");

    let response = submit(app, Some(("photo.avif", b"avif bytes")), Some("avif-to-png")).await;
    assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn text_to_pptx_downloads_a_presentation() {
    let temp_dir = TempDir::new().unwrap();
    let (app, _) = build_test_app(&temp_dir, ExecutionMode::Inline).await;

    let text = b"Welcome\n\nAgenda\nItem one";
    let response = submit(app.clone(), Some(("talk.txt", text)), Some("txt-to-pptx")).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let download_url = body_json(response).await["downloadUrl"].as_str().unwrap().to_string();

    let response = get(app, &download_url).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/vnd.openxmlformats-officedocument.presentationml.presentation"
    );
    let bytes = body_bytes(response).await;
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    assert!(archive.by_name("ppt/slides/slide2.xml").is_ok());
    assert!(archive.by_name("ppt/slides/slide3.xml").is_err());
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let config = ConfigBuilder::new()
        .with_uploads_dir(temp_dir.path().join("uploads"))
        .with_max_upload_bytes(4)
        .build();
    let app = router(ConversionService::new(config).await.unwrap());

    let png = png_bytes();
    let response = submit(app, Some(("photo.png", &png)), Some("png-to-jpg")).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"]
        .as_str()
        .unwrap()
        .starts_with("File is too large"));
}

// ---------------------------------------------------------------------------
// Status and download lookups
// ---------------------------------------------------------------------------

#[tokio::test]
async fn unknown_job_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let (app, _) = build_test_app(&temp_dir, ExecutionMode::Inline).await;

    let id = JobId::new();
    let response = get(app.clone(), &format!("/api/jobs/{}", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Job not found");

    let response = get(app.clone(), &format!("/api/jobs/{}/download", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, "/api/jobs/not-a-job-id").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn processing_job_download_conflicts() {
    let temp_dir = TempDir::new().unwrap();
    let (app, service) = build_test_app(&temp_dir, ExecutionMode::Inline).await;

    let id = JobId::new();
    service
        .store()
        .write_status(&id, &JobStatus::processing())
        .await
        .unwrap();

    let response = get(app.clone(), &format!("/api/jobs/{}", id)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "processing");
    assert!(json.get("downloadUrl").is_none());

    let response = get(app, &format!("/api/jobs/{}/download", id)).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["error"], "Job is not completed");
}

#[tokio::test]
async fn completed_job_with_missing_output_is_not_found() {
    let temp_dir = TempDir::new().unwrap();
    let (app, service) = build_test_app(&temp_dir, ExecutionMode::Inline).await;

    let id = JobId::new();
    let gone = service.store().job_dir(&id).join("gone.pdf");
    service
        .store()
        .write_status(&id, &JobStatus::completed(gone))
        .await
        .unwrap();

    let response = get(app, &format!("/api/jobs/{}/download", id)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Output not available");
}

#[tokio::test]
async fn background_job_reaches_completed() {
    let temp_dir = TempDir::new().unwrap();
    let (app, _) = build_test_app(&temp_dir, ExecutionMode::Background).await;

    let png = png_bytes();
    let response = submit(app.clone(), Some(("icon.png", &png)), Some("png-to-tiff")).await;
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "processing");
    let job_id = json["jobId"].as_str().unwrap().to_string();

    let mut status = Value::Null;
    for _ in 0..100 {
        status = body_json(get(app.clone(), &format!("/api/jobs/{}", job_id)).await).await;
        if status["status"] != "processing" {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    assert_eq!(status["status"], "completed");

    let response = get(app, status["downloadUrl"].as_str().unwrap()).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/tiff");
}

// ---------------------------------------------------------------------------
// Catalog endpoints
// ---------------------------------------------------------------------------

#[tokio::test]
async fn catalog_endpoints() {
    let temp_dir = TempDir::new().unwrap();
    let (app, _) = build_test_app(&temp_dir, ExecutionMode::Inline).await;

    let response = get(app.clone(), "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    let health = body_json(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["jobs"]["completed"], 0);

    let tools = body_json(get(app.clone(), "/api/tools").await).await;
    assert_eq!(tools.as_array().unwrap().len(), 112);

    let response = get(app.clone(), "/api/tools/jpg-to-png").await;
    assert_eq!(response.status(), StatusCode::OK);
    let tool = body_json(response).await;
    assert_eq!(tool["targetExtension"], ".png");
    assert_eq!(tool["acceptedExtensions"], ".jpg, .jpeg");

    let archives = body_json(get(app.clone(), "/api/tools?category=archives").await).await;
    let labels: Vec<&str> = archives
        .as_array()
        .unwrap()
        .iter()
        .map(|tool| tool["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["File → ZIP", "ZIP → TXT"]);

    let categories = body_json(get(app.clone(), "/api/categories").await).await;
    assert_eq!(categories.as_array().unwrap().len(), 9);

    let response = get(app.clone(), "/api/categories/ocr/tools").await;
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 2);

    let response = get(app, "/api/categories/holograms/tools").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
