use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use fusion_frame::{
    config::Settings,
    pipeline::{Format, FusionBrain, Generator},
    server::{router, AppState},
};
use httpmock::{
    Method::{GET, POST},
    MockServer,
};
use image::{DynamicImage, GrayImage, Luma};
use serde_json::json;
use std::time::Duration;
use tower::util::ServiceExt;

/// Always returns a horizontal gradient.
struct Gradient;

#[async_trait]
impl Generator for Gradient {
    async fn generate(&self, prompt: &str) -> anyhow::Result<DynamicImage> {
        assert!(prompt.ends_with(", black and white, high contrast, no color"));
        Ok(DynamicImage::ImageLuma8(GrayImage::from_fn(800, 600, |x, _| {
            Luma([(x * 255 / 799) as u8])
        })))
    }
}

struct Broken;

#[async_trait]
impl Generator for Broken {
    async fn generate(&self, _prompt: &str) -> anyhow::Result<DynamicImage> {
        anyhow::bail!("connection reset")
    }
}

async fn get(app: Router, uri: &str) -> (StatusCode, Option<String>, Vec<u8>) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, body.to_vec())
}

#[tokio::test]
async fn index() {
    let app = router(AppState::new(Gradient, Settings::default()));
    let (status, content_type, body) = get(app, "/").await;
    assert_eq!(status, StatusCode::OK);
    assert!(content_type.unwrap().starts_with("text/html"));
    assert!(String::from_utf8(body).unwrap().contains("href=\"/image\""));
}

#[tokio::test]
async fn png() {
    let app = router(AppState::new(Gradient, Settings::default()));
    let (status, content_type, body) = get(app, "/image").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    // 1-bit grayscale IHDR.
    assert_eq!(&body[12..16], b"IHDR");
    assert_eq!((body[24], body[25]), (1, 0));
    let image = image::load_from_memory_with_format(&body, image::ImageFormat::Png)
        .unwrap()
        .into_luma8();
    assert_eq!(image.dimensions(), (400, 300));
    assert!(image.pixels().all(|p| p.0 == [0] || p.0 == [255]));
}

#[tokio::test]
async fn raw() {
    let settings = Settings {
        format: Format::Raw,
        ..Default::default()
    };
    let app = router(AppState::new(Gradient, settings.clone()));
    let (status, content_type, body) = get(app, "/image").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(body.len(), 15000);
    // Left edge of the gradient is black, right edge is white.
    assert_eq!(body[0] & 0x80, 0);
    assert_eq!(body[49] & 0x01, 0x01);

    let app = router(AppState::new(
        Gradient,
        Settings {
            invert: true,
            ..settings
        },
    ));
    let (_, _, inverted) = get(app, "/image").await;
    assert_eq!(inverted.len(), 15000);
    assert_eq!(inverted[0] & 0x80, 0x80);
    assert_eq!(inverted[49] & 0x01, 0);
}

#[tokio::test]
async fn format_query() {
    let app = router(AppState::new(Gradient, Settings::default()));
    let (status, content_type, body) = get(app.clone(), "/image?format=raw").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("application/octet-stream"));
    assert_eq!(body.len(), 15000);

    let (status, _, _) = get(app, "/image?format=gif").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generator_error() {
    let app = router(AppState::new(Broken, Settings::default()));
    let (status, content_type, body) = get(app, "/image").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(content_type.unwrap().starts_with("text/plain"));
    assert!(String::from_utf8(body).unwrap().contains("connection reset"));
}

fn fusion_brain(server: &MockServer, settings: &Settings) -> FusionBrain {
    let client = fusion_brain::Client::new(fusion_brain::Credentials {
        api_key: "key".into(),
        api_secret: "secret".into(),
    })
    .with_base_url(server.base_url())
    .with_polling(fusion_brain::Polling {
        interval: Duration::ZERO,
        max_attempts: 3,
    });
    FusionBrain::new(client, settings)
}

async fn mock_generation(server: &MockServer, status: serde_json::Value) {
    server
        .mock_async(|when, then| {
            when.method(GET).path("/key/api/v1/pipelines");
            then.status(200).json_body(json!([
                {"id": "k31", "name": "Kandinsky 3.1", "type": "TEXT2IMAGE"},
            ]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/key/api/v1/pipeline/run")
                .body_includes("black and white, high contrast, no color");
            then.status(201)
                .json_body(json!({"uuid": "job-1", "status": "INITIAL", "status_time": 0}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/key/api/v1/pipeline/status/job-1");
            then.status(200).json_body(status.clone());
        })
        .await;
}

#[tokio::test]
async fn generation_failed() {
    let server = MockServer::start_async().await;
    mock_generation(&server, json!({"uuid": "job-1", "status": "FAILED"})).await;

    let app = router(AppState::new(
        fusion_brain(&server, &Settings::default()),
        Settings::default(),
    ));
    let (status, _, body) = get(app, "/image").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8(body).unwrap().contains("FAILED"));
}

#[tokio::test]
async fn generation_done() {
    use base64::Engine as _;

    let mut png = std::io::Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        32,
        24,
        image::Rgba([0, 0, 0, 0]),
    ))
    .write_to(&mut png, image::ImageOutputFormat::Png)
    .unwrap();
    let file = base64::engine::general_purpose::STANDARD.encode(png.into_inner());

    let server = MockServer::start_async().await;
    mock_generation(
        &server,
        json!({"uuid": "job-1", "status": "DONE", "result": {"files": [file]}}),
    )
    .await;

    let settings = Settings {
        format: Format::Raw,
        ..Default::default()
    };
    let app = router(AppState::new(fusion_brain(&server, &settings), settings));
    let (status, _, body) = get(app, "/image").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.len(), 15000);
    // Fully transparent input comes out white.
    assert!(body.iter().all(|&b| b == 0xFF));
}

#[tokio::test]
async fn generation_params() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/key/api/v1/pipelines");
            then.status(200)
                .json_body(json!([{"id": "k31", "name": "Kandinsky 3.1", "type": "TEXT2IMAGE"}]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/key/api/v1/pipeline/status/job-1");
            then.status(200)
                .json_body(json!({"uuid": "job-1", "status": "FAIL"}));
        })
        .await;
    let run = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/key/api/v1/pipeline/run")
                .body_includes("\"style\":\"UHD\"")
                .body_includes("\"negativePromptDecoder\":\"color, text\"")
                .body_includes("\"width\":768");
            then.status(201)
                .json_body(json!({"uuid": "job-1", "status": "INITIAL", "status_time": 0}));
        })
        .await;

    let settings = Settings {
        width: 768,
        style: Some("UHD".into()),
        negative_prompt: Some("color, text".into()),
        ..Default::default()
    };
    let app = router(AppState::new(fusion_brain(&server, &settings), settings));
    let (status, _, body) = get(app, "/image").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(String::from_utf8(body).unwrap().contains("FAIL"));
    run.assert_async().await;
}
