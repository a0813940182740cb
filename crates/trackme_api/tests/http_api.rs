use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use common::domain::InMemoryTrackingEventRepository;
use common::s3::{S3Config, S3PhotoStore};
use common::telegram::{TelegramConfig, TelegramNotifier};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;
use trackme_api::{build_router, HttpServerConfig, NotificationDispatcher, TrackingEventService};

const BOUNDARY: &str = "trackme-test-boundary";

struct TestApp {
    router: Router,
    photo_store: Arc<S3PhotoStore>,
}

fn test_app() -> TestApp {
    // Unset credentials: every notification fails with a config error
    let notifier = TelegramNotifier::new(TelegramConfig::default()).unwrap();
    let photo_store = Arc::new(S3PhotoStore::in_memory(S3Config {
        region: "ap-southeast-1".to_string(),
        bucket: "trackme-photos".to_string(),
        ..Default::default()
    }));

    let service = TrackingEventService::new(
        Arc::new(InMemoryTrackingEventRepository::new()),
        photo_store.clone(),
        NotificationDispatcher::new(Arc::new(notifier)),
    );

    TestApp {
        router: build_router(Arc::new(service), &HttpServerConfig::default()),
        photo_store,
    }
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::USER_AGENT, "integration-test")
        .header("x-forwarded-for", "203.0.113.50");
    let body = match body {
        Some(v) => Body::from(serde_json::to_vec(&v).unwrap()),
        None => Body::empty(),
    };

    let (status, bytes) = send(router, builder.body(body).unwrap()).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn multipart_request(id_field: &str, record_id: &str, file: Option<(&str, &[u8])>) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{id_field}\"\r\n\r\n{record_id}\r\n"
        )
        .as_bytes(),
    );
    if let Some((filename, content)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{filename}\"\r\nContent-Type: image/png\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/locations/photos")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn create_event(router: &Router) -> String {
    let (status, body) = send_json(
        router,
        Method::POST,
        "/locations",
        Some(json!({
            "location": {"latitude": 1.0, "longitude": 2.0},
            "device": {"model": "x"}
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_save_location_returns_id_despite_notifier_failure() {
    let app = test_app();

    let id = create_event(&app.router).await;
    assert_eq!(id.len(), 20);

    let (status, body) = send_json(&app.router, Method::GET, "/locations", None).await;
    assert_eq!(status, StatusCode::OK);
    let events = body["events"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], id);
    assert_eq!(events[0]["location"], json!({"latitude": 1.0, "longitude": 2.0}));
    assert_eq!(events[0]["device"], json!({"model": "x"}));
    assert!(events[0].get("photo").is_none());
}

#[tokio::test]
async fn test_save_location_missing_device() {
    let app = test_app();

    let (status, body) = send_json(
        &app.router,
        Method::POST,
        "/locations",
        Some(json!({"location": {"latitude": 1.0, "longitude": 2.0}})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("device"));

    let (_, body) = send_json(&app.router, Method::GET, "/locations", None).await;
    assert!(body["events"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_save_location_malformed_body() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/locations")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "Invalid request body");
}

#[tokio::test]
async fn test_upload_photo_attaches_url() {
    let app = test_app();
    let id = create_event(&app.router).await;

    let (status, body) = send(
        &app.router,
        multipart_request("recordId", &id, Some(("capture.png", b"\x89PNG-bytes"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["filename"], "capture.png");
    let path = body["path"].as_str().unwrap();
    assert!(path.starts_with("https://trackme-photos.s3.ap-southeast-1.amazonaws.com/photos/"));
    assert!(path.ends_with("-capture.png"));

    let key = path
        .strip_prefix("https://trackme-photos.s3.ap-southeast-1.amazonaws.com/")
        .unwrap();
    let stored = app.photo_store.download(key).await.unwrap();
    assert_eq!(stored.as_ref(), b"\x89PNG-bytes");

    let (_, body) = send_json(&app.router, Method::GET, "/locations", None).await;
    let event = &body["events"][0];
    assert_eq!(event["photo"]["name"], "capture.png");
    assert_eq!(event["photo"]["path"], path);
    assert_eq!(event["device"], json!({"model": "x"}));
}

#[tokio::test]
async fn test_upload_photo_accepts_id_field() {
    let app = test_app();
    let id = create_event(&app.router).await;

    let (status, _) = send(
        &app.router,
        multipart_request("id", &id, Some(("a.jpg", b"jpeg"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_upload_photo_without_file() {
    let app = test_app();
    let id = create_event(&app.router).await;

    let (status, body) = send(&app.router, multipart_request("recordId", &id, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "no file uploaded");
}

#[tokio::test]
async fn test_upload_photo_text_field_is_not_a_file() {
    let app = test_app();
    let id = create_event(&app.router).await;

    let body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"recordId\"\r\n\r\n{id}\r\n\
         --{BOUNDARY}\r\nContent-Disposition: form-data; name=\"photo\"\r\n\r\nnot a file\r\n\
         --{BOUNDARY}--\r\n"
    );
    let request = Request::builder()
        .method(Method::POST)
        .uri("/locations/photos")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();

    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "no file uploaded");

    let (_, body) = send_json(&app.router, Method::GET, "/locations", None).await;
    assert!(body["events"][0].get("photo").is_none());
}

#[tokio::test]
async fn test_upload_photo_unsafe_file_name() {
    let app = test_app();
    let id = create_event(&app.router).await;

    let (status, body) = send(
        &app.router,
        multipart_request("recordId", &id, Some(("my photo#1.png", b"png"))),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["filename"], "my photo#1.png");
    let key = body["path"]
        .as_str()
        .unwrap()
        .strip_prefix("https://trackme-photos.s3.ap-southeast-1.amazonaws.com/")
        .unwrap();
    assert!(key.ends_with("-my_photo_1.png"));
    assert_eq!(app.photo_store.download(key).await.unwrap().as_ref(), b"png");
}

#[tokio::test]
async fn test_upload_photo_invalid_id() {
    let app = test_app();

    let (status, body) = send(
        &app.router,
        multipart_request("recordId", "nope", Some(("a.png", b"png"))),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let body: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(body["error"], "invalid id format");
}

#[tokio::test]
async fn test_upload_photo_unknown_id() {
    let app = test_app();
    create_event(&app.router).await;

    let (status, _) = send(
        &app.router,
        multipart_request("recordId", &xid::new().to_string(), Some(("a.png", b"png"))),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send_json(&app.router, Method::GET, "/locations", None).await;
    assert!(body["events"][0].get("photo").is_none());
}

#[tokio::test]
async fn test_click_redirects() {
    let app = test_app();

    let request = Request::builder()
        .uri("/click?url=https%3A%2F%2Fexample.com%2Fpromo")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(
        response.headers()[header::LOCATION],
        "https://example.com/promo"
    );
}

#[tokio::test]
async fn test_click_requires_url() {
    let app = test_app();

    let (status, body) = send_json(&app.router, Method::GET, "/click", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "URL parameter is required");
}

#[tokio::test]
async fn test_health() {
    let app = test_app();

    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = send(&app.router, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"ok");
}

#[tokio::test]
async fn test_cors_allows_any_origin() {
    let app = test_app();

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/locations")
        .header(header::ORIGIN, "https://visitor.example")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "*"
    );
}
