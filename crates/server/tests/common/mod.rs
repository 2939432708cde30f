//! Common test utilities for API testing with mocks.
//!
//! This module provides a test fixture that creates an in-process server
//! with a mock uploader injected, so the whole API can be exercised without
//! a real upload server.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::Path;
use axum::http::{header, Request, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tower::ServiceExt;

use photodrop_core::{
    testing::MockUploader, Config, GalleryClient, GalleryConfig, ServerConfig, UploadConfig,
    Uploader,
};
use photodrop_server::state::AppState;

/// Re-export fixtures for test convenience
pub use photodrop_core::testing::fixtures;

const BOUNDARY: &str = "photodrop-test-boundary";

/// Test fixture for API testing with mock dependencies.
///
/// # Example
///
/// ```rust,ignore
/// #[tokio::test]
/// async fn test_stage() {
///     let fixture = TestFixture::new().await;
///
///     let response = fixture
///         .post_files("/api/v1/uploads/alice/files", &[("a.jpg", "image/jpeg", b"..")])
///         .await;
///
///     assert_eq!(response.status, 201);
/// }
/// ```
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Shared state behind the router
    pub state: Arc<AppState>,
    /// Mock uploader - script upload outcomes
    pub uploader: Arc<MockUploader>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

/// Response with the body left as bytes
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl TestFixture {
    /// Create a new test fixture without a gallery upstream.
    pub async fn new() -> Self {
        Self::with_gallery(None).await
    }

    /// Create a test fixture whose gallery proxy points at `base_url`.
    pub async fn with_gallery(base_url: Option<String>) -> Self {
        let uploader = Arc::new(MockUploader::new());

        let config = Config {
            server: ServerConfig {
                host: std::net::IpAddr::V4(std::net::Ipv4Addr::LOCALHOST),
                port: 0, // Not used for in-process testing
                ..ServerConfig::default()
            },
            upload: UploadConfig {
                url: "http://uploads.invalid".to_string(),
                timeout_secs: 5,
                default_folder: "folder_1".to_string(),
            },
            gallery: base_url.map(|base_url| GalleryConfig {
                base_url,
                timeout_secs: 5,
            }),
        };

        let gallery = config
            .gallery
            .clone()
            .map(|g| GalleryClient::new(g).expect("Failed to create gallery client"));

        let state = Arc::new(AppState::new(
            config,
            Arc::clone(&uploader) as Arc<dyn Uploader>,
            gallery,
        ));

        let router = photodrop_server::api::create_router(Arc::clone(&state));

        Self {
            router,
            state,
            uploader,
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request without a body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Send a multipart POST with one `file` part per `(name, content_type, bytes)`.
    pub async fn post_files(&self, path: &str, files: &[(&str, &str, &[u8])]) -> TestResponse {
        let mut body = Vec::new();
        for (name, content_type, bytes) in files {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(bytes);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let raw = self.send(request).await;
        TestResponse {
            status: raw.status,
            body: parse_json(&raw.body),
        }
    }

    /// Send a GET request and keep the body as bytes.
    pub async fn get_raw(&self, path: &str) -> RawResponse {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();
        self.send(request).await
    }

    /// Serve the router on a real localhost listener; returns its address.
    ///
    /// The served router shares `state` with the in-process one, so requests
    /// through either side see the same sessions.
    pub async fn spawn_server(&self) -> std::net::SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = self.router.clone();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    /// Poll the session until no batch is running.
    pub async fn wait_for_batch(&self, username: &str) -> TestResponse {
        for _ in 0..100 {
            let response = self.get(&format!("/api/v1/uploads/{}", username)).await;
            if response.body["uploading"] == false {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("Batch for {} did not finish in time", username);
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        let request = request_builder.body(body).unwrap();
        let raw = self.send(request).await;

        TestResponse {
            status: raw.status,
            body: parse_json(&raw.body),
        }
    }

    async fn send(&self, request: Request<Body>) -> RawResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes()
            .to_vec();

        RawResponse {
            status,
            content_type,
            body,
        }
    }
}

fn parse_json(bytes: &[u8]) -> Value {
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(bytes).unwrap_or(Value::Null)
    }
}

/// Start a fake gallery upstream; returns its base URL.
///
/// `GET /{username}` answers with a small listing, `GET /broken/{username}`
/// answers with a body that is not JSON.
pub async fn spawn_gallery_upstream() -> String {
    async fn listing(Path(username): Path<String>) -> Json<Value> {
        Json(json!({
            "username": username,
            "photos": [
                { "path": format!("/uploads/{}/folder_1/a.jpg", username) }
            ]
        }))
    }

    async fn broken(Path(_username): Path<String>) -> &'static str {
        "<html>gateway error</html>"
    }

    let app = Router::new()
        .route("/{username}", get(listing))
        .route("/broken/{username}", get(broken));

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status,
            $response.status,
            serde_json::to_string_pretty(&$response.body).unwrap_or_default()
        );
    };
}
