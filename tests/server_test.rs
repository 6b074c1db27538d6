//! HTTP surface tests.
//!
//! Each test serves the router on an ephemeral port. Most use a recording
//! fake forwarder; the end-to-end tests put a real ModalClient in front of a
//! wiremock detector.
#![cfg(feature = "server")]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use genreal::server::config::ServerConfig;
use genreal::server::router;
use genreal::upstream::{Endpoints, Forwarder, ModalClient};
use genreal::{Credentials, GenrealError, Payload, Result, Service, Submission, UpstreamResponse};
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::{Value, json};
use tokio::net::TcpListener;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ============================================================================
// Fake forwarder
// ============================================================================

type Reply = Box<dyn Fn(Service) -> Result<UpstreamResponse> + Send + Sync>;

struct RecordingForwarder {
    calls: Mutex<Vec<(Service, Submission)>>,
    reply: Reply,
}

impl RecordingForwarder {
    fn replying(body: Value) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Box::new(move |_| Ok(UpstreamResponse::new(200, body.clone()))),
        })
    }

    fn failing(make_err: fn() -> GenrealError) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            reply: Box::new(move |_| Err(make_err())),
        })
    }

    fn calls(&self) -> Vec<(Service, Submission)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Forwarder for RecordingForwarder {
    fn name(&self) -> &str {
        "recording"
    }

    async fn forward(&self, service: Service, submission: Submission) -> Result<UpstreamResponse> {
        self.calls.lock().unwrap().push((service, submission));
        (self.reply)(service)
    }
}

// ============================================================================
// Helpers
// ============================================================================

async fn serve(forwarder: Arc<dyn Forwarder>, config: ServerConfig) -> String {
    let app = router(forwarder, &config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

async fn serve_default(forwarder: Arc<dyn Forwarder>) -> String {
    serve(forwarder, ServerConfig::default()).await
}

fn scored_reply() -> Value {
    json!({
        "prediction": "MACHINE_GENERATED",
        "confidence": 0.93,
        "probabilities": {"HUMAN_GENERATED": 0.07, "AI_GENERATED": 0.93}
    })
}

fn scored_canonical() -> Value {
    json!({"prediction": "plagiarized", "confidence": 93, "probabilities": {"Human": 7, "AI": 93}})
}

fn code_form(code: &str, language: Option<&str>) -> Form {
    let part = Part::bytes(code.as_bytes().to_vec())
        .file_name("code.py")
        .mime_str("text/x-python")
        .unwrap();
    let form = Form::new().part("file", part);
    match language {
        Some(language) => form.text("language", language.to_string()),
        None => form,
    }
}

async fn post_form(url: String, form: Form) -> (StatusCode, Value) {
    let response = reqwest::Client::new()
        .post(url)
        .multipart(form)
        .send()
        .await
        .unwrap();
    let status = response.status();
    (status, response.json().await.unwrap())
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn health_reports_ok() {
    let base = serve_default(RecordingForwarder::replying(json!({}))).await;
    let body: Value = reqwest::get(format!("{base}/health"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(body["status"], "OK");
    assert_eq!(body["service"], "genreal");
    assert!(body["timestamp"].as_str().unwrap().ends_with('Z'));
}

// ============================================================================
// Text
// ============================================================================

#[tokio::test]
async fn text_multipart_returns_canonical_result() {
    let forwarder = RecordingForwarder::replying(scored_reply());
    let base = serve_default(forwarder.clone()).await;

    let (status, body) = post_form(
        format!("{base}/api/plagiarism/check/text"),
        Form::new().text("text", "Delve into the rich tapestry of ideas."),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, scored_canonical());

    let calls = forwarder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Service::Text);
    assert_eq!(
        calls[0].1.payload,
        Payload::text("Delve into the rich tapestry of ideas.")
    );
}

#[tokio::test]
async fn text_urlencoded_and_json_are_accepted() {
    let forwarder = RecordingForwarder::replying(json!({"label": "HUMAN_GENERATED"}));
    let base = serve_default(forwarder.clone()).await;
    let client = reqwest::Client::new();
    let expected = json!({"prediction": "original", "confidence": 80, "probabilities": {"Human": 80, "AI": 20}});

    let response = client
        .post(format!("{base}/api/plagiarism/check/text"))
        .form(&[("text", "written by hand")])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), expected);

    let response = client
        .post(format!("{base}/api/plagiarism/check/text"))
        .json(&json!({"text": "written by hand"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.json::<Value>().await.unwrap(), expected);

    assert_eq!(forwarder.calls().len(), 2);
}

#[tokio::test]
async fn blank_text_is_rejected_without_forwarding() {
    let forwarder = RecordingForwarder::replying(scored_reply());
    let base = serve_default(forwarder.clone()).await;
    let client = reqwest::Client::new();

    for body in [json!({"text": "   \n"}), json!({}), json!({"text": 7})] {
        let response = client
            .post(format!("{base}/api/plagiarism/check/text"))
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], "Text input is required.");
    }

    // No body at all
    let response = client
        .post(format!("{base}/api/plagiarism/check/text"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(forwarder.calls().is_empty());
}

#[tokio::test]
async fn empty_upstream_body_is_neutral() {
    let base = serve_default(RecordingForwarder::replying(json!({}))).await;
    let (status, body) = post_form(
        format!("{base}/api/plagiarism/check/text"),
        Form::new().text("text", "anything"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"prediction": "original", "confidence": 50, "probabilities": {"Human": 50, "AI": 50}})
    );
}

// ============================================================================
// Code
// ============================================================================

#[tokio::test]
async fn code_upload_forwards_contents_as_text() {
    let forwarder = RecordingForwarder::replying(scored_reply());
    let base = serve_default(forwarder.clone()).await;

    let (status, body) = post_form(
        format!("{base}/api/plagiarism/check/code"),
        code_form("print('hi')\n", Some("Python")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, scored_canonical());

    let calls = forwarder.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, Service::Code);
    assert_eq!(calls[0].1.payload, Payload::text("print('hi')\n"));
    assert_eq!(calls[0].1.language.as_deref(), Some("Python"));
}

#[tokio::test]
async fn code_validation_errors() {
    let forwarder = RecordingForwarder::replying(scored_reply());
    let base = serve_default(forwarder.clone()).await;
    let url = format!("{base}/api/plagiarism/check/code");

    let (status, body) = post_form(url.clone(), Form::new().text("language", "Rust")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Code file is required.");

    let (status, body) = post_form(url.clone(), code_form("  \n\t", Some("Rust"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Code file appears to be empty.");

    let (status, body) = post_form(url.clone(), code_form("fn main() {}", None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Language selection is required.");

    let (status, body) = post_form(url.clone(), code_form("fn main() {}", Some("  "))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Language selection is required.");

    assert!(forwarder.calls().is_empty());
}

// ============================================================================
// Audio
// ============================================================================

#[tokio::test]
async fn audio_reply_is_passed_through() {
    let reply = json!({"prediction": "real", "confidence": 0.88, "extra": [1, 2]});
    let forwarder = RecordingForwarder::replying(reply.clone());
    let base = serve_default(forwarder.clone()).await;

    let part = Part::bytes(b"ID3 audio".to_vec())
        .file_name("memo.mp3")
        .mime_str("audio/mpeg")
        .unwrap();
    let (status, body) = post_form(format!("{base}/api/predict"), Form::new().part("file", part)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, reply);

    let calls = forwarder.calls();
    assert_eq!(calls[0].0, Service::Audio);
    assert_eq!(
        calls[0].1.payload,
        Payload::file("memo.mp3", b"ID3 audio".to_vec()).with_content_type("audio/mpeg")
    );
}

#[tokio::test]
async fn audio_without_file_is_rejected() {
    let forwarder = RecordingForwarder::replying(json!({}));
    let base = serve_default(forwarder.clone()).await;

    let (status, body) = post_form(format!("{base}/api/predict"), Form::new().text("note", "x")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "No file uploaded");

    let empty = Part::bytes(Vec::new()).file_name("empty.mp3");
    let (status, _) = post_form(format!("{base}/api/predict"), Form::new().part("file", empty)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert!(forwarder.calls().is_empty());
}

// ============================================================================
// Legacy dispatch
// ============================================================================

#[tokio::test]
async fn legacy_endpoint_dispatches_by_content() {
    let forwarder = RecordingForwarder::replying(scored_reply());
    let base = serve_default(forwarder.clone()).await;
    let url = format!("{base}/api/plagiarism/check");

    let (status, _) = post_form(url.clone(), code_form("SELECT 1;", Some("SQL"))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = post_form(url.clone(), Form::new().text("text", "an essay")).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post_form(url.clone(), Form::new().text("language", "SQL")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("Invalid request format"));

    let services: Vec<Service> = forwarder.calls().into_iter().map(|(s, _)| s).collect();
    assert_eq!(services, vec![Service::Code, Service::Text]);
}

// ============================================================================
// Error mapping
// ============================================================================

#[tokio::test]
async fn forwarding_failures_map_to_statuses() {
    let cases: [(fn() -> GenrealError, StatusCode); 5] = [
        (
            || GenrealError::Timeout(Duration::from_secs(300)),
            StatusCode::REQUEST_TIMEOUT,
        ),
        (
            || GenrealError::Unreachable("connection refused".into()),
            StatusCode::SERVICE_UNAVAILABLE,
        ),
        (
            || GenrealError::Configuration("missing API credentials".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            || GenrealError::Upstream {
                status: 502,
                status_text: "Bad Gateway".into(),
                body: Value::Null,
            },
            StatusCode::BAD_GATEWAY,
        ),
        (
            || GenrealError::Http("builder".into()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (make_err, expected) in cases {
        let base = serve_default(RecordingForwarder::failing(make_err)).await;
        let (status, body) = post_form(
            format!("{base}/api/plagiarism/check/text"),
            Form::new().text("text", "hello"),
        )
        .await;
        assert_eq!(status, expected);
        assert!(body["error"].is_string(), "error field missing for {expected}");
    }
}

#[tokio::test]
async fn upstream_error_message_is_forwarded() {
    let base = serve_default(RecordingForwarder::failing(|| GenrealError::Upstream {
        status: 422,
        status_text: "Unprocessable Entity".into(),
        body: json!({"error": "unsupported audio codec"}),
    }))
    .await;

    let part = Part::bytes(b"data".to_vec()).file_name("a.ogg");
    let (status, body) = post_form(format!("{base}/api/predict"), Form::new().part("file", part)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "unsupported audio codec");
    assert_eq!(body["details"], "Unprocessable Entity");
}

// ============================================================================
// Limits and CORS
// ============================================================================

#[tokio::test]
async fn oversized_text_is_rejected() {
    let forwarder = RecordingForwarder::replying(json!({}));
    let mut config = ServerConfig::default();
    config.limits.plagiarism_upload_mb = 1;
    let base = serve(forwarder.clone(), config).await;

    let huge = "a".repeat(1024 * 1024 + 512 * 1024);
    let response = reqwest::Client::new()
        .post(format!("{base}/api/plagiarism/check/text"))
        .form(&[("text", huge.as_str())])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert!(forwarder.calls().is_empty());
}

#[tokio::test]
async fn preflight_from_allowed_origin() {
    let base = serve_default(RecordingForwarder::replying(json!({}))).await;
    let response = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{base}/api/predict"))
        .header("Origin", "http://localhost:5173")
        .header("Access-Control-Request-Method", "POST")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let headers = response.headers();
    assert_eq!(headers["access-control-allow-origin"], "http://localhost:5173");
    assert_eq!(headers["access-control-allow-credentials"], "true");
    assert!(headers.contains_key("access-control-allow-methods"));
}

#[tokio::test]
async fn other_origins_get_no_cors_headers() {
    let base = serve_default(RecordingForwarder::replying(json!({}))).await;
    let response = reqwest::Client::new()
        .get(format!("{base}/health"))
        .header("Origin", "https://elsewhere.example")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(!response.headers().contains_key("access-control-allow-origin"));
}

// ============================================================================
// End to end through ModalClient
// ============================================================================

#[tokio::test]
async fn text_end_to_end_through_modal_client() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/text"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"label": "HUMAN_GENERATED"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ModalClient::with_base_url(
        &mock_server.uri(),
        Credentials::new("ak-test", "as-test").unwrap(),
    )
    .unwrap();
    let base = serve_default(Arc::new(client)).await;

    let (status, body) = post_form(
        format!("{base}/api/plagiarism/check/text"),
        Form::new().text("text", "my own words"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({"prediction": "original", "confidence": 80, "probabilities": {"Human": 80, "AI": 20}})
    );
}

#[tokio::test]
async fn missing_credentials_answer_500_without_upstream_call() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let client = ModalClient::new(Endpoints::with_base_url(&mock_server.uri()), None).unwrap();
    let base = serve_default(Arc::new(client)).await;

    let part = Part::bytes(b"ID3".to_vec()).file_name("a.mp3");
    let (status, body) = post_form(format!("{base}/api/predict"), Form::new().part("file", part)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server configuration error");

    // Input validation still comes first
    let (status, _) = post_form(format!("{base}/api/predict"), Form::new()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
