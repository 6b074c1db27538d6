//! REST endpoints.
//!
//! Each analysis endpoint validates its input, forwards through the shared
//! [`Forwarder`], and shapes the reply. The outbound call runs inside the
//! handler future, so a client that disconnects drops its in-flight
//! upstream call with it.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::Value;
use tracing::info;

use super::config::ServerConfig;
use super::cors::{self, CorsPolicy};
use super::extract::FormInput;
use super::response::ApiError;
use crate::normalize::normalize_with_shape;
use crate::types::{CanonicalResult, Payload, Service, Submission};
use crate::upstream::Forwarder;

/// Name reported by the health check.
pub const SERVICE_NAME: &str = "genreal";

const LEGACY_USAGE: &str = "Invalid request format. Use /api/plagiarism/check/text for text or /api/plagiarism/check/code for file uploads.";

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    forwarder: Arc<dyn Forwarder>,
}

impl AppState {
    pub fn new(forwarder: Arc<dyn Forwarder>) -> Self {
        Self { forwarder }
    }

    async fn forward(&self, service: Service, submission: Submission) -> Result<Value, ApiError> {
        self.forwarder
            .forward(service, submission)
            .await
            .map(|reply| reply.body)
            .map_err(|e| ApiError::from_error(service, e))
    }
}

/// Build the router with all endpoints.
pub fn router(forwarder: Arc<dyn Forwarder>, config: &ServerConfig) -> Router {
    let audio_limit = DefaultBodyLimit::max(config.limits.audio_upload_bytes());
    let plagiarism_limit = DefaultBodyLimit::max(config.limits.plagiarism_upload_bytes());
    let cors = CorsPolicy::new(config.allowed_origins.iter().cloned());

    Router::new()
        .route("/health", get(health))
        .route("/api/predict", post(predict).layer(audio_limit))
        .route(
            "/api/plagiarism/check/text",
            post(check_text).layer(plagiarism_limit),
        )
        .route(
            "/api/plagiarism/check/code",
            post(check_code).layer(plagiarism_limit),
        )
        .route(
            "/api/plagiarism/check",
            post(check_legacy).layer(plagiarism_limit),
        )
        .with_state(AppState::new(forwarder))
        .layer(middleware::from_fn_with_state(cors, cors::apply))
        .layer(middleware::from_fn(log_http_request))
}

#[derive(Serialize)]
struct Health {
    service: &'static str,
    status: &'static str,
    timestamp: String,
}

async fn health() -> Json<Health> {
    Json(Health {
        service: SERVICE_NAME,
        status: "OK",
        timestamp: chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
    })
}

async fn log_http_request(req: Request<Body>, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    info!(
        method = %method,
        uri = %uri,
        status = %response.status(),
        "http request"
    );
    response
}

/// Audio deepfake check. The detector's reply is passed through unmodified.
async fn predict(State(state): State<AppState>, input: FormInput) -> Result<Json<Value>, ApiError> {
    let Some(file) = input.file.filter(|file| !file.bytes.is_empty()) else {
        return Err(ApiError::bad_request("No file uploaded"));
    };

    info!(
        file_name = %file.file_name,
        content_type = ?file.content_type,
        size = file.bytes.len(),
        "audio upload received"
    );
    let body = state
        .forward(Service::Audio, Submission::new(file.into_payload()))
        .await?;
    Ok(Json(body))
}

async fn check_text(
    State(state): State<AppState>,
    input: FormInput,
) -> Result<Json<CanonicalResult>, ApiError> {
    analyze_text(&state, input).await.map(Json)
}

async fn check_code(
    State(state): State<AppState>,
    input: FormInput,
) -> Result<Json<CanonicalResult>, ApiError> {
    analyze_code(&state, input).await.map(Json)
}

/// Older clients post both kinds here: a file means code, otherwise text.
async fn check_legacy(
    State(state): State<AppState>,
    input: FormInput,
) -> Result<Json<CanonicalResult>, ApiError> {
    let has_text = input.text.as_deref().is_some_and(|text| !text.is_empty());
    if input.file.is_some() {
        analyze_code(&state, input).await.map(Json)
    } else if has_text {
        analyze_text(&state, input).await.map(Json)
    } else {
        Err(ApiError::bad_request(LEGACY_USAGE))
    }
}

async fn analyze_text(state: &AppState, input: FormInput) -> Result<CanonicalResult, ApiError> {
    let Some(text) = input.text() else {
        return Err(ApiError::bad_request("Text input is required."));
    };

    info!(chars = text.chars().count(), "checking text");
    let mut submission = Submission::new(Payload::text(text));
    submission.language = input.language().map(str::to_string);

    let body = state.forward(Service::Text, submission).await?;
    Ok(finish(Service::Text, &body))
}

async fn analyze_code(state: &AppState, input: FormInput) -> Result<CanonicalResult, ApiError> {
    let language = input.language().map(str::to_string);
    let Some(file) = input.file else {
        return Err(ApiError::bad_request("Code file is required."));
    };
    let code = String::from_utf8(file.bytes)
        .map_err(|_| ApiError::bad_request("Code file must be UTF-8 text."))?;
    if code.trim().is_empty() {
        return Err(ApiError::bad_request("Code file appears to be empty."));
    }
    let Some(language) = language else {
        return Err(ApiError::bad_request("Language selection is required."));
    };

    info!(
        language = %language,
        file_name = %file.file_name,
        chars = code.chars().count(),
        "checking code"
    );
    let submission = Submission::new(Payload::Text(code)).language(language);

    let body = state.forward(Service::Code, submission).await?;
    Ok(finish(Service::Code, &body))
}

fn finish(service: Service, body: &Value) -> CanonicalResult {
    let (shape, result) = normalize_with_shape(body);
    info!(
        service = %service,
        shape = shape.as_str(),
        prediction = ?result.prediction,
        confidence = result.confidence,
        human = result.probabilities.human,
        ai = result.probabilities.ai,
        "analysis completed"
    );
    result
}
