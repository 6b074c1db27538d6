//! Client for detectors hosted on Modal.
//!
//! One POST per submission, no retry. Each call carries the endpoint's own
//! deadline; the detectors are not latency-bounded, so these are long.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument, warn};

use super::credentials::Credentials;
use super::endpoint::{Encoding, EndpointConfig, Endpoints};
use super::traits::Forwarder;
use crate::telemetry;
use crate::types::{Payload, Service, Submission, UpstreamResponse};
use crate::{GenrealError, Result};

const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Forwarder for the Modal-hosted audio, text and code detectors.
#[derive(Clone)]
pub struct ModalClient {
    http: Client,
    endpoints: Endpoints,
    credentials: Option<Credentials>,
}

impl ModalClient {
    /// Create a client for the given endpoints.
    ///
    /// `credentials` may be `None`; every call then fails with
    /// [`GenrealError::Configuration`] before anything is sent.
    pub fn new(endpoints: Endpoints, credentials: Option<Credentials>) -> Result<Self> {
        let http = Client::builder()
            .build()
            .map_err(|e| GenrealError::Http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            endpoints,
            credentials,
        })
    }

    /// Create a client with every endpoint under `base_url` (for testing with wiremock).
    pub fn with_base_url(base_url: &str, credentials: Credentials) -> Result<Self> {
        Self::new(Endpoints::with_base_url(base_url), Some(credentials))
    }

    pub fn endpoint(&self, service: Service) -> &EndpointConfig {
        self.endpoints.get(service)
    }

    pub fn has_credentials(&self) -> bool {
        self.credentials.is_some()
    }

    /// Forward a submission to `service`.
    #[instrument(skip_all, fields(service = %service, kind = submission.payload.kind(), bytes = submission.payload.len()))]
    pub async fn submit(&self, service: Service, submission: Submission) -> Result<UpstreamResponse> {
        let endpoint = self.endpoints.get(service);
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            GenrealError::Configuration("missing API credentials".to_string())
        })?;

        if let Some(language) = submission.language.as_deref() {
            debug!(language, "declared language");
        }

        let timeout = endpoint.timeout();
        let request = self.http.post(&endpoint.url).timeout(timeout);
        let request = credentials.apply(endpoint.auth, request);
        let request = encode(endpoint, submission.payload, request)?;

        debug!(url = %endpoint.url, ?timeout, "sending to detector");
        let start = Instant::now();
        let result = send(request, timeout).await;
        record_call(service, start, &result);

        match &result {
            Ok(response) => debug!(status = response.status, "detector replied"),
            Err(e) => warn!(error = %e, "detector call failed"),
        }
        result
    }
}

/// Build the request body in the endpoint's encoding.
fn encode(endpoint: &EndpointConfig, payload: Payload, request: RequestBuilder) -> Result<RequestBuilder> {
    match endpoint.encoding {
        Encoding::Multipart => {
            let part = match payload {
                Payload::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let mime = content_type
                        .or_else(|| endpoint.default_content_type.clone())
                        .unwrap_or_else(|| FALLBACK_CONTENT_TYPE.to_string());
                    Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(&mime)
                        .map_err(|e| {
                            GenrealError::InvalidInput(format!("invalid content type {mime:?}: {e}"))
                        })?
                }
                Payload::Text(text) => Part::text(text),
            };
            Ok(request.multipart(Form::new().part(endpoint.field.clone(), part)))
        }
        Encoding::Urlencoded => {
            let text = match payload {
                Payload::File { bytes, .. } => String::from_utf8(bytes).map_err(|_| {
                    GenrealError::InvalidInput("payload is not valid UTF-8 text".to_string())
                })?,
                Payload::Text(text) => text,
            };
            Ok(request.form(&[(endpoint.field.as_str(), text.as_str())]))
        }
    }
}

async fn send(request: RequestBuilder, timeout: Duration) -> Result<UpstreamResponse> {
    let response = request
        .send()
        .await
        .map_err(|e| GenrealError::from_reqwest(e, timeout))?;

    let status = response.status();
    if !status.is_success() {
        // An unreadable error body still reports the upstream status.
        let body = match response.bytes().await {
            Ok(bytes) => UpstreamResponse::from_bytes(status.as_u16(), &bytes).body,
            Err(e) => {
                debug!(error = %e, "failed to read error body");
                serde_json::Value::Null
            }
        };
        return Err(GenrealError::Upstream {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| GenrealError::from_reqwest(e, timeout))?;
    Ok(UpstreamResponse::from_bytes(status.as_u16(), &bytes))
}

fn outcome(result: &Result<UpstreamResponse>) -> &'static str {
    match result {
        Ok(_) => "ok",
        Err(GenrealError::Timeout(_)) => "timeout",
        Err(GenrealError::Upstream { .. }) => "upstream_error",
        Err(GenrealError::Unreachable(_)) => "unreachable",
        Err(_) => "error",
    }
}

fn record_call(service: Service, start: Instant, result: &Result<UpstreamResponse>) {
    metrics::counter!(telemetry::UPSTREAM_REQUESTS_TOTAL,
        "service" => service.as_str(),
        "outcome" => outcome(result),
    )
    .increment(1);
    metrics::histogram!(telemetry::UPSTREAM_REQUEST_DURATION_SECONDS,
        "service" => service.as_str(),
    )
    .record(start.elapsed().as_secs_f64());
}

#[async_trait]
impl Forwarder for ModalClient {
    fn name(&self) -> &str {
        "modal"
    }

    async fn forward(&self, service: Service, submission: Submission) -> Result<UpstreamResponse> {
        ModalClient::submit(self, service, submission).await
    }
}
