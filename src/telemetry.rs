//! Telemetry metric name constants.
//!
//! Centralised metric names for genreal operations. The daemon and embedding
//! applications install their own `metrics` recorder (e.g. prometheus,
//! statsd); without a recorder installed, all metric calls are no-ops.
//!
//! # Metric naming conventions
//!
//! All metrics are prefixed with `genreal_`. Counters end in `_total`,
//! histograms use meaningful units (e.g. `_seconds`).
//!
//! # Common labels
//!
//! - `service`: upstream detector (`audio`, `text`, `code`)
//! - `outcome`: `ok`, `timeout`, `upstream_error`, `unreachable`, `error`
//! - `shape`: upstream reply shape (`scored`, `labelled`, `unrecognized`)

/// Total outbound calls to upstream detectors.
///
/// Labels: `service`, `outcome`.
pub const UPSTREAM_REQUESTS_TOTAL: &str = "genreal_upstream_requests_total";

/// Outbound call duration in seconds, whatever the outcome.
///
/// Labels: `service`.
pub const UPSTREAM_REQUEST_DURATION_SECONDS: &str = "genreal_upstream_request_duration_seconds";

/// Total upstream bodies normalized.
///
/// Labels: `shape`.
pub const NORMALIZED_TOTAL: &str = "genreal_normalized_total";
