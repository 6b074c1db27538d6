//! HTTP service exposing the detectors to the browser frontend.
//!
//! This module provides:
//! - Configuration types and loading (`config`)
//! - The axum router and handlers (`routes`)
//! - Body extraction for multipart, urlencoded and JSON requests (`extract`)
//! - Error-to-status mapping (`response`)
//! - CORS for the frontend origins (`cors`)

pub mod config;
pub mod cors;
pub mod extract;
pub mod response;
pub mod routes;

pub use response::ApiError;
pub use routes::{AppState, SERVICE_NAME, router};
