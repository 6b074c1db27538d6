//! Genreal - detection proxy for hosted deepfake and AI-authorship models
//!
//! This crate forwards uploads to hosted inference endpoints, attaching
//! service credentials in the form each endpoint expects, and reshapes the
//! endpoints' inconsistent JSON replies into one [`CanonicalResult`].
//!
//! # Forwarding Example
//!
//! ```rust,no_run
//! use genreal::{Credentials, ModalClient, Payload, Service, Submission, normalize};
//! use genreal::upstream::Endpoints;
//!
//! #[tokio::main]
//! async fn main() -> genreal::Result<()> {
//!     let client = ModalClient::new(Endpoints::default(), Some(Credentials::from_env()?))?;
//!
//!     let reply = client
//!         .submit(Service::Text, Submission::new(Payload::text("Some essay...")))
//!         .await?;
//!
//!     let result = normalize(&reply.body);
//!     println!("{:?} ({}%)", result.prediction, result.confidence);
//!     Ok(())
//! }
//! ```
//!
//! # Normalization Example
//!
//! ```rust
//! use genreal::{normalize, Verdict};
//!
//! let result = normalize(&serde_json::json!({"label": "HUMAN_GENERATED"}));
//! assert_eq!(result.prediction, Verdict::Original);
//! assert_eq!(result.confidence, 80);
//! assert_eq!((result.probabilities.human, result.probabilities.ai), (80, 20));
//! ```

pub mod error;
pub mod normalize;
#[cfg(feature = "server")]
pub mod server;
pub mod telemetry;
pub mod types;
pub mod upstream;
mod version;

// Re-export main types at crate root
pub use error::{GenrealError, Result};
pub use normalize::{Shape, normalize, normalize_with_shape};
pub use upstream::{Credentials, Forwarder, ModalClient};
pub use version::{PKG_VERSION, version_string};

// Re-export all types
pub use types::{CanonicalResult, Payload, Probabilities, Service, Submission, UpstreamResponse, Verdict};
