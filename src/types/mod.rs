//! Public types for the Genreal API.

mod payload;
mod service;
mod upstream;
mod verdict;

pub use payload::{Payload, Submission};
pub use service::Service;
pub use upstream::UpstreamResponse;
pub use verdict::{CanonicalResult, Probabilities, Verdict};
