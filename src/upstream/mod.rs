//! Outbound side: forwarding submissions to the hosted detectors.
//!
//! - [`endpoint`] describes how each detector wants to be called
//! - [`credentials`] holds the service token pair and its header transport
//! - [`traits`] defines the [`Forwarder`] seam the HTTP surface depends on
//! - [`modal`] is the reqwest implementation

pub mod credentials;
pub mod endpoint;
pub mod modal;
pub mod traits;

pub use credentials::{CredentialStyle, Credentials};
pub use endpoint::{Encoding, EndpointConfig, Endpoints};
pub use modal::ModalClient;
pub use traits::Forwarder;
