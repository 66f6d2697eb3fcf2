//! Error types for the edge core.
//!
//! # Design
//! Authorization mismatches are not errors: the gate answers them with a
//! redirect `Decision`. The only failures modeled here are the forwarder's
//! (a request it cannot map, an unreadable body, a dead upstream) and the
//! auth client's (a rejected call, an unparseable payload).

use thiserror::Error;

/// Failures owned by the API proxy forwarder.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// The incoming method is not one the forwarder relays.
    #[error("unsupported method: {0}")]
    UnsupportedMethod(String),

    /// The request path does not live under the proxy prefix.
    #[error("path {0} is outside the proxy prefix")]
    OutsidePrefix(String),

    /// A body declared as JSON failed to parse.
    #[error("malformed JSON request body: {0}")]
    MalformedJson(#[from] serde_json::Error),

    /// The upstream could not be reached (refused, DNS, timeout).
    #[error("{0}")]
    Transport(String),
}

/// Errors returned by `AuthClient` parse methods.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The upstream answered with an unexpected status. `detail` is the
    /// upstream's own `detail` field when the body carried one.
    #[error("HTTP {status}: {detail}")]
    Rejected { status: u16, detail: String },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    DeserializationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
