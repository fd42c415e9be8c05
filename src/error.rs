//! Error types for the Redfish exporter

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while collecting and exposing Redfish metrics
#[derive(Error, Debug)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    // =========================================================================
    // Upstream (Connector) Errors
    // =========================================================================
    /// Transport-level failure talking to the BMC
    #[error("Redfish request to {path} failed: {source}")]
    UpstreamFetch {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    /// BMC answered with a non-success status
    #[error("Redfish request to {path} returned status {status}")]
    UpstreamStatus { path: String, status: u16 },

    /// BMC answered with a body that is not a JSON document
    #[error("Failed to decode Redfish response from {path}: {reason}")]
    UpstreamDecode { path: String, reason: String },

    /// A connector was asked for a path it cannot serve
    #[error("No Redfish document available for path: {0}")]
    UnknownPath(String),

    /// An expected field is absent from (or mistyped in) a Redfish document
    #[error("Malformed upstream response: missing or invalid field '{field}' in {context}")]
    MalformedResponse { field: String, context: String },

    // =========================================================================
    // Local Errors
    // =========================================================================
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Prometheus registry or encoding error
    #[error("Prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Build a malformed-response error for `field` within `context`.
    pub fn malformed(field: impl Into<String>, context: impl Into<String>) -> Self {
        Error::MalformedResponse {
            field: field.into(),
            context: context.into(),
        }
    }
}
