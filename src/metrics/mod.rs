//! Metrics module
//!
//! Metric families produced by collectors, the status-token cast, the
//! Prometheus exposition of both, and the HTTP server that serves it.

mod exporter;
mod family;
pub mod server;

pub use exporter::{encode, register_families, Exporter, ExporterConfig, STATUS_LABEL};
pub use family::{
    MetricFamily, MetricKind, MetricValue, Sample, StatusMapping, BAD_STATUS_TOKENS,
    GOOD_STATUS_TOKENS,
};
