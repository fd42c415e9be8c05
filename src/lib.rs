//! Redfish Exporter - RAID health for Prometheus
//!
//! Polls a Redfish-compatible BMC (e.g. iDRAC) for storage controller and
//! disk health, and exposes the result as Prometheus gauges.
//!
//! # Architecture
//!
//! ```text
//! RedfishConnector (adapters) → RaidCollector (hardware) → Exporter (metrics)
//! ```
//!
//! Each scrape performs one fresh collection pass; nothing is kept between
//! passes.
//!
//! # Modules
//!
//! - [`adapters`] - Live, file-backed and in-memory Redfish connectors
//! - [`domain`] - The connector port and fixed Redfish paths
//! - [`error`] - Error types
//! - [`hardware`] - RAID controller/disk collector
//! - [`metrics`] - Metric families, status cast, Prometheus exposition and the HTTP server

pub mod adapters;
pub mod domain;
pub mod error;
pub mod hardware;
pub mod metrics;

// Re-export commonly used types
pub use adapters::{FileRedfishConnector, HttpRedfishConnector, InMemoryRedfishConnector, RedfishConfig};
pub use domain::RedfishConnector;
pub use error::{Error, Result};
pub use hardware::{ControllerRecord, DiskRecord, RaidCollector};
pub use metrics::{Exporter, ExporterConfig, MetricFamily, MetricValue, StatusMapping};
