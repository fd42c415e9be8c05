//! Infrastructure Adapters
//!
//! Implementations of the `RedfishConnector` port.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Domain Layer                              │
//! │                 RedfishConnector (trait)                         │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Adapters (This Module)                       │
//! │  HttpRedfishConnector │ FileRedfishConnector │ InMemory...      │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The caller picks the adapter; nothing here consults the environment.
//!
//! # Usage
//!
//! ```ignore
//! use redfish_exporter::adapters::{FileRedfishConnector, HttpRedfishConnector, RedfishConfig};
//!
//! let live = HttpRedfishConnector::new(RedfishConfig::default())?;
//! let offline = FileRedfishConnector::new("./metrics");
//! ```

mod file;
mod memory;
mod redfish;

pub use file::{FileRedfishConnector, CONTROLLER_DETAILS_FILE, CONTROLLER_LIST_FILE};
pub use memory::InMemoryRedfishConnector;
pub use redfish::{HttpRedfishConnector, RedfishConfig};
