//! Domain Layer
//!
//! Trait abstractions the collector depends on, plus the fixed Redfish paths
//! it queries.
//!
//! # Usage
//!
//! ```ignore
//! use redfish_exporter::domain::ports::RedfishConnector;
//!
//! async fn controller_list<C: RedfishConnector>(conn: &C) -> Result<Value> {
//!     conn.get(RAID_CONTROLLERS_PATH).await
//! }
//! ```

pub mod ports;

pub use ports::{
    controller_detail_path, controller_id_from_reference, RedfishConnector,
    RAID_CONTROLLERS_PATH, REDFISH_BASE_PATH,
};
