//! Hardware Health Collection
//!
//! Collectors that read out-of-band hardware status from a BMC and flatten it
//! into metric families.
//!
//! # Example
//!
//! ```no_run
//! use redfish_exporter::adapters::FileRedfishConnector;
//! use redfish_exporter::hardware::RaidCollector;
//!
//! # async fn example() -> redfish_exporter::Result<()> {
//! let conn = FileRedfishConnector::new("./metrics");
//! let raid = RaidCollector::collect(&conn, "idrac").await?;
//!
//! for ctrl in raid.controllers() {
//!     println!("{}: {} / {} ({} disks)", ctrl.name, ctrl.health, ctrl.state, ctrl.disks.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod raid;

pub use raid::{ControllerRecord, DiskRecord, RaidCollector};
