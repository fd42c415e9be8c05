//! Domain Ports (Port/Adapter Pattern)
//!
//! The collector depends on a single port: something that can fetch a parsed
//! Redfish document for a path. Infrastructure adapters implement it against a
//! live BMC, a fixture directory, or an in-memory map.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Domain Layer                            │
//! │            RaidCollector ──▶ RedfishConnector                │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                   Infrastructure Layer                       │
//! │   HttpRedfishConnector │ FileRedfishConnector │ InMemory... │
//! └─────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::Result;

// =============================================================================
// Redfish Paths
// =============================================================================

/// Versioned API root every Redfish resource lives under.
pub const REDFISH_BASE_PATH: &str = "/redfish/v1";

/// Storage controller collection, relative to [`REDFISH_BASE_PATH`].
pub const RAID_CONTROLLERS_PATH: &str = "/Systems/System.Embedded.1/Storage/Controllers";

/// Path of a single controller's detail document, relative to the API root.
pub fn controller_detail_path(controller: &str) -> String {
    format!("{}/{}", RAID_CONTROLLERS_PATH, controller)
}

/// Derive a short controller identifier from an `@odata.id` reference.
///
/// References outside the controller collection are returned unchanged.
pub fn controller_id_from_reference(reference: &str) -> &str {
    reference
        .strip_prefix(REDFISH_BASE_PATH)
        .and_then(|rest| rest.strip_prefix(RAID_CONTROLLERS_PATH))
        .and_then(|rest| rest.strip_prefix('/'))
        .unwrap_or(reference)
}

// =============================================================================
// Connector Port
// =============================================================================

/// Port for fetching Redfish documents.
///
/// Paths are relative to the versioned API root (see [`RAID_CONTROLLERS_PATH`]).
/// Implementations own transport, authentication and timeouts; any failure is
/// returned as an error and propagated by callers unchanged.
///
/// # Example
///
/// ```ignore
/// struct FixtureConnector { /* ... */ }
///
/// #[async_trait]
/// impl RedfishConnector for FixtureConnector {
///     async fn get(&self, path: &str) -> Result<Value> {
///         // Look up the document for `path`
///     }
/// }
/// ```
#[async_trait]
pub trait RedfishConnector: Send + Sync {
    /// Fetch and parse the document at `path`.
    async fn get(&self, path: &str) -> Result<Value>;

    /// Short description used in logs.
    fn describe(&self) -> String {
        std::any::type_name::<Self>().to_string()
    }
}

#[async_trait]
impl<T: RedfishConnector + ?Sized> RedfishConnector for Arc<T> {
    async fn get(&self, path: &str) -> Result<Value> {
        (**self).get(path).await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
