//! File-Backed Connector Adapter
//!
//! Serves captured Redfish responses from a directory instead of a live BMC.
//! The listing path is answered from `Controllers-list.json`; every
//! controller detail path is answered from `Controllers-raid-details.json`.

use std::path::PathBuf;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::domain::ports::{RedfishConnector, RAID_CONTROLLERS_PATH};
use crate::error::{Error, Result};

/// Fixture file answering the controller listing.
pub const CONTROLLER_LIST_FILE: &str = "Controllers-list.json";

/// Fixture file answering every controller detail request.
pub const CONTROLLER_DETAILS_FILE: &str = "Controllers-raid-details.json";

/// Reads Redfish documents from JSON files in a directory.
#[derive(Debug, Clone)]
pub struct FileRedfishConnector {
    dir: PathBuf,
}

impl FileRedfishConnector {
    /// Create a connector reading fixtures from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// File that answers `path`, if any.
    pub fn file_for(&self, path: &str) -> Option<PathBuf> {
        if path == RAID_CONTROLLERS_PATH {
            return Some(self.dir.join(CONTROLLER_LIST_FILE));
        }
        path.strip_prefix(RAID_CONTROLLERS_PATH)
            .and_then(|rest| rest.strip_prefix('/'))
            .filter(|id| !id.is_empty())
            .map(|_| self.dir.join(CONTROLLER_DETAILS_FILE))
    }
}

#[async_trait]
impl RedfishConnector for FileRedfishConnector {
    async fn get(&self, path: &str) -> Result<Value> {
        let file = self
            .file_for(path)
            .ok_or_else(|| Error::UnknownPath(path.to_string()))?;

        debug!("Reading {} from {}", path, file.display());
        let raw = tokio::fs::read(&file).await?;
        serde_json::from_slice(&raw).map_err(|e| Error::UpstreamDecode {
            path: path.to_string(),
            reason: format!("{}: {}", file.display(), e),
        })
    }

    fn describe(&self) -> String {
        format!("file ({})", self.dir.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn fixtures() -> FileRedfishConnector {
        FileRedfishConnector::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
    }

    #[test]
    fn test_file_routing() {
        let conn = FileRedfishConnector::new("/data");

        assert_eq!(
            conn.file_for(RAID_CONTROLLERS_PATH),
            Some(PathBuf::from("/data/Controllers-list.json"))
        );
        assert_eq!(
            conn.file_for(&format!("{}/RAID.Integrated.1-1", RAID_CONTROLLERS_PATH)),
            Some(PathBuf::from("/data/Controllers-raid-details.json"))
        );
        assert_eq!(conn.file_for(&format!("{}/", RAID_CONTROLLERS_PATH)), None);
        assert_eq!(conn.file_for("/Systems/System.Embedded.1"), None);
    }

    #[tokio::test]
    async fn test_reads_fixture_listing() {
        let doc = fixtures().get(RAID_CONTROLLERS_PATH).await.unwrap();
        assert!(doc["Members"].is_array());
    }

    #[tokio::test]
    async fn test_unknown_path() {
        let err = fixtures().get("/Chassis").await.unwrap_err();
        assert_matches!(err, Error::UnknownPath(_));
    }

    #[tokio::test]
    async fn test_missing_directory_is_io_error() {
        let conn = FileRedfishConnector::new("/nonexistent/redfish-fixtures");
        let err = conn.get(RAID_CONTROLLERS_PATH).await.unwrap_err();
        assert_matches!(err, Error::Io(_));
    }
}
