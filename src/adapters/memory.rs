//! In-Memory Connector Adapter
//!
//! Serves Redfish documents from a path map and records every request.
//! Used by tests and by callers that already hold the documents.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use crate::domain::ports::RedfishConnector;
use crate::error::{Error, Result};

/// Path-keyed document store implementing [`RedfishConnector`].
#[derive(Debug, Default)]
pub struct InMemoryRedfishConnector {
    documents: RwLock<HashMap<String, Value>>,
    requests: RwLock<Vec<String>>,
}

impl InMemoryRedfishConnector {
    /// Create an empty connector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the document served for `path`.
    pub fn insert(&self, path: impl Into<String>, document: Value) {
        self.documents.write().insert(path.into(), document);
    }

    /// Builder-style variant of [`InMemoryRedfishConnector::insert`].
    pub fn with_document(self, path: impl Into<String>, document: Value) -> Self {
        self.insert(path, document);
        self
    }

    /// Paths requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.read().clone()
    }

    /// Forget recorded requests.
    pub fn clear_requests(&self) {
        self.requests.write().clear();
    }
}

#[async_trait]
impl RedfishConnector for InMemoryRedfishConnector {
    async fn get(&self, path: &str) -> Result<Value> {
        self.requests.write().push(path.to_string());
        self.documents
            .read()
            .get(path)
            .cloned()
            .ok_or_else(|| Error::UnknownPath(path.to_string()))
    }

    fn describe(&self) -> String {
        format!("in-memory ({} documents)", self.documents.read().len())
    }
}
