//! Remote resource source abstraction.
//!
//! The aggregation engine only needs a way to GET a resource path and get
//! back the items of its collection. The HTTP implementation lives in the
//! `graph` crate; [`InMemoryGraphSource`] serves canned collections for tests
//! and dry runs.

use std::collections::HashMap;
use std::sync::Mutex;

use serde_json::Value;

use crate::error::FetchError;

/// Resource paths, relative to the versioned API base.
pub mod resources {
    pub const MOBILE_APPS: &str = "deviceAppManagement/mobileApps";

    pub fn device_statuses(app_id: &str) -> String {
        format!("{}/{}/deviceStatuses", MOBILE_APPS, app_id)
    }

    pub fn user_statuses(app_id: &str) -> String {
        format!("{}/{}/userStatuses", MOBILE_APPS, app_id)
    }

    pub fn group_assignments(app_id: &str) -> String {
        format!("{}/{}/groupAssignments", MOBILE_APPS, app_id)
    }

    pub fn group_members(group_id: &str) -> String {
        format!("groups/{}/members", group_id)
    }
}

/// Source of remote collections.
#[async_trait::async_trait]
pub trait GraphSource: Send + Sync {
    /// GET a collection resource and return all of its items.
    async fn fetch(&self, resource: &str) -> Result<Vec<Value>, FetchError>;
}

/// In-memory source for testing.
///
/// Unknown resources yield an empty collection, as an empty remote collection
/// would. Every requested path is recorded in order.
#[derive(Debug, Default)]
pub struct InMemoryGraphSource {
    collections: HashMap<String, Vec<Value>>,
    failures: HashMap<String, (u16, String)>,
    requests: Mutex<Vec<String>>,
}

impl InMemoryGraphSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the items served for a resource path.
    pub fn with_collection(mut self, resource: impl Into<String>, items: Vec<Value>) -> Self {
        self.collections.insert(resource.into(), items);
        self
    }

    /// Make a resource path answer with a non-success status.
    pub fn with_failure(
        mut self,
        resource: impl Into<String>,
        status: u16,
        body: impl Into<String>,
    ) -> Self {
        self.failures.insert(resource.into(), (status, body.into()));
        self
    }

    /// Paths requested so far, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn was_requested(&self, resource: &str) -> bool {
        self.requests().iter().any(|r| r == resource)
    }
}

#[async_trait::async_trait]
impl GraphSource for InMemoryGraphSource {
    async fn fetch(&self, resource: &str) -> Result<Vec<Value>, FetchError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(resource.to_string());
        }

        if let Some((status, body)) = self.failures.get(resource) {
            tracing::debug!(resource = %resource, status = %status, "In-memory source simulating failure");
            return Err(FetchError::remote(resource, *status, body.clone()));
        }

        Ok(self.collections.get(resource).cloned().unwrap_or_default())
    }
}
