//! The document store seam: a keyed collection of JSON documents.

mod http;
mod memory;

use std::fmt;

use async_trait::async_trait;
use labelsheet_core::types::UserId;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

pub use http::{HttpDocumentStore, DEFAULT_HTTP_TIMEOUT};
pub use memory::MemoryDocumentStore;

/// Slash-separated collection path, e.g. `apps/my-app/users/u1/templates`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// The owner-scoped template collection.
    pub fn templates(app_id: &str, owner: &UserId) -> Self {
        Self(format!("apps/{app_id}/users/{owner}/templates"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored document together with its store-assigned id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: serde_json::Value,
}

/// Create/read/update/delete over collections of JSON documents.
///
/// `get_all` makes no ordering promise.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document and return the id the store assigned to it.
    async fn add(
        &self,
        collection: &CollectionPath,
        data: serde_json::Value,
    ) -> Result<String, StoreError>;

    async fn get_all(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError>;

    /// Overwrite an existing document. Fails with [`StoreError::NotFound`]
    /// when `id` does not exist.
    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: serde_json::Value,
    ) -> Result<(), StoreError>;

    /// Remove a document. Removing a missing id is not an error.
    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn template_collection_is_owner_scoped() {
        let path = CollectionPath::templates("label-app", &UserId::new("u-42"));
        assert_eq!(path.as_str(), "apps/label-app/users/u-42/templates");
    }
}
