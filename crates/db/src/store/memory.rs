use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CollectionPath, Document, DocumentStore};
use crate::error::StoreError;

/// Process-local document store. Collections are hash maps, so listing
/// order is arbitrary, just like the remote store.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    collections: RwLock<HashMap<CollectionPath, HashMap<String, serde_json::Value>>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn add(
        &self,
        collection: &CollectionPath,
        data: serde_json::Value,
    ) -> Result<String, StoreError> {
        let id = Uuid::new_v4().simple().to_string();
        self.collections
            .write()
            .await
            .entry(collection.clone())
            .or_default()
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn get_all(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, data)| Document {
                        id: id.clone(),
                        data: data.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: serde_json::Value,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let slot = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        *slot = data;
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        if let Some(docs) = self.collections.write().await.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }
}
