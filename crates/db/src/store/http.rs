use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;

use super::{CollectionPath, Document, DocumentStore};
use crate::error::StoreError;

/// Default per-request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Document store reached over a small REST protocol:
///
/// | Operation | Request                        | Response              |
/// |-----------|--------------------------------|-----------------------|
/// | add       | `POST   {base}/{path}`         | `{ "id": "..." }`     |
/// | get_all   | `GET    {base}/{path}`         | `[{ "id", "data" }]`  |
/// | update    | `PUT    {base}/{path}/{id}`    | any 2xx               |
/// | delete    | `DELETE {base}/{path}/{id}`    | any 2xx, or 404       |
#[derive(Debug, Clone)]
pub struct HttpDocumentStore {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct AddResponse {
    id: String,
}

impl HttpDocumentStore {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, collection: &CollectionPath, id: Option<&str>) -> String {
        match id {
            Some(id) => format!("{}/{collection}/{id}", self.base_url),
            None => format!("{}/{collection}", self.base_url),
        }
    }
}

/// Turn a non-2xx response into [`StoreError::Rejected`].
async fn check(response: Response) -> Result<Response, StoreError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let message = response.text().await.unwrap_or_default();
    Err(StoreError::Rejected {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl DocumentStore for HttpDocumentStore {
    async fn add(
        &self,
        collection: &CollectionPath,
        data: serde_json::Value,
    ) -> Result<String, StoreError> {
        let response = self
            .client
            .post(self.url(collection, None))
            .json(&data)
            .send()
            .await?;
        let created: AddResponse = check(response).await?.json().await?;
        tracing::debug!(%collection, id = %created.id, "Document added");
        Ok(created.id)
    }

    async fn get_all(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        let response = self.client.get(self.url(collection, None)).send().await?;
        Ok(check(response).await?.json().await?)
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: serde_json::Value,
    ) -> Result<(), StoreError> {
        let response = self
            .client
            .put(self.url(collection, Some(id)))
            .json(&data)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        check(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        let response = self
            .client
            .delete(self.url(collection, Some(id)))
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        check(response).await?;
        Ok(())
    }
}
