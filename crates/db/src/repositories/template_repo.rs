//! Repository for the owner-scoped `templates` collection.
//!
//! The repository owns the in-memory template list. It is only ever
//! replaced wholesale by a `list` fetch; writes never patch it locally.
//! Every successful write is followed by a fresh `list` of the owner's
//! collection, issued after the write has been acknowledged.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use labelsheet_core::template::{Template, TemplateSpec};
use labelsheet_core::types::{TemplateId, UserId};
use tokio::sync::RwLock;

use crate::error::StoreError;
use crate::models::template::TemplateDocument;
use crate::store::{CollectionPath, Document, DocumentStore};

/// Outcome of a write: the write itself succeeded, `refresh` reports the
/// follow-up `list`.
#[derive(Debug)]
pub struct Synced<T> {
    pub value: T,
    pub refresh: Result<usize, StoreError>,
}

#[derive(Debug, Default)]
struct Snapshot {
    /// Ticket of the fetch that produced `templates`.
    ticket: u64,
    /// Whose collection `templates` was fetched from.
    owner: Option<UserId>,
    templates: Vec<Template>,
}

impl Snapshot {
    fn of(&self, owner: &UserId) -> &[Template] {
        if self.owner.as_ref() == Some(owner) {
            &self.templates
        } else {
            &[]
        }
    }
}

/// Owner-scoped create/update/delete/list facade over a [`DocumentStore`].
pub struct TemplateRepo {
    store: Arc<dyn DocumentStore>,
    app_id: String,
    snapshot: RwLock<Snapshot>,
    next_ticket: AtomicU64,
    fetches_in_flight: AtomicUsize,
}

impl TemplateRepo {
    pub fn new(store: Arc<dyn DocumentStore>, app_id: impl Into<String>) -> Self {
        Self {
            store,
            app_id: app_id.into(),
            snapshot: RwLock::new(Snapshot::default()),
            next_ticket: AtomicU64::new(1),
            fetches_in_flight: AtomicUsize::new(0),
        }
    }

    fn collection(&self, owner: &UserId) -> CollectionPath {
        CollectionPath::templates(&self.app_id, owner)
    }

    /// `owner`'s list as of the last successful fetch. Empty when the last
    /// fetch was for somebody else.
    pub async fn templates(&self, owner: &UserId) -> Vec<Template> {
        self.snapshot.read().await.of(owner).to_vec()
    }

    /// Look up one of `owner`'s templates in the last fetched list.
    pub async fn find(&self, owner: &UserId, id: &TemplateId) -> Option<Template> {
        self.snapshot
            .read()
            .await
            .of(owner)
            .iter()
            .find(|t| &t.id == id)
            .cloned()
    }

    /// Owner of the installed list, `None` before the first fetch.
    pub async fn snapshot_owner(&self) -> Option<UserId> {
        self.snapshot.read().await.owner.clone()
    }

    /// `true` while at least one `list` fetch is outstanding.
    pub fn is_loading(&self) -> bool {
        self.fetches_in_flight.load(Ordering::Acquire) > 0
    }

    /// Fetch every template of `owner` and replace the in-memory list.
    ///
    /// On failure the previous list is kept. When fetches overlap, a
    /// response never replaces the result of a fetch issued after it.
    /// Order of the returned list is whatever the store produced.
    pub async fn list(&self, owner: &UserId) -> Result<Vec<Template>, StoreError> {
        let ticket = self.next_ticket.fetch_add(1, Ordering::AcqRel);
        self.fetches_in_flight.fetch_add(1, Ordering::AcqRel);
        let fetched = self.store.get_all(&self.collection(owner)).await;
        self.fetches_in_flight.fetch_sub(1, Ordering::AcqRel);

        let documents = fetched.inspect_err(|e| {
            tracing::error!(error = %e, owner_id = %owner, "Failed to list templates");
        })?;
        let templates: Vec<Template> = documents.into_iter().filter_map(decode).collect();

        let mut snapshot = self.snapshot.write().await;
        if ticket > snapshot.ticket {
            snapshot.ticket = ticket;
            snapshot.owner = Some(owner.clone());
            snapshot.templates = templates.clone();
        } else {
            tracing::debug!(ticket, "Discarding list response superseded by a newer fetch");
        }
        tracing::debug!(owner_id = %owner, count = templates.len(), "Templates listed");
        Ok(templates)
    }

    /// Store a new template for `owner`; the store assigns its id.
    pub async fn create(
        &self,
        owner: &UserId,
        spec: TemplateSpec,
    ) -> Result<Synced<Template>, StoreError> {
        let document = TemplateDocument::stamp(spec, owner);
        let data = serde_json::to_value(&document)?;
        let id = self
            .store
            .add(&self.collection(owner), data)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, owner_id = %owner, "Failed to create template");
            })?;
        let template = document.into_template(TemplateId::new(id));
        tracing::info!(owner_id = %owner, template_id = %template.id, "Template created");

        Ok(Synced {
            value: template,
            refresh: self.resync(owner).await,
        })
    }

    /// Overwrite every field of template `id`, re-stamping owner and time.
    pub async fn update(
        &self,
        owner: &UserId,
        id: &TemplateId,
        spec: TemplateSpec,
    ) -> Result<Synced<()>, StoreError> {
        let data = serde_json::to_value(TemplateDocument::stamp(spec, owner))?;
        self.store
            .update(&self.collection(owner), id.as_str(), data)
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, owner_id = %owner, template_id = %id, "Failed to update template");
            })?;
        tracing::info!(owner_id = %owner, template_id = %id, "Template updated");

        Ok(Synced {
            value: (),
            refresh: self.resync(owner).await,
        })
    }

    pub async fn delete(&self, owner: &UserId, id: &TemplateId) -> Result<Synced<()>, StoreError> {
        self.store
            .delete(&self.collection(owner), id.as_str())
            .await
            .inspect_err(|e| {
                tracing::error!(error = %e, owner_id = %owner, template_id = %id, "Failed to delete template");
            })?;
        tracing::info!(owner_id = %owner, template_id = %id, "Template deleted");

        Ok(Synced {
            value: (),
            refresh: self.resync(owner).await,
        })
    }

    async fn resync(&self, owner: &UserId) -> Result<usize, StoreError> {
        self.list(owner).await.map(|templates| templates.len())
    }
}

/// Documents that no longer decode are skipped instead of failing the list.
fn decode(document: Document) -> Option<Template> {
    match serde_json::from_value::<TemplateDocument>(document.data) {
        Ok(stored) => Some(stored.into_template(TemplateId::new(document.id))),
        Err(e) => {
            tracing::warn!(error = %e, document_id = %document.id, "Skipping undecodable template document");
            None
        }
    }
}
