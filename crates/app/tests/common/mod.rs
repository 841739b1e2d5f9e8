//! Shared fixtures for the manager and console integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use labelsheet_app::config::AppConfig;
use labelsheet_app::manager::TemplateManager;
use labelsheet_core::form::FormField;
use labelsheet_core::types::UserId;
use labelsheet_db::store::MemoryDocumentStore;
use labelsheet_db::{CollectionPath, Document, DocumentStore, StoreError};
use labelsheet_identity::{
    AuthError, IdentityHandler, IdentityHub, IdentityProvider, IdentityState,
    LocalIdentityProvider, Subscription,
};
use tokio::sync::{watch, Notify, Semaphore};

// ---------------------------------------------------------------------------
// Scripted store
// ---------------------------------------------------------------------------

/// Memory store that counts reads and writes and can be taken offline.
///
/// With `gate_adds` set, each `add` signals `add_started` and then waits
/// for one permit from `release_add` before writing.
pub struct ScriptedStore {
    inner: MemoryDocumentStore,
    reads: AtomicUsize,
    writes: AtomicUsize,
    writes_down: AtomicBool,
    reads_down: AtomicBool,
    gate_adds: AtomicBool,
    pub add_started: Notify,
    pub release_add: Semaphore,
}

impl ScriptedStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: MemoryDocumentStore::default(),
            reads: AtomicUsize::new(0),
            writes: AtomicUsize::new(0),
            writes_down: AtomicBool::new(false),
            reads_down: AtomicBool::new(false),
            gate_adds: AtomicBool::new(false),
            add_started: Notify::new(),
            release_add: Semaphore::new(0),
        })
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn set_writes_down(&self, down: bool) {
        self.writes_down.store(down, Ordering::SeqCst);
    }

    pub fn set_reads_down(&self, down: bool) {
        self.reads_down.store(down, Ordering::SeqCst);
    }

    pub fn gate_adds(&self) {
        self.gate_adds.store(true, Ordering::SeqCst);
    }

    fn write_attempt(&self) -> Result<(), StoreError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if self.writes_down.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable("writes offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for ScriptedStore {
    async fn add(
        &self,
        collection: &CollectionPath,
        data: serde_json::Value,
    ) -> Result<String, StoreError> {
        if self.gate_adds.load(Ordering::SeqCst) {
            self.add_started.notify_one();
            let permit = self
                .release_add
                .acquire()
                .await
                .map_err(|e| StoreError::Unavailable(e.to_string()))?;
            permit.forget();
        }
        self.write_attempt()?;
        self.inner.add(collection, data).await
    }

    async fn get_all(&self, collection: &CollectionPath) -> Result<Vec<Document>, StoreError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.reads_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("reads offline".to_string()));
        }
        self.inner.get_all(collection).await
    }

    async fn update(
        &self,
        collection: &CollectionPath,
        id: &str,
        data: serde_json::Value,
    ) -> Result<(), StoreError> {
        self.write_attempt()?;
        self.inner.update(collection, id, data).await
    }

    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), StoreError> {
        self.write_attempt()?;
        self.inner.delete(collection, id).await
    }
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// Provider whose sign-ins always fail.
#[derive(Default)]
pub struct OfflineProvider {
    hub: IdentityHub,
    pub attempts: AtomicUsize,
}

#[async_trait]
impl IdentityProvider for OfflineProvider {
    async fn sign_in_anonymous(&self) -> Result<UserId, AuthError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuthError::Unavailable("identity service offline".to_string()))
    }

    async fn sign_in_with_token(&self, _token: &str) -> Result<UserId, AuthError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(AuthError::Unavailable("identity service offline".to_string()))
    }

    async fn sign_out(&self) {
        self.hub.emit(IdentityState::SignedOut);
    }

    fn current_user(&self) -> Option<UserId> {
        self.hub.current_user()
    }

    fn on_identity_change(&self, handler: IdentityHandler) -> Subscription {
        self.hub.subscribe(handler)
    }

    fn identity(&self) -> watch::Receiver<IdentityState> {
        self.hub.watch()
    }
}

/// Provider whose anonymous sign-in succeeds without ever publishing the
/// new state to subscribers.
pub struct SilentProvider {
    hub: IdentityHub,
    pub user: UserId,
}

impl SilentProvider {
    pub fn new(user: &str) -> Self {
        Self {
            hub: IdentityHub::new(),
            user: UserId::new(user),
        }
    }
}

#[async_trait]
impl IdentityProvider for SilentProvider {
    async fn sign_in_anonymous(&self) -> Result<UserId, AuthError> {
        Ok(self.user.clone())
    }

    async fn sign_in_with_token(&self, _token: &str) -> Result<UserId, AuthError> {
        Err(AuthError::Unavailable("tokens not supported".to_string()))
    }

    async fn sign_out(&self) {}

    fn current_user(&self) -> Option<UserId> {
        None
    }

    fn on_identity_change(&self, handler: IdentityHandler) -> Subscription {
        self.hub.subscribe(handler)
    }

    fn identity(&self) -> watch::Receiver<IdentityState> {
        self.hub.watch()
    }
}

// ---------------------------------------------------------------------------
// Manager setup
// ---------------------------------------------------------------------------

pub const SECRET: &str = "integration-test-secret";

pub fn config() -> AppConfig {
    AppConfig {
        app_id: "test-app".to_string(),
        auth_token_secret: Some(SECRET.to_string()),
        ..AppConfig::default()
    }
}

pub fn provider() -> LocalIdentityProvider {
    LocalIdentityProvider::new(Some(SECRET.to_string()))
}

pub async fn start(store: Arc<ScriptedStore>, provider: &LocalIdentityProvider) -> TemplateManager {
    TemplateManager::start(store, provider, &config())
        .await
        .expect("manager should start")
}

/// Fill every form field from `(field, value)` pairs.
pub fn fill(manager: &TemplateManager, values: &[(FormField, &str)]) {
    for (field, value) in values {
        manager
            .set_field(*field, value)
            .unwrap_or_else(|e| panic!("set {field}: {e}"));
    }
}

/// The A4 sheet from the walkthrough: 10mm margins, 50x30 labels, 5mm gaps.
pub fn fill_sheet(manager: &TemplateManager, name: &str) {
    fill(
        manager,
        &[
            (FormField::Name, name),
            (FormField::PageSize, "A4"),
            (FormField::MarginTop, "10"),
            (FormField::MarginRight, "10"),
            (FormField::MarginBottom, "10"),
            (FormField::MarginLeft, "10"),
            (FormField::LabelWidth, "50"),
            (FormField::LabelHeight, "30"),
            (FormField::GapHorizontal, "5"),
            (FormField::GapVertical, "5"),
        ],
    );
}
