//! Template manager: the single owner of form state, notices and the
//! synced template list for one session.
//!
//! Every public operation is `&self` so the manager can sit behind an
//! `Arc` and be driven concurrently. Std mutexes guard the form and the
//! notifier; they are never held across an `.await`.
//!
//! The signed-in user is read from the provider's identity channel. When
//! it changes, an edit of another owner's template is dropped at once and
//! [`TemplateManager::sync_identity`] re-lists for the new owner;
//! [`TemplateManager::follow_identity`] runs that in the background.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use labelsheet_core::error::CoreError;
use labelsheet_core::form::{FormField, FormFields, FormMode, SubmitAction, TemplateForm};
use labelsheet_core::notice::{Notice, Notifier};
use labelsheet_core::template::Template;
use labelsheet_core::types::{TemplateId, UserId};
use labelsheet_db::repositories::TemplateRepo;
use labelsheet_db::{DocumentStore, StoreError};
use labelsheet_identity::{IdentityProvider, IdentityState, Subscription};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::bootstrap::bootstrap;
use crate::config::AppConfig;
use crate::error::{AppError, AppResult, Operation};

pub const SAVED_NOTICE: &str = "Template saved successfully!";
pub const UPDATED_NOTICE: &str = "Template updated successfully!";
pub const DELETED_NOTICE: &str = "Template deleted successfully!";

/// What a successful submit did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Created(TemplateId),
    Updated(TemplateId),
}

/// Read-only copy of the form for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct FormView {
    pub heading: &'static str,
    pub submit_label: &'static str,
    pub fields: FormFields,
    pub editing: Option<TemplateId>,
    pub submitting: bool,
}

pub struct TemplateManager {
    repo: TemplateRepo,
    identity: watch::Receiver<IdentityState>,
    _subscription: Subscription,
    form: Arc<Mutex<TemplateForm>>,
    notifier: Mutex<Notifier>,
    last_error: Mutex<Option<String>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Reset the form when its edit target belongs to someone other than the
/// user now signed in.
fn drop_foreign_edit(form: &Mutex<TemplateForm>, state: &IdentityState) {
    let mut form = lock(form);
    let foreign = match form.mode() {
        FormMode::Editing(target) => state.user_id() != Some(&target.owner_id),
        FormMode::Creating => false,
    };
    if foreign {
        tracing::debug!("Identity changed during an edit, form reset");
        form.reset();
    }
}

impl TemplateManager {
    /// Wire a manager to `provider` without signing anyone in.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        provider: &dyn IdentityProvider,
        config: &AppConfig,
    ) -> Self {
        let form = Arc::new(Mutex::new(TemplateForm::new()));
        let subscription = provider.on_identity_change(Box::new({
            let form = Arc::clone(&form);
            move |state: &IdentityState| drop_foreign_edit(&form, state)
        }));

        Self {
            repo: TemplateRepo::new(store, config.app_id.clone()),
            identity: provider.identity(),
            _subscription: subscription,
            form,
            notifier: Mutex::new(Notifier::new(config.notice_duration)),
            last_error: Mutex::new(None),
        }
    }

    /// Bootstrap the session and load the signed-in user's templates.
    ///
    /// A failing initial load is not fatal: the manager starts with an
    /// empty list and `last_error` set.
    pub async fn start(
        store: Arc<dyn DocumentStore>,
        provider: &dyn IdentityProvider,
        config: &AppConfig,
    ) -> AppResult<Self> {
        let manager = Self::new(store, provider, config);
        let user = bootstrap(provider, config.initial_auth_token.as_deref())
            .await
            .inspect_err(|e| manager.set_last_error(e))?;
        if manager.user_id().as_ref() != Some(&user) {
            tracing::warn!(user_id = %user, "Identity provider has not published the signed-in user");
        }
        tracing::info!(user_id = %user, app_id = %config.app_id, "Session started");

        if let Err(e) = manager.load(&user).await {
            tracing::warn!(error = %e, "Initial template load failed");
        }
        Ok(manager)
    }

    /// Re-list when the signed-in user is not the owner of the loaded list.
    /// Returns whether a fetch was made.
    pub async fn sync_identity(&self) -> AppResult<bool> {
        let Some(user) = self.user_id() else {
            return Ok(false);
        };
        if self.repo.snapshot_owner().await.as_ref() == Some(&user) {
            return Ok(false);
        }
        tracing::info!(user_id = %user, "Signed-in user changed, reloading templates");
        self.load(&user).await?;
        Ok(true)
    }

    /// Spawn a task that calls [`sync_identity`](Self::sync_identity) on
    /// every identity change. It stops when the manager or the provider is
    /// dropped.
    pub fn follow_identity(self: &Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.identity.clone();
        let weak = Arc::downgrade(self);
        tokio::spawn(async move {
            while changes.changed().await.is_ok() {
                let Some(manager) = weak.upgrade() else {
                    break;
                };
                if let Err(e) = manager.sync_identity().await {
                    tracing::warn!(error = %e, "Reload after identity change failed");
                }
            }
        })
    }

    /// The signed-in user, if any.
    pub fn user_id(&self) -> Option<UserId> {
        self.identity.borrow().user_id().cloned()
    }

    fn owner(&self) -> AppResult<UserId> {
        self.user_id().ok_or(AppError::NotSignedIn)
    }

    /* ------------------------------------------------------------------ */
    /*  Reads                                                             */
    /* ------------------------------------------------------------------ */

    /// The signed-in user's templates as of the last successful fetch.
    pub async fn templates(&self) -> Vec<Template> {
        match self.user_id() {
            Some(user) => self.repo.templates(&user).await,
            None => Vec::new(),
        }
    }

    pub fn is_loading(&self) -> bool {
        self.repo.is_loading()
    }

    pub fn form(&self) -> FormView {
        let form = lock(&self.form);
        FormView {
            heading: form.heading(),
            submit_label: form.submit_label(),
            fields: form.fields().clone(),
            editing: form.editing_id().cloned(),
            submitting: form.is_submitting(),
        }
    }

    /// The visible notice, if any.
    pub fn notice(&self) -> Option<Notice> {
        lock(&self.notifier).current().cloned()
    }

    /// Message of the last load or session failure, cleared by the next
    /// submit or delete.
    pub fn last_error(&self) -> Option<String> {
        lock(&self.last_error).clone()
    }

    /* ------------------------------------------------------------------ */
    /*  Form operations                                                   */
    /* ------------------------------------------------------------------ */

    pub fn set_field(&self, field: FormField, value: &str) -> AppResult<()> {
        lock(&self.form).set_field(field, value)?;
        Ok(())
    }

    /// Switch the form into edit mode for a template in the current list.
    pub async fn edit(&self, id: &TemplateId) -> AppResult<()> {
        let owner = self.owner()?;
        let target = self.repo.find(&owner, id).await.ok_or_else(|| CoreError::NotFound {
            entity: "template",
            id: id.to_string(),
        })?;
        tracing::debug!(template_id = %id, "Editing template");
        lock(&self.form).edit(target);
        Ok(())
    }

    pub fn cancel(&self) {
        lock(&self.form).cancel();
    }

    /// Validate and persist the form.
    ///
    /// Invalid input never reaches the store and leaves the form as it
    /// was. On success the form resets and the list is re-fetched.
    pub async fn submit(&self) -> AppResult<SubmitOutcome> {
        self.clear_last_error();
        let owner = self.owner().map_err(|e| self.notify_failure(e))?;

        let (_guard, action) = {
            let form = lock(&self.form);
            let guard = form.begin_submit().map_err(|e| self.notify_failure(e.into()))?;
            let action = form
                .prepare_submit()
                .map_err(|e| self.notify_failure(e.into()))?;
            (guard, action)
        };

        let (outcome, refresh, message) = match action {
            SubmitAction::Create(spec) => {
                let synced = self
                    .repo
                    .create(&owner, spec)
                    .await
                    .map_err(|e| self.notify_failure(AppError::persistence(Operation::Save, e)))?;
                (
                    SubmitOutcome::Created(synced.value.id),
                    synced.refresh,
                    SAVED_NOTICE,
                )
            }
            SubmitAction::Update(id, spec) => {
                let synced = self
                    .repo
                    .update(&owner, &id, spec)
                    .await
                    .map_err(|e| self.notify_failure(AppError::persistence(Operation::Save, e)))?;
                (SubmitOutcome::Updated(id), synced.refresh, UPDATED_NOTICE)
            }
        };

        tracing::info!(outcome = ?outcome, user_id = %owner, "Template submitted");
        lock(&self.notifier).show(Notice::success(message));
        lock(&self.form).on_saved();
        self.record_refresh(refresh);
        Ok(outcome)
    }

    /// Delete a template. Without `confirmed` nothing happens and
    /// `Ok(false)` is returned.
    pub async fn delete(&self, id: &TemplateId, confirmed: bool) -> AppResult<bool> {
        if !confirmed {
            tracing::debug!(template_id = %id, "Delete not confirmed");
            return Ok(false);
        }
        self.clear_last_error();
        let owner = self.owner().map_err(|e| self.notify_failure(e))?;

        let synced = self
            .repo
            .delete(&owner, id)
            .await
            .map_err(|e| self.notify_failure(AppError::persistence(Operation::Delete, e)))?;

        tracing::info!(template_id = %id, user_id = %owner, "Template deleted");
        lock(&self.notifier).show(Notice::success(DELETED_NOTICE));
        self.record_refresh(synced.refresh);
        if lock(&self.form).on_deleted(id) {
            tracing::debug!(template_id = %id, "Deleted template was being edited, form reset");
        }
        Ok(true)
    }

    /// Re-fetch the owner's list. Returns the number of templates.
    pub async fn refresh(&self) -> AppResult<usize> {
        let owner = self.owner().inspect_err(|e| self.set_last_error(e))?;
        self.load(&owner).await
    }

    async fn load(&self, owner: &UserId) -> AppResult<usize> {
        match self.repo.list(owner).await {
            Ok(templates) => Ok(templates.len()),
            Err(e) => {
                let err = AppError::persistence(Operation::Load, e);
                self.set_last_error(&err);
                Err(err)
            }
        }
    }

    /* ------------------------------------------------------------------ */
    /*  Helpers                                                           */
    /* ------------------------------------------------------------------ */

    fn notify_failure(&self, err: AppError) -> AppError {
        tracing::warn!(error = %err, "Template operation failed");
        lock(&self.notifier).show(Notice::error(err.user_message()));
        err
    }

    fn record_refresh(&self, refresh: Result<usize, StoreError>) {
        if let Err(e) = refresh {
            self.set_last_error(&AppError::persistence(Operation::Load, e));
        }
    }

    fn set_last_error(&self, err: &AppError) {
        *lock(&self.last_error) = Some(err.user_message());
    }

    fn clear_last_error(&self) {
        *lock(&self.last_error) = None;
    }

    /// How long notices stay visible.
    pub fn notice_duration(&self) -> Duration {
        lock(&self.notifier).duration()
    }
}
