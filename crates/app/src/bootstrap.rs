//! Session start-up: pick a document store and resolve the user identity.

use std::sync::Arc;

use labelsheet_core::types::UserId;
use labelsheet_db::store::{HttpDocumentStore, MemoryDocumentStore};
use labelsheet_db::DocumentStore;
use labelsheet_identity::IdentityProvider;

use crate::config::{AppConfig, ConfigError};
use crate::error::{AppError, AppResult};

/// Resolve the session user.
///
/// An already signed-in user is reused. Otherwise the custom token is tried
/// first; if it is absent or fails, anonymous sign-in is attempted. Only
/// when that fails too does bootstrap fail. Nothing is retried.
pub async fn bootstrap(provider: &dyn IdentityProvider, token: Option<&str>) -> AppResult<UserId> {
    if let Some(user) = provider.current_user() {
        tracing::debug!(user_id = %user, "Reusing signed-in user");
        return Ok(user);
    }

    if let Some(token) = token.filter(|t| !t.is_empty()) {
        match provider.sign_in_with_token(token).await {
            Ok(user) => return Ok(user),
            Err(e) => {
                tracing::warn!(error = %e, "Custom token sign-in failed, falling back to anonymous sign-in");
            }
        }
    }

    provider.sign_in_anonymous().await.map_err(|e| {
        tracing::error!(error = %e, "Anonymous sign-in failed");
        AppError::BootstrapFailed(e)
    })
}

/// Build the document store selected by the configuration.
pub fn build_store(config: &AppConfig) -> AppResult<Arc<dyn DocumentStore>> {
    match &config.store_url {
        Some(url) => {
            tracing::info!(url = %url, "Using REST document store");
            let store = HttpDocumentStore::new(url, config.store_timeout)
                .map_err(|e| AppError::Config(ConfigError::StoreClient(e)))?;
            Ok(Arc::new(store))
        }
        None => {
            tracing::info!("Using in-memory document store");
            Ok(Arc::new(MemoryDocumentStore::new()))
        }
    }
}
