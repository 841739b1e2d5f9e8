use async_trait::async_trait;
use labelsheet_core::types::UserId;
use tokio::sync::watch;

use crate::error::AuthError;
use crate::hub::Subscription;

/// What subscribers are told whenever the signed-in user changes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentityState {
    SignedIn(UserId),
    SignedOut,
}

impl IdentityState {
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Self::SignedIn(user) => Some(user),
            Self::SignedOut => None,
        }
    }
}

/// Callback invoked with every identity change.
pub type IdentityHandler = Box<dyn Fn(&IdentityState) + Send + Sync>;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in_anonymous(&self) -> Result<UserId, AuthError>;

    async fn sign_in_with_token(&self, token: &str) -> Result<UserId, AuthError>;

    async fn sign_out(&self);

    /// The user signed in right now, if any.
    fn current_user(&self) -> Option<UserId>;

    /// Register `handler`. It is called once immediately with the current
    /// state and then on every change, until the subscription is dropped.
    fn on_identity_change(&self, handler: IdentityHandler) -> Subscription;

    /// A receiver that always holds the current state.
    fn identity(&self) -> watch::Receiver<IdentityState>;
}
