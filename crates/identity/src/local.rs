//! Self-contained identity provider.
//!
//! Anonymous sign-in mints a fresh UUID v4 user id. Custom tokens are HS256
//! JWTs whose `sub` claim is the user id; they are verified against the
//! configured secret.

use async_trait::async_trait;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use labelsheet_core::types::UserId;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use uuid::Uuid;

use crate::error::AuthError;
use crate::hub::{IdentityHub, Subscription};
use crate::provider::{IdentityHandler, IdentityProvider, IdentityState};

/// Claims carried by a custom sign-in token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the user id to sign in as.
    pub sub: String,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
}

pub struct LocalIdentityProvider {
    hub: IdentityHub,
    token_secret: Option<String>,
}

impl LocalIdentityProvider {
    /// `token_secret` enables custom-token sign-in; without it only
    /// anonymous sign-in works.
    pub fn new(token_secret: Option<String>) -> Self {
        Self {
            hub: IdentityHub::new(),
            token_secret: token_secret.filter(|s| !s.is_empty()),
        }
    }

    fn secret(&self) -> Result<&str, AuthError> {
        self.token_secret.as_deref().ok_or_else(|| {
            AuthError::Unavailable("custom token sign-in is not configured".to_string())
        })
    }

    /// Issue a token that signs in as `user` for `ttl`.
    pub fn issue_token(&self, user: &UserId, ttl: chrono::Duration) -> Result<String, AuthError> {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: user.to_string(),
            exp: now + ttl.num_seconds(),
            iat: now,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret()?.as_bytes()),
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    fn verify(&self, token: &str) -> Result<UserId, AuthError> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret()?.as_bytes()),
            &Validation::default(),
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        if data.claims.sub.trim().is_empty() {
            return Err(AuthError::InvalidToken("empty subject".to_string()));
        }
        Ok(UserId::new(data.claims.sub))
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn sign_in_anonymous(&self) -> Result<UserId, AuthError> {
        let user = UserId::new(Uuid::new_v4().to_string());
        tracing::info!(user_id = %user, "Signed in anonymously");
        self.hub.emit(IdentityState::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_in_with_token(&self, token: &str) -> Result<UserId, AuthError> {
        let user = self.verify(token)?;
        tracing::info!(user_id = %user, "Signed in with custom token");
        self.hub.emit(IdentityState::SignedIn(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) {
        tracing::info!("Signed out");
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

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use assert_matches::assert_matches;

    use super::*;

    fn provider() -> LocalIdentityProvider {
        LocalIdentityProvider::new(Some("test-secret-that-is-long-enough-for-hmac".to_string()))
    }

    #[tokio::test]
    async fn anonymous_sign_in_mints_distinct_ids() {
        let a = provider().sign_in_anonymous().await.unwrap();
        let b = provider().sign_in_anonymous().await.unwrap();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[tokio::test]
    async fn issued_token_signs_in_as_subject() {
        let idp = provider();
        let token = idp
            .issue_token(&UserId::new("user-7"), chrono::Duration::minutes(5))
            .unwrap();
        let user = idp.sign_in_with_token(&token).await.unwrap();
        assert_eq!(user, UserId::new("user-7"));
        assert_eq!(idp.current_user(), Some(UserId::new("user-7")));
    }

    #[tokio::test]
    async fn expired_token_is_rejected() {
        let idp = provider();
        let token = idp
            .issue_token(&UserId::new("late"), chrono::Duration::minutes(-10))
            .unwrap();
        assert_matches!(
            idp.sign_in_with_token(&token).await,
            Err(AuthError::InvalidToken(_))
        );
        assert_eq!(idp.current_user(), None);
    }

    #[tokio::test]
    async fn token_from_another_secret_is_rejected() {
        let other = LocalIdentityProvider::new(Some("secret-bravo".to_string()));
        let token = other
            .issue_token(&UserId::new("x"), chrono::Duration::minutes(5))
            .unwrap();
        assert_matches!(
            provider().sign_in_with_token(&token).await,
            Err(AuthError::InvalidToken(_))
        );
    }

    #[tokio::test]
    async fn token_sign_in_requires_a_secret() {
        let idp = LocalIdentityProvider::new(None);
        assert_matches!(
            idp.sign_in_with_token("abc").await,
            Err(AuthError::Unavailable(_))
        );
    }

    #[tokio::test]
    async fn subscribers_see_sign_in_and_sign_out() {
        let idp = provider();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let _sub = idp.on_identity_change(Box::new(move |state: &IdentityState| {
            sink.lock().unwrap().push(state.clone());
        }));

        let user = idp.sign_in_anonymous().await.unwrap();
        idp.sign_out().await;

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                IdentityState::SignedOut,
                IdentityState::SignedIn(user),
                IdentityState::SignedOut,
            ]
        );
    }
}
