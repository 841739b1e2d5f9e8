//! Identity-change fan-out.
//!
//! [`IdentityHub`] keeps the current [`IdentityState`] in a `watch` channel
//! and a registry of callback handlers. Async consumers read the channel;
//! handlers serve callers that must react synchronously, before the
//! signing-in call returns. It is cheap to clone and meant to be embedded
//! in providers.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use labelsheet_core::types::UserId;
use tokio::sync::watch;

use crate::provider::{IdentityHandler, IdentityState};

type SharedHandler = Arc<dyn Fn(&IdentityState) + Send + Sync>;

struct HubInner {
    current: watch::Sender<IdentityState>,
    handlers: Mutex<HashMap<u64, SharedHandler>>,
    next_id: AtomicU64,
}

#[derive(Clone)]
pub struct IdentityHub {
    inner: Arc<HubInner>,
}

impl Default for IdentityHub {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityHub {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(HubInner {
                current: watch::channel(IdentityState::SignedOut).0,
                handlers: Mutex::new(HashMap::new()),
                next_id: AtomicU64::new(0),
            }),
        }
    }

    pub fn current(&self) -> IdentityState {
        self.inner.current.borrow().clone()
    }

    /// Receiver for the current state. Dropping it does not unsubscribe
    /// anything.
    pub fn watch(&self) -> watch::Receiver<IdentityState> {
        self.inner.current.subscribe()
    }

    pub fn current_user(&self) -> Option<UserId> {
        self.current().user_id().cloned()
    }

    /// Register a handler and deliver the current state to it right away.
    pub fn subscribe(&self, handler: IdentityHandler) -> Subscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let handler: SharedHandler = Arc::from(handler);
        self.inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, Arc::clone(&handler));

        handler(&self.current());

        Subscription {
            id,
            hub: Arc::downgrade(&self.inner),
        }
    }

    /// Record a new state and notify every handler.
    ///
    /// Handlers run outside the registry lock, so they may subscribe or
    /// unsubscribe themselves.
    pub fn emit(&self, state: IdentityState) {
        self.inner.current.send_replace(state.clone());

        let handlers: Vec<SharedHandler> = self
            .inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();

        tracing::debug!(subscribers = handlers.len(), signed_in = state.user_id().is_some(), "Identity changed");
        for handler in handlers {
            handler(&state);
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner
            .handlers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Handle returned by [`IdentityHub::subscribe`]. Dropping it unsubscribes.
#[must_use = "dropping the subscription unsubscribes the handler"]
pub struct Subscription {
    id: u64,
    hub: Weak<HubInner>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(hub) = self.hub.upgrade() {
            hub.handlers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorder() -> (Arc<Mutex<Vec<IdentityState>>>, IdentityHandler) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: IdentityHandler = Box::new(move |state: &IdentityState| {
            sink.lock().unwrap().push(state.clone());
        });
        (seen, handler)
    }

    #[test]
    fn subscriber_receives_current_state_immediately() {
        let hub = IdentityHub::new();
        hub.emit(IdentityState::SignedIn(UserId::new("u1")));

        let (seen, handler) = recorder();
        let _sub = hub.subscribe(handler);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![IdentityState::SignedIn(UserId::new("u1"))]
        );
    }

    #[test]
    fn emits_reach_every_subscriber() {
        let hub = IdentityHub::new();
        let (a, ha) = recorder();
        let (b, hb) = recorder();
        let _sa = hub.subscribe(ha);
        let _sb = hub.subscribe(hb);

        hub.emit(IdentityState::SignedIn(UserId::new("u2")));
        assert_eq!(a.lock().unwrap().len(), 2);
        assert_eq!(b.lock().unwrap().last(), Some(&IdentityState::SignedIn(UserId::new("u2"))));
    }

    #[test]
    fn unsubscribe_stops_delivery() {
        let hub = IdentityHub::new();
        let (seen, handler) = recorder();
        let sub = hub.subscribe(handler);
        assert_eq!(hub.subscriber_count(), 1);

        sub.unsubscribe();
        hub.emit(IdentityState::SignedIn(UserId::new("u3")));

        assert_eq!(hub.subscriber_count(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![IdentityState::SignedOut]);
    }

    #[tokio::test]
    async fn watch_receivers_follow_emits() {
        let hub = IdentityHub::new();
        let mut rx = hub.watch();
        assert_eq!(*rx.borrow(), IdentityState::SignedOut);

        hub.emit(IdentityState::SignedIn(UserId::new("u4")));
        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), IdentityState::SignedIn(UserId::new("u4")));
        assert_eq!(hub.current_user(), Some(UserId::new("u4")));
    }
}
