//! Shared application state for the HTTP surface.
//!
//! `CoreState` owns the record store and the services built on it. It is
//! wrapped in `Arc` at startup and cloned into every request.

use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::dashboard::DashboardState;
use crate::lifecycle::{AppointmentManager, Clock};
use crate::outbox::NotificationOutbox;
use crate::review::ReviewGate;
use crate::roles::{self, Actor};
use crate::store::{SqliteStore, StoreError};

pub struct CoreState {
    store: Arc<SqliteStore>,
    clock: Arc<dyn Clock>,
    manager: AppointmentManager<SqliteStore>,
    gate: ReviewGate<SqliteStore>,
}

impl CoreState {
    pub fn new(store: Arc<SqliteStore>, clock: Arc<dyn Clock>, outbox: NotificationOutbox) -> Self {
        let manager = AppointmentManager::new(Arc::clone(&store), Arc::clone(&clock), outbox);
        let gate = ReviewGate::new(Arc::clone(&store), Arc::clone(&clock));
        Self {
            store,
            clock,
            manager,
            gate,
        }
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    pub fn manager(&self) -> &AppointmentManager<SqliteStore> {
        &self.manager
    }

    pub fn gate(&self) -> &ReviewGate<SqliteStore> {
        &self.gate
    }

    /// Fresh dashboard state for one actor. Not yet fetched.
    pub fn dashboard(&self, actor: Actor) -> DashboardState<SqliteStore> {
        DashboardState::new(actor, self.manager.clone(), self.gate.clone())
    }

    /// Resolve a bearer token to an actor.
    ///
    /// `Ok(None)` for unknown or expired sessions. The role is looked up on
    /// every call so fresh grants apply to the next request.
    pub async fn authenticate(&self, token: &str) -> Result<Option<Actor>, StoreError> {
        let now = self.clock.now();
        let Some(user_id) = self.store.session_user(hash_token(token), now).await? else {
            return Ok(None);
        };
        Ok(Some(roles::resolve_actor(self.store.as_ref(), user_id).await))
    }
}

/// Hex SHA-256 of a bearer token, as stored in `auth_sessions`.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}


#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn hash_token_is_hex_sha256() {
        assert_eq!(
            hash_token("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert_ne!(hash_token("token-a"), hash_token("token-b"));
    }

    #[tokio::test]
    async fn authenticate_resolves_role() {
        let (core, _rx) = core();
        let (customer, customer_token) = sign_in(&core, "jane@example.com", false).await;
        let (admin, admin_token) = sign_in(&core, "boss@example.com", true).await;

        let actor = core.authenticate(&customer_token).await.unwrap().unwrap();
        assert_eq!(actor.id, customer);
        assert!(!actor.is_privileged());

        let actor = core.authenticate(&admin_token).await.unwrap().unwrap();
        assert_eq!(actor.id, admin);
        assert!(actor.is_privileged());

        assert!(core.authenticate("nope").await.unwrap().is_none());
    }
}
