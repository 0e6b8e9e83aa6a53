//! Actor identity and role capability.
//!
//! Role resolution is an external, eventually-consistent lookup. Until it
//! completes an actor is `Unresolved`, which grants nothing; a failed lookup
//! resolves to `Standard`. Only an explicit admin role yields `Privileged`.

use std::future::Future;

use serde::Serialize;
use uuid::Uuid;

use crate::db;
use crate::models::enums::Role;
use crate::store::{SqliteStore, StoreError};

/// External role lookup keyed by actor id.
pub trait RoleLookup: Send + Sync + 'static {
    fn is_privileged(&self, actor_id: Uuid) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

impl RoleLookup for SqliteStore {
    async fn is_privileged(&self, actor_id: Uuid) -> Result<bool, StoreError> {
        self.run(move |conn| db::has_role(conn, &actor_id, Role::Admin))
            .await
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Lookup not finished yet. Treated as non-privileged.
    Unresolved,
    Standard,
    Privileged,
}

impl Capability {
    pub fn is_privileged(self) -> bool {
        matches!(self, Capability::Privileged)
    }
}

/// The identity performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Actor {
    pub id: Uuid,
    pub capability: Capability,
}

impl Actor {
    pub fn unresolved(id: Uuid) -> Self {
        Self {
            id,
            capability: Capability::Unresolved,
        }
    }

    pub fn standard(id: Uuid) -> Self {
        Self {
            id,
            capability: Capability::Standard,
        }
    }

    pub fn privileged(id: Uuid) -> Self {
        Self {
            id,
            capability: Capability::Privileged,
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.capability.is_privileged()
    }
}

/// Resolve the capability for `actor_id`. Lookup failures fail closed.
pub async fn resolve_capability<L: RoleLookup>(lookup: &L, actor_id: Uuid) -> Capability {
    match lookup.is_privileged(actor_id).await {
        Ok(true) => Capability::Privileged,
        Ok(false) => Capability::Standard,
        Err(e) => {
            tracing::warn!(actor_id = %actor_id, error = %e, "Role lookup failed, treating actor as non-privileged");
            Capability::Standard
        }
    }
}

/// Resolve a full `Actor` for an authenticated user id.
pub async fn resolve_actor<L: RoleLookup>(lookup: &L, actor_id: Uuid) -> Actor {
    Actor {
        id: actor_id,
        capability: resolve_capability(lookup, actor_id).await,
    }
}
