//! Delegation grant model - owner-to-delegate access relationships.
//!
//! Grant lifecycle (request/approve/revoke) is managed by an external
//! collaborator; this service only queries it as a boolean oracle and
//! never caches the answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Grant status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrantStatus {
    Active,
    Revoked,
}

/// Delegation grant entity as seen through the registry interface.
#[derive(Debug, Clone)]
pub struct DelegationGrant {
    pub owner_id: Uuid,
    pub delegate_id: Uuid,
    pub status: GrantStatus,
    pub granted_at: DateTime<Utc>,
}

impl DelegationGrant {
    pub fn new(owner_id: Uuid, delegate_id: Uuid) -> Self {
        Self {
            owner_id,
            delegate_id,
            status: GrantStatus::Active,
            granted_at: Utc::now(),
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == GrantStatus::Active
    }
}
