//! Identity model - principals that own asset records or act as delegates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Role of a principal. Closed set: the access guard is exhaustive
/// over exactly these two shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Delegate,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Delegate => "delegate",
        }
    }
}

/// Identity entity, owned by the credential store.
///
/// Deactivation is a flag flip; identities are never hard-deleted.
#[derive(Debug, Clone)]
pub struct Identity {
    pub id: Uuid,
    /// Display name, as entered at registration.
    pub name: String,
    /// Unique, stored lowercased.
    pub email: String,
    pub secret_hash: String,
    pub role: Role,
    pub active: bool,
    pub two_factor_enabled: bool,
    pub two_factor_seed: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Identity {
    pub fn new(name: String, email: String, secret_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email: email.to_lowercase(),
            secret_hash,
            role,
            active: true,
            two_factor_enabled: false,
            two_factor_seed: None,
            created_at: Utc::now(),
        }
    }

    /// Convert to sanitized response (no secret hash, no seed).
    pub fn sanitized(&self) -> IdentityResponse {
        IdentityResponse {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
            active: self.active,
            two_factor_enabled: self.two_factor_enabled,
            created_at: self.created_at,
        }
    }
}

/// Identity response for API (without sensitive fields).
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct IdentityResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub active: bool,
    pub two_factor_enabled: bool,
    pub created_at: DateTime<Utc>,
}
