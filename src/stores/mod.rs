//! External store contracts.
//!
//! Persistence is owned by collaborator systems; this crate talks to
//! them through these traits. The in-memory implementations back the
//! test suite and the default standalone wiring.

mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{AssetRecord, Identity};

pub use memory::{MemoryAssetStore, MemoryCredentialStore, MemoryDelegationRegistry};

/// Store of identity records. Lookups are per-request with no local
/// caching so deactivation takes effect immediately.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>>;
    async fn save(&self, identity: Identity) -> anyhow::Result<Identity>;
}

/// Query interface over externally-managed delegation grants.
#[async_trait]
pub trait DelegationRegistry: Send + Sync {
    /// Whether `requester_id` currently holds an active grant to act
    /// on `owner_id`'s behalf.
    async fn is_active_grant(&self, owner_id: Uuid, requester_id: Uuid) -> anyhow::Result<bool>;
}

/// Store of asset records.
#[async_trait]
pub trait AssetStore: Send + Sync {
    async fn insert(&self, asset: AssetRecord) -> anyhow::Result<AssetRecord>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<AssetRecord>>;
    async fn list_by_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<AssetRecord>>;
    async fn update(&self, asset: AssetRecord) -> anyhow::Result<AssetRecord>;
    async fn delete(&self, id: Uuid) -> anyhow::Result<bool>;
}
