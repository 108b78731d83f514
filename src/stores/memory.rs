//! In-memory store implementations backed by DashMap.

use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

use crate::models::{AssetRecord, DelegationGrant, GrantStatus, Identity};

use super::{AssetStore, CredentialStore, DelegationRegistry};

/// In-memory credential store with a case-insensitive email index.
#[derive(Default)]
pub struct MemoryCredentialStore {
    by_id: DashMap<Uuid, Identity>,
    by_email: DashMap<String, Uuid>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Identity>> {
        let id = match self.by_email.get(&email.to_lowercase()) {
            Some(id) => *id,
            None => return Ok(None),
        };
        Ok(self.by_id.get(&id).map(|entry| entry.clone()))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<Identity>> {
        Ok(self.by_id.get(&id).map(|entry| entry.clone()))
    }

    async fn save(&self, identity: Identity) -> anyhow::Result<Identity> {
        self.by_email.insert(identity.email.clone(), identity.id);
        self.by_id.insert(identity.id, identity.clone());
        Ok(identity)
    }
}

/// In-memory delegation registry keyed by (owner, delegate).
///
/// `grant` and `revoke` stand in for the external grant lifecycle;
/// only `is_active_grant` is part of the core contract.
#[derive(Default)]
pub struct MemoryDelegationRegistry {
    grants: DashMap<(Uuid, Uuid), DelegationGrant>,
}

impl MemoryDelegationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grant(&self, owner_id: Uuid, delegate_id: Uuid) {
        self.grants.insert(
            (owner_id, delegate_id),
            DelegationGrant::new(owner_id, delegate_id),
        );
    }

    pub fn revoke(&self, owner_id: Uuid, delegate_id: Uuid) {
        if let Some(mut grant) = self.grants.get_mut(&(owner_id, delegate_id)) {
            grant.status = GrantStatus::Revoked;
        }
    }
}

#[async_trait]
impl DelegationRegistry for MemoryDelegationRegistry {
    async fn is_active_grant(&self, owner_id: Uuid, requester_id: Uuid) -> anyhow::Result<bool> {
        Ok(self
            .grants
            .get(&(owner_id, requester_id))
            .map(|grant| grant.is_active())
            .unwrap_or(false))
    }
}

/// In-memory asset store.
#[derive(Default)]
pub struct MemoryAssetStore {
    assets: DashMap<Uuid, AssetRecord>,
}

impl MemoryAssetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AssetStore for MemoryAssetStore {
    async fn insert(&self, asset: AssetRecord) -> anyhow::Result<AssetRecord> {
        self.assets.insert(asset.id, asset.clone());
        Ok(asset)
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<AssetRecord>> {
        Ok(self.assets.get(&id).map(|entry| entry.clone()))
    }

    async fn list_by_owner(&self, owner_id: Uuid) -> anyhow::Result<Vec<AssetRecord>> {
        let mut records: Vec<AssetRecord> = self
            .assets
            .iter()
            .filter(|entry| entry.owner_id == owner_id)
            .map(|entry| entry.clone())
            .collect();
        records.sort_by_key(|record| record.created_at);
        Ok(records)
    }

    async fn update(&self, asset: AssetRecord) -> anyhow::Result<AssetRecord> {
        self.assets.insert(asset.id, asset.clone());
        Ok(asset)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        Ok(self.assets.remove(&id).is_some())
    }
}
