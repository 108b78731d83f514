//! Access guard - the single choke point for asset-record access.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::services::ServiceError;
use crate::stores::DelegationRegistry;

/// Decides whether a requester may touch an owner's asset records.
///
/// Allowed iff the requester is the owner, or the delegation registry
/// confirms an active grant. The registry is consulted per request
/// with no caching, so a revoked grant takes effect immediately.
#[derive(Clone)]
pub struct AccessGuard {
    delegations: Arc<dyn DelegationRegistry>,
    registry_timeout: Duration,
}

impl AccessGuard {
    pub fn new(delegations: Arc<dyn DelegationRegistry>, registry_timeout: Duration) -> Self {
        Self {
            delegations,
            registry_timeout,
        }
    }

    /// Authorize an asset-record operation. Every read, write, update
    /// and delete must pass through here before touching storage.
    pub async fn authorize(&self, owner_id: Uuid, requester_id: Uuid) -> Result<(), ServiceError> {
        if owner_id == requester_id {
            return Ok(());
        }

        let lookup = self.delegations.is_active_grant(owner_id, requester_id);
        let granted = tokio::time::timeout(self.registry_timeout, lookup)
            .await
            .map_err(|_| {
                tracing::warn!(%owner_id, %requester_id, "Delegation registry lookup timed out");
                ServiceError::DependencyUnavailable("delegation registry timeout".to_string())
            })?
            .map_err(|e| {
                tracing::error!(error = %e, "Delegation registry lookup failed");
                ServiceError::DependencyUnavailable("delegation registry error".to_string())
            })?;

        if granted {
            Ok(())
        } else {
            tracing::warn!(%owner_id, %requester_id, "Asset access denied");
            Err(ServiceError::AccessDenied)
        }
    }
}
