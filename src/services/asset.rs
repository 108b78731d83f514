use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::{
    dtos::asset::{AssetListQuery, CreateAssetRequest, UpdateAssetRequest},
    models::AssetRecord,
    services::{AccessGuard, ServiceError},
    stores::AssetStore,
};

/// Asset-record operations. Every one of them passes through the
/// access guard before touching the store.
#[derive(Clone)]
pub struct AssetService {
    assets: Arc<dyn AssetStore>,
    guard: AccessGuard,
    store_timeout: Duration,
}

impl AssetService {
    pub fn new(assets: Arc<dyn AssetStore>, guard: AccessGuard, store_timeout: Duration) -> Self {
        Self {
            assets,
            guard,
            store_timeout,
        }
    }

    async fn store_call<T>(
        &self,
        operation: &'static str,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, ServiceError> {
        tokio::time::timeout(self.store_timeout, fut)
            .await
            .map_err(|_| {
                tracing::warn!(operation, "Asset store call timed out");
                ServiceError::DependencyUnavailable("asset store timeout".to_string())
            })?
            .map_err(|e| {
                tracing::error!(operation, error = %e, "Asset store call failed");
                ServiceError::DependencyUnavailable("asset store error".to_string())
            })
    }

    /// Fetch an asset under `owner_id`, treating a record that exists
    /// but belongs to someone else the same as a missing one.
    async fn find_owned(&self, owner_id: Uuid, asset_id: Uuid) -> Result<AssetRecord, ServiceError> {
        self.store_call("find_by_id", self.assets.find_by_id(asset_id))
            .await?
            .filter(|asset| asset.owner_id == owner_id)
            .ok_or(ServiceError::AssetNotFound)
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        requester_id: Uuid,
        req: CreateAssetRequest,
    ) -> Result<AssetRecord, ServiceError> {
        self.guard.authorize(owner_id, requester_id).await?;

        let asset = AssetRecord::new(
            owner_id,
            req.name,
            req.kind,
            req.description,
            req.value,
            req.acquisition_date,
            req.acquisition_method,
            req.document_reference,
        );

        let asset = self.store_call("insert", self.assets.insert(asset)).await?;
        tracing::info!(asset_id = %asset.id, owner_id = %owner_id, "Asset created");
        Ok(asset)
    }

    pub async fn get(
        &self,
        owner_id: Uuid,
        asset_id: Uuid,
        requester_id: Uuid,
    ) -> Result<AssetRecord, ServiceError> {
        self.guard.authorize(owner_id, requester_id).await?;
        self.find_owned(owner_id, asset_id).await
    }

    pub async fn list(
        &self,
        owner_id: Uuid,
        requester_id: Uuid,
        filter: AssetListQuery,
    ) -> Result<Vec<AssetRecord>, ServiceError> {
        self.guard.authorize(owner_id, requester_id).await?;

        let records = self
            .store_call("list_by_owner", self.assets.list_by_owner(owner_id))
            .await?;

        Ok(records
            .into_iter()
            .filter(|asset| filter.kind.map_or(true, |kind| asset.kind == kind))
            .filter(|asset| {
                filter
                    .acquired_from
                    .map_or(true, |from| asset.acquisition_date >= from)
            })
            .filter(|asset| {
                filter
                    .acquired_to
                    .map_or(true, |to| asset.acquisition_date <= to)
            })
            .skip(filter.offset.unwrap_or(0))
            .take(filter.limit.unwrap_or(usize::MAX))
            .collect())
    }

    pub async fn update(
        &self,
        owner_id: Uuid,
        asset_id: Uuid,
        requester_id: Uuid,
        req: UpdateAssetRequest,
    ) -> Result<AssetRecord, ServiceError> {
        self.guard.authorize(owner_id, requester_id).await?;

        let mut asset = self.find_owned(owner_id, asset_id).await?;
        asset.name = req.name;
        asset.kind = req.kind;
        asset.description = req.description;
        asset.value = req.value;
        asset.acquisition_date = req.acquisition_date;
        asset.acquisition_method = req.acquisition_method;
        asset.document_reference = req.document_reference;
        asset.updated_at = chrono::Utc::now();

        let asset = self.store_call("update", self.assets.update(asset)).await?;
        tracing::info!(asset_id = %asset.id, owner_id = %owner_id, "Asset updated");
        Ok(asset)
    }

    pub async fn delete(
        &self,
        owner_id: Uuid,
        asset_id: Uuid,
        requester_id: Uuid,
    ) -> Result<(), ServiceError> {
        self.guard.authorize(owner_id, requester_id).await?;

        // Confirm ownership before deleting anything.
        let asset = self.find_owned(owner_id, asset_id).await?;
        self.store_call("delete", self.assets.delete(asset.id))
            .await?;

        tracing::info!(asset_id = %asset_id, owner_id = %owner_id, "Asset deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetKind;
    use crate::stores::{MemoryAssetStore, MemoryDelegationRegistry};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn service() -> (AssetService, Arc<MemoryDelegationRegistry>) {
        let registry = Arc::new(MemoryDelegationRegistry::new());
        let guard = AccessGuard::new(registry.clone(), Duration::from_secs(2));
        let service = AssetService::new(
            Arc::new(MemoryAssetStore::new()),
            guard,
            Duration::from_secs(2),
        );
        (service, registry)
    }

    fn create_req(name: &str, kind: AssetKind, date: &str) -> CreateAssetRequest {
        CreateAssetRequest {
            name: name.to_string(),
            kind,
            description: None,
            value: Decimal::from(1000),
            acquisition_date: date.parse::<NaiveDate>().unwrap(),
            acquisition_method: "purchase".to_string(),
            document_reference: None,
        }
    }

    #[tokio::test]
    async fn stranger_cannot_read_or_write() {
        let (service, _registry) = service();
        let owner = Uuid::new_v4();
        let stranger = Uuid::new_v4();

        let asset = service
            .create(owner, owner, create_req("Car", AssetKind::Vehicle, "2020-03-01"))
            .await
            .unwrap();

        let err = service.get(owner, asset.id, stranger).await.unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied));

        let err = service
            .create(owner, stranger, create_req("Boat", AssetKind::Vehicle, "2021-01-01"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::AccessDenied));
    }

    #[tokio::test]
    async fn delegate_with_grant_can_read() {
        let (service, registry) = service();
        let owner = Uuid::new_v4();
        let delegate = Uuid::new_v4();

        let asset = service
            .create(owner, owner, create_req("Car", AssetKind::Vehicle, "2020-03-01"))
            .await
            .unwrap();

        registry.grant(owner, delegate);
        let fetched = service.get(owner, asset.id, delegate).await.unwrap();
        assert_eq!(fetched.id, asset.id);
    }

    #[tokio::test]
    async fn list_filters_by_kind_and_date() {
        let (service, _registry) = service();
        let owner = Uuid::new_v4();

        service
            .create(owner, owner, create_req("Car", AssetKind::Vehicle, "2020-03-01"))
            .await
            .unwrap();
        service
            .create(owner, owner, create_req("Flat", AssetKind::RealEstate, "2018-07-15"))
            .await
            .unwrap();
        service
            .create(owner, owner, create_req("Coin", AssetKind::Crypto, "2022-11-30"))
            .await
            .unwrap();

        let all = service
            .list(owner, owner, AssetListQuery::default())
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let vehicles = service
            .list(
                owner,
                owner,
                AssetListQuery {
                    kind: Some(AssetKind::Vehicle),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(vehicles.len(), 1);
        assert_eq!(vehicles[0].name, "Car");

        let recent = service
            .list(
                owner,
                owner,
                AssetListQuery {
                    acquired_from: Some("2020-01-01".parse().unwrap()),
                    acquired_to: Some("2021-12-31".parse().unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].name, "Car");
    }

    #[tokio::test]
    async fn list_pages_with_limit_and_offset() {
        let (service, _registry) = service();
        let owner = Uuid::new_v4();

        for name in ["A", "B", "C", "D"] {
            service
                .create(owner, owner, create_req(name, AssetKind::Other, "2020-03-01"))
                .await
                .unwrap();
        }

        let page = service
            .list(
                owner,
                owner,
                AssetListQuery {
                    offset: Some(1),
                    limit: Some(2),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].name, "B");
        assert_eq!(page[1].name, "C");

        // Paging past the end is empty, not an error.
        let past = service
            .list(
                owner,
                owner,
                AssetListQuery {
                    offset: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert!(past.is_empty());
    }

    #[tokio::test]
    async fn cross_owner_asset_reads_as_missing() {
        let (service, registry) = service();
        let owner_a = Uuid::new_v4();
        let owner_b = Uuid::new_v4();

        let asset = service
            .create(owner_a, owner_a, create_req("Car", AssetKind::Vehicle, "2020-03-01"))
            .await
            .unwrap();

        // owner_b is authorized on their own subtree but the record
        // lives under owner_a, so the lookup must read as not-found.
        registry.grant(owner_b, owner_b);
        let err = service.get(owner_b, asset.id, owner_b).await.unwrap_err();
        assert!(matches!(err, ServiceError::AssetNotFound));
    }

    #[tokio::test]
    async fn update_and_delete_round_trip() {
        let (service, _registry) = service();
        let owner = Uuid::new_v4();

        let asset = service
            .create(owner, owner, create_req("Car", AssetKind::Vehicle, "2020-03-01"))
            .await
            .unwrap();

        let updated = service
            .update(
                owner,
                asset.id,
                owner,
                UpdateAssetRequest {
                    name: "Car (sold)".to_string(),
                    kind: AssetKind::Vehicle,
                    description: Some("sold in 2024".to_string()),
                    value: Decimal::from(500),
                    acquisition_date: asset.acquisition_date,
                    acquisition_method: "purchase".to_string(),
                    document_reference: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Car (sold)");

        service.delete(owner, asset.id, owner).await.unwrap();
        let err = service.get(owner, asset.id, owner).await.unwrap_err();
        assert!(matches!(err, ServiceError::AssetNotFound));
    }
}
