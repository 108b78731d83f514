//! Asset record model - the personal holdings tracked per owner.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Asset category codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetKind {
    RealEstate,
    Vehicle,
    FinancialInvestment,
    Crypto,
    Jewelry,
    Artwork,
    Other,
}

/// Asset record entity. Owned by `owner_id`; every read/write passes
/// through the access guard before reaching the store.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AssetRecord {
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub kind: AssetKind,
    pub description: Option<String>,
    /// Monetary value; decimal so JSON round-trips are exact.
    pub value: Decimal,
    pub acquisition_date: NaiveDate,
    pub acquisition_method: String,
    /// Opaque reference into the external document store.
    pub document_reference: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AssetRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        owner_id: Uuid,
        name: String,
        kind: AssetKind,
        description: Option<String>,
        value: Decimal,
        acquisition_date: NaiveDate,
        acquisition_method: String,
        document_reference: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id,
            name,
            kind,
            description,
            value,
            acquisition_date,
            acquisition_method,
            document_reference,
            created_at: now,
            updated_at: now,
        }
    }
}
