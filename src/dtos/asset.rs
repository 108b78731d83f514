use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::models::AssetKind;

fn positive_value(value: &Decimal) -> Result<(), ValidationError> {
    if *value <= Decimal::ZERO {
        let mut err = ValidationError::new("positive");
        err.message = Some("Value must be positive".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateAssetRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    #[schema(example = "Apartment downtown")]
    pub name: String,

    pub kind: AssetKind,

    pub description: Option<String>,

    #[validate(custom(function = "positive_value"))]
    #[schema(value_type = String, example = "250000.00")]
    pub value: Decimal,

    pub acquisition_date: NaiveDate,

    #[validate(length(min = 1, message = "Acquisition method is required"))]
    #[schema(example = "purchase")]
    pub acquisition_method: String,

    pub document_reference: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateAssetRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    pub kind: AssetKind,

    pub description: Option<String>,

    #[validate(custom(function = "positive_value"))]
    #[schema(value_type = String)]
    pub value: Decimal,

    pub acquisition_date: NaiveDate,

    #[validate(length(min = 1, message = "Acquisition method is required"))]
    pub acquisition_method: String,

    pub document_reference: Option<String>,
}

/// Optional filters and paging for listing an owner's assets.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct AssetListQuery {
    pub kind: Option<AssetKind>,
    pub acquired_from: Option<NaiveDate>,
    pub acquired_to: Option<NaiveDate>,
    /// Records to skip, applied after filtering.
    pub offset: Option<usize>,
    /// Maximum records to return.
    pub limit: Option<usize>,
}
