use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

#[allow(unused_imports)]
use crate::dtos::ErrorResponse;
#[allow(unused_imports)]
use crate::models::AssetRecord;

use crate::{
    dtos::asset::{AssetListQuery, CreateAssetRequest, UpdateAssetRequest},
    error::AppError,
    middleware::AuthUser,
    utils::ValidatedJson,
    AppState,
};

/// Create an asset record under an owner
#[utoipa::path(
    post,
    path = "/owners/{owner_id}/assets",
    params(("owner_id" = Uuid, Path, description = "Owner of the asset records")),
    request_body = CreateAssetRequest,
    responses(
        (status = 201, description = "Asset created", body = AssetRecord),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Assets",
    security(("bearer_auth" = []))
)]
pub async fn create_asset(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<CreateAssetRequest>,
) -> Result<impl IntoResponse, AppError> {
    let requester = user.0.subject()?;
    let asset = state.asset_service.create(owner_id, requester, req).await?;
    Ok((StatusCode::CREATED, Json(asset)))
}

/// List an owner's asset records
#[utoipa::path(
    get,
    path = "/owners/{owner_id}/assets",
    params(
        ("owner_id" = Uuid, Path, description = "Owner of the asset records"),
        AssetListQuery
    ),
    responses(
        (status = 200, description = "Asset records", body = [AssetRecord]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Assets",
    security(("bearer_auth" = []))
)]
pub async fn list_assets(
    State(state): State<AppState>,
    Path(owner_id): Path<Uuid>,
    Query(filter): Query<AssetListQuery>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let requester = user.0.subject()?;
    let assets = state.asset_service.list(owner_id, requester, filter).await?;
    Ok((StatusCode::OK, Json(assets)))
}

/// Fetch a single asset record
#[utoipa::path(
    get,
    path = "/owners/{owner_id}/assets/{asset_id}",
    params(
        ("owner_id" = Uuid, Path, description = "Owner of the asset records"),
        ("asset_id" = Uuid, Path, description = "Asset record ID")
    ),
    responses(
        (status = 200, description = "Asset record", body = AssetRecord),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Assets",
    security(("bearer_auth" = []))
)]
pub async fn get_asset(
    State(state): State<AppState>,
    Path((owner_id, asset_id)): Path<(Uuid, Uuid)>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let requester = user.0.subject()?;
    let asset = state.asset_service.get(owner_id, asset_id, requester).await?;
    Ok((StatusCode::OK, Json(asset)))
}

/// Update an asset record
#[utoipa::path(
    put,
    path = "/owners/{owner_id}/assets/{asset_id}",
    params(
        ("owner_id" = Uuid, Path, description = "Owner of the asset records"),
        ("asset_id" = Uuid, Path, description = "Asset record ID")
    ),
    request_body = UpdateAssetRequest,
    responses(
        (status = 200, description = "Asset updated", body = AssetRecord),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse),
        (status = 422, description = "Validation error", body = ErrorResponse)
    ),
    tag = "Assets",
    security(("bearer_auth" = []))
)]
pub async fn update_asset(
    State(state): State<AppState>,
    Path((owner_id, asset_id)): Path<(Uuid, Uuid)>,
    user: AuthUser,
    ValidatedJson(req): ValidatedJson<UpdateAssetRequest>,
) -> Result<impl IntoResponse, AppError> {
    let requester = user.0.subject()?;
    let asset = state
        .asset_service
        .update(owner_id, asset_id, requester, req)
        .await?;
    Ok((StatusCode::OK, Json(asset)))
}

/// Delete an asset record
#[utoipa::path(
    delete,
    path = "/owners/{owner_id}/assets/{asset_id}",
    params(
        ("owner_id" = Uuid, Path, description = "Owner of the asset records"),
        ("asset_id" = Uuid, Path, description = "Asset record ID")
    ),
    responses(
        (status = 204, description = "Asset deleted"),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "Not found", body = ErrorResponse)
    ),
    tag = "Assets",
    security(("bearer_auth" = []))
)]
pub async fn delete_asset(
    State(state): State<AppState>,
    Path((owner_id, asset_id)): Path<(Uuid, Uuid)>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let requester = user.0.subject()?;
    state
        .asset_service
        .delete(owner_id, asset_id, requester)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
