// Company profile HTTP surface: thin wrappers over CompanyService that
// map payloads in and envelope results out.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::database::models::company::{ImageKind, NewCompanyProfile};
use crate::error::ApiError;
use crate::handlers::extract::OwnerId;
use crate::handlers::AppState;
use crate::search::{PageRequest, SearchFilters};

/// POST /api/companies - create the caller's profile
pub async fn company_post(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(body): Json<NewCompanyProfile>,
) -> Result<impl IntoResponse, ApiError> {
    let created = state.service.create_company_profile(owner_id, body).await?;
    Ok((StatusCode::CREATED, Json(json!({ "success": true, "data": created }))))
}

/// GET /api/companies/me - the caller's own profile
pub async fn company_me_get(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .service
        .get_company_profile(owner_id)
        .await?
        .ok_or_else(|| ApiError::not_found("company profile not found"))?;
    Ok(Json(json!({ "success": true, "data": profile })))
}

/// GET /api/companies/:id - public read by profile id
pub async fn company_get(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .service
        .get_company_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("company profile not found"))?;
    Ok(Json(json!({ "success": true, "data": profile })))
}

/// PATCH /api/companies - partial update of the caller's profile
pub async fn company_patch(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let patch = body
        .as_object()
        .cloned()
        .ok_or_else(|| ApiError::bad_request("expected a JSON object"))?;
    let updated = state.service.update_company_profile(owner_id, patch).await?;
    Ok(Json(json!({ "success": true, "data": updated })))
}

#[derive(Debug, Deserialize)]
pub struct ImageBody {
    pub url: String,
}

/// PUT /api/companies/images/:kind - swap the logo or banner URL
pub async fn company_image_put(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
    Path(kind): Path<String>,
    Json(body): Json<ImageBody>,
) -> Result<impl IntoResponse, ApiError> {
    let kind = ImageKind::parse(&kind)
        .ok_or_else(|| ApiError::bad_request("image kind must be 'logo' or 'banner'"))?;
    let swap = state.service.update_company_image(owner_id, kind, body.url.clone()).await?;
    Ok(Json(json!({
        "success": true,
        "data": { "id": swap.id, "kind": kind, "url": body.url }
    })))
}

/// DELETE /api/companies - remove the caller's profile
pub async fn company_delete(
    State(state): State<AppState>,
    OwnerId(owner_id): OwnerId,
) -> Result<impl IntoResponse, ApiError> {
    let images = state.service.delete_company_profile(owner_id).await?;
    Ok(Json(json!({ "success": true, "data": images })))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub search: Option<String>,
    pub industry: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// GET /api/companies/search - filtered, paginated listing
pub async fn company_search_get(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filters = SearchFilters {
        search: params.search,
        industry: params.industry,
        city: params.city,
        state: params.state,
        country: params.country,
    };
    let page = PageRequest::new(
        params.page,
        params.limit,
        params.sort_by.as_deref(),
        params.sort_order.as_deref(),
    );

    let (rows, info) = state.service.search_companies(&filters, &page).await?;
    Ok(Json(json!({ "success": true, "data": rows, "pagination": info })))
}

/// GET /api/companies/stats - aggregate registry counts
pub async fn company_stats_get(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let stats = state.service.company_stats().await?;
    Ok(Json(json!({ "success": true, "data": stats })))
}

#[derive(Debug, Deserialize)]
pub struct CheckNameParams {
    pub name: String,
    pub exclude_owner: Option<Uuid>,
}

/// GET /api/companies/check-name - case-insensitive availability probe
pub async fn check_name_get(
    State(state): State<AppState>,
    Query(params): Query<CheckNameParams>,
) -> Result<impl IntoResponse, ApiError> {
    if params.name.trim().is_empty() {
        return Err(ApiError::bad_request("name is required"));
    }
    let available = state
        .service
        .is_name_available(&params.name, params.exclude_owner)
        .await?;
    Ok(Json(json!({
        "success": true,
        "data": { "name": params.name, "available": available }
    })))
}
