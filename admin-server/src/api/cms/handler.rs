//! CMS Page API Handlers

use axum::extract::{Path, State};
use shared::models::{
    AuditType, CmsCreate, CmsFilter, CmsListItem, CmsPage, CmsUpdate, CountResponse, PageQuery,
    Paged,
};

use crate::api::{ApiResponse, AppResult};
use crate::auth::CurrentUser;
use crate::cache::{self, ListCache};
use crate::core::ServerState;
use crate::db::repository::cms;
use crate::utils::query::{CMS_SORT, ListQuery};
use crate::utils::validation::{Filter, ValidJson};
use crate::utils::{AppError, ErrorCode};

pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Filter(page): Filter<PageQuery>,
    Filter(filter): Filter<CmsFilter>,
) -> AppResult<ApiResponse<Paged<CmsListItem>>> {
    let query = ListQuery::parse(&page, &CMS_SORT)?;
    let key = ListCache::key(cache::CMS, &query, &filter);
    let pages = state
        .list_cache
        .get_or_load(key, || cms::find_page(&state.pool, &filter, &query))
        .await?;

    state
        .audit
        .log(&current.display_name, AuditType::View, "Viewed CMS pages list")
        .await?;
    Ok(ApiResponse::success(pages))
}

pub async fn count(State(state): State<ServerState>) -> AppResult<ApiResponse<CountResponse>> {
    let count = cms::count(&state.pool).await?;
    Ok(ApiResponse::success(CountResponse { count }))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<CmsPage>> {
    let page = cms::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::CmsNotFound, format!("CMS page {id} not found"))
        })?;
    Ok(ApiResponse::success(page))
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidJson(payload): ValidJson<CmsCreate>,
) -> AppResult<ApiResponse<CmsPage>> {
    let created = cms::create(&state.pool, &payload, current.id).await?;
    state.list_cache.invalidate(cache::CMS);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Create,
            format!("Created CMS page {}", created.key),
        )
        .await?;
    Ok(ApiResponse::success(created))
}

/// The key is fixed at creation and not part of the payload
pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<CmsUpdate>,
) -> AppResult<ApiResponse<CmsPage>> {
    let updated = cms::update(&state.pool, id, &payload, current.id).await?;
    state.list_cache.invalidate(cache::CMS);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Update,
            format!("Updated CMS page {}", updated.key),
        )
        .await?;
    Ok(ApiResponse::success(updated))
}

pub async fn toggle_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<CmsPage>> {
    let toggled = cms::toggle_status(&state.pool, id, current.id).await?;
    state.list_cache.invalidate(cache::CMS);

    let status = if toggled.is_active { "Activated" } else { "Deactivated" };
    state
        .audit
        .log(
            &current.display_name,
            AuditType::Update,
            format!("{status} CMS page {}", toggled.key),
        )
        .await?;
    Ok(ApiResponse::success(toggled))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    let deleted = cms::delete(&state.pool, id).await?;
    state.list_cache.invalidate(cache::CMS);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Delete,
            format!("Deleted CMS page {}", deleted.key),
        )
        .await?;
    Ok(ApiResponse::message("CMS page deleted"))
}

pub async fn export(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<()>> {
    state
        .audit
        .log(&current.display_name, AuditType::Export, "Exported CMS pages list")
        .await?;
    Ok(ApiResponse::message("CMS export recorded"))
}
