//! Email Template API Handlers

use axum::extract::{Path, State};
use shared::models::{
    AuditType, CountResponse, EmailTemplate, EmailTemplateFilter, EmailTemplateListItem,
    EmailTemplatePayload, PageQuery, Paged,
};

use crate::api::{ApiResponse, AppResult};
use crate::auth::CurrentUser;
use crate::cache::{self, ListCache};
use crate::core::ServerState;
use crate::db::repository::email_template;
use crate::utils::query::{EMAIL_TEMPLATE_SORT, ListQuery};
use crate::utils::validation::{Filter, ValidJson};
use crate::utils::{AppError, ErrorCode};

pub async fn list(
    State(state): State<ServerState>,
    current: CurrentUser,
    Filter(page): Filter<PageQuery>,
    Filter(filter): Filter<EmailTemplateFilter>,
) -> AppResult<ApiResponse<Paged<EmailTemplateListItem>>> {
    let query = ListQuery::parse(&page, &EMAIL_TEMPLATE_SORT)?;
    let key = ListCache::key(cache::EMAIL_TEMPLATES, &query, &filter);
    let templates = state
        .list_cache
        .get_or_load(key, || email_template::find_page(&state.pool, &filter, &query))
        .await?;

    state
        .audit
        .log(&current.display_name, AuditType::View, "Viewed email templates list")
        .await?;
    Ok(ApiResponse::success(templates))
}

pub async fn count(State(state): State<ServerState>) -> AppResult<ApiResponse<CountResponse>> {
    let count = email_template::count(&state.pool).await?;
    Ok(ApiResponse::success(CountResponse { count }))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<EmailTemplate>> {
    let template = email_template::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::EmailTemplateNotFound,
                format!("Email template {id} not found"),
            )
        })?;
    Ok(ApiResponse::success(template))
}

pub async fn create(
    State(state): State<ServerState>,
    current: CurrentUser,
    ValidJson(payload): ValidJson<EmailTemplatePayload>,
) -> AppResult<ApiResponse<EmailTemplate>> {
    let created = email_template::create(&state.pool, &payload, current.id).await?;
    state.list_cache.invalidate(cache::EMAIL_TEMPLATES);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Create,
            format!("Created email template {}", created.key),
        )
        .await?;
    Ok(ApiResponse::success(created))
}

pub async fn update(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
    ValidJson(payload): ValidJson<EmailTemplatePayload>,
) -> AppResult<ApiResponse<EmailTemplate>> {
    let updated = email_template::update(&state.pool, id, &payload, current.id).await?;
    state.list_cache.invalidate(cache::EMAIL_TEMPLATES);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Update,
            format!("Updated email template {}", updated.key),
        )
        .await?;
    Ok(ApiResponse::success(updated))
}

pub async fn toggle_status(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<EmailTemplate>> {
    let toggled = email_template::toggle_status(&state.pool, id, current.id).await?;
    state.list_cache.invalidate(cache::EMAIL_TEMPLATES);

    let status = if toggled.is_active { "Activated" } else { "Deactivated" };
    state
        .audit
        .log(
            &current.display_name,
            AuditType::Update,
            format!("{status} email template {}", toggled.key),
        )
        .await?;
    Ok(ApiResponse::success(toggled))
}

pub async fn delete(
    State(state): State<ServerState>,
    current: CurrentUser,
    Path(id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    let deleted = email_template::delete(&state.pool, id).await?;
    state.list_cache.invalidate(cache::EMAIL_TEMPLATES);

    state
        .audit
        .log(
            &current.display_name,
            AuditType::Delete,
            format!("Deleted email template {}", deleted.key),
        )
        .await?;
    Ok(ApiResponse::message("Email template deleted"))
}

pub async fn export(
    State(state): State<ServerState>,
    current: CurrentUser,
) -> AppResult<ApiResponse<()>> {
    state
        .audit
        .log(
            &current.display_name,
            AuditType::Export,
            "Exported email templates list",
        )
        .await?;
    Ok(ApiResponse::message("Email template export recorded"))
}
