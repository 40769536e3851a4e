use crate::dto::candidate_dto::{ModerationRequest, Paged};
use crate::error::{Error, Result};
use crate::middleware::auth::{current_user_id, Claims};
use crate::models::candidate::is_valid_status;
use crate::utils::sanitize::mask_email;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::{Extension, Json};
use serde::Deserialize;

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    20
}

#[derive(Debug, Deserialize)]
pub struct AdminListQuery {
    pub status: Option<String>,
    pub province_id: Option<i32>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<AdminListQuery>,
) -> Result<impl axum::response::IntoResponse> {
    if let Some(status) = &query.status {
        if !is_valid_status(status) {
            return Err(Error::BadRequest("Unknown status".to_string()));
        }
    }
    let page = query.page.max(1);
    let per_page = query.per_page.clamp(1, 100);
    let (items, total) = state
        .candidate_service
        .list_for_admin(query.status.as_deref(), query.province_id, page, per_page)
        .await?;
    Ok(Json(Paged {
        items,
        page,
        per_page,
        total,
    }))
}

/// Approves one candidate. Moderation is always per-candidate so the
/// notification side effect fires for each decision; a bulk approval in the
/// UI is a loop over this endpoint.
pub async fn approve_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<uuid::Uuid>,
    Json(payload): Json<ModerationRequest>,
) -> Result<impl axum::response::IntoResponse> {
    let admin_id = current_user_id(&claims)?;
    let candidate = state
        .candidate_service
        .approve(id, admin_id, payload.notes.as_deref())
        .await?;

    if let Some((email, _)) = state.candidate_service.get_user_email(candidate.user_id).await? {
        state
            .email_service
            .enqueue_approval(&email, &candidate.full_name_en)
            .await?;
        tracing::info!(
            candidate_id = %candidate.id,
            recipient = %mask_email(&email),
            "candidate approved"
        );
    }
    Ok(Json(candidate))
}

pub async fn reject_candidate(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<uuid::Uuid>,
    Json(payload): Json<ModerationRequest>,
) -> Result<impl axum::response::IntoResponse> {
    let notes = payload
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::BadRequest("Rejection requires reviewer notes".to_string()))?;

    let admin_id = current_user_id(&claims)?;
    let candidate = state.candidate_service.reject(id, admin_id, notes).await?;

    if let Some((email, _)) = state.candidate_service.get_user_email(candidate.user_id).await? {
        state
            .email_service
            .enqueue_rejection(&email, &candidate.full_name_en, notes)
            .await?;
        tracing::info!(
            candidate_id = %candidate.id,
            recipient = %mask_email(&email),
            "candidate rejected"
        );
    }
    Ok(Json(candidate))
}
