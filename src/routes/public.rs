use crate::dto::candidate_dto::Paged;
use crate::dto::public_dto::{FeedQuery, PublicCandidateDetail};
use crate::error::{Error, Result};
use crate::services::search_service::FeedFilters;
use crate::AppState;
use axum::extract::{Path, Query, State};
use axum::Json;

/// Public candidate feed: ranked full-text search when `q` is present,
/// reverse chronological otherwise. Approved profiles only.
pub async fn list_candidates(
    State(state): State<AppState>,
    Query(query): Query<FeedQuery>,
) -> Result<impl axum::response::IntoResponse> {
    let filters = FeedFilters {
        q: query.q,
        province_id: query.province_id,
        district_id: query.district_id,
        municipality_id: query.municipality_id,
        ward_number: query.ward,
        position_level: query.position,
        page: query.page,
        per_page: query.per_page,
    }
    .normalized();

    let (items, total) = state.search_service.feed(&filters).await?;
    Ok(Json(Paged {
        items,
        page: filters.page,
        per_page: filters.per_page,
        total,
    }))
}

pub async fn get_candidate(
    State(state): State<AppState>,
    Path(id): Path<uuid::Uuid>,
) -> Result<impl axum::response::IntoResponse> {
    let candidate = state
        .candidate_service
        .get_approved(id)
        .await?
        .ok_or_else(|| Error::NotFound("Candidate not found".to_string()))?;
    Ok(Json(PublicCandidateDetail::from(candidate)))
}
