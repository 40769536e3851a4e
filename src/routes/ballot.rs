use crate::dto::candidate_dto::Paged;
use crate::dto::public_dto::{BallotQuery, BallotResponse};
use crate::error::{Error, Result};
use crate::services::search_service::FeedFilters;
use crate::AppState;
use axum::extract::{Query, State};
use axum::Json;

/// The ballot view: GPS fix in, location-matched approved candidates out.
/// The coordinates are used for resolution only and never persisted.
pub async fn get_ballot(
    State(state): State<AppState>,
    Query(query): Query<BallotQuery>,
) -> Result<impl axum::response::IntoResponse> {
    let resolved = state
        .location_service
        .resolve(query.lat, query.lng)
        .await?
        .ok_or_else(|| {
            Error::NotFound("Location could not be matched to a municipality".to_string())
        })?;

    let filters = FeedFilters {
        q: None,
        province_id: Some(resolved.province_id),
        district_id: Some(resolved.district_id),
        municipality_id: Some(resolved.municipality_id),
        ward_number: resolved.ward_number,
        position_level: None,
        page: query.page,
        per_page: query.per_page,
    }
    .normalized();

    // Ward-level match first; fall back to the whole municipality when the
    // ward is empty or unresolved.
    let (mut items, mut total) = state.search_service.feed(&filters).await?;
    if items.is_empty() && filters.ward_number.is_some() {
        let municipal = FeedFilters {
            ward_number: None,
            ..filters.clone()
        };
        (items, total) = state.search_service.feed(&municipal).await?;
    }

    Ok(Json(BallotResponse {
        location: resolved,
        candidates: Paged {
            items,
            page: filters.page,
            per_page: filters.per_page,
            total,
        },
    }))
}
