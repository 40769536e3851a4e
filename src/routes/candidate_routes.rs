use crate::dto::candidate_dto::UpdateProfileRequest;
use crate::error::{Error, Result};
use crate::middleware::auth::{current_user_id, Claims};
use crate::models::candidate::is_valid_position_level;
use crate::AppState;
use axum::{extract::State, Extension, Json};
use validator::Validate;

pub async fn get_own_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl axum::response::IntoResponse> {
    let user_id = current_user_id(&claims)?;
    let candidate = state
        .candidate_service
        .get_by_user(user_id)
        .await?
        .ok_or_else(|| Error::NotFound("Candidate profile not found".to_string()))?;
    Ok(Json(candidate))
}

/// Owner edit. Applies the MT-flag rules (manual Nepali clears the flag,
/// cleared Nepali becomes eligible for machine translation again) and then
/// re-runs translation in the background for whatever is empty.
pub async fn update_own_profile(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    let user_id = current_user_id(&claims)?;

    if let Some(level) = &payload.position_level {
        if !is_valid_position_level(level) {
            return Err(Error::BadRequest("Unknown position level".to_string()));
        }
    }

    if payload.touches_location() {
        // Partial location edits would let the branch drift out of sync.
        let (Some(p), Some(d), Some(m), Some(w)) = (
            payload.province_id,
            payload.district_id,
            payload.municipality_id,
            payload.ward_number,
        ) else {
            return Err(Error::BadRequest(
                "Location must be updated as a whole: province, district, municipality and ward".to_string(),
            ));
        };
        state.location_service.validate_branch(p, d, m, w).await?;
    }

    let candidate = state.candidate_service.update_profile(user_id, &payload).await?;

    let translation = state.translation_service.clone();
    let candidate_id = candidate.id;
    tokio::spawn(async move {
        if let Err(e) = translation.translate_candidate(candidate_id).await {
            tracing::error!(candidate_id = %candidate_id, "background translation failed: {}", e);
        }
    });

    Ok(Json(candidate))
}
