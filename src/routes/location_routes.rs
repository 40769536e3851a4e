use crate::error::Result;
use crate::AppState;
use axum::extract::{Path, State};
use axum::Json;

pub async fn list_provinces(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse> {
    Ok(Json(state.location_service.list_provinces().await?))
}

pub async fn list_districts(
    State(state): State<AppState>,
    Path(province_id): Path<i32>,
) -> Result<impl axum::response::IntoResponse> {
    Ok(Json(state.location_service.districts_of(province_id).await?))
}

pub async fn list_municipalities(
    State(state): State<AppState>,
    Path(district_id): Path<i32>,
) -> Result<impl axum::response::IntoResponse> {
    Ok(Json(
        state.location_service.municipalities_of(district_id).await?,
    ))
}

pub async fn list_wards(
    State(state): State<AppState>,
    Path(municipality_id): Path<i32>,
) -> Result<impl axum::response::IntoResponse> {
    Ok(Json(state.location_service.wards_of(municipality_id).await?))
}
