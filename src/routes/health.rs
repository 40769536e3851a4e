use crate::AppState;
use axum::extract::State;
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let db = match sqlx::query("SELECT 1").execute(&state.pool).await {
        Ok(_) => "ok",
        Err(_) => "unreachable",
    };
    let body = json!({
        "status": "ok",
        "database": db,
    });
    (StatusCode::OK, Json(body))
}
