use crate::dto::auth_dto::{
    AuthResponse, GenericMessageResponse, LoginRequest, RegisterRequest,
    RequestPasswordResetRequest, ResetPasswordRequest, VerifyEmailRequest,
};
use crate::dto::candidate_dto::NewCandidateProfile;
use crate::error::{Error, Result};
use crate::models::candidate::is_valid_position_level;
use crate::models::user::{User, ROLE_CANDIDATE};
use crate::utils::sanitize::{clean_text, mask_email, mask_username};
use crate::AppState;
use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

fn optional_text(input: &Option<String>) -> Option<String> {
    input.as_deref().map(clean_text).filter(|s| !s.is_empty())
}

/// Registration: user account + candidate profile in one transaction, status
/// pending. Verification email and machine translation of empty Nepali
/// fields are scheduled after the commit.
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl axum::response::IntoResponse> {
    payload.validate()?;
    if !is_valid_position_level(&payload.position_level) {
        return Err(Error::BadRequest("Unknown position level".to_string()));
    }

    state
        .location_service
        .validate_branch(
            payload.province_id,
            payload.district_id,
            payload.municipality_id,
            payload.ward_number,
        )
        .await?;

    let username = clean_text(&payload.username);
    let email = payload.email.trim().to_lowercase();

    let existing = sqlx::query("SELECT id FROM users WHERE username = $1 OR email = $2")
        .bind(&username)
        .bind(&email)
        .fetch_optional(&state.pool)
        .await?;
    if existing.is_some() {
        // One generic message for both collisions.
        return Err(Error::Conflict(
            "An account with these details already exists".to_string(),
        ));
    }

    let password_hash = crate::utils::crypto::hash_password(&payload.password)
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;

    let profile = NewCandidateProfile {
        full_name_en: clean_text(&payload.full_name_en),
        full_name_ne: optional_text(&payload.full_name_ne),
        bio_en: clean_text(&payload.bio_en),
        bio_ne: optional_text(&payload.bio_ne),
        education_en: clean_text(&payload.education_en),
        education_ne: optional_text(&payload.education_ne),
        experience_en: clean_text(&payload.experience_en),
        experience_ne: optional_text(&payload.experience_ne),
        manifesto_en: clean_text(&payload.manifesto_en),
        manifesto_ne: optional_text(&payload.manifesto_ne),
        position_level: payload.position_level.clone(),
        province_id: payload.province_id,
        district_id: payload.district_id,
        municipality_id: payload.municipality_id,
        ward_number: payload.ward_number,
    };

    let mut tx = state.pool.begin().await?;
    let user: User = sqlx::query_as(
        r#"
        INSERT INTO users (username, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING *
        "#,
    )
    .bind(&username)
    .bind(&email)
    .bind(&password_hash)
    .bind(ROLE_CANDIDATE)
    .fetch_one(&mut *tx)
    .await?;

    let candidate = state
        .candidate_service
        .create_in_tx(&mut tx, user.id, &profile)
        .await?;
    tx.commit().await?;

    tracing::info!(
        username = %mask_username(&username),
        email = %mask_email(&email),
        candidate_id = %candidate.id,
        "candidate registered, pending review"
    );

    let token = state.token_service.create_verification(user.id).await?;
    state
        .email_service
        .enqueue_verification(&email, &username, &token)
        .await?;

    // Translation runs off the request path, after the profile is committed.
    let translation = state.translation_service.clone();
    let candidate_id = candidate.id;
    tokio::spawn(async move {
        if let Err(e) = translation.translate_candidate(candidate_id).await {
            tracing::error!(candidate_id = %candidate_id, "background translation failed: {}", e);
        }
    });

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "user_id": user.id,
            "candidate_id": candidate.id,
            "status": candidate.status,
            "message": "Registration received. Please verify your email address.",
        })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>> {
    payload.validate()?;

    let user: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE username = $1 AND is_active = TRUE")
            .bind(payload.username.trim())
            .fetch_optional(&state.pool)
            .await?;

    // Same message for unknown user and wrong password.
    let invalid = || Error::Unauthorized("Invalid username or password".to_string());
    let user = user.ok_or_else(invalid)?;
    let ok = crate::utils::crypto::verify_password(&payload.password, &user.password_hash)
        .map_err(|e| Error::Internal(format!("Password verification failed: {}", e)))?;
    if !ok {
        tracing::warn!(username = %mask_username(&payload.username), "failed login attempt");
        return Err(invalid());
    }
    if !user.is_email_verified {
        return Err(Error::Forbidden("Email address not verified".to_string()));
    }

    let token = crate::middleware::auth::issue_token(user.id, &user.role)?;
    Ok(Json(AuthResponse {
        token,
        user_id: user.id,
        role: user.role,
    }))
}

pub async fn verify_email(
    State(state): State<AppState>,
    Json(payload): Json<VerifyEmailRequest>,
) -> Result<Json<GenericMessageResponse>> {
    payload.validate()?;
    state.token_service.consume_verification(&payload.token).await?;
    Ok(Json(GenericMessageResponse {
        message: "Email verified".to_string(),
    }))
}

/// Always answers 200 with the same message so the endpoint cannot be used
/// to probe which emails have accounts.
pub async fn request_password_reset(
    State(state): State<AppState>,
    Json(payload): Json<RequestPasswordResetRequest>,
) -> Result<Json<GenericMessageResponse>> {
    payload.validate()?;
    let email = payload.email.trim().to_lowercase();

    let user: Option<User> =
        sqlx::query_as("SELECT * FROM users WHERE email = $1 AND is_active = TRUE")
            .bind(&email)
            .fetch_optional(&state.pool)
            .await?;

    if let Some(user) = user {
        let token = state.token_service.create_password_reset(user.id).await?;
        state
            .email_service
            .enqueue_password_reset(&email, &user.username, &token)
            .await?;
    } else {
        tracing::info!(email = %mask_email(&email), "password reset requested for unknown email");
    }

    Ok(Json(GenericMessageResponse {
        message: "If an account exists for that address, a reset link has been sent.".to_string(),
    }))
}

pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<GenericMessageResponse>> {
    payload.validate()?;
    let password_hash = crate::utils::crypto::hash_password(&payload.new_password)
        .map_err(|e| Error::Internal(format!("Password hashing failed: {}", e)))?;
    state
        .token_service
        .consume_password_reset(&payload.token, &password_hash)
        .await?;
    Ok(Json(GenericMessageResponse {
        message: "Password updated".to_string(),
    }))
}
