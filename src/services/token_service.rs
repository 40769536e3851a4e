use crate::error::{Error, Result};
use crate::utils::crypto::{generate_token, token_digest};
use chrono::Duration;
use sqlx::{PgPool, Row};
use uuid::Uuid;

pub const VERIFICATION_TTL_HOURS: i64 = 24;
pub const RESET_TTL_HOURS: i64 = 1;

#[derive(Clone)]
pub struct TokenService {
    pool: PgPool,
}

impl TokenService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates a verification token and returns the plaintext for the email
    /// link. Only the digest is stored.
    pub async fn create_verification(&self, user_id: Uuid) -> Result<String> {
        let token = generate_token();
        sqlx::query(
            r#"
            INSERT INTO email_verifications (user_id, token_digest, expires_at)
            VALUES ($1, $2, NOW() + make_interval(hours => $3))
            "#,
        )
        .bind(user_id)
        .bind(token_digest(&token))
        .bind(VERIFICATION_TTL_HOURS as i32)
        .execute(&self.pool)
        .await?;
        Ok(token)
    }

    /// Consumes a verification token: single-use and time-boxed, enforced in
    /// one UPDATE so two concurrent requests cannot both succeed. Marks the
    /// user verified. Returns the user id.
    pub async fn consume_verification(&self, token: &str) -> Result<Uuid> {
        let digest = token_digest(token);
        let row = sqlx::query(
            r#"
            UPDATE email_verifications
            SET verified_at = NOW()
            WHERE token_digest = $1 AND verified_at IS NULL AND expires_at > NOW()
            RETURNING user_id
            "#,
        )
        .bind(&digest)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| Error::BadRequest("Invalid or expired token".to_string()))?;

        let user_id: Uuid = row.try_get("user_id")?;
        sqlx::query("UPDATE users SET is_email_verified = TRUE, updated_at = NOW() WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(user_id)
    }

    pub async fn create_password_reset(&self, user_id: Uuid) -> Result<String> {
        let token = generate_token();
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (user_id, token_digest, expires_at)
            VALUES ($1, $2, NOW() + make_interval(hours => $3))
            "#,
        )
        .bind(user_id)
        .bind(token_digest(&token))
        .bind(RESET_TTL_HOURS as i32)
        .execute(&self.pool)
        .await?;
        Ok(token)
    }

    /// Consumes a reset token and updates the password hash atomically with
    /// respect to reuse: the token row is claimed first, in one UPDATE.
    pub async fn consume_password_reset(&self, token: &str, new_password_hash: &str) -> Result<Uuid> {
        let digest = token_digest(token);
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query(
            r#"
            UPDATE password_reset_tokens
            SET used_at = NOW()
            WHERE token_digest = $1 AND used_at IS NULL AND expires_at > NOW()
            RETURNING user_id
            "#,
        )
        .bind(&digest)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| Error::BadRequest("Invalid or expired token".to_string()))?;

        let user_id: Uuid = row.try_get("user_id")?;
        sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE id = $2")
            .bind(new_password_hash)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(user_id)
    }
}

/// Expiry window helpers, separated so the policy is unit-testable without a
/// database.
pub fn is_within_window(created: chrono::DateTime<chrono::Utc>, ttl_hours: i64, now: chrono::DateTime<chrono::Utc>) -> bool {
    now < created + Duration::hours(ttl_hours)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn verification_window_is_24h() {
        let created = Utc::now();
        assert!(is_within_window(created, VERIFICATION_TTL_HOURS, created + Duration::hours(23)));
        assert!(!is_within_window(created, VERIFICATION_TTL_HOURS, created + Duration::hours(25)));
    }

    #[test]
    fn reset_window_is_1h() {
        let created = Utc::now();
        assert!(is_within_window(created, RESET_TTL_HOURS, created + Duration::minutes(59)));
        assert!(!is_within_window(created, RESET_TTL_HOURS, created + Duration::minutes(61)));
    }
}
