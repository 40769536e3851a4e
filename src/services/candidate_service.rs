use crate::dto::candidate_dto::{NewCandidateProfile, UpdateProfileRequest};
use crate::error::{Error, Result};
use crate::models::candidate::{Candidate, STATUS_PENDING};
use sqlx::{FromRow, PgPool, Row};
use uuid::Uuid;

const APPROVE_SQL: &str = r#"
UPDATE candidates
SET status = 'approved', admin_notes = $1, approved_at = NOW(), approved_by = $2,
    updated_at = NOW()
WHERE id = $3
RETURNING *"#;

// approved_by means "who approved this"; a rejection clears it along with
// approved_at.
const REJECT_SQL: &str = r#"
UPDATE candidates
SET status = 'rejected', admin_notes = $1, approved_at = NULL, approved_by = NULL,
    updated_at = NOW()
WHERE id = $2
RETURNING *"#;

#[derive(Clone)]
pub struct CandidateService {
    pool: PgPool,
}

impl CandidateService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as("SELECT * FROM candidates WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(candidate)
    }

    pub async fn get_by_user(&self, user_id: Uuid) -> Result<Option<Candidate>> {
        let candidate = sqlx::query_as("SELECT * FROM candidates WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(candidate)
    }

    pub async fn get_approved(&self, id: Uuid) -> Result<Option<Candidate>> {
        let candidate =
            sqlx::query_as("SELECT * FROM candidates WHERE id = $1 AND status = 'approved'")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(candidate)
    }

    /// Inserts the profile inside the caller's transaction so user + profile
    /// commit together. Status always starts at pending.
    pub async fn create_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        user_id: Uuid,
        profile: &NewCandidateProfile,
    ) -> Result<Candidate> {
        let candidate: Candidate = sqlx::query_as(
            r#"
            INSERT INTO candidates (
                user_id, full_name_en, full_name_ne,
                bio_en, bio_ne, education_en, education_ne,
                experience_en, experience_ne, manifesto_en, manifesto_ne,
                position_level, province_id, district_id, municipality_id, ward_number,
                status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, 'pending')
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(&profile.full_name_en)
        .bind(&profile.full_name_ne)
        .bind(&profile.bio_en)
        .bind(&profile.bio_ne)
        .bind(&profile.education_en)
        .bind(&profile.education_ne)
        .bind(&profile.experience_en)
        .bind(&profile.experience_ne)
        .bind(&profile.manifesto_en)
        .bind(&profile.manifesto_ne)
        .bind(&profile.position_level)
        .bind(profile.province_id)
        .bind(profile.district_id)
        .bind(profile.municipality_id)
        .bind(profile.ward_number)
        .fetch_one(&mut **tx)
        .await?;
        Ok(candidate)
    }

    /// Owner edit. Manual Nepali text clears the MT flag for that field;
    /// emptying a Nepali field clears it and its flag so the background
    /// translator can refill it. A rejected profile returns to pending.
    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: &UpdateProfileRequest,
    ) -> Result<Candidate> {
        let current = self
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| Error::NotFound("Candidate profile not found".to_string()))?;

        let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new("UPDATE candidates SET updated_at = NOW()");

        if let Some(v) = &update.full_name_en {
            qb.push(", full_name_en = ").push_bind(v);
        }
        if let Some(v) = &update.full_name_ne {
            qb.push(", full_name_ne = ").push_bind(v);
        }
        for (field, en, ne) in [
            ("bio", &update.bio_en, &update.bio_ne),
            ("education", &update.education_en, &update.education_ne),
            ("experience", &update.experience_en, &update.experience_ne),
            ("manifesto", &update.manifesto_en, &update.manifesto_ne),
        ] {
            if let Some(v) = en {
                qb.push(format!(", {}_en = ", field)).push_bind(v);
            }
            if let Some(v) = ne {
                if v.trim().is_empty() {
                    // Cleared by the owner: empty + flag off, eligible for MT.
                    qb.push(format!(", {f}_ne = NULL, is_mt_{f}_ne = FALSE", f = field));
                } else {
                    // Manually provided Nepali is never marked machine-made.
                    qb.push(format!(", {}_ne = ", field)).push_bind(v);
                    qb.push(format!(", is_mt_{}_ne = FALSE", field));
                }
            }
        }
        if let Some(v) = &update.position_level {
            qb.push(", position_level = ").push_bind(v);
        }
        if let Some(v) = update.province_id {
            qb.push(", province_id = ").push_bind(v);
        }
        if let Some(v) = update.district_id {
            qb.push(", district_id = ").push_bind(v);
        }
        if let Some(v) = update.municipality_id {
            qb.push(", municipality_id = ").push_bind(v);
        }
        if let Some(v) = update.ward_number {
            qb.push(", ward_number = ").push_bind(v);
        }
        if current.status == crate::models::candidate::STATUS_REJECTED {
            qb.push(", status = ").push_bind(STATUS_PENDING);
            qb.push(", admin_notes = NULL");
        }

        qb.push(" WHERE user_id = ").push_bind(user_id);
        qb.push(" RETURNING *");

        let candidate: Candidate = qb.build_query_as().fetch_one(&self.pool).await?;
        Ok(candidate)
    }

    /// Individual approval so the per-candidate email side effect fires; bulk
    /// moderation loops over this.
    pub async fn approve(&self, id: Uuid, admin_id: Uuid, notes: Option<&str>) -> Result<Candidate> {
        let candidate: Candidate = sqlx::query_as(APPROVE_SQL)
            .bind(notes)
            .bind(admin_id)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(candidate)
    }

    pub async fn reject(&self, id: Uuid, admin_id: Uuid, notes: &str) -> Result<Candidate> {
        let candidate: Candidate = sqlx::query_as(REJECT_SQL)
            .bind(notes)
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        tracing::debug!(candidate = %id, moderator = %admin_id, "rejection recorded");
        Ok(candidate)
    }

    pub async fn list_for_admin(
        &self,
        status: Option<&str>,
        province_id: Option<i32>,
        page: u32,
        per_page: u32,
    ) -> Result<(Vec<Candidate>, i64)> {
        let mut qb = sqlx::QueryBuilder::<sqlx::Postgres>::new(
            "SELECT *, COUNT(*) OVER () AS total FROM candidates WHERE TRUE",
        );
        if let Some(s) = status {
            qb.push(" AND status = ").push_bind(s);
        }
        if let Some(p) = province_id {
            qb.push(" AND province_id = ").push_bind(p);
        }
        qb.push(" ORDER BY created_at DESC");
        qb.push(" LIMIT ").push_bind(per_page as i64);
        qb.push(" OFFSET ")
            .push_bind((page.max(1) as i64 - 1) * per_page as i64);

        let rows = qb.build().fetch_all(&self.pool).await?;
        let mut total = 0i64;
        let mut candidates = Vec::with_capacity(rows.len());
        for row in rows {
            total = row.try_get("total")?;
            candidates.push(Candidate::from_row(&row)?);
        }
        Ok((candidates, total))
    }

    pub async fn get_user_email(&self, user_id: Uuid) -> Result<Option<(String, String)>> {
        let row = sqlx::query("SELECT email, username FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(match row {
            Some(r) => Some((r.try_get("email")?, r.try_get("username")?)),
            None => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_clears_approval_metadata() {
        assert!(REJECT_SQL.contains("approved_at = NULL"));
        assert!(REJECT_SQL.contains("approved_by = NULL"));
        assert!(APPROVE_SQL.contains("approved_at = NOW()"));
        assert!(APPROVE_SQL.contains("approved_by = $2"));
    }
}
