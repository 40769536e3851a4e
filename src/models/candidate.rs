use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_PENDING: &str = "pending";
pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";

pub const POSITION_LEVELS: &[&str] = &["federal", "provincial", "mayor", "ward"];

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Candidate {
    pub id: Uuid,
    pub user_id: Uuid,
    pub full_name_en: String,
    pub full_name_ne: Option<String>,
    pub bio_en: String,
    pub bio_ne: Option<String>,
    pub is_mt_bio_ne: bool,
    pub education_en: String,
    pub education_ne: Option<String>,
    pub is_mt_education_ne: bool,
    pub experience_en: String,
    pub experience_ne: Option<String>,
    pub is_mt_experience_ne: bool,
    pub manifesto_en: String,
    pub manifesto_ne: Option<String>,
    pub is_mt_manifesto_ne: bool,
    pub position_level: String,
    pub province_id: i32,
    pub district_id: i32,
    pub municipality_id: i32,
    pub ward_number: i32,
    pub status: String,
    pub admin_notes: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approved_by: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Candidate {
    pub fn is_approved(&self) -> bool {
        self.status == STATUS_APPROVED
    }
}

pub fn is_valid_status(status: &str) -> bool {
    matches!(status, STATUS_PENDING | STATUS_APPROVED | STATUS_REJECTED)
}

pub fn is_valid_position_level(level: &str) -> bool {
    POSITION_LEVELS.contains(&level)
}

/// The four bilingual field pairs subject to machine translation.
pub const MT_FIELDS: &[&str] = &["bio", "education", "experience", "manifesto"];

/// MT provenance flag value for a freshly machine-translated field: true only
/// when the produced Nepali text is non-empty and actually differs from the
/// English source.
pub fn mt_flag_for(source_en: &str, produced_ne: &str) -> bool {
    let ne = produced_ne.trim();
    !ne.is_empty() && ne != source_en.trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mt_flag_requires_distinct_nonempty_translation() {
        assert!(mt_flag_for("hello", "नमस्ते"));
        assert!(!mt_flag_for("hello", ""));
        assert!(!mt_flag_for("hello", "   "));
        // API echoing the source back is not a translation
        assert!(!mt_flag_for("hello", "hello"));
        assert!(!mt_flag_for(" hello ", "hello"));
    }

    #[test]
    fn status_and_position_validation() {
        assert!(is_valid_status("pending"));
        assert!(is_valid_status("approved"));
        assert!(is_valid_status("rejected"));
        assert!(!is_valid_status("draft"));

        assert!(is_valid_position_level("federal"));
        assert!(is_valid_position_level("ward"));
        assert!(!is_valid_position_level("senate"));
    }
}
