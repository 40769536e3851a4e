use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Validated, sanitized profile input ready for insertion.
#[derive(Debug, Clone)]
pub struct NewCandidateProfile {
    pub full_name_en: String,
    pub full_name_ne: Option<String>,
    pub bio_en: String,
    pub bio_ne: Option<String>,
    pub education_en: String,
    pub education_ne: Option<String>,
    pub experience_en: String,
    pub experience_ne: Option<String>,
    pub manifesto_en: String,
    pub manifesto_ne: Option<String>,
    pub position_level: String,
    pub province_id: i32,
    pub district_id: i32,
    pub municipality_id: i32,
    pub ward_number: i32,
}

/// Owner edit. All fields optional; a present-but-empty `_ne` field means
/// "clear it and let machine translation refill".
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 2, max = 120))]
    pub full_name_en: Option<String>,
    pub full_name_ne: Option<String>,
    #[validate(length(min = 10, max = 2000))]
    pub bio_en: Option<String>,
    pub bio_ne: Option<String>,
    #[validate(length(min = 2, max = 2000))]
    pub education_en: Option<String>,
    pub education_ne: Option<String>,
    #[validate(length(min = 2, max = 2000))]
    pub experience_en: Option<String>,
    pub experience_ne: Option<String>,
    #[validate(length(min = 20, max = 10000))]
    pub manifesto_en: Option<String>,
    pub manifesto_ne: Option<String>,
    pub position_level: Option<String>,
    pub province_id: Option<i32>,
    pub district_id: Option<i32>,
    pub municipality_id: Option<i32>,
    pub ward_number: Option<i32>,
}

impl UpdateProfileRequest {
    pub fn touches_location(&self) -> bool {
        self.province_id.is_some()
            || self.district_id.is_some()
            || self.municipality_id.is_some()
            || self.ward_number.is_some()
    }
}

/// Public feed/ballot card. Never carries moderation fields or owner contact
/// details.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateCard {
    pub id: Uuid,
    pub full_name_en: String,
    pub full_name_ne: Option<String>,
    pub position_level: String,
    pub province_id: i32,
    pub district_id: i32,
    pub municipality_id: i32,
    pub ward_number: i32,
    pub municipality_name_en: String,
    pub municipality_name_ne: String,
    pub created_at: DateTime<Utc>,
    pub snippet: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationRequest {
    pub notes: Option<String>,
}
