use crate::dto::candidate_dto::{CandidateCard, Paged};
use crate::models::location::ResolvedLocation;
use serde::{Deserialize, Serialize};

fn default_page() -> u32 {
    1
}
fn default_per_page() -> u32 {
    10
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeedQuery {
    pub q: Option<String>,
    pub province_id: Option<i32>,
    pub district_id: Option<i32>,
    pub municipality_id: Option<i32>,
    pub ward: Option<i32>,
    pub position: Option<String>,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BallotQuery {
    pub lat: f64,
    pub lng: f64,
    #[serde(default = "default_page")]
    pub page: u32,
    #[serde(default = "default_per_page")]
    pub per_page: u32,
}

/// Ballot payload: where the voter is, and who is on their ballot there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BallotResponse {
    pub location: ResolvedLocation,
    pub candidates: Paged<CandidateCard>,
}

/// Public candidate card detail (full bilingual profile of an approved
/// candidate).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicCandidateDetail {
    pub id: uuid::Uuid,
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
    pub approved_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl From<crate::models::candidate::Candidate> for PublicCandidateDetail {
    fn from(c: crate::models::candidate::Candidate) -> Self {
        Self {
            id: c.id,
            full_name_en: c.full_name_en,
            full_name_ne: c.full_name_ne,
            bio_en: c.bio_en,
            bio_ne: c.bio_ne,
            is_mt_bio_ne: c.is_mt_bio_ne,
            education_en: c.education_en,
            education_ne: c.education_ne,
            is_mt_education_ne: c.is_mt_education_ne,
            experience_en: c.experience_en,
            experience_ne: c.experience_ne,
            is_mt_experience_ne: c.is_mt_experience_ne,
            manifesto_en: c.manifesto_en,
            manifesto_ne: c.manifesto_ne,
            is_mt_manifesto_ne: c.is_mt_manifesto_ne,
            position_level: c.position_level,
            province_id: c.province_id,
            district_id: c.district_id,
            municipality_id: c.municipality_id,
            ward_number: c.ward_number,
            approved_at: c.approved_at,
        }
    }
}
