use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Province {
    pub id: i32,
    pub name_en: String,
    pub name_ne: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct District {
    pub id: i32,
    pub province_id: i32,
    pub name_en: String,
    pub name_ne: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Municipality {
    pub id: i32,
    pub district_id: i32,
    pub name_en: String,
    pub name_ne: String,
    pub ward_count: i32,
    pub centroid_lat: f64,
    pub centroid_lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Ward {
    pub municipality_id: i32,
    pub ward_number: i32,
    pub centroid_lat: Option<f64>,
    pub centroid_lng: Option<f64>,
}

/// A GPS fix resolved to the administrative hierarchy. Carries no
/// coordinates; the fix itself is request-scoped and never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedLocation {
    pub province_id: i32,
    pub province_name_en: String,
    pub province_name_ne: String,
    pub district_id: i32,
    pub district_name_en: String,
    pub district_name_ne: String,
    pub municipality_id: i32,
    pub municipality_name_en: String,
    pub municipality_name_ne: String,
    pub ward_number: Option<i32>,
}
