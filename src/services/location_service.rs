use crate::error::{Error, Result};
use crate::models::location::{District, Municipality, Province, ResolvedLocation, Ward};
use sqlx::{PgPool, Row};

/// A GPS fix further than this from every municipality centroid is treated
/// as outside the covered area.
const MAX_RESOLVE_DISTANCE_KM: f64 = 30.0;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two WGS84 points, in kilometers.
pub fn haversine_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}

pub fn is_valid_coordinate(lat: f64, lng: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

/// Nearest ward among those with surveyed centroids; wards without a
/// centroid never match.
pub fn nearest_ward(wards: &[Ward], lat: f64, lng: f64) -> Option<i32> {
    let mut best: Option<(i32, f64)> = None;
    for ward in wards {
        let (Some(w_lat), Some(w_lng)) = (ward.centroid_lat, ward.centroid_lng) else {
            continue;
        };
        let d = haversine_km(lat, lng, w_lat, w_lng);
        if best.map(|(_, bd)| d < bd).unwrap_or(true) {
            best = Some((ward.ward_number, d));
        }
    }
    best.map(|(n, _)| n)
}

#[derive(Clone)]
pub struct LocationService {
    pool: PgPool,
}

impl LocationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_provinces(&self) -> Result<Vec<Province>> {
        let provinces = sqlx::query_as("SELECT * FROM provinces ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(provinces)
    }

    pub async fn districts_of(&self, province_id: i32) -> Result<Vec<District>> {
        let districts =
            sqlx::query_as("SELECT * FROM districts WHERE province_id = $1 ORDER BY name_en")
                .bind(province_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(districts)
    }

    pub async fn municipalities_of(&self, district_id: i32) -> Result<Vec<Municipality>> {
        let municipalities =
            sqlx::query_as("SELECT * FROM municipalities WHERE district_id = $1 ORDER BY name_en")
                .bind(district_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(municipalities)
    }

    /// Ward numbers of a municipality: 1..=ward_count.
    pub async fn wards_of(&self, municipality_id: i32) -> Result<Vec<i32>> {
        let row = sqlx::query("SELECT ward_count FROM municipalities WHERE id = $1")
            .bind(municipality_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| Error::NotFound("Municipality not found".to_string()))?;
        let count: i32 = row.try_get("ward_count")?;
        Ok((1..=count).collect())
    }

    /// A candidate's location must be one consistent branch of the tree:
    /// municipality in district, district in province, ward within range.
    pub async fn validate_branch(
        &self,
        province_id: i32,
        district_id: i32,
        municipality_id: i32,
        ward_number: i32,
    ) -> Result<()> {
        let row = sqlx::query(
            r#"
            SELECT m.ward_count, d.province_id
            FROM municipalities m
            JOIN districts d ON d.id = m.district_id
            WHERE m.id = $1 AND m.district_id = $2
            "#,
        )
        .bind(municipality_id)
        .bind(district_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            Error::BadRequest("Municipality does not belong to the given district".to_string())
        })?;

        let actual_province: i32 = row.try_get("province_id")?;
        if actual_province != province_id {
            return Err(Error::BadRequest(
                "District does not belong to the given province".to_string(),
            ));
        }
        let ward_count: i32 = row.try_get("ward_count")?;
        if ward_number < 1 || ward_number > ward_count {
            return Err(Error::BadRequest(format!(
                "Ward number must be between 1 and {}",
                ward_count
            )));
        }
        Ok(())
    }

    /// Resolves a GPS fix to the administrative hierarchy. The coordinates
    /// are request-scoped only; nothing here writes them anywhere, including
    /// the logs.
    pub async fn resolve(&self, lat: f64, lng: f64) -> Result<Option<ResolvedLocation>> {
        if !is_valid_coordinate(lat, lng) {
            return Err(Error::BadRequest("Invalid coordinates".to_string()));
        }

        let row = sqlx::query(
            r#"
            SELECT m.id AS municipality_id, m.name_en AS municipality_name_en,
                   m.name_ne AS municipality_name_ne,
                   d.id AS district_id, d.name_en AS district_name_en, d.name_ne AS district_name_ne,
                   p.id AS province_id, p.name_en AS province_name_en, p.name_ne AS province_name_ne,
                   2 * 6371.0 * asin(sqrt(
                       power(sin(radians(($1 - m.centroid_lat) / 2)), 2) +
                       cos(radians($1)) * cos(radians(m.centroid_lat)) *
                       power(sin(radians(($2 - m.centroid_lng) / 2)), 2)
                   )) AS distance_km
            FROM municipalities m
            JOIN districts d ON d.id = m.district_id
            JOIN provinces p ON p.id = d.province_id
            ORDER BY distance_km ASC
            LIMIT 1
            "#,
        )
        .bind(lat)
        .bind(lng)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };
        let distance_km: f64 = row.try_get("distance_km")?;
        if distance_km > MAX_RESOLVE_DISTANCE_KM {
            return Ok(None);
        }

        let municipality_id: i32 = row.try_get("municipality_id")?;
        let ward_number = self.resolve_ward(municipality_id, lat, lng).await?;

        let resolved = ResolvedLocation {
            province_id: row.try_get("province_id")?,
            province_name_en: row.try_get("province_name_en")?,
            province_name_ne: row.try_get("province_name_ne")?,
            district_id: row.try_get("district_id")?,
            district_name_en: row.try_get("district_name_en")?,
            district_name_ne: row.try_get("district_name_ne")?,
            municipality_id,
            municipality_name_en: row.try_get("municipality_name_en")?,
            municipality_name_ne: row.try_get("municipality_name_ne")?,
            ward_number,
        };
        tracing::debug!(
            municipality_id = resolved.municipality_id,
            ward = ?resolved.ward_number,
            "resolved GPS fix to administrative unit"
        );
        Ok(Some(resolved))
    }

    /// Nearest ward centroid within the municipality, when centroids are
    /// loaded; municipalities without ward centroids resolve to municipality
    /// level only.
    async fn resolve_ward(&self, municipality_id: i32, lat: f64, lng: f64) -> Result<Option<i32>> {
        let wards: Vec<Ward> =
            sqlx::query_as("SELECT * FROM wards WHERE municipality_id = $1")
                .bind(municipality_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(nearest_ward(&wards, lat, lng))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_known_distances() {
        // Kathmandu -> Pokhara, roughly 145 km
        let d = haversine_km(27.7172, 85.3240, 28.2096, 83.9856);
        assert!((140.0..160.0).contains(&d), "got {}", d);
        // zero distance
        assert!(haversine_km(27.7, 85.3, 27.7, 85.3) < 1e-9);
    }

    fn ward(number: i32, centroid: Option<(f64, f64)>) -> Ward {
        Ward {
            municipality_id: 1001,
            ward_number: number,
            centroid_lat: centroid.map(|c| c.0),
            centroid_lng: centroid.map(|c| c.1),
        }
    }

    #[test]
    fn nearest_ward_picks_closest_surveyed_centroid() {
        let wards = vec![
            ward(7, Some((27.7295, 85.3440))),
            ward(15, Some((27.7104, 85.3095))),
            ward(9, None),
        ];
        // just next to ward 15's centroid
        assert_eq!(nearest_ward(&wards, 27.7110, 85.3100), Some(15));
        // and near ward 7's
        assert_eq!(nearest_ward(&wards, 27.7290, 85.3435), Some(7));
    }

    #[test]
    fn nearest_ward_is_none_without_surveyed_centroids() {
        let wards = vec![ward(1, None), ward(2, None)];
        assert_eq!(nearest_ward(&wards, 27.7, 85.3), None);
        assert_eq!(nearest_ward(&[], 27.7, 85.3), None);
    }

    #[test]
    fn coordinate_validation() {
        assert!(is_valid_coordinate(27.7, 85.3));
        assert!(!is_valid_coordinate(91.0, 85.3));
        assert!(!is_valid_coordinate(27.7, 181.0));
        assert!(!is_valid_coordinate(-91.0, 0.0));
    }
}
