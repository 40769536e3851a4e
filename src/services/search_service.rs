use crate::dto::candidate_dto::CandidateCard;
use crate::error::Result;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder, Row};

/// Filters for the public candidate feed. All of them compose with either
/// ordering; only approved candidates are ever selected.
#[derive(Debug, Clone, Default)]
pub struct FeedFilters {
    pub q: Option<String>,
    pub province_id: Option<i32>,
    pub district_id: Option<i32>,
    pub municipality_id: Option<i32>,
    pub ward_number: Option<i32>,
    pub position_level: Option<String>,
    pub page: u32,
    pub per_page: u32,
}

impl FeedFilters {
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.per_page = self.per_page.clamp(1, 50);
        self.q = self.q.and_then(|q| {
            let q = q.trim().to_string();
            if q.is_empty() {
                None
            } else {
                Some(q)
            }
        });
        self
    }
}

const SEARCH_VECTOR: &str = "to_tsvector('simple', \
    c.full_name_en || ' ' || coalesce(c.full_name_ne, '') || ' ' || \
    c.bio_en || ' ' || coalesce(c.bio_ne, '') || ' ' || \
    c.education_en || ' ' || coalesce(c.education_ne, '') || ' ' || \
    c.experience_en || ' ' || coalesce(c.experience_ne, '') || ' ' || \
    c.manifesto_en || ' ' || coalesce(c.manifesto_ne, ''))";

/// Builds the feed query. With a search term the ordering is relevance rank
/// (`ts_rank`) with a highlighted snippet; without one it is reverse
/// chronological. Location/position filters are WHERE clauses only, so they
/// never perturb whichever ordering is active.
pub fn build_feed_query(filters: &FeedFilters) -> QueryBuilder<'_, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT c.id, c.full_name_en, c.full_name_ne, c.position_level, \
         c.province_id, c.district_id, c.municipality_id, c.ward_number, \
         m.name_en AS municipality_name_en, m.name_ne AS municipality_name_ne, \
         c.created_at, COUNT(*) OVER () AS total",
    );

    if let Some(q) = &filters.q {
        qb.push(", ts_headline('simple', c.bio_en || ' ' || c.manifesto_en, websearch_to_tsquery('simple', ");
        qb.push_bind(q);
        qb.push("), 'StartSel=<mark>, StopSel=</mark>, MaxWords=30') AS snippet");
    } else {
        qb.push(", NULL::text AS snippet");
    }

    qb.push(
        " FROM candidates c JOIN municipalities m ON m.id = c.municipality_id \
         WHERE c.status = 'approved'",
    );

    if let Some(q) = &filters.q {
        qb.push(" AND ");
        qb.push(SEARCH_VECTOR);
        qb.push(" @@ websearch_to_tsquery('simple', ");
        qb.push_bind(q);
        qb.push(")");
    }
    if let Some(v) = filters.province_id {
        qb.push(" AND c.province_id = ").push_bind(v);
    }
    if let Some(v) = filters.district_id {
        qb.push(" AND c.district_id = ").push_bind(v);
    }
    if let Some(v) = filters.municipality_id {
        qb.push(" AND c.municipality_id = ").push_bind(v);
    }
    if let Some(v) = filters.ward_number {
        qb.push(" AND c.ward_number = ").push_bind(v);
    }
    if let Some(v) = &filters.position_level {
        qb.push(" AND c.position_level = ").push_bind(v);
    }

    if let Some(q) = &filters.q {
        qb.push(" ORDER BY ts_rank(");
        qb.push(SEARCH_VECTOR);
        qb.push(", websearch_to_tsquery('simple', ");
        qb.push_bind(q);
        qb.push(")) DESC, c.created_at DESC");
    } else {
        qb.push(" ORDER BY c.created_at DESC");
    }

    qb.push(" LIMIT ").push_bind(filters.per_page as i64);
    qb.push(" OFFSET ")
        .push_bind((filters.page as i64 - 1) * filters.per_page as i64);
    qb
}

#[derive(Clone)]
pub struct SearchService {
    pool: PgPool,
}

impl SearchService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn feed(&self, filters: &FeedFilters) -> Result<(Vec<CandidateCard>, i64)> {
        let mut qb = build_feed_query(filters);
        let rows = qb.build().fetch_all(&self.pool).await?;

        let mut total = 0i64;
        let mut cards = Vec::with_capacity(rows.len());
        for row in rows {
            total = row.try_get("total")?;
            cards.push(CandidateCard::from_row(&row)?);
        }
        Ok((cards, total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filters(q: Option<&str>) -> FeedFilters {
        FeedFilters {
            q: q.map(|s| s.to_string()),
            page: 1,
            per_page: 10,
            ..Default::default()
        }
        .normalized()
    }

    #[test]
    fn ranked_ordering_when_query_present() {
        let f = filters(Some("health policy"));
        let qb = build_feed_query(&f);
        let sql = qb.sql();
        assert!(sql.contains("ORDER BY ts_rank("));
        assert!(sql.contains("ts_headline("));
        assert!(sql.contains("status = 'approved'"));
    }

    #[test]
    fn chronological_ordering_without_query() {
        let f = filters(None);
        let qb = build_feed_query(&f);
        let sql = qb.sql();
        assert!(sql.contains("ORDER BY c.created_at DESC"));
        assert!(!sql.contains("ts_rank"));
    }

    #[test]
    fn filters_do_not_change_ordering() {
        let mut f = filters(Some("education"));
        f.province_id = Some(3);
        f.ward_number = Some(4);
        f.position_level = Some("mayor".to_string());
        let with_filters = build_feed_query(&f);
        let sql = with_filters.sql();

        let plain_filters = filters(Some("education"));
        let plain = build_feed_query(&plain_filters);
        let order_of = |s: &str| s[s.find("ORDER BY").unwrap()..s.find(" LIMIT").unwrap()].to_string();
        assert_eq!(order_of(sql), order_of(plain.sql()));
        assert!(sql.contains("c.province_id = "));
        assert!(sql.contains("c.ward_number = "));
    }

    #[test]
    fn offset_survives_maximum_page_number() {
        // page comes straight from the query string; the offset math must not
        // wrap however large it gets.
        let f = FeedFilters {
            page: u32::MAX,
            per_page: 50,
            ..Default::default()
        }
        .normalized();
        let qb = build_feed_query(&f);
        assert!(qb.sql().contains("OFFSET"));
    }

    #[test]
    fn normalization_clamps_paging_and_blank_query() {
        let f = FeedFilters {
            q: Some("   ".into()),
            page: 0,
            per_page: 500,
            ..Default::default()
        }
        .normalized();
        assert_eq!(f.page, 1);
        assert_eq!(f.per_page, 50);
        assert!(f.q.is_none());
    }
}
