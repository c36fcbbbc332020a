//! Catalog filter builder: query parameters in, a count query and a
//! deterministic page query out.
//!
//! Both queries are grown from one shared condition set so the total and
//! the page can never disagree about which products are in scope.

use rust_decimal::Decimal;
use serde::Deserialize;
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::sanitize;

const PRODUCT_COLUMNS: &str = "id, name, description, price, stock, sold, ratings, review_count, \
     type_id, category_id, is_active, created_at, updated_at";

/// Raw catalog query string, exactly as the client sent it.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct CatalogParams {
    #[serde(rename = "type")]
    pub type_name: Option<String>,
    pub keyword: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "price[gt]")]
    pub price_gt: Option<String>,
    #[serde(rename = "price[lt]")]
    pub price_lt: Option<String>,
    #[serde(rename = "ratings[gte]")]
    pub ratings_gte: Option<String>,
    pub page: Option<String>,
}

/// Validated filter set for one resolved type.
#[derive(Clone, Debug)]
pub struct CatalogFilter {
    pub type_id: Uuid,
    pub keyword: Option<String>,
    pub category: Option<Uuid>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
    pub min_rating: Option<f64>,
    pub page: u32,
}

impl CatalogFilter {
    /// Normalize raw parameters against an already-resolved type.
    pub fn from_params(params: &CatalogParams, type_id: Uuid) -> ApiResult<Self> {
        let keyword = match params.keyword.as_deref() {
            Some(raw) => sanitize::sanitize_keyword(raw)?,
            None => None,
        };
        let category = match params.category.as_deref().map(str::trim) {
            Some("") | None => None,
            Some(raw) => Some(sanitize::parse_id(raw)?),
        };
        let price_min = match params.price_gt.as_deref() {
            Some(raw) => Some(sanitize::parse_price("price[gt]", raw)?),
            None => None,
        };
        let price_max = match params.price_lt.as_deref() {
            Some(raw) => Some(sanitize::parse_price("price[lt]", raw)?),
            None => None,
        };
        if let (Some(min), Some(max)) = (price_min, price_max) {
            if min > max {
                return Err(ApiError::validation(
                    "VALIDATION_ERROR",
                    "price[gt] must not exceed price[lt]",
                ));
            }
        }
        let min_rating = match params.ratings_gte.as_deref() {
            Some(raw) => Some(sanitize::parse_min_rating(raw)?),
            None => None,
        };
        let page = match params.page.as_deref() {
            Some(raw) => sanitize::parse_page(raw)?,
            None => 1,
        };
        Ok(Self { type_id, keyword, category, price_min, price_max, min_rating, page })
    }

    fn push_conditions(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE type_id = ").push_bind(self.type_id);
        qb.push(" AND is_active = TRUE");
        if let Some(keyword) = &self.keyword {
            qb.push(" AND name ILIKE ")
                .push_bind(format!("%{}%", escape_like(keyword)));
        }
        if let Some(category) = self.category {
            qb.push(" AND category_id = ").push_bind(category);
        }
        if let Some(min) = self.price_min {
            qb.push(" AND price >= ").push_bind(min);
        }
        if let Some(max) = self.price_max {
            qb.push(" AND price <= ").push_bind(max);
        }
        if let Some(rating) = self.min_rating {
            qb.push(" AND ratings >= ").push_bind(rating);
        }
    }

    pub fn count_query(&self) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM products");
        self.push_conditions(&mut qb);
        qb
    }

    /// Page query ordered by `(created_at, id)` descending. The id
    /// tiebreaker keeps the order total, so sequential pages neither
    /// repeat nor skip rows absent intervening writes.
    pub fn page_query(&self, per_page: u32) -> QueryBuilder<'_, Postgres> {
        let mut qb = QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products"));
        self.push_conditions(&mut qb);
        qb.push(" ORDER BY created_at DESC, id DESC");
        qb.push(" LIMIT ").push_bind(per_page as i64);
        qb.push(" OFFSET ")
            .push_bind((self.page.saturating_sub(1) as i64) * per_page as i64);
        qb
    }
}

/// `ceil(total / per_page)`; a page past this yields an empty list.
pub fn total_pages(total: i64, per_page: u32) -> u32 {
    let total = total.max(0) as u64;
    let per_page = per_page.max(1) as u64;
    total.div_ceil(per_page) as u32
}

fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_filter() -> CatalogFilter {
        CatalogFilter {
            type_id: Uuid::new_v4(),
            keyword: None,
            category: None,
            price_min: None,
            price_max: None,
            min_rating: None,
            page: 1,
        }
    }

    #[test]
    fn test_bare_filter_sql() {
        let filter = base_filter();
        let sql = filter.count_query().into_sql();
        assert_eq!(sql, "SELECT COUNT(*) FROM products WHERE type_id = $1 AND is_active = TRUE");
    }

    #[test]
    fn test_all_conditions_appear() {
        let mut filter = base_filter();
        filter.keyword = Some("shirt".into());
        filter.category = Some(Uuid::new_v4());
        filter.price_min = Some(Decimal::new(1000, 2));
        filter.price_max = Some(Decimal::new(5000, 2));
        filter.min_rating = Some(4.0);
        let sql = filter.count_query().into_sql();
        assert!(sql.contains("name ILIKE"));
        assert!(sql.contains("category_id ="));
        assert!(sql.contains("price >="));
        assert!(sql.contains("price <="));
        assert!(sql.contains("ratings >="));
    }

    #[test]
    fn test_page_query_is_deterministic_and_paged() {
        let mut filter = base_filter();
        filter.page = 3;
        let sql = filter.page_query(2).into_sql();
        assert!(sql.contains("ORDER BY created_at DESC, id DESC"));
        assert!(sql.contains("LIMIT"));
        assert!(sql.contains("OFFSET"));
        // Identical filters must render identical SQL.
        assert_eq!(sql, filter.page_query(2).into_sql());
    }

    #[test]
    fn test_total_pages_law() {
        assert_eq!(total_pages(0, 2), 0);
        assert_eq!(total_pages(1, 2), 1);
        assert_eq!(total_pages(2, 2), 1);
        assert_eq!(total_pages(3, 2), 2);
        assert_eq!(total_pages(7, 2), 4);
        assert_eq!(total_pages(7, 50), 1);
    }

    #[test]
    fn test_from_params_defaults() {
        let filter = CatalogFilter::from_params(&CatalogParams::default(), Uuid::new_v4()).unwrap();
        assert_eq!(filter.page, 1);
        assert!(filter.keyword.is_none());
        assert!(filter.category.is_none());
    }

    #[test]
    fn test_from_params_price_window_order() {
        let params = CatalogParams {
            price_gt: Some("50".into()),
            price_lt: Some("20".into()),
            ..Default::default()
        };
        let err = CatalogFilter::from_params(&params, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");
    }

    #[test]
    fn test_from_params_bad_category() {
        let params = CatalogParams { category: Some("not-an-id".into()), ..Default::default() };
        let err = CatalogFilter::from_params(&params, Uuid::new_v4()).unwrap_err();
        assert_eq!(err.code(), "INVALID_ID");
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%_a\\b"), "100\\%\\_a\\\\b");
    }
}
