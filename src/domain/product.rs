//! Product rows, embedded review rows, and the aggregation law.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::catalog::{Category, ProductType};
use crate::error::{ApiError, ApiResult};

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub sold: i32,
    /// Mean of all review ratings, one decimal. 0 when unreviewed.
    pub ratings: f64,
    pub review_count: i64,
    pub type_id: Uuid,
    pub category_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Review {
    pub id: Uuid,
    pub product_id: Uuid,
    pub user_id: Uuid,
    pub rating: f64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Validated input for a product write, ready for persistence once the
/// catalog references have been checked.
#[derive(Clone, Debug)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: i32,
    pub type_id: Uuid,
    pub category_id: Uuid,
    pub is_active: bool,
}

/// Lite projection for similar-product strips.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct ProductLite {
    pub id: Uuid,
    pub name: String,
    pub price: Decimal,
    pub ratings: f64,
}

/// Mean of the given ratings rounded to one decimal; 0 for no reviews.
pub fn aggregate_rating(ratings: &[f64]) -> f64 {
    if ratings.is_empty() {
        return 0.0;
    }
    let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;
    (mean * 10.0).round() / 10.0
}

/// Referential checks run before a product write, over rows the caller
/// already fetched: the type must be active, the category must be active,
/// and the category must belong to the type.
pub fn check_catalog_refs(ptype: &ProductType, category: &Category) -> ApiResult<()> {
    if !ptype.is_active {
        return Err(ApiError::validation(
            "VALIDATION_ERROR",
            "cannot attach a product to an inactive type",
        ));
    }
    if !category.is_active {
        return Err(ApiError::validation(
            "VALIDATION_ERROR",
            "cannot attach a product to an inactive category",
        ));
    }
    if category.type_id != ptype.id {
        return Err(ApiError::validation(
            "VALIDATION_ERROR",
            "category does not belong to the selected type",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ptype(active: bool) -> ProductType {
        ProductType {
            id: Uuid::new_v4(),
            name: "women".into(),
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn category(type_id: Uuid, active: bool) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: "dresses".into(),
            type_id,
            is_active: active,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_aggregate_rating() {
        assert_eq!(aggregate_rating(&[]), 0.0);
        assert_eq!(aggregate_rating(&[4.5]), 4.5);
        assert_eq!(aggregate_rating(&[4.5, 2.0]), 3.3);
        assert_eq!(aggregate_rating(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        // round(mean * 10) / 10, not truncation
        assert_eq!(aggregate_rating(&[5.0, 4.5, 4.5]), 4.7);
    }

    #[test]
    fn test_catalog_refs_ok() {
        let t = ptype(true);
        let c = category(t.id, true);
        assert!(check_catalog_refs(&t, &c).is_ok());
    }

    #[test]
    fn test_catalog_refs_rejections() {
        let t = ptype(false);
        let c = category(t.id, true);
        assert!(check_catalog_refs(&t, &c).is_err());

        let t = ptype(true);
        let c = category(t.id, false);
        assert!(check_catalog_refs(&t, &c).is_err());

        let t = ptype(true);
        let c = category(Uuid::new_v4(), true);
        assert!(check_catalog_refs(&t, &c).is_err());
    }
}
