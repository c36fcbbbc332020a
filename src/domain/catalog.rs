//! Catalog reference data: types and their categories.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hard cap on concurrently existing types.
pub const MAX_PRODUCT_TYPES: i64 = 3;

/// Top-level catalog partition ("men", "women", ...).
#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct ProductType {
    pub id: Uuid,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub type_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection returned alongside catalog pages.
#[derive(Clone, Debug, Serialize, sqlx::FromRow)]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
}
