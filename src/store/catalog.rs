//! Type and category reference data.

use uuid::Uuid;

use crate::domain::{Category, CategorySummary, ProductType, MAX_PRODUCT_TYPES};
use crate::error::{ApiError, ApiResult};
use crate::store::Store;

impl Store {
    /// Resolve an active type by its public name.
    pub async fn find_active_type(&self, name: &str) -> ApiResult<ProductType> {
        self.timed("find_active_type", async {
            sqlx::query_as::<_, ProductType>(
                "SELECT * FROM types WHERE name = $1 AND is_active = TRUE",
            )
            .bind(name)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(ApiError::TypeNotFound)
        })
        .await
    }

    /// Active categories of a type, name-sorted for stable menus.
    pub async fn active_categories(&self, type_id: Uuid) -> ApiResult<Vec<CategorySummary>> {
        self.timed("active_categories", async {
            let rows = sqlx::query_as::<_, CategorySummary>(
                "SELECT id, name FROM categories WHERE type_id = $1 AND is_active = TRUE ORDER BY name",
            )
            .bind(type_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Create a type, holding the table lock long enough to enforce the
    /// cap of `MAX_PRODUCT_TYPES` concurrent rows.
    pub async fn create_type(&self, name: &str, is_active: bool) -> ApiResult<ProductType> {
        self.timed("create_type", async {
            let mut tx = self.pool.begin().await?;
            sqlx::query("LOCK TABLE types IN SHARE ROW EXCLUSIVE MODE")
                .execute(&mut *tx)
                .await?;
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM types")
                .fetch_one(&mut *tx)
                .await?;
            if count >= MAX_PRODUCT_TYPES {
                return Err(ApiError::validation(
                    "VALIDATION_ERROR",
                    format!("type limit reached ({MAX_PRODUCT_TYPES}); remove one before adding another"),
                ));
            }
            let ptype = sqlx::query_as::<_, ProductType>(
                "INSERT INTO types (id, name, is_active) VALUES ($1, $2, $3) RETURNING *",
            )
            .bind(Uuid::now_v7())
            .bind(name)
            .bind(is_active)
            .fetch_one(&mut *tx)
            .await?;
            tx.commit().await?;
            Ok(ptype)
        })
        .await
    }

    /// Create a category under an active type.
    pub async fn create_category(
        &self,
        name: &str,
        type_id: Uuid,
        is_active: bool,
    ) -> ApiResult<Category> {
        self.timed("create_category", async {
            let ptype = sqlx::query_as::<_, ProductType>("SELECT * FROM types WHERE id = $1")
                .bind(type_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(ApiError::TypeNotFound)?;
            if !ptype.is_active {
                return Err(ApiError::validation(
                    "VALIDATION_ERROR",
                    "cannot attach a category to an inactive type",
                ));
            }
            let category = sqlx::query_as::<_, Category>(
                "INSERT INTO categories (id, name, type_id, is_active) VALUES ($1, $2, $3, $4) RETURNING *",
            )
            .bind(Uuid::now_v7())
            .bind(name)
            .bind(type_id)
            .bind(is_active)
            .fetch_one(&self.pool)
            .await?;
            Ok(category)
        })
        .await
    }
}
