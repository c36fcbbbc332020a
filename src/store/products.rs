//! Product reads and catalog-managed writes.

use uuid::Uuid;

use crate::domain::{check_catalog_refs, Category, NewProduct, Product, ProductLite, ProductType, Review};
use crate::error::{ApiError, ApiResult};
use crate::filters::CatalogFilter;
use crate::sanitize;
use crate::store::Store;

impl Store {
    /// Execute a catalog filter: the matching page and the total count.
    pub async fn catalog_page(
        &self,
        filter: &CatalogFilter,
        per_page: u32,
    ) -> ApiResult<(Vec<Product>, i64)> {
        self.timed("catalog_page", async {
            let total: i64 = filter
                .count_query()
                .build_query_scalar()
                .fetch_one(&self.pool)
                .await?;
            let products = filter
                .page_query(per_page)
                .build_query_as::<Product>()
                .fetch_all(&self.pool)
                .await?;
            Ok((products, total))
        })
        .await
    }

    pub async fn find_product(&self, id: Uuid) -> ApiResult<Product> {
        self.timed("find_product", async {
            sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(ApiError::ProductNotFound)
        })
        .await
    }

    /// Reviews of one product, newest first.
    pub async fn product_reviews(&self, product_id: Uuid) -> ApiResult<Vec<Review>> {
        self.timed("product_reviews", async {
            let rows = sqlx::query_as::<_, Review>(
                "SELECT * FROM reviews WHERE product_id = $1 ORDER BY created_at DESC, id DESC",
            )
            .bind(product_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Active products sharing a category, excluding the product itself.
    pub async fn similar_products(
        &self,
        category_id: Uuid,
        exclude: Uuid,
        limit: i64,
    ) -> ApiResult<Vec<ProductLite>> {
        self.timed("similar_products", async {
            let rows = sqlx::query_as::<_, ProductLite>(
                "SELECT id, name, price, ratings FROM products \
                 WHERE category_id = $1 AND id <> $2 AND is_active = TRUE \
                 ORDER BY sold DESC, created_at DESC LIMIT $3",
            )
            .bind(category_id)
            .bind(exclude)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Insert a product after the explicit referential checks: the type
    /// and category are fetched first and validated as plain data.
    pub async fn create_product(&self, new: &NewProduct) -> ApiResult<Product> {
        self.timed("create_product", async {
            let ptype = sqlx::query_as::<_, ProductType>("SELECT * FROM types WHERE id = $1")
                .bind(new.type_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(ApiError::TypeNotFound)?;
            let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
                .bind(new.category_id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| ApiError::validation("VALIDATION_ERROR", "category does not exist"))?;
            check_catalog_refs(&ptype, &category)?;

            let product = sqlx::query_as::<_, Product>(
                "INSERT INTO products (id, name, description, price, stock, type_id, category_id, is_active) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
            )
            .bind(Uuid::now_v7())
            .bind(&new.name)
            .bind(&new.description)
            .bind(sanitize::round_price(new.price))
            .bind(new.stock)
            .bind(new.type_id)
            .bind(new.category_id)
            .bind(new.is_active)
            .fetch_one(&self.pool)
            .await?;
            Ok(product)
        })
        .await
    }
}
