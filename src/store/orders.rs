//! Order history reads and order placement.

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::auth::Principal;
use crate::domain::{Order, OrderItem, OrderItemInput, Product};
use crate::error::{ApiError, ApiResult};
use crate::sanitize;
use crate::store::Store;

impl Store {
    /// At least one order line for this (user, product) pair?
    pub(crate) async fn has_purchased(
        &self,
        user_id: Uuid,
        product_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(\
                 SELECT 1 FROM orders o \
                 JOIN order_items oi ON oi.order_id = o.id \
                 WHERE o.user_id = $1 AND oi.product_id = $2)",
        )
        .bind(user_id)
        .bind(product_id)
        .fetch_one(&self.pool)
        .await
    }

    pub async fn user_orders(&self, user: &Principal) -> ApiResult<Vec<Order>> {
        self.timed("user_orders", async {
            let rows = sqlx::query_as::<_, Order>(
                "SELECT * FROM orders WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
            )
            .bind(user.user_id)
            .fetch_all(&self.pool)
            .await?;
            Ok(rows)
        })
        .await
    }

    /// Place an order: every line's product must exist, be active, and
    /// have the stock; stock and sold counters move in the same
    /// transaction that writes the order.
    pub async fn place_order(
        &self,
        user: &Principal,
        items: &[OrderItemInput],
    ) -> ApiResult<(Order, Vec<OrderItem>)> {
        if items.is_empty() {
            return Err(ApiError::validation("VALIDATION_ERROR", "order has no items"));
        }
        if items.iter().any(|i| i.quantity <= 0) {
            return Err(ApiError::validation(
                "VALIDATION_ERROR",
                "item quantity must be a positive integer",
            ));
        }
        self.timed("place_order", async {
            let mut tx = self.pool.begin().await?;
            let order_id = Uuid::now_v7();
            let mut lines = Vec::with_capacity(items.len());
            let mut total = Decimal::ZERO;

            for item in items {
                let product = sqlx::query_as::<_, Product>(
                    "SELECT * FROM products WHERE id = $1 FOR UPDATE",
                )
                .bind(item.product_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(ApiError::ProductNotFound)?;
                if !product.is_active {
                    return Err(ApiError::ProductInactive);
                }
                if product.stock < item.quantity {
                    return Err(ApiError::validation(
                        "VALIDATION_ERROR",
                        format!("insufficient stock for '{}'", product.name),
                    ));
                }
                sqlx::query(
                    "UPDATE products SET stock = stock - $2, sold = sold + $2, updated_at = NOW() \
                     WHERE id = $1",
                )
                .bind(product.id)
                .bind(item.quantity)
                .execute(&mut *tx)
                .await?;

                let line_total =
                    sanitize::round_price(product.price * Decimal::from(item.quantity));
                total += line_total;
                lines.push(OrderItem {
                    id: Uuid::now_v7(),
                    order_id,
                    product_id: product.id,
                    name: product.name.clone(),
                    quantity: item.quantity,
                    unit_price: product.price,
                    total: line_total,
                });
            }

            let order_number = format!("ORD-{:08}", rand::random::<u32>() % 100_000_000);
            let order = sqlx::query_as::<_, Order>(
                "INSERT INTO orders (id, order_number, user_id, email, status, total) \
                 VALUES ($1, $2, $3, $4, 'pending', $5) RETURNING *",
            )
            .bind(order_id)
            .bind(&order_number)
            .bind(user.user_id)
            .bind(&user.email)
            .bind(total)
            .fetch_one(&mut *tx)
            .await?;

            for line in &lines {
                sqlx::query(
                    "INSERT INTO order_items (id, order_id, product_id, name, quantity, unit_price, total) \
                     VALUES ($1, $2, $3, $4, $5, $6, $7)",
                )
                .bind(line.id)
                .bind(line.order_id)
                .bind(line.product_id)
                .bind(&line.name)
                .bind(line.quantity)
                .bind(line.unit_price)
                .bind(line.total)
                .execute(&mut *tx)
                .await?;
            }

            tx.commit().await?;
            Ok((order, lines))
        })
        .await
    }
}
