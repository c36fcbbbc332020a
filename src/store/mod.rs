//! Persistence layer over PostgreSQL.
//!
//! Every public operation runs under the configured store timeout; an
//! expired budget surfaces as `TIMEOUT` rather than a hung request.

pub mod catalog;
pub mod engagement;
pub mod orders;
pub mod products;
pub mod reviews;

use std::future::Future;
use std::time::Duration;

use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};

#[derive(Clone)]
pub struct Store {
    pool: PgPool,
    timeout: Duration,
}

impl Store {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn timed<T, F>(&self, operation: &'static str, fut: F) -> ApiResult<T>
    where
        F: Future<Output = ApiResult<T>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout { operation }),
        }
    }
}
