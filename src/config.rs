//! Runtime configuration, read once from the environment at boot.

use std::time::Duration;

pub const DEFAULT_PER_PAGE: u32 = 2;
pub const MAX_PER_PAGE: u32 = 50;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    /// Catalog page size, clamped to [1, MAX_PER_PAGE].
    pub per_page: u32,
    /// Budget for a single store round-trip.
    pub store_timeout: Duration,
    pub nats_url: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")?;
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8083".to_string())
            .parse()?;
        let per_page = std::env::var("CATALOG_PER_PAGE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_PER_PAGE)
            .clamp(1, MAX_PER_PAGE);
        let store_timeout = std::env::var("STORE_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(10));
        let nats_url = std::env::var("NATS_URL").ok();
        Ok(Self { database_url, port, per_page, store_timeout, nats_url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_per_page_bounds() {
        assert!(DEFAULT_PER_PAGE >= 1);
        assert!(DEFAULT_PER_PAGE <= MAX_PER_PAGE);
        assert_eq!(120u32.clamp(1, MAX_PER_PAGE), 50);
        assert_eq!(0u32.clamp(1, MAX_PER_PAGE), 1);
    }
}
