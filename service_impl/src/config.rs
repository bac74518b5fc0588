use std::{env, sync::Arc};

use async_trait::async_trait;
use service::{
    config::{Config, ConfigService},
    ServiceError,
};

pub struct ConfigServiceImpl;

#[async_trait]
impl ConfigService for ConfigServiceImpl {
    async fn get_config(&self) -> Result<Config, ServiceError> {
        let timezone = env::var("SHOP_TIMEZONE").unwrap_or_else(|_| "UTC".to_string());
        let booking_soft_deadline_ms = env::var("BOOKING_SOFT_DEADLINE_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(2_000);
        let max_transient_retries = env::var("MAX_TRANSIENT_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(3);

        Ok(Config {
            timezone: Arc::from(timezone),
            booking_soft_deadline_ms,
            max_transient_retries,
        })
    }
}
