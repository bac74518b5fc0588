use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

/// Ambient configuration for the scheduling core. `timezone` is an IANA
/// name resolved against the `time-tz` database at the shop/service
/// boundary; `booking_soft_deadline_ms` bounds how long a single
/// `Schedule`/`Reschedule` call may spend retrying transient repository
/// errors before it gives up with `ServiceError::Retryable`.
pub struct Config {
    pub timezone: Arc<str>,
    pub booking_soft_deadline_ms: u64,
    pub max_transient_retries: u32,
}

#[automock]
#[async_trait]
pub trait ConfigService {
    async fn get_config(&self) -> Result<Config, ServiceError>;
}
