use async_trait::async_trait;
use mockall::automock;

use crate::ServiceError;

/// Pluggable cache for hot repeated reads (shop hours, service
/// definitions) the orchestrator re-fetches on every scheduling attempt.
/// Callers own invalidation; this port only stores bytes.
#[automock]
#[async_trait]
pub trait CacheService {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, ServiceError>;
    async fn set(&self, key: &str, value: Vec<u8>, ttl_seconds: u64) -> Result<(), ServiceError>;
    async fn invalidate(&self, key: &str) -> Result<(), ServiceError>;
}
