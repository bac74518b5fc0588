use std::sync::Arc;

use async_trait::async_trait;
use core_utils::weekday::Weekday;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceEntity {
    pub id: Uuid,
    pub shop_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceAvailabilityEntity {
    pub resource_id: Uuid,
    pub weekday: Weekday,
    pub is_available: bool,
    pub from_minute: u16,
    pub to_minute: u16,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait ResourceDao {
    type Transaction: crate::Transaction;

    async fn get_resource(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ResourceEntity>, DaoError>;
    async fn get_resource_availability(
        &self,
        resource_id: Uuid,
        weekday: Weekday,
        tx: Self::Transaction,
    ) -> Result<Arc<[ResourceAvailabilityEntity]>, DaoError>;
    /// All resources of the same shop sharing the requested resource's
    /// role, used when the orchestrator substitutes an alternate
    /// resource of the same type if the declared one is unavailable.
    async fn find_same_type_in_shop(
        &self,
        resource_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[ResourceEntity]>, DaoError>;
}
