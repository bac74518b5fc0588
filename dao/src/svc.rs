use std::sync::Arc;

use async_trait::async_trait;
use core_utils::weekday::Weekday;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Active,
    Inactive,
    Draft,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLocation {
    InShop,
    InHome,
    Both,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEntity {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub duration_minutes: u16,
    pub slot_granularity_minutes: u16,
    pub buffer_before_minutes: u16,
    pub buffer_after_minutes: u16,
    pub location: ServiceLocation,
    pub status: ServiceStatus,
    pub has_custom_availability: bool,
    pub min_booking_notice_minutes: u32,
    pub max_advance_booking_days: u32,
    pub max_concurrent_bookings: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceAvailabilityEntity {
    pub service_id: Uuid,
    pub weekday: Weekday,
    pub is_closed: bool,
    pub from_minute: u16,
    pub to_minute: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceExceptionEntity {
    pub service_id: Uuid,
    pub date: time::Date,
    pub is_closed: bool,
    pub from_minute: u16,
    pub to_minute: u16,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait ServiceDao {
    type Transaction: crate::Transaction;

    async fn get_service(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ServiceEntity>, DaoError>;
    async fn get_service_hours(
        &self,
        service_id: Uuid,
        weekday: Weekday,
        tx: Self::Transaction,
    ) -> Result<Option<ServiceAvailabilityEntity>, DaoError>;
    async fn get_service_exception(
        &self,
        service_id: Uuid,
        date: time::Date,
        tx: Self::Transaction,
    ) -> Result<Option<ServiceExceptionEntity>, DaoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResourceRequirementEntity {
    pub service_id: Uuid,
    pub resource_id: Uuid,
    pub quantity: u32,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait ServiceResourceDao {
    type Transaction: crate::Transaction;

    async fn get_required_resources(
        &self,
        service_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[ServiceResourceRequirementEntity]>, DaoError>;
}
