use std::sync::Arc;

use async_trait::async_trait;
use core_utils::weekday::Weekday;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialistEntity {
    pub id: Uuid,
    pub shop_id: Uuid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialistWorkingHoursEntity {
    pub specialist_id: Uuid,
    pub weekday: Weekday,
    pub is_off: bool,
    pub from_minute: u16,
    pub to_minute: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProficiencyLevel {
    Novice,
    Intermediate,
    Expert,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialistServiceEntity {
    pub specialist_id: Uuid,
    pub service_id: Uuid,
    pub is_primary: Option<bool>,
    pub custom_duration_minutes: Option<u16>,
    pub proficiency_level: Option<ProficiencyLevel>,
    pub booking_count: u32,
}

impl SpecialistServiceEntity {
    /// `custom_duration` if set, else the service's own duration —
    /// the "effective duration" referenced throughout the spec.
    pub fn effective_duration_minutes(&self, service_duration_minutes: u16) -> u16 {
        self.custom_duration_minutes.unwrap_or(service_duration_minutes)
    }
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait SpecialistDao {
    type Transaction: crate::Transaction;

    async fn get_specialist(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<SpecialistEntity>, DaoError>;
    async fn get_specialist_working_hours(
        &self,
        specialist_id: Uuid,
        weekday: Weekday,
        tx: Self::Transaction,
    ) -> Result<Option<SpecialistWorkingHoursEntity>, DaoError>;
    async fn get_specialists_for_service(
        &self,
        service_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[SpecialistServiceEntity]>, DaoError>;
    async fn get_specialist_service(
        &self,
        specialist_id: Uuid,
        service_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<SpecialistServiceEntity>, DaoError>;
    async fn increment_booking_count(
        &self,
        specialist_id: Uuid,
        service_id: Uuid,
        delta: i32,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
