use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::DaoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    /// Statuses that own buffer time, count toward capacity, and hold
    /// resources — the spec's "live appointment" definition.
    pub const LIVE: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
    ];

    pub fn is_live(self) -> bool {
        Self::LIVE.contains(&self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentEntity {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub shop_id: Uuid,
    pub service_id: Uuid,
    pub specialist_id: Uuid,
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
    pub buffer_before_minutes: u16,
    pub buffer_after_minutes: u16,
    pub status: AppointmentStatus,
    pub package_id: Option<Uuid>,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait AppointmentDao {
    type Transaction: crate::Transaction;

    async fn find_by_id(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<AppointmentEntity>, DaoError>;

    /// Appointments for a specialist whose window overlaps `[from, to)`,
    /// ordered by start, restricted to the given statuses.
    async fn find_for_specialist(
        &self,
        specialist_id: Uuid,
        from: PrimitiveDateTime,
        to: PrimitiveDateTime,
        statuses: &[AppointmentStatus],
        tx: Self::Transaction,
    ) -> Result<Arc<[AppointmentEntity]>, DaoError>;

    /// Appointments of a service that contain `instant` (point-in-time
    /// containment, used by the capacity check).
    async fn count_for_service_covering_instant(
        &self,
        service_id: Uuid,
        instant: PrimitiveDateTime,
        statuses: &[AppointmentStatus],
        exclude: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<usize, DaoError>;

    /// Whether a completed appointment of `prerequisite_service_id`
    /// exists for this customer/shop ending before `before`.
    async fn has_completed_prerequisite(
        &self,
        prerequisite_service_id: Uuid,
        customer_id: Uuid,
        shop_id: Uuid,
        before: PrimitiveDateTime,
        tx: Self::Transaction,
    ) -> Result<bool, DaoError>;

    async fn insert(
        &self,
        entity: &AppointmentEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn update(
        &self,
        entity: &AppointmentEntity,
        process: &str,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppointmentResourceEntity {
    pub id: Uuid,
    pub appointment_id: Uuid,
    pub resource_id: Uuid,
    pub quantity: u32,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait AppointmentResourceDao {
    type Transaction: crate::Transaction;

    /// Live allocations of `resource_id` overlapping `[from, to)`.
    async fn find_for_resource(
        &self,
        resource_id: Uuid,
        from: PrimitiveDateTime,
        to: PrimitiveDateTime,
        statuses: &[AppointmentStatus],
        exclude: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<Arc<[AppointmentResourceEntity]>, DaoError>;

    /// The resources currently allocated to one appointment.
    async fn find_for_appointment(
        &self,
        appointment_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[AppointmentResourceEntity]>, DaoError>;

    async fn insert(
        &self,
        entity: &AppointmentResourceEntity,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
    async fn delete_for_appointment(
        &self,
        appointment_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
