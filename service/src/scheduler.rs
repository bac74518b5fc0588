use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::appointment::{Appointment, AppointmentStatus};
use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    EarliestAvailable,
    BalancedWorkload,
    MinimizeWait,
    ResourceEfficient,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleRequest {
    pub shop_id: Uuid,
    pub service_id: Uuid,
    pub specialist_id: Option<Uuid>,
    pub customer_id: Option<Uuid>,
    pub requested_start: Option<PrimitiveDateTime>,
    pub strategy: Strategy,
    pub package_id: Option<Uuid>,
}

/// One leg of a package booking, scheduled in `order_index` order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLeg {
    pub service_id: Uuid,
    pub specialist_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleMultipleResult {
    pub appointments: Vec<Appointment>,
    /// Set when a later leg failed after earlier legs were already
    /// booked; those bookings are compensated (cancelled) best-effort,
    /// and the failure is always surfaced here rather than swallowed.
    pub partial_failure: Option<String>,
}

/// Books, reschedules, and cancels appointments, coordinating the
/// availability engine, conflict detector, and buffer manager behind one
/// transactional boundary.
#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait SchedulingOrchestrator {
    type Transaction: dao::Transaction;

    async fn schedule(
        &self,
        request: ScheduleRequest,
        tx: Self::Transaction,
    ) -> Result<Appointment, ServiceError>;

    /// `sequential = true` sorts `legs` by descending duration and books
    /// them back-to-back on the same specialist where possible; `false`
    /// books each leg independently under `strategy`, each starting no
    /// earlier than `start_from` but not chained to the leg before it.
    async fn schedule_multiple(
        &self,
        shop_id: Uuid,
        package_id: Uuid,
        customer_id: Option<Uuid>,
        legs: Vec<PackageLeg>,
        start_from: PrimitiveDateTime,
        strategy: Strategy,
        sequential: bool,
        tx: Self::Transaction,
    ) -> Result<ScheduleMultipleResult, ServiceError>;

    async fn reschedule(
        &self,
        appointment_id: Uuid,
        new_start: PrimitiveDateTime,
        tx: Self::Transaction,
    ) -> Result<Appointment, ServiceError>;

    async fn cancel(
        &self,
        appointment_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Appointment, ServiceError>;

    async fn mark_status(
        &self,
        appointment_id: Uuid,
        status: AppointmentStatus,
        tx: Self::Transaction,
    ) -> Result<Appointment, ServiceError>;
}
