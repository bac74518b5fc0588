use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub specialist_id: Uuid,
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
}

/// Computes open booking slots from shop/service/specialist working hours,
/// exceptions, and existing appointments. Every method takes a repository
/// transaction handle so callers can compose it with other reads inside a
/// single consistent snapshot.
#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait AvailabilityEngine {
    type Transaction: dao::Transaction;

    /// Slots for one service on one calendar date, across every
    /// specialist qualified for it, or restricted to `specialist_id` when
    /// given.
    async fn slots_for_service(
        &self,
        service_id: Uuid,
        specialist_id: Option<Uuid>,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Vec<Slot>, ServiceError>;

    /// The working-hours-derived slots for a single specialist on a date,
    /// ignoring service granularity — used by the scheduler to inspect a
    /// specialist's raw calendar.
    async fn slots_for_specialist(
        &self,
        specialist_id: Uuid,
        date: Date,
        tx: Self::Transaction,
    ) -> Result<Vec<Slot>, ServiceError>;

    /// The first specialist (and slot start) able to take the service at
    /// or after `from`, scanning forward day by day up to the service's
    /// max advance booking window.
    async fn next_available_specialist(
        &self,
        service_id: Uuid,
        from: PrimitiveDateTime,
        tx: Self::Transaction,
    ) -> Result<Option<Slot>, ServiceError>;

    /// The earliest slot at or after `from`, optionally pinned to one
    /// specialist.
    async fn earliest_available(
        &self,
        service_id: Uuid,
        specialist_id: Option<Uuid>,
        from: PrimitiveDateTime,
        tx: Self::Transaction,
    ) -> Result<Option<Slot>, ServiceError>;

    /// Calendar dates in `[from, to]` that have at least one open slot for
    /// the service, using the fast weekday/exception reject before
    /// touching appointment data.
    async fn available_days(
        &self,
        service_id: Uuid,
        from: Date,
        to: Date,
        tx: Self::Transaction,
    ) -> Result<Vec<Date>, ServiceError>;
}
