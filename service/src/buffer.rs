use async_trait::async_trait;
use mockall::automock;
use time::{Date, PrimitiveDateTime};
use uuid::Uuid;

use crate::ServiceError;

pub const DEFAULT_MIN_BUFFER_MINUTES: u16 = 5;
pub const DEFAULT_TRANSITION_BUFFER_MINUTES: u16 = 10;
pub const DEFAULT_CLEANUP_BUFFER_MINUTES: u16 = 15;

/// How much traffic/turnover the specialist sees around this service,
/// used to scale `suggest_optimal_buffers`'s base figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionFactor {
    Low,
    Medium,
    High,
}

impl TransitionFactor {
    pub fn multiplier(self) -> f64 {
        match self {
            TransitionFactor::Low => 0.8,
            TransitionFactor::Medium => 1.0,
            TransitionFactor::High => 1.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferRequirements {
    pub before_minutes: u16,
    pub after_minutes: u16,
}

/// How `adjust_for_buffer` should try to resolve a shortfall.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustmentStrategy {
    DelayStart,
    AdvanceEnd,
    /// Pick whichever of the two shortens the appointment the least.
    Auto,
}

/// A detected shortfall between two adjacent live appointments on a
/// specialist's calendar for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferViolation {
    pub first_appointment_id: Uuid,
    pub second_appointment_id: Uuid,
    pub actual_gap_minutes: i32,
    pub required_buffer_minutes: u16,
    pub deficit_minutes: i32,
}

/// Computes, checks, and repairs the buffer time a specialist needs
/// around an appointment for cleanup/transition between clients.
#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait BufferManager {
    type Transaction: dao::Transaction;

    async fn buffer_requirements(
        &self,
        service_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<BufferRequirements, ServiceError>;

    /// Independent of any stored service row: derives a recommended
    /// buffer from a duration band and a transition factor, for use by
    /// shop admins configuring a new service.
    fn suggest_optimal_buffers(
        &self,
        duration_minutes: u16,
        transition_factor: TransitionFactor,
    ) -> BufferRequirements;

    /// Scans every adjacent pair of a specialist's live appointments on
    /// `date` and reports each pair whose actual gap falls short of the
    /// buffer the two appointments require between them.
    async fn check_buffer_conflicts(
        &self,
        specialist_id: Uuid,
        date: Date,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<Vec<BufferViolation>, ServiceError>;

    /// Resolves a buffer shortfall by shifting the candidate window,
    /// refusing (rather than chaining a new search) if the shift would
    /// itself create a conflict with the appointment on the other side,
    /// or if it would shorten the appointment past its floor.
    async fn adjust_for_buffer(
        &self,
        specialist_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        buffer: BufferRequirements,
        strategy: AdjustmentStrategy,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<(PrimitiveDateTime, PrimitiveDateTime), ServiceError>;
}
