use async_trait::async_trait;
use mockall::automock;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConflictKind {
    Specialist,
    Resource,
    Capacity,
    Dependency,
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ConflictKind::Specialist => "specialist",
            ConflictKind::Resource => "resource",
            ConflictKind::Capacity => "capacity",
            ConflictKind::Dependency => "dependency",
        };
        write!(f, "{name}")
    }
}

/// One concrete clash found by a conflict check, capped at 5 per kind by
/// the checks that produce them so a pathological overlap set can't blow
/// up the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictDetail {
    pub kind: ConflictKind,
    pub conflicting_appointment_id: Option<Uuid>,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ConflictDiagnosis {
    pub details: Vec<ConflictDetail>,
}

impl ConflictDiagnosis {
    pub fn has_conflict(&self) -> bool {
        !self.details.is_empty()
    }

    pub fn merge(mut self, other: ConflictDiagnosis) -> Self {
        self.details.extend(other.details);
        self
    }
}

/// Detects whether a candidate appointment window collides with existing
/// bookings. Each check is independent and side-effect free; the
/// aggregate runs them concurrently and folds the results in a fixed
/// order (specialist, resource, capacity, dependency) so diagnosis output
/// is deterministic regardless of scheduling.
#[automock(type Transaction = dao::MockTransaction;)]
#[async_trait]
pub trait ConflictDetector {
    type Transaction: dao::Transaction;

    async fn specialist_conflict(
        &self,
        specialist_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<ConflictDiagnosis, ServiceError>;

    async fn resource_conflict(
        &self,
        resource_id: Uuid,
        quantity: u32,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<ConflictDiagnosis, ServiceError>;

    /// Point-in-time containment check: counts live appointments of
    /// `service_id` whose window contains `instant`, not interval overlap.
    async fn service_capacity(
        &self,
        service_id: Uuid,
        instant: PrimitiveDateTime,
        max_concurrent_bookings: Option<u32>,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<ConflictDiagnosis, ServiceError>;

    async fn dependency_conflict(
        &self,
        dependent_service_id: Uuid,
        customer_id: Uuid,
        shop_id: Uuid,
        before: PrimitiveDateTime,
        tx: Self::Transaction,
    ) -> Result<ConflictDiagnosis, ServiceError>;

    async fn aggregate_check(
        &self,
        specialist_id: Uuid,
        resources: Vec<(Uuid, u32)>,
        service_id: Uuid,
        customer_id: Option<Uuid>,
        shop_id: Uuid,
        start: PrimitiveDateTime,
        end: PrimitiveDateTime,
        max_concurrent_bookings: Option<u32>,
        exclude_appointment_id: Option<Uuid>,
        tx: Self::Transaction,
    ) -> Result<ConflictDiagnosis, ServiceError>;
}
