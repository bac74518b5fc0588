use async_trait::async_trait;
use mockall::automock;
use thiserror::Error;

pub mod appointment;
pub mod dependency;
pub mod package;
pub mod resource;
pub mod shop;
pub mod specialist;
pub mod svc;

#[derive(Error, Debug)]
pub enum DaoError {
    #[error("database query error: {0}")]
    DatabaseQueryError(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("serialization conflict, retry the transaction")]
    Transient,
}

/// Marker for an open repository transaction handle. Concrete
/// implementations carry whatever connection/guard the physical store
/// needs; the core only ever threads the handle through, never inspects it.
pub trait Transaction: Clone + std::fmt::Debug + Send + Sync + 'static {}

/// Hand-rolled transaction double for tests, referenced across every
/// `#[automock(type Transaction = crate::MockTransaction;)]` dao trait so
/// a single concrete type satisfies every mocked dao's associated type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MockTransaction;
impl Transaction for MockTransaction {}

/// Begins, commits, and rolls back transactions, and folds an
/// already-open handle into a no-op for nested calls (mirrors
/// `dao::TransactionDao` in the teacher crate: every service call accepts
/// `Option<Self::Transaction>` and resolves it once at the top).
#[automock(type Transaction = MockTransaction;)]
#[async_trait]
pub trait TransactionDao: Send + Sync {
    type Transaction: Transaction;

    async fn use_transaction(
        &self,
        tx: Option<Self::Transaction>,
    ) -> Result<Self::Transaction, DaoError>;
    async fn commit(&self, tx: Self::Transaction) -> Result<(), DaoError>;
    async fn rollback(&self, tx: Self::Transaction) -> Result<(), DaoError>;
}

/// The kind of entity a `NotFound` error refers to, for structured
/// diagnosis rather than a bare string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Shop,
    Service,
    Specialist,
    Resource,
    Appointment,
    Package,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Shop => "shop",
            EntityKind::Service => "service",
            EntityKind::Specialist => "specialist",
            EntityKind::Resource => "resource",
            EntityKind::Appointment => "appointment",
            EntityKind::Package => "package",
        };
        write!(f, "{name}")
    }
}
