use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyType {
    Prerequisite,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDependencyEntity {
    pub id: Uuid,
    pub dependent_service_id: Uuid,
    pub prerequisite_service_id: Uuid,
    pub dependency_type: DependencyType,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait ServiceDependencyDao {
    type Transaction: crate::Transaction;

    async fn get_dependencies(
        &self,
        dependent_service_id: Uuid,
        dependency_type: DependencyType,
        tx: Self::Transaction,
    ) -> Result<Arc<[ServiceDependencyEntity]>, DaoError>;
}
