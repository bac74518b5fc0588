use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntity {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub current_purchases: u32,
}

/// One service within a package, in booking order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackageServiceEntity {
    pub package_id: Uuid,
    pub service_id: Uuid,
    pub order_index: u16,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait PackageDao {
    type Transaction: crate::Transaction;

    async fn get_package(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<PackageEntity>, DaoError>;
    async fn get_package_services(
        &self,
        package_id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Arc<[PackageServiceEntity]>, DaoError>;
    async fn increment_purchase_counter(
        &self,
        package_id: Uuid,
        delta: i32,
        tx: Self::Transaction,
    ) -> Result<(), DaoError>;
}
