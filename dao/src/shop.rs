use async_trait::async_trait;
use core_utils::weekday::Weekday;
use mockall::automock;
use uuid::Uuid;

use crate::DaoError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopEntity {
    pub id: Uuid,
    pub company_id: Uuid,
    pub is_verified: bool,
}

/// A shop's opening window for one weekday. `is_closed` wins over
/// `from_minute`/`to_minute`, which are meaningless when closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopHoursEntity {
    pub shop_id: Uuid,
    pub weekday: Weekday,
    pub is_closed: bool,
    pub from_minute: u16,
    pub to_minute: u16,
}

#[automock(type Transaction = crate::MockTransaction;)]
#[async_trait]
pub trait ShopDao {
    type Transaction: crate::Transaction;

    async fn get_shop(
        &self,
        id: Uuid,
        tx: Self::Transaction,
    ) -> Result<Option<ShopEntity>, DaoError>;
    async fn get_shop_hours(
        &self,
        shop_id: Uuid,
        weekday: Weekday,
        tx: Self::Transaction,
    ) -> Result<Option<ShopHoursEntity>, DaoError>;
}
