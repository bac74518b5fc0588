use core_utils::weekday::Weekday;
use dao::shop::{ShopEntity, ShopHoursEntity};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shop {
    pub id: Uuid,
    pub company_id: Uuid,
    pub is_verified: bool,
}

impl From<&ShopEntity> for Shop {
    fn from(value: &ShopEntity) -> Self {
        Self {
            id: value.id,
            company_id: value.company_id,
            is_verified: value.is_verified,
        }
    }
}
core_utils::derive_from_reference!(ShopEntity, Shop);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShopHours {
    pub shop_id: Uuid,
    pub weekday: Weekday,
    pub is_closed: bool,
    pub from_minute: u16,
    pub to_minute: u16,
}

impl From<&ShopHoursEntity> for ShopHours {
    fn from(value: &ShopHoursEntity) -> Self {
        Self {
            shop_id: value.shop_id,
            weekday: value.weekday,
            is_closed: value.is_closed,
            from_minute: value.from_minute,
            to_minute: value.to_minute,
        }
    }
}
core_utils::derive_from_reference!(ShopHoursEntity, ShopHours);
