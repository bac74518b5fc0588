use core_utils::weekday::Weekday;
use dao::resource::{ResourceAvailabilityEntity, ResourceEntity};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub id: Uuid,
    pub shop_id: Uuid,
}

impl From<&ResourceEntity> for Resource {
    fn from(value: &ResourceEntity) -> Self {
        Self {
            id: value.id,
            shop_id: value.shop_id,
        }
    }
}
core_utils::derive_from_reference!(ResourceEntity, Resource);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourceAvailability {
    pub resource_id: Uuid,
    pub weekday: Weekday,
    pub is_available: bool,
    pub from_minute: u16,
    pub to_minute: u16,
}

impl From<&ResourceAvailabilityEntity> for ResourceAvailability {
    fn from(value: &ResourceAvailabilityEntity) -> Self {
        Self {
            resource_id: value.resource_id,
            weekday: value.weekday,
            is_available: value.is_available,
            from_minute: value.from_minute,
            to_minute: value.to_minute,
        }
    }
}
core_utils::derive_from_reference!(ResourceAvailabilityEntity, ResourceAvailability);
