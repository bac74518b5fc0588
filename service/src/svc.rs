use core_utils::weekday::Weekday;
use dao::svc::{
    ServiceAvailabilityEntity, ServiceEntity, ServiceExceptionEntity,
    ServiceResourceRequirementEntity,
};
pub use dao::svc::{ServiceLocation, ServiceStatus};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Service {
    pub id: Uuid,
    pub shop_id: Uuid,
    pub duration_minutes: u16,
    pub slot_granularity_minutes: u16,
    pub buffer_before_minutes: u16,
    pub buffer_after_minutes: u16,
    pub location: ServiceLocation,
    pub status: ServiceStatus,
    pub has_custom_availability: bool,
    pub min_booking_notice_minutes: u32,
    pub max_advance_booking_days: u32,
    pub max_concurrent_bookings: Option<u32>,
}

impl Service {
    pub fn is_active(&self) -> bool {
        self.status == ServiceStatus::Active
    }
}

impl From<&ServiceEntity> for Service {
    fn from(value: &ServiceEntity) -> Self {
        Self {
            id: value.id,
            shop_id: value.shop_id,
            duration_minutes: value.duration_minutes,
            slot_granularity_minutes: value.slot_granularity_minutes,
            buffer_before_minutes: value.buffer_before_minutes,
            buffer_after_minutes: value.buffer_after_minutes,
            location: value.location,
            status: value.status,
            has_custom_availability: value.has_custom_availability,
            min_booking_notice_minutes: value.min_booking_notice_minutes,
            max_advance_booking_days: value.max_advance_booking_days,
            max_concurrent_bookings: value.max_concurrent_bookings,
        }
    }
}
core_utils::derive_from_reference!(ServiceEntity, Service);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceAvailability {
    pub service_id: Uuid,
    pub weekday: Weekday,
    pub is_closed: bool,
    pub from_minute: u16,
    pub to_minute: u16,
}

impl From<&ServiceAvailabilityEntity> for ServiceAvailability {
    fn from(value: &ServiceAvailabilityEntity) -> Self {
        Self {
            service_id: value.service_id,
            weekday: value.weekday,
            is_closed: value.is_closed,
            from_minute: value.from_minute,
            to_minute: value.to_minute,
        }
    }
}
core_utils::derive_from_reference!(ServiceAvailabilityEntity, ServiceAvailability);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceException {
    pub service_id: Uuid,
    pub date: time::Date,
    pub is_closed: bool,
    pub from_minute: u16,
    pub to_minute: u16,
}

impl From<&ServiceExceptionEntity> for ServiceException {
    fn from(value: &ServiceExceptionEntity) -> Self {
        Self {
            service_id: value.service_id,
            date: value.date,
            is_closed: value.is_closed,
            from_minute: value.from_minute,
            to_minute: value.to_minute,
        }
    }
}
core_utils::derive_from_reference!(ServiceExceptionEntity, ServiceException);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceResourceRequirement {
    pub service_id: Uuid,
    pub resource_id: Uuid,
    pub quantity: u32,
}

impl From<&ServiceResourceRequirementEntity> for ServiceResourceRequirement {
    fn from(value: &ServiceResourceRequirementEntity) -> Self {
        Self {
            service_id: value.service_id,
            resource_id: value.resource_id,
            quantity: value.quantity,
        }
    }
}
core_utils::derive_from_reference!(ServiceResourceRequirementEntity, ServiceResourceRequirement);
