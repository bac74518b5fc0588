use core_utils::weekday::Weekday;
use dao::specialist::{SpecialistEntity, SpecialistServiceEntity, SpecialistWorkingHoursEntity};
pub use dao::specialist::ProficiencyLevel;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Specialist {
    pub id: Uuid,
    pub shop_id: Uuid,
}

impl From<&SpecialistEntity> for Specialist {
    fn from(value: &SpecialistEntity) -> Self {
        Self {
            id: value.id,
            shop_id: value.shop_id,
        }
    }
}
core_utils::derive_from_reference!(SpecialistEntity, Specialist);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecialistWorkingHours {
    pub specialist_id: Uuid,
    pub weekday: Weekday,
    pub is_off: bool,
    pub from_minute: u16,
    pub to_minute: u16,
}

impl From<&SpecialistWorkingHoursEntity> for SpecialistWorkingHours {
    fn from(value: &SpecialistWorkingHoursEntity) -> Self {
        Self {
            specialist_id: value.specialist_id,
            weekday: value.weekday,
            is_off: value.is_off,
            from_minute: value.from_minute,
            to_minute: value.to_minute,
        }
    }
}
core_utils::derive_from_reference!(SpecialistWorkingHoursEntity, SpecialistWorkingHours);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialistService {
    pub specialist_id: Uuid,
    pub service_id: Uuid,
    pub is_primary: Option<bool>,
    pub custom_duration_minutes: Option<u16>,
    pub proficiency_level: Option<ProficiencyLevel>,
    pub booking_count: u32,
}

impl SpecialistService {
    pub fn effective_duration_minutes(&self, service_duration_minutes: u16) -> u16 {
        self.custom_duration_minutes.unwrap_or(service_duration_minutes)
    }
}

impl From<&SpecialistServiceEntity> for SpecialistService {
    fn from(value: &SpecialistServiceEntity) -> Self {
        Self {
            specialist_id: value.specialist_id,
            service_id: value.service_id,
            is_primary: value.is_primary,
            custom_duration_minutes: value.custom_duration_minutes,
            proficiency_level: value.proficiency_level,
            booking_count: value.booking_count,
        }
    }
}
core_utils::derive_from_reference!(SpecialistServiceEntity, SpecialistService);
