use dao::appointment::AppointmentEntity;
use time::PrimitiveDateTime;
use uuid::Uuid;

use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const LIVE: [AppointmentStatus; 3] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::Confirmed,
        AppointmentStatus::InProgress,
    ];

    pub fn is_live(self) -> bool {
        Self::LIVE.contains(&self)
    }

    /// Whether `self -> next` is a permitted lifecycle transition. Mirrors
    /// the state machine the original booking app enforces:
    /// `Scheduled -> {Confirmed, Cancelled, NoShow}`,
    /// `Confirmed -> {InProgress, Cancelled, NoShow}`,
    /// `InProgress -> {Completed, NoShow}`, and all terminal states are
    /// final.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Scheduled, Cancelled)
                | (Scheduled, NoShow)
                | (Confirmed, InProgress)
                | (Confirmed, Cancelled)
                | (Confirmed, NoShow)
                | (InProgress, Completed)
                | (InProgress, NoShow)
        )
    }
}

impl From<dao::appointment::AppointmentStatus> for AppointmentStatus {
    fn from(value: dao::appointment::AppointmentStatus) -> Self {
        match value {
            dao::appointment::AppointmentStatus::Scheduled => AppointmentStatus::Scheduled,
            dao::appointment::AppointmentStatus::Confirmed => AppointmentStatus::Confirmed,
            dao::appointment::AppointmentStatus::InProgress => AppointmentStatus::InProgress,
            dao::appointment::AppointmentStatus::Completed => AppointmentStatus::Completed,
            dao::appointment::AppointmentStatus::Cancelled => AppointmentStatus::Cancelled,
            dao::appointment::AppointmentStatus::NoShow => AppointmentStatus::NoShow,
        }
    }
}

impl From<AppointmentStatus> for dao::appointment::AppointmentStatus {
    fn from(value: AppointmentStatus) -> Self {
        match value {
            AppointmentStatus::Scheduled => dao::appointment::AppointmentStatus::Scheduled,
            AppointmentStatus::Confirmed => dao::appointment::AppointmentStatus::Confirmed,
            AppointmentStatus::InProgress => dao::appointment::AppointmentStatus::InProgress,
            AppointmentStatus::Completed => dao::appointment::AppointmentStatus::Completed,
            AppointmentStatus::Cancelled => dao::appointment::AppointmentStatus::Cancelled,
            AppointmentStatus::NoShow => dao::appointment::AppointmentStatus::NoShow,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appointment {
    pub id: Uuid,
    pub customer_id: Option<Uuid>,
    pub shop_id: Uuid,
    pub service_id: Uuid,
    pub specialist_id: Uuid,
    pub start: PrimitiveDateTime,
    pub end: PrimitiveDateTime,
    pub buffer_before_minutes: u16,
    pub buffer_after_minutes: u16,
    pub status: AppointmentStatus,
    pub package_id: Option<Uuid>,
}

impl Appointment {
    /// The window an appointment occupies for conflict purposes,
    /// including its buffers on both sides.
    pub fn buffered_start(&self) -> PrimitiveDateTime {
        self.start - time::Duration::minutes(self.buffer_before_minutes as i64)
    }

    pub fn buffered_end(&self) -> PrimitiveDateTime {
        self.end + time::Duration::minutes(self.buffer_after_minutes as i64)
    }

    pub fn transition_to(&self, next: AppointmentStatus) -> Result<(), ServiceError> {
        if self.status.can_transition_to(next) {
            Ok(())
        } else {
            Err(ServiceError::InvalidStatusTransition {
                from: self.status,
                to: next,
            })
        }
    }
}

impl From<&AppointmentEntity> for Appointment {
    fn from(value: &AppointmentEntity) -> Self {
        Self {
            id: value.id,
            customer_id: value.customer_id,
            shop_id: value.shop_id,
            service_id: value.service_id,
            specialist_id: value.specialist_id,
            start: value.start,
            end: value.end,
            buffer_before_minutes: value.buffer_before_minutes,
            buffer_after_minutes: value.buffer_after_minutes,
            status: value.status.into(),
            package_id: value.package_id,
        }
    }
}
core_utils::derive_from_reference!(AppointmentEntity, Appointment);

impl From<&Appointment> for AppointmentEntity {
    fn from(value: &Appointment) -> Self {
        Self {
            id: value.id,
            customer_id: value.customer_id,
            shop_id: value.shop_id,
            service_id: value.service_id,
            specialist_id: value.specialist_id,
            start: value.start,
            end: value.end,
            buffer_before_minutes: value.buffer_before_minutes,
            buffer_after_minutes: value.buffer_after_minutes,
            status: value.status.into(),
            package_id: value.package_id,
        }
    }
}
core_utils::derive_from_reference!(Appointment, AppointmentEntity);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scheduled_can_become_confirmed_but_not_completed() {
        assert!(AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::Confirmed));
        assert!(!AppointmentStatus::Scheduled.can_transition_to(AppointmentStatus::Completed));
    }

    #[test]
    fn completed_is_terminal() {
        assert!(!AppointmentStatus::Completed.can_transition_to(AppointmentStatus::Cancelled));
    }
}
