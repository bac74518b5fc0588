use async_trait::async_trait;
use mockall::automock;

use crate::appointment::Appointment;
use crate::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationEvent {
    Scheduled,
    Rescheduled,
    Cancelled,
    StatusChanged,
}

#[automock]
#[async_trait]
pub trait NotificationService {
    async fn notify(
        &self,
        event: NotificationEvent,
        appointment: &Appointment,
    ) -> Result<(), ServiceError>;
}
