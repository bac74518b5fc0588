use mockall::automock;

use crate::ServiceError;

#[automock]
pub trait ClockService {
    fn time_now(&self) -> time::Time;
    fn date_now(&self) -> time::Date;
    fn date_time_now(&self) -> time::PrimitiveDateTime;

    /// Current wall-clock time converted into a shop's local timezone,
    /// given its IANA name (e.g. `"Europe/Berlin"`) from `Config::timezone`.
    fn local_now(&self, iana_tz: &str) -> Result<time::PrimitiveDateTime, ServiceError>;
}
