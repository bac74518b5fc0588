use service::{clock::ClockService, ServiceError};
use time::OffsetDateTime;
use time_tz::{timezones, OffsetDateTimeExt};

pub struct ClockServiceImpl;
impl ClockService for ClockServiceImpl {
    fn time_now(&self) -> time::Time {
        OffsetDateTime::now_utc().time()
    }
    fn date_now(&self) -> time::Date {
        OffsetDateTime::now_utc().date()
    }
    fn date_time_now(&self) -> time::PrimitiveDateTime {
        let now = OffsetDateTime::now_utc();
        time::PrimitiveDateTime::new(now.date(), now.time())
    }

    fn local_now(&self, iana_tz: &str) -> Result<time::PrimitiveDateTime, ServiceError> {
        let tz = timezones::get_by_name(iana_tz).ok_or(ServiceError::InvalidDate)?;
        let local = OffsetDateTime::now_utc().to_timezone(tz);
        Ok(time::PrimitiveDateTime::new(local.date(), local.time()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_timezone_is_rejected() {
        assert!(matches!(
            ClockServiceImpl.local_now("Not/ARealZone"),
            Err(ServiceError::InvalidDate)
        ));
    }

    #[test]
    fn known_timezone_resolves() {
        assert!(ClockServiceImpl.local_now("Europe/Berlin").is_ok());
    }
}
