use std::fmt::{Display, Formatter};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MinutesError {
    #[error("minute-of-day value {0} is out of range 0..1440")]
    OutOfRange(i32),
}

/// A point in the day expressed as integer minutes since midnight.
///
/// The core treats time at minute granularity only; seconds are ignored
/// at every boundary, so every slot/working-hour/buffer computation goes
/// through this type rather than raw `time::Time` arithmetic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MinuteOfDay(u16);

pub const MINUTES_PER_DAY: u16 = 24 * 60;

impl MinuteOfDay {
    pub fn new(minutes: u16) -> Result<Self, MinutesError> {
        if minutes >= MINUTES_PER_DAY {
            return Err(MinutesError::OutOfRange(minutes as i32));
        }
        Ok(Self(minutes))
    }

    pub fn midnight() -> Self {
        Self(0)
    }

    pub fn value(self) -> u16 {
        self.0
    }

    /// Add a duration in minutes. Returns `None` if the result would run
    /// past (or at) the end of the day — callers comparing against a
    /// half-open day boundary should treat `None` as "beyond close".
    pub fn checked_add(self, minutes: i32) -> Option<Self> {
        let result = self.0 as i32 + minutes;
        if result < 0 || result >= MINUTES_PER_DAY as i32 {
            None
        } else {
            Some(Self(result as u16))
        }
    }

    pub fn saturating_add(self, minutes: i32) -> Self {
        let result = (self.0 as i32 + minutes).clamp(0, MINUTES_PER_DAY as i32 - 1);
        Self(result as u16)
    }

    pub fn diff_minutes(self, other: Self) -> i32 {
        self.0 as i32 - other.0 as i32
    }
}

impl From<time::Time> for MinuteOfDay {
    fn from(t: time::Time) -> Self {
        Self(t.hour() as u16 * 60 + t.minute() as u16)
    }
}

impl TryFrom<MinuteOfDay> for time::Time {
    type Error = time::error::ComponentRange;

    fn try_from(value: MinuteOfDay) -> Result<Self, Self::Error> {
        time::Time::from_hms(
            (value.0 / 60) as u8,
            (value.0 % 60) as u8,
            0,
        )
    }
}

impl Display for MinuteOfDay {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_from_time() {
        let t = time::Time::from_hms(9, 5, 30).unwrap();
        // Seconds are ignored.
        assert_eq!(MinuteOfDay::from(t).value(), 9 * 60 + 5);
    }

    #[test]
    fn checked_add_rejects_overflow() {
        let close = MinuteOfDay::new(23 * 60 + 50).unwrap();
        assert!(close.checked_add(20).is_none());
        assert_eq!(close.checked_add(9).unwrap().value(), 23 * 60 + 59);
    }

    #[test]
    fn diff_minutes_computes_gap() {
        let a = MinuteOfDay::new(600).unwrap();
        let b = MinuteOfDay::new(540).unwrap();
        assert_eq!(a.diff_minutes(b), 60);
    }

    #[test]
    fn display_pads_components() {
        let t = MinuteOfDay::new(65).unwrap();
        assert_eq!(t.to_string(), "01:05");
    }
}
