//! Wall-clock source

use chrono::{DateTime, Local};
use std::fmt::Debug;

/// Format of the human-readable `time` on notification entries
pub const TIME_FORMAT: &str = "%-m/%-d/%Y, %-I:%M:%S %p";

/// Source of the current wall-clock time
pub trait Clock: Send + Sync + Debug {
    /// Current local time
    fn now(&self) -> DateTime<Local>;
}

/// Clock reading the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Render a timestamp with [`TIME_FORMAT`]
#[must_use]
pub fn display_time(at: &DateTime<Local>) -> String {
    at.format(TIME_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn display_time_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 7, 14, 5, 9).unwrap();
        assert_eq!(display_time(&at), "3/7/2024, 2:05:09 PM");
    }

    #[test]
    fn system_clock_moves_forward() {
        let a = SystemClock.now();
        let b = SystemClock.now();
        assert!(b >= a);
    }
}
