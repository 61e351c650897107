use std::fmt;
use time::OffsetDateTime;

/// "YYYY-MM" partition component with ordering, derived from record
/// creation timestamps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: u16,
    pub month: u8, // 1..=12
}

impl YearMonth {
    pub fn new(year: u16, month: u8) -> Self {
        assert!((1..=12).contains(&month), "Month must be 1..=12");
        Self { year, month }
    }

    /// Month containing the given epoch-seconds timestamp (UTC).
    /// Out-of-range timestamps clamp to the Unix epoch.
    pub fn from_epoch(ts: i64) -> Self {
        let dt = OffsetDateTime::from_unix_timestamp(ts).unwrap_or(OffsetDateTime::UNIX_EPOCH);
        let date = dt.date();
        let year = date.year().clamp(0, u16::MAX as i32) as u16;
        let month = date.month() as u8;
        Self { year, month }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}
