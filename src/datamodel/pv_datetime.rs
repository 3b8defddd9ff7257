pub type PvDateTime = hifitime::Epoch;
use hifitime::{HifitimeError, UNIX_REF_EPOCH, Unit};

pub trait PvDateTimeExt {
    fn from_unix_seconds_i64(timestamp: i64) -> Self;
    fn to_unix_seconds_i64(&self) -> i64;
}

impl PvDateTimeExt for PvDateTime {
    fn from_unix_seconds_i64(timestamp: i64) -> Self {
        Self::from_utc_duration(UNIX_REF_EPOCH.to_utc_duration() + timestamp * Unit::Second)
    }

    fn to_unix_seconds_i64(&self) -> i64 {
        self.to_unix_seconds().round() as i64
    }
}

pub fn now_unix_seconds() -> Result<i64, HifitimeError> {
    Ok(PvDateTime::now()?.to_unix_seconds().floor() as i64)
}

/// Midnight UTC of the day containing `timestamp`.
pub fn day_start(timestamp: i64) -> i64 {
    let (year, month, day, ..) = PvDateTime::from_unix_seconds_i64(timestamp).to_gregorian_utc();
    PvDateTime::from_gregorian_utc_at_midnight(year, month, day).to_unix_seconds_i64()
}

/// Midnight UTC of the first day of the month containing `timestamp`.
pub fn month_start(timestamp: i64) -> i64 {
    let (year, month, ..) = PvDateTime::from_unix_seconds_i64(timestamp).to_gregorian_utc();
    PvDateTime::from_gregorian_utc_at_midnight(year, month, 1).to_unix_seconds_i64()
}

/// Midnight UTC of January 1st of the year containing `timestamp`.
pub fn year_start(timestamp: i64) -> i64 {
    let (year, ..) = PvDateTime::from_unix_seconds_i64(timestamp).to_gregorian_utc();
    PvDateTime::from_gregorian_utc_at_midnight(year, 1, 1).to_unix_seconds_i64()
}

#[cfg(test)]
mod tests {
    use super::*;

    // 2024-03-15T12:30:00Z
    const MID_MARCH: i64 = 1710505800;

    #[test]
    fn test_unix_seconds_roundtrip() {
        for &timestamp in &[0_i64, 1704067200, MID_MARCH] {
            let epoch = PvDateTime::from_unix_seconds_i64(timestamp);
            assert_eq!(epoch.to_unix_seconds_i64(), timestamp);
        }
    }

    #[test]
    fn test_period_starts() {
        assert_eq!(day_start(MID_MARCH), 1710460800); // 2024-03-15T00:00:00Z
        assert_eq!(month_start(MID_MARCH), 1709251200); // 2024-03-01T00:00:00Z
        assert_eq!(year_start(MID_MARCH), 1704067200); // 2024-01-01T00:00:00Z
        assert_eq!(month_start(1709251200), 1709251200);
    }

    #[test]
    fn test_now_is_after_2024() {
        assert!(now_unix_seconds().unwrap() > 1704067200);
    }
}
