use pvcollect::test_utils::StaticHistorySource;

/// Two devices, the second asleep at the first timestamp.
pub fn two_devices_with_leading_gap() -> Vec<StaticHistorySource> {
    vec![
        StaticHistorySource::new("inv1", &[(100, Some(5.0)), (200, Some(7.0))]),
        StaticHistorySource::new("inv2", &[(100, None), (200, Some(3.0))]),
    ]
}

/// Three devices, the third only reporting at the first timestamp.
pub fn three_devices_one_partial() -> Vec<StaticHistorySource> {
    vec![
        StaticHistorySource::new("inv1", &[(100, Some(1.0)), (200, Some(2.0))]),
        StaticHistorySource::new("inv2", &[(100, Some(10.0)), (200, Some(20.0))]),
        StaticHistorySource::new("inv3", &[(100, Some(100.0))]),
    ]
}

/// Two devices with one reading each, so a repeated pass renders the same
/// value for every signature.
pub fn single_reading_devices() -> Vec<StaticHistorySource> {
    vec![
        StaticHistorySource::new("inv1", &[(100, Some(5.0))]),
        StaticHistorySource::new("inv2", &[(100, Some(3.0))]),
    ]
}

// 2024-03-15T12:30:00Z
pub const PRODUCTION_AT: i64 = 1710505800;

/// Cumulative Wh meters spanning last year up to `PRODUCTION_AT`.
pub fn metered_devices() -> Vec<StaticHistorySource> {
    vec![
        StaticHistorySource::new(
            "inv1",
            &[
                (1700000000, Some(0.0)),      // 2023-11-14
                (1704067200, Some(100_000.0)), // 2024-01-01
                (1709251200, Some(400_000.0)), // 2024-03-01
                (1710460800, Some(480_000.0)), // 2024-03-15
                (PRODUCTION_AT, Some(490_000.0)),
            ],
        ),
        StaticHistorySource::new(
            "inv2",
            &[
                (1700000000, Some(50_000.0)),
                (1704067200, Some(150_000.0)),
                (1709251200, Some(350_000.0)),
                (1710460800, Some(395_000.0)),
                (PRODUCTION_AT, Some(400_000.0)),
            ],
        ),
    ]
}

// 2024-01-30T00:00:00Z, daily meter readings follow
pub const METER_START: i64 = 1706572800;
pub const DAY: i64 = 86400;

/// Daily Wh meter readings crossing from January into February.
pub fn daily_meters() -> Vec<StaticHistorySource> {
    let day = |n: i64| METER_START + n * DAY;
    vec![
        StaticHistorySource::new(
            "inv1",
            &[
                (day(0), Some(1000.0)),
                (day(1), Some(3000.0)),
                (day(2), Some(4500.0)),
                (day(3), Some(6000.4)),
            ],
        ),
        StaticHistorySource::new(
            "inv2",
            &[
                (day(0), Some(500.0)),
                (day(1), Some(1500.0)),
                (day(2), Some(2000.0)),
                (day(3), Some(2250.0)),
            ],
        ),
    ]
}
