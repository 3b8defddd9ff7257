use super::EncodingError;

/// Where a metric path lands in the metrics store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricTarget {
    pub measurement: &'static str,
    pub field: &'static str,
}

const fn target(measurement: &'static str, field: &'static str) -> MetricTarget {
    MetricTarget { measurement, field }
}

const METRIC_TABLE: &[(&str, MetricTarget)] = &[
    ("ac_measurements/power", target("ac_measurements", "power")),
    ("ac_measurements/voltage", target("ac_measurements", "voltage")),
    ("ac_measurements/current", target("ac_measurements", "current")),
    ("ac_measurements/efficiency", target("ac_measurements", "efficiency")),
    ("dc_measurements/power", target("dc_measurements", "power")),
    ("status/reason_for_derating", target("status", "derating")),
    ("status/general_operating_status", target("status", "operating_status")),
    ("status/grid_relay", target("status", "grid_relay")),
    ("status/condition", target("status", "condition")),
    ("production/total", target("production", "total")),
    ("production/today", target("production", "today")),
    ("production/month", target("production", "month")),
    ("production/year", target("production", "year")),
    ("production/lifetime", target("production", "lifetime")),
    ("co2avoided/today", target("co2avoided", "today")),
    ("co2avoided/month", target("co2avoided", "month")),
    ("co2avoided/year", target("co2avoided", "year")),
    ("co2avoided/lifetime", target("co2avoided", "lifetime")),
    ("history/day", target("history", "day")),
    ("history/month", target("history", "month")),
    ("sun/irradiance", target("sun", "irradiance")),
];

pub fn lookup(path: &str) -> Result<MetricTarget, EncodingError> {
    METRIC_TABLE
        .iter()
        .find(|(candidate, _)| *candidate == path)
        .map(|(_, target)| *target)
        .ok_or_else(|| EncodingError::UnknownMetric {
            path: path.to_string(),
        })
}

pub fn known_metric_paths() -> impl Iterator<Item = &'static str> {
    METRIC_TABLE.iter().map(|(path, _)| *path)
}
