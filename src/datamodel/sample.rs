use serde::Deserialize;

/// One reading of a device at a unix timestamp (seconds).
///
/// A `None` value means the device reported the timestamp without a value,
/// which happens when an inverter is asleep or its meter was not readable.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Sample {
    #[serde(rename = "t")]
    pub timestamp: i64,
    #[serde(rename = "v")]
    pub value: Option<f64>,
}

impl Sample {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self {
            timestamp,
            value: Some(value),
        }
    }

    pub fn null(timestamp: i64) -> Self {
        Self {
            timestamp,
            value: None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.value.is_none()
    }
}

/// A site-level point with the number of devices that contributed to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AggregatedPoint {
    pub timestamp: i64,
    pub value: f64,
    pub contributor_count: usize,
}
