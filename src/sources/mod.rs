use crate::datamodel::SampleSeries;
use crate::transport::TransportError;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod csv_irradiance;
pub mod json_history;

pub use csv_irradiance::CsvIrradianceSource;
pub use json_history::JsonHistorySource;

/// Per-device cumulative history, one implementation per device.
#[async_trait]
pub trait HistorySource: Send + Sync + Debug {
    fn label(&self) -> &str;

    /// Coarse history over `start..=stop`, unix seconds.
    async fn read_history(&self, start: i64, stop: i64) -> Result<SampleSeries, TransportError>;

    /// Fine-resolution history over `start..=stop`, unix seconds.
    async fn read_fine_history(&self, start: i64, stop: i64)
    -> Result<SampleSeries, TransportError>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SiteLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[async_trait]
pub trait IrradianceSource: Send + Sync + Debug {
    /// Plane of array irradiance (W/m²) over `start..=end`, sampled every
    /// `freq_seconds`.
    async fn get_irradiance(
        &self,
        location: &SiteLocation,
        start: i64,
        end: i64,
        tilt: f64,
        azimuth: f64,
        freq_seconds: i64,
    ) -> Result<Vec<(i64, f64)>, TransportError>;
}
