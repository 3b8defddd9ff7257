use super::{IrradianceSource, SiteLocation};
use crate::transport::TransportError;
use async_trait::async_trait;
use csv_async::AsyncReader;
use futures::StreamExt;
use std::path::PathBuf;
use tracing::debug;

/// Irradiance read from a `timestamp,value` CSV file.
///
/// The file is expected to already hold plane of array values for the
/// configured site, so location and orientation are only logged.
#[derive(Debug, Clone)]
pub struct CsvIrradianceSource {
    path: PathBuf,
}

impl CsvIrradianceSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn source_name(&self) -> String {
        self.path.display().to_string()
    }
}

#[async_trait]
impl IrradianceSource for CsvIrradianceSource {
    async fn get_irradiance(
        &self,
        location: &SiteLocation,
        start: i64,
        end: i64,
        tilt: f64,
        azimuth: f64,
        freq_seconds: i64,
    ) -> Result<Vec<(i64, f64)>, TransportError> {
        if freq_seconds <= 0 {
            return Err(TransportError::Unavailable(format!(
                "invalid irradiance frequency: {}s",
                freq_seconds
            )));
        }
        debug!(
            "Reading irradiance for ({}, {}) tilt {} azimuth {} from {}",
            location.latitude,
            location.longitude,
            tilt,
            azimuth,
            self.path.display()
        );

        let bytes = tokio::fs::read(&self.path).await?;
        let mut reader = AsyncReader::from_reader(&bytes[..]);

        let headers = reader
            .headers()
            .await
            .map_err(|error| TransportError::decode(self.source_name(), error))?;
        if headers.len() != 2 || &headers[0] != "timestamp" || &headers[1] != "value" {
            return Err(TransportError::decode(
                self.source_name(),
                "expected a timestamp,value header",
            ));
        }

        let mut values = Vec::new();
        let mut records = reader.records();
        while let Some(record) = records.next().await {
            let record = record.map_err(|error| TransportError::decode(self.source_name(), error))?;
            let timestamp: i64 = record[0]
                .trim()
                .parse()
                .map_err(|error| TransportError::decode(self.source_name(), error))?;
            if timestamp < start || timestamp > end || timestamp.rem_euclid(freq_seconds) != 0 {
                continue;
            }
            let value: f64 = record[1]
                .trim()
                .parse()
                .map_err(|error| TransportError::decode(self.source_name(), error))?;
            values.push((timestamp, value));
        }
        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const LOCATION: SiteLocation = SiteLocation {
        latitude: 59.91,
        longitude: 10.75,
    };

    fn csv_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_window_and_resampling() {
        let file = csv_file("timestamp,value\n0,10.0\n300,20.0\n900,30.0\n1200,40.0\n1800,50.0\n");
        let source = CsvIrradianceSource::new(file.path());

        let values = source
            .get_irradiance(&LOCATION, 0, 1200, 30.0, 180.0, 900)
            .await
            .unwrap();
        assert_eq!(values, vec![(0, 10.0), (900, 30.0)]);
    }

    #[tokio::test]
    async fn test_header_is_required() {
        let file = csv_file("time,irradiance\n0,10.0\n");
        let source = CsvIrradianceSource::new(file.path());
        assert!(matches!(
            source.get_irradiance(&LOCATION, 0, 10, 30.0, 180.0, 900).await,
            Err(TransportError::Decode { .. })
        ));
    }

    #[tokio::test]
    async fn test_bad_values() {
        let file = csv_file("timestamp,value\n0,bright\n");
        let source = CsvIrradianceSource::new(file.path());
        assert!(
            source
                .get_irradiance(&LOCATION, 0, 10, 30.0, 180.0, 900)
                .await
                .is_err()
        );
        assert!(matches!(
            source.get_irradiance(&LOCATION, 0, 10, 30.0, 180.0, 0).await,
            Err(TransportError::Unavailable(_))
        ));
    }
}
