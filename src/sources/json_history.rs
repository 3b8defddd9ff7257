use super::HistorySource;
use crate::config::DeviceConfig;
use crate::datamodel::{Sample, SampleSeries};
use crate::transport::TransportError;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Reads a device history from JSON files holding `[{"t": .., "v": ..}]`.
#[derive(Debug, Clone)]
pub struct JsonHistorySource {
    label: String,
    history_file: PathBuf,
    fine_history_file: Option<PathBuf>,
}

impl JsonHistorySource {
    pub fn new(
        label: impl Into<String>,
        history_file: impl Into<PathBuf>,
        fine_history_file: Option<PathBuf>,
    ) -> Self {
        Self {
            label: label.into(),
            history_file: history_file.into(),
            fine_history_file,
        }
    }

    pub fn from_config(device: &DeviceConfig) -> Self {
        Self::new(
            device.name.clone(),
            device.history_file.clone(),
            device.fine_history_file.clone(),
        )
    }

    async fn read_file(
        &self,
        path: &Path,
        start: i64,
        stop: i64,
    ) -> Result<SampleSeries, TransportError> {
        let bytes = tokio::fs::read(path).await?;
        let samples: Vec<Sample> = serde_json::from_slice(&bytes)
            .map_err(|error| TransportError::decode(path.display().to_string(), error))?;
        let total = samples.len();

        let samples: Vec<Sample> = samples
            .into_iter()
            .filter(|sample| sample.timestamp >= start && sample.timestamp <= stop)
            .collect();
        debug!(
            "{}: kept {} of {} samples from {}",
            self.label,
            samples.len(),
            total,
            path.display()
        );

        SampleSeries::new(self.label.as_str(), samples)
            .map_err(|error| TransportError::decode(path.display().to_string(), error))
    }
}

#[async_trait]
impl HistorySource for JsonHistorySource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn read_history(&self, start: i64, stop: i64) -> Result<SampleSeries, TransportError> {
        self.read_file(&self.history_file, start, stop).await
    }

    async fn read_fine_history(
        &self,
        start: i64,
        stop: i64,
    ) -> Result<SampleSeries, TransportError> {
        let path = self
            .fine_history_file
            .as_deref()
            .unwrap_or(self.history_file.as_path());
        self.read_file(path, start, stop).await
    }
}
