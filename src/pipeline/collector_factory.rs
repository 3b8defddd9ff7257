use std::sync::Arc;

use anyhow::{Context, Result, bail};

use super::{Collector, IrradianceSettings};
use crate::config::PvCollectConfig;
use crate::encoding::DedupCache;
use crate::reconcile::check_device_labels;
use crate::sources::{CsvIrradianceSource, HistorySource, JsonHistorySource};
use crate::writers::{LineProtocolFileWriter, PointWriter};

pub async fn collector_from_config(config: &PvCollectConfig) -> Result<Collector> {
    check_device_labels(config.enabled_devices().map(|device| device.name.as_str()))
        .with_context(|| format!("Invalid devices for site {}", config.site_name))?;

    let sources: Vec<Arc<dyn HistorySource>> = config
        .enabled_devices()
        .map(|device| Arc::new(JsonHistorySource::from_config(device)) as Arc<dyn HistorySource>)
        .collect();
    if sources.is_empty() {
        bail!("No enabled devices configured for site {}", config.site_name);
    }

    let writer: Arc<dyn PointWriter> = Arc::new(
        LineProtocolFileWriter::open(
            &config.output,
            config.parse_output_compression()?,
            config.parse_output_buffer_size()?,
        )
        .await
        .with_context(|| format!("Failed to open output {}", config.output))?,
    );

    let dedup = Arc::new(DedupCache::new(config.dedup_capacity()?));
    let collector = Collector::new(sources, writer, dedup);

    Ok(match &config.irradiance_file {
        Some(path) => collector.with_irradiance(
            Arc::new(CsvIrradianceSource::new(path)),
            IrradianceSettings {
                location: config.location(),
                tilt: config.tilt,
                azimuth: config.azimuth,
                freq_seconds: config.irradiance_freq_seconds,
            },
        ),
        None => collector,
    })
}
