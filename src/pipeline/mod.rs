use crate::datamodel::{
    EncodedPoint, Sample, SampleSeries, SeriesSet, SITE_LABEL, SiteSample,
    pv_datetime::{day_start, month_start, now_unix_seconds, year_start},
};
use crate::encoding::{DedupCache, PointEncoder, Timestamping, ValueKind};
use crate::reconcile::{
    Aggregator, ReconcileError, check_device_labels,
    production::{
        DeviceProduction, HistoryPeriod, PRODUCTION_PRECISION, ProductionBaselines,
        ProductionStats, co2_avoided, round_to,
    },
};
use crate::sources::{HistorySource, IrradianceSource, SiteLocation};
use crate::transport::TransportError;
use crate::writers::PointWriter;
use futures::future::try_join_all;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod collector_factory;

pub use collector_factory::collector_from_config;

pub const IRRADIANCE_METRIC: &str = "sun/irradiance";

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryResolution {
    #[default]
    Coarse,
    Fine,
}

/// Counters of one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassReport {
    pub polled_devices: usize,
    pub degraded_devices: Vec<String>,
    pub site_points: usize,
    pub encoded_points: usize,
    pub emitted_points: usize,
    pub suppressed_fields: usize,
    pub skipped_metrics: usize,
}

impl fmt::Display for PassReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} devices polled ({} degraded), {} site points, {} points encoded, {} emitted, {} fields suppressed, {} metrics skipped",
            self.polled_devices,
            self.degraded_devices.len(),
            self.site_points,
            self.encoded_points,
            self.emitted_points,
            self.suppressed_fields,
            self.skipped_metrics
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IrradianceSettings {
    pub location: SiteLocation,
    pub tilt: f64,
    pub azimuth: f64,
    pub freq_seconds: i64,
}

/// Polls every device, reconciles their series and writes the site points.
///
/// The dedup cache is injected so several collectors, or successive passes,
/// can share it.
#[derive(Debug)]
pub struct Collector {
    sources: Vec<Arc<dyn HistorySource>>,
    writer: Arc<dyn PointWriter>,
    dedup: Arc<DedupCache>,
    encoder: PointEncoder,
    aggregator: Aggregator,
    irradiance: Option<(Arc<dyn IrradianceSource>, IrradianceSettings)>,
}

impl Collector {
    pub fn new(
        sources: Vec<Arc<dyn HistorySource>>,
        writer: Arc<dyn PointWriter>,
        dedup: Arc<DedupCache>,
    ) -> Self {
        Self {
            sources,
            writer,
            dedup,
            encoder: PointEncoder::new(),
            aggregator: Aggregator::new(),
            irradiance: None,
        }
    }

    pub fn with_irradiance(
        mut self,
        source: Arc<dyn IrradianceSource>,
        settings: IrradianceSettings,
    ) -> Self {
        self.irradiance = Some((source, settings));
        self
    }

    pub fn dedup(&self) -> &Arc<DedupCache> {
        &self.dedup
    }

    /// Reads every device concurrently. Any transport error fails the poll,
    /// and so do duplicate or reserved device labels.
    pub async fn poll(
        &self,
        start: i64,
        stop: i64,
        resolution: HistoryResolution,
    ) -> Result<SeriesSet, PipelineError> {
        let series = try_join_all(self.sources.iter().map(|source| async move {
            match resolution {
                HistoryResolution::Coarse => source.read_history(start, stop).await,
                HistoryResolution::Fine => source.read_fine_history(start, stop).await,
            }
        }))
        .await?;
        debug!("Polled {} devices over {}..={}", series.len(), start, stop);
        check_device_labels(series.iter().map(SampleSeries::label))?;
        Ok(series.into_iter().collect())
    }

    /// Backfills `metric` over a window: every device series after gap
    /// filling, and the site series, each point at its own timestamp.
    pub async fn history_pass(
        &self,
        metric: &str,
        start: i64,
        stop: i64,
        resolution: HistoryResolution,
        kind: ValueKind,
    ) -> Result<PassReport, PipelineError> {
        let mut report = PassReport::default();
        let set = self.poll(start, stop, resolution).await?;
        report.polled_devices = set.len();

        let reconciliation = self.aggregator.fill_and_aggregate(set)?;
        for label in &reconciliation.report.degraded {
            warn!("Device {} has no usable data between {} and {}", label, start, stop);
        }
        report.degraded_devices = reconciliation.report.degraded.clone();
        report.site_points = reconciliation.report.points.len();

        let points = match self.encoder.encode_series(metric, &reconciliation.series, kind) {
            Ok(points) => points,
            Err(error) => {
                warn!("Skipping {}: {}", metric, error);
                report.skipped_metrics += 1;
                Vec::new()
            }
        };
        self.emit(points, &mut report).await?;

        info!("History pass for {}: {}", metric, report);
        Ok(report)
    }

    /// Encodes a structured sample. A failing metric is logged and skipped.
    pub fn encode_sample(
        &self,
        metric: &str,
        sample: &SiteSample,
        timestamping: Timestamping,
        report: &mut PassReport,
    ) -> Vec<EncodedPoint> {
        match self.encoder.encode(metric, sample, timestamping) {
            Ok(points) => points,
            Err(error) => {
                warn!("Skipping {}: {}", metric, error);
                report.skipped_metrics += 1;
                Vec::new()
            }
        }
    }

    /// Encodes the samples, deduplicates and writes whatever could be encoded.
    pub async fn publish_samples(
        &self,
        samples: &[(String, SiteSample)],
        timestamping: Timestamping,
    ) -> Result<PassReport, PipelineError> {
        let mut report = PassReport::default();
        self.publish_into(samples, timestamping, &mut report).await?;
        Ok(report)
    }

    async fn publish_into(
        &self,
        samples: &[(String, SiteSample)],
        timestamping: Timestamping,
        report: &mut PassReport,
    ) -> Result<(), PipelineError> {
        let mut points = Vec::new();
        for (metric, sample) in samples {
            points.extend(self.encode_sample(metric, sample, timestamping, report));
        }
        self.emit(points, report).await
    }

    /// Deduplicates then writes. Dedup updates stay when the write fails.
    async fn emit(
        &self,
        points: Vec<EncodedPoint>,
        report: &mut PassReport,
    ) -> Result<(), PipelineError> {
        report.encoded_points += points.len();
        let outcome = self.dedup.filter(points);
        report.suppressed_fields += outcome.suppressed_fields;
        if outcome.points.is_empty() {
            debug!("Nothing to write after deduplication");
            return Ok(());
        }
        self.writer.write(&outcome.points).await?;
        report.emitted_points += outcome.points.len();
        Ok(())
    }

    /// Production of every period up to `at` (now when `None`) and the CO2
    /// it avoided.
    pub async fn production_pass(
        &self,
        at: Option<i64>,
        co2_factor: f64,
    ) -> Result<PassReport, PipelineError> {
        let (now, timestamping) = match at {
            Some(at) => (at, Timestamping::At(at)),
            None => {
                let now = now_unix_seconds().map_err(|error| {
                    TransportError::Unavailable(format!("failed to read the clock: {}", error))
                })?;
                (now, Timestamping::Now)
            }
        };

        let mut report = PassReport::default();
        let set = self.poll(0, now, HistoryResolution::Coarse).await?;
        report.polled_devices = set.len();

        let mut devices = Vec::with_capacity(set.len());
        for series in &set {
            match device_production(series, now) {
                Some(device) => devices.push(device),
                None => {
                    warn!("Device {} has no meter reading before {}", series.label(), now);
                    report.degraded_devices.push(series.label().to_string());
                }
            }
        }
        if devices.is_empty() {
            return Err(ReconcileError::EmptySeriesSet.into());
        }

        let stats = ProductionStats::compute(&devices);
        let mut samples: Vec<(String, SiteSample)> = stats
            .periods()
            .iter()
            .map(|(period, sample)| (period.production_metric(), sample.clone()))
            .collect();
        samples.extend(
            co2_avoided(&stats, co2_factor)
                .into_iter()
                .map(|(period, sample)| (period.co2_metric(), sample)),
        );

        report.site_points = samples.len();
        self.publish_into(&samples, timestamping, &mut report).await?;

        info!("Production pass at {}: {}", now, report);
        Ok(report)
    }

    /// Writes the site kWh produced per day or per month over a window.
    ///
    /// Each device meter is turned into per bucket deltas first. A bucket is
    /// kept only when every contributing device produced a delta for it.
    pub async fn history_period_pass(
        &self,
        period: HistoryPeriod,
        start: i64,
        stop: i64,
    ) -> Result<PassReport, PipelineError> {
        let metric = period.metric();
        let mut report = PassReport::default();
        let set = self.poll(start, stop, HistoryResolution::Coarse).await?;
        report.polled_devices = set.len();

        let deltas: SeriesSet = set.iter().map(|meter| period.deltas(meter)).collect();
        let reconciliation = self.aggregator.fill_and_aggregate(deltas)?;
        for label in &reconciliation.report.degraded {
            warn!(
                "Device {} has no {} history between {} and {}",
                label,
                period.as_str(),
                start,
                stop
            );
        }
        report.degraded_devices = reconciliation.report.degraded.clone();
        report.site_points = reconciliation.report.points.len();

        let site = SampleSeries::from_unchecked(
            SITE_LABEL,
            reconciliation
                .report
                .points
                .iter()
                .map(|point| {
                    Sample::new(point.timestamp, round_to(point.value, PRODUCTION_PRECISION))
                })
                .collect(),
        );
        let set: SeriesSet = std::iter::once(site).collect();
        let points = match self.encoder.encode_series(&metric, &set, ValueKind::Float) {
            Ok(points) => points,
            Err(error) => {
                warn!("Skipping {}: {}", metric, error);
                report.skipped_metrics += 1;
                Vec::new()
            }
        };
        self.emit(points, &mut report).await?;

        info!("History pass for {}: {}", metric, report);
        Ok(report)
    }

    /// Writes the site irradiance over a window.
    pub async fn irradiance_pass(&self, start: i64, stop: i64) -> Result<PassReport, PipelineError> {
        let Some((source, settings)) = &self.irradiance else {
            return Err(
                TransportError::Unavailable("no irradiance source configured".to_string()).into(),
            );
        };

        let mut report = PassReport::default();
        let values = source
            .get_irradiance(
                &settings.location,
                start,
                stop,
                settings.tilt,
                settings.azimuth,
                settings.freq_seconds,
            )
            .await?;
        let series = SampleSeries::new(
            SITE_LABEL,
            values
                .into_iter()
                .map(|(timestamp, value)| Sample::new(timestamp, value))
                .collect(),
        )?;
        report.site_points = series.len();

        let set: SeriesSet = std::iter::once(series).collect();
        let points = match self
            .encoder
            .encode_series(IRRADIANCE_METRIC, &set, ValueKind::Float)
        {
            Ok(points) => points,
            Err(error) => {
                warn!("Skipping {}: {}", IRRADIANCE_METRIC, error);
                report.skipped_metrics += 1;
                Vec::new()
            }
        };
        self.emit(points, &mut report).await?;

        info!("Irradiance pass over {}..={}: {}", start, stop, report);
        Ok(report)
    }
}

/// The last reading up to `at` and the first reading of each period.
///
/// A period without any reading yet uses the current reading as baseline.
fn device_production(series: &SampleSeries, at: i64) -> Option<DeviceProduction> {
    let readings: Vec<(i64, f64)> = series
        .samples()
        .iter()
        .filter(|sample| sample.timestamp <= at)
        .filter_map(|sample| sample.value.map(|value| (sample.timestamp, value)))
        .collect();
    let &(_, current_wh) = readings.last()?;

    let first_since = |since: i64| {
        readings
            .iter()
            .find(|(timestamp, _)| *timestamp >= since)
            .map(|(_, value)| *value)
            .unwrap_or(current_wh)
    };

    Some(DeviceProduction {
        label: series.label().to_string(),
        current_wh,
        baselines: ProductionBaselines {
            today: first_since(day_start(at)),
            month: first_since(month_start(at)),
            year: first_since(year_start(at)),
            lifetime: readings[0].1,
        },
    })
}
