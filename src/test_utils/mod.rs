use crate::datamodel::{EncodedPoint, Sample, SampleSeries};
use crate::encoding::line_protocol::render_line;
use crate::sources::{HistorySource, IrradianceSource, SiteLocation};
use crate::transport::TransportError;
use crate::writers::PointWriter;
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Builds a series from `(timestamp, value)` pairs, `None` being a null sample.
pub fn series(label: &str, samples: &[(i64, Option<f64>)]) -> SampleSeries {
    SampleSeries::new(
        label,
        samples
            .iter()
            .map(|&(timestamp, value)| Sample { timestamp, value })
            .collect(),
    )
    .expect("test series must be ordered")
}

/// History source answering from memory.
#[derive(Debug)]
pub struct StaticHistorySource {
    label: String,
    coarse: Vec<Sample>,
    fine: Option<Vec<Sample>>,
    failing: AtomicBool,
    reads: AtomicUsize,
}

impl StaticHistorySource {
    pub fn new(label: &str, coarse: &[(i64, Option<f64>)]) -> Self {
        Self {
            label: label.to_string(),
            coarse: series(label, coarse).into_samples(),
            fine: None,
            failing: AtomicBool::new(false),
            reads: AtomicUsize::new(0),
        }
    }

    pub fn with_fine(mut self, fine: &[(i64, Option<f64>)]) -> Self {
        self.fine = Some(series(&self.label, fine).into_samples());
        self
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn read(
        &self,
        samples: &[Sample],
        start: i64,
        stop: i64,
    ) -> Result<SampleSeries, TransportError> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable(format!(
                "{} is offline",
                self.label
            )));
        }
        Ok(SampleSeries::new(self.label.as_str(), samples.to_vec())
            .expect("static samples are ordered")
            .window(start, stop))
    }
}

#[async_trait]
impl HistorySource for StaticHistorySource {
    fn label(&self) -> &str {
        &self.label
    }

    async fn read_history(&self, start: i64, stop: i64) -> Result<SampleSeries, TransportError> {
        self.read(&self.coarse, start, stop)
    }

    async fn read_fine_history(
        &self,
        start: i64,
        stop: i64,
    ) -> Result<SampleSeries, TransportError> {
        self.read(self.fine.as_deref().unwrap_or(&self.coarse), start, stop)
    }
}

#[derive(Debug, Default)]
pub struct StaticIrradianceSource {
    pub values: Vec<(i64, f64)>,
}

#[async_trait]
impl IrradianceSource for StaticIrradianceSource {
    async fn get_irradiance(
        &self,
        _location: &SiteLocation,
        start: i64,
        end: i64,
        _tilt: f64,
        _azimuth: f64,
        freq_seconds: i64,
    ) -> Result<Vec<(i64, f64)>, TransportError> {
        if freq_seconds <= 0 {
            return Err(TransportError::Unavailable(format!(
                "invalid irradiance frequency: {}s",
                freq_seconds
            )));
        }
        Ok(self
            .values
            .iter()
            .copied()
            .filter(|(timestamp, _)| {
                *timestamp >= start && *timestamp <= end && timestamp.rem_euclid(freq_seconds) == 0
            })
            .collect())
    }
}

/// Writer keeping the rendered lines in memory. It can be made to fail.
#[derive(Debug, Default)]
pub struct MemoryWriter {
    lines: Mutex<Vec<String>>,
    failing: AtomicBool,
    writes: AtomicUsize,
}

impl MemoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Successful write calls.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn clear(&self) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[async_trait]
impl PointWriter for MemoryWriter {
    async fn write(&self, points: &[EncodedPoint]) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Unavailable(
                "memory writer is failing".to_string(),
            ));
        }
        let mut lines = self.lines.lock().unwrap_or_else(PoisonError::into_inner);
        lines.extend(points.iter().map(render_line));
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
