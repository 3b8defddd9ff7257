use super::Sample;
use crate::reconcile::ReconcileError;

/// The ordered history of one device, or of the synthesized site.
///
/// Timestamps are strictly increasing. The samples are never mutated in place:
/// every reconciliation step builds a new series.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleSeries {
    label: String,
    samples: Vec<Sample>,
}

impl SampleSeries {
    /// Builds a series and checks that timestamps are strictly increasing.
    pub fn new(label: impl Into<String>, samples: Vec<Sample>) -> Result<Self, ReconcileError> {
        let label = label.into();
        for pair in samples.windows(2) {
            if pair[1].timestamp <= pair[0].timestamp {
                return Err(ReconcileError::UnorderedSeries {
                    label,
                    previous: pair[0].timestamp,
                    timestamp: pair[1].timestamp,
                });
            }
        }
        Ok(Self { label, samples })
    }

    /// Builds a series from samples already known to be ordered.
    pub(crate) fn from_unchecked(label: impl Into<String>, samples: Vec<Sample>) -> Self {
        Self {
            label: label.into(),
            samples,
        }
    }

    pub fn empty(label: impl Into<String>) -> Self {
        Self::from_unchecked(label, Vec::new())
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.samples.iter().map(|sample| sample.timestamp)
    }

    pub fn null_count(&self) -> usize {
        self.samples.iter().filter(|sample| sample.is_null()).count()
    }

    /// First non-null value in time order.
    pub fn first_value(&self) -> Option<f64> {
        self.samples.iter().find_map(|sample| sample.value)
    }

    /// Samples with `start <= timestamp <= stop`.
    pub fn window(&self, start: i64, stop: i64) -> Self {
        let samples = self
            .samples
            .iter()
            .filter(|sample| sample.timestamp >= start && sample.timestamp <= stop)
            .copied()
            .collect();
        Self::from_unchecked(self.label.clone(), samples)
    }

    pub fn into_samples(self) -> Vec<Sample> {
        self.samples
    }
}
