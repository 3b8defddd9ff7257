use super::{ReconcileError, gap_filler::fill_gaps, labels::check_device_labels};
use crate::datamodel::{AggregatedPoint, SITE_LABEL, Sample, SampleSeries, SeriesSet};
use std::collections::BTreeMap;
use tracing::debug;

/// Result of merging device series into one site series.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    /// The site series, labelled [`SITE_LABEL`].
    pub site: SampleSeries,
    /// Retained points with their contributor count.
    pub points: Vec<AggregatedPoint>,
    /// Devices that could not contribute anything in this window.
    pub degraded: Vec<String>,
    /// Number of devices every retained point was reported by.
    pub expected_contributors: usize,
}

/// Device series after gap filling, followed by the site series.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub series: SeriesSet,
    pub report: AggregateReport,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Sums device series per timestamp.
    ///
    /// A timestamp is kept only when every contributing device reported it,
    /// so a device that was briefly offline removes points rather than
    /// lowering the site total. A null sample after a known value counts as
    /// that value. A leading null does not count at all.
    ///
    /// A device that cannot contribute anything in the window (an empty or
    /// entirely null series) is listed in [`AggregateReport::degraded`] and is
    /// not expected at any timestamp.
    pub fn aggregate(&self, set: &SeriesSet) -> Result<AggregateReport, ReconcileError> {
        if set.is_empty() {
            return Err(ReconcileError::EmptySeriesSet);
        }

        let mut totals: BTreeMap<i64, (f64, usize)> = BTreeMap::new();
        let mut degraded = Vec::new();
        let mut contributors = 0;

        for series in set {
            let mut last_non_null: Option<f64> = None;
            let mut contributed = false;

            for sample in series.samples() {
                let value = match (sample.value, last_non_null) {
                    (Some(value), _) => value,
                    (None, Some(previous)) => previous,
                    (None, None) => continue,
                };
                last_non_null = Some(value);
                contributed = true;

                let (total, count) = totals.entry(sample.timestamp).or_insert((0.0, 0));
                *total += value;
                *count += 1;
            }

            if contributed {
                contributors += 1;
            } else {
                degraded.push(series.label().to_string());
            }
        }

        let points: Vec<AggregatedPoint> = totals
            .into_iter()
            .filter(|(_, (_, count))| contributors > 0 && *count == contributors)
            .map(|(timestamp, (value, contributor_count))| AggregatedPoint {
                timestamp,
                value,
                contributor_count,
            })
            .collect();

        debug!(
            "Aggregated {} devices into {} site points ({} degraded)",
            set.len(),
            points.len(),
            degraded.len()
        );

        let site = SampleSeries::from_unchecked(
            SITE_LABEL,
            points
                .iter()
                .map(|point| Sample::new(point.timestamp, point.value))
                .collect(),
        );

        Ok(AggregateReport {
            site,
            points,
            degraded,
            expected_contributors: contributors,
        })
    }

    /// Gap-fills every series, aggregates them and appends the site series.
    ///
    /// Entirely null series are left out of the output and reported as
    /// degraded devices. A device labelled like the site series is rejected.
    pub fn fill_and_aggregate(&self, set: SeriesSet) -> Result<Reconciliation, ReconcileError> {
        if set.is_empty() {
            return Err(ReconcileError::EmptySeriesSet);
        }
        check_device_labels(set.labels())?;

        let mut filled = SeriesSet::new();
        let mut incomplete = Vec::new();
        for series in &set {
            match fill_gaps(series) {
                Ok(series) => filled.insert(series),
                Err(ReconcileError::IncompleteSeries { label }) => incomplete.push(label),
                Err(err) => return Err(err),
            }
        }

        let mut report = if filled.is_empty() {
            AggregateReport {
                site: SampleSeries::empty(SITE_LABEL),
                points: Vec::new(),
                degraded: Vec::new(),
                expected_contributors: 0,
            }
        } else {
            self.aggregate(&filled)?
        };

        incomplete.append(&mut report.degraded);
        report.degraded = incomplete;
        filled.insert(report.site.clone());

        Ok(Reconciliation {
            series: filled,
            report,
        })
    }
}
