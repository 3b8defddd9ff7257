use super::ReconcileError;
use crate::datamodel::{Sample, SampleSeries};

/// Replaces the null samples of a series.
///
/// A null takes the most recent known value. A leading run of nulls, which
/// has no earlier value, takes the first known value instead. The output has
/// the same timestamps as the input.
///
/// A series made only of nulls cannot be filled and is reported as
/// [`ReconcileError::IncompleteSeries`]. An empty series is returned as is.
pub fn fill_gaps(series: &SampleSeries) -> Result<SampleSeries, ReconcileError> {
    if series.is_empty() {
        return Ok(series.clone());
    }

    let Some(first_known) = series.first_value() else {
        return Err(ReconcileError::IncompleteSeries {
            label: series.label().to_string(),
        });
    };

    let mut last_known = first_known;
    let samples = series
        .samples()
        .iter()
        .map(|sample| match sample.value {
            Some(value) => {
                last_known = value;
                Sample::new(sample.timestamp, value)
            }
            None => Sample::new(sample.timestamp, last_known),
        })
        .collect();

    Ok(SampleSeries::from_unchecked(series.label(), samples))
}
