//! Hourly series normalizer: turns a raw provider response (aligned value
//! columns over a time axis) into one [`HourlyObservation`] per hour slot.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};

use crate::error::Error;
use crate::model::{HourlyObservation, Variable};

/// Raw provider response: one equal-length value column per variable,
/// covering `[start, end)` at `interval` spacing, all columns aligned to
/// the same implicit index.
#[derive(Debug, Clone)]
pub struct RawHourlySeries {
    pub start: DateTime<Utc>,
    /// Exclusive.
    pub end: DateTime<Utc>,
    pub interval: Duration,
    pub columns: BTreeMap<Variable, Vec<f64>>,
}

/// Expands a raw series into an ordered, contiguous observation sequence.
///
/// The slot count is `(end - start) / interval`; any column whose length
/// differs fails with [`Error::MalformedResponse`]. No network or caching
/// behavior belongs here.
pub fn normalize(raw: &RawHourlySeries) -> Result<Vec<HourlyObservation>, Error> {
    let interval_secs = raw.interval.num_seconds();
    if interval_secs <= 0 {
        return Err(Error::MalformedResponse(format!(
            "non-positive interval: {interval_secs}s"
        )));
    }

    let span_secs = (raw.end - raw.start).num_seconds();
    if span_secs < 0 || span_secs % interval_secs != 0 {
        return Err(Error::MalformedResponse(format!(
            "time span {span_secs}s is not a whole number of {interval_secs}s intervals"
        )));
    }
    let expected = (span_secs / interval_secs) as usize;

    for (variable, column) in &raw.columns {
        if column.len() != expected {
            return Err(Error::MalformedResponse(format!(
                "column '{variable}' has {} values, expected {expected}",
                column.len()
            )));
        }
    }

    let mut observations = Vec::with_capacity(expected);
    for index in 0..expected {
        let timestamp = raw.start + raw.interval * index as i32;
        let values = raw
            .columns
            .iter()
            .map(|(variable, column)| (*variable, column[index]))
            .collect();
        observations.push(HourlyObservation { timestamp, values });
    }
    Ok(observations)
}
