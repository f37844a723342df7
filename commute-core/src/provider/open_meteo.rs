use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Duration};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::Error;
use crate::model::{FetchRequest, HourlyObservation, Variable};
use crate::series::{RawHourlySeries, normalize};

use super::{HourlyProvider, RetryPolicy};

const ARCHIVE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Open-Meteo historical archive client. No API key required.
///
/// Units are fixed: temperature in Fahrenheit, wind speed in mph,
/// precipitation in inches. Responses are requested UTC-aligned; civil
/// timezone handling happens downstream in the window selector.
///
/// Caching is opt-in and explicit: give the client a directory and it keeps
/// one JSON body per request, never expired (archive data for a past date
/// does not change).
#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
    cache_dir: Option<PathBuf>,
}

impl OpenMeteoProvider {
    pub fn new() -> Self {
        Self {
            http: Client::new(),
            base_url: ARCHIVE_URL.to_string(),
            retry: RetryPolicy::default(),
            cache_dir: None,
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Cache response bodies under `dir`, one file per request.
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = Some(dir.into());
        self
    }

    /// Point the client at a different archive endpoint (tests, proxies).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn query(request: &FetchRequest) -> Vec<(&'static str, String)> {
        let hourly = request
            .variables
            .iter()
            .map(|v| v.api_name())
            .collect::<Vec<_>>()
            .join(",");

        vec![
            ("latitude", request.coordinates.latitude.to_string()),
            ("longitude", request.coordinates.longitude.to_string()),
            ("start_date", request.range.start().to_string()),
            ("end_date", request.range.end().to_string()),
            ("hourly", hourly),
            ("temperature_unit", "fahrenheit".to_string()),
            ("wind_speed_unit", "mph".to_string()),
            ("precipitation_unit", "inch".to_string()),
            ("timeformat", "unixtime".to_string()),
            ("timezone", "UTC".to_string()),
        ]
    }

    fn cache_path(&self, request: &FetchRequest) -> Option<PathBuf> {
        let dir = self.cache_dir.as_ref()?;
        let variables = request
            .variables
            .iter()
            .map(Variable::as_str)
            .collect::<Vec<_>>()
            .join("-");
        let name = format!(
            "{}_{}_{}_{}_{}.json",
            request.coordinates.latitude,
            request.coordinates.longitude,
            request.range.start(),
            request.range.end(),
            variables
        );
        Some(dir.join(name))
    }

    async fn fetch_body(&self, request: &FetchRequest) -> Result<String, Error> {
        if let Some(path) = self.cache_path(request) {
            if let Ok(body) = std::fs::read_to_string(&path) {
                debug!(path = %path.display(), "archive cache hit");
                return Ok(body);
            }
        }

        let body = self.fetch_body_with_retry(request).await?;

        if let Some(path) = self.cache_path(request) {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            if let Err(err) = std::fs::write(&path, &body) {
                warn!(path = %path.display(), %err, "failed to write archive cache");
            }
        }
        Ok(body)
    }

    async fn fetch_body_with_retry(&self, request: &FetchRequest) -> Result<String, Error> {
        let query = Self::query(request);
        let mut last_err = None;

        for attempt in 1..=self.retry.max_attempts.max(1) {
            if attempt > 1 {
                let delay = self.retry.backoff(attempt - 1);
                warn!(attempt, ?delay, "retrying archive request");
                tokio::time::sleep(delay).await;
            }

            match self.send_request(&query).await {
                Ok(body) => return Ok(body),
                Err(err) => {
                    debug!(attempt, %err, "archive request failed");
                    last_err = Some(err);
                }
            }
        }

        Err(Error::Provider(
            last_err.unwrap_or_else(|| anyhow!("archive request failed")),
        ))
    }

    async fn send_request(&self, query: &[(&'static str, String)]) -> Result<String> {
        let res = self
            .http
            .get(&self.base_url)
            .query(query)
            .send()
            .await
            .context("Failed to send request to Open-Meteo archive")?;

        let status = res.status();
        let body = res
            .text()
            .await
            .context("Failed to read Open-Meteo archive response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Open-Meteo archive request failed with status {}: {}",
                status,
                truncate_body(&body),
            ));
        }

        Ok(body)
    }
}

impl Default for OpenMeteoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Deserialize)]
struct ArchiveResponse {
    hourly: ArchiveHourly,
}

/// Hourly block of the archive payload. Only requested columns are present;
/// the rest deserialize empty and fail the length check if ever referenced.
#[derive(Debug, Deserialize)]
struct ArchiveHourly {
    time: Vec<i64>,
    #[serde(default)]
    weather_code: Vec<f64>,
    #[serde(default)]
    temperature_2m: Vec<f64>,
    #[serde(default)]
    wind_speed_10m: Vec<f64>,
    #[serde(default)]
    wind_direction_10m: Vec<f64>,
}

impl ArchiveHourly {
    fn column(&self, variable: Variable) -> &[f64] {
        match variable {
            Variable::WeatherCode => &self.weather_code,
            Variable::Temperature => &self.temperature_2m,
            Variable::WindSpeed => &self.wind_speed_10m,
            Variable::WindDirection => &self.wind_direction_10m,
        }
    }
}

/// Rebuilds the (start, end, interval, columns) form from the payload's
/// unixtime axis. Interval comes from the first two entries; a single-entry
/// axis is taken as one hour.
fn raw_series(hourly: &ArchiveHourly, variables: &[Variable]) -> Result<RawHourlySeries, Error> {
    let times = &hourly.time;
    let (&first, &last) = match (times.first(), times.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return Err(Error::MalformedResponse("empty time axis".to_string())),
    };

    let start = DateTime::from_timestamp(first, 0)
        .ok_or_else(|| Error::MalformedResponse(format!("invalid start timestamp {first}")))?;
    let interval = if times.len() > 1 {
        Duration::seconds(times[1] - first)
    } else {
        Duration::hours(1)
    };
    let end = DateTime::from_timestamp(last, 0)
        .ok_or_else(|| Error::MalformedResponse(format!("invalid end timestamp {last}")))?
        + interval;

    let mut columns = BTreeMap::new();
    for &variable in variables {
        columns.insert(variable, hourly.column(variable).to_vec());
    }

    Ok(RawHourlySeries { start, end, interval, columns })
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX { format!("{}...", &body[..MAX]) } else { body.to_string() }
}

#[async_trait]
impl HourlyProvider for OpenMeteoProvider {
    async fn fetch_hourly(
        &self,
        request: &FetchRequest,
    ) -> Result<Vec<HourlyObservation>, Error> {
        let body = self.fetch_body(request).await?;

        let parsed: ArchiveResponse = serde_json::from_str(&body)
            .map_err(|err| Error::MalformedResponse(format!("invalid archive JSON: {err}")))?;

        let raw = raw_series(&parsed.hourly, &request.variables)?;
        normalize(&raw)
    }
}
