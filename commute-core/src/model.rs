use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Geographic point, decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, Error> {
        if end < start {
            return Err(Error::InvalidInput(format!(
                "end date {end} is before start date {start}"
            )));
        }
        Ok(Self { start, end })
    }

    pub fn single(date: NaiveDate) -> Self {
        Self { start: date, end: date }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }
}

/// Hourly variable vocabulary. Closed set: every variable the core can
/// request has a reducer assignment and an archive field name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variable {
    WeatherCode,
    Temperature,
    WindSpeed,
    WindDirection,
}

impl Variable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Variable::WeatherCode => "weather_code",
            Variable::Temperature => "temperature",
            Variable::WindSpeed => "wind_speed",
            Variable::WindDirection => "wind_direction",
        }
    }

    /// Field name in the Open-Meteo hourly block.
    pub fn api_name(&self) -> &'static str {
        match self {
            Variable::WeatherCode => "weather_code",
            Variable::Temperature => "temperature_2m",
            Variable::WindSpeed => "wind_speed_10m",
            Variable::WindDirection => "wind_direction_10m",
        }
    }

    pub const fn all() -> &'static [Variable] {
        &[
            Variable::WeatherCode,
            Variable::Temperature,
            Variable::WindSpeed,
            Variable::WindDirection,
        ]
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Variable {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "weather_code" => Ok(Variable::WeatherCode),
            "temperature" => Ok(Variable::Temperature),
            "wind_speed" => Ok(Variable::WindSpeed),
            "wind_direction" => Ok(Variable::WindDirection),
            _ => Err(Error::InvalidInput(format!(
                "unknown variable '{value}'. Supported: weather_code, temperature, wind_speed, wind_direction."
            ))),
        }
    }
}

/// Commute direction. `Work` is the morning window (06:00-07:59 local),
/// `Home` the evening window (17:00-18:59 local). The derived order
/// (Work before Home) is the tie-break for summary rows on the same date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Leg {
    Work,
    Home,
}

impl Leg {
    pub fn as_str(&self) -> &'static str {
        match self {
            Leg::Work => "Work",
            Leg::Home => "Home",
        }
    }
}

impl fmt::Display for Leg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One fetched hour: a UTC instant and the value of each requested variable.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyObservation {
    pub timestamp: DateTime<Utc>,
    pub values: BTreeMap<Variable, f64>,
}

/// An observation inside a commute window, tagged with its leg and the
/// local civil date (which may differ from the UTC date).
#[derive(Debug, Clone, PartialEq)]
pub struct TaggedObservation {
    pub observation: HourlyObservation,
    pub date: NaiveDate,
    pub leg: Leg,
}

/// One output row: the reduced variable values for a (date, leg) pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LegSummary {
    pub date: NaiveDate,
    pub leg: Leg,
    pub values: BTreeMap<Variable, f64>,
}

/// Everything a provider needs to answer one fetch.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub coordinates: Coordinates,
    pub range: DateRange,
    pub variables: Vec<Variable>,
    /// Civil timezone used for commute window classification.
    pub timezone: Tz,
}

/// Human-readable label for a WMO weather interpretation code.
/// See https://open-meteo.com/en/docs#weathervariables
pub fn wmo_description(code: i64) -> &'static str {
    match code {
        0 => "Clear sky",
        1 | 2 => "Partly cloudy",
        3 => "Overcast",
        45 | 48 => "Fog",
        51 | 53 | 55 => "Drizzle",
        56 | 57 => "Freezing drizzle",
        61 | 63 | 65 => "Rain",
        66 | 67 => "Freezing rain",
        71 | 73 | 75 | 77 => "Snow",
        80..=82 => "Rain showers",
        85 | 86 => "Snow showers",
        95 => "Thunderstorm",
        96 | 99 => "Thunderstorm with hail",
        _ => "Unknown",
    }
}
