//! End-to-end pipeline tests over scripted providers.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};

use commute_core::{
    Coordinates, DateRange, Error, FetchRequest, HourlyObservation, HourlyProvider, Leg,
    ReducerMap, Variable, commute_summaries,
};

#[derive(Debug)]
struct ScriptedProvider {
    observations: Vec<HourlyObservation>,
}

#[async_trait]
impl HourlyProvider for ScriptedProvider {
    async fn fetch_hourly(
        &self,
        _request: &FetchRequest,
    ) -> Result<Vec<HourlyObservation>, Error> {
        Ok(self.observations.clone())
    }
}

#[derive(Debug)]
struct FailingProvider;

#[async_trait]
impl HourlyProvider for FailingProvider {
    async fn fetch_hourly(
        &self,
        _request: &FetchRequest,
    ) -> Result<Vec<HourlyObservation>, Error> {
        Err(Error::Provider(anyhow::anyhow!("upstream outage")))
    }
}

fn observation(date: NaiveDate, hour: u32, code: f64) -> HourlyObservation {
    HourlyObservation {
        timestamp: Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap()),
        values: BTreeMap::from([(Variable::WeatherCode, code)]),
    }
}

fn request(date: NaiveDate, timezone: chrono_tz::Tz) -> FetchRequest {
    FetchRequest {
        coordinates: Coordinates { latitude: 40.44, longitude: -79.96 },
        range: DateRange::single(date),
        variables: vec![Variable::WeatherCode],
        timezone,
    }
}

#[tokio::test]
async fn full_day_reduces_to_two_rows() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
    let observations = (0..24)
        .map(|hour| {
            let code = match hour {
                6 => 1.0,
                7 => 3.0,
                17 => 0.0,
                18 => 2.0,
                _ => 9.0,
            };
            observation(date, hour, code)
        })
        .collect();

    let provider = ScriptedProvider { observations };
    let rows = commute_summaries(
        &provider,
        &request(date, chrono_tz::UTC),
        &ReducerMap::default(),
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].date, rows[0].leg), (date, Leg::Work));
    assert_eq!(rows[0].values[&Variable::WeatherCode], 3.0);
    assert_eq!((rows[1].date, rows[1].leg), (date, Leg::Home));
    assert_eq!(rows[1].values[&Variable::WeatherCode], 2.0);
}

#[tokio::test]
async fn windows_follow_the_civil_timezone() {
    // A January day in Pittsburgh: the commute hours sit at 11:00, 12:00,
    // 22:00, and 23:00 UTC.
    let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    let observations = (0..24)
        .map(|hour| {
            let code = match hour {
                11 => 1.0,
                12 => 3.0,
                22 => 0.0,
                23 => 2.0,
                _ => 9.0,
            };
            observation(date, hour, code)
        })
        .collect();

    let provider = ScriptedProvider { observations };
    let rows = commute_summaries(
        &provider,
        &request(date, chrono_tz::America::New_York),
        &ReducerMap::default(),
    )
    .await
    .unwrap();

    assert_eq!(rows.len(), 2);
    assert_eq!((rows[0].date, rows[0].leg), (date, Leg::Work));
    assert_eq!(rows[0].values[&Variable::WeatherCode], 3.0);
    assert_eq!((rows[1].date, rows[1].leg), (date, Leg::Home));
    assert_eq!(rows[1].values[&Variable::WeatherCode], 2.0);
}

#[tokio::test]
async fn provider_failure_aborts_with_no_rows() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
    let err = commute_summaries(
        &FailingProvider,
        &request(date, chrono_tz::UTC),
        &ReducerMap::default(),
    )
    .await
    .unwrap_err();

    assert!(matches!(err, Error::Provider(_)));
}

#[tokio::test]
async fn rerunning_the_pipeline_is_deterministic() {
    let date = NaiveDate::from_ymd_opt(2024, 5, 6).unwrap();
    let provider = ScriptedProvider {
        observations: (0..24).map(|hour| observation(date, hour, hour as f64)).collect(),
    };
    let req = request(date, chrono_tz::UTC);
    let reducers = ReducerMap::default();

    let first = commute_summaries(&provider, &req, &reducers).await.unwrap();
    let second = commute_summaries(&provider, &req, &reducers).await.unwrap();
    assert_eq!(first, second);
}
