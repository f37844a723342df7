//! Commute window selector: keeps only the hours that fall inside the
//! morning (06:00-07:59) or evening (17:00-18:59) local window.
//!
//! Classification is by local hour-of-day, not positional row offsets, so a
//! fetch range that does not start at local midnight still selects the right
//! hours, and the calendar date is the local civil date rather than the UTC
//! date.

use chrono::Timelike;
use chrono_tz::Tz;

use crate::model::{HourlyObservation, Leg, TaggedObservation};

/// Classifies a local hour-of-day into a commute leg, if any.
pub fn classify_hour(hour: u32) -> Option<Leg> {
    match hour {
        6 | 7 => Some(Leg::Work),
        17 | 18 => Some(Leg::Home),
        _ => None,
    }
}

/// Extracts the commute-window hours from a UTC series.
///
/// Each selected hour is tagged with its leg and local civil date; all other
/// hours are dropped. Input order is preserved. Pure: an empty input yields
/// an empty output, not an error.
pub fn select_commute_hours(
    observations: &[HourlyObservation],
    timezone: Tz,
) -> Vec<TaggedObservation> {
    observations
        .iter()
        .filter_map(|observation| {
            let local = observation.timestamp.with_timezone(&timezone);
            classify_hour(local.hour()).map(|leg| TaggedObservation {
                observation: observation.clone(),
                date: local.date_naive(),
                leg,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Variable;
    use chrono::{NaiveDate, TimeZone, Utc};
    use std::collections::BTreeMap;

    fn obs(day: u32, hour: u32) -> HourlyObservation {
        HourlyObservation {
            timestamp: Utc.with_ymd_and_hms(2024, 1, day, hour, 0, 0).unwrap(),
            values: BTreeMap::from([(Variable::WeatherCode, hour as f64)]),
        }
    }

    #[test]
    fn classifies_only_window_hours() {
        for hour in 0..24 {
            let expected = match hour {
                6 | 7 => Some(Leg::Work),
                17 | 18 => Some(Leg::Home),
                _ => None,
            };
            assert_eq!(classify_hour(hour), expected, "hour {hour}");
        }
    }

    #[test]
    fn selects_four_hours_from_a_utc_day() {
        let observations: Vec<_> = (0..24).map(|hour| obs(15, hour)).collect();
        let tagged = select_commute_hours(&observations, chrono_tz::UTC);

        assert_eq!(tagged.len(), 4);
        let hours: Vec<u32> = tagged
            .iter()
            .map(|t| t.observation.timestamp.hour())
            .collect();
        assert_eq!(hours, vec![6, 7, 17, 18]);
        assert_eq!(tagged[0].leg, Leg::Work);
        assert_eq!(tagged[1].leg, Leg::Work);
        assert_eq!(tagged[2].leg, Leg::Home);
        assert_eq!(tagged[3].leg, Leg::Home);
    }

    #[test]
    fn classification_uses_local_hour() {
        // 11:00 UTC on a January day is 06:00 in Pittsburgh (UTC-5)
        let tagged = select_commute_hours(&[obs(15, 11)], chrono_tz::America::New_York);
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].leg, Leg::Work);
        assert_eq!(tagged[0].date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());

        // 06:00 UTC is 01:00 local, outside both windows
        let tagged = select_commute_hours(&[obs(15, 6)], chrono_tz::America::New_York);
        assert!(tagged.is_empty());
    }

    #[test]
    fn date_is_local_civil_date_not_utc_date() {
        // 21:00 UTC on the 15th is 06:00 on the 16th in Tokyo
        let tagged = select_commute_hours(&[obs(15, 21)], chrono_tz::Asia::Tokyo);
        assert_eq!(tagged.len(), 1);
        assert_eq!(tagged[0].leg, Leg::Work);
        assert_eq!(tagged[0].date, NaiveDate::from_ymd_opt(2024, 1, 16).unwrap());
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(select_commute_hours(&[], chrono_tz::UTC).is_empty());
    }

    #[test]
    fn values_pass_through_untouched() {
        let tagged = select_commute_hours(&[obs(15, 18)], chrono_tz::UTC);
        assert_eq!(tagged[0].observation.values[&Variable::WeatherCode], 18.0);
    }
}
