use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use inquire::{CustomType, Text};

use commute_core::{
    Config, DateRange, FetchRequest, OpenMeteoProvider, ReducerMap, RetryPolicy, Variable,
    commute_summaries, wmo_description,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "commute-weather", version, about = "Commute weather summaries")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Set the commute location and timezone interactively.
    Configure,

    /// Show commute weather summaries for a date range.
    Show {
        /// First date to fetch, YYYY-MM-DD.
        start: String,

        /// Optional last date; if absent, only the start date is fetched.
        #[arg(long)]
        end: Option<String>,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Show { start, end } => show(&start, end.as_deref()).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    config.latitude = CustomType::<f64>::new("Latitude (decimal degrees):")
        .with_default(config.latitude)
        .prompt()?;
    config.longitude = CustomType::<f64>::new("Longitude (decimal degrees):")
        .with_default(config.longitude)
        .prompt()?;
    config.timezone = Text::new("Timezone (IANA name):")
        .with_default(&config.timezone)
        .prompt()?;

    // validate before writing anything
    config.timezone()?;
    config.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(start: &str, end: Option<&str>) -> Result<()> {
    let config = Config::load()?;
    let timezone = config.timezone()?;

    let start = parse_date(start)?;
    let end = end.map(parse_date).transpose()?.unwrap_or(start);
    let range = DateRange::new(start, end)?;

    let mut provider = OpenMeteoProvider::new().with_retry(RetryPolicy {
        max_attempts: config.retry_attempts,
        ..RetryPolicy::default()
    });
    if let Some(dir) = &config.cache_dir {
        provider = provider.with_cache_dir(dir);
    }

    let request = FetchRequest {
        coordinates: config.coordinates(),
        range,
        variables: vec![Variable::WeatherCode, Variable::WindSpeed],
        timezone,
    };

    let rows = commute_summaries(&provider, &request, &ReducerMap::default()).await?;

    if rows.is_empty() {
        println!("No commute hours in the fetched range.");
        return Ok(());
    }

    for row in rows {
        let code = row.values.get(&Variable::WeatherCode).copied().unwrap_or(0.0) as i64;
        let wind = row
            .values
            .get(&Variable::WindSpeed)
            .map(|mph| format!("  wind {mph:.1} mph"))
            .unwrap_or_default();

        println!(
            "{}  {:<4}  code {:>2} ({}){}",
            row.date,
            row.leg,
            code,
            wmo_description(code),
            wind
        );
    }
    Ok(())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{s}', expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_iso_dates() {
        let date = parse_date("2024-05-06").unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(2024, 5, 6).unwrap());
    }

    #[test]
    fn rejects_non_dates() {
        let err = parse_date("yesterday").unwrap_err();
        assert!(err.to_string().contains("Invalid date"));
    }
}
