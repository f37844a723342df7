//! Glue for one fetch: provider -> window selector -> leg aggregator.

use tracing::{debug, info};

use crate::error::Error;
use crate::model::{FetchRequest, LegSummary};
use crate::provider::HourlyProvider;
use crate::summary::{ReducerMap, summarize};
use crate::window::select_commute_hours;

/// Fetches the request's range and reduces it to one row per (date, leg).
///
/// The stages run in a single pass with no shared state; the first failure
/// aborts the run and no partial rows are returned. Independent fetches
/// carry no ordering requirement, so callers wanting several ranges may
/// issue them concurrently above this function.
pub async fn commute_summaries(
    provider: &dyn HourlyProvider,
    request: &FetchRequest,
    reducers: &ReducerMap,
) -> Result<Vec<LegSummary>, Error> {
    let observations = provider.fetch_hourly(request).await?;
    debug!(hours = observations.len(), "fetched hourly observations");

    let tagged = select_commute_hours(&observations, request.timezone);
    let rows = summarize(&tagged, reducers)?;

    info!(
        rows = rows.len(),
        start = %request.range.start(),
        end = %request.range.end(),
        "built commute summaries"
    );
    Ok(rows)
}
