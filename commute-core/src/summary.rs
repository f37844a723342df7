//! Leg aggregator: groups tagged observations by (date, leg) and collapses
//! each variable's values with its assigned reducer.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::error::Error;
use crate::model::{Leg, LegSummary, TaggedObservation, Variable};

/// Collapses a group of values to one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Max,
    Mean,
}

impl Reducer {
    /// Reduce a non-empty slice. A singleton reduces to its own value.
    pub fn apply(&self, values: &[f64]) -> f64 {
        match self {
            Reducer::Max => values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Reducer::Mean => values.iter().sum::<f64>() / values.len() as f64,
        }
    }
}

/// Per-variable reducer assignment.
#[derive(Debug, Clone)]
pub struct ReducerMap {
    assignments: BTreeMap<Variable, Reducer>,
}

impl ReducerMap {
    pub fn new() -> Self {
        Self { assignments: BTreeMap::new() }
    }

    pub fn assign(mut self, variable: Variable, reducer: Reducer) -> Self {
        self.assignments.insert(variable, reducer);
        self
    }

    pub fn get(&self, variable: Variable) -> Option<Reducer> {
        self.assignments.get(&variable).copied()
    }
}

impl Default for ReducerMap {
    /// Weather severity keeps the worst code in the window; temperature and
    /// wind average out.
    fn default() -> Self {
        Self::new()
            .assign(Variable::WeatherCode, Reducer::Max)
            .assign(Variable::Temperature, Reducer::Mean)
            .assign(Variable::WindSpeed, Reducer::Mean)
            .assign(Variable::WindDirection, Reducer::Mean)
    }
}

/// Groups observations by (date, leg) and reduces each variable
/// independently.
///
/// Output is sorted by date ascending, Work before Home on a tied date. A
/// window only partially covered by the fetch still produces a row from the
/// hours present; nothing is interpolated. A variable with no assigned
/// reducer fails with [`Error::UnknownVariable`].
pub fn summarize(
    observations: &[TaggedObservation],
    reducers: &ReducerMap,
) -> Result<Vec<LegSummary>, Error> {
    let mut groups: BTreeMap<(NaiveDate, Leg), BTreeMap<Variable, Vec<f64>>> = BTreeMap::new();

    for tagged in observations {
        let group = groups.entry((tagged.date, tagged.leg)).or_default();
        for (&variable, &value) in &tagged.observation.values {
            group.entry(variable).or_default().push(value);
        }
    }

    let mut rows = Vec::with_capacity(groups.len());
    for ((date, leg), series) in groups {
        let mut values = BTreeMap::new();
        for (variable, column) in series {
            let reducer = reducers
                .get(variable)
                .ok_or(Error::UnknownVariable(variable))?;
            values.insert(variable, reducer.apply(&column));
        }
        rows.push(LegSummary { date, leg, values });
    }
    Ok(rows)
}
