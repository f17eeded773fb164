//! Cash flow and schedule data structures

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{XirrError, XirrResult};

/// Days per year used for time fractions (actual/365)
pub const DAYS_PER_YEAR: f64 = 365.0;

/// A single dated cash flow
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlow {
    pub date: NaiveDate,
    /// Positive = inflow, negative = outflow
    pub amount: f64,
}

impl CashFlow {
    pub fn new(date: NaiveDate, amount: f64) -> Self {
        Self { date, amount }
    }
}

/// A validated, immutable cash flow schedule
///
/// Construction enforces the preconditions of the solver:
/// - at least two entries
/// - every amount finite
/// - at least one inflow and one outflow
/// - entries span at least one day
///
/// Entries keep the caller's order; the earliest date is the time origin
/// regardless of where it appears.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CashFlow>", into = "Vec<CashFlow>")]
pub struct Schedule {
    flows: Vec<CashFlow>,
    origin: NaiveDate,
}

impl Schedule {
    /// Validate and build a schedule
    pub fn new(flows: Vec<CashFlow>) -> XirrResult<Self> {
        if flows.len() < 2 {
            return Err(XirrError::validation(format!(
                "schedule needs at least 2 cash flows, got {}",
                flows.len()
            )));
        }

        if let Some(bad) = flows.iter().find(|cf| !cf.amount.is_finite()) {
            return Err(XirrError::validation(format!(
                "non-finite amount {} on {}",
                bad.amount, bad.date
            )));
        }

        let has_positive = flows.iter().any(|cf| cf.amount > 0.0);
        let has_negative = flows.iter().any(|cf| cf.amount < 0.0);
        if !has_positive || !has_negative {
            return Err(XirrError::validation(
                "schedule needs at least one positive and one negative amount",
            ));
        }

        let first = flows[0].date;
        let (origin, last) = flows
            .iter()
            .fold((first, first), |(lo, hi), cf| (lo.min(cf.date), hi.max(cf.date)));
        if last == origin {
            // All entries on one date: NPV does not depend on the rate
            return Err(XirrError::validation(format!(
                "all cash flows fall on {origin}; schedule must span at least one day"
            )));
        }

        Ok(Self { flows, origin })
    }

    /// Build a schedule from `(date, amount)` pairs
    pub fn from_pairs<I>(pairs: I) -> XirrResult<Self>
    where
        I: IntoIterator<Item = (NaiveDate, f64)>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(date, amount)| CashFlow::new(date, amount))
                .collect(),
        )
    }

    pub fn flows(&self) -> &[CashFlow] {
        &self.flows
    }

    pub fn len(&self) -> usize {
        self.flows.len()
    }

    /// Always false for a constructed schedule
    pub fn is_empty(&self) -> bool {
        self.flows.is_empty()
    }

    /// Earliest date in the schedule (day zero)
    pub fn origin(&self) -> NaiveDate {
        self.origin
    }

    /// Days between the earliest and latest entry
    pub fn span_days(&self) -> i64 {
        self.flows
            .iter()
            .map(|cf| cf.date.signed_duration_since(self.origin).num_days())
            .max()
            .unwrap_or(0)
    }

    /// Year fraction of a date measured from the schedule origin
    pub fn year_fraction(&self, date: NaiveDate) -> f64 {
        date.signed_duration_since(self.origin).num_days() as f64 / DAYS_PER_YEAR
    }

    /// Iterate `(t, amount)` pairs with t in years from the origin
    pub fn timed_amounts(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.flows
            .iter()
            .map(move |cf| (self.year_fraction(cf.date), cf.amount))
    }

    pub fn total_inflows(&self) -> f64 {
        self.flows.iter().map(|cf| cf.amount).filter(|a| *a > 0.0).sum()
    }

    pub fn total_outflows(&self) -> f64 {
        self.flows.iter().map(|cf| cf.amount).filter(|a| *a < 0.0).sum()
    }
}

impl TryFrom<Vec<CashFlow>> for Schedule {
    type Error = XirrError;

    fn try_from(flows: Vec<CashFlow>) -> Result<Self, Self::Error> {
        Schedule::new(flows)
    }
}

impl From<Schedule> for Vec<CashFlow> {
    fn from(schedule: Schedule) -> Self {
        schedule.flows
    }
}
