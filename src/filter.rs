//! Date-range filtering of the order dataset

use chrono::NaiveDate;
use polars::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::Error;
use crate::schema::timestamp_unit;

/// Inclusive calendar-date range with `start <= end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    /// Create a range, rejecting `start > end` instead of swapping the bounds.
    pub fn new(start: NaiveDate, end: NaiveDate) -> crate::Result<Self> {
        if start > end {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Fill unset bounds from the dataset's observed range.
    ///
    /// Returns `Ok(None)` when a bound is unset and there is nothing observed
    /// to take it from.
    pub fn resolve(
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
        observed: Option<DateRange>,
    ) -> crate::Result<Option<Self>> {
        let start = start.or(observed.map(|range| range.start));
        let end = end.or(observed.map(|range| range.end));
        match (start, end) {
            (Some(start), Some(end)) => Self::new(start, end).map(Some),
            _ => Ok(None),
        }
    }

    /// First date in the range
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last date in the range
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// Whether `date` lies in the range, bounds included
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }
}

/// Keep rows whose `column` date lies in `[start, end]`.
///
/// Time of day is ignored. Rows with a null timestamp are dropped.
pub fn filter_by_date(
    df: &DataFrame,
    column: &str,
    start: NaiveDate,
    end: NaiveDate,
) -> crate::Result<DataFrame> {
    let range = DateRange::new(start, end)?;
    filter_by_range(df, column, range)
}

/// [`filter_by_date`] for an already validated range.
pub fn filter_by_range(df: &DataFrame, column: &str, range: DateRange) -> crate::Result<DataFrame> {
    timestamp_unit(df, column)?;

    let purchase_date = col(column).dt().date();
    let filtered = df
        .clone()
        .lazy()
        .filter(
            purchase_date
                .clone()
                .gt_eq(lit(range.start))
                .and(purchase_date.lt_eq(lit(range.end))),
        )
        .collect()?;

    if filtered.height() == 0 && df.height() > 0 {
        warn!(start = %range.start, end = %range.end, "date filter matched no rows");
    }
    debug!(
        start = %range.start,
        end = %range.end,
        rows_in = df.height(),
        rows_out = filtered.height(),
        "filtered orders by purchase date"
    );
    Ok(filtered)
}
