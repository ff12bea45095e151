//! Order dataset construction and loading using Polars

use std::path::Path;

use chrono::{DateTime, NaiveDateTime};
use polars::prelude::*;
use tracing::debug;

use crate::filter::DateRange;
use crate::schema::{timestamp_unit, OrderColumns};

/// A single order-related record.
///
/// An order may span several lines (one per item or payment); its timestamp
/// and customer are the same on every line.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderLine {
    pub order_id: String,
    pub customer_id: String,
    pub purchased_at: NaiveDateTime,
    pub customer_city: String,
    pub review_score: i64,
    pub payment_type: String,
    pub payment_value: f64,
    pub product_category: String,
}

/// Build an order DataFrame from typed lines.
///
/// Timestamps are stored as microsecond `Datetime` values.
pub fn orders_frame(lines: &[OrderLine], columns: &OrderColumns) -> crate::Result<DataFrame> {
    let timestamps: Vec<i64> = lines
        .iter()
        .map(|line| line.purchased_at.and_utc().timestamp_micros())
        .collect();
    let purchased_at = Series::new(columns.purchase_timestamp.as_str(), timestamps)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;

    let strings = |name: &str, field: fn(&OrderLine) -> &str| {
        Series::new(name, lines.iter().map(field).collect::<Vec<_>>())
    };

    let df = DataFrame::new(vec![
        strings(columns.order_id.as_str(), |line| line.order_id.as_str()),
        strings(columns.customer_id.as_str(), |line| line.customer_id.as_str()),
        purchased_at,
        strings(columns.customer_city.as_str(), |line| line.customer_city.as_str()),
        Series::new(
            columns.review_score.as_str(),
            lines.iter().map(|line| line.review_score).collect::<Vec<_>>(),
        ),
        strings(columns.payment_type.as_str(), |line| line.payment_type.as_str()),
        Series::new(
            columns.payment_value.as_str(),
            lines.iter().map(|line| line.payment_value).collect::<Vec<_>>(),
        ),
        strings(columns.product_category.as_str(), |line| line.product_category.as_str()),
    ])?;

    Ok(df)
}

/// Load an order export from a CSV file with a header row.
///
/// Timestamp-like columns are parsed into `Datetime`; everything else keeps
/// the type Polars infers.
pub fn load_orders(path: impl AsRef<Path>) -> crate::Result<DataFrame> {
    let path = path.as_ref();
    let df = LazyCsvReader::new(path)
        .with_has_header(true)
        .with_try_parse_dates(true)
        .finish()?
        .collect()?;

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded order dataset"
    );
    Ok(df)
}

/// Purchase dates spanned by the dataset, or `None` when it has no timestamps.
pub fn observed_date_range(
    df: &DataFrame,
    columns: &OrderColumns,
) -> crate::Result<Option<DateRange>> {
    let column = columns.purchase_timestamp.as_str();
    let unit = timestamp_unit(df, column)?;

    let physical = df.column(column)?.cast(&DataType::Int64)?;
    let values = physical.i64()?;
    let (Some(min), Some(max)) = (values.min(), values.max()) else {
        return Ok(None);
    };
    let (Some(first), Some(last)) = (
        timestamp_to_datetime(min, unit),
        timestamp_to_datetime(max, unit),
    ) else {
        return Ok(None);
    };

    DateRange::new(first.date(), last.date()).map(Some)
}

/// Number of physical timestamp units in one second
pub const fn units_per_second(unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => 1_000_000_000,
        TimeUnit::Microseconds => 1_000_000,
        TimeUnit::Milliseconds => 1_000,
    }
}

/// Number of physical timestamp units in one day
pub const fn units_per_day(unit: TimeUnit) -> i64 {
    units_per_second(unit) * 86_400
}

/// Convert a physical `Datetime` value to a naive (UTC) timestamp.
pub fn timestamp_to_datetime(value: i64, unit: TimeUnit) -> Option<NaiveDateTime> {
    let per_second = units_per_second(unit);
    let seconds = value.div_euclid(per_second);
    let nanos = value.rem_euclid(per_second) * (1_000_000_000 / per_second);
    DateTime::from_timestamp(seconds, u32::try_from(nanos).ok()?).map(|dt| dt.naive_utc())
}
