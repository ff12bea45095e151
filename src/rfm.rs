//! RFM (Recency, Frequency, Monetary) customer aggregation using Polars

use chrono::NaiveDateTime;
use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::data::{timestamp_to_datetime, units_per_day};
use crate::histogram::Histogram;
use crate::schema::{require_column, require_numeric, timestamp_unit, OrderColumns};

const LAST_PURCHASE: &str = "last_purchase";
const FREQUENCY: &str = "frequency";
const MONETARY: &str = "monetary";

/// RFM values for one customer
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmRecord {
    pub customer_id: String,
    /// Most recent purchase of this customer
    pub last_purchase: NaiveDateTime,
    /// Whole days between the reference timestamp and `last_purchase`
    pub recency_days: i64,
    /// Number of order lines
    pub frequency: u64,
    /// Total payment value
    pub monetary: f64,
}

/// Rounded averages over all customers of a non-empty dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmSummary {
    /// Latest purchase in the dataset; every recency is measured from here
    pub reference: NaiveDateTime,
    /// Number of customers averaged over
    pub customers: usize,
    /// Mean recency, one decimal
    pub avg_recency: f64,
    /// Mean frequency, one decimal
    pub avg_frequency: f64,
    /// Mean monetary value, two decimals
    pub avg_monetary: f64,
}

/// RFM table plus its summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmAnalysis {
    /// One record per customer, in order of first appearance
    pub records: Vec<RfmRecord>,
    /// `None` when there is no data to summarize
    pub summary: Option<RfmSummary>,
}

/// Histograms of the three RFM measures
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RfmDistributions {
    /// Recency in days
    pub recency: Histogram,
    /// Order lines per customer
    pub frequency: Histogram,
    /// Total payment value per customer
    pub monetary: Histogram,
}

impl RfmAnalysis {
    /// Analysis of a dataset with no rows
    pub fn empty() -> Self {
        Self {
            records: Vec::new(),
            summary: None,
        }
    }

    /// Whether there are no customer records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sum of frequencies; equals the number of rows analysed
    pub fn total_frequency(&self) -> u64 {
        self.records.iter().map(|r| r.frequency).sum()
    }

    /// Sum of monetary values over all customers
    pub fn total_monetary(&self) -> f64 {
        self.records.iter().map(|r| r.monetary).sum()
    }

    /// Record for `customer_id`, if present
    pub fn get(&self, customer_id: &str) -> Option<&RfmRecord> {
        self.records.iter().find(|r| r.customer_id == customer_id)
    }

    /// Histograms of recency, frequency and monetary with `bins` bins each
    pub fn distributions(&self, bins: usize) -> RfmDistributions {
        let recency: Vec<f64> = self.records.iter().map(|r| r.recency_days as f64).collect();
        let frequency: Vec<f64> = self.records.iter().map(|r| r.frequency as f64).collect();
        let monetary: Vec<f64> = self.records.iter().map(|r| r.monetary).collect();

        RfmDistributions {
            recency: Histogram::from_values(&recency, bins),
            frequency: Histogram::from_values(&frequency, bins),
            monetary: Histogram::from_values(&monetary, bins),
        }
    }
}

/// Compute RFM records and their summary.
///
/// The reference point is the latest purchase across the whole dataset, not
/// per customer. Recency is the full day count of the difference between the
/// reference and a customer's last purchase, with time of day included before
/// truncation. Rows without a customer or timestamp are ignored.
pub fn compute_rfm(df: &DataFrame, columns: &OrderColumns) -> crate::Result<RfmAnalysis> {
    let customer = columns.customer_id.as_str();
    let purchased = columns.purchase_timestamp.as_str();
    let payment = columns.payment_value.as_str();

    require_column(df, customer)?;
    let unit = timestamp_unit(df, purchased)?;
    require_numeric(df, payment)?;

    if df.height() == 0 {
        return Ok(RfmAnalysis::empty());
    }

    let grouped = df
        .clone()
        .lazy()
        .filter(col(customer).is_not_null().and(col(purchased).is_not_null()))
        .group_by_stable([col(customer)])
        .agg([
            col(purchased).max().alias(LAST_PURCHASE),
            len().alias(FREQUENCY),
            col(payment).sum().alias(MONETARY),
        ])
        .select([
            col(customer).cast(DataType::String),
            col(LAST_PURCHASE).cast(DataType::Int64),
            col(FREQUENCY).cast(DataType::Int64),
            col(MONETARY).cast(DataType::Float64),
        ])
        .collect()?;

    let customers = grouped.column(customer)?.str()?;
    let last_purchases = grouped.column(LAST_PURCHASE)?.i64()?;
    let frequencies = grouped.column(FREQUENCY)?.i64()?;
    let monetaries = grouped.column(MONETARY)?.f64()?;

    let Some(reference) = last_purchases.max() else {
        return Ok(RfmAnalysis::empty());
    };
    let per_day = units_per_day(unit);

    let mut records = Vec::with_capacity(grouped.height());
    for (((customer_id, last), frequency), monetary) in customers
        .into_iter()
        .zip(last_purchases.into_iter())
        .zip(frequencies.into_iter())
        .zip(monetaries.into_iter())
    {
        let (Some(customer_id), Some(last)) = (customer_id, last) else {
            continue;
        };
        let Some(last_purchase) = timestamp_to_datetime(last, unit) else {
            continue;
        };
        records.push(RfmRecord {
            customer_id: customer_id.to_string(),
            last_purchase,
            recency_days: (reference - last) / per_day,
            frequency: frequency.and_then(|f| u64::try_from(f).ok()).unwrap_or(0),
            monetary: monetary.unwrap_or(0.0),
        });
    }

    let summary =
        timestamp_to_datetime(reference, unit).and_then(|reference| summarize(&records, reference));
    debug!(
        customers = records.len(),
        reference = ?summary.as_ref().map(|s| s.reference),
        "computed RFM table"
    );

    Ok(RfmAnalysis { records, summary })
}

fn summarize(records: &[RfmRecord], reference: NaiveDateTime) -> Option<RfmSummary> {
    if records.is_empty() {
        return None;
    }
    let n = records.len() as f64;
    let mean = |value: fn(&RfmRecord) -> f64| records.iter().map(value).sum::<f64>() / n;

    Some(RfmSummary {
        reference,
        customers: records.len(),
        avg_recency: round_to(mean(|r| r.recency_days as f64), 1),
        avg_frequency: round_to(mean(|r| r.frequency as f64), 1),
        avg_monetary: round_to(mean(|r| r.monetary), 2),
    })
}

/// Round to `places` decimals, halves to even.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10_f64.powi(places);
    (value * factor).round_ties_even() / factor
}
