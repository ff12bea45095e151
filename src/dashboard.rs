//! Filter-then-aggregate pipeline producing every dashboard view

use chrono::NaiveDate;
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::info;

use crate::aggregate::{
    customer_locations, payment_summary, review_distribution, top_categories, AggregateTable,
    PaymentSummary, DEFAULT_TOP_N,
};
use crate::data::observed_date_range;
use crate::filter::{filter_by_range, DateRange};
use crate::rfm::{compute_rfm, RfmAnalysis, RfmDistributions};
use crate::schema::{timestamp_unit, OrderColumns};

/// Parameters shared by all views
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardConfig {
    pub columns: OrderColumns,
    pub top_n: usize,
    pub histogram_bins: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            columns: OrderColumns::default(),
            top_n: DEFAULT_TOP_N,
            histogram_bins: 10,
        }
    }
}

/// All aggregate views for one date range
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardViews {
    /// Range actually applied; `None` when the dataset has no timestamps
    pub range: Option<DateRange>,
    /// Rows left after filtering
    pub rows: usize,
    pub locations: AggregateTable,
    pub reviews: AggregateTable,
    pub payments: PaymentSummary,
    pub categories: AggregateTable,
    pub rfm: RfmAnalysis,
    pub rfm_distributions: RfmDistributions,
}

/// Filter `df` to the requested range and recompute every view.
///
/// Unset bounds default to the dataset's observed first and last purchase
/// dates. `df` is only read; each view is computed from the same filtered
/// frame and none depends on another.
pub fn build_dashboard(
    df: &DataFrame,
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    config: &DashboardConfig,
) -> crate::Result<DashboardViews> {
    let columns = &config.columns;
    timestamp_unit(df, &columns.purchase_timestamp)?;

    let observed = observed_date_range(df, columns)?;
    let range = DateRange::resolve(start, end, observed)?;
    let filtered = match range {
        Some(range) => filter_by_range(df, &columns.purchase_timestamp, range)?,
        None => df.head(Some(0)),
    };

    let rfm = compute_rfm(&filtered, columns)?;
    let views = DashboardViews {
        range,
        rows: filtered.height(),
        locations: customer_locations(&filtered, columns, config.top_n)?,
        reviews: review_distribution(&filtered, columns)?,
        payments: payment_summary(&filtered, columns)?,
        categories: top_categories(&filtered, columns, config.top_n)?,
        rfm_distributions: rfm.distributions(config.histogram_bins),
        rfm,
    };

    info!(
        rows = views.rows,
        customers = views.rfm.records.len(),
        "dashboard views computed"
    );
    Ok(views)
}
