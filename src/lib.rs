//! Orderlens: aggregate views over an e-commerce order log
//!
//! The library filters an order dataset to a purchase-date range and derives
//! the dashboard views from it: customer locations, review scores, payment
//! methods, product categories and an RFM (Recency, Frequency, Monetary)
//! customer table.

pub mod aggregate;
pub mod cli;
pub mod dashboard;
pub mod data;
pub mod error;
pub mod filter;
pub mod histogram;
pub mod logging;
pub mod report;
pub mod rfm;
pub mod schema;

// Re-export public items for easier access
pub use aggregate::{
    aggregate_by_key, AggregateRow, AggregateTable, KeyOrder, PaymentSummary, Reducer,
};
pub use cli::Args;
pub use dashboard::{build_dashboard, DashboardConfig, DashboardViews};
pub use data::{load_orders, observed_date_range, orders_frame, OrderLine};
pub use error::{Error, Result, SchemaProblem};
pub use filter::{filter_by_date, filter_by_range, DateRange};
pub use rfm::{compute_rfm, RfmAnalysis, RfmRecord, RfmSummary};
pub use schema::OrderColumns;
