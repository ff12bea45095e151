//! Column naming and validation for the order dataset

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Names of the columns the analytics core reads.
///
/// Defaults match the header of the merged order export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderColumns {
    pub order_id: String,
    pub customer_id: String,
    pub purchase_timestamp: String,
    pub customer_city: String,
    pub review_score: String,
    pub payment_type: String,
    pub payment_value: String,
    pub product_category: String,
}

impl Default for OrderColumns {
    fn default() -> Self {
        Self {
            order_id: "order_id".to_string(),
            customer_id: "customer_id".to_string(),
            purchase_timestamp: "order_purchase_timestamp".to_string(),
            customer_city: "customer_city".to_string(),
            review_score: "review_score".to_string(),
            payment_type: "payment_type".to_string(),
            payment_value: "payment_value".to_string(),
            product_category: "product_category_name_english".to_string(),
        }
    }
}

impl OrderColumns {
    /// All column names in dataset order.
    #[must_use]
    pub fn all(&self) -> [&str; 8] {
        [
            &self.order_id,
            &self.customer_id,
            &self.purchase_timestamp,
            &self.customer_city,
            &self.review_score,
            &self.payment_type,
            &self.payment_value,
            &self.product_category,
        ]
    }
}

/// Data type of `column`, or a schema error naming it when absent.
pub fn require_column(df: &DataFrame, column: &str) -> crate::Result<DataType> {
    df.column(column)
        .map(|series| series.dtype().clone())
        .map_err(|_| Error::missing_column(column))
}

/// Time unit of a datetime column.
pub fn timestamp_unit(df: &DataFrame, column: &str) -> crate::Result<TimeUnit> {
    match require_column(df, column)? {
        DataType::Datetime(unit, _) => Ok(unit),
        other => Err(Error::wrong_type(column, "datetime", other)),
    }
}

/// Fails unless `column` exists and holds integers or floats.
pub fn require_numeric(df: &DataFrame, column: &str) -> crate::Result<()> {
    let dtype = require_column(df, column)?;
    if dtype.is_numeric() {
        Ok(())
    } else {
        Err(Error::wrong_type(column, "numeric", dtype))
    }
}
