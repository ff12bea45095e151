//! Categorical aggregations: customer location, review score, payment and
//! product category views.

use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::schema::{require_column, require_numeric, OrderColumns};

/// Number of entries kept by the ranked views.
pub const DEFAULT_TOP_N: usize = 10;

const MEASURE: &str = "measure";

/// How the rows of each group are reduced to one value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reducer {
    /// Number of rows in the group
    Count,
    /// Sum of the named numeric column over the group
    Sum(String),
}

/// Ordering of an aggregate table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOrder {
    /// Ranking: value descending, ties by key ascending, optionally truncated.
    ///
    /// Tied keys are ordered alphabetically, not by first appearance in the
    /// dataset.
    ValueDescending { top_n: Option<usize> },
    /// Ordinal scales such as review scores.
    KeyAscending,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateRow {
    /// Group key rendered as a string
    pub key: String,
    /// Row count or sum for the group
    pub value: f64,
}

/// Ordered key to value table, ready for a bar or pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateTable {
    /// Column the rows are grouped by
    pub key_column: String,
    /// Rows in presentation order
    pub rows: Vec<AggregateRow>,
}

impl AggregateTable {
    /// Table with no rows for `key_column`
    pub fn empty(key_column: &str) -> Self {
        Self {
            key_column: key_column.to_string(),
            rows: Vec::new(),
        }
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all values in the table
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.value).sum()
    }

    /// Value for `key`, if present
    pub fn get(&self, key: &str) -> Option<f64> {
        self.rows
            .iter()
            .find(|row| row.key == key)
            .map(|row| row.value)
    }

    /// Keys in table order
    pub fn keys(&self) -> Vec<&str> {
        self.rows.iter().map(|row| row.key.as_str()).collect()
    }
}

/// Group `df` by `key_column` and reduce each group.
///
/// Columns are validated before anything else so a broken schema is reported
/// even for an empty dataset. Rows with a null key are not counted.
pub fn aggregate_by_key(
    df: &DataFrame,
    key_column: &str,
    reducer: &Reducer,
    order: KeyOrder,
) -> crate::Result<AggregateTable> {
    require_column(df, key_column)?;
    if let Reducer::Sum(value_column) = reducer {
        require_numeric(df, value_column)?;
    }
    if df.height() == 0 {
        return Ok(AggregateTable::empty(key_column));
    }

    let measure = match reducer {
        Reducer::Count => len(),
        Reducer::Sum(value_column) => col(value_column.as_str()).sum(),
    }
    .cast(DataType::Float64)
    .alias(MEASURE);

    let grouped = df
        .clone()
        .lazy()
        .filter(col(key_column).is_not_null())
        .group_by_stable([col(key_column)])
        .agg([measure]);

    let ordered = match order {
        KeyOrder::KeyAscending => grouped.sort_by_exprs(
            [col(key_column)],
            SortMultipleOptions::default().with_maintain_order(true),
        ),
        KeyOrder::ValueDescending { top_n } => {
            let ranked = grouped.sort_by_exprs(
                [col(MEASURE), col(key_column)],
                SortMultipleOptions::default()
                    .with_order_descending_multi([true, false])
                    .with_maintain_order(true),
            );
            match top_n {
                Some(n) => ranked.limit(IdxSize::try_from(n).unwrap_or(IdxSize::MAX)),
                None => ranked,
            }
        }
    };

    let out = ordered
        .select([col(key_column).cast(DataType::String), col(MEASURE)])
        .collect()?;

    let keys = out.column(key_column)?.str()?;
    let values = out.column(MEASURE)?.f64()?;
    let rows: Vec<AggregateRow> = keys
        .into_iter()
        .zip(values.into_iter())
        .filter_map(|(key, value)| {
            Some(AggregateRow {
                key: key?.to_string(),
                value: value.unwrap_or(0.0),
            })
        })
        .collect();

    debug!(key_column, groups = rows.len(), "aggregated by key");
    Ok(AggregateTable {
        key_column: key_column.to_string(),
        rows,
    })
}

/// Cities with the most order lines, top `top_n`.
pub fn customer_locations(
    df: &DataFrame,
    columns: &OrderColumns,
    top_n: usize,
) -> crate::Result<AggregateTable> {
    aggregate_by_key(
        df,
        &columns.customer_city,
        &Reducer::Count,
        KeyOrder::ValueDescending { top_n: Some(top_n) },
    )
}

/// Number of lines per review score, ordered by score.
pub fn review_distribution(df: &DataFrame, columns: &OrderColumns) -> crate::Result<AggregateTable> {
    aggregate_by_key(df, &columns.review_score, &Reducer::Count, KeyOrder::KeyAscending)
}

/// Payment usage and payment volume by payment type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSummary {
    /// Lines per payment type, most used first
    pub counts: AggregateTable,
    /// Total payment value per payment type, ordered by type
    pub totals: AggregateTable,
}

/// Both payment views; payment types form a small closed set so neither is truncated.
pub fn payment_summary(df: &DataFrame, columns: &OrderColumns) -> crate::Result<PaymentSummary> {
    let counts = aggregate_by_key(
        df,
        &columns.payment_type,
        &Reducer::Count,
        KeyOrder::ValueDescending { top_n: None },
    )?;
    let totals = aggregate_by_key(
        df,
        &columns.payment_type,
        &Reducer::Sum(columns.payment_value.clone()),
        KeyOrder::KeyAscending,
    )?;
    Ok(PaymentSummary { counts, totals })
}

/// Product categories with the most order lines, top `top_n`.
pub fn top_categories(
    df: &DataFrame,
    columns: &OrderColumns,
    top_n: usize,
) -> crate::Result<AggregateTable> {
    aggregate_by_key(
        df,
        &columns.product_category,
        &Reducer::Count,
        KeyOrder::ValueDescending { top_n: Some(top_n) },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{orders_frame, OrderLine};
    use crate::error::{Error, SchemaProblem};
    use chrono::NaiveDate;

    fn line(city: &str, review: i64, payment: &str, value: f64, category: &str) -> OrderLine {
        OrderLine {
            order_id: format!("o-{city}-{review}"),
            customer_id: format!("c-{city}"),
            purchased_at: NaiveDate::from_ymd_opt(2018, 5, 17)
                .unwrap()
                .and_hms_opt(14, 0, 0)
                .unwrap(),
            customer_city: city.to_string(),
            review_score: review,
            payment_type: payment.to_string(),
            payment_value: value,
            product_category: category.to_string(),
        }
    }

    fn frame() -> DataFrame {
        orders_frame(
            &[
                line("sao paulo", 5, "credit_card", 100.0, "bed_bath_table"),
                line("rio de janeiro", 4, "boleto", 50.0, "health_beauty"),
                line("sao paulo", 1, "credit_card", 25.5, "bed_bath_table"),
                line("belo horizonte", 5, "voucher", 10.0, "sports_leisure"),
                line("curitiba", 3, "credit_card", 80.0, "health_beauty"),
                line("sao paulo", 5, "boleto", 40.0, "toys"),
            ],
            &OrderColumns::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_locations_ranked_with_key_tie_break() {
        let table = customer_locations(&frame(), &OrderColumns::default(), DEFAULT_TOP_N).unwrap();
        assert_eq!(
            table.keys(),
            vec!["sao paulo", "belo horizonte", "curitiba", "rio de janeiro"]
        );
        assert_eq!(table.get("sao paulo"), Some(3.0));
        assert_eq!(table.total(), 6.0);
    }

    #[test]
    fn test_top_n_truncates() {
        let table = top_categories(&frame(), &OrderColumns::default(), 2).unwrap();
        assert_eq!(table.keys(), vec!["bed_bath_table", "health_beauty"]);
        assert_eq!(table.rows[0].value, 2.0);
        assert_eq!(table.rows[1].value, 2.0);
    }

    #[test]
    fn test_default_top_n_keeps_ten() {
        let lines: Vec<OrderLine> = (0..12)
            .flat_map(|i| {
                let city = format!("city_{i:02}");
                let category = format!("category_{i:02}");
                (0..=i).map(move |_| line(&city, 5, "credit_card", 1.0, &category))
            })
            .collect();
        let df = orders_frame(&lines, &OrderColumns::default()).unwrap();
        let columns = OrderColumns::default();

        let cities = customer_locations(&df, &columns, DEFAULT_TOP_N).unwrap();
        assert_eq!(cities.len(), 10);
        assert_eq!(cities.rows[0].key, "city_11");
        assert_eq!(cities.rows[9].key, "city_02");

        let categories = top_categories(&df, &columns, DEFAULT_TOP_N).unwrap();
        assert_eq!(categories.len(), 10);
        assert_eq!(categories.rows[0].value, 12.0);
        assert!(categories.get("category_00").is_none());
    }

    #[test]
    fn test_reviews_ordered_by_score() {
        let table = review_distribution(&frame(), &OrderColumns::default()).unwrap();
        assert_eq!(table.keys(), vec!["1", "3", "4", "5"]);
        assert_eq!(table.get("5"), Some(3.0));
    }

    #[test]
    fn test_payment_summary() {
        let payments = payment_summary(&frame(), &OrderColumns::default()).unwrap();

        assert_eq!(payments.counts.keys(), vec!["credit_card", "boleto", "voucher"]);
        assert_eq!(payments.counts.get("credit_card"), Some(3.0));

        assert_eq!(payments.totals.keys(), vec!["boleto", "credit_card", "voucher"]);
        assert_eq!(payments.totals.get("credit_card"), Some(205.5));
        assert_eq!(payments.totals.total(), 305.5);
    }

    #[test]
    fn test_empty_dataset_gives_empty_tables() {
        let columns = OrderColumns::default();
        let empty = orders_frame(&[], &columns).unwrap();

        assert!(customer_locations(&empty, &columns, DEFAULT_TOP_N).unwrap().is_empty());
        assert!(review_distribution(&empty, &columns).unwrap().is_empty());
        let payments = payment_summary(&empty, &columns).unwrap();
        assert!(payments.counts.is_empty() && payments.totals.is_empty());
        assert!(top_categories(&empty, &columns, DEFAULT_TOP_N).unwrap().is_empty());
    }

    #[test]
    fn test_missing_key_column_propagates() {
        let df = frame().drop("customer_city").unwrap();
        let err = customer_locations(&df, &OrderColumns::default(), DEFAULT_TOP_N).unwrap_err();
        assert_eq!(err.column(), Some("customer_city"));

        let empty = df.head(Some(0));
        assert!(customer_locations(&empty, &OrderColumns::default(), DEFAULT_TOP_N).is_err());
    }

    #[test]
    fn test_sum_requires_numeric_column() {
        let err = aggregate_by_key(
            &frame(),
            "payment_type",
            &Reducer::Sum("customer_city".to_string()),
            KeyOrder::KeyAscending,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            Error::Schema {
                problem: SchemaProblem::WrongType { .. },
                ..
            }
        ));

        let err = aggregate_by_key(
            &frame(),
            "payment_type",
            &Reducer::Sum("price".to_string()),
            KeyOrder::KeyAscending,
        )
        .unwrap_err();
        assert_eq!(err.column(), Some("price"));
    }

    #[test]
    fn test_repeated_calls_are_identical() {
        let df = frame();
        let columns = OrderColumns::default();
        let first = top_categories(&df, &columns, DEFAULT_TOP_N).unwrap();
        let second = top_categories(&df, &columns, DEFAULT_TOP_N).unwrap();
        assert_eq!(first, second);
        assert_eq!(df.height(), 6);
    }
}
