//! Plain-text and JSON rendering of the dashboard views

use std::fmt;

use crate::aggregate::AggregateTable;
use crate::dashboard::DashboardViews;
use crate::histogram::Histogram;

const CURRENCY: &str = "AUD";

/// Human-readable report for a terminal
pub fn render_text(views: &DashboardViews) -> String {
    TextReport(views).to_string()
}

/// Pretty-printed JSON document of every view
pub fn render_json(views: &DashboardViews) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(views)?)
}

/// Format with thousands separators and two decimals, e.g. `1,234.50`.
pub fn format_amount(value: f64) -> String {
    let formatted = format!("{:.2}", value.abs());
    let (whole, fraction) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 { "-" } else { "" };
    format!("{sign}{grouped}.{fraction}")
}

struct TextReport<'a>(&'a DashboardViews);

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let views = self.0;
        match views.range {
            Some(range) => writeln!(
                f,
                "Orders from {} to {} ({} rows)",
                range.start(),
                range.end(),
                views.rows
            )?,
            None => writeln!(f, "No orders in dataset")?,
        }

        write_table(f, "Top cities by customers", &views.locations, false)?;
        write_table(f, "Review score distribution", &views.reviews, false)?;
        write_table(f, "Payment methods by usage", &views.payments.counts, false)?;
        write_table(f, "Payment volume by method", &views.payments.totals, true)?;
        write_table(f, "Top product categories", &views.categories, false)?;

        writeln!(f, "\nRFM analysis")?;
        match &views.rfm.summary {
            Some(summary) => {
                writeln!(f, "  Customers:               {}", summary.customers)?;
                writeln!(f, "  Reference date:          {}", summary.reference)?;
                writeln!(f, "  Average recency (days):  {:.1}", summary.avg_recency)?;
                writeln!(f, "  Average frequency:       {:.1}", summary.avg_frequency)?;
                writeln!(
                    f,
                    "  Average monetary:        {CURRENCY} {}",
                    format_amount(summary.avg_monetary)
                )?;
                write_histogram(f, "Recency", &views.rfm_distributions.recency)?;
                write_histogram(f, "Frequency", &views.rfm_distributions.frequency)?;
                write_histogram(f, "Monetary", &views.rfm_distributions.monetary)?;
            }
            None => writeln!(f, "  no data")?,
        }
        Ok(())
    }
}

fn write_table(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    table: &AggregateTable,
    monetary: bool,
) -> fmt::Result {
    writeln!(f, "\n{title}")?;
    if table.is_empty() {
        return writeln!(f, "  no data");
    }

    let width = table.rows.iter().map(|row| row.key.len()).max().unwrap_or(0);
    for row in &table.rows {
        if monetary {
            writeln!(f, "  {:<width$}  {}", row.key, format_amount(row.value))?;
        } else {
            writeln!(f, "  {:<width$}  {}", row.key, row.value)?;
        }
    }
    Ok(())
}

fn write_histogram(f: &mut fmt::Formatter<'_>, title: &str, histogram: &Histogram) -> fmt::Result {
    writeln!(f, "  {title} distribution")?;
    for bin in &histogram.bins {
        writeln!(
            f,
            "    [{:>10.2}, {:>10.2}]  {}",
            bin.lower, bin.upper, bin.count
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboard::{build_dashboard, DashboardConfig};
    use crate::data::{orders_frame, OrderLine};
    use crate::schema::OrderColumns;
    use chrono::NaiveDate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn views(start: NaiveDate, end: NaiveDate) -> DashboardViews {
        let df = orders_frame(
            &[OrderLine {
                order_id: "o1".to_string(),
                customer_id: "c1".to_string(),
                purchased_at: date(2024, 1, 2).and_hms_opt(9, 30, 0).unwrap(),
                customer_city: "salvador".to_string(),
                review_score: 5,
                payment_type: "credit_card".to_string(),
                payment_value: 1234.5,
                product_category: "computers".to_string(),
            }],
            &OrderColumns::default(),
        )
        .unwrap();
        build_dashboard(&df, Some(start), Some(end), &DashboardConfig::default()).unwrap()
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
        assert_eq!(format_amount(-42.1), "-42.10");
    }

    #[test]
    fn test_text_report_sections() {
        let text = render_text(&views(date(2024, 1, 1), date(2024, 1, 2)));
        assert!(text.contains("Orders from 2024-01-01 to 2024-01-02 (1 rows)"));
        assert!(text.contains("salvador"));
        assert!(text.contains("AUD 1,234.50"));
    }

    #[test]
    fn test_text_report_without_data() {
        let text = render_text(&views(date(2024, 3, 1), date(2024, 3, 31)));
        assert!(text.contains("no data"));
        assert!(!text.contains("Average recency"));
    }

    #[test]
    fn test_json_report() {
        let json = render_json(&views(date(2024, 1, 1), date(2024, 1, 31))).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["rows"], 1);
        assert_eq!(value["rfm"]["summary"]["avg_monetary"], 1234.5);
        assert_eq!(value["locations"]["rows"][0]["key"], "salvador");
    }
}
