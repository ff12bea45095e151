//! Command-line interface definitions and argument parsing

use chrono::NaiveDate;
use clap::{Parser, ValueEnum};

use crate::dashboard::DashboardConfig;
use crate::logging::LogLevel;
use crate::schema::OrderColumns;

/// Output format of the dashboard report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// E-commerce order analytics: customer, review, payment, category and RFM views
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the merged order CSV export
    #[arg(short, long, env = "ORDERLENS_INPUT", default_value = "main_data.csv")]
    pub input: String,

    /// First purchase date to include (YYYY-MM-DD), defaults to the earliest order
    #[arg(long, value_parser = parse_date)]
    pub start: Option<NaiveDate>,

    /// Last purchase date to include (YYYY-MM-DD), defaults to the latest order
    #[arg(long, value_parser = parse_date)]
    pub end: Option<NaiveDate>,

    /// Entries kept in the city and category rankings
    #[arg(short = 'n', long, default_value = "10")]
    pub top_n: usize,

    /// Bins per RFM distribution
    #[arg(long, default_value = "10")]
    pub bins: usize,

    /// Name of the purchase timestamp column
    #[arg(long, default_value = "order_purchase_timestamp")]
    pub timestamp_column: String,

    /// Report format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log level for diagnostics on stderr
    #[arg(long, value_enum, env = "ORDERLENS_LOG", default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig {
            columns: OrderColumns {
                purchase_timestamp: self.timestamp_column.clone(),
                ..OrderColumns::default()
            },
            top_n: self.top_n,
            histogram_bins: self.bins,
        }
    }
}

/// Parse a calendar date in `YYYY-MM-DD` format
pub fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| format!("Invalid date '{value}', expected YYYY-MM-DD"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("2018-08-29"),
            Ok(NaiveDate::from_ymd_opt(2018, 8, 29).unwrap())
        );
        assert!(parse_date("29/08/2018").is_err());
        assert!(parse_date("2018-02-30").is_err());
    }

    #[test]
    fn test_args_to_config() {
        let args = Args::try_parse_from([
            "orderlens",
            "--input",
            "orders.csv",
            "--start",
            "2017-01-01",
            "-n",
            "5",
            "--bins",
            "20",
            "--format",
            "json",
        ])
        .unwrap();

        assert_eq!(args.input, "orders.csv");
        assert_eq!(args.start, NaiveDate::from_ymd_opt(2017, 1, 1));
        assert_eq!(args.end, None);
        assert_eq!(args.format, OutputFormat::Json);

        let config = args.dashboard_config();
        assert_eq!(config.top_n, 5);
        assert_eq!(config.histogram_bins, 20);
        assert_eq!(config.columns, OrderColumns::default());
    }

    #[test]
    fn test_rejects_bad_date() {
        assert!(Args::try_parse_from(["orderlens", "--end", "yesterday"]).is_err());
    }
}
