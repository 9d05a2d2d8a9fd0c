//! Closing-price history: the validated series the pipeline runs on, and the
//! sources it is fetched from

use crate::error::{ForecastError, Result};
use crate::utils::parse_date;
use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

/// One trading day's closing price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}

/// Chronologically ordered closing prices.
///
/// Dates are strictly increasing (gaps such as weekends are allowed) and every
/// price is finite and positive. The series is immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    dates: Vec<NaiveDate>,
    closes: Arc<[f64]>,
}

impl PriceSeries {
    /// Build a series from points already in chronological order
    pub fn new(points: Vec<PricePoint>) -> Result<Self> {
        if points.is_empty() {
            return Err(ForecastError::InsufficientData(
                "Price series is empty".to_string(),
            ));
        }

        for (idx, point) in points.iter().enumerate() {
            if !point.close.is_finite() || point.close <= 0.0 {
                return Err(ForecastError::InvalidData(format!(
                    "Price on {} must be positive, got {}",
                    point.date, point.close
                )));
            }
            if idx > 0 && point.date <= points[idx - 1].date {
                return Err(ForecastError::InvalidData(format!(
                    "Dates must be strictly increasing: {} follows {}",
                    point.date,
                    points[idx - 1].date
                )));
            }
        }

        let dates = points.iter().map(|p| p.date).collect();
        let closes: Vec<f64> = points.iter().map(|p| p.close).collect();

        Ok(Self {
            dates,
            closes: closes.into(),
        })
    }

    /// Build a series of consecutive calendar days starting at `start`
    pub fn from_closes(start: NaiveDate, closes: &[f64]) -> Result<Self> {
        let points = closes
            .iter()
            .enumerate()
            .map(|(offset, &close)| {
                start
                    .checked_add_days(Days::new(offset as u64))
                    .map(|date| PricePoint::new(date, close))
                    .ok_or_else(|| {
                        ForecastError::InvalidData("Date range overflows the calendar".to_string())
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Self::new(points)
    }

    pub fn len(&self) -> usize {
        self.closes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.closes.is_empty()
    }

    pub fn dates(&self) -> &[NaiveDate] {
        &self.dates
    }

    pub fn closes(&self) -> &[f64] {
        &self.closes
    }

    /// Shared handle on the closing prices for worker threads
    pub fn shared_closes(&self) -> Arc<[f64]> {
        Arc::clone(&self.closes)
    }

    /// Last observed closing price
    pub fn current_price(&self) -> f64 {
        self.closes[self.closes.len() - 1]
    }

    pub fn first_date(&self) -> NaiveDate {
        self.dates[0]
    }

    pub fn last_date(&self) -> NaiveDate {
        self.dates[self.dates.len() - 1]
    }

    pub fn points(&self) -> impl Iterator<Item = PricePoint> + '_ {
        self.dates
            .iter()
            .zip(self.closes.iter())
            .map(|(&date, &close)| PricePoint::new(date, close))
    }

    /// Last `n` closing prices, oldest first
    pub fn tail(&self, n: usize) -> Result<&[f64]> {
        if n > self.len() {
            return Err(ForecastError::InsufficientHistory {
                required: n,
                available: self.len(),
            });
        }
        Ok(&self.closes[self.len() - n..])
    }

    /// Points dated on or after `start`
    pub fn since(&self, start: NaiveDate) -> Result<Self> {
        Self::new(self.points().filter(|p| p.date >= start).collect())
    }
}

/// How much history to request, in the style of market-data periods
/// (`30d`, `6mo`, `2y`, `max`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Lookback {
    Days(u32),
    Months(u32),
    Years(u32),
    Max,
}

impl Default for Lookback {
    fn default() -> Self {
        Lookback::Years(2)
    }
}

impl Lookback {
    /// Earliest date included when the history ends on `last`
    pub fn start_from(&self, last: NaiveDate) -> Option<NaiveDate> {
        match *self {
            Lookback::Days(n) => last.checked_sub_days(Days::new(n as u64)),
            Lookback::Months(n) => last.checked_sub_months(Months::new(n)),
            Lookback::Years(n) => last.checked_sub_months(Months::new(n.saturating_mul(12))),
            Lookback::Max => None,
        }
    }
}

impl FromStr for Lookback {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        if s == "max" {
            return Ok(Lookback::Max);
        }

        let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        let (num, unit) = s.split_at(split);
        let n: u32 = num
            .parse()
            .map_err(|_| ForecastError::InvalidParameter(format!("Invalid lookback '{}'", s)))?;
        if n == 0 {
            return Err(ForecastError::InvalidParameter(format!(
                "Lookback '{}' must be positive",
                s
            )));
        }

        match unit {
            "d" => Ok(Lookback::Days(n)),
            "mo" => Ok(Lookback::Months(n)),
            "y" => Ok(Lookback::Years(n)),
            _ => Err(ForecastError::InvalidParameter(format!(
                "Invalid lookback '{}': expected a suffix of d, mo or y, or 'max'",
                s
            ))),
        }
    }
}

impl fmt::Display for Lookback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lookback::Days(n) => write!(f, "{}d", n),
            Lookback::Months(n) => write!(f, "{}mo", n),
            Lookback::Years(n) => write!(f, "{}y", n),
            Lookback::Max => write!(f, "max"),
        }
    }
}

impl TryFrom<String> for Lookback {
    type Error = ForecastError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Lookback> for String {
    fn from(value: Lookback) -> Self {
        value.to_string()
    }
}

/// Market-data collaborator the pipeline fetches history from
pub trait HistorySource {
    /// Closing prices for `ticker` over `lookback`; `NoData` for unknown tickers
    fn fetch_history(&self, ticker: &str, lookback: Lookback) -> Result<PriceSeries>;
}

/// Reads `<TICKER>.csv` files with `Date` and `Close` columns from a directory
#[derive(Debug, Clone)]
pub struct CsvHistorySource {
    dir: PathBuf,
}

#[derive(Debug, Deserialize)]
struct HistoryRow {
    #[serde(rename = "Date", alias = "date")]
    date: String,
    #[serde(rename = "Close", alias = "close")]
    close: Option<f64>,
}

impl CsvHistorySource {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// Path of the history file for a ticker
    pub fn path_for(&self, ticker: &str) -> Result<PathBuf> {
        let valid = !ticker.is_empty()
            && ticker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='))
            && !ticker.contains("..");
        if !valid {
            return Err(ForecastError::InvalidParameter(format!(
                "Invalid ticker symbol '{}'",
                ticker
            )));
        }

        Ok(self.dir.join(format!("{}.csv", ticker.to_uppercase())))
    }

    /// Load every row of a history file, sorted by date
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Vec<PricePoint>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut points = Vec::new();
        for row in reader.deserialize() {
            let row: HistoryRow = row?;
            if let Some(close) = row.close {
                points.push(PricePoint::new(parse_date(&row.date)?, close));
            }
        }
        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

impl HistorySource for CsvHistorySource {
    fn fetch_history(&self, ticker: &str, lookback: Lookback) -> Result<PriceSeries> {
        let path = self.path_for(ticker)?;
        if !path.is_file() {
            return Err(ForecastError::NoData(ticker.to_uppercase()));
        }

        let points = Self::load_file(&path)?;
        let Some(last) = points.last().map(|p| p.date) else {
            return Err(ForecastError::NoData(ticker.to_uppercase()));
        };

        let points = match lookback.start_from(last) {
            Some(start) => points.into_iter().filter(|p| p.date >= start).collect(),
            None => points,
        };

        tracing::debug!(
            ticker,
            %lookback,
            rows = points.len(),
            path = %path.display(),
            "Loaded price history"
        );

        PriceSeries::new(points)
    }
}
