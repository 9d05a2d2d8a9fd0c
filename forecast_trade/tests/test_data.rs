use chrono::NaiveDate;
use forecast_trade::data::{CsvHistorySource, HistorySource, Lookback, PricePoint, PriceSeries};
use forecast_trade::error::ForecastError;
use pretty_assertions::assert_eq;
use rstest::rstest;
use std::fs;
use tempfile::tempdir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_series_accessors() {
    let series = PriceSeries::new(vec![
        PricePoint::new(date(2024, 1, 2), 10.0),
        PricePoint::new(date(2024, 1, 3), 11.0),
        PricePoint::new(date(2024, 1, 5), 12.5),
    ])
    .unwrap();

    assert_eq!(series.len(), 3);
    assert_eq!(series.current_price(), 12.5);
    assert_eq!(series.first_date(), date(2024, 1, 2));
    assert_eq!(series.last_date(), date(2024, 1, 5));
    assert_eq!(series.tail(2).unwrap(), &[11.0, 12.5]);
    assert_eq!(&*series.shared_closes(), &[10.0, 11.0, 12.5]);
}

#[test]
fn test_empty_series_rejected() {
    let result = PriceSeries::new(Vec::new());
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}

#[rstest]
#[case(0.0)]
#[case(-3.0)]
#[case(f64::NAN)]
#[case(f64::INFINITY)]
fn test_invalid_prices_rejected(#[case] bad: f64) {
    let result = PriceSeries::new(vec![
        PricePoint::new(date(2024, 1, 2), 10.0),
        PricePoint::new(date(2024, 1, 3), bad),
    ]);
    assert!(matches!(result, Err(ForecastError::InvalidData(_))));
}

#[test]
fn test_dates_must_increase() {
    let result = PriceSeries::new(vec![
        PricePoint::new(date(2024, 1, 3), 10.0),
        PricePoint::new(date(2024, 1, 3), 11.0),
    ]);
    assert!(matches!(result, Err(ForecastError::InvalidData(_))));
}

#[test]
fn test_tail_longer_than_series() {
    let series = PriceSeries::from_closes(date(2024, 1, 1), &[1.0, 2.0]).unwrap();
    assert!(matches!(
        series.tail(5),
        Err(ForecastError::InsufficientHistory {
            required: 5,
            available: 2
        })
    ));
}

#[rstest]
#[case("30d", Lookback::Days(30))]
#[case("6mo", Lookback::Months(6))]
#[case("2y", Lookback::Years(2))]
#[case("MAX", Lookback::Max)]
fn test_lookback_parsing(#[case] raw: &str, #[case] expected: Lookback) {
    assert_eq!(raw.parse::<Lookback>().unwrap(), expected);
    assert_eq!(expected.to_string().parse::<Lookback>().unwrap(), expected);
}

#[rstest]
#[case("")]
#[case("2w")]
#[case("0d")]
#[case("y")]
fn test_lookback_rejects_garbage(#[case] raw: &str) {
    assert!(matches!(
        raw.parse::<Lookback>(),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_lookback_start() {
    let last = date(2024, 3, 31);
    assert_eq!(Lookback::Days(30).start_from(last), Some(date(2024, 3, 1)));
    assert_eq!(Lookback::Months(1).start_from(last), Some(date(2024, 2, 29)));
    assert_eq!(Lookback::Years(2).start_from(last), Some(date(2022, 3, 31)));
    assert_eq!(Lookback::Max.start_from(last), None);
    assert_eq!(Lookback::default(), Lookback::Years(2));
}

#[test]
fn test_csv_source_sorts_and_skips_missing_closes() {
    let dir = tempdir().unwrap();
    fs::write(
        dir.path().join("AAPL.csv"),
        "Date,Open,Close\n\
         2024-01-04,1,12.0\n\
         2024-01-02 00:00:00-05:00,1,10.0\n\
         2024-01-03,1,\n\
         2024-01-05,1,13.0\n",
    )
    .unwrap();

    let source = CsvHistorySource::new(dir.path());
    let series = source.fetch_history("aapl", Lookback::Max).unwrap();

    assert_eq!(series.closes(), &[10.0, 12.0, 13.0]);
    assert_eq!(series.first_date(), date(2024, 1, 2));
    assert_eq!(series.last_date(), date(2024, 1, 5));
}

#[test]
fn test_csv_source_applies_lookback() {
    let dir = tempdir().unwrap();
    let mut body = String::from("Date,Close\n");
    for day in 1..=31 {
        body.push_str(&format!("2024-01-{:02},{}\n", day, 100 + day));
    }
    fs::write(dir.path().join("MSFT.csv"), body).unwrap();

    let source = CsvHistorySource::new(dir.path());
    let series = source.fetch_history("MSFT", Lookback::Days(10)).unwrap();

    assert_eq!(series.len(), 11);
    assert_eq!(series.first_date(), date(2024, 1, 21));
    assert_eq!(series.current_price(), 131.0);
}

#[test]
fn test_unknown_ticker_is_no_data() {
    let dir = tempdir().unwrap();
    let source = CsvHistorySource::new(dir.path());

    match source.fetch_history("zzzz", Lookback::default()) {
        Err(ForecastError::NoData(ticker)) => assert_eq!(ticker, "ZZZZ"),
        other => panic!("Expected NoData, got {:?}", other),
    }
}

#[test]
fn test_file_without_rows_is_no_data() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("EMPTY.csv"), "Date,Close\n").unwrap();

    let source = CsvHistorySource::new(dir.path());
    assert!(matches!(
        source.fetch_history("EMPTY", Lookback::Max),
        Err(ForecastError::NoData(_))
    ));
}

#[test]
fn test_path_traversal_rejected() {
    let source = CsvHistorySource::new("/tmp");
    assert!(matches!(
        source.path_for("../etc/passwd"),
        Err(ForecastError::InvalidParameter(_))
    ));
}
