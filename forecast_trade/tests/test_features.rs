use forecast_trade::error::ForecastError;
use forecast_trade::features::{build_lag_features, DEFAULT_LAGS};
use pretty_assertions::assert_eq;
use rstest::rstest;

#[test]
fn test_five_points_with_five_lags_is_empty() {
    let prices = [1.0, 2.0, 3.0, 4.0, 5.0];
    let result = build_lag_features(&prices, DEFAULT_LAGS);
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}

#[test]
fn test_six_points_yield_one_record_most_recent_first() {
    let prices = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    let table = build_lag_features(&prices, 5).unwrap();

    assert_eq!(table.len(), 1);
    let record = &table.records()[0];
    assert_eq!(record.lags, vec![5.0, 4.0, 3.0, 2.0, 1.0]);
    assert_eq!(record.label, 6.0);
}

#[rstest]
#[case(10, 1, 9)]
#[case(10, 5, 5)]
#[case(30, 5, 25)]
#[case(7, 6, 1)]
fn test_record_count(#[case] n: usize, #[case] lags: usize, #[case] expected: usize) {
    let prices: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
    let table = build_lag_features(&prices, lags).unwrap();

    assert_eq!(table.len(), expected);
    assert_eq!(table.lags(), lags);
    for (offset, record) in table.records().iter().enumerate() {
        let i = offset + lags;
        assert_eq!(record.label, prices[i]);
        assert_eq!(record.lags[0], prices[i - 1]);
        assert_eq!(record.lags[lags - 1], prices[i - lags]);
    }
}

#[test]
fn test_zero_lags_rejected() {
    let result = build_lag_features(&[1.0, 2.0, 3.0], 0);
    assert!(matches!(result, Err(ForecastError::InvalidParameter(_))));
}

#[test]
fn test_chronological_split_keeps_order() {
    let prices: Vec<f64> = (0..15).map(|i| i as f64).collect();
    let table = build_lag_features(&prices, 5).unwrap();
    let (train, test) = table.split_chronological(0.2).unwrap();

    assert_eq!(train.len(), 8);
    assert_eq!(test.len(), 2);
    assert_eq!(train.labels(), vec![5.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0, 12.0]);
    assert_eq!(test.labels(), vec![13.0, 14.0]);
    assert_eq!(test.features()[0], vec![12.0, 11.0, 10.0, 9.0, 8.0]);
}

#[test]
fn test_split_uses_ceiling_for_test_size() {
    let prices: Vec<f64> = (0..12).map(|i| i as f64).collect();
    // 7 records, ceil(1.4) = 2 held out
    let table = build_lag_features(&prices, 5).unwrap();
    let (train, test) = table.split_chronological(0.2).unwrap();
    assert_eq!((train.len(), test.len()), (5, 2));
}

#[test]
fn test_single_record_cannot_be_split() {
    let table = build_lag_features(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 5).unwrap();
    let result = table.split_chronological(0.2);
    assert!(matches!(result, Err(ForecastError::InsufficientData(_))));
}
