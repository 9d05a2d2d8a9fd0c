use approx::assert_relative_eq;
use forecast_trade::error::ForecastError;
use forecast_trade::strategy::evaluate_strategy;
use rstest::rstest;

#[test]
fn test_reference_scenario() {
    let rec = evaluate_strategy(&[90.0, 120.0, 95.0], 100.0, 1000.0).unwrap();

    assert_eq!(rec.shares, 10);
    assert_relative_eq!(rec.potential_profit, 200.0);
    assert_relative_eq!(rec.roi, 20.0);
    assert_eq!(rec.buy_day, 1);
    assert_eq!(rec.sell_day, 2);
    assert_relative_eq!(rec.min_forecast_price, 90.0);
    assert_relative_eq!(rec.max_forecast_price, 120.0);
    assert_relative_eq!(rec.current_price, 100.0);
    // mean is 101.666..., so +1.666...%
    assert_relative_eq!(rec.price_change_percent, 5.0 / 3.0, epsilon = 1e-12);
    assert!(!rec.sell_precedes_buy());
}

#[rstest]
#[case(1000.0, 100.0, 10)]
#[case(999.99, 100.0, 9)]
#[case(50.0, 100.0, 0)]
#[case(10.0, 2.5, 4)]
#[case(1000.0, 3.0, 333)]
fn test_shares_are_maximal(#[case] amount: f64, #[case] price: f64, #[case] expected: u64) {
    let rec = evaluate_strategy(&[price], price, amount).unwrap();
    assert_eq!(rec.shares, expected);
    assert!(rec.shares as f64 * price <= amount);
    assert!((rec.shares + 1) as f64 * price > amount);
}

#[test]
fn test_largest_countable_purchase() {
    let rec = evaluate_strategy(&[2.0], 1.0, 1e15).unwrap();
    assert_eq!(rec.shares, 1_000_000_000_000_000);
    assert_relative_eq!(rec.potential_profit, 1e15);
}

#[test]
fn test_zero_amount_has_zero_roi() {
    let rec = evaluate_strategy(&[110.0, 120.0], 100.0, 0.0).unwrap();
    assert_eq!(rec.shares, 0);
    assert_eq!(rec.potential_profit, 0.0);
    assert_eq!(rec.roi, 0.0);
}

#[test]
fn test_falling_forecast_gives_negative_profit() {
    let rec = evaluate_strategy(&[95.0, 90.0, 80.0], 100.0, 1000.0).unwrap();
    assert_eq!(rec.sell_day, 1);
    assert_eq!(rec.buy_day, 3);
    assert_relative_eq!(rec.potential_profit, -50.0);
    assert_relative_eq!(rec.roi, -5.0);
    assert!(rec.sell_precedes_buy());
    assert!(rec.price_change_percent < 0.0);
}

#[test]
fn test_ties_resolve_to_first_day() {
    let rec = evaluate_strategy(&[100.0, 90.0, 120.0, 90.0, 120.0], 100.0, 1000.0).unwrap();
    assert_eq!(rec.buy_day, 2);
    assert_eq!(rec.sell_day, 3);

    let flat = evaluate_strategy(&[50.0, 50.0, 50.0], 50.0, 100.0).unwrap();
    assert_eq!(flat.buy_day, 1);
    assert_eq!(flat.sell_day, 1);
    assert_eq!(flat.price_change_percent, 0.0);
}

#[test]
fn test_days_index_extremes() {
    let forecast = [101.0, 99.5, 104.0, 98.0, 103.0, 102.0];
    let rec = evaluate_strategy(&forecast, 100.0, 500.0).unwrap();

    assert!(rec.buy_day >= 1 && rec.buy_day <= forecast.len());
    assert!(rec.sell_day >= 1 && rec.sell_day <= forecast.len());
    assert_eq!(forecast[rec.buy_day - 1], rec.min_forecast_price);
    assert_eq!(forecast[rec.sell_day - 1], rec.max_forecast_price);
}

#[test]
fn test_empty_forecast() {
    assert!(matches!(
        evaluate_strategy(&[], 100.0, 1000.0),
        Err(ForecastError::EmptyForecast)
    ));
}

#[rstest]
#[case(0.0, 1000.0)]
#[case(-5.0, 1000.0)]
#[case(f64::NAN, 1000.0)]
#[case(100.0, -1.0)]
#[case(100.0, f64::INFINITY)]
#[case(1.0, 1e20)]
#[case(1e-300, 1.0)]
fn test_invalid_inputs(#[case] price: f64, #[case] amount: f64) {
    assert!(matches!(
        evaluate_strategy(&[100.0], price, amount),
        Err(ForecastError::InvalidParameter(_))
    ));
}
