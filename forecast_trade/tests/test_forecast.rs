mod common;

use chrono::Duration;
use forecast_trade::error::ForecastError;
use forecast_trade::forecast::{forecast_with_model, generate_forecast, RollingWindow};
use forecast_trade::models::{
    ArimaTrainer, LagRegressionTrainer, ModelKind, ModelTrainer, RecurrentTrainer, TrainedModel,
};
use forecast_trade::pipeline::Pipeline;
use pretty_assertions::assert_eq;
use rstest::rstest;

fn trained(kind: ModelKind, prices: &[f64]) -> TrainedModel {
    let config = common::small_config();
    let trainer: Box<dyn ModelTrainer> = match kind {
        ModelKind::RegressionOnLags => Box::new(LagRegressionTrainer::new(config.lag_regression)),
        ModelKind::Autoregressive => Box::new(ArimaTrainer::new(config.arima)),
        ModelKind::RecurrentSequence => Box::new(RecurrentTrainer::new(config.recurrent)),
    };
    trainer.train(prices).unwrap()
}

#[test]
fn test_rolling_window_drops_oldest() {
    let mut window = RollingWindow::from_observed(&[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(window.capacity(), 3);
    assert_eq!(window.observed(), 3);

    window.push(4.0);
    assert_eq!(window.oldest_first(), vec![2.0, 3.0, 4.0]);
    assert_eq!(window.recent_first(), vec![4.0, 3.0, 2.0]);
    assert_eq!(window.observed(), 2);

    window.push(5.0);
    window.push(6.0);
    window.push(7.0);
    assert_eq!(window.oldest_first(), vec![5.0, 6.0, 7.0]);
    assert_eq!(window.observed(), 0);
}

#[test]
fn test_rolling_window_needs_values() {
    assert!(RollingWindow::from_observed(&[]).is_err());
}

#[rstest]
#[case(ModelKind::RegressionOnLags, 1)]
#[case(ModelKind::RegressionOnLags, 30)]
#[case(ModelKind::Autoregressive, 7)]
#[case(ModelKind::Autoregressive, 30)]
#[case(ModelKind::RecurrentSequence, 1)]
#[case(ModelKind::RecurrentSequence, 15)]
fn test_path_length_matches_horizon(#[case] kind: ModelKind, #[case] horizon: usize) {
    let prices = common::noisy_closes(90, 21);
    let series = common::series_of(&prices);
    let model = trained(kind, &prices);

    let path = forecast_with_model(&series, &model, horizon).unwrap();

    assert_eq!(path.horizon(), horizon);
    assert_eq!(path.dates.len(), horizon);
    assert_eq!(path.model, kind);
    assert_eq!(path.current_price, *prices.last().unwrap());
    assert_eq!(path.dates[0], series.last_date() + Duration::days(1));
    for pair in path.dates.windows(2) {
        assert_eq!(pair[1] - pair[0], Duration::days(1));
    }
    assert!(path.values.iter().all(|v| v.is_finite()));
}

#[test]
fn test_zero_horizon_rejected() {
    let prices = common::noisy_closes(90, 22);
    let series = common::series_of(&prices);
    let model = trained(ModelKind::Autoregressive, &prices);

    assert!(matches!(
        forecast_with_model(&series, &model, 0),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_arima_path_matches_model_forecast() {
    let prices = common::noisy_closes(90, 23);
    let series = common::series_of(&prices);
    let model = trained(ModelKind::Autoregressive, &prices);

    let path = forecast_with_model(&series, &model, 8).unwrap();
    let TrainedModel::Autoregressive(arima) = &model else {
        panic!("Expected ARIMA");
    };
    assert_eq!(path.values, arima.forecast(8).unwrap());
}

#[test]
fn test_lag_path_feeds_predictions_back() {
    let prices = common::noisy_closes(90, 24);
    let series = common::series_of(&prices);
    let model = trained(ModelKind::RegressionOnLags, &prices);
    let TrainedModel::RegressionOnLags(forest) = &model else {
        panic!("Expected a lag regression model");
    };

    let path = forecast_with_model(&series, &model, 3).unwrap();

    let n = prices.len();
    let first = forest
        .predict_next(&[prices[n - 1], prices[n - 2], prices[n - 3], prices[n - 4], prices[n - 5]])
        .unwrap();
    let second = forest
        .predict_next(&[first, prices[n - 1], prices[n - 2], prices[n - 3], prices[n - 4]])
        .unwrap();
    assert_eq!(path.values[0], first);
    assert_eq!(path.values[1], second);
}

#[test]
fn test_recurrent_forecast_needs_full_window() {
    let prices = common::noisy_closes(90, 25);
    let model = trained(ModelKind::RecurrentSequence, &prices);
    let short = common::series_of(&prices[..8]);

    for _ in 0..2 {
        assert!(matches!(
            forecast_with_model(&short, &model, 5),
            Err(ForecastError::InsufficientHistory {
                required: 10,
                available: 8
            })
        ));
    }
}

#[test]
fn test_lag_forecast_needs_seed_prices() {
    let prices = common::noisy_closes(90, 26);
    let model = trained(ModelKind::RegressionOnLags, &prices);
    let short = common::series_of(&prices[..3]);

    assert!(matches!(
        forecast_with_model(&short, &model, 5),
        Err(ForecastError::InsufficientData(_))
    ));
}

#[test]
fn test_generate_forecast_uses_selected_model() {
    let prices = common::noisy_closes(100, 27);
    let series = common::series_of(&prices);
    let selection = Pipeline::new(common::small_config())
        .selector()
        .select(series.shared_closes())
        .unwrap();

    let path = generate_forecast(&series, &selection, 12).unwrap();
    assert_eq!(path.model, selection.kind());
    assert_eq!(path.horizon(), 12);
}
