use forecast_trade::config::PipelineConfig;
use forecast_trade::data::Lookback;
use forecast_trade::error::ForecastError;
use forecast_trade::models::ArimaOrder;
use pretty_assertions::assert_eq;
use std::fs;
use tempfile::tempdir;

#[test]
fn test_defaults() {
    let config = PipelineConfig::default();

    assert_eq!(config.horizon, 30);
    assert_eq!(config.lookback, Lookback::Years(2));
    assert!(config.selection.parallel);
    assert_eq!(config.selection.trainer_timeout_secs, Some(300.0));
    assert_eq!(config.lag_regression.lags, 5);
    assert_eq!(config.lag_regression.forest.n_trees, 200);
    assert_eq!(config.lag_regression.forest.seed, 42);
    assert_eq!(config.arima.order, ArimaOrder::new(5, 1, 0));
    assert_eq!(config.recurrent.window, 30);
    assert_eq!(config.recurrent.hidden_size, 32);
    assert_eq!(config.recurrent.max_epochs, 40);
    assert_eq!(config.recurrent.batch_size, 16);
    assert_eq!(config.recurrent.patience, 5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let config = PipelineConfig::from_toml_str(
        r#"
horizon = 14
lookback = "6mo"

[selection]
parallel = false

[lag_regression.forest]
n_trees = 25

[arima.order]
p = 2
d = 1
q = 1
"#,
    )
    .unwrap();

    assert_eq!(config.horizon, 14);
    assert_eq!(config.lookback, Lookback::Months(6));
    assert!(!config.selection.parallel);
    assert_eq!(config.selection.trainer_timeout_secs, Some(300.0));
    assert_eq!(config.lag_regression.forest.n_trees, 25);
    assert_eq!(config.lag_regression.forest.seed, 42);
    assert_eq!(config.arima.order, ArimaOrder::new(2, 1, 1));
    assert_eq!(config.recurrent.window, 30);
}

#[test]
fn test_empty_toml_is_default() {
    assert_eq!(
        PipelineConfig::from_toml_str("").unwrap(),
        PipelineConfig::default()
    );
}

#[test]
fn test_zero_horizon_rejected() {
    assert!(matches!(
        PipelineConfig::from_toml_str("horizon = 0"),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_nested_validation() {
    assert!(matches!(
        PipelineConfig::from_toml_str("[recurrent]\nwindow = 0"),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(matches!(
        PipelineConfig::from_toml_str("[selection]\ntrainer_timeout_secs = -1.0"),
        Err(ForecastError::InvalidParameter(_))
    ));
    assert!(matches!(
        PipelineConfig::from_toml_str("[lag_regression]\ntest_ratio = 1.5"),
        Err(ForecastError::InvalidParameter(_))
    ));
}

#[test]
fn test_malformed_toml_is_config_error() {
    assert!(matches!(
        PipelineConfig::from_toml_str("horizon = \"soon\""),
        Err(ForecastError::Config(_))
    ));
    assert!(matches!(
        PipelineConfig::from_toml_str("lookback = \"2w\""),
        Err(ForecastError::Config(_))
    ));
}

#[test]
fn test_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("pipeline.toml");
    fs::write(&path, "horizon = 7\n[recurrent]\nhidden_size = 8\n").unwrap();

    let config = PipelineConfig::from_file(&path).unwrap();
    assert_eq!(config.horizon, 7);
    assert_eq!(config.recurrent.hidden_size, 8);

    assert!(matches!(
        PipelineConfig::from_file(dir.path().join("missing.toml")),
        Err(ForecastError::Config(_))
    ));
}

#[test]
fn test_written_config_reloads() {
    let mut config = PipelineConfig::default();
    config.horizon = 21;
    config.lookback = Lookback::Max;
    config.selection.trainer_timeout_secs = Some(60.0);

    let text = config.to_toml_string().unwrap();
    assert_eq!(PipelineConfig::from_toml_str(&text).unwrap(), config);
}
