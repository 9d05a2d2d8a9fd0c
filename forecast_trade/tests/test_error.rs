use forecast_trade::error::ForecastError;
use forecast_trade::models::ModelKind;
use std::io;
use trade_math::MathError;

#[test]
fn test_error_conversion() {
    let io_error = io::Error::new(io::ErrorKind::NotFound, "file not found");
    assert!(matches!(ForecastError::from(io_error), ForecastError::IoError(_)));

    let math_error = MathError::CalculationError("singular".to_string());
    assert!(matches!(ForecastError::from(math_error), ForecastError::Math(_)));

    let json_error = serde_json::from_str::<f64>("not json").unwrap_err();
    assert!(matches!(ForecastError::from(json_error), ForecastError::Json(_)));

    let toml_error = toml::from_str::<toml::Table>("= broken").unwrap_err();
    assert!(matches!(ForecastError::from(toml_error), ForecastError::Config(_)));
}

#[test]
fn test_error_display() {
    let error = ForecastError::InsufficientHistory {
        required: 30,
        available: 12,
    };
    assert_eq!(
        error.to_string(),
        "Insufficient history: need at least 30 observations, got 12"
    );

    let error = ForecastError::TrainerTimeout {
        kind: ModelKind::RecurrentSequence,
        seconds: 300.0,
    };
    assert_eq!(error.to_string(), "LSTM trainer timed out after 300.0s");

    let error = ForecastError::TrainerFailed {
        kind: ModelKind::Autoregressive,
        message: "diverged".to_string(),
    };
    assert_eq!(error.to_string(), "ARIMA trainer failed: diverged");

    assert_eq!(ForecastError::NoData("ZZZZ".to_string()).to_string(), "No data for ticker ZZZZ");
    assert_eq!(ForecastError::EmptyForecast.to_string(), "Forecast is empty");
    assert_eq!(
        ForecastError::UnsupportedModel("Prophet".to_string()).to_string(),
        "Unsupported model: Prophet"
    );
}

#[test]
fn test_math_error_keeps_source_message() {
    let error = ForecastError::from(MathError::InsufficientData("need 3 rows".to_string()));
    let text = error.to_string();
    assert!(text.contains("Math error"));
    assert!(text.contains("need 3 rows"));
}
