use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One projected day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    /// Never negative.
    pub value: f64,
    pub day_name: String,
}

/// One observed day, echoed back with the forecast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    pub date: NaiveDate,
    pub value: f64,
    pub day_name: String,
}

/// 95% prediction interval for one projected day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub date: NaiveDate,
    /// Never negative.
    pub lower: f64,
    pub upper: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccuracyGrade {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl AccuracyGrade {
    /// Grade an in-sample MAPE (percent).
    pub fn from_mape(mape: f64) -> Self {
        if mape < 10.0 {
            AccuracyGrade::Excellent
        } else if mape < 20.0 {
            AccuracyGrade::Good
        } else if mape < 30.0 {
            AccuracyGrade::Fair
        } else {
            AccuracyGrade::Poor
        }
    }
}

/// In-sample fit diagnostics of the full-series model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitStatistics {
    pub aic: f64,
    pub bic: f64,
    pub mse: f64,
    pub mae: f64,
    pub rmse: f64,
    /// MAE relative to the observed mean, in percent.
    pub mae_pct: f64,
    /// RMSE relative to the observed mean, in percent.
    pub rmse_pct: f64,
    pub mape: f64,
    pub accuracy_grade: AccuracyGrade,
}

/// Headline numbers comparing the history with the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSummary {
    pub historical_avg: f64,
    pub historical_total: f64,
    pub historical_min: f64,
    pub historical_max: f64,
    pub forecast_avg: f64,
    pub forecast_total: f64,
    pub forecast_min: f64,
    pub forecast_max: f64,
    /// Percent change of the forecast average over the historical average.
    pub growth_rate: f64,
    pub data_points_used: usize,
}

/// A successful forecast run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesForecast {
    pub forecast: Vec<ForecastPoint>,
    pub historical: Vec<HistoricalPoint>,
    pub confidence_intervals: Vec<ConfidenceInterval>,
    pub statistics: FitStatistics,
    pub model_type: String,
    pub seasonal_periods: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<ForecastSummary>,
}

impl SalesForecast {
    pub fn with_summary(mut self, summary: ForecastSummary) -> Self {
        self.summary = Some(summary);
        self
    }
}

/// Why a forecast could not be produced.
///
/// `Display` gives the short error; [`message`](Self::message) the
/// user-facing explanation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ForecastFailure {
    #[error("No historical sales data available")]
    NoData,

    #[error("Insufficient data variation")]
    NoVariation,

    #[error("Insufficient data")]
    InsufficientData { required: usize, available: usize },

    #[error("{reason}")]
    ForecastError { reason: String },
}

impl ForecastFailure {
    pub fn message(&self) -> String {
        match self {
            ForecastFailure::NoData => "Please ensure there are completed orders in the system.".to_string(),
            ForecastFailure::NoVariation => {
                "Historical sales data shows no variation. More diverse data is needed for forecasting.".to_string()
            }
            ForecastFailure::InsufficientData { required, available } => format!(
                "At least {required} days of historical data required. Currently have {available} days."
            ),
            ForecastFailure::ForecastError { .. } => {
                "Unable to generate forecast. This may be due to insufficient or irregular data.".to_string()
            }
        }
    }

    /// Stable machine-readable kind, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ForecastFailure::NoData => "no_data",
            ForecastFailure::NoVariation => "no_variation",
            ForecastFailure::InsufficientData { .. } => "insufficient_data",
            ForecastFailure::ForecastError { .. } => "forecast_error",
        }
    }
}

pub type ForecastOutcome = Result<SalesForecast, ForecastFailure>;

/// Wire shape of a forecast response:
/// `{"success": true, ...forecast fields}` or
/// `{"success": false, "error": ..., "message": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResponse {
    pub success: bool,
    #[serde(flatten)]
    pub body: ResponseBody,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Forecast(SalesForecast),
    Failure { error: String, message: String },
}

impl From<ForecastOutcome> for ForecastResponse {
    fn from(outcome: ForecastOutcome) -> Self {
        match outcome {
            Ok(forecast) => Self {
                success: true,
                body: ResponseBody::Forecast(forecast),
            },
            Err(failure) => Self {
                success: false,
                body: ResponseBody::Failure {
                    error: failure.to_string(),
                    message: failure.message(),
                },
            },
        }
    }
}

impl From<ForecastFailure> for ForecastResponse {
    fn from(failure: ForecastFailure) -> Self {
        Self::from(Err::<SalesForecast, _>(failure))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn grade_boundaries() {
        assert_eq!(AccuracyGrade::from_mape(9.99), AccuracyGrade::Excellent);
        assert_eq!(AccuracyGrade::from_mape(10.0), AccuracyGrade::Good);
        assert_eq!(AccuracyGrade::from_mape(19.99), AccuracyGrade::Good);
        assert_eq!(AccuracyGrade::from_mape(29.99), AccuracyGrade::Fair);
        assert_eq!(AccuracyGrade::from_mape(30.01), AccuracyGrade::Poor);
    }

    #[test]
    fn insufficient_data_message_names_both_counts() {
        let failure = ForecastFailure::InsufficientData { required: 14, available: 10 };
        assert_eq!(failure.to_string(), "Insufficient data");
        assert_eq!(
            failure.message(),
            "At least 14 days of historical data required. Currently have 10 days."
        );
        assert_eq!(failure.kind(), "insufficient_data");
    }

    #[test]
    fn failure_response_shape() {
        let response = ForecastResponse::from(ForecastFailure::NoData);
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(
            value,
            json!({
                "success": false,
                "error": "No historical sales data available",
                "message": "Please ensure there are completed orders in the system."
            })
        );

        let response = ForecastResponse::from(ForecastFailure::ForecastError {
            reason: "numerical failure: fitted values are not finite".to_string(),
        });
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["error"], "numerical failure: fitted values are not finite");
    }

    #[test]
    fn success_response_flattens_forecast_fields() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        let forecast = SalesForecast {
            forecast: vec![ForecastPoint {
                date,
                value: 120.5,
                day_name: "Saturday".to_string(),
            }],
            historical: vec![],
            confidence_intervals: vec![ConfidenceInterval {
                date,
                lower: 0.0,
                upper: 180.0,
            }],
            statistics: FitStatistics {
                aic: 10.0,
                bic: 12.0,
                mse: 4.0,
                mae: 2.0,
                rmse: 2.0,
                mae_pct: 1.5,
                rmse_pct: 1.5,
                mape: 1.2,
                accuracy_grade: AccuracyGrade::Excellent,
            },
            model_type: "Holt-Winters Additive Seasonal".to_string(),
            seasonal_periods: Some(7),
            summary: None,
        };

        let value = serde_json::to_value(ForecastResponse::from(ForecastOutcome::Ok(forecast))).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["forecast"][0]["date"], "2024-03-09");
        assert_eq!(value["forecast"][0]["day_name"], "Saturday");
        assert_eq!(value["confidence_intervals"][0]["upper"], 180.0);
        assert_eq!(value["statistics"]["accuracy_grade"], "Excellent");
        assert_eq!(value["seasonal_periods"], 7);
        assert!(value.get("summary").is_none());
    }
}
