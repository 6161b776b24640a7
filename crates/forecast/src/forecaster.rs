//! Full-series fit, projection, prediction intervals and diagnostics.

use chrono::{Days, NaiveDate};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, warn};

use revcast_core::DailyRevenueSeries;

use crate::config::ForecastConfig;
use crate::holt_winters::{FittedModel, HoltWinters, ModelError};
use crate::result::{
    AccuracyGrade, ConfidenceInterval, FitStatistics, ForecastFailure, ForecastOutcome, ForecastPoint,
    HistoricalPoint, SalesForecast,
};
use crate::select::Selection;
use crate::stats::{mape, mean, quantile_sorted};

/// Label used when selection fell back for lack of data.
pub const FALLBACK_MODEL_TYPE: &str = "Simple Exponential Smoothing (Trend Only)";

const LOWER_PERCENTILE: f64 = 0.025;
const UPPER_PERCENTILE: f64 = 0.975;

/// Smallest history the forecaster accepts for a given seasonal period.
pub fn min_required_days(seasonal_periods: usize) -> usize {
    14.max(seasonal_periods * 2)
}

/// Fit the selected configuration on the whole series and project
/// `days_ahead` days past its last date.
pub fn forecast_sales_holt_winters(
    series: &DailyRevenueSeries,
    selection: &Selection,
    days_ahead: usize,
    config: &ForecastConfig,
) -> ForecastOutcome {
    let required = min_required_days(config.seasonal_periods);
    if series.len() < required {
        return Err(ForecastFailure::InsufficientData {
            required,
            available: series.len(),
        });
    }

    run(series, selection, days_ahead, config).map_err(|e| {
        warn!(error = %e, "forecast failed");
        ForecastFailure::ForecastError { reason: e.to_string() }
    })
}

fn run(
    series: &DailyRevenueSeries,
    selection: &Selection,
    days_ahead: usize,
    config: &ForecastConfig,
) -> Result<SalesForecast, ModelError> {
    if days_ahead == 0 {
        return Err(ModelError::InvalidData("forecast horizon must be at least one day".to_string()));
    }
    if config.simulations == 0 {
        return Err(ModelError::Simulation("at least one simulated path is required".to_string()));
    }

    let model_config = selection.config();
    let (model_type, seasonal_periods) = if selection.is_fallback() {
        (FALLBACK_MODEL_TYPE.to_string(), None)
    } else {
        let periods = if model_config.is_seasonal() {
            model_config.seasonal_periods
        } else {
            None
        };
        (model_config.describe(), periods)
    };

    let observed = series.values();
    let fitted = HoltWinters::new(model_config).fit(&observed)?;
    debug!(
        model = %model_type,
        alpha = fitted.params().alpha,
        beta = fitted.params().beta,
        gamma = fitted.params().gamma,
        phi = fitted.params().phi,
        sse = fitted.sse(),
        "fitted full-series model"
    );

    let projected = fitted.forecast(days_ahead);
    let mut rng = StdRng::seed_from_u64(config.simulation_seed);
    let paths = fitted.simulate(days_ahead, config.simulations, &mut rng)?;

    let last_date = series
        .last_date()
        .ok_or_else(|| ModelError::InvalidData("series is empty".to_string()))?;
    let dates = future_dates(last_date, days_ahead)?;

    let confidence_intervals = dates
        .iter()
        .zip(paths)
        .map(|(date, mut draws)| {
            draws.sort_by(|a, b| a.total_cmp(b));
            let (Some(lower), Some(upper)) = (
                quantile_sorted(&draws, LOWER_PERCENTILE),
                quantile_sorted(&draws, UPPER_PERCENTILE),
            ) else {
                return Err(ModelError::InvalidData(format!("no simulated values for {date}")));
            };
            Ok(ConfidenceInterval {
                date: *date,
                lower: lower.max(0.0),
                upper,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let forecast = dates
        .iter()
        .zip(&projected)
        .map(|(date, value)| ForecastPoint {
            date: *date,
            value: value.max(0.0),
            day_name: day_name(*date),
        })
        .collect();

    let historical = series
        .iter()
        .map(|p| HistoricalPoint {
            date: p.date,
            value: p.amount,
            day_name: day_name(p.date),
        })
        .collect();

    Ok(SalesForecast {
        forecast,
        historical,
        confidence_intervals,
        statistics: fit_statistics(&observed, &fitted),
        model_type,
        seasonal_periods,
        summary: None,
    })
}

/// In-sample error metrics of a fitted model.
pub fn fit_statistics(observed: &[f64], fitted: &FittedModel) -> FitStatistics {
    let residuals = fitted.residuals();
    let mse = mean(&residuals.iter().map(|r| r * r).collect::<Vec<_>>());
    let mae = mean(&residuals.iter().map(|r| r.abs()).collect::<Vec<_>>());
    let rmse = mse.sqrt();
    let mape = mape(observed, fitted.fitted_values()).unwrap_or(0.0);

    let mean_actual = mean(observed);
    let (mae_pct, rmse_pct) = if mean_actual > 0.0 {
        (mae / mean_actual * 100.0, rmse / mean_actual * 100.0)
    } else {
        (0.0, 0.0)
    };

    FitStatistics {
        aic: fitted.aic(),
        bic: fitted.bic(),
        mse,
        mae,
        rmse,
        mae_pct,
        rmse_pct,
        mape,
        accuracy_grade: AccuracyGrade::from_mape(mape),
    }
}

fn future_dates(last: NaiveDate, days_ahead: usize) -> Result<Vec<NaiveDate>, ModelError> {
    (1..=days_ahead as u64)
        .map(|h| {
            last.checked_add_days(Days::new(h))
                .ok_or_else(|| ModelError::InvalidData("forecast runs past the supported calendar".to_string()))
        })
        .collect()
}

fn day_name(date: NaiveDate) -> String {
    date.format("%A").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::holt_winters::{ModelConfig, SeasonalMode, TrendMode};
    use crate::select::select_best_model;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn noisy_weekly(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| {
                let base = if i % 7 >= 4 { 450.0 } else { 200.0 };
                base + i as f64 * 1.5 + ((i * 29) % 13) as f64 * 6.0
            })
            .collect()
    }

    fn config() -> ForecastConfig {
        ForecastConfig::default().with_simulations(300)
    }

    #[test]
    fn short_series_is_rejected_with_counts() {
        let series = DailyRevenueSeries::from_values(day(2024, 1, 1), noisy_weekly(10)).unwrap();
        let err = forecast_sales_holt_winters(&series, &Selection::InsufficientData, 7, &config()).unwrap_err();
        assert_eq!(err, ForecastFailure::InsufficientData { required: 14, available: 10 });
    }

    #[test]
    fn seasonal_forecast_has_dated_points_and_ordered_bands() {
        // 2024-01-01 is a Monday; 42 days end on Sunday 2024-02-11.
        let values = noisy_weekly(42);
        let series = DailyRevenueSeries::from_values(day(2024, 1, 1), values.clone()).unwrap();
        let selection = select_best_model(&values, 7);
        let result = forecast_sales_holt_winters(&series, &selection, 7, &config()).unwrap();

        assert_eq!(result.forecast.len(), 7);
        assert_eq!(result.confidence_intervals.len(), 7);
        assert_eq!(result.historical.len(), 42);
        assert_eq!(result.forecast[0].date, day(2024, 2, 12));
        assert_eq!(result.forecast[0].day_name, "Monday");
        assert_eq!(result.historical[0].day_name, "Monday");
        assert_eq!(result.seasonal_periods, Some(7));
        assert!(result.model_type.starts_with("Holt-Winters"));

        for (point, band) in result.forecast.iter().zip(&result.confidence_intervals) {
            assert!(point.value >= 0.0);
            assert!(band.lower >= 0.0);
            assert!(band.lower <= band.upper);
            assert_eq!(point.date, band.date);
        }
        assert!(result.statistics.aic.is_finite());
        assert!(result.statistics.mape >= 0.0);
    }

    #[test]
    fn fallback_selection_uses_trend_only_label() {
        let values = noisy_weekly(20);
        let series = DailyRevenueSeries::from_values(day(2024, 5, 1), values).unwrap();
        let result = forecast_sales_holt_winters(&series, &Selection::InsufficientData, 3, &config()).unwrap();
        assert_eq!(result.model_type, FALLBACK_MODEL_TYPE);
        assert_eq!(result.seasonal_periods, None);
        assert_eq!(result.forecast.len(), 3);
    }

    #[test]
    fn forecasts_are_reproducible_for_a_seed() {
        let values = noisy_weekly(35);
        let series = DailyRevenueSeries::from_values(day(2024, 1, 1), values).unwrap();
        let selection = Selection::Evaluated {
            config: ModelConfig::seasonal(TrendMode::Additive, SeasonalMode::Additive, 7, false),
            aic: 0.0,
            cv_mape: 0.0,
        };
        let a = forecast_sales_holt_winters(&series, &selection, 5, &config()).unwrap();
        let b = forecast_sales_holt_winters(&series, &selection, 5, &config()).unwrap();
        assert_eq!(a.confidence_intervals, b.confidence_intervals);
    }

    #[test]
    fn declining_series_never_projects_negative_revenue() {
        let values: Vec<f64> = (0..28).map(|i| (300.0 - 12.0 * i as f64).max(1.0)).collect();
        let series = DailyRevenueSeries::from_values(day(2024, 1, 1), values).unwrap();
        let result = forecast_sales_holt_winters(&series, &Selection::InsufficientData, 14, &config()).unwrap();
        assert!(result.forecast.iter().all(|p| p.value >= 0.0));
        assert!(result.confidence_intervals.iter().all(|c| c.lower >= 0.0));
    }

    #[test]
    fn zero_horizon_is_a_forecast_error() {
        let series = DailyRevenueSeries::from_values(day(2024, 1, 1), noisy_weekly(21)).unwrap();
        let err = forecast_sales_holt_winters(&series, &Selection::InsufficientData, 0, &config()).unwrap_err();
        assert!(matches!(err, ForecastFailure::ForecastError { .. }));
        assert_eq!(
            err.message(),
            "Unable to generate forecast. This may be due to insufficient or irregular data."
        );
    }

    #[test]
    fn statistics_use_non_zero_days_for_mape() {
        let values = vec![0.0, 100.0, 0.0, 120.0, 110.0, 0.0, 130.0, 90.0, 0.0, 100.0, 115.0, 0.0, 125.0, 105.0];
        let fitted = HoltWinters::new(ModelConfig::trend_only()).fit(&values).unwrap();
        let stats = fit_statistics(&values, &fitted);
        assert!(stats.mape.is_finite());
        assert!((stats.rmse - stats.mse.sqrt()).abs() < 1e-12);
        assert!(stats.mae <= stats.rmse + 1e-12);
    }
}
