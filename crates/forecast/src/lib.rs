//! `revcast-forecast`
//!
//! **Responsibility:** daily sales forecasting.
//!
//! Pipeline: prepare (gap-filled lookback window) → clean (outliers, noise) →
//! select (holdout cross-validation over Holt-Winters candidates) → forecast
//! (full-series fit, simulated prediction intervals, diagnostics) → summarise.
//!
//! This crate is not part of the domain model:
//! - It reads revenue through [`RevenueReader`] and never mutates domain state.
//! - It returns insights ([`SalesForecast`]) or a closed set of
//!   [`ForecastFailure`]s, not domain events.

pub mod clean;
pub mod config;
pub mod forecaster;
pub mod holt_winters;
pub mod job;
pub mod optimize;
pub mod orchestrator;
pub mod prepare;
pub mod reader;
pub mod result;
pub mod scheduler;
pub mod select;
pub mod stats;

pub use clean::{clean_sales_data, clean_values, detect_outliers_iqr, ewm_mean, rolling_median};
pub use config::ForecastConfig;
pub use forecaster::forecast_sales_holt_winters;
pub use holt_winters::{FittedModel, HoltWinters, ModelConfig, ModelError, SeasonalMode, SmoothingParams, TrendMode};
pub use job::{AnalyticsJob, ForecastJob, ForecastParams, JobError};
pub use orchestrator::{SalesForecaster, forecast_series, growth_rate, summarize};
pub use prepare::{build_daily_series, prepare_sales_data};
pub use reader::{RevenueReader, RevenueSourceError};
pub use result::{
    AccuracyGrade, ConfidenceInterval, FitStatistics, ForecastFailure, ForecastOutcome, ForecastPoint,
    ForecastResponse, ForecastSummary, HistoricalPoint, ResponseBody, SalesForecast,
};
pub use scheduler::{JobScheduler, LocalScheduler, TenantScope};
pub use select::{Selection, candidate_configs, select_best_model};
