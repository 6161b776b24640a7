//! Top-level forecast pipeline.

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use revcast_core::{DailyRevenueSeries, TenantId};

use crate::config::ForecastConfig;
use crate::forecaster::forecast_sales_holt_winters;
use crate::prepare::prepare_sales_data;
use crate::reader::RevenueReader;
use crate::result::{ForecastFailure, ForecastOutcome, ForecastPoint, ForecastSummary, HistoricalPoint};
use crate::select::select_best_model;
use crate::stats::{mean, sample_std};

/// Forecasts one tenant's daily revenue from a [`RevenueReader`].
#[derive(Debug, Clone)]
pub struct SalesForecaster<R> {
    reader: R,
    tenant_id: TenantId,
    config: ForecastConfig,
    today: Option<NaiveDate>,
}

impl<R: RevenueReader> SalesForecaster<R> {
    pub fn new(reader: R, tenant_id: TenantId) -> Self {
        Self {
            reader,
            tenant_id,
            config: ForecastConfig::default(),
            today: None,
        }
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Self {
        self.config = config;
        self
    }

    /// Pin the end of the lookback window (defaults to the current UTC date).
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn tenant_id(&self) -> TenantId {
        self.tenant_id
    }

    pub fn config(&self) -> &ForecastConfig {
        &self.config
    }

    /// Forecast `days_ahead` days from the last `days_back` days of revenue.
    pub fn forecast(&self, days_back: usize, days_ahead: usize) -> ForecastOutcome {
        let today = self.today.unwrap_or_else(|| Utc::now().date_naive());
        info!(tenant = %self.tenant_id, days_back, days_ahead, %today, "running sales forecast");

        let series = prepare_sales_data(&self.reader, self.tenant_id, today, days_back, &self.config);
        let outcome = forecast_series(&series, days_ahead, &self.config);

        match &outcome {
            Ok(result) => info!(
                tenant = %self.tenant_id,
                model = %result.model_type,
                mape = result.statistics.mape,
                "forecast completed"
            ),
            Err(failure) => info!(
                tenant = %self.tenant_id,
                kind = failure.kind(),
                error = %failure,
                "forecast not produced"
            ),
        }
        outcome
    }
}

/// Run selection, fitting and summarising on an already prepared series.
pub fn forecast_series(series: &DailyRevenueSeries, days_ahead: usize, config: &ForecastConfig) -> ForecastOutcome {
    let values = series.values();

    if values.iter().sum::<f64>() == 0.0 {
        return Err(ForecastFailure::NoData);
    }
    if sample_std(&values) <= 1e-12 * (1.0 + mean(&values).abs()) {
        return Err(ForecastFailure::NoVariation);
    }

    let selection = select_best_model(&values, config.seasonal_periods);
    debug!(?selection, "model selected");

    let result = forecast_sales_holt_winters(series, &selection, days_ahead, config)?;
    let summary = summarize(&result.historical, &result.forecast);
    Ok(result.with_summary(summary))
}

/// Headline comparison of history and projection.
pub fn summarize(historical: &[HistoricalPoint], forecast: &[ForecastPoint]) -> ForecastSummary {
    let hist: Vec<f64> = historical.iter().map(|p| p.value).collect();
    let fc: Vec<f64> = forecast.iter().map(|p| p.value).collect();

    let historical_avg = mean(&hist);
    let forecast_avg = mean(&fc);

    ForecastSummary {
        historical_avg,
        historical_total: hist.iter().sum(),
        historical_min: min(&hist),
        historical_max: max(&hist),
        forecast_avg,
        forecast_total: fc.iter().sum(),
        forecast_min: min(&fc),
        forecast_max: max(&fc),
        growth_rate: growth_rate(historical_avg, forecast_avg),
        data_points_used: hist.len(),
    }
}

/// Percent change from `historical_avg` to `forecast_avg`; 0 without a positive base.
pub fn growth_rate(historical_avg: f64, forecast_avg: f64) -> f64 {
    if historical_avg > 0.0 {
        (forecast_avg - historical_avg) / historical_avg * 100.0
    } else {
        0.0
    }
}

fn min(xs: &[f64]) -> f64 {
    xs.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

fn max(xs: &[f64]) -> f64 {
    xs.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::reader::RevenueSourceError;
    use crate::stats;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn config() -> ForecastConfig {
        ForecastConfig::default().with_simulations(200)
    }

    struct MapRevenue(BTreeMap<NaiveDate, f64>);

    impl RevenueReader for MapRevenue {
        fn daily_revenue(
            &self,
            _tenant_id: TenantId,
            start: NaiveDate,
            end: NaiveDate,
        ) -> Result<BTreeMap<NaiveDate, f64>, RevenueSourceError> {
            Ok(self.0.range(start..=end).map(|(d, v)| (*d, *v)).collect())
        }
    }

    #[test]
    fn all_zero_history_is_no_data() {
        let series = DailyRevenueSeries::from_values(day(2024, 1, 1), vec![0.0; 61]).unwrap();
        assert_eq!(forecast_series(&series, 7, &config()), Err(ForecastFailure::NoData));
    }

    #[test]
    fn constant_history_is_no_variation() {
        let series = DailyRevenueSeries::from_values(day(2024, 1, 1), vec![250.0; 61]).unwrap();
        assert_eq!(forecast_series(&series, 7, &config()), Err(ForecastFailure::NoVariation));
    }

    #[test]
    fn ten_days_are_insufficient() {
        let values: Vec<f64> = (0..10).map(|i| 100.0 + i as f64 * 7.0).collect();
        let series = DailyRevenueSeries::from_values(day(2024, 1, 1), values).unwrap();
        assert_eq!(
            forecast_series(&series, 7, &config()),
            Err(ForecastFailure::InsufficientData { required: 14, available: 10 })
        );
    }

    #[test]
    fn growth_rate_is_relative_to_history() {
        assert!((growth_rate(100.0, 120.0) - 20.0).abs() < 1e-12);
        assert_eq!(growth_rate(0.0, 50.0), 0.0);
    }

    #[test]
    fn weekly_pattern_is_recovered_end_to_end() {
        // 2024-01-01 is a Monday; Saturday and Sunday sell three times as much.
        let start = day(2024, 1, 1);
        let pattern: Vec<f64> = (0..67)
            .map(|i| if i % 7 >= 5 { 300.0 } else { 100.0 })
            .collect();
        let (history, holdout) = pattern.split_at(60);
        let series = DailyRevenueSeries::from_values(start, history.to_vec()).unwrap();

        let result = forecast_series(&series, 7, &config()).unwrap();
        assert_eq!(result.model_type, "Holt-Winters Additive Seasonal");
        assert_eq!(result.seasonal_periods, Some(7));

        let mut weekend = Vec::new();
        let mut weekday = Vec::new();
        for point in &result.forecast {
            if point.day_name == "Saturday" || point.day_name == "Sunday" {
                weekend.push(point.value);
            } else {
                weekday.push(point.value);
            }
        }
        let ratio = stats::mean(&weekend) / stats::mean(&weekday);
        assert!((2.4..=3.6).contains(&ratio), "weekend/weekday ratio {ratio}");

        let predicted: Vec<f64> = result.forecast.iter().map(|p| p.value).collect();
        let holdout_mape = stats::mape(holdout, &predicted).unwrap();
        assert!(holdout_mape < 15.0, "holdout MAPE {holdout_mape}");

        let summary = result.summary.unwrap();
        assert_eq!(summary.data_points_used, 60);
        assert!(summary.forecast_min >= 0.0);
    }

    #[test]
    fn custom_seasonal_period_drives_selection_and_minimum_history() {
        let five_day = config().with_seasonal_periods(5);
        let values: Vec<f64> = (0..40).map(|i| if i % 5 == 4 { 400.0 } else { 150.0 }).collect();
        let series = DailyRevenueSeries::from_values(day(2024, 1, 1), values).unwrap();

        let result = forecast_series(&series, 5, &five_day).unwrap();
        assert_eq!(result.seasonal_periods, Some(5));
        assert!(result.forecast[4].value > 2.0 * result.forecast[0].value, "{:?}", result.forecast);

        let ten_day = config().with_seasonal_periods(10);
        let short: Vec<f64> = (0..15).map(|i| 100.0 + (i % 4) as f64 * 30.0).collect();
        let series = DailyRevenueSeries::from_values(day(2024, 1, 1), short).unwrap();
        assert_eq!(
            forecast_series(&series, 7, &ten_day),
            Err(ForecastFailure::InsufficientData { required: 20, available: 15 })
        );
    }

    #[test]
    fn forecaster_reads_cleans_and_summarises() {
        let today = day(2024, 3, 31);
        let data: BTreeMap<NaiveDate, f64> = (0..=60u64)
            .map(|offset| {
                let date = today - chrono::Days::new(offset);
                let base = if offset % 7 < 2 { 520.0 } else { 240.0 };
                (date, base + (offset % 5) as f64 * 11.0)
            })
            .collect();

        let tenant = TenantId::new();
        let forecaster = SalesForecaster::new(MapRevenue(data), tenant)
            .with_config(config())
            .with_today(today);
        let result = forecaster.forecast(60, 7).unwrap();

        assert_eq!(forecaster.tenant_id(), tenant);
        assert_eq!(result.historical.len(), 61);
        assert_eq!(result.historical.last().unwrap().date, today);
        assert_eq!(result.forecast.len(), 7);
        assert_eq!(result.forecast[0].date, day(2024, 4, 1));
        assert!(result.summary.is_some());
        assert!(result.model_type.starts_with("Holt-Winters") || result.model_type.starts_with("Simple"));
    }

    #[test]
    fn empty_reader_reports_no_data() {
        let forecaster = SalesForecaster::new(MapRevenue(BTreeMap::new()), TenantId::new())
            .with_today(day(2024, 6, 1));
        assert_eq!(forecaster.forecast(30, 7), Err(ForecastFailure::NoData));
    }
}
