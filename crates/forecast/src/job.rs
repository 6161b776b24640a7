use serde::{Deserialize, Serialize};
use thiserror::Error;

use revcast_core::TenantId;

use crate::config::ForecastConfig;
use crate::orchestrator::SalesForecaster;
use crate::prepare::DEFAULT_DAYS_BACK;
use crate::reader::RevenueReader;
use crate::result::ForecastOutcome;

/// A tenant-scoped analytics unit.
///
/// Jobs read through their own read-model handles and never mutate
/// domain state. Business-level "could not forecast" answers are part of
/// `Output`; `JobError` is reserved for jobs that cannot run at all.
pub trait AnalyticsJob: Send + Sync + 'static {
    type Input: Send + Sync + 'static;
    type Output: Send + 'static;

    /// The tenant this job belongs to.
    fn tenant_id(&self) -> TenantId;

    fn input(&self) -> &Self::Input;

    fn run(&self) -> Result<Self::Output, JobError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JobError {
    #[error("invalid job input: {0}")]
    InvalidInput(String),
}

/// Window sizes for one forecast run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForecastParams {
    pub days_back: usize,
    pub days_ahead: usize,
}

impl Default for ForecastParams {
    fn default() -> Self {
        Self {
            days_back: DEFAULT_DAYS_BACK,
            days_ahead: 7,
        }
    }
}

/// Sales forecast for one tenant.
#[derive(Debug, Clone)]
pub struct ForecastJob<R> {
    forecaster: SalesForecaster<R>,
    params: ForecastParams,
}

impl<R: RevenueReader> ForecastJob<R> {
    pub fn new(reader: R, tenant_id: TenantId, params: ForecastParams) -> Self {
        Self {
            forecaster: SalesForecaster::new(reader, tenant_id),
            params,
        }
    }

    pub fn with_config(mut self, config: ForecastConfig) -> Self {
        self.forecaster = self.forecaster.with_config(config);
        self
    }

    pub fn with_today(mut self, today: chrono::NaiveDate) -> Self {
        self.forecaster = self.forecaster.with_today(today);
        self
    }
}

impl<R> AnalyticsJob for ForecastJob<R>
where
    R: RevenueReader + 'static,
{
    type Input = ForecastParams;
    type Output = ForecastOutcome;

    fn tenant_id(&self) -> TenantId {
        self.forecaster.tenant_id()
    }

    fn input(&self) -> &ForecastParams {
        &self.params
    }

    fn run(&self) -> Result<ForecastOutcome, JobError> {
        if self.params.days_ahead == 0 {
            return Err(JobError::InvalidInput("days_ahead must be at least 1".to_string()));
        }
        Ok(self.forecaster.forecast(self.params.days_back, self.params.days_ahead))
    }
}
