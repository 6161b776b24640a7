//! Configuration loading and request clamping.

use serde::{Deserialize, Serialize};
use tracing::warn;

use revcast_forecast::{ForecastConfig, ForecastParams};

pub const DAYS_BACK_ENV: &str = "REVCAST_DAYS_BACK";
pub const DAYS_AHEAD_ENV: &str = "REVCAST_DAYS_AHEAD";
pub const SIMULATIONS_ENV: &str = "REVCAST_SIMULATIONS";
pub const SEED_ENV: &str = "REVCAST_SEED";

pub const DAYS_BACK_RANGE: (i64, i64) = (7, 90);
pub const DAYS_AHEAD_RANGE: (i64, i64) = (1, 30);

/// Caller-supplied forecast window, before clamping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastRequest {
    pub days_back: i64,
    pub days_ahead: i64,
}

impl Default for ForecastRequest {
    fn default() -> Self {
        Self {
            days_back: 60,
            days_ahead: 7,
        }
    }
}

impl ForecastRequest {
    pub fn new(days_back: i64, days_ahead: i64) -> Self {
        Self { days_back, days_ahead }
    }

    /// Clamp `days_back` to [7, 90] and `days_ahead` to [1, 30].
    pub fn clamped(&self) -> ForecastParams {
        let days_back = self.days_back.clamp(DAYS_BACK_RANGE.0, DAYS_BACK_RANGE.1);
        let days_ahead = self.days_ahead.clamp(DAYS_AHEAD_RANGE.0, DAYS_AHEAD_RANGE.1);
        ForecastParams {
            days_back: days_back as usize,
            days_ahead: days_ahead as usize,
        }
    }
}

/// Process-level forecast settings.
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSettings {
    pub params: ForecastParams,
    pub forecast: ForecastConfig,
}

impl Default for ForecastSettings {
    fn default() -> Self {
        Self {
            params: ForecastRequest::default().clamped(),
            forecast: ForecastConfig::default(),
        }
    }
}

impl ForecastSettings {
    /// Defaults overridden by `REVCAST_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) with an explicit variable source.
    /// Unparseable values are logged and ignored.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut request = ForecastRequest::default();
        if let Some(v) = parse_var::<i64, _>(&lookup, DAYS_BACK_ENV) {
            request.days_back = v;
        }
        if let Some(v) = parse_var::<i64, _>(&lookup, DAYS_AHEAD_ENV) {
            request.days_ahead = v;
        }

        let mut forecast = ForecastConfig::default();
        match parse_var::<usize, _>(&lookup, SIMULATIONS_ENV) {
            Some(0) => warn!(var = SIMULATIONS_ENV, "simulation count must be positive; ignoring"),
            Some(n) => forecast = forecast.with_simulations(n),
            None => {}
        }
        if let Some(seed) = parse_var::<u64, _>(&lookup, SEED_ENV) {
            forecast = forecast.with_simulation_seed(seed);
        }

        Self {
            params: request.clamped(),
            forecast,
        }
    }
}

fn parse_var<T, F>(lookup: &F, key: &str) -> Option<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(var = key, value = %raw, error = %e, "ignoring invalid configuration value");
            None
        }
    }
}
