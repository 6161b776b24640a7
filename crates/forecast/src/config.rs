use serde::{Deserialize, Serialize};

/// Tuning knobs for a forecast run.
///
/// Defaults: weekly seasonality, 1000 simulated paths, IQR multiplier 2.5,
/// 7-day rolling median, EMA span 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastConfig {
    /// Seasonal cycle length in days.
    pub seasonal_periods: usize,
    /// Number of simulated future paths used for prediction intervals.
    pub simulations: usize,
    /// Seed for the simulation RNG (runs are reproducible for a given seed).
    pub simulation_seed: u64,
    /// IQR multiplier for outlier detection.
    pub outlier_multiplier: f64,
    /// Window of the centred rolling median used to replace outliers.
    pub rolling_window: usize,
    /// Span of the final exponential moving average.
    pub smoothing_span: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            seasonal_periods: 7,
            simulations: 1000,
            simulation_seed: 0x5EED_F0CA_57,
            outlier_multiplier: 2.5,
            rolling_window: 7,
            smoothing_span: 3.0,
        }
    }
}

impl ForecastConfig {
    pub fn with_seasonal_periods(mut self, seasonal_periods: usize) -> Self {
        self.seasonal_periods = seasonal_periods;
        self
    }

    pub fn with_simulations(mut self, simulations: usize) -> Self {
        self.simulations = simulations;
        self
    }

    pub fn with_simulation_seed(mut self, seed: u64) -> Self {
        self.simulation_seed = seed;
        self
    }

    pub fn with_outlier_multiplier(mut self, multiplier: f64) -> Self {
        self.outlier_multiplier = multiplier;
        self
    }
}
