//! Holt-Winters exponential smoothing.
//!
//! Error-correction recursions for a level, an optional (optionally damped)
//! additive trend and an optional additive or multiplicative seasonal
//! component:
//!
//! ```text
//! base_t   = l_{t-1} + φ·b_{t-1}
//! ŷ_t      = base_t (+ s_{t-m} | · s_{t-m})
//! l_t      = α·(y_t − s_{t-m} | y_t / s_{t-m}) + (1 − α)·base_t
//! b_t      = β·(l_t − l_{t-1}) + (1 − β)·φ·b_{t-1}
//! s_t      = γ·(y_t − base_t | y_t / base_t) + (1 − γ)·s_{t-m}
//! ```
//!
//! Smoothing parameters are estimated by minimising the in-sample sum of
//! squared one-step errors (brute-force grid, then Nelder–Mead from the best
//! grid points).

use rand::Rng;
use rand_distr::{Distribution, Normal};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::optimize::{NelderMeadConfig, brute_force_grid, nelder_mead};
use crate::stats::mean;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendMode {
    None,
    Additive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeasonalMode {
    None,
    Additive,
    Multiplicative,
}

/// One exponential-smoothing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelConfig {
    pub trend: TrendMode,
    pub seasonal: SeasonalMode,
    /// Cycle length; only meaningful when `seasonal` is not `None`.
    pub seasonal_periods: Option<usize>,
    /// Damp the trend towards flat over the horizon.
    pub damped: bool,
}

impl ModelConfig {
    /// Additive trend, no seasonality.
    pub fn trend_only() -> Self {
        Self {
            trend: TrendMode::Additive,
            seasonal: SeasonalMode::None,
            seasonal_periods: None,
            damped: false,
        }
    }

    pub fn seasonal(trend: TrendMode, seasonal: SeasonalMode, period: usize, damped: bool) -> Self {
        Self {
            trend,
            seasonal,
            seasonal_periods: Some(period),
            damped,
        }
    }

    pub fn has_trend(&self) -> bool {
        self.trend == TrendMode::Additive
    }

    pub fn is_seasonal(&self) -> bool {
        self.seasonal != SeasonalMode::None
    }

    pub fn is_damped(&self) -> bool {
        self.damped && self.has_trend()
    }

    /// Human-readable label, e.g. "Holt-Winters Additive Seasonal (Damped)".
    pub fn describe(&self) -> String {
        let seasonal = match self.seasonal {
            SeasonalMode::None => return "Holt-Winters (Trend Only)".to_string(),
            SeasonalMode::Additive => "Additive",
            SeasonalMode::Multiplicative => "Multiplicative",
        };
        let damped = if self.is_damped() { " (Damped)" } else { "" };
        format!("Holt-Winters {seasonal} Seasonal{damped}")
    }

    fn period(&self) -> usize {
        if self.is_seasonal() {
            self.seasonal_periods.unwrap_or(0)
        } else {
            1
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("insufficient data: {required} observations required, {actual} available")]
    InsufficientData { required: usize, actual: usize },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("numerical failure: {0}")]
    NonFinite(String),

    #[error("simulation failed: {0}")]
    Simulation(String),
}

/// Estimated smoothing parameters. Unused components hold neutral values
/// (`beta = gamma = 0`, `phi = 1`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingParams {
    pub alpha: f64,
    pub beta: f64,
    pub gamma: f64,
    pub phi: f64,
}

const SMOOTHING_BOUNDS: (f64, f64) = (0.0, 1.0);
const PHI_BOUNDS: (f64, f64) = (0.8, 0.98);
const SMOOTHING_GRID: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];
const PHI_GRID: [f64; 3] = [0.8, 0.9, 0.98];
/// Grid points refined by Nelder–Mead.
const REFINED_STARTS: usize = 3;

#[derive(Debug, Clone, PartialEq)]
struct State {
    level: f64,
    trend: f64,
    /// Seasonal factor for observation `t` lives at `seasonal[t % m]`.
    seasonal: Vec<f64>,
}

#[derive(Debug, Clone, Copy)]
struct Recursion {
    config: ModelConfig,
    params: SmoothingParams,
    period: usize,
}

impl Recursion {
    fn base(&self, state: &State) -> f64 {
        state.level + self.params.phi * state.trend
    }

    fn predict(&self, state: &State, t: usize) -> f64 {
        let base = self.base(state);
        match self.config.seasonal {
            SeasonalMode::None => base,
            SeasonalMode::Additive => base + state.seasonal[t % self.period],
            SeasonalMode::Multiplicative => base * state.seasonal[t % self.period],
        }
    }

    fn update(&self, state: &mut State, t: usize, y: f64) {
        let SmoothingParams { alpha, beta, gamma, phi } = self.params;
        let base = self.base(state);
        let slot = t % self.period;

        let level = match self.config.seasonal {
            SeasonalMode::None => alpha * y + (1.0 - alpha) * base,
            SeasonalMode::Additive => alpha * (y - state.seasonal[slot]) + (1.0 - alpha) * base,
            SeasonalMode::Multiplicative => alpha * (y / state.seasonal[slot]) + (1.0 - alpha) * base,
        };

        if self.config.has_trend() {
            state.trend = beta * (level - state.level) + (1.0 - beta) * phi * state.trend;
        }

        match self.config.seasonal {
            SeasonalMode::None => {}
            SeasonalMode::Additive => {
                state.seasonal[slot] = gamma * (y - base) + (1.0 - gamma) * state.seasonal[slot];
            }
            SeasonalMode::Multiplicative => {
                state.seasonal[slot] = gamma * (y / base) + (1.0 - gamma) * state.seasonal[slot];
            }
        }

        state.level = level;
    }

    /// Run the recursion over `values`, returning one-step fitted values,
    /// the final state and the sum of squared errors.
    fn run(&self, initial: &State, values: &[f64]) -> (Vec<f64>, State, f64) {
        let mut state = initial.clone();
        let mut fitted = Vec::with_capacity(values.len());
        let mut sse = 0.0;
        for (t, &y) in values.iter().enumerate() {
            let yhat = self.predict(&state, t);
            let e = y - yhat;
            sse += e * e;
            fitted.push(yhat);
            self.update(&mut state, t, y);
        }
        (fitted, state, sse)
    }
}

/// Unfitted model for a given configuration.
#[derive(Debug, Clone)]
pub struct HoltWinters {
    config: ModelConfig,
    search: NelderMeadConfig,
}

impl HoltWinters {
    pub fn new(config: ModelConfig) -> Self {
        Self {
            config,
            search: NelderMeadConfig::default(),
        }
    }

    /// Minimum number of observations this configuration can be fitted on.
    pub fn min_observations(&self) -> usize {
        if self.config.is_seasonal() {
            self.config.period()
        } else if self.config.has_trend() {
            2
        } else {
            1
        }
    }

    /// Estimate smoothing parameters and initial states on `values`.
    pub fn fit(&self, values: &[f64]) -> Result<FittedModel, ModelError> {
        self.validate(values)?;

        let period = self.config.period();
        let initial = initial_state(&self.config, period, values)?;
        let layout = ParamLayout::for_config(&self.config);

        let objective = |x: &[f64]| {
            let recursion = Recursion {
                config: self.config,
                params: layout.params(x),
                period,
            };
            let (_, _, sse) = recursion.run(&initial, values);
            if sse.is_finite() { sse } else { f64::INFINITY }
        };

        // Brute-force pass over the grid, then refine the best few starts.
        let mut starts: Vec<(Vec<f64>, f64)> = brute_force_grid(&layout.grid())
            .into_iter()
            .map(|x| {
                let f = objective(&x);
                (x, f)
            })
            .filter(|(_, f)| f.is_finite())
            .collect();
        if starts.is_empty() {
            return Err(ModelError::NonFinite(
                "no smoothing parameters produce a finite sum of squared errors".to_string(),
            ));
        }
        starts.sort_by(|a, b| a.1.total_cmp(&b.1));

        let bounds = layout.bounds();
        let mut best: Option<(Vec<f64>, f64)> = None;
        for (x0, f0) in starts.into_iter().take(REFINED_STARTS) {
            let refined = nelder_mead(&objective, &x0, &bounds, self.search);
            let candidate = if refined.value <= f0 {
                (refined.point, refined.value)
            } else {
                (x0, f0)
            };
            if best.as_ref().is_none_or(|(_, f)| candidate.1 < *f) {
                best = Some(candidate);
            }
        }
        let (x, _) = best.ok_or_else(|| ModelError::NonFinite("parameter search failed".to_string()))?;

        let recursion = Recursion {
            config: self.config,
            params: layout.params(&x),
            period,
        };
        let (fitted, final_state, sse) = recursion.run(&initial, values);
        if !sse.is_finite() || fitted.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite("fitted values are not finite".to_string()));
        }

        Ok(FittedModel {
            recursion,
            observed: values.to_vec(),
            fitted,
            final_state,
            sse,
            num_params: layout.len() + initial_state_count(&self.config, period),
        })
    }

    fn validate(&self, values: &[f64]) -> Result<(), ModelError> {
        if self.config.is_seasonal() && self.config.period() < 2 {
            return Err(ModelError::InvalidData(
                "seasonal period must be at least 2".to_string(),
            ));
        }
        let required = self.min_observations();
        if values.len() < required {
            return Err(ModelError::InsufficientData {
                required,
                actual: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(ModelError::InvalidData("series contains non-finite values".to_string()));
        }
        if self.config.seasonal == SeasonalMode::Multiplicative && values.iter().any(|v| *v <= 0.0) {
            return Err(ModelError::InvalidData(
                "multiplicative seasonality requires strictly positive data".to_string(),
            ));
        }
        Ok(())
    }
}

/// Position of each estimated parameter in the optimiser's vector.
#[derive(Debug, Clone, Copy)]
struct ParamLayout {
    beta: Option<usize>,
    gamma: Option<usize>,
    phi: Option<usize>,
}

impl ParamLayout {
    fn for_config(config: &ModelConfig) -> Self {
        let mut next = 1;
        let mut slot = |enabled: bool| {
            enabled.then(|| {
                let i = next;
                next += 1;
                i
            })
        };
        let beta = slot(config.has_trend());
        let gamma = slot(config.is_seasonal());
        let phi = slot(config.is_damped());
        Self { beta, gamma, phi }
    }

    fn len(&self) -> usize {
        1 + [self.beta, self.gamma, self.phi].iter().flatten().count()
    }

    fn params(&self, x: &[f64]) -> SmoothingParams {
        SmoothingParams {
            alpha: x[0],
            beta: self.beta.map_or(0.0, |i| x[i]),
            gamma: self.gamma.map_or(0.0, |i| x[i]),
            phi: self.phi.map_or(1.0, |i| x[i]),
        }
    }

    fn bounds(&self) -> Vec<(f64, f64)> {
        let mut b = vec![SMOOTHING_BOUNDS; self.len()];
        if let Some(i) = self.phi {
            b[i] = PHI_BOUNDS;
        }
        b
    }

    fn grid(&self) -> Vec<Vec<f64>> {
        let mut axes = vec![SMOOTHING_GRID.to_vec(); self.len()];
        if let Some(i) = self.phi {
            axes[i] = PHI_GRID.to_vec();
        }
        axes
    }
}

fn initial_state_count(config: &ModelConfig, period: usize) -> usize {
    let mut k = 1;
    if config.has_trend() {
        k += 1;
    }
    if config.is_seasonal() {
        k += period;
    }
    k
}

/// Heuristic initial states from the first one or two cycles.
///
/// The level is placed one step before the first observation so that the
/// first one-step prediction lines up with `y_0`.
fn initial_state(config: &ModelConfig, period: usize, values: &[f64]) -> Result<State, ModelError> {
    if !config.is_seasonal() {
        let trend = if config.has_trend() { values[1] - values[0] } else { 0.0 };
        return Ok(State {
            level: values[0] - trend,
            trend,
            seasonal: vec![0.0],
        });
    }

    let first = mean(&values[..period]);
    let trend = if config.has_trend() && values.len() >= 2 * period {
        (mean(&values[period..2 * period]) - first) / period as f64
    } else {
        0.0
    };
    let level = first - trend * (period as f64 + 1.0) / 2.0;

    let mut seasonal = Vec::with_capacity(period);
    for (i, y) in values[..period].iter().enumerate() {
        let local = level + trend * (i as f64 + 1.0);
        let s = match config.seasonal {
            SeasonalMode::Multiplicative => {
                if local <= 0.0 {
                    return Err(ModelError::NonFinite(
                        "non-positive initial level for multiplicative seasonality".to_string(),
                    ));
                }
                y / local
            }
            _ => y - local,
        };
        seasonal.push(s);
    }

    Ok(State { level, trend, seasonal })
}

/// A model fitted on an observed series.
#[derive(Debug, Clone)]
pub struct FittedModel {
    recursion: Recursion,
    observed: Vec<f64>,
    fitted: Vec<f64>,
    final_state: State,
    sse: f64,
    num_params: usize,
}

impl FittedModel {
    pub fn config(&self) -> ModelConfig {
        self.recursion.config
    }

    pub fn params(&self) -> SmoothingParams {
        self.recursion.params
    }

    /// In-sample one-step-ahead predictions, aligned with the observations.
    pub fn fitted_values(&self) -> &[f64] {
        &self.fitted
    }

    /// `observed - fitted`.
    pub fn residuals(&self) -> Vec<f64> {
        self.observed
            .iter()
            .zip(&self.fitted)
            .map(|(y, f)| y - f)
            .collect()
    }

    pub fn sse(&self) -> f64 {
        self.sse
    }

    pub fn nobs(&self) -> usize {
        self.observed.len()
    }

    /// Estimated smoothing parameters plus initial states.
    pub fn num_params(&self) -> usize {
        self.num_params
    }

    /// Residual standard deviation, degrees-of-freedom corrected.
    pub fn sigma(&self) -> f64 {
        let dof = self.nobs().saturating_sub(self.num_params).max(1);
        (self.sse / dof as f64).sqrt()
    }

    pub fn aic(&self) -> f64 {
        let n = self.nobs() as f64;
        n * self.log_mse() + 2.0 * self.num_params as f64
    }

    pub fn bic(&self) -> f64 {
        let n = self.nobs() as f64;
        n * self.log_mse() + n.ln() * self.num_params as f64
    }

    fn log_mse(&self) -> f64 {
        let n = self.nobs().max(1) as f64;
        (self.sse / n).max(f64::MIN_POSITIVE).ln()
    }

    /// Point forecasts for the next `steps` periods.
    pub fn forecast(&self, steps: usize) -> Vec<f64> {
        let mut state = self.final_state.clone();
        let start = self.nobs();
        (0..steps)
            .map(|h| {
                let t = start + h;
                let yhat = self.recursion.predict(&state, t);
                self.recursion.update(&mut state, t, yhat);
                yhat
            })
            .collect()
    }

    /// Simulate `repetitions` future paths of length `steps` with additive
    /// Gaussian innovations (σ = [`sigma`](Self::sigma)).
    ///
    /// The result is indexed `[step][repetition]`.
    pub fn simulate<R>(
        &self,
        steps: usize,
        repetitions: usize,
        rng: &mut R,
    ) -> Result<Vec<Vec<f64>>, ModelError>
    where
        R: Rng + ?Sized,
    {
        let sigma = self.sigma();
        let noise = Normal::new(0.0, sigma)
            .map_err(|e| ModelError::Simulation(format!("invalid innovation scale {sigma}: {e}")))?;

        let start = self.nobs();
        let mut paths = vec![Vec::with_capacity(repetitions); steps];
        for _ in 0..repetitions {
            let mut state = self.final_state.clone();
            for (h, step) in paths.iter_mut().enumerate() {
                let t = start + h;
                let y = self.recursion.predict(&state, t) + noise.sample(rng);
                if !y.is_finite() {
                    return Err(ModelError::Simulation(format!(
                        "simulated path diverged at step {}",
                        h + 1
                    )));
                }
                self.recursion.update(&mut state, t, y);
                step.push(y);
            }
        }
        Ok(paths)
    }
}
