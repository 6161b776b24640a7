//! Automatic model selection by holdout cross-validation.
//!
//! Policy: selection never fails. Series too short for seasonality get the
//! trend-only fallback, candidates whose fit fails are skipped, and if every
//! candidate fails the first one is returned with an infinite CV error. The
//! forecaster's own full-series fit decides whether modelling is possible.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::holt_winters::{HoltWinters, ModelConfig, SeasonalMode, TrendMode};
use crate::stats::mape;

/// Trailing observations held out for out-of-sample scoring.
pub const HOLDOUT_DAYS: usize = 7;

/// Holdout MAPE differences below this (in percentage points) are ties; the
/// earlier candidate wins.
const MAPE_TIE_TOLERANCE: f64 = 1e-9;

/// Outcome of model selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Selection {
    /// Candidates were scored; `aic` comes from the winner's training fit.
    Evaluated {
        config: ModelConfig,
        aic: f64,
        cv_mape: f64,
    },
    /// Not enough data for seasonality: fall back to trend-only smoothing.
    InsufficientData,
}

impl Selection {
    pub fn is_fallback(&self) -> bool {
        matches!(self, Selection::InsufficientData)
    }

    /// The configuration to fit on the full series.
    pub fn config(&self) -> ModelConfig {
        match self {
            Selection::Evaluated { config, .. } => *config,
            Selection::InsufficientData => ModelConfig::trend_only(),
        }
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            Selection::Evaluated { .. } => None,
            Selection::InsufficientData => Some("insufficient_data"),
        }
    }
}

/// Candidate configurations in evaluation order.
///
/// Multiplicative seasonality is only offered when the series contains no
/// zeros and no value below 1.0.
pub fn candidate_configs(values: &[f64], seasonal_periods: usize) -> Vec<ModelConfig> {
    let m = seasonal_periods;
    let mut candidates = vec![
        ModelConfig::seasonal(TrendMode::Additive, SeasonalMode::Additive, m, false),
        ModelConfig::seasonal(TrendMode::Additive, SeasonalMode::Additive, m, true),
        ModelConfig::seasonal(TrendMode::None, SeasonalMode::Additive, m, false),
    ];

    let has_zeros = values.iter().any(|v| *v == 0.0);
    let has_low_values = values.iter().any(|v| *v < 1.0);
    if !has_zeros && !has_low_values {
        candidates.push(ModelConfig::seasonal(TrendMode::Additive, SeasonalMode::Multiplicative, m, false));
        candidates.push(ModelConfig::seasonal(TrendMode::Additive, SeasonalMode::Multiplicative, m, true));
    }
    candidates
}

/// Pick the candidate with the lowest holdout MAPE.
pub fn select_best_model(values: &[f64], seasonal_periods: usize) -> Selection {
    let min_points = seasonal_periods * 2;
    if values.len() < min_points {
        debug!(
            observations = values.len(),
            required = min_points,
            "not enough data for seasonal models; using trend-only fallback"
        );
        return Selection::InsufficientData;
    }

    let candidates = candidate_configs(values, seasonal_periods);
    let split = values.len().saturating_sub(HOLDOUT_DAYS);
    let (train, test) = values.split_at(split);

    let mut best_config = candidates[0];
    let mut best_mape = f64::INFINITY;
    let mut best_aic = f64::INFINITY;

    for config in candidates {
        let fitted = match HoltWinters::new(config).fit(train) {
            Ok(f) => f,
            Err(e) => {
                debug!(candidate = %config.describe(), error = %e, "candidate fit failed; skipping");
                continue;
            }
        };

        let forecast = fitted.forecast(test.len());
        let cv_mape = mape(test, &forecast).unwrap_or(f64::INFINITY);
        debug!(candidate = %config.describe(), cv_mape, aic = fitted.aic(), "candidate scored");

        if cv_mape < best_mape - MAPE_TIE_TOLERANCE {
            best_mape = cv_mape;
            best_config = config;
            best_aic = fitted.aic();
        }
    }

    Selection::Evaluated {
        config: best_config,
        aic: best_aic,
        cv_mape: best_mape,
    }
}
