//! Daily revenue series: one amount per calendar day, no gaps.
//!
//! Days without sales are explicit `0.0` entries rather than missing points,
//! so consumers can index the series by day offset.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;

/// Revenue recorded on a single calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub amount: f64,
}

/// Ordered, contiguous daily revenue series.
///
/// Invariant: dates are strictly increasing and each date is the day after the
/// previous one. Every constructor (including deserialization) enforces it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DailyRevenue>", into = "Vec<DailyRevenue>")]
pub struct DailyRevenueSeries {
    points: Vec<DailyRevenue>,
}

impl ValueObject for DailyRevenueSeries {}

impl DailyRevenueSeries {
    /// Build a series starting at `start` with one value per consecutive day.
    pub fn from_values(start: NaiveDate, values: Vec<f64>) -> DomainResult<Self> {
        let mut points = Vec::with_capacity(values.len());
        for (offset, amount) in values.into_iter().enumerate() {
            let date = start
                .checked_add_days(Days::new(offset as u64))
                .ok_or_else(|| DomainError::validation("series extends past the supported calendar"))?;
            points.push(DailyRevenue { date, amount });
        }
        Ok(Self { points })
    }

    /// Build a series from explicit points, rejecting gaps and unordered dates.
    pub fn try_from_points(points: Vec<DailyRevenue>) -> DomainResult<Self> {
        for pair in points.windows(2) {
            let expected = pair[0].date.succ_opt();
            if expected != Some(pair[1].date) {
                return Err(DomainError::invariant(format!(
                    "daily series must be contiguous: {} is followed by {}",
                    pair[0].date, pair[1].date
                )));
            }
        }
        Ok(Self { points })
    }

    /// Same dates, new amounts. Lengths must match.
    pub fn with_values(&self, values: Vec<f64>) -> DomainResult<Self> {
        if values.len() != self.points.len() {
            return Err(DomainError::validation(format!(
                "expected {} values, got {}",
                self.points.len(),
                values.len()
            )));
        }
        let points = self
            .points
            .iter()
            .zip(values)
            .map(|(p, amount)| DailyRevenue { date: p.date, amount })
            .collect();
        Ok(Self { points })
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[DailyRevenue] {
        &self.points
    }

    pub fn iter(&self) -> impl Iterator<Item = &DailyRevenue> {
        self.points.iter()
    }

    /// Amounts in date order.
    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.amount).collect()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    pub fn total(&self) -> f64 {
        self.points.iter().map(|p| p.amount).sum()
    }
}

impl TryFrom<Vec<DailyRevenue>> for DailyRevenueSeries {
    type Error = DomainError;

    fn try_from(points: Vec<DailyRevenue>) -> Result<Self, Self::Error> {
        Self::try_from_points(points)
    }
}

impl From<DailyRevenueSeries> for Vec<DailyRevenue> {
    fn from(series: DailyRevenueSeries) -> Self {
        series.points
    }
}
