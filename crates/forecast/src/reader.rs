use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use revcast_core::TenantId;

/// Read-model boundary for aggregated revenue.
///
/// Implementations return, for the inclusive range `[start, end]`, the summed
/// amount of successful payments per calendar day. Days without payments may
/// be absent from the map. This crate stays storage-agnostic: callers
/// (infra/workers) provide the implementation.
pub trait RevenueReader: Send + Sync {
    fn daily_revenue(
        &self,
        tenant_id: TenantId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>, RevenueSourceError>;
}

impl<R> RevenueReader for Arc<R>
where
    R: RevenueReader + ?Sized,
{
    fn daily_revenue(
        &self,
        tenant_id: TenantId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>, RevenueSourceError> {
        (**self).daily_revenue(tenant_id, start, end)
    }
}

impl<R> RevenueReader for &R
where
    R: RevenueReader + ?Sized,
{
    fn daily_revenue(
        &self,
        tenant_id: TenantId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>, RevenueSourceError> {
        (**self).daily_revenue(tenant_id, start, end)
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RevenueSourceError {
    #[error("revenue source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid revenue query: {0}")]
    InvalidQuery(String),
}
