//! In-memory payment ledger backing the revenue read model.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use revcast_core::{PaymentId, TenantId};
use revcast_forecast::{RevenueReader, RevenueSourceError};

/// Minor currency units per major unit (cents per dollar).
pub const MINOR_UNITS_PER_MAJOR: f64 = 100.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Pending,
    Success,
    Failed,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub payment_id: PaymentId,
    /// Amount in minor currency units.
    pub amount: u64,
    pub status: PaymentStatus,
    pub created_at: DateTime<Utc>,
}

impl PaymentRecord {
    pub fn new(amount: u64, status: PaymentStatus, created_at: DateTime<Utc>) -> Self {
        Self {
            payment_id: PaymentId::new(),
            amount,
            status,
            created_at,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.status == PaymentStatus::Success
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("payment ledger lock poisoned")]
    Poisoned,
}

/// Tenant-isolated payment storage for tests/dev.
#[derive(Debug, Default)]
pub struct InMemoryPaymentLedger {
    inner: RwLock<HashMap<TenantId, Vec<PaymentRecord>>>,
}

impl InMemoryPaymentLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, tenant_id: TenantId, payment: PaymentRecord) -> Result<(), LedgerError> {
        self.record_many(tenant_id, std::iter::once(payment))
    }

    pub fn record_many<I>(&self, tenant_id: TenantId, payments: I) -> Result<(), LedgerError>
    where
        I: IntoIterator<Item = PaymentRecord>,
    {
        let mut map = self.inner.write().map_err(|_| LedgerError::Poisoned)?;
        map.entry(tenant_id).or_default().extend(payments);
        Ok(())
    }

    /// All payments of a tenant, in insertion order.
    pub fn payments(&self, tenant_id: TenantId) -> Result<Vec<PaymentRecord>, LedgerError> {
        let map = self.inner.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(map.get(&tenant_id).cloned().unwrap_or_default())
    }

    pub fn clear_tenant(&self, tenant_id: TenantId) -> Result<(), LedgerError> {
        let mut map = self.inner.write().map_err(|_| LedgerError::Poisoned)?;
        map.remove(&tenant_id);
        Ok(())
    }
}

impl RevenueReader for InMemoryPaymentLedger {
    /// Settled revenue per UTC calendar day in `[start, end]`, in major units.
    fn daily_revenue(
        &self,
        tenant_id: TenantId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<BTreeMap<NaiveDate, f64>, RevenueSourceError> {
        if start > end {
            return Err(RevenueSourceError::InvalidQuery(format!(
                "range start {start} is after end {end}"
            )));
        }
        let map = self
            .inner
            .read()
            .map_err(|_| RevenueSourceError::Unavailable(LedgerError::Poisoned.to_string()))?;

        let mut minor: BTreeMap<NaiveDate, u64> = BTreeMap::new();
        for payment in map.get(&tenant_id).into_iter().flatten() {
            let date = payment.created_at.date_naive();
            if payment.is_settled() && date >= start && date <= end {
                *minor.entry(date).or_default() += payment.amount;
            }
        }
        debug!(tenant = %tenant_id, days = minor.len(), "aggregated settled payments");

        Ok(minor
            .into_iter()
            .map(|(date, amount)| (date, amount as f64 / MINOR_UNITS_PER_MAJOR))
            .collect())
    }
}
