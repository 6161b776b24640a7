//! Synthetic historical sales for demos, benches and tests.
//!
//! Each day gets a number of orders (Friday to Sunday busier, a linear 30%
//! growth over the window, ±5 jitter, at least 10), each order a lunch or
//! dinner timestamp and a basket priced from a small menu. Every order is
//! paid in full.

use chrono::{Datelike, Days, NaiveDate, Weekday};
use rand::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use revcast_core::TenantId;

use crate::payments::{InMemoryPaymentLedger, LedgerError, PaymentRecord, PaymentStatus};

/// Main-course prices in minor units.
const MAIN_PRICES: [u64; 5] = [899, 1_099, 1_299, 1_499, 1_799];
/// Side and beverage prices in minor units.
const EXTRA_PRICES: [u64; 6] = [199, 249, 299, 399, 499, 599];
/// Main-course quantity 1, 2 or 3.
const QUANTITY_WEIGHTS: [f64; 3] = [0.7, 0.25, 0.05];
/// Basket size 1 to 4 items.
const ITEM_WEIGHTS: [f64; 4] = [0.3, 0.4, 0.2, 0.1];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedOptions {
    /// Number of days to generate, ending at `end_date` inclusive.
    pub days: u32,
    pub end_date: NaiveDate,
    pub seed: u64,
}

impl SeedOptions {
    pub fn new(end_date: NaiveDate) -> Self {
        Self {
            days: 90,
            end_date,
            seed: 7,
        }
    }

    pub fn with_days(mut self, days: u32) -> Self {
        self.days = days;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedSummary {
    pub days: u32,
    pub orders: u64,
    /// Total revenue in minor units.
    pub revenue: u64,
}

/// Generate and record settled payments for `tenant_id`.
pub fn seed_historical_sales(
    ledger: &InMemoryPaymentLedger,
    tenant_id: TenantId,
    options: &SeedOptions,
) -> Result<SeedSummary, LedgerError> {
    let mut rng = StdRng::seed_from_u64(options.seed);

    let days = options.days;
    let mut payments = Vec::new();
    let mut summary = SeedSummary {
        days: 0,
        orders: 0,
        revenue: 0,
    };

    for offset in 0..days {
        let Some(date) = options
            .end_date
            .checked_sub_days(Days::new(u64::from(days - 1 - offset)))
        else {
            continue;
        };

        let base_orders: i64 = match date.weekday() {
            Weekday::Fri | Weekday::Sat | Weekday::Sun => rng.gen_range(25..=40),
            _ => rng.gen_range(15..=25),
        };
        let trend = 1.0 + f64::from(offset) / f64::from(days) * 0.3;
        let orders = ((base_orders as f64 * trend) as i64 + rng.gen_range(-5..=5)).max(10);

        for _ in 0..orders {
            let hour = if rng.gen_bool(0.4) {
                rng.gen_range(11..=14)
            } else {
                rng.gen_range(17..=21)
            };
            let Some(created_at) = date.and_hms_opt(hour, rng.gen_range(0..60), rng.gen_range(0..60)) else {
                continue;
            };

            let main = MAIN_PRICES.choose(&mut rng).copied().unwrap_or(MAIN_PRICES[0]);
            let mut amount = main * (pick_weighted(&mut rng, &QUANTITY_WEIGHTS) as u64 + 1);
            let items = pick_weighted(&mut rng, &ITEM_WEIGHTS) + 1;
            for _ in 1..items {
                amount += EXTRA_PRICES.choose(&mut rng).copied().unwrap_or(EXTRA_PRICES[0]);
            }

            payments.push(PaymentRecord::new(amount, PaymentStatus::Success, created_at.and_utc()));
            summary.orders += 1;
            summary.revenue += amount;
        }
        summary.days += 1;
    }

    ledger.record_many(tenant_id, payments)?;
    info!(
        tenant = %tenant_id,
        days = summary.days,
        orders = summary.orders,
        revenue = summary.revenue,
        "seeded historical sales"
    );
    Ok(summary)
}

/// Index drawn with probability proportional to `weights` (which sum to 1).
fn pick_weighted<R: Rng + ?Sized>(rng: &mut R, weights: &[f64]) -> usize {
    let mut draw: f64 = rng.r#gen();
    for (i, w) in weights.iter().enumerate() {
        if draw < *w {
            return i;
        }
        draw -= w;
    }
    weights.len().saturating_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use revcast_forecast::RevenueReader;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn seeding_covers_every_day_and_is_reproducible() {
        let end = day(2024, 3, 31);
        let options = SeedOptions::new(end).with_days(28).with_seed(11);

        let ledger = InMemoryPaymentLedger::new();
        let tenant = TenantId::new();
        let summary = seed_historical_sales(&ledger, tenant, &options).unwrap();
        assert_eq!(summary.days, 28);
        assert!(summary.orders >= 28 * 10);

        let revenue = ledger.daily_revenue(tenant, day(2024, 3, 4), end).unwrap();
        assert_eq!(revenue.len(), 28);
        let total: f64 = revenue.values().sum();
        assert!((total * 100.0 - summary.revenue as f64).abs() < 1e-3);

        let again = InMemoryPaymentLedger::new();
        assert_eq!(seed_historical_sales(&again, tenant, &options).unwrap(), summary);
    }

    #[test]
    fn weekends_outsell_weekdays_on_average() {
        let end = day(2024, 3, 31);
        let ledger = InMemoryPaymentLedger::new();
        let tenant = TenantId::new();
        seed_historical_sales(&ledger, tenant, &SeedOptions::new(end)).unwrap();

        let revenue = ledger.daily_revenue(tenant, day(2024, 1, 1), end).unwrap();
        let (mut busy, mut quiet) = (Vec::new(), Vec::new());
        for (date, amount) in revenue {
            match date.weekday() {
                Weekday::Fri | Weekday::Sat | Weekday::Sun => busy.push(amount),
                _ => quiet.push(amount),
            }
        }
        let avg = |xs: &[f64]| xs.iter().sum::<f64>() / xs.len() as f64;
        assert!(avg(&busy) > avg(&quiet) * 1.2);
    }
}
