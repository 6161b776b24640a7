//! Daily revenue preparation: query, gap-fill, clean.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use revcast_core::{DailyRevenue, DailyRevenueSeries, TenantId};

use crate::clean::clean_sales_data;
use crate::config::ForecastConfig;
use crate::reader::RevenueReader;

/// Default lookback window in days.
pub const DEFAULT_DAYS_BACK: usize = 60;

/// One entry per day in `[start, end]`; days absent from `aggregate` are `0.0`.
///
/// An inverted range yields an empty series.
pub fn build_daily_series(
    start: NaiveDate,
    end: NaiveDate,
    aggregate: &BTreeMap<NaiveDate, f64>,
) -> DailyRevenueSeries {
    let points: Vec<DailyRevenue> = start
        .iter_days()
        .take_while(|d| *d <= end)
        .map(|date| DailyRevenue {
            date,
            amount: aggregate.get(&date).copied().unwrap_or(0.0),
        })
        .collect();
    // `iter_days` yields consecutive dates, so the contiguity check cannot fail.
    DailyRevenueSeries::try_from_points(points).unwrap_or_default()
}

/// Lookback window `[today - days, today]`, clipped at the start of the calendar.
pub fn lookback_window(today: NaiveDate, days: usize) -> (NaiveDate, NaiveDate) {
    let start = today
        .checked_sub_days(Days::new(days as u64))
        .unwrap_or(NaiveDate::MIN);
    (start, today)
}

/// Gap-filled (uncleaned) revenue for the lookback window.
///
/// Reader failures are logged and treated as "no sales", which the
/// orchestrator later reports as missing data.
pub fn prepare_raw_series<R>(
    reader: &R,
    tenant_id: TenantId,
    today: NaiveDate,
    days: usize,
) -> DailyRevenueSeries
where
    R: RevenueReader + ?Sized,
{
    let (start, end) = lookback_window(today, days);
    let aggregate = match reader.daily_revenue(tenant_id, start, end) {
        Ok(a) => a,
        Err(e) => {
            warn!(tenant = %tenant_id, error = %e, "revenue query failed; treating window as empty");
            BTreeMap::new()
        }
    };
    debug!(
        tenant = %tenant_id,
        %start,
        %end,
        days_with_sales = aggregate.len(),
        "loaded daily revenue aggregate"
    );
    build_daily_series(start, end, &aggregate)
}

/// Gap-filled and cleaned revenue for the lookback window.
pub fn prepare_sales_data<R>(
    reader: &R,
    tenant_id: TenantId,
    today: NaiveDate,
    days: usize,
    config: &ForecastConfig,
) -> DailyRevenueSeries
where
    R: RevenueReader + ?Sized,
{
    let raw = prepare_raw_series(reader, tenant_id, today, days);
    // Cleaning preserves length, so re-dating cannot fail.
    clean_sales_data(&raw, config).unwrap_or(raw)
}
