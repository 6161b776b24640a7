use std::sync::Arc;

use chrono::Utc;

use revcast_core::TenantId;
use revcast_forecast::{ForecastJob, ForecastResponse, JobScheduler, LocalScheduler};
use revcast_infra::{ForecastSettings, InMemoryPaymentLedger, SeedOptions, seed_historical_sales};

fn main() -> anyhow::Result<()> {
    revcast_observability::init();

    let settings = ForecastSettings::from_env();
    let tenant_id = TenantId::new();
    let today = Utc::now().date_naive();

    let ledger = Arc::new(InMemoryPaymentLedger::new());
    let seeded = seed_historical_sales(&ledger, tenant_id, &SeedOptions::new(today))?;
    tracing::info!(orders = seeded.orders, days = seeded.days, "demo ledger ready");

    let job = ForecastJob::new(ledger.clone(), tenant_id, settings.params)
        .with_config(settings.forecast)
        .with_today(today);
    let outcome = LocalScheduler::for_tenant(tenant_id).run(job)?;

    println!("{}", serde_json::to_string_pretty(&ForecastResponse::from(outcome))?);
    Ok(())
}
