//! Infrastructure layer: revenue storage adapters, configuration, seeding.

pub mod config;
pub mod payments;
pub mod seed;

pub use config::{ForecastRequest, ForecastSettings};
pub use payments::{InMemoryPaymentLedger, LedgerError, PaymentRecord, PaymentStatus};
pub use seed::{SeedOptions, SeedSummary, seed_historical_sales};
