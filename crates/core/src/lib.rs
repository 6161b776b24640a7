//! `revcast-core`: domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! identifiers, the domain error model, and the daily revenue series every
//! forecasting stage consumes.

pub mod error;
pub mod id;
pub mod series;
pub mod value_object;

pub use error::{DomainError, DomainResult};
pub use id::{PaymentId, TenantId};
pub use series::{DailyRevenue, DailyRevenueSeries};
pub use value_object::ValueObject;
