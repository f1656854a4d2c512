//! Domain layer for the food ordering system.
//!
//! This crate provides the order lifecycle engine:
//! - order placement with catalog price snapshots and atomic persistence
//! - forward-only status transitions, explicit or one step at a time
//! - the error taxonomy the API layer maps onto responses

pub mod error;
pub mod order;

pub use error::DomainError;
pub use order::{OrderError, OrderService, PricedLines, price_lines};
