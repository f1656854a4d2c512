//! Order placement and status lifecycle.

mod pricing;
mod service;

pub use pricing::{PricedLines, price_lines};
pub use service::{MAX_STATUS_ATTEMPTS, OrderService};

use common::{CatalogItemId, OrderId, OrderStatus};
use thiserror::Error;

/// Business-rule violations raised by the order lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    /// No order has this id.
    #[error("Order not found: {0}")]
    NotFound(OrderId),

    /// Some requested catalog items do not exist.
    #[error("One or more menu items not found")]
    MissingCatalogItems { missing: Vec<CatalogItemId> },

    /// The requested status does not lie strictly ahead of the current one.
    #[error("Cannot transition from {from} to {to}. Status can only move forward.")]
    InvalidTransition { from: OrderStatus, to: OrderStatus },

    /// Other writers kept moving the order while this update retried.
    #[error("Order {order_id} was updated concurrently, please retry")]
    ConcurrentUpdate { order_id: OrderId },
}
