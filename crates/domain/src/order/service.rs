//! Order service: placement and status transitions.

use chrono::Utc;
use common::{Order, OrderId, OrderStatus, ValidatedOrder};
use store::{Store, StoreError};

use crate::error::DomainError;

use super::{OrderError, price_lines};

/// How many times a status change re-reads the order after losing a race
/// to a concurrent writer.
pub const MAX_STATUS_ATTEMPTS: usize = 3;

/// Service for managing orders.
///
/// Every operation is request-scoped: the service holds no state beyond the
/// store handle, and concurrent status changes serialize through the
/// store's conditional update.
pub struct OrderService<S: Store> {
    store: S,
}

impl<S: Store> OrderService<S> {
    /// Creates a new order service over the given store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Returns a reference to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Places a new order.
    ///
    /// Resolves every referenced catalog item in one lookup, snapshots each
    /// item's price into its line and persists the order with all lines as
    /// one unit in `ORDER_RECEIVED`. Nothing is written if any item is
    /// unknown.
    #[tracing::instrument(skip(self, cmd), fields(lines = cmd.lines.len()))]
    pub async fn place_order(&self, cmd: ValidatedOrder) -> Result<Order, DomainError> {
        let ids: Vec<_> = cmd.lines.iter().map(|line| line.menu_item_id).collect();
        let resolved = self.store.get_items_by_ids(&ids).await?;

        let priced = price_lines(&cmd.lines, resolved).inspect_err(|err| {
            tracing::info!(error = %err, "order rejected");
        })?;

        let now = Utc::now();
        let order = Order {
            id: OrderId::new(),
            customer_name: cmd.customer.name,
            customer_phone: cmd.customer.phone,
            customer_address: cmd.customer.address,
            status: OrderStatus::default(),
            total_amount: priced.total,
            created_at: now,
            updated_at: now,
            lines: priced.lines,
        };

        self.store.insert_order(&order).await?;

        metrics::counter!("orders_placed_total").increment(1);
        tracing::info!(order_id = %order.id, total = %order.total_amount, "order placed");
        Ok(order)
    }

    /// Loads an order by ID.
    ///
    /// Returns None if the order doesn't exist.
    #[tracing::instrument(skip(self))]
    pub async fn get_order(&self, order_id: OrderId) -> Result<Option<Order>, DomainError> {
        Ok(self.store.get_order(order_id).await?)
    }

    /// Lists every order, newest first.
    #[tracing::instrument(skip(self))]
    pub async fn list_orders(&self) -> Result<Vec<Order>, DomainError> {
        Ok(self.store.list_orders().await?)
    }

    /// Moves an order to `target`.
    ///
    /// Fails with `InvalidTransition` unless `target` lies strictly ahead of
    /// the order's current status.
    #[tracing::instrument(skip(self))]
    pub async fn update_status(
        &self,
        order_id: OrderId,
        target: OrderStatus,
    ) -> Result<Order, DomainError> {
        self.transition(order_id, |current| {
            if current.can_transition_to(target) {
                Ok(Some(target))
            } else {
                Err(OrderError::InvalidTransition {
                    from: current,
                    to: target,
                })
            }
        })
        .await
    }

    /// Moves an order exactly one step forward.
    ///
    /// At the terminal status this returns the order unchanged.
    #[tracing::instrument(skip(self))]
    pub async fn advance(&self, order_id: OrderId) -> Result<Order, DomainError> {
        self.transition(order_id, |current| Ok(current.next())).await
    }

    /// Shared read-validate-write loop for both transition entry points.
    ///
    /// `choose` maps the current status to the status to write, `None` for
    /// no change, or a rejection. A lost race re-reads the order and asks
    /// `choose` again against the fresh status.
    async fn transition<F>(&self, order_id: OrderId, choose: F) -> Result<Order, DomainError>
    where
        F: Fn(OrderStatus) -> Result<Option<OrderStatus>, OrderError>,
    {
        for attempt in 1..=MAX_STATUS_ATTEMPTS {
            let mut order = self
                .store
                .get_order(order_id)
                .await?
                .ok_or(OrderError::NotFound(order_id))?;

            let next = match choose(order.status) {
                Ok(Some(next)) => next,
                Ok(None) => return Ok(order),
                Err(err) => {
                    metrics::counter!("order_transitions_rejected_total").increment(1);
                    tracing::info!(error = %err, "transition rejected");
                    return Err(err.into());
                }
            };

            let now = Utc::now();
            match self
                .store
                .update_status(order_id, order.status, next, now)
                .await
            {
                Ok(()) => {
                    metrics::counter!("order_status_transitions_total", "to" => next.as_str())
                        .increment(1);
                    tracing::info!(from = %order.status, to = %next, "order status updated");
                    order.status = next;
                    order.updated_at = now;
                    return Ok(order);
                }
                Err(StoreError::StatusConflict { actual, .. }) => {
                    metrics::counter!("order_status_conflicts_total").increment(1);
                    tracing::warn!(attempt, expected = %order.status, %actual, "status changed underneath, retrying");
                }
                Err(StoreError::OrderNotFound(_)) => {
                    return Err(OrderError::NotFound(order_id).into());
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(OrderError::ConcurrentUpdate { order_id }.into())
    }
}
