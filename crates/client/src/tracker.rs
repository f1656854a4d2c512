//! Order status tracking by polling.

use std::sync::Arc;
use std::time::Duration;

use common::{Order, OrderId, OrderStatus};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::api::OrderSource;

#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Time between order fetches.
    pub poll_interval: Duration,
    /// Delay before asking the server to advance the order, per observed
    /// status. `None` turns demo auto-advance off.
    pub auto_advance: Option<Duration>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(3),
            auto_advance: Some(Duration::from_secs(10)),
        }
    }
}

impl TrackerConfig {
    pub fn polling_only(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            auto_advance: None,
        }
    }
}

/// Latest view of the tracked order.
#[derive(Debug, Clone, Default)]
pub struct TrackerState {
    pub order: Option<Order>,
    /// The server reported the order does not exist.
    pub not_found: bool,
    /// Last fetch or advance failure; cleared by the next success.
    pub last_error: Option<String>,
}

impl TrackerState {
    pub fn status(&self) -> Option<OrderStatus> {
        self.order.as_ref().map(|order| order.status)
    }
}

/// Follows one order in the background.
///
/// Dropping the tracker stops polling and cancels any pending
/// auto-advance.
pub struct OrderTracker {
    order_id: OrderId,
    state: watch::Receiver<TrackerState>,
    tasks: Vec<JoinHandle<()>>,
}

impl OrderTracker {
    /// Starts tracking `order_id`. Must be called inside a tokio runtime.
    pub fn spawn<S: OrderSource>(source: Arc<S>, order_id: OrderId, config: TrackerConfig) -> Self {
        let (publisher, state) = watch::channel(TrackerState::default());
        let publisher = Arc::new(publisher);

        let mut tasks = vec![tokio::spawn(poll(
            source.clone(),
            order_id,
            config.poll_interval,
            publisher.clone(),
        ))];
        if let Some(delay) = config.auto_advance {
            tasks.push(tokio::spawn(auto_advance(
                source,
                order_id,
                delay,
                publisher.subscribe(),
                publisher,
            )));
        }

        Self {
            order_id,
            state,
            tasks,
        }
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    pub fn current(&self) -> TrackerState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerState> {
        self.state.clone()
    }
}

impl Drop for OrderTracker {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

fn publish_order(publisher: &watch::Sender<TrackerState>, order: Order) {
    publisher.send_modify(|state| {
        state.order = Some(order);
        state.not_found = false;
        state.last_error = None;
    });
}

async fn poll<S: OrderSource>(
    source: Arc<S>,
    order_id: OrderId,
    every: Duration,
    publisher: Arc<watch::Sender<TrackerState>>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        match source.fetch_order(order_id).await {
            Ok(Some(order)) => publish_order(&publisher, order),
            Ok(None) => publisher.send_modify(|state| {
                state.order = None;
                state.not_found = true;
                state.last_error = None;
            }),
            Err(err) => {
                tracing::warn!(%order_id, error = %err, "order poll failed");
                publisher.send_modify(|state| state.last_error = Some(err.to_string()));
            }
        }
    }
}

/// Fires one advance per observed status, `delay` after the status was
/// first seen. A status change before the timer fires restarts it.
async fn auto_advance<S: OrderSource>(
    source: Arc<S>,
    order_id: OrderId,
    delay: Duration,
    mut updates: watch::Receiver<TrackerState>,
    publisher: Arc<watch::Sender<TrackerState>>,
) {
    let mut fired_for: Option<OrderStatus> = None;

    loop {
        let observed = updates.borrow_and_update().status();
        if observed == Some(OrderStatus::Delivered) {
            return;
        }

        if let Some(status) = observed.filter(|s| fired_for != Some(*s)) {
            let deadline = Instant::now() + delay;
            loop {
                tokio::select! {
                    () = tokio::time::sleep_until(deadline) => {
                        fired_for = Some(status);
                        match source.advance_order(order_id).await {
                            Ok(order) => {
                                tracing::info!(%order_id, status = %order.status, "order auto-advanced");
                                publish_order(&publisher, order);
                            }
                            Err(err) => {
                                tracing::warn!(%order_id, error = %err, "auto-advance failed");
                                publisher.send_modify(|state| state.last_error = Some(err.to_string()));
                            }
                        }
                        break;
                    }
                    changed = updates.changed() => {
                        if changed.is_err() {
                            return;
                        }
                        if updates.borrow_and_update().status() != Some(status) {
                            break;
                        }
                    }
                }
            }
            continue;
        }

        if updates.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::Utc;
    use common::Money;

    use super::*;
    use crate::error::ClientError;

    struct FakeSource {
        order: Mutex<Order>,
        fetches: AtomicUsize,
        advances: AtomicUsize,
    }

    impl FakeSource {
        fn new() -> Arc<Self> {
            let now = Utc::now();
            Arc::new(Self {
                order: Mutex::new(Order {
                    id: OrderId::new(),
                    customer_name: "John Doe".to_string(),
                    customer_phone: "1234567890".to_string(),
                    customer_address: "123 Main Street, City".to_string(),
                    status: OrderStatus::OrderReceived,
                    total_amount: Money::from_cents(1299),
                    created_at: now,
                    updated_at: now,
                    lines: Vec::new(),
                }),
                fetches: AtomicUsize::new(0),
                advances: AtomicUsize::new(0),
            })
        }

        fn id(&self) -> OrderId {
            self.order.lock().unwrap().id
        }

        fn set_status(&self, status: OrderStatus) {
            self.order.lock().unwrap().status = status;
        }

        fn fetches(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }

        fn advances(&self) -> usize {
            self.advances.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl OrderSource for FakeSource {
        async fn fetch_order(&self, _id: OrderId) -> Result<Option<Order>, ClientError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            Ok(Some(self.order.lock().unwrap().clone()))
        }

        async fn advance_order(&self, _id: OrderId) -> Result<Order, ClientError> {
            self.advances.fetch_add(1, Ordering::SeqCst);
            let mut order = self.order.lock().unwrap();
            if let Some(next) = order.status.next() {
                order.status = next;
            }
            Ok(order.clone())
        }
    }

    async fn sleep_secs(secs: f64) {
        tokio::time::sleep(Duration::from_secs_f64(secs)).await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_polls_on_interval() {
        let source = FakeSource::new();
        let tracker = OrderTracker::spawn(
            source.clone(),
            source.id(),
            TrackerConfig::polling_only(Duration::from_secs(3)),
        );

        let mut updates = tracker.subscribe();
        updates.changed().await.unwrap();
        assert_eq!(tracker.current().status(), Some(OrderStatus::OrderReceived));

        sleep_secs(6.5).await;
        assert_eq!(source.fetches(), 3);

        source.set_status(OrderStatus::Preparing);
        sleep_secs(3.0).await;
        assert_eq!(tracker.current().status(), Some(OrderStatus::Preparing));
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_stops_polling() {
        let source = FakeSource::new();
        let tracker = OrderTracker::spawn(source.clone(), source.id(), TrackerConfig::default());
        sleep_secs(1.0).await;
        let seen = source.fetches();

        drop(tracker);
        sleep_secs(60.0).await;

        assert_eq!(source.fetches(), seen);
        assert_eq!(source.advances(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_auto_advance_once_per_status_until_delivered() {
        let source = FakeSource::new();
        let tracker = OrderTracker::spawn(source.clone(), source.id(), TrackerConfig::default());

        sleep_secs(9.5).await;
        assert_eq!(source.advances(), 0);

        sleep_secs(1.0).await;
        assert_eq!(source.advances(), 1);
        assert_eq!(tracker.current().status(), Some(OrderStatus::Preparing));

        sleep_secs(60.0).await;
        assert_eq!(source.advances(), 3);
        assert_eq!(tracker.current().status(), Some(OrderStatus::Delivered));
    }

    #[tokio::test(start_paused = true)]
    async fn test_status_change_restarts_timer() {
        let source = FakeSource::new();
        let _tracker = OrderTracker::spawn(source.clone(), source.id(), TrackerConfig::default());

        sleep_secs(5.0).await;
        // Someone else moves the order; the 6 s poll observes it.
        source.set_status(OrderStatus::Preparing);

        sleep_secs(7.0).await;
        assert_eq!(source.advances(), 0);

        sleep_secs(5.0).await;
        assert_eq!(source.advances(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivered_order_is_never_advanced() {
        let source = FakeSource::new();
        source.set_status(OrderStatus::Delivered);
        let _tracker = OrderTracker::spawn(source.clone(), source.id(), TrackerConfig::default());

        sleep_secs(60.0).await;
        assert_eq!(source.advances(), 0);
        assert!(source.fetches() > 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_polling_only_never_advances() {
        let source = FakeSource::new();
        let _tracker = OrderTracker::spawn(
            source.clone(),
            source.id(),
            TrackerConfig::polling_only(Duration::from_secs(3)),
        );

        sleep_secs(60.0).await;
        assert_eq!(source.advances(), 0);
    }
}
