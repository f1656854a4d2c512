use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CatalogItem, CatalogItemId, Order, OrderId, OrderStatus};
use tokio::sync::RwLock;

use crate::{
    CatalogQuery, Result, StoreError,
    store::{CatalogStore, OrderStore},
};

/// In-memory store implementation for testing and local runs.
///
/// Orders are kept without their hydrated catalog items and joined against
/// the live catalog on every read, the same way the PostgreSQL backend does.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    catalog: Arc<RwLock<HashMap<CatalogItemId, CatalogItem>>>,
    orders: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the total number of orders stored.
    pub async fn order_count(&self) -> usize {
        self.orders.read().await.len()
    }

    /// Returns the total number of order lines stored.
    pub async fn line_count(&self) -> usize {
        self.orders
            .read()
            .await
            .iter()
            .map(|order| order.lines.len())
            .sum()
    }

    fn hydrate(order: &Order, catalog: &HashMap<CatalogItemId, CatalogItem>) -> Order {
        let mut hydrated = order.clone();
        for line in &mut hydrated.lines {
            line.menu_item = catalog.get(&line.menu_item_id).cloned();
        }
        hydrated
    }
}

fn sort_items(items: &mut [CatalogItem]) {
    items.sort_by(|a, b| {
        a.category
            .cmp(&b.category)
            .then_with(|| a.name.cmp(&b.name))
    });
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_items(&self, query: CatalogQuery) -> Result<Vec<CatalogItem>> {
        let catalog = self.catalog.read().await;
        let mut items: Vec<_> = catalog
            .values()
            .filter(|item| query.matches(&item.category))
            .cloned()
            .collect();
        sort_items(&mut items);
        Ok(items)
    }

    async fn get_item(&self, id: CatalogItemId) -> Result<Option<CatalogItem>> {
        Ok(self.catalog.read().await.get(&id).cloned())
    }

    async fn get_items_by_ids(&self, ids: &[CatalogItemId]) -> Result<Vec<CatalogItem>> {
        let catalog = self.catalog.read().await;
        let mut seen = std::collections::HashSet::new();
        Ok(ids
            .iter()
            .filter(|id| seen.insert(**id))
            .filter_map(|id| catalog.get(id).cloned())
            .collect())
    }

    async fn save_item(&self, item: CatalogItem) -> Result<()> {
        self.catalog.write().await.insert(item.id, item);
        Ok(())
    }

    async fn count_items(&self) -> Result<usize> {
        Ok(self.catalog.read().await.len())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn insert_order(&self, order: &Order) -> Result<()> {
        let mut orders = self.orders.write().await;

        if orders.iter().any(|o| o.id == order.id) {
            return Err(StoreError::DuplicateOrder(order.id));
        }

        let mut stored = order.clone();
        for line in &mut stored.lines {
            line.menu_item = None;
        }
        orders.push(stored);
        Ok(())
    }

    async fn get_order(&self, id: OrderId) -> Result<Option<Order>> {
        let orders = self.orders.read().await;
        let catalog = self.catalog.read().await;
        Ok(orders
            .iter()
            .find(|o| o.id == id)
            .map(|o| Self::hydrate(o, &catalog)))
    }

    async fn list_orders(&self) -> Result<Vec<Order>> {
        let orders = self.orders.read().await;
        let catalog = self.catalog.read().await;
        let mut listed: Vec<_> = orders.iter().map(|o| Self::hydrate(o, &catalog)).collect();
        // Later inserts win ties on created_at.
        listed.reverse();
        listed.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(listed)
    }

    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut orders = self.orders.write().await;
        let order = orders
            .iter_mut()
            .find(|o| o.id == id)
            .ok_or(StoreError::OrderNotFound(id))?;

        if order.status != expected {
            return Err(StoreError::StatusConflict {
                order_id: id,
                expected,
                actual: order.status,
            });
        }

        order.status = next;
        order.updated_at = updated_at;
        Ok(())
    }
}
