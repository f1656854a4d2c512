use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::{CatalogItem, CatalogItemId, Order, OrderId, OrderStatus};

use crate::{CatalogQuery, Result};

/// Read-mostly storage for purchasable items.
///
/// All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Lists items matching the query, ordered by category then name.
    async fn list_items(&self, query: CatalogQuery) -> Result<Vec<CatalogItem>>;

    /// Retrieves a single item.
    ///
    /// Returns None if no item has this id.
    async fn get_item(&self, id: CatalogItemId) -> Result<Option<CatalogItem>>;

    /// Resolves many ids in one lookup.
    ///
    /// Unknown ids are skipped, so the result may be shorter than `ids`.
    /// Each item is returned at most once.
    async fn get_items_by_ids(&self, ids: &[CatalogItemId]) -> Result<Vec<CatalogItem>>;

    /// Inserts an item, or replaces the stored item with the same id.
    async fn save_item(&self, item: CatalogItem) -> Result<()>;

    /// Returns the number of items in the catalog.
    async fn count_items(&self) -> Result<usize>;
}

/// Storage for orders and their lines.
///
/// Orders are never deleted; the only mutation after creation is a status
/// change through [`OrderStore::update_status`].
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Persists an order together with all of its lines.
    ///
    /// The write is atomic: either the order and every line become visible,
    /// or nothing does. Hydrated `menu_item` fields on the lines are ignored.
    async fn insert_order(&self, order: &Order) -> Result<()>;

    /// Retrieves an order with its lines joined to their catalog items.
    ///
    /// Returns None if the order doesn't exist.
    async fn get_order(&self, id: OrderId) -> Result<Option<Order>>;

    /// Lists every order with hydrated lines, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>>;

    /// Moves an order from `expected` to `next`.
    ///
    /// The write only happens if the stored status still equals `expected`.
    /// Fails with `StatusConflict` when another writer got there first and
    /// with `OrderNotFound` when the order doesn't exist.
    async fn update_status(
        &self,
        id: OrderId,
        expected: OrderStatus,
        next: OrderStatus,
        updated_at: DateTime<Utc>,
    ) -> Result<()>;
}

/// A backend holding both the catalog and the orders.
pub trait Store: CatalogStore + OrderStore {}

// Blanket implementation for every backend implementing both halves
impl<T: CatalogStore + OrderStore + ?Sized> Store for T {}
