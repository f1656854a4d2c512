//! Shared cart state over a storage backend.

use std::sync::Arc;

use common::{CatalogItem, CatalogItemId};
use tokio::sync::watch;

use crate::cart::Cart;
use crate::error::CartError;
use crate::storage::CartStorage;

/// A handle to the persisted cart.
///
/// Every handle opened on the same backend, and every clone of a handle,
/// behaves like another open tab: they share the backend's change channel,
/// so a write through any of them reaches every subscriber. Mutations
/// re-read storage before applying the change and write the whole cart
/// back. Concurrent writers do not merge; the last write wins.
#[derive(Clone)]
pub struct CartStore {
    storage: Arc<dyn CartStorage>,
    changes: Arc<watch::Sender<Cart>>,
}

impl CartStore {
    /// Opens the cart held by `storage`.
    pub async fn open(storage: Arc<dyn CartStorage>) -> Result<Self, CartError> {
        let initial = read_cart(storage.as_ref()).await?;
        let changes = storage.changes();
        changes.send_if_modified(|current| {
            if *current == initial {
                return false;
            }
            *current = initial;
            true
        });
        Ok(Self { storage, changes })
    }

    /// The cart as of the last write to the backend.
    pub fn snapshot(&self) -> Cart {
        self.changes.borrow().clone()
    }

    /// Reads the cart straight from storage.
    pub async fn read(&self) -> Result<Cart, CartError> {
        read_cart(self.storage.as_ref()).await
    }

    /// Receives every cart written through any handle on this backend.
    pub fn subscribe(&self) -> watch::Receiver<Cart> {
        self.changes.subscribe()
    }

    pub async fn add_item(&self, item: CatalogItem) -> Result<Cart, CartError> {
        self.mutate(|cart| cart.add_item(item)).await
    }

    pub async fn remove_item(&self, id: CatalogItemId) -> Result<Cart, CartError> {
        self.mutate(|cart| cart.remove_item(id)).await
    }

    pub async fn update_quantity(
        &self,
        id: CatalogItemId,
        quantity: i64,
    ) -> Result<Cart, CartError> {
        self.mutate(|cart| cart.update_quantity(id, quantity)).await
    }

    pub async fn clear(&self) -> Result<Cart, CartError> {
        self.mutate(Cart::clear).await
    }

    async fn mutate(&self, apply: impl FnOnce(&mut Cart)) -> Result<Cart, CartError> {
        let mut cart = self.read().await?;
        apply(&mut cart);
        self.storage.save(&serde_json::to_string(&cart)?).await?;
        self.changes.send_replace(cart.clone());
        tracing::debug!(items = cart.total_items(), "cart saved");
        Ok(cart)
    }
}

async fn read_cart(storage: &dyn CartStorage) -> Result<Cart, CartError> {
    let Some(raw) = storage.load().await? else {
        return Ok(Cart::new());
    };
    match serde_json::from_str(&raw) {
        Ok(cart) => Ok(cart),
        Err(err) => {
            tracing::warn!(error = %err, "discarding unreadable stored cart");
            Ok(Cart::new())
        }
    }
}
