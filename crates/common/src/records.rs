//! Catalog and order records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{CatalogItemId, Money, OrderId, OrderLineId, OrderStatus};

/// A purchasable menu entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: CatalogItemId,
    pub name: String,
    pub description: String,
    pub price: Money,
    pub image_url: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Creates a new item stamped with the current time.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        price: Money,
        image_url: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: CatalogItemId::new(),
            name: name.into(),
            description: description.into(),
            price,
            image_url: image_url.into(),
            category: category.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// One catalog item reference within an order.
///
/// `unit_price` is the catalog price at the moment the order was placed and
/// never follows later catalog edits. `menu_item` carries the item's
/// current details when the line is read back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub id: OrderLineId,
    pub quantity: u32,
    pub unit_price: Money,
    pub menu_item_id: CatalogItemId,
    #[serde(default)]
    pub menu_item: Option<CatalogItem>,
}

impl OrderLine {
    /// Returns `unit_price × quantity`.
    pub fn subtotal(&self) -> Money {
        self.unit_price.multiply(self.quantity)
    }
}

/// A customer's placed order with its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub status: OrderStatus,
    pub total_amount: Money,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "items")]
    pub lines: Vec<OrderLine>,
}

impl Order {
    /// Sum of every line's subtotal.
    pub fn lines_total(&self) -> Money {
        self.lines.iter().map(OrderLine::subtotal).sum()
    }

    /// Total number of units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }
}
