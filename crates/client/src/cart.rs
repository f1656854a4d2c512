//! Cart value and its arithmetic.

use common::{
    CatalogItem, CatalogItemId, CustomerDetails, Money, OrderLineRequest, PlaceOrderRequest,
};
use serde::{Deserialize, Serialize};

use crate::error::CartError;

/// One catalog item in the cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    pub menu_item: CatalogItem,
    pub quantity: u32,
}

impl CartLine {
    pub fn subtotal(&self) -> Money {
        self.menu_item.price.multiply(self.quantity)
    }
}

/// The cart contents, persisted as a JSON array of lines.
///
/// Prices here are for display only. The server reprices every line at
/// checkout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn quantity_of(&self, id: CatalogItemId) -> u32 {
        self.lines
            .iter()
            .find(|line| line.menu_item.id == id)
            .map_or(0, |line| line.quantity)
    }

    /// Adds one of `item`, bumping the quantity if it is already present.
    pub fn add_item(&mut self, item: CatalogItem) {
        match self.lines.iter_mut().find(|line| line.menu_item.id == item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine {
                menu_item: item,
                quantity: 1,
            }),
        }
    }

    pub fn remove_item(&mut self, id: CatalogItemId) {
        self.lines.retain(|line| line.menu_item.id != id);
    }

    /// Sets the quantity of an existing line. Zero or less removes it.
    pub fn update_quantity(&mut self, id: CatalogItemId, quantity: i64) {
        if quantity <= 0 {
            self.remove_item(id);
            return;
        }
        let quantity = u32::try_from(quantity).unwrap_or(u32::MAX);
        if let Some(line) = self.lines.iter_mut().find(|line| line.menu_item.id == id) {
            line.quantity = quantity;
        }
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn total_amount(&self) -> Money {
        self.lines.iter().map(CartLine::subtotal).sum()
    }

    pub fn total_items(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Builds the order-creation request for this cart.
    ///
    /// The request is checked against the server's validation rules first so
    /// a form can show field errors without a round trip.
    pub fn checkout(&self, customer: &CustomerDetails) -> Result<PlaceOrderRequest, CartError> {
        if self.is_empty() {
            return Err(CartError::EmptyCart);
        }
        let request = PlaceOrderRequest {
            customer_name: Some(customer.name.clone()),
            customer_phone: Some(customer.phone.clone()),
            customer_address: Some(customer.address.clone()),
            items: Some(
                self.lines
                    .iter()
                    .map(|line| OrderLineRequest {
                        menu_item_id: Some(line.menu_item.id.to_string()),
                        quantity: Some(line.quantity.into()),
                    })
                    .collect(),
            ),
        };
        request.validate()?;
        Ok(request)
    }
}
