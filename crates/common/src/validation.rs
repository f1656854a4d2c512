//! Request validation shared by the API boundary and the client forms.
//!
//! The server applies these checks authoritatively; the client may run the
//! same checks before submitting to give early feedback.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CatalogItemId, OrderStatus};

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const PHONE_MIN: usize = 10;
pub const PHONE_MAX: usize = 15;
pub const ADDRESS_MIN: usize = 10;
pub const ADDRESS_MAX: usize = 500;
/// Largest quantity a single line may carry; matches the `INTEGER` column.
pub const QUANTITY_MAX: u32 = i32::MAX as u32;

/// Field-level validation failures keyed by input field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("Validation failed")]
#[serde(transparent)]
pub struct ValidationErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl ValidationErrors {
    /// Creates an empty error set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error set holding a single message.
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Records a message against a field.
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.fields
            .entry(field.into())
            .or_default()
            .push(message.into());
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Messages recorded for `field`.
    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or_default()
    }

    /// All recorded messages keyed by field.
    pub fn fields(&self) -> &BTreeMap<String, Vec<String>> {
        &self.fields
    }
}

/// Customer contact details attached to an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
}

/// A validated `(catalog item, quantity)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestedLine {
    pub menu_item_id: CatalogItemId,
    pub quantity: u32,
}

/// A checkout request that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOrder {
    pub customer: CustomerDetails,
    pub lines: Vec<RequestedLine>,
}

/// Order-creation body as received from the client.
///
/// Every field is optional so that missing fields surface as field errors
/// rather than as a body decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    #[serde(default)]
    pub customer_name: Option<String>,
    #[serde(default)]
    pub customer_phone: Option<String>,
    #[serde(default)]
    pub customer_address: Option<String>,
    #[serde(default)]
    pub items: Option<Vec<OrderLineRequest>>,
}

/// One requested line of an order-creation body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRequest {
    #[serde(default)]
    pub menu_item_id: Option<String>,
    #[serde(default)]
    pub quantity: Option<serde_json::Number>,
}

/// Status-update body as received from the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub status: Option<String>,
}

fn check_length(
    errors: &mut ValidationErrors,
    field: &str,
    value: Option<&str>,
    (min, max): (usize, usize),
    (too_short, too_long): (&str, &str),
) -> Option<String> {
    let Some(value) = value else {
        errors.add(field, "Required");
        return None;
    };
    let len = value.chars().count();
    if len < min {
        errors.add(field, too_short);
    }
    if len > max {
        errors.add(field, too_long);
    }
    Some(value.to_string())
}

fn is_phone_char(c: char) -> bool {
    c.is_ascii_digit() || c.is_whitespace() || matches!(c, '+' | '-' | '(' | ')')
}

fn parse_quantity(quantity: Option<&serde_json::Number>) -> Result<u32, &'static str> {
    let Some(number) = quantity else {
        return Err("Required");
    };
    if let Some(q) = number.as_u64() {
        return match u32::try_from(q) {
            Ok(0) => Err("Quantity must be at least 1"),
            Ok(q) if q <= QUANTITY_MAX => Ok(q),
            _ => Err("Quantity is too large"),
        };
    }
    if number.as_i64().is_some() {
        return Err("Quantity must be at least 1");
    }
    match number.as_f64() {
        Some(q) if q.fract() != 0.0 => Err("Quantity must be a whole number"),
        Some(q) if q < 1.0 => Err("Quantity must be at least 1"),
        Some(q) if q > f64::from(QUANTITY_MAX) => Err("Quantity is too large"),
        Some(q) => Ok(q as u32),
        None => Err("Quantity must be a whole number"),
    }
}

impl PlaceOrderRequest {
    /// Checks every field, collecting all failures rather than stopping at
    /// the first one.
    pub fn validate(&self) -> Result<ValidatedOrder, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let name = check_length(
            &mut errors,
            "customerName",
            self.customer_name.as_deref(),
            (NAME_MIN, NAME_MAX),
            (
                "Name must be at least 2 characters",
                "Name must be less than 100 characters",
            ),
        );

        let phone = check_length(
            &mut errors,
            "customerPhone",
            self.customer_phone.as_deref(),
            (PHONE_MIN, PHONE_MAX),
            (
                "Phone must be at least 10 digits",
                "Phone must be less than 15 digits",
            ),
        );
        if let Some(phone) = &phone
            && (phone.is_empty() || !phone.chars().all(is_phone_char))
        {
            errors.add("customerPhone", "Invalid phone number format");
        }

        let address = check_length(
            &mut errors,
            "customerAddress",
            self.customer_address.as_deref(),
            (ADDRESS_MIN, ADDRESS_MAX),
            (
                "Address must be at least 10 characters",
                "Address must be less than 500 characters",
            ),
        );

        let mut lines = Vec::new();
        match &self.items {
            None => errors.add("items", "Required"),
            Some(items) if items.is_empty() => {
                errors.add("items", "Order must have at least one item")
            }
            Some(items) => {
                for item in items {
                    let id = item
                        .menu_item_id
                        .as_deref()
                        .and_then(|id| id.parse::<CatalogItemId>().ok());
                    if id.is_none() {
                        errors.add("items", "Invalid menu item ID");
                    }
                    let quantity = parse_quantity(item.quantity.as_ref());
                    if let Err(message) = quantity {
                        errors.add("items", message);
                    }
                    if let (Some(menu_item_id), Ok(quantity)) = (id, quantity) {
                        lines.push(RequestedLine {
                            menu_item_id,
                            quantity,
                        });
                    }
                }
            }
        }

        match (name, phone, address) {
            (Some(name), Some(phone), Some(address)) if errors.is_empty() => Ok(ValidatedOrder {
                customer: CustomerDetails {
                    name,
                    phone,
                    address,
                },
                lines,
            }),
            _ => Err(errors),
        }
    }
}

impl UpdateStatusRequest {
    /// Parses the requested status against the known set.
    pub fn validate(&self) -> Result<OrderStatus, ValidationErrors> {
        let Some(status) = self.status.as_deref() else {
            return Err(ValidationErrors::single("status", "Required"));
        };
        status.parse().map_err(|_| {
            let expected = OrderStatus::PROGRESSION
                .iter()
                .map(|s| format!("'{s}'"))
                .collect::<Vec<_>>()
                .join(" | ");
            ValidationErrors::single(
                "status",
                format!("Invalid enum value. Expected {expected}, received '{status}'"),
            )
        })
    }
}
