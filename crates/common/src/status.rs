//! Order status progression.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The status of an order in its delivery lifecycle.
///
/// Status progression:
/// ```text
/// OrderReceived ──► Preparing ──► OutForDelivery ──► Delivered
///       │               │                               ▲
///       └───────────────┴──────── (skips allowed) ──────┘
/// ```
///
/// Position in [`OrderStatus::PROGRESSION`] is the only source of ordering;
/// both the transition check and [`OrderStatus::next`] read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// Order accepted, kitchen not started.
    #[default]
    OrderReceived,

    /// Kitchen is preparing the food.
    Preparing,

    /// Rider is on the way.
    OutForDelivery,

    /// Handed over to the customer (terminal state).
    Delivered,
}

/// Returned when a string names no known status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown order status: {0:?}")]
pub struct ParseStatusError(pub String);

impl OrderStatus {
    /// Declared progression, earliest first.
    pub const PROGRESSION: [OrderStatus; 4] = [
        OrderStatus::OrderReceived,
        OrderStatus::Preparing,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    /// Index of this status in [`Self::PROGRESSION`].
    pub fn position(&self) -> usize {
        Self::PROGRESSION
            .iter()
            .position(|s| s == self)
            .unwrap_or_default()
    }

    /// Returns true if moving from `self` to `next` goes strictly forward.
    ///
    /// Skipping intermediate statuses is allowed; staying put or moving
    /// backward is not.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        next.position() > self.position()
    }

    /// The status immediately after this one, or `None` at the terminal status.
    pub fn next(&self) -> Option<OrderStatus> {
        Self::PROGRESSION.get(self.position() + 1).copied()
    }

    /// Returns true if no further transition is possible.
    pub fn is_terminal(&self) -> bool {
        self.next().is_none()
    }

    /// Returns the wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::OrderReceived => "ORDER_RECEIVED",
            OrderStatus::Preparing => "PREPARING",
            OrderStatus::OutForDelivery => "OUT_FOR_DELIVERY",
            OrderStatus::Delivered => "DELIVERED",
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::PROGRESSION
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// String-level transition check.
///
/// An unrecognized name on either side never validates.
pub fn is_valid_transition(current: &str, next: &str) -> bool {
    match (current.parse::<OrderStatus>(), next.parse::<OrderStatus>()) {
        (Ok(current), Ok(next)) => current.can_transition_to(next),
        _ => false,
    }
}
