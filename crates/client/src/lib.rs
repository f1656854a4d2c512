//! Client-side building blocks for the food ordering system.
//!
//! - [`Cart`] and [`CartStore`]: the persisted cart shared between handles
//! - [`ApiClient`]: typed access to the HTTP API
//! - [`OrderTracker`]: polls an order and optionally auto-advances it for demos

pub mod api;
pub mod cart;
pub mod error;
pub mod storage;
pub mod store;
pub mod tracker;

pub use api::{ApiClient, OrderSource};
pub use cart::{Cart, CartLine};
pub use error::{CartError, ClientError};
pub use storage::{CART_STORAGE_KEY, CartStorage, FileStorage, MemoryStorage};
pub use store::CartStore;
pub use tracker::{OrderTracker, TrackerConfig, TrackerState};
