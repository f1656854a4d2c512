//! Persistence for catalog items and orders.
//!
//! Two backends implement the same [`CatalogStore`] and [`OrderStore`]
//! traits: [`InMemoryStore`] for tests and local runs, and
//! [`PostgresStore`] for durable deployments.

pub mod error;
pub mod memory;
pub mod postgres;
pub mod query;
pub mod seed;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
pub use query::CatalogQuery;
pub use seed::{default_menu, seed_catalog};
pub use store::{CatalogStore, OrderStore, Store};
