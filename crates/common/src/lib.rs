//! Types shared by the server crates and the client.
//!
//! - typed identifiers in canonical UUID form
//! - [`Money`] held as integer cents
//! - [`OrderStatus`] and its declared progression table
//! - catalog and order records as they appear on the wire
//! - the request validation contract

pub mod money;
pub mod records;
pub mod status;
pub mod types;
pub mod validation;

pub use money::Money;
pub use records::{CatalogItem, Order, OrderLine};
pub use status::{OrderStatus, ParseStatusError, is_valid_transition};
pub use types::{CatalogItemId, InvalidId, OrderId, OrderLineId};
pub use validation::{
    CustomerDetails, OrderLineRequest, PlaceOrderRequest, RequestedLine, UpdateStatusRequest,
    ValidatedOrder, ValidationErrors,
};
