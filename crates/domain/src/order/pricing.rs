//! Price snapshotting for new orders.

use std::collections::{HashMap, HashSet};

use common::{CatalogItem, CatalogItemId, Money, OrderLine, OrderLineId, RequestedLine};

use super::OrderError;

/// Lines priced from the catalog plus their grand total.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedLines {
    pub lines: Vec<OrderLine>,
    pub total: Money,
}

/// Prices every requested line against the resolved catalog items.
///
/// Each line copies the item's current price as its unit price. Fails
/// without producing any line if a requested id is absent from `resolved`;
/// the error lists each missing id once, in request order.
pub fn price_lines(
    requested: &[RequestedLine],
    resolved: Vec<CatalogItem>,
) -> Result<PricedLines, OrderError> {
    let catalog: HashMap<CatalogItemId, CatalogItem> =
        resolved.into_iter().map(|item| (item.id, item)).collect();

    let mut seen = HashSet::new();
    let missing: Vec<CatalogItemId> = requested
        .iter()
        .map(|line| line.menu_item_id)
        .filter(|id| !catalog.contains_key(id) && seen.insert(*id))
        .collect();
    if !missing.is_empty() {
        return Err(OrderError::MissingCatalogItems { missing });
    }

    let mut total = Money::zero();
    let mut lines = Vec::with_capacity(requested.len());
    for request in requested {
        let Some(item) = catalog.get(&request.menu_item_id) else {
            continue;
        };
        let line = OrderLine {
            id: OrderLineId::new(),
            quantity: request.quantity,
            unit_price: item.price,
            menu_item_id: item.id,
            menu_item: Some(item.clone()),
        };
        total += line.subtotal();
        lines.push(line);
    }

    Ok(PricedLines { lines, total })
}
