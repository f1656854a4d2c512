//! Integration tests for the order lifecycle.
//!
//! These tests drive placement and status changes through the public
//! service API against the in-memory store.

use common::{CatalogItem, Money, OrderStatus, PlaceOrderRequest};
use domain::{DomainError, OrderError, OrderService};
use store::{CatalogStore, InMemoryStore, OrderStore};

/// Helper to create a service with a two-item catalog
async fn create_service() -> (OrderService<InMemoryStore>, CatalogItem, CatalogItem) {
    let store = InMemoryStore::new();
    let pizza = CatalogItem::new(
        "Margherita Pizza",
        "Classic pizza",
        Money::from_cents(1299),
        "https://example.com/pizza.jpg",
        "Pizza",
    );
    let burger = CatalogItem::new(
        "Classic Cheeseburger",
        "Juicy beef patty",
        Money::from_cents(999),
        "https://example.com/burger.jpg",
        "Burgers",
    );
    store.save_item(pizza.clone()).await.unwrap();
    store.save_item(burger.clone()).await.unwrap();
    (OrderService::new(store), pizza, burger)
}

fn checkout(items: serde_json::Value) -> PlaceOrderRequest {
    serde_json::from_value(serde_json::json!({
        "customerName": "John Doe",
        "customerPhone": "(555) 123-4567",
        "customerAddress": "123 Main Street, City, State 12345",
        "items": items
    }))
    .unwrap()
}

mod order_lifecycle {
    use super::*;

    #[tokio::test]
    async fn place_then_track_to_delivery() {
        let (service, pizza, burger) = create_service().await;

        let request = checkout(serde_json::json!([
            { "menuItemId": pizza.id.to_string(), "quantity": 2 },
            { "menuItemId": burger.id.to_string(), "quantity": 1 }
        ]));
        let order = service
            .place_order(request.validate().unwrap())
            .await
            .unwrap();
        assert_eq!(order.total_amount.cents(), 3597);
        assert_eq!(order.status, OrderStatus::OrderReceived);

        // Explicit jump ahead
        let order = service
            .update_status(order.id, OrderStatus::OutForDelivery)
            .await
            .unwrap();
        assert_eq!(order.status, OrderStatus::OutForDelivery);

        // Going back is refused and leaves the order alone
        let err = service
            .update_status(order.id, OrderStatus::Preparing)
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Cannot transition"));

        // Auto-advance finishes the job, then idles
        let order = service.advance(order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);
        let order = service.advance(order.id).await.unwrap();
        assert_eq!(order.status, OrderStatus::Delivered);

        let loaded = service.get_order(order.id).await.unwrap().unwrap();
        assert_eq!(loaded.status, OrderStatus::Delivered);
        assert_eq!(loaded.total_amount.cents(), 3597);
    }

    #[tokio::test]
    async fn listing_is_newest_first() {
        let (service, pizza, _) = create_service().await;
        let request = checkout(serde_json::json!([
            { "menuItemId": pizza.id.to_string(), "quantity": 1 }
        ]));

        let first = service
            .place_order(request.validate().unwrap())
            .await
            .unwrap();
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        let second = service
            .place_order(request.validate().unwrap())
            .await
            .unwrap();

        let listed = service.list_orders().await.unwrap();
        let ids: Vec<_> = listed.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }
}

mod atomicity {
    use super::*;

    #[tokio::test]
    async fn unknown_item_rejects_whole_order() {
        let (service, pizza, _) = create_service().await;
        let ghost = "550e8400-e29b-41d4-a716-446655440099";

        let request = checkout(serde_json::json!([
            { "menuItemId": pizza.id.to_string(), "quantity": 1 },
            { "menuItemId": ghost, "quantity": 3 }
        ]));
        let err = service
            .place_order(request.validate().unwrap())
            .await
            .unwrap_err();

        match err {
            DomainError::Order(OrderError::MissingCatalogItems { missing }) => {
                assert_eq!(missing.len(), 1);
                assert_eq!(missing[0].to_string(), ghost);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(service.store().list_orders().await.unwrap().is_empty());
    }
}

mod price_snapshots {
    use super::*;

    #[tokio::test]
    async fn catalog_edits_do_not_reprice_history() {
        let (service, mut pizza, _) = create_service().await;
        let request = checkout(serde_json::json!([
            { "menuItemId": pizza.id.to_string(), "quantity": 3 }
        ]));
        let before = service
            .place_order(request.validate().unwrap())
            .await
            .unwrap();

        pizza.price = Money::from_cents(1999);
        service.store().save_item(pizza.clone()).await.unwrap();

        let after = service
            .place_order(request.validate().unwrap())
            .await
            .unwrap();
        let reloaded = service.get_order(before.id).await.unwrap().unwrap();

        assert_eq!(reloaded.total_amount.cents(), 3897);
        assert_eq!(reloaded.lines[0].unit_price.cents(), 1299);
        assert_eq!(after.total_amount.cents(), 5997);
    }
}
