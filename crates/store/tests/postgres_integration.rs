//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration -- --test-threads=1
//! ```

use std::sync::Arc;

use chrono::Utc;
use common::{CatalogItem, Money, Order, OrderId, OrderLine, OrderLineId, OrderStatus};
use sqlx::PgPool;
use store::{CatalogQuery, CatalogStore, OrderStore, PostgresStore, StoreError};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

/// Global shared container
static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            // Create a temporary pool just for migrations
            let temp_pool = PgPool::connect(&connection_string).await.unwrap();

            // Run migrations using raw_sql to execute multiple statements
            sqlx::raw_sql(include_str!(
                "../../../migrations/001_create_menu_and_orders.sql"
            ))
            .execute(&temp_pool)
            .await
            .unwrap();

            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh store with its own pool and cleared tables
async fn get_test_store() -> PostgresStore {
    let info = get_container_info().await;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&info.connection_string)
        .await
        .unwrap();

    // Clear tables for test isolation
    sqlx::query("TRUNCATE TABLE order_items, orders, menu_items")
        .execute(&pool)
        .await
        .unwrap();

    PostgresStore::new(pool)
}

fn create_test_item(name: &str, category: &str, cents: i64) -> CatalogItem {
    CatalogItem::new(
        name,
        format!("{name} description"),
        Money::from_cents(cents),
        "https://example.com/image.jpg",
        category,
    )
}

fn create_test_order(items: &[(&CatalogItem, u32)]) -> Order {
    let now = Utc::now();
    let lines: Vec<_> = items
        .iter()
        .map(|(item, quantity)| OrderLine {
            id: OrderLineId::new(),
            quantity: *quantity,
            unit_price: item.price,
            menu_item_id: item.id,
            menu_item: None,
        })
        .collect();
    Order {
        id: OrderId::new(),
        customer_name: "Jane Doe".to_string(),
        customer_phone: "1234567890".to_string(),
        customer_address: "123 Main Street, Springfield".to_string(),
        status: OrderStatus::OrderReceived,
        total_amount: lines.iter().map(OrderLine::subtotal).sum(),
        created_at: now,
        updated_at: now,
        lines,
    }
}

#[tokio::test]
async fn save_and_list_catalog_items() {
    let store = get_test_store().await;

    store
        .save_item(create_test_item("Pepperoni", "Pizza", 1499))
        .await
        .unwrap();
    store
        .save_item(create_test_item("Cola", "Drinks", 249))
        .await
        .unwrap();
    store
        .save_item(create_test_item("Margherita", "Pizza", 1299))
        .await
        .unwrap();

    let all = store.list_items(CatalogQuery::all()).await.unwrap();
    let names: Vec<_> = all.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, ["Cola", "Margherita", "Pepperoni"]);

    let pizza = store
        .list_items(CatalogQuery::for_category("Pizza"))
        .await
        .unwrap();
    assert_eq!(pizza.len(), 2);
    assert_eq!(store.count_items().await.unwrap(), 3);
}

#[tokio::test]
async fn batched_lookup_skips_unknown_ids() {
    let store = get_test_store().await;
    let item = create_test_item("Margherita", "Pizza", 1299);
    store.save_item(item.clone()).await.unwrap();

    let found = store
        .get_items_by_ids(&[item.id, common::CatalogItemId::new()])
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, item.id);
    assert_eq!(found[0].price.cents(), 1299);
}

#[tokio::test]
async fn insert_and_get_order_with_lines() {
    let store = get_test_store().await;
    let a = create_test_item("Margherita", "Pizza", 1299);
    let b = create_test_item("Cheeseburger", "Burgers", 999);
    store.save_item(a.clone()).await.unwrap();
    store.save_item(b.clone()).await.unwrap();

    let order = create_test_order(&[(&a, 2), (&b, 1)]);
    store.insert_order(&order).await.unwrap();

    let loaded = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, OrderStatus::OrderReceived);
    assert_eq!(loaded.total_amount.cents(), 3597);
    assert_eq!(loaded.lines.len(), 2);
    assert_eq!(loaded.lines[0].menu_item_id, a.id);
    assert_eq!(loaded.lines[1].menu_item_id, b.id);
    assert_eq!(
        loaded.lines[0].menu_item.as_ref().map(|m| m.name.as_str()),
        Some("Margherita")
    );
}

#[tokio::test]
async fn failed_line_insert_rolls_back_order() {
    let store = get_test_store().await;
    let a = create_test_item("Margherita", "Pizza", 1299);
    store.save_item(a.clone()).await.unwrap();

    // Second line references an item that was never saved.
    let ghost = create_test_item("Ghost", "Pizza", 100);
    let order = create_test_order(&[(&a, 1), (&ghost, 1)]);

    let result = store.insert_order(&order).await;
    assert!(matches!(result, Err(StoreError::Database(_))));

    assert!(store.get_order(order.id).await.unwrap().is_none());
    let lines: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(lines, 0);
}

#[tokio::test]
async fn line_price_is_a_snapshot() {
    let store = get_test_store().await;
    let mut a = create_test_item("Margherita", "Pizza", 1299);
    store.save_item(a.clone()).await.unwrap();

    let order = create_test_order(&[(&a, 2)]);
    store.insert_order(&order).await.unwrap();

    a.price = Money::from_cents(2000);
    store.save_item(a.clone()).await.unwrap();

    let loaded = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(loaded.lines[0].unit_price.cents(), 1299);
    assert_eq!(loaded.total_amount.cents(), 2598);
    assert_eq!(
        loaded.lines[0].menu_item.as_ref().map(|m| m.price.cents()),
        Some(2000)
    );
}

#[tokio::test]
async fn list_orders_newest_first() {
    let store = get_test_store().await;
    let a = create_test_item("Margherita", "Pizza", 1299);
    store.save_item(a.clone()).await.unwrap();

    let mut older = create_test_order(&[(&a, 1)]);
    older.created_at = Utc::now() - chrono::Duration::minutes(10);
    let newer = create_test_order(&[(&a, 3)]);

    store.insert_order(&older).await.unwrap();
    store.insert_order(&newer).await.unwrap();

    let listed = store.list_orders().await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].id, newer.id);
    assert_eq!(listed[0].lines[0].quantity, 3);
    assert_eq!(listed[1].id, older.id);
}

#[tokio::test]
async fn conditional_status_update() {
    let store = get_test_store().await;
    let a = create_test_item("Margherita", "Pizza", 1299);
    store.save_item(a.clone()).await.unwrap();
    let order = create_test_order(&[(&a, 1)]);
    store.insert_order(&order).await.unwrap();

    store
        .update_status(
            order.id,
            OrderStatus::OrderReceived,
            OrderStatus::Preparing,
            Utc::now(),
        )
        .await
        .unwrap();

    let stale = store
        .update_status(
            order.id,
            OrderStatus::OrderReceived,
            OrderStatus::Delivered,
            Utc::now(),
        )
        .await;
    assert!(matches!(
        stale,
        Err(StoreError::StatusConflict {
            actual: OrderStatus::Preparing,
            ..
        })
    ));

    let missing = store
        .update_status(
            OrderId::new(),
            OrderStatus::OrderReceived,
            OrderStatus::Preparing,
            Utc::now(),
        )
        .await;
    assert!(matches!(missing, Err(StoreError::OrderNotFound(_))));

    let loaded = store.get_order(order.id).await.unwrap().unwrap();
    assert_eq!(loaded.status, OrderStatus::Preparing);
}

#[tokio::test]
async fn concurrent_status_updates_only_one_wins() {
    let store = get_test_store().await;
    let a = create_test_item("Margherita", "Pizza", 1299);
    store.save_item(a.clone()).await.unwrap();
    let order = create_test_order(&[(&a, 1)]);
    store.insert_order(&order).await.unwrap();

    let mut handles = vec![];
    for next in [OrderStatus::Preparing, OrderStatus::OutForDelivery] {
        let store = store.clone();
        let id = order.id;
        handles.push(tokio::spawn(async move {
            store
                .update_status(id, OrderStatus::OrderReceived, next, Utc::now())
                .await
        }));
    }

    let mut applied = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            applied += 1;
        }
    }
    assert_eq!(applied, 1);
}
