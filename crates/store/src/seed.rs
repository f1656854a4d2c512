//! Default menu used to populate an empty catalog.

use common::{CatalogItem, Money};

use crate::{CatalogStore, Result};

const DEFAULT_MENU: &[(&str, &str, i64, &str, &str)] = &[
    (
        "Margherita Pizza",
        "Classic pizza with fresh tomatoes, mozzarella cheese, and basil",
        1299,
        "https://images.unsplash.com/photo-1604068549290-dea0e4a305ca?w=400",
        "Pizza",
    ),
    (
        "Pepperoni Pizza",
        "Loaded with spicy pepperoni and melted mozzarella cheese",
        1499,
        "https://images.unsplash.com/photo-1628840042765-356cda07504e?w=400",
        "Pizza",
    ),
    (
        "BBQ Chicken Pizza",
        "Grilled chicken, BBQ sauce, red onions, and cilantro",
        1599,
        "https://images.unsplash.com/photo-1565299624946-b28f40a0ae38?w=400",
        "Pizza",
    ),
    (
        "Classic Cheeseburger",
        "Juicy beef patty with cheddar cheese, lettuce, tomato, and special sauce",
        999,
        "https://images.unsplash.com/photo-1568901346375-23c9450c58cd?w=400",
        "Burgers",
    ),
    (
        "Double Bacon Burger",
        "Two beef patties with crispy bacon, cheese, and caramelized onions",
        1399,
        "https://images.unsplash.com/photo-1594212699903-ec8a3eca50f5?w=400",
        "Burgers",
    ),
    (
        "Veggie Burger",
        "Plant-based patty with avocado, sprouts, and chipotle mayo",
        1199,
        "https://images.unsplash.com/photo-1520072959219-c595dc870360?w=400",
        "Burgers",
    ),
    (
        "Chicken Wings",
        "Crispy wings tossed in your choice of buffalo or BBQ sauce",
        1099,
        "https://images.unsplash.com/photo-1608039755401-742074f0548d?q=80&w=400",
        "Sides",
    ),
    (
        "French Fries",
        "Golden crispy fries seasoned with sea salt",
        499,
        "https://images.unsplash.com/photo-1573080496219-bb080dd4f877?w=400",
        "Sides",
    ),
    (
        "Caesar Salad",
        "Fresh romaine lettuce, parmesan cheese, croutons, and Caesar dressing",
        899,
        "https://images.unsplash.com/photo-1546793665-c74683f339c1?w=400",
        "Salads",
    ),
    (
        "Chocolate Brownie",
        "Warm fudgy brownie served with vanilla ice cream",
        699,
        "https://images.unsplash.com/photo-1564355808539-22fda35bed7e?w=400",
        "Desserts",
    ),
    (
        "Cola",
        "Classic refreshing cola drink",
        249,
        "https://images.unsplash.com/photo-1622483767028-3f66f32aef97?w=400",
        "Drinks",
    ),
    (
        "Lemonade",
        "Fresh squeezed lemonade with a hint of mint",
        349,
        "https://images.unsplash.com/photo-1621263764928-df1444c5e859?w=400",
        "Drinks",
    ),
];

/// Builds fresh catalog items for the default menu.
pub fn default_menu() -> Vec<CatalogItem> {
    DEFAULT_MENU
        .iter()
        .map(|(name, description, cents, image_url, category)| {
            CatalogItem::new(
                *name,
                *description,
                Money::from_cents(*cents),
                *image_url,
                *category,
            )
        })
        .collect()
}

/// Seeds the default menu if the catalog is empty.
///
/// Returns the number of items inserted; zero when the catalog already had
/// content.
#[tracing::instrument(skip(store))]
pub async fn seed_catalog<S: CatalogStore + ?Sized>(store: &S) -> Result<usize> {
    if store.count_items().await? > 0 {
        tracing::debug!("catalog already populated, skipping seed");
        return Ok(0);
    }

    let items = default_menu();
    let count = items.len();
    for item in items {
        store.save_item(item).await?;
    }

    tracing::info!(count, "seeded default menu");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CatalogQuery, InMemoryStore};

    #[test]
    fn test_default_menu_has_unique_ids_and_valid_prices() {
        let menu = default_menu();
        assert_eq!(menu.len(), 12);
        let ids: std::collections::HashSet<_> = menu.iter().map(|i| i.id).collect();
        assert_eq!(ids.len(), menu.len());
        assert!(menu.iter().all(|i| !i.price.is_negative()));
    }

    #[tokio::test]
    async fn test_seed_only_populates_empty_catalog() {
        let store = InMemoryStore::new();
        assert_eq!(seed_catalog(&store).await.unwrap(), 12);
        assert_eq!(seed_catalog(&store).await.unwrap(), 0);
        assert_eq!(store.count_items().await.unwrap(), 12);

        let drinks = store
            .list_items(CatalogQuery::for_category("Drinks"))
            .await
            .unwrap();
        assert_eq!(drinks.len(), 2);
    }
}
