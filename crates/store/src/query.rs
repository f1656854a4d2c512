/// Filter for catalog listings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    /// Exact category label to match.
    pub category: Option<String>,
}

impl CatalogQuery {
    /// Creates a query matching every item.
    pub fn all() -> Self {
        Self::default()
    }

    /// Creates a query for a single category.
    pub fn for_category(category: impl Into<String>) -> Self {
        Self {
            category: Some(category.into()),
        }
    }

    /// Returns true if `category` passes this filter.
    pub fn matches(&self, category: &str) -> bool {
        self.category.as_deref().is_none_or(|c| c == category)
    }
}
