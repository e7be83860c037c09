//! Read-side price queries over an `ItemStore`.

use tracing::debug;

use pricelens_catalog::{
    category_price_range, cheapest_full_coverage_brand, cheapest_per_category,
    distinct_categories, BrandCoverage, CategoryPriceRange, CheapestPerCategory,
};

use crate::error::{ServiceError, ServiceResult};
use crate::store::ItemStore;

/// Price aggregation service.
///
/// Every call recomputes from the store's current contents; nothing is cached.
#[derive(Debug, Clone)]
pub struct PriceQueries<S> {
    store: S,
}

impl<S: ItemStore> PriceQueries<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn categories(&self) -> ServiceResult<Vec<String>> {
        Ok(self.store.categories().await?)
    }

    pub async fn cheapest_per_category(&self) -> ServiceResult<CheapestPerCategory> {
        let items = self.store.all().await?;
        Ok(cheapest_per_category(&items))
    }

    /// `None` when no single brand stocks every category.
    pub async fn cheapest_full_coverage_brand(&self) -> ServiceResult<Option<BrandCoverage>> {
        let items = self.store.all().await?;
        // Derive the category set from the same snapshot so both inputs agree.
        let categories = distinct_categories(&items);
        Ok(cheapest_full_coverage_brand(&items, &categories))
    }

    /// Cheapest and priciest offer in `category`.
    ///
    /// The category is matched exactly as given. A blank or unknown category
    /// is rejected before any item lookup; both extremes come from one read.
    pub async fn category_min_max(&self, category: &str) -> ServiceResult<CategoryPriceRange> {
        if category.trim().is_empty() {
            return Err(ServiceError::not_found("category not found"));
        }

        let known = self.store.categories().await?;
        if !known.iter().any(|c| c == category) {
            debug!(category, "unknown category requested");
            return Err(ServiceError::not_found(format!("category not found: {category}")));
        }

        let items = self.store.items_in_category(category).await?;
        Ok(category_price_range(&items, category)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{InMemoryItemStore, Page, PageRequest, StoreResult};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use pricelens_catalog::{BrandPrice, Item, ItemDraft};
    use pricelens_core::{ItemId, Price};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    async fn reference_store() -> Arc<InMemoryItemStore> {
        let store = Arc::new(InMemoryItemStore::new());
        let rows = [
            ("A", "상의", 10_000),
            ("B", "상의", 15_000),
            ("A", "하의", 20_000),
            ("B", "하의", 18_000),
            ("A", "신발", 30_000),
            ("B", "신발", 28_000),
        ];
        for (n, (brand, category, price)) in rows.into_iter().enumerate() {
            let draft = ItemDraft::new(brand, category, price).unwrap();
            store.insert(draft, at(n as i64)).await.unwrap();
        }
        store
    }

    #[tokio::test]
    async fn cheapest_per_category_reads_current_items() {
        let queries = PriceQueries::new(reference_store().await);
        let result = queries.cheapest_per_category().await.unwrap();
        assert_eq!(result.entries.len(), 3);
        assert_eq!(result.total, Price::new(56_000));
    }

    #[tokio::test]
    async fn deleting_everything_yields_empty_result() {
        let store = reference_store().await;
        for item in store.all().await.unwrap() {
            store.delete(item.id).await.unwrap();
        }
        let queries = PriceQueries::new(store);

        let result = queries.cheapest_per_category().await.unwrap();
        assert!(result.entries.is_empty());
        assert_eq!(result.total, Price::ZERO);
        assert_eq!(queries.cheapest_full_coverage_brand().await.unwrap(), None);
    }

    #[tokio::test]
    async fn full_coverage_brand_reference_scenario() {
        let queries = PriceQueries::new(reference_store().await);
        let winner = queries.cheapest_full_coverage_brand().await.unwrap().unwrap();
        assert_eq!(winner.brand, "A");
        assert_eq!(winner.total, Price::new(60_000));
    }

    #[tokio::test]
    async fn min_max_for_known_category() {
        let queries = PriceQueries::new(reference_store().await);
        let range = queries.category_min_max("상의").await.unwrap();
        assert_eq!(range.category, "상의");
        assert_eq!(range.lowest, vec![BrandPrice { brand: "A".into(), price: Price::new(10_000) }]);
        assert_eq!(range.highest, vec![BrandPrice { brand: "B".into(), price: Price::new(15_000) }]);
    }

    #[tokio::test]
    async fn min_max_rejects_blank_and_unknown_categories() {
        let queries = PriceQueries::new(reference_store().await);
        assert_eq!(
            queries.category_min_max("   ").await.unwrap_err(),
            ServiceError::NotFound("category not found".to_string())
        );
        assert_eq!(
            queries.category_min_max("가방").await.unwrap_err(),
            ServiceError::NotFound("category not found: 가방".to_string())
        );
    }

    #[tokio::test]
    async fn min_max_matches_category_exactly() {
        let queries = PriceQueries::new(reference_store().await);
        assert_eq!(
            queries.category_min_max(" 상의 ").await.unwrap_err(),
            ServiceError::NotFound("category not found:  상의 ".to_string())
        );
    }

    #[tokio::test]
    async fn min_max_skips_item_reads_for_absent_categories() {
        let store = Arc::new(CountingStore::new(reference_store().await));
        let queries = PriceQueries::new(store.clone());

        for category in ["가방", "   ", ""] {
            assert!(matches!(
                queries.category_min_max(category).await,
                Err(ServiceError::NotFound(_))
            ));
        }
        assert_eq!(store.item_reads.load(Ordering::SeqCst), 0);

        queries.category_min_max("상의").await.unwrap();
        assert_eq!(store.item_reads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn min_max_comes_from_a_single_snapshot() {
        let inner = reference_store().await;
        let queries = PriceQueries::new(RepricingStore { inner: inner.clone() });

        let range = queries.category_min_max("상의").await.unwrap();
        assert_eq!(range.lowest, vec![BrandPrice { brand: "A".into(), price: Price::new(10_000) }]);
        assert_eq!(range.highest, vec![BrandPrice { brand: "B".into(), price: Price::new(15_000) }]);
        assert!(range.lowest[0].price <= range.highest[0].price);

        // The next call sees the repriced rows as a whole.
        let range = queries.category_min_max("상의").await.unwrap();
        assert_eq!(range.lowest[0].price, Price::new(5));
        assert_eq!(range.highest[0].price, Price::new(6));
    }

    /// Counts every call that reads item rows.
    struct CountingStore {
        inner: Arc<InMemoryItemStore>,
        item_reads: AtomicUsize,
    }

    impl CountingStore {
        fn new(inner: Arc<InMemoryItemStore>) -> Self {
            Self { inner, item_reads: AtomicUsize::new(0) }
        }

        fn hit(&self) {
            self.item_reads.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl ItemStore for CountingStore {
        async fn get(&self, id: ItemId) -> StoreResult<Option<Item>> {
            self.hit();
            self.inner.get(id).await
        }

        async fn all(&self) -> StoreResult<Vec<Item>> {
            self.hit();
            self.inner.all().await
        }

        async fn count(&self) -> StoreResult<u64> {
            self.inner.count().await
        }

        async fn categories(&self) -> StoreResult<Vec<String>> {
            self.inner.categories().await
        }

        async fn items_in_category(&self, category: &str) -> StoreResult<Vec<Item>> {
            self.hit();
            self.inner.items_in_category(category).await
        }

        async fn insert(&self, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Item> {
            self.inner.insert(draft, at).await
        }

        async fn update(&self, id: ItemId, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Option<Item>> {
            self.inner.update(id, draft, at).await
        }

        async fn delete(&self, id: ItemId) -> StoreResult<bool> {
            self.inner.delete(id).await
        }

        async fn page(&self, request: PageRequest) -> StoreResult<Page<Item>> {
            self.hit();
            self.inner.page(request).await
        }
    }

    /// Reprices every 상의 row (A to 5, B to 6) right after each category read,
    /// so anything read later in the same query would see different prices.
    struct RepricingStore {
        inner: Arc<InMemoryItemStore>,
    }

    #[async_trait]
    impl ItemStore for RepricingStore {
        async fn get(&self, id: ItemId) -> StoreResult<Option<Item>> {
            self.inner.get(id).await
        }

        async fn all(&self) -> StoreResult<Vec<Item>> {
            self.inner.all().await
        }

        async fn count(&self) -> StoreResult<u64> {
            self.inner.count().await
        }

        async fn categories(&self) -> StoreResult<Vec<String>> {
            self.inner.categories().await
        }

        async fn items_in_category(&self, category: &str) -> StoreResult<Vec<Item>> {
            let items = self.inner.items_in_category(category).await?;
            for item in &items {
                let price = if item.brand == "A" { 5 } else { 6 };
                let draft = ItemDraft::new(item.brand.as_str(), item.category.as_str(), price).unwrap();
                self.inner.update(item.id, draft, at(100)).await?;
            }
            Ok(items)
        }

        async fn insert(&self, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Item> {
            self.inner.insert(draft, at).await
        }

        async fn update(&self, id: ItemId, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Option<Item>> {
            self.inner.update(id, draft, at).await
        }

        async fn delete(&self, id: ItemId) -> StoreResult<bool> {
            self.inner.delete(id).await
        }

        async fn page(&self, request: PageRequest) -> StoreResult<Page<Item>> {
            self.inner.page(request).await
        }
    }

    #[tokio::test]
    async fn categories_are_sorted() {
        let queries = PriceQueries::new(reference_store().await);
        assert_eq!(queries.categories().await.unwrap(), vec!["상의", "신발", "하의"]);
    }
}
