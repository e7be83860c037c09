//! Item storage abstractions.
//!
//! `ItemStore` is the only seam between the services and persistence. Two
//! adapters ship with the crate: an in-memory store for tests/dev and a
//! Postgres store backed by sqlx.

pub mod in_memory;
pub mod page;
pub mod postgres;

pub use in_memory::InMemoryItemStore;
pub use page::{Page, PageRequest, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
pub use postgres::PostgresItemStore;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use pricelens_catalog::{Item, ItemDraft};
use pricelens_core::ItemId;

/// Failures raised by a storage adapter.
///
/// These never carry domain meaning ("not found" is expressed with `Option`
/// / `bool` return values) and are surfaced to clients only as a generic
/// internal error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),

    /// A persisted row could not be mapped back to an `Item`.
    #[error("corrupt item row: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence contract for catalog items.
///
/// ## Atomicity
///
/// `insert`, `update` and `delete` must each appear atomic to concurrent
/// readers: a reader observes either the whole mutation or none of it.
///
/// ## Ordering
///
/// - `categories` is distinct and ascending by code point.
/// - `page` is ordered by id descending.
/// - `all` and `items_in_category` are ascending by id, so the catalog
///   tie-breaks (`cheapest_newest` / `priciest_oldest`) let the lower id win
///   a full tie.
#[async_trait]
pub trait ItemStore: Send + Sync {
    async fn get(&self, id: ItemId) -> StoreResult<Option<Item>>;

    /// Snapshot of every item, ascending by id.
    async fn all(&self) -> StoreResult<Vec<Item>>;

    async fn count(&self) -> StoreResult<u64>;

    async fn categories(&self) -> StoreResult<Vec<String>>;

    /// Snapshot of every item in `category` (exact match), taken in one read.
    async fn items_in_category(&self, category: &str) -> StoreResult<Vec<Item>>;

    /// Insert a new item; the store assigns its id and stamps both timestamps with `at`.
    async fn insert(&self, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Item>;

    /// Replace brand, category and price. Returns `None` for an unknown id.
    async fn update(&self, id: ItemId, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Option<Item>>;

    /// Returns `false` for an unknown id.
    async fn delete(&self, id: ItemId) -> StoreResult<bool>;

    async fn page(&self, request: PageRequest) -> StoreResult<Page<Item>>;
}

#[async_trait]
impl<S> ItemStore for Arc<S>
where
    S: ItemStore + ?Sized,
{
    async fn get(&self, id: ItemId) -> StoreResult<Option<Item>> {
        (**self).get(id).await
    }

    async fn all(&self) -> StoreResult<Vec<Item>> {
        (**self).all().await
    }

    async fn count(&self) -> StoreResult<u64> {
        (**self).count().await
    }

    async fn categories(&self) -> StoreResult<Vec<String>> {
        (**self).categories().await
    }

    async fn items_in_category(&self, category: &str) -> StoreResult<Vec<Item>> {
        (**self).items_in_category(category).await
    }

    async fn insert(&self, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Item> {
        (**self).insert(draft, at).await
    }

    async fn update(&self, id: ItemId, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Option<Item>> {
        (**self).update(id, draft, at).await
    }

    async fn delete(&self, id: ItemId) -> StoreResult<bool> {
        (**self).delete(id).await
    }

    async fn page(&self, request: PageRequest) -> StoreResult<Page<Item>> {
        (**self).page(request).await
    }
}
