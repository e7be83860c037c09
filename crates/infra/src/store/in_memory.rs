use std::collections::{BTreeMap, BTreeSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use pricelens_catalog::{Item, ItemDraft};
use pricelens_core::ItemId;

use super::{ItemStore, Page, PageRequest, StoreError, StoreResult};

#[derive(Debug)]
struct Inner {
    last_id: i64,
    items: BTreeMap<ItemId, Item>,
}

/// In-memory item store.
///
/// Intended for tests/dev. All state sits behind one lock; writers hold the
/// write guard for the whole mutation and readers clone under the read guard.
#[derive(Debug)]
pub struct InMemoryItemStore {
    inner: RwLock<Inner>,
}

impl InMemoryItemStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                last_id: 0,
                items: BTreeMap::new(),
            }),
        }
    }

    fn read<T>(&self, f: impl FnOnce(&Inner) -> T) -> StoreResult<T> {
        let inner = self.inner.read().map_err(|_| poisoned())?;
        Ok(f(&inner))
    }

    fn write<T>(&self, f: impl FnOnce(&mut Inner) -> StoreResult<T>) -> StoreResult<T> {
        let mut inner = self.inner.write().map_err(|_| poisoned())?;
        f(&mut inner)
    }
}

impl Default for InMemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned() -> StoreError {
    StoreError::Database("item store lock poisoned".to_string())
}

#[async_trait]
impl ItemStore for InMemoryItemStore {
    async fn get(&self, id: ItemId) -> StoreResult<Option<Item>> {
        self.read(|inner| inner.items.get(&id).cloned())
    }

    async fn all(&self) -> StoreResult<Vec<Item>> {
        self.read(|inner| inner.items.values().cloned().collect())
    }

    async fn count(&self) -> StoreResult<u64> {
        self.read(|inner| inner.items.len() as u64)
    }

    async fn categories(&self) -> StoreResult<Vec<String>> {
        self.read(|inner| {
            let set: BTreeSet<&str> = inner.items.values().map(|i| i.category.as_str()).collect();
            set.into_iter().map(str::to_string).collect()
        })
    }

    async fn items_in_category(&self, category: &str) -> StoreResult<Vec<Item>> {
        self.read(|inner| {
            inner
                .items
                .values()
                .filter(|i| i.category == category)
                .cloned()
                .collect()
        })
    }

    async fn insert(&self, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Item> {
        self.write(|inner| {
            let id = inner
                .last_id
                .checked_add(1)
                .and_then(|next| ItemId::new(next).ok())
                .ok_or_else(|| StoreError::Database("id sequence exhausted".to_string()))?;
            inner.last_id = id.get();

            let item = Item::create(id, draft, at);
            inner.items.insert(id, item.clone());
            Ok(item)
        })
    }

    async fn update(&self, id: ItemId, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Option<Item>> {
        self.write(|inner| {
            Ok(inner.items.get_mut(&id).map(|item| {
                item.revise(draft, at);
                item.clone()
            }))
        })
    }

    async fn delete(&self, id: ItemId) -> StoreResult<bool> {
        self.write(|inner| Ok(inner.items.remove(&id).is_some()))
    }

    async fn page(&self, request: PageRequest) -> StoreResult<Page<Item>> {
        self.read(|inner| {
            let offset = usize::try_from(request.offset()).unwrap_or(usize::MAX);
            let items = inner
                .items
                .values()
                .rev()
                .skip(offset)
                .take(request.size() as usize)
                .cloned()
                .collect();
            Page::new(items, request, inner.items.len() as u64)
        })
    }
}
