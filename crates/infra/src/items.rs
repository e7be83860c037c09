//! Item CRUD service.

use chrono::{DateTime, Utc};
use tracing::info;

use pricelens_catalog::{Item, ItemInput};
use pricelens_core::ItemId;

use crate::error::{ServiceError, ServiceResult};
use crate::store::{ItemStore, Page, PageRequest};

const ITEM_NOT_FOUND: &str = "item not found";

/// Create/read/update/delete over catalog items.
///
/// Input is validated before the store is touched.
#[derive(Debug, Clone)]
pub struct ItemService<S> {
    store: S,
}

impl<S: ItemStore> ItemService<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub async fn get(&self, id: ItemId) -> ServiceResult<Item> {
        self.store
            .get(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(ITEM_NOT_FOUND))
    }

    pub async fn create(&self, input: ItemInput, at: DateTime<Utc>) -> ServiceResult<Item> {
        let draft = input.validate()?;
        let item = self.store.insert(draft, at).await?;
        info!(item_id = %item.id, brand = %item.brand, category = %item.category, "item created");
        Ok(item)
    }

    pub async fn update(&self, id: ItemId, input: ItemInput, at: DateTime<Utc>) -> ServiceResult<Item> {
        let draft = input.validate()?;
        let item = self
            .store
            .update(id, draft, at)
            .await?
            .ok_or_else(|| ServiceError::not_found(ITEM_NOT_FOUND))?;
        info!(item_id = %item.id, "item updated");
        Ok(item)
    }

    pub async fn delete(&self, id: ItemId) -> ServiceResult<()> {
        if !self.store.delete(id).await? {
            return Err(ServiceError::not_found(ITEM_NOT_FOUND));
        }
        info!(item_id = %id, "item deleted");
        Ok(())
    }

    /// Items ordered by id descending.
    pub async fn list(&self, request: PageRequest) -> ServiceResult<Page<Item>> {
        Ok(self.store.page(request).await?)
    }
}
