//! Postgres-backed item store.
//!
//! Every mutation is a single statement (`INSERT/UPDATE/DELETE … RETURNING`),
//! so each one is atomic without an explicit transaction.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError |
//! |------------|------------|
//! | Database (any code) | `Database` |
//! | PoolClosed | `Database` |
//! | RowNotFound | `Database` (queries use `fetch_optional`, so this is unexpected) |
//! | ColumnDecode / ColumnNotFound | `Corrupt` |
//! | Other | `Database` |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;

use pricelens_catalog::{Item, ItemDraft};
use pricelens_core::{ItemId, Price};

use super::{ItemStore, Page, PageRequest, StoreError, StoreResult};

const ITEM_COLUMNS: &str = "id, brand, category, price, created_at, updated_at";

/// Postgres-backed item store.
///
/// ## Ordering
///
/// Category names are compared with `COLLATE "C"` (byte order), which for
/// UTF-8 matches the code-point order the in-memory store uses. Item
/// snapshots are returned `id ASC` so price tie-breaks resolve to the older
/// row, as they do in memory.
#[derive(Debug, Clone)]
pub struct PostgresItemStore {
    pool: PgPool,
}

impl PostgresItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `items` table and its category/price index if missing.
    #[instrument(skip(self), fields(operation = "ensure_schema"))]
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS items (
                id          BIGSERIAL PRIMARY KEY,
                brand       VARCHAR(100) NOT NULL,
                category    VARCHAR(50)  NOT NULL,
                price       BIGINT       NOT NULL CHECK (price >= 0),
                created_at  TIMESTAMPTZ  NOT NULL,
                updated_at  TIMESTAMPTZ  NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        sqlx::query("CREATE INDEX IF NOT EXISTS items_category_price_idx ON items (category, price)")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_schema", e))?;

        Ok(())
    }
}

#[async_trait]
impl ItemStore for PostgresItemStore {
    #[instrument(skip(self), fields(item_id = %id))]
    async fn get(&self, id: ItemId) -> StoreResult<Option<Item>> {
        let row = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items WHERE id = $1"))
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?;

        row.as_ref().map(row_to_item).transpose()
    }

    #[instrument(skip(self))]
    async fn all(&self) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query(&format!("SELECT {ITEM_COLUMNS} FROM items ORDER BY id ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("all", e))?;

        rows.iter().map(row_to_item).collect()
    }

    #[instrument(skip(self))]
    async fn count(&self) -> StoreResult<u64> {
        let row = sqlx::query("SELECT COUNT(*) AS total FROM items")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("count", e))?;

        count_from_row(&row)
    }

    #[instrument(skip(self))]
    async fn categories(&self) -> StoreResult<Vec<String>> {
        let rows = sqlx::query(
            r#"SELECT category FROM items GROUP BY category ORDER BY category COLLATE "C""#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("categories", e))?;

        rows.iter()
            .map(|row| {
                row.try_get::<String, _>("category")
                    .map_err(|e| StoreError::Corrupt(format!("category: {e}")))
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn items_in_category(&self, category: &str) -> StoreResult<Vec<Item>> {
        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE category = $1 ORDER BY id ASC"
        ))
        .bind(category)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("items_in_category", e))?;

        rows.iter().map(row_to_item).collect()
    }

    #[instrument(skip(self, draft), fields(brand = %draft.brand(), category = %draft.category()))]
    async fn insert(&self, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Item> {
        let row = sqlx::query(&format!(
            r#"
            INSERT INTO items (brand, category, price, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(draft.brand())
        .bind(draft.category())
        .bind(price_to_db(draft.price())?)
        .bind(at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("insert", e))?;

        row_to_item(&row)
    }

    #[instrument(skip(self, draft), fields(item_id = %id))]
    async fn update(&self, id: ItemId, draft: ItemDraft, at: DateTime<Utc>) -> StoreResult<Option<Item>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE items
            SET brand = $2, category = $3, price = $4, updated_at = $5
            WHERE id = $1
            RETURNING {ITEM_COLUMNS}
            "#
        ))
        .bind(id.get())
        .bind(draft.brand())
        .bind(draft.category())
        .bind(price_to_db(draft.price())?)
        .bind(at)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("update", e))?;

        row.as_ref().map(row_to_item).transpose()
    }

    #[instrument(skip(self), fields(item_id = %id))]
    async fn delete(&self, id: ItemId) -> StoreResult<bool> {
        let row = sqlx::query("DELETE FROM items WHERE id = $1 RETURNING id")
            .bind(id.get())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(row.is_some())
    }

    #[instrument(skip(self), fields(page = request.page(), size = request.size()))]
    async fn page(&self, request: PageRequest) -> StoreResult<Page<Item>> {
        let offset = i64::try_from(request.offset())
            .map_err(|_| StoreError::Database("page offset out of range".to_string()))?;

        let rows = sqlx::query(&format!(
            "SELECT {ITEM_COLUMNS} FROM items ORDER BY id DESC LIMIT $1 OFFSET $2"
        ))
        .bind(i64::from(request.size()))
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("page", e))?;

        let items = rows.iter().map(row_to_item).collect::<StoreResult<Vec<_>>>()?;
        let total_items = self.count().await?;

        Ok(Page::new(items, request, total_items))
    }
}

fn row_to_item(row: &PgRow) -> StoreResult<Item> {
    let corrupt = |column: &str, e: sqlx::Error| StoreError::Corrupt(format!("{column}: {e}"));

    let id: i64 = row.try_get("id").map_err(|e| corrupt("id", e))?;
    let price: i64 = row.try_get("price").map_err(|e| corrupt("price", e))?;

    Ok(Item {
        id: ItemId::new(id).map_err(|e| StoreError::Corrupt(e.to_string()))?,
        brand: row.try_get("brand").map_err(|e| corrupt("brand", e))?,
        category: row.try_get("category").map_err(|e| corrupt("category", e))?,
        price: u64::try_from(price)
            .map(Price::new)
            .map_err(|_| StoreError::Corrupt(format!("negative price {price} for item {id}")))?,
        created_at: row.try_get("created_at").map_err(|e| corrupt("created_at", e))?,
        updated_at: row.try_get("updated_at").map_err(|e| corrupt("updated_at", e))?,
    })
}

fn count_from_row(row: &PgRow) -> StoreResult<u64> {
    let total: i64 = row
        .try_get("total")
        .map_err(|e| StoreError::Corrupt(format!("total: {e}")))?;
    u64::try_from(total).map_err(|_| StoreError::Corrupt(format!("negative count {total}")))
}

fn price_to_db(price: Price) -> StoreResult<i64> {
    i64::try_from(price.amount())
        .map_err(|_| StoreError::Database(format!("price {price} exceeds column range")))
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code().map(|c| c.into_owned()).unwrap_or_default();
            StoreError::Database(format!(
                "database error in {operation} ({code}): {}",
                db_err.message()
            ))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Database(format!("connection pool closed in {operation}"))
        }
        sqlx::Error::RowNotFound => {
            StoreError::Database(format!("unexpected row not found in {operation}"))
        }
        sqlx::Error::ColumnDecode { .. } | sqlx::Error::ColumnNotFound(_) => {
            StoreError::Corrupt(format!("{operation}: {err}"))
        }
        _ => StoreError::Database(format!("sqlx error in {operation}: {err}")),
    }
}
