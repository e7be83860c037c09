use std::sync::Arc;

use chrono::Utc;

use pricelens_infra::seed::seed_if_empty;
use pricelens_infra::{
    AppConfig, InMemoryItemStore, ItemService, ItemStore, PostgresItemStore, PriceQueries,
    ServiceResult,
};

/// The store every service shares, behind dynamic dispatch so the backend is
/// chosen at startup.
pub type SharedStore = Arc<dyn ItemStore>;

/// Services handed to every handler (via an `Extension<Arc<AppServices>>` layer).
#[derive(Clone)]
pub struct AppServices {
    pub prices: PriceQueries<SharedStore>,
    pub items: ItemService<SharedStore>,
}

impl AppServices {
    pub fn new(store: SharedStore) -> Self {
        Self {
            prices: PriceQueries::new(store.clone()),
            items: ItemService::new(store),
        }
    }

    /// Empty in-memory wiring (dev/test).
    pub fn in_memory() -> Self {
        Self::new(Arc::new(InMemoryItemStore::new()))
    }
}

/// Wire services from configuration: Postgres when `DATABASE_URL` is set,
/// in-memory otherwise; optionally load the sample catalog.
pub async fn build_services(config: &AppConfig) -> ServiceResult<AppServices> {
    let store: SharedStore = match &config.database_url {
        Some(url) => {
            let pg = PostgresItemStore::connect(url, config.database_max_connections).await?;
            pg.ensure_schema().await?;
            tracing::info!(max_connections = config.database_max_connections, "using postgres item store");
            Arc::new(pg)
        }
        None => {
            tracing::info!("DATABASE_URL not set; using in-memory item store");
            Arc::new(InMemoryItemStore::new())
        }
    };

    if config.seed_sample_data {
        seed_if_empty(&store, Utc::now()).await?;
    }

    Ok(AppServices::new(store))
}
