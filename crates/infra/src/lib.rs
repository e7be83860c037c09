//! Infrastructure layer: item storage, services, config, sample data.

pub mod config;
pub mod error;
pub mod items;
pub mod pricing;
pub mod seed;
pub mod store;

pub use config::{AppConfig, ConfigError};
pub use error::{ServiceError, ServiceResult};
pub use items::ItemService;
pub use pricing::PriceQueries;
pub use store::{
    InMemoryItemStore, ItemStore, Page, PageRequest, PostgresItemStore, StoreError, StoreResult,
};
