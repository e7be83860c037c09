//! Catalog domain module.
//!
//! This crate contains the item model and the price-aggregation queries,
//! implemented as deterministic domain logic with no IO or storage.

pub mod aggregate;
pub mod format;
pub mod item;
pub mod select;

pub use aggregate::{
    BrandCoverage, BrandPrice, CategoryLowest, CategoryPrice, CategoryPriceRange,
    CheapestPerCategory, category_price_range, cheapest_full_coverage_brand,
    cheapest_per_category, distinct_categories,
};
pub use format::{format_amount, format_price};
pub use item::{Item, ItemDraft, ItemInput, RawField, MAX_BRAND_LEN, MAX_CATEGORY_LEN, MAX_PRICE};
pub use select::{cheapest_newest, priciest_oldest};
