//! Sample catalog used for demos and local development.

use chrono::{DateTime, Utc};
use tracing::info;

use pricelens_catalog::ItemDraft;
use pricelens_core::DomainResult;

use crate::error::ServiceResult;
use crate::store::ItemStore;

pub const SAMPLE_CATEGORIES: [&str; 8] =
    ["상의", "아우터", "바지", "스니커즈", "가방", "모자", "양말", "액세서리"];

/// Prices per brand, in `SAMPLE_CATEGORIES` order.
const SAMPLE_PRICES: [(&str, [u64; 8]); 9] = [
    ("A", [11_200, 5_500, 4_200, 9_000, 2_000, 1_700, 1_800, 2_300]),
    ("B", [10_500, 5_900, 3_800, 9_100, 2_100, 2_000, 2_000, 2_200]),
    ("C", [10_000, 6_200, 3_300, 9_200, 2_200, 1_900, 2_200, 2_100]),
    ("D", [10_100, 5_100, 3_000, 9_500, 2_500, 1_500, 2_400, 2_000]),
    ("E", [10_700, 5_000, 3_800, 9_900, 2_300, 1_800, 2_100, 2_100]),
    ("F", [11_200, 7_200, 4_000, 9_300, 2_100, 1_600, 2_300, 1_900]),
    ("G", [10_500, 5_800, 3_900, 9_000, 2_200, 1_700, 2_100, 2_000]),
    ("H", [10_800, 6_300, 3_100, 9_700, 2_100, 1_600, 2_000, 2_000]),
    ("I", [11_400, 6_700, 3_200, 9_500, 2_400, 1_700, 1_700, 2_400]),
];

/// The 72 sample items, brand by brand.
pub fn sample_catalog() -> DomainResult<Vec<ItemDraft>> {
    SAMPLE_PRICES
        .iter()
        .flat_map(|(brand, prices)| {
            SAMPLE_CATEGORIES
                .iter()
                .zip(prices)
                .map(move |(category, price)| ItemDraft::new(*brand, *category, *price))
        })
        .collect()
}

/// Insert the sample catalog unless the store already holds items.
///
/// Returns how many items were inserted.
pub async fn seed_if_empty<S: ItemStore>(store: &S, at: DateTime<Utc>) -> ServiceResult<usize> {
    if store.count().await? > 0 {
        info!("store not empty, skipping sample data");
        return Ok(0);
    }

    let drafts = sample_catalog()?;
    let inserted = drafts.len();
    for draft in drafts {
        store.insert(draft, at).await?;
    }

    info!(inserted, "sample catalog loaded");
    Ok(inserted)
}
