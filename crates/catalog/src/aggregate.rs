//! Price aggregation queries.
//!
//! All functions here are pure: they read a snapshot of items and never
//! mutate it, so concurrent callers need no coordination.

use std::collections::BTreeMap;

use pricelens_core::{DomainError, DomainResult, Price};

use crate::item::Item;
use crate::select::{cheapest_newest, priciest_oldest};

/// Cheapest offer found for one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryLowest {
    pub category: String,
    pub brand: String,
    pub price: Price,
}

/// Answer to "cheapest item per category, and what does the basket cost".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheapestPerCategory {
    /// One entry per distinct category, ascending by category name.
    pub entries: Vec<CategoryLowest>,
    pub total: Price,
}

/// A category and the price paid for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPrice {
    pub category: String,
    pub price: Price,
}

/// The single brand that covers every category most cheaply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandCoverage {
    pub brand: String,
    /// Ascending by category name.
    pub categories: Vec<CategoryPrice>,
    pub total: Price,
}

/// A brand and one of its prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrandPrice {
    pub brand: String,
    pub price: Price,
}

/// Cheapest and most expensive offer inside one category.
///
/// `lowest` and `highest` are lists so several winners could be reported
/// later; today each holds exactly one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryPriceRange {
    pub category: String,
    pub lowest: Vec<BrandPrice>,
    pub highest: Vec<BrandPrice>,
}

impl CategoryPriceRange {
    /// Build the range from already-selected extremes.
    ///
    /// Fails with `NotFound` when neither extreme exists (the category emptied
    /// out between validation and lookup).
    pub fn from_extremes(
        category: impl Into<String>,
        lowest: Option<&Item>,
        highest: Option<&Item>,
    ) -> DomainResult<Self> {
        if lowest.is_none() && highest.is_none() {
            return Err(DomainError::not_found("no items for category"));
        }

        Ok(Self {
            category: category.into(),
            lowest: lowest.map(brand_price).into_iter().collect(),
            highest: highest.map(brand_price).into_iter().collect(),
        })
    }
}

fn brand_price(item: &Item) -> BrandPrice {
    BrandPrice {
        brand: item.brand.clone(),
        price: item.price,
    }
}

/// Distinct categories present in `items`, ascending.
pub fn distinct_categories(items: &[Item]) -> Vec<String> {
    let mut categories: Vec<String> = items.iter().map(|i| i.category.clone()).collect();
    categories.sort();
    categories.dedup();
    categories
}

/// Group items by category, preserving the input order inside each group.
fn by_category(items: &[Item]) -> BTreeMap<&str, Vec<&Item>> {
    let mut groups: BTreeMap<&str, Vec<&Item>> = BTreeMap::new();
    for item in items {
        groups.entry(item.category.as_str()).or_default().push(item);
    }
    groups
}

/// Cheapest item of every category plus the summed total.
///
/// Ties on price go to the most recently updated item.
pub fn cheapest_per_category(items: &[Item]) -> CheapestPerCategory {
    let entries: Vec<CategoryLowest> = by_category(items)
        .into_iter()
        .filter_map(|(category, group)| {
            cheapest_newest(group).map(|item| CategoryLowest {
                category: category.to_string(),
                brand: item.brand.clone(),
                price: item.price,
            })
        })
        .collect();

    let total = entries.iter().map(|e| e.price).sum();
    CheapestPerCategory { entries, total }
}

/// The brand whose cheapest-per-category basket over *all* `categories` costs
/// the least, or `None` when no brand stocks every category.
///
/// Brands are visited in ascending name order and only a strictly smaller
/// total replaces the current best, so on equal totals the alphabetically
/// first brand wins.
pub fn cheapest_full_coverage_brand(items: &[Item], categories: &[String]) -> Option<BrandCoverage> {
    if items.is_empty() || categories.is_empty() {
        return None;
    }

    let mut required: Vec<&str> = categories.iter().map(String::as_str).collect();
    required.sort_unstable();
    required.dedup();

    let mut by_brand: BTreeMap<&str, Vec<&Item>> = BTreeMap::new();
    for item in items {
        by_brand.entry(item.brand.as_str()).or_default().push(item);
    }

    let mut best: Option<BrandCoverage> = None;

    for (brand, brand_items) in by_brand {
        let Some(basket) = brand_basket(&brand_items, &required) else {
            continue;
        };
        let total: Price = basket.iter().map(|c| c.price).sum();

        if best.as_ref().is_none_or(|b| total < b.total) {
            best = Some(BrandCoverage {
                brand: brand.to_string(),
                categories: basket,
                total,
            });
        }
    }

    best
}

/// The brand's cheapest offer in each required category, or `None` as soon
/// as one category is missing.
fn brand_basket(brand_items: &[&Item], required: &[&str]) -> Option<Vec<CategoryPrice>> {
    let mut basket = Vec::with_capacity(required.len());
    for &category in required {
        let cheapest = cheapest_newest(
            brand_items
                .iter()
                .copied()
                .filter(|item| item.category == category),
        )?;
        basket.push(CategoryPrice {
            category: category.to_string(),
            price: cheapest.price,
        });
    }
    Some(basket)
}

/// Lowest and highest offer in `category`.
///
/// The caller is expected to have checked that the category exists; an empty
/// match here is reported as `NotFound`.
pub fn category_price_range(items: &[Item], category: &str) -> DomainResult<CategoryPriceRange> {
    let in_category = || items.iter().filter(move |item| item.category == category);
    CategoryPriceRange::from_extremes(
        category,
        cheapest_newest(in_category()),
        priciest_oldest(in_category()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::ItemDraft;
    use chrono::{DateTime, TimeZone, Utc};
    use pricelens_core::ItemId;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn item(id: i64, brand: &str, category: &str, price: u64) -> Item {
        Item::create(
            ItemId::new(id).unwrap(),
            ItemDraft::new(brand, category, price).unwrap(),
            at(id),
        )
    }

    /// Two brands over 상의/하의/신발.
    fn reference_items() -> Vec<Item> {
        vec![
            item(1, "A", "상의", 10_000),
            item(2, "B", "상의", 15_000),
            item(3, "A", "하의", 20_000),
            item(4, "B", "하의", 18_000),
            item(5, "A", "신발", 30_000),
            item(6, "B", "신발", 28_000),
        ]
    }

    fn categories_of(items: &[Item]) -> Vec<String> {
        distinct_categories(items)
    }

    #[test]
    fn distinct_categories_are_sorted_and_unique() {
        assert_eq!(categories_of(&reference_items()), vec!["상의", "신발", "하의"]);
    }

    #[test]
    fn cheapest_per_category_reference_scenario() {
        let result = cheapest_per_category(&reference_items());

        let got: Vec<(&str, &str, u64)> = result
            .entries
            .iter()
            .map(|e| (e.category.as_str(), e.brand.as_str(), e.price.amount()))
            .collect();
        assert_eq!(
            got,
            vec![("상의", "A", 10_000), ("신발", "B", 28_000), ("하의", "B", 18_000)]
        );
        assert_eq!(result.total, Price::new(56_000));
    }

    #[test]
    fn cheapest_per_category_on_empty_input() {
        let result = cheapest_per_category(&[]);
        assert!(result.entries.is_empty());
        assert_eq!(result.total, Price::ZERO);
    }

    #[test]
    fn cheapest_per_category_prefers_newest_on_price_tie() {
        let mut older = item(1, "old", "상의", 5_000);
        let mut newer = item(2, "new", "상의", 5_000);
        older.updated_at = at(100);
        newer.updated_at = at(200);

        let result = cheapest_per_category(&[older, newer]);
        assert_eq!(result.entries[0].brand, "new");
    }

    #[test]
    fn full_coverage_reference_scenario_picks_a() {
        let items = reference_items();
        let winner = cheapest_full_coverage_brand(&items, &categories_of(&items)).unwrap();

        assert_eq!(winner.brand, "A");
        let got: Vec<(&str, u64)> = winner
            .categories
            .iter()
            .map(|c| (c.category.as_str(), c.price.amount()))
            .collect();
        assert_eq!(got, vec![("상의", 10_000), ("신발", 30_000), ("하의", 20_000)]);
        assert_eq!(winner.total, Price::new(60_000));
    }

    #[test]
    fn full_coverage_uses_each_brands_cheapest_duplicate() {
        let mut items = reference_items();
        // B gets a second, cheaper 상의: 61,000 - 15,000 + 1,000 = 47,000.
        items.push(item(7, "B", "상의", 1_000));

        let winner = cheapest_full_coverage_brand(&items, &categories_of(&items)).unwrap();
        assert_eq!(winner.brand, "B");
        assert_eq!(winner.total, Price::new(47_000));
    }

    #[test]
    fn full_coverage_disqualifies_brands_missing_a_category() {
        let items = vec![
            item(1, "A", "상의", 1_000),
            item(2, "B", "상의", 2_000),
            item(3, "B", "하의", 2_000),
        ];
        let winner = cheapest_full_coverage_brand(&items, &categories_of(&items)).unwrap();
        assert_eq!(winner.brand, "B");
        assert_eq!(winner.total, Price::new(4_000));
    }

    #[test]
    fn full_coverage_is_none_when_nobody_covers_everything() {
        let items = vec![item(1, "A", "상의", 1_000), item(2, "B", "하의", 2_000)];
        assert!(cheapest_full_coverage_brand(&items, &categories_of(&items)).is_none());
    }

    #[test]
    fn full_coverage_is_none_for_empty_inputs() {
        assert!(cheapest_full_coverage_brand(&[], &["상의".to_string()]).is_none());
        assert!(cheapest_full_coverage_brand(&reference_items(), &[]).is_none());
    }

    #[test]
    fn full_coverage_tie_goes_to_alphabetically_first_brand() {
        let items = vec![
            item(1, "Z", "상의", 1_000),
            item(2, "M", "상의", 1_000),
        ];
        let winner = cheapest_full_coverage_brand(&items, &categories_of(&items)).unwrap();
        assert_eq!(winner.brand, "M");
    }

    #[test]
    fn range_for_single_item_category_is_that_item_twice() {
        let items = vec![item(1, "A", "모자", 1_700), item(2, "B", "상의", 10_000)];
        let range = category_price_range(&items, "모자").unwrap();

        let only = BrandPrice { brand: "A".to_string(), price: Price::new(1_700) };
        assert_eq!(range.category, "모자");
        assert_eq!(range.lowest, vec![only.clone()]);
        assert_eq!(range.highest, vec![only]);
    }

    #[test]
    fn range_equal_prices_use_newest_for_lowest_and_oldest_for_highest() {
        let mut older = item(1, "old", "상의", 9_000);
        let mut newer = item(2, "new", "상의", 9_000);
        older.updated_at = at(10);
        newer.updated_at = at(20);

        let range = category_price_range(&[older, newer], "상의").unwrap();
        assert_eq!(range.lowest[0].brand, "new");
        assert_eq!(range.highest[0].brand, "old");
    }

    #[test]
    fn range_picks_extremes() {
        let range = category_price_range(&reference_items(), "하의").unwrap();
        assert_eq!(range.lowest, vec![BrandPrice { brand: "B".into(), price: Price::new(18_000) }]);
        assert_eq!(range.highest, vec![BrandPrice { brand: "A".into(), price: Price::new(20_000) }]);
    }

    #[test]
    fn range_for_category_without_items_is_not_found() {
        let err = category_price_range(&reference_items(), "가방").unwrap_err();
        assert_eq!(err, DomainError::not_found("no items for category"));
    }

    #[cfg(test)]
    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        fn arb_items() -> impl Strategy<Value = Vec<Item>> {
            prop::collection::vec(
                (
                    prop::sample::select(vec!["A", "B", "C", "D"]),
                    prop::sample::select(vec!["상의", "하의", "신발", "가방"]),
                    1u64..100_000,
                    0i64..50,
                ),
                0..40,
            )
            .prop_map(|rows| {
                rows.into_iter()
                    .enumerate()
                    .map(|(idx, (brand, category, price, updated))| {
                        let mut it = item(idx as i64 + 1, brand, category, price);
                        it.updated_at = at(updated);
                        it
                    })
                    .collect()
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 500,
                ..ProptestConfig::default()
            })]

            /// Property: one entry per category, and the total is the sum of the entries.
            #[test]
            fn cheapest_per_category_covers_each_category_once(items in arb_items()) {
                let result = cheapest_per_category(&items);
                let categories = distinct_categories(&items);

                let got: Vec<String> = result.entries.iter().map(|e| e.category.clone()).collect();
                prop_assert_eq!(got, categories);

                let sum: u64 = result.entries.iter().map(|e| e.price.amount()).sum();
                prop_assert_eq!(result.total.amount(), sum);

                for entry in &result.entries {
                    let min = items
                        .iter()
                        .filter(|i| i.category == entry.category)
                        .map(|i| i.price)
                        .min()
                        .unwrap();
                    prop_assert_eq!(entry.price, min);
                }
            }

            /// Property: the winner covers everything and no covering brand is cheaper.
            #[test]
            fn full_coverage_winner_is_minimal(items in arb_items()) {
                let categories = distinct_categories(&items);
                let winner = cheapest_full_coverage_brand(&items, &categories);

                let brand_total = |brand: &str| -> Option<u64> {
                    categories
                        .iter()
                        .map(|c| {
                            items
                                .iter()
                                .filter(|i| i.brand == brand && &i.category == c)
                                .map(|i| i.price.amount())
                                .min()
                        })
                        .sum()
                };

                let mut brands: Vec<&str> = items.iter().map(|i| i.brand.as_str()).collect();
                brands.sort_unstable();
                brands.dedup();
                let covering: Vec<u64> = brands.iter().filter_map(|b| brand_total(*b)).collect();

                match winner {
                    None => prop_assert!(covering.is_empty()),
                    Some(w) => {
                        prop_assert_eq!(Some(w.total.amount()), brand_total(w.brand.as_str()));
                        prop_assert_eq!(w.categories.len(), categories.len());
                        for total in covering {
                            prop_assert!(w.total.amount() <= total);
                        }
                    }
                }
            }

            /// Property: lowest never exceeds highest inside a category.
            #[test]
            fn range_lowest_not_above_highest(items in arb_items()) {
                for category in distinct_categories(&items) {
                    let range = category_price_range(&items, &category).unwrap();
                    prop_assert_eq!(range.lowest.len(), 1);
                    prop_assert_eq!(range.highest.len(), 1);
                    prop_assert!(range.lowest[0].price <= range.highest[0].price);
                }
            }
        }
    }
}
