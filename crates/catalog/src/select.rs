//! Tie-break selection over items.
//!
//! Every aggregate and every store-side min/max goes through these two
//! functions so there is exactly one definition of each tie-break:
//!
//! - cheapest: lowest price, then most recently updated;
//! - priciest: highest price, then least recently updated.
//!
//! When price and `updated_at` both tie, the item seen first wins.

use crate::item::Item;

/// Lowest price; ties go to the most recently updated item.
pub fn cheapest_newest<'a, I>(items: I) -> Option<&'a Item>
where
    I: IntoIterator<Item = &'a Item>,
{
    items.into_iter().fold(None, |best, item| match best {
        Some(current) if !undercuts(item, current) => Some(current),
        _ => Some(item),
    })
}

/// Highest price; ties go to the least recently updated item.
pub fn priciest_oldest<'a, I>(items: I) -> Option<&'a Item>
where
    I: IntoIterator<Item = &'a Item>,
{
    items.into_iter().fold(None, |best, item| match best {
        Some(current) if !outprices(item, current) => Some(current),
        _ => Some(item),
    })
}

fn undercuts(candidate: &Item, current: &Item) -> bool {
    candidate.price < current.price
        || (candidate.price == current.price && candidate.updated_at > current.updated_at)
}

fn outprices(candidate: &Item, current: &Item) -> bool {
    candidate.price > current.price
        || (candidate.price == current.price && candidate.updated_at < current.updated_at)
}
