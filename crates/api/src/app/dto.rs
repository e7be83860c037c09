use serde::Deserialize;
use serde_json::{json, Value};

use pricelens_catalog::{
    format_price, BrandCoverage, BrandPrice, CategoryPriceRange, CheapestPerCategory, Item,
    ItemInput, RawField,
};
use pricelens_infra::Page;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /items` and `PUT /items/:id`.
///
/// Fields are kept as raw JSON so missing and mistyped fields are reported
/// together by validation instead of failing decoding on the first one.
#[derive(Debug, Deserialize)]
pub struct ItemRequest {
    #[serde(default)]
    pub brand: Value,
    #[serde(default)]
    pub category: Value,
    #[serde(default)]
    pub price: Value,
}

impl From<ItemRequest> for ItemInput {
    fn from(req: ItemRequest) -> Self {
        ItemInput {
            brand: text_field(req.brand),
            category: text_field(req.category),
            price: integer_field(req.price),
        }
    }
}

fn text_field(value: Value) -> RawField<String> {
    match value {
        Value::Null => RawField::Missing,
        Value::String(s) => RawField::Present(s),
        _ => RawField::WrongType,
    }
}

/// Integers beyond `i64` saturate so they fail the upper price bound.
fn integer_field(value: Value) -> RawField<i64> {
    match value {
        Value::Null => RawField::Missing,
        Value::Number(n) if n.is_i64() => n.as_i64().map_or(RawField::WrongType, RawField::Present),
        Value::Number(n) if n.is_u64() => RawField::Present(i64::MAX),
        _ => RawField::WrongType,
    }
}

#[derive(Debug, Deserialize)]
pub struct ListItemsQuery {
    pub page: Option<u32>,
    pub size: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct CategoryQuery {
    pub category: Option<String>,
}

// -------------------------
// Response mapping
// -------------------------

pub fn item_to_json(item: &Item) -> Value {
    json!({
        "id": item.id.get(),
        "brand": item.brand,
        "category": item.category,
        "price": format_price(item.price),
        "created_at": item.created_at.to_rfc3339(),
        "updated_at": item.updated_at.to_rfc3339(),
    })
}

pub fn item_page_to_json(page: &Page<Item>) -> Value {
    json!({
        "items": page.items.iter().map(item_to_json).collect::<Vec<_>>(),
        "page": page.page,
        "size": page.size,
        "total_items": page.total_items,
        "total_pages": page.total_pages(),
    })
}

pub fn cheapest_per_category_to_json(result: &CheapestPerCategory) -> Value {
    json!({
        "items": result
            .entries
            .iter()
            .map(|e| json!({
                "category": e.category,
                "brand": e.brand,
                "price": format_price(e.price),
            }))
            .collect::<Vec<_>>(),
        "total": format_price(result.total),
    })
}

pub fn lowest_brand_to_json(coverage: Option<&BrandCoverage>) -> Value {
    let lowest_brand = coverage.map(|c| {
        json!({
            "brand": c.brand,
            "categories": c
                .categories
                .iter()
                .map(|cp| json!({
                    "category": cp.category,
                    "price": format_price(cp.price),
                }))
                .collect::<Vec<_>>(),
            "total": format_price(c.total),
        })
    });

    json!({ "lowest_brand": lowest_brand })
}

pub fn price_range_to_json(range: &CategoryPriceRange) -> Value {
    json!({
        "category": range.category,
        "lowest": brand_prices_to_json(&range.lowest),
        "highest": brand_prices_to_json(&range.highest),
    })
}

fn brand_prices_to_json(entries: &[BrandPrice]) -> Vec<Value> {
    entries
        .iter()
        .map(|bp| json!({ "brand": bp.brand, "price": format_price(bp.price) }))
        .collect()
}
