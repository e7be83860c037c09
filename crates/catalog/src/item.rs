use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use pricelens_core::{DomainError, DomainResult, ItemId, Price};

/// Longest accepted brand name, in characters.
pub const MAX_BRAND_LEN: usize = 100;

/// Longest accepted category name, in characters.
pub const MAX_CATEGORY_LEN: usize = 50;

/// Highest accepted price on write (the upstream catalog stored prices in a
/// 32-bit column).
pub const MAX_PRICE: u64 = i32::MAX as u64;

/// A priced catalog record (brand × category × price).
///
/// Items are owned by the store; everything outside it works on copies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub brand: String,
    pub category: String,
    pub price: Price,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Materialize a freshly inserted item.
    pub fn create(id: ItemId, draft: ItemDraft, at: DateTime<Utc>) -> Self {
        Self {
            id,
            brand: draft.brand,
            category: draft.category,
            price: draft.price,
            created_at: at,
            updated_at: at,
        }
    }

    /// Replace brand, category and price in place. `id` and `created_at` are
    /// preserved; `updated_at` moves to `at`.
    pub fn revise(&mut self, draft: ItemDraft, at: DateTime<Utc>) {
        self.brand = draft.brand;
        self.category = draft.category;
        self.price = draft.price;
        self.updated_at = at;
    }
}

/// Validated write payload for create/update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    brand: String,
    category: String,
    price: Price,
}

impl ItemDraft {
    /// Validate and build a draft from already-present fields.
    pub fn new(brand: impl Into<String>, category: impl Into<String>, price: u64) -> DomainResult<Self> {
        ItemInput {
            brand: RawField::Present(brand.into()),
            category: RawField::Present(category.into()),
            price: RawField::Present(i64::try_from(price).unwrap_or(i64::MAX)),
        }
        .validate()
    }

    pub fn brand(&self) -> &str {
        &self.brand
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn price(&self) -> Price {
        self.price
    }
}

/// One field of a loosely typed payload, before validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RawField<T> {
    /// Absent or `null`.
    #[default]
    Missing,
    Present(T),
    /// Present, but not of the expected type.
    WrongType,
}

impl<T> From<T> for RawField<T> {
    fn from(value: T) -> Self {
        RawField::Present(value)
    }
}

/// Raw, possibly incomplete write input as it arrives from a caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemInput {
    pub brand: RawField<String>,
    pub category: RawField<String>,
    pub price: RawField<i64>,
}

impl ItemInput {
    /// Check every field and report all violations at once.
    ///
    /// Violations are listed as `"<field>: <reason>"` in field order
    /// (brand, category, price) and joined with `", "`.
    pub fn validate(self) -> DomainResult<ItemDraft> {
        let mut violations: Vec<String> = Vec::new();

        let brand = required_text(self.brand, "brand", MAX_BRAND_LEN, &mut violations);
        let category = required_text(self.category, "category", MAX_CATEGORY_LEN, &mut violations);

        let price = match self.price {
            RawField::Missing => {
                violations.push("price: price is required".to_string());
                None
            }
            RawField::WrongType => {
                violations.push("price: must be an integer".to_string());
                None
            }
            RawField::Present(p) if p <= 0 => {
                violations.push("price: must be greater than 0".to_string());
                None
            }
            RawField::Present(p) if p as u64 > MAX_PRICE => {
                violations.push(format!("price: must be at most {}", crate::format_amount(MAX_PRICE)));
                None
            }
            RawField::Present(p) => Some(Price::new(p as u64)),
        };

        match (brand, category, price) {
            (Some(brand), Some(category), Some(price)) if violations.is_empty() => {
                Ok(ItemDraft { brand, category, price })
            }
            _ => Err(DomainError::validation(violations.join(", "))),
        }
    }
}

fn required_text(
    value: RawField<String>,
    field: &str,
    max_len: usize,
    violations: &mut Vec<String>,
) -> Option<String> {
    let value = match value {
        RawField::Present(value) => value,
        RawField::Missing => String::new(),
        RawField::WrongType => {
            violations.push(format!("{field}: must be a string"));
            return None;
        }
    };
    let trimmed = value.trim();
    if trimmed.is_empty() {
        violations.push(format!("{field}: {field} is required"));
        return None;
    }
    if trimmed.chars().count() > max_len {
        violations.push(format!("{field}: must be at most {max_len} characters"));
        return None;
    }
    Some(trimmed.to_string())
}
