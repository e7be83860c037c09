//! Strongly-typed identifiers used across the domain.

use core::str::FromStr;
use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Identifier of a catalog item.
///
/// Assigned by the item store in insertion order; always positive and never
/// reused after a delete.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(i64);

impl ItemId {
    /// Wrap a raw store id. Rejects zero and negative values.
    pub fn new(raw: i64) -> Result<Self, DomainError> {
        if raw <= 0 {
            return Err(DomainError::invalid_id(format!("ItemId: {raw} is not positive")));
        }
        Ok(Self(raw))
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl From<ItemId> for i64 {
    fn from(value: ItemId) -> Self {
        value.0
    }
}

impl TryFrom<i64> for ItemId {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s
            .trim()
            .parse::<i64>()
            .map_err(|e| DomainError::invalid_id(format!("ItemId: {e}")))?;
        Self::new(raw)
    }
}
