//! Price value object.
//!
//! Prices are compared by value and never mutated in place; to "change" one,
//! build a new one.

use core::iter::Sum;
use core::ops::Add;

use serde::{Deserialize, Serialize};

/// An item price in the smallest currency unit (won).
///
/// Arithmetic stays on raw integers; display formatting happens at the edge.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(u64);

impl Price {
    pub const ZERO: Price = Price(0);

    pub const fn new(amount: u64) -> Self {
        Self(amount)
    }

    pub const fn amount(self) -> u64 {
        self.0
    }
}

impl From<u64> for Price {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl core::fmt::Display for Price {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl Add for Price {
    type Output = Price;

    fn add(self, rhs: Price) -> Price {
        Price(self.0 + rhs.0)
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Price>>(iter: I) -> Price {
        iter.fold(Price::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Price> for Price {
    fn sum<I: Iterator<Item = &'a Price>>(iter: I) -> Price {
        iter.copied().sum()
    }
}
