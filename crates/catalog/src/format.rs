//! Display formatting for prices.
//!
//! Prices leave the service as strings with `,` thousands separators
//! (`60000` -> `"60,000"`). Arithmetic never goes through these strings.

use pricelens_core::Price;

/// Format a price for display.
pub fn format_price(price: Price) -> String {
    format_amount(price.amount())
}

/// Format a number with thousand separators (e.g., 1234567 -> "1,234,567").
pub fn format_amount(n: u64) -> String {
    let s = n.to_string();
    let len = s.len();
    let mut result = String::with_capacity(len + len / 3);

    // Digits are ASCII, so byte indexing is safe
    for (i, ch) in s.bytes().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch as char);
    }

    result
}
