use rust_decimal::{Decimal, RoundingStrategy};

pub const STORE_CURRENCY: &str = "MXN";

/// Price after applying a percent discount.
///
/// A zero discount returns `price` untouched; any other discount is rounded
/// to cents. The discount is not range-checked here: drafts are validated
/// before they reach the store, and reads pass values through as stored.
pub fn final_price(price: Decimal, discount_pct: Decimal) -> Decimal {
    if discount_pct.is_zero() {
        return price;
    }

    (price * (Decimal::ONE - discount_pct / Decimal::ONE_HUNDRED))
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

pub fn has_discount(discount_pct: Decimal) -> bool {
    discount_pct > Decimal::ZERO
}

/// Renders `1234.5` as `$1,234.50 MXN`.
///
/// Digits and grouping follow es-MX formatting. Unlike the storefront pages,
/// which print `$1,234.50`, the currency code is always appended.
pub fn format_currency(amount: Decimal, currency: &str) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let plain = format!("{:.2}", rounded.abs());
    let (whole, cents) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if rounded < Decimal::ZERO { "-" } else { "" };
    format!("{sign}${grouped}.{cents} {currency}")
}
