use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;

/// Currency symbol used on every rendered document
pub const DEFAULT_CURRENCY_SYMBOL: &str = "GH₵";

/// Parse user input into a decimal, coercing anything unusable to zero.
///
/// Thousands separators, surrounding whitespace and a leading currency symbol are
/// ignored, and exponent notation (`1e3`) is accepted. Negative values are clamped
/// to zero since quantities and prices on a document are never negative.
pub fn parse_amount(input: &str) -> Decimal {
  let cleaned: String = input
    .trim()
    .chars()
    .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | 'e' | 'E'))
    .collect();

  if cleaned.is_empty() {
    return Decimal::ZERO;
  }

  let value = Decimal::from_str(&cleaned)
    .or_else(|_| Decimal::from_scientific(&cleaned))
    .unwrap_or(Decimal::ZERO);

  if value.is_sign_negative() {
    Decimal::ZERO
  } else {
    value.normalize()
  }
}

/// Round half away from zero to two places, the way amounts are printed
pub fn round_money(value: Decimal) -> Decimal {
  value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Format a number with thousands separators and exactly two decimals: `1,234.50`
pub fn format_number(value: Decimal) -> String {
  let rounded = round_money(value);
  let negative = rounded.is_sign_negative() && !rounded.is_zero();
  let text = format!("{:.2}", rounded.abs());
  let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

  let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
  for (i, ch) in whole.chars().enumerate() {
    if i > 0 && (whole.len() - i) % 3 == 0 {
      grouped.push(',');
    }
    grouped.push(ch);
  }

  if negative {
    format!("-{}.{}", grouped, fraction)
  } else {
    format!("{}.{}", grouped, fraction)
  }
}

/// Format an amount with a currency symbol: `GH₵ 1,234.50`
pub fn format_currency(value: Decimal, symbol: &str) -> String {
  format!("{} {}", symbol, format_number(value))
}

/// Format a quantity without trailing zeros: `2`, `1.5`, `0.125`
pub fn format_quantity(value: Decimal) -> String {
  let normalized = value.normalize();
  if normalized.is_zero() {
    "0".to_string()
  } else {
    normalized.to_string()
  }
}
