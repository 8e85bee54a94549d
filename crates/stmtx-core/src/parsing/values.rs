use rust_decimal::Decimal;
use std::str::FromStr;

const CURRENCY_MARKERS: &[&str] = &["₹", "INR", "Rs.", "Rs", "$"];

/// Parse an amount cell into a Decimal.
///
/// Handles formats like:
/// - "12,345.67" -> 12345.67
/// - "1,23,456.78" -> 123456.78 (lakh grouping)
/// - "₹250" / "INR 250.00" / "Rs. 250" -> 250
/// - "-15.00" -> -15.00
///
/// Returns None for empty or non-numeric text.
pub fn parse_amount(s: &str) -> Option<Decimal> {
    let mut text = s.trim();
    let negative = text.starts_with('-');
    if negative {
        text = text[1..].trim_start();
    }
    for marker in CURRENCY_MARKERS {
        if let Some(rest) = text.strip_prefix(marker) {
            text = rest.trim_start();
            break;
        }
    }

    let digits: String = text
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if digits.is_empty() || !digits.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let value = Decimal::from_str(&digits).ok()?;
    Some(if negative { -value } else { value })
}
