//! Money rendering for tables and summaries.

/// Currency used when a row carries none.
pub const DEFAULT_CURRENCY: &str = "ILS";

fn symbol(currency: &str) -> Option<&'static str> {
    match currency.to_ascii_uppercase().as_str() {
        "ILS" => Some("₪"),
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        _ => None,
    }
}

/// Formats `amount` with two decimals and thousands separators.
///
/// Known currencies get their symbol as a prefix; others get the code as a
/// suffix. An empty currency means [`DEFAULT_CURRENCY`].
///
/// ```
/// use projectdesk::money::format_money;
///
/// assert_eq!(format_money(1234567.891, "ILS"), "₪1,234,567.89");
/// assert_eq!(format_money(-5.0, "CHF"), "-5.00 CHF");
/// ```
#[must_use]
pub fn format_money(amount: f64, currency: &str) -> String {
    let currency = if currency.trim().is_empty() { DEFAULT_CURRENCY } else { currency.trim() };
    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let grouped = group_thousands(whole);
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    match symbol(currency) {
        Some(sym) => format!("{sign}{sym}{grouped}.{cents}"),
        None => format!("{sign}{grouped}.{cents} {}", currency.to_ascii_uppercase()),
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Sum of optional amounts, treating missing values as zero.
#[must_use]
pub fn total<I: IntoIterator<Item = Option<f64>>>(amounts: I) -> f64 {
    amounts.into_iter().flatten().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_and_rounds() {
        assert_eq!(format_money(0.0, "ILS"), "₪0.00");
        assert_eq!(format_money(999.999, "ILS"), "₪1,000.00");
        assert_eq!(format_money(12345.5, "usd"), "$12,345.50");
    }

    #[test]
    fn empty_currency_defaults_to_shekel() {
        assert_eq!(format_money(10.0, ""), "₪10.00");
    }

    #[test]
    fn negative_and_unknown_currency() {
        assert_eq!(format_money(-1234.0, "EUR"), "-€1,234.00");
        assert_eq!(format_money(42.0, "chf"), "42.00 CHF");
        assert_eq!(format_money(-0.001, "ILS"), "₪0.00");
    }

    #[test]
    fn total_skips_missing() {
        assert!((total([Some(1.5), None, Some(2.5)]) - 4.0).abs() < f64::EPSILON);
    }
}
