/// Money is represented as integer cents to avoid floating-point precision issues.
/// 1 unit = 100 cents, so a 100.00 charge is 10000 cents.
pub type Cents = i64;

/// Format cents as a human-readable amount.
/// Example: 10000 -> "100.00", -1234 -> "-12.34"
pub fn format_cents(cents: Cents) -> String {
    let sign = if cents < 0 { "-" } else { "" };
    let abs_cents = cents.abs();
    let units = abs_cents / 100;
    let remainder = abs_cents % 100;
    format!("{}{}.{:02}", sign, units, remainder)
}

/// Convert cents to the decimal amount used in stored documents (`monto`).
/// Example: 10000 -> 100.0
pub fn cents_to_decimal(cents: Cents) -> f64 {
    cents as f64 / 100.0
}
