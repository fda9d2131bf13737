// Currency amounts are plain f64 dollars, rounded to cents at every boundary.

pub fn round_to_cents(value: f64) -> f64 {
    ((value + f64::EPSILON) * 100.0).round() / 100.0
}

/// Rounds to cents, then clamps into `[min, max]`.
pub fn clamp_currency(value: f64, min: f64, max: f64) -> f64 {
    round_to_cents(value).max(min).min(max)
}

pub fn format_currency(amount: f64) -> String {
    format!("${:.2}", amount)
}
