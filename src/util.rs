use chrono::Utc;

/// Current time as epoch milliseconds, the unit every persisted timestamp
/// uses.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Lowercase and strip everything non-alphabetic; submissions and target
/// words are compared in this shape.
pub fn normalize_guess(input: &str) -> String {
    input
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Render remaining seconds as `m:ss`, clamped at zero.
pub fn format_clock(seconds: f64) -> String {
    let total = seconds.max(0.0).ceil() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
