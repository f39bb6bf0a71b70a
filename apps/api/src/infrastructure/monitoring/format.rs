//! Fixed-precision rendering used by the operator-facing documents.

use std::time::Duration;

/// `10.0` -> `"10.00%"`
pub fn percent(value: f64) -> String {
    format!("{:.2}%", value)
}

/// `Duration::from_millis(1500)` -> `"1.500s"`
pub fn seconds(duration: Duration) -> String {
    format!("{:.3}s", duration.as_secs_f64())
}

/// Coarse uptime: `"3:04:05"`, or `"2 days, 3:04:05"` past the first day.
pub fn uptime(duration: Duration) -> String {
    let total = duration.as_secs();
    let days = total / 86_400;
    let hours = (total % 86_400) / 3_600;
    let minutes = (total % 3_600) / 60;
    let secs = total % 60;

    match days {
        0 => format!("{}:{:02}:{:02}", hours, minutes, secs),
        1 => format!("1 day, {}:{:02}:{:02}", hours, minutes, secs),
        _ => format!("{} days, {}:{:02}:{:02}", days, hours, minutes, secs),
    }
}

/// `1234567` -> `"1,234,567"`
pub fn thousands(value: i64) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        out.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
