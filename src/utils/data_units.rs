//! Human-readable byte amounts.

/// Unit labels, in steps of 1024. There is intentionally no tier above GB.
const BYTE_UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

const KIBI_LIMIT_F64: f64 = 1024.0;

/// Returns `bytes` as text with two decimals and a binary unit, e.g. `"1.50 KB"`.
///
/// Values at or past a full unit move up a tier, so 1024 bytes is `"1.00 KB"`.
/// Anything past 1024 GB stays in GB.
pub fn bytes_to_text(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;

    while value >= KIBI_LIMIT_F64 && unit < BYTE_UNITS.len() - 1 {
        value /= KIBI_LIMIT_F64;
        unit += 1;
    }

    format!("{value:.2} {}", BYTE_UNITS[unit])
}

/// Returns a per-second rate as text, e.g. `"1.50 KB/sec"`.
pub fn rate_to_text(bytes_per_second: u64) -> String {
    format!("{}/sec", bytes_to_text(bytes_per_second))
}
