//! Fixed-precision string formatting for wire values
//!
//! Prices carry 8 fractional digits, amounts 2, and percentage changes an
//! explicit sign. Volumes collapse to a human-readable magnitude.

/// Format a price with 8 fractional digits, e.g. `0.00030300`.
pub fn format_price(price: f64) -> String {
    format!("{price:.8}")
}

/// Format an order amount with 2 fractional digits, e.g. `1204.50`.
pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Format a percentage change with explicit sign, e.g. `+11.26%`.
pub fn format_change(change: f64) -> String {
    format!("{change:+.2}%")
}

/// Human-readable magnitude for 24h volumes: `157K`, `12.8M`, `273`.
pub fn format_volume(volume: u64) -> String {
    const UNITS: [(f64, &str); 3] = [(1e9, "B"), (1e6, "M"), (1e3, "K")];
    for (unit, suffix) in UNITS {
        if volume as f64 >= unit {
            let scaled = volume as f64 / unit;
            return if scaled == scaled.trunc() {
                format!("{}{}", scaled as u64, suffix)
            } else {
                format!("{scaled:.1}{suffix}")
            };
        }
    }
    volume.to_string()
}
