// Numeric display formatting.

/// Shown wherever a reading is missing or unusable.
pub const PLACEHOLDER: &str = "--";

/// Format a reading to one decimal with its unit, e.g. `229.6 V`.
///
/// `None`, NaN and infinities render as `-- {unit}`.
pub fn format_reading(value: Option<f64>, unit: &str) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:.1} {unit}"),
        _ => format!("{PLACEHOLDER} {unit}"),
    }
}
