//! Cell-text to number conversion.
//!
//! [`normalize_number`] is total: every input maps to a finite `f64` or to
//! `None`, the null sentinel used for per-field data-quality gaps.

/// Convert raw cell text into a number, or `None` when the cell carries no value.
///
/// Thousands separators are removed, only the leading whitespace-delimited
/// token is considered, and a token made only of dashes is the "no data"
/// placeholder.
pub fn normalize_number(raw: Option<&str>) -> Option<f64> {
    let raw = raw?;
    let cleaned = raw.replace(',', "");
    let token = cleaned.split_whitespace().next()?;

    if is_placeholder(token) {
        return None;
    }

    token
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

/// Convert a normalized number into a share volume.
pub fn normalize_volume(raw: Option<&str>) -> Option<u64> {
    let value = normalize_number(raw)?;
    if value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return None;
    }
    Some(value as u64)
}

fn is_placeholder(token: &str) -> bool {
    token.chars().all(|ch| matches!(ch, '-' | '\u{2013}' | '\u{2014}'))
}
