/// Placeholder shown for a monetary figure that was never filled in.
pub const MISSING: &str = "N/A";

/// Formats a free-text monetary figure as whole Argentine pesos.
///
/// # Arguments
///
/// * `raw` - The value as typed or imported. Everything except digits, `-`
///   and `.` is stripped before parsing.
///
/// # Returns
///
/// `"N/A"` for an empty or `"N/A"` input, `"$ 150.000"` style text for a
/// parseable number (es-AR grouping, no decimals, non-breaking space after
/// the sign), and the raw text unchanged when nothing numeric remains.
pub fn format_currency(raw: &str) -> String {
    if raw.is_empty() || raw == MISSING {
        return MISSING.to_string();
    }

    let numeric: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '-' || *c == '.')
        .collect();

    match parse_number(&numeric) {
        Some(value) => format_pesos(value),
        None => raw.to_string(),
    }
}

fn parse_number(numeric: &str) -> Option<f64> {
    if !numeric.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    numeric.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn format_pesos(value: f64) -> String {
    let rounded = value.round();
    let sign = if rounded < 0.0 { "-" } else { "" };
    format!("{}$\u{a0}{}", sign, group_thousands(rounded.abs()))
}

// Dot-grouped integer part, e.g. 1234567 -> "1.234.567".
fn group_thousands(whole: f64) -> String {
    let digits = format!("{:.0}", whole);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    grouped
}
