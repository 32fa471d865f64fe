//! Display formatting for prices and percent changes.

use num_format::{Locale, ToFormattedString};

/// Format a USD amount with thousands separators.
///
/// Amounts of at least 1 get exactly two fraction digits. Smaller amounts keep
/// up to six fraction digits (never fewer than two) so sub-dollar assets stay readable.
pub fn format_usd(amount: f64) -> String {
    if !amount.is_finite() {
        return amount.to_string();
    }

    let sign = if amount < 0.0 { "-" } else { "" };
    let abs = amount.abs();

    let fixed = if abs >= 1.0 {
        format!("{:.2}", abs)
    } else {
        trim_fraction(format!("{:.6}", abs), 2)
    };

    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
    let grouped = match int_part.parse::<u64>() {
        Ok(n) => n.to_formatted_string(&Locale::en),
        Err(_) => int_part.to_string(),
    };

    if frac_part.is_empty() {
        format!("{}{}", sign, grouped)
    } else {
        format!("{}{}.{}", sign, grouped, frac_part)
    }
}

/// Format a percent change with an explicit sign, e.g. "+2.45%".
pub fn format_change(percent: f64) -> String {
    if percent >= 0.0 {
        format!("+{:.2}%", percent)
    } else {
        format!("{:.2}%", percent)
    }
}

fn trim_fraction(mut fixed: String, min_digits: usize) -> String {
    let Some(dot) = fixed.find('.') else {
        return fixed;
    };
    while fixed.len() > dot + 1 + min_digits && fixed.ends_with('0') {
        fixed.pop();
    }
    fixed
}
