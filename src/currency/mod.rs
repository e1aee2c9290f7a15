//! Numeric input handling and local-currency formatting.
//!
//! Wizard inputs arrive as free text. Anything that does not parse as a finite
//! number degrades to zero instead of failing, so recalculation never aborts.

/// Parses user input, treating blanks, garbage and non-finite values as zero.
pub fn parse_lenient(input: &str) -> f64 {
    let cleaned: String = input
        .trim()
        .chars()
        .filter(|ch| *ch != ',' && *ch != '_')
        .collect();
    match cleaned.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Rounds half away from zero to `precision` fractional digits.
///
/// Values too large to scale have no fractional digits left and are returned
/// unchanged.
pub fn round_to(value: f64, precision: u32) -> f64 {
    if !value.is_finite() {
        return 0.0;
    }
    let factor = 10f64.powi(precision as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Renders a quantity with exactly `precision` fractional digits.
pub fn format_fixed(value: f64, precision: u32) -> String {
    format!("{:.*}", precision as usize, value)
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "NGN" => "₦".into(),
        "USD" => "$".into(),
        "GBP" => "£".into(),
        "EUR" => "€".into(),
        _ => format!("{} ", code),
    }
}

/// Formats a local-currency amount with thousands grouping, e.g. `₦157,500.00`.
pub fn format_local(amount: f64, code: &str) -> String {
    let body = format_grouped(amount.abs(), 2);
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}{}", sign, symbol_for(code), body)
}

/// Groups the integer part of a non-negative number with commas.
pub fn format_grouped(value: f64, precision: u32) -> String {
    let body = format_fixed(value, precision);
    match body.split_once('.') {
        Some((int_part, frac)) => format!("{}.{}", group_digits(int_part), frac),
        None => group_digits(&body),
    }
}

fn group_digits(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, ',');
        }
        grouped.insert(0, ch);
    }
    grouped
}
