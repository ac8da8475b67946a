use once_cell::sync::Lazy;
use regex::Regex;

// Digit groups joined by grouping/decimal marks, e.g. "1.234,56", "19.99", ".99".
// A plain space only joins a following group of exactly three digits ("1 299,00").
static AMOUNT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[.,]?\d+(?:[.,'\u{a0}\u{202f}]\d+| \d{3}\b)*").expect("Invalid amount regex")
});

/// Parse a displayed money string into an amount, ignoring currency symbols.
///
/// Handles both "1,234.56" and "1.234,56" styles: when both marks appear the
/// right-most one is the decimal mark; a lone mark followed by exactly three
/// digits, or repeated, is a thousands separator.
///
/// "$19.99" → 19.99 | "42,50 €" → 42.5 | "EUR 1.234,56" → 1234.56
pub fn parse_money(text: &str) -> Option<f64> {
    let raw = AMOUNT_REGEX.find(text)?.as_str();
    let digits: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();

    // A leading mark is always decimal: ".99" or ",5".
    if let Some(fraction) = digits.strip_prefix(|c: char| c == '.' || c == ',') {
        if fraction.chars().all(|c| c.is_ascii_digit()) {
            return format!("0.{}", fraction).parse::<f64>().ok();
        }
    }

    let normalized = match (digits.rfind('.'), digits.rfind(',')) {
        (Some(dot), Some(comma)) => {
            let (decimal, grouping) = if dot > comma { ('.', ',') } else { (',', '.') };
            digits.replace(grouping, "").replace(decimal, ".")
        }
        (Some(_), None) => normalize_single_mark(&digits, '.'),
        (None, Some(_)) => normalize_single_mark(&digits, ','),
        (None, None) => digits,
    };

    normalized.parse::<f64>().ok()
}

fn normalize_single_mark(digits: &str, mark: char) -> String {
    let occurrences = digits.matches(mark).count();
    let tail_len = digits
        .rsplit(mark)
        .next()
        .map(str::len)
        .unwrap_or_default();

    if occurrences > 1 || tail_len == 3 {
        digits.replace(mark, "")
    } else {
        digits.replace(mark, ".")
    }
}

/// Render a price the way the report tables show it: "45.0", "19.99".
pub fn format_price(price: f64) -> String {
    format!("{:?}", price)
}
