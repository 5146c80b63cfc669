use chrono::{Datelike, NaiveDate};

/// `K` followed by the amount with thousands separators. Whole amounts carry
/// no decimals; others are rounded to at most two places. The sign follows
/// the prefix (`K-25`).
pub fn format_currency(amount: f64) -> String {
    let negative = amount < 0.0;
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = cents / 100;
    let fraction = cents % 100;

    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if negative && cents > 0 { "-" } else { "" };
    match fraction {
        0 => format!("K{}{}", sign, grouped),
        f if f % 10 == 0 => format!("K{}{}.{}", sign, grouped, f / 10),
        f => format!("K{}{}.{:02}", sign, grouped, f),
    }
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}

/// `1st March 2024`.
pub fn format_ordinal_date(date: NaiveDate) -> String {
    format!(
        "{}{} {}",
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%B %Y")
    )
}

/// Parses the leading `YYYY-MM-DD` of a stored date string.
pub fn parse_stored_date(raw: &str) -> Option<NaiveDate> {
    let prefix = raw.trim().get(..10)?;
    NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok()
}
