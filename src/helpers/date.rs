//! Date helper functions

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

/// Display format for tour dates, e.g. `May 1st, 2024`
pub const DISPLAY_FORMAT: &str = "MMMM Do[,] YYYY";

/// Parse a CMS date value
///
/// Accepts `YYYY-MM-DD`, RFC 3339 timestamps and `YYYY-MM-DD HH:MM:SS`.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Some(dt.date());
    }

    None
}

/// Format a date using a Moment.js-compatible format string
///
/// Supports `YYYY`, `YY`, `MMMM`, `MMM`, `MM`, `M`, `Do`, `DD`, `D`,
/// `dddd`, `ddd` and `[literal]` escapes.
///
/// # Examples
/// ```ignore
/// format_date(&date, "MMMM Do[,] YYYY") // -> "January 1st, 2024"
/// ```
pub fn format_date(date: &NaiveDate, format: &str) -> String {
    // Longest tokens first so `MMMM` wins over `MM`
    const TOKENS: [&str; 11] = [
        "YYYY", "YY", "MMMM", "MMM", "MM", "M", "Do", "DD", "D", "dddd", "ddd",
    ];

    let mut out = String::with_capacity(format.len() + 8);
    let mut rest = format;

    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('[') {
            match stripped.find(']') {
                Some(end) => {
                    out.push_str(&stripped[..end]);
                    rest = &stripped[end + 1..];
                }
                None => {
                    out.push_str(stripped);
                    rest = "";
                }
            }
            continue;
        }

        match TOKENS.iter().find(|t| rest.starts_with(**t)) {
            Some(token) => {
                out.push_str(&render_token(date, token));
                rest = &rest[token.len()..];
            }
            None => {
                let ch = rest.chars().next().unwrap_or_default();
                out.push(ch);
                rest = &rest[ch.len_utf8()..];
            }
        }
    }

    out
}

fn render_token(date: &NaiveDate, token: &str) -> String {
    match token {
        "YYYY" => date.format("%Y").to_string(),
        "YY" => date.format("%y").to_string(),
        "MMMM" => date.format("%B").to_string(),
        "MMM" => date.format("%b").to_string(),
        "MM" => date.format("%m").to_string(),
        "M" => date.month().to_string(),
        "Do" => ordinal(date.day()),
        "DD" => date.format("%d").to_string(),
        "D" => date.day().to_string(),
        "dddd" => date.format("%A").to_string(),
        "ddd" => date.format("%a").to_string(),
        other => other.to_string(),
    }
}

/// English ordinal, e.g. `1st`, `12th`, `23rd`
pub fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

/// Format a CMS date string for display, passing unparseable input through
pub fn display_date(s: &str) -> String {
    match parse_date(s) {
        Some(date) => format_date(&date, DISPLAY_FORMAT),
        None => s.to_string(),
    }
}
