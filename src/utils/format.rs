//! Display helpers for chart labels, tooltips and tables.

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone, Timelike};

/// Thousands-separated number with exactly `decimals` fraction digits
/// (`1234567.891, 2` → `"1,234,567.89"`).
pub fn format_number(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "∞".to_string() } else { "-∞".to_string() };
    }

    let fixed = format!("{:.*}", decimals, round_half_up(value.abs(), decimals));
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let mut out = String::new();
    if value.is_sign_negative() && !is_zero {
        out.push('-');
    }
    out.push_str(&grouped);
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `None` renders as `"0"`, as missing numbers do in the dashboard tables.
pub fn format_optional_number(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format_number(v, decimals),
        None => "0".to_string(),
    }
}

pub fn format_currency(amount: f64, symbol: &str) -> String {
    format!("{}{}", symbol, format_number(amount, 2))
}

/// `ratio` is a fraction: `0.1234, 2` → `"12.34%"`.
pub fn format_percent(ratio: f64, decimals: usize) -> String {
    format!("{:.*}%", decimals, round_half_up(ratio * 100.0, decimals))
}

/// Rounds ties away from zero (`2.5` → `3`); `format!` alone rounds
/// them to even.
fn round_half_up(value: f64, decimals: usize) -> f64 {
    let factor = 10f64.powi(decimals.min(15) as i32);
    let scaled = value * factor;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / factor
}

/// Anything [`format_date`] accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    DateTime(NaiveDateTime),
    /// Milliseconds since the Unix epoch, shown in local time.
    EpochMillis(i64),
    Text(String),
}

impl From<NaiveDateTime> for DateInput {
    fn from(value: NaiveDateTime) -> Self {
        DateInput::DateTime(value)
    }
}

impl From<NaiveDate> for DateInput {
    fn from(value: NaiveDate) -> Self {
        DateInput::DateTime(value.and_hms_opt(0, 0, 0).unwrap_or_default())
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateInput {
    fn from(value: DateTime<Tz>) -> Self {
        DateInput::DateTime(value.with_timezone(&Local).naive_local())
    }
}

impl From<i64> for DateInput {
    fn from(value: i64) -> Self {
        DateInput::EpochMillis(value)
    }
}

impl From<&str> for DateInput {
    fn from(value: &str) -> Self {
        DateInput::Text(value.to_string())
    }
}

impl From<String> for DateInput {
    fn from(value: String) -> Self {
        DateInput::Text(value)
    }
}

impl DateInput {
    fn resolve(&self) -> Option<NaiveDateTime> {
        match self {
            DateInput::DateTime(dt) => Some(*dt),
            DateInput::EpochMillis(ms) => Local
                .timestamp_millis_opt(*ms)
                .single()
                .map(|dt| dt.naive_local()),
            DateInput::Text(text) => parse_date_text(text.trim()),
        }
    }
}

fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    if text.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Local).naive_local());
    }
    const LAYOUTS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M",
        "%Y/%m/%d %H:%M:%S",
    ];
    for layout in LAYOUTS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(text, layout) {
            return Some(dt);
        }
    }
    for layout in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(text, layout) {
            return d.and_hms_opt(0, 0, 0);
        }
    }
    None
}

/// Replaces the first `YYYY`, `MM`, `DD`, `HH`, `mm` and `ss` in
/// `pattern`. Unparseable input yields an empty string.
pub fn format_date(input: impl Into<DateInput>, pattern: &str) -> String {
    let Some(dt) = input.into().resolve() else {
        return String::new();
    };
    pattern
        .replacen("YYYY", &dt.year().to_string(), 1)
        .replacen("MM", &format!("{:02}", dt.month()), 1)
        .replacen("DD", &format!("{:02}", dt.day()), 1)
        .replacen("HH", &format!("{:02}", dt.hour()), 1)
        .replacen("mm", &format!("{:02}", dt.minute()), 1)
        .replacen("ss", &format!("{:02}", dt.second()), 1)
}

const SIZE_UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Binary units, two decimals: `1536` → `"1.50 KB"`.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 B".to_string();
    }
    let exp = (bytes.ilog(1024) as usize).min(SIZE_UNITS.len() - 1);
    format!("{:.2} {}", bytes as f64 / 1024f64.powi(exp as i32), SIZE_UNITS[exp])
}

/// Cuts `text` to `max_len` characters and appends `suffix`; shorter
/// input is returned unchanged.
pub fn truncate_text(text: &str, max_len: usize, suffix: &str) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_len).collect();
    out.push_str(suffix);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_get_thousands_separators() {
        assert_eq!(format_number(0.0, 0), "0");
        assert_eq!(format_number(999.0, 0), "999");
        assert_eq!(format_number(1000.0, 0), "1,000");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-9876543.0, 1), "-9,876,543.0");
        assert_eq!(format_number(12.4, 0), "12");
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_optional_number(None, 2), "0");
    }

    #[test]
    fn ties_round_away_from_zero() {
        assert_eq!(format_number(2.5, 0), "3");
        assert_eq!(format_number(0.5, 0), "1");
        assert_eq!(format_number(-2.5, 0), "-3");
        assert_eq!(format_number(1234.125, 2), "1,234.13");
        assert_eq!(format_number(999.5, 0), "1,000");
    }

    #[test]
    fn currency_and_percent() {
        assert_eq!(format_currency(15800.0, "¥"), "¥15,800.00");
        assert_eq!(format_currency(3.456, "$"), "$3.46");
        assert_eq!(format_percent(0.1234, 2), "12.34%");
        assert_eq!(format_percent(1.0, 0), "100%");
        assert_eq!(format_currency(0.125, "¥"), "¥0.13");
        assert_eq!(format_percent(0.125, 0), "13%");
    }

    #[test]
    fn date_tokens_are_substituted() {
        let dt = NaiveDate::from_ymd_opt(2024, 1, 5)
            .unwrap()
            .and_hms_opt(9, 3, 7)
            .unwrap();
        assert_eq!(format_date(dt, "YYYY-MM-DD HH:mm:ss"), "2024-01-05 09:03:07");
        assert_eq!(format_date(dt, "DD/MM/YYYY"), "05/01/2024");
        assert_eq!(format_date("2023-12-31", "YYYY年MM月DD日"), "2023年12月31日");
        assert_eq!(format_date("2024-02-29 23:59:01", "HH:mm:ss"), "23:59:01");
    }

    #[test]
    fn unparseable_dates_render_empty() {
        assert_eq!(format_date("not a date", "YYYY"), "");
        assert_eq!(format_date("", "YYYY-MM-DD"), "");
        assert_eq!(format_date("2024-13-40", "YYYY-MM-DD"), "");
    }

    #[test]
    fn file_sizes_use_binary_units() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512.00 B");
        assert_eq!(format_file_size(1024), "1.00 KB");
        assert_eq!(format_file_size(1536), "1.50 KB");
        assert_eq!(format_file_size(1048576), "1.00 MB");
        assert_eq!(format_file_size(1 << 50), "1024.00 TB");
    }

    #[test]
    fn truncation() {
        assert_eq!(truncate_text("hello world", 5, "..."), "hello...");
        assert_eq!(truncate_text("hi", 5, "..."), "hi");
        assert_eq!(truncate_text("exact", 5, "..."), "exact");
        assert_eq!(truncate_text("数据可视化平台", 4, "…"), "数据可视…");
    }
}
