/// Utilities for date formatting and parsing in forms
///
/// Form inputs carry ISO dates (`yyyy-mm-dd`), tables show `dd.mm.yyyy`.
use chrono::NaiveDate;

/// "2024-03-15" -> "15.03.2024"
pub fn format_naive_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// Parse the value of `<input type="date">`; empty or malformed -> None
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
}

pub fn to_iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Local calendar date of the browser
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// "1 день", "3 дня", "11 дней"
pub fn days_label(days: i64) -> String {
    let n = days.abs();
    let word = match (n % 10, n % 100) {
        (_, 11..=14) => "дней",
        (1, _) => "день",
        (2..=4, _) => "дня",
        _ => "дней",
    };
    format!("{} {}", days, word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_iso_date() {
        let date = parse_iso_date(" 2025-02-28 ").unwrap();
        assert_eq!(to_iso_date(date), "2025-02-28");
        assert_eq!(format_naive_date(date), "28.02.2025");
        assert_eq!(parse_iso_date(""), None);
        assert_eq!(parse_iso_date("2025-02-30"), None);
        assert_eq!(parse_iso_date("28.02.2025"), None);
    }

    #[test]
    fn test_days_label() {
        assert_eq!(days_label(0), "0 дней");
        assert_eq!(days_label(1), "1 день");
        assert_eq!(days_label(3), "3 дня");
        assert_eq!(days_label(5), "5 дней");
        assert_eq!(days_label(11), "11 дней");
        assert_eq!(days_label(12), "12 дней");
        assert_eq!(days_label(21), "21 день");
        assert_eq!(days_label(104), "104 дня");
    }
}
