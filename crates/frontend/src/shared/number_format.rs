//! Форматирование и разбор чисел в формах и таблицах

/// Денежное значение: 2 знака после точки, пробел как разделитель тысяч
///
/// `format_money(1234567.891)` -> `"1 234 567.89"`
pub fn format_money(value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let formatted = format!("{:.2}", value);
    let (integer_part, decimal_part) = formatted
        .split_once('.')
        .unwrap_or((formatted.as_str(), "00"));
    let (sign, digits) = match integer_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", integer_part),
    };

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(c);
    }

    // "-0.00" после округления не показываем
    if sign == "-" && grouped.chars().all(|c| c == '0') && decimal_part.chars().all(|c| c == '0') {
        return format!("{}.{}", grouped, decimal_part);
    }
    format!("{}{}.{}", sign, grouped, decimal_part)
}

/// Процент без лишних нулей: `2.50` -> `"2.5 %"`
pub fn format_percent(value: f64) -> String {
    if !value.is_finite() {
        return "—".to_string();
    }
    let formatted = format!("{:.3}", value);
    let trimmed = formatted.trim_end_matches('0').trim_end_matches('.');
    let trimmed = if trimmed == "-0" { "0" } else { trimmed };
    format!("{} %", trimmed)
}

/// Разбор числа, введённого пользователем: допускает пробелы и запятую
///
/// Пустая строка или мусор -> `None`
pub fn parse_decimal(value: &str) -> Option<f64> {
    let normalized: String = value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if normalized.is_empty() {
        return None;
    }
    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_money() {
        assert_eq!(format_money(1234.56), "1 234.56");
        assert_eq!(format_money(1234567.891), "1 234 567.89");
        assert_eq!(format_money(0.0), "0.00");
        assert_eq!(format_money(-1234.5), "-1 234.50");
        assert_eq!(format_money(-0.001), "0.00");
        assert_eq!(format_money(999.0), "999.00");
        assert_eq!(format_money(f64::NAN), "—");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(2.5), "2.5 %");
        assert_eq!(format_percent(3.0), "3 %");
        assert_eq!(format_percent(0.125), "0.125 %");
        assert_eq!(format_percent(0.0), "0 %");
    }

    #[test]
    fn test_parse_decimal() {
        assert_eq!(parse_decimal("1 234,50"), Some(1234.5));
        assert_eq!(parse_decimal("1\u{a0}000"), Some(1000.0));
        assert_eq!(parse_decimal(" 2.75 "), Some(2.75));
        assert_eq!(parse_decimal(""), None);
        assert_eq!(parse_decimal("abc"), None);
        assert_eq!(parse_decimal("inf"), None);
    }
}
