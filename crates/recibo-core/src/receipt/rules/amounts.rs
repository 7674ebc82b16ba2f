//! Brazilian currency parsing and formatting.

use rust_decimal::Decimal;
use std::str::FromStr;

/// Parse a Brazilian-formatted amount (e.g. "1.234,56", "33,00") or a
/// plain decimal ("1234.56").
///
/// When both ',' and '.' are present, the rightmost symbol is the decimal
/// separator and the other is a thousands separator. A lone ',' is always
/// decimal. The result is rounded to two digits. Returns `None` for
/// unparseable input; the caller records the parse warning and falls back
/// to zero.
pub fn parse_brl(s: &str) -> Option<Decimal> {
    let cleaned: String = s
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .collect();

    if cleaned.is_empty() || !cleaned.chars().any(|c| c.is_ascii_digit()) {
        return None;
    }

    let normalized = match (cleaned.rfind(','), cleaned.rfind('.')) {
        (Some(comma), Some(dot)) if comma > dot => {
            cleaned.replace('.', "").replace(',', ".")
        }
        (Some(_), Some(_)) => cleaned.replace(',', ""),
        (Some(_), None) => cleaned.replace(',', "."),
        _ => cleaned,
    };

    Decimal::from_str(&normalized).ok().map(|d| d.round_dp(2))
}

/// Format an amount in Brazilian style: `R$ 1.247,90`.
pub fn format_brl(amount: Decimal) -> String {
    let s = format!("{:.2}", amount);
    let (integer, decimal) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let digits: Vec<char> = integer.chars().collect();
    let mut grouped = String::new();
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(*c);
    }

    format!("R$ {},{}", grouped, decimal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_parse_brazilian_formats() {
        assert_eq!(parse_brl("33,00"), Some(dec("33.00")));
        assert_eq!(parse_brl("1.247,90"), Some(dec("1247.90")));
        assert_eq!(parse_brl("R$ 17,00"), Some(dec("17.00")));
        assert_eq!(parse_brl("12.345.678,90"), Some(dec("12345678.90")));
    }

    #[test]
    fn test_parse_plain_decimal() {
        assert_eq!(parse_brl("1234.56"), Some(dec("1234.56")));
        assert_eq!(parse_brl("33"), Some(dec("33")));
    }

    #[test]
    fn test_rightmost_symbol_is_decimal() {
        assert_eq!(parse_brl("1.247,90"), Some(dec("1247.90")));
        assert_eq!(parse_brl("1,247.90"), Some(dec("1247.90")));
    }

    #[test]
    fn test_rounds_to_two_digits() {
        assert_eq!(parse_brl("10,999"), Some(dec("11.00")));
    }

    #[test]
    fn test_unparseable_is_none() {
        assert_eq!(parse_brl(""), None);
        assert_eq!(parse_brl("abc"), None);
        assert_eq!(parse_brl("R$ ,"), None);
    }

    #[test]
    fn test_format_brl() {
        assert_eq!(format_brl(dec("1247.90")), "R$ 1.247,90");
        assert_eq!(format_brl(dec("33.00")), "R$ 33,00");
        assert_eq!(format_brl(dec("12345678.90")), "R$ 12.345.678,90");
        assert_eq!(format_brl(dec("0.00")), "R$ 0,00");
    }

    #[test]
    fn test_currency_round_trip() {
        for s in ["1247.90", "33.00", "0.01", "999999.99"] {
            let amount = dec(s);
            assert_eq!(parse_brl(&format_brl(amount)), Some(amount));
        }
    }
}
