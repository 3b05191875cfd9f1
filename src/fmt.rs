fn with_commas(int_part: &str) -> String {
    let mut out = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out.chars().rev().collect()
}

/// Format a float with thousands separators and two decimals: 1,234.56
pub fn amount(val: f64) -> String {
    let cents = format!("{:.2}", val.abs());
    let (int_part, dec_part) = cents.split_once('.').unwrap_or((cents.as_str(), "00"));
    let sign = if val < 0.0 && cents != "0.00" { "-" } else { "" };
    format!("{sign}{}.{dec_part}", with_commas(int_part))
}

/// Format a float as a dollar amount with thousands separators: $1,234.56
pub fn money(val: f64) -> String {
    let formatted = amount(val);
    match formatted.strip_prefix('-') {
        Some(abs) => format!("-${abs}"),
        None => format!("${formatted}"),
    }
}

/// Format a count with thousands separators: 1,234
pub fn number(val: i64) -> String {
    let digits = val.unsigned_abs().to_string();
    if val < 0 {
        format!("-{}", with_commas(&digits))
    } else {
        with_commas(&digits)
    }
}

/// Compact dollar label for chart bars: $950, $1.5k, $12k, $2.5M
pub fn compact(val: f64) -> String {
    let sign = if val < 0.0 { "-" } else { "" };
    let abs = val.abs();
    if abs.round() < 1000.0 {
        return format!("{sign}${}", abs.round() as u64);
    }
    // Pick the unit after rounding so 999,999 reads $1M, not $1000k
    let (scaled, suffix) = if abs >= 999_500.0 {
        (abs / 1_000_000.0, "M")
    } else {
        (abs / 1000.0, "k")
    };
    if scaled >= 9.95 {
        format!("{sign}${}{suffix}", scaled.round() as u64)
    } else {
        let one_decimal = format!("{scaled:.1}");
        let trimmed = one_decimal.strip_suffix(".0").unwrap_or(&one_decimal);
        format!("{sign}${trimmed}{suffix}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(1234.56), "$1,234.56");
        assert_eq!(money(-500.00), "-$500.00");
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1000000.99), "$1,000,000.99");
        assert_eq!(money(42.10), "$42.10");
    }

    #[test]
    fn test_amount_formatting() {
        assert_eq!(amount(80.0), "80.00");
        assert_eq!(amount(-1234567.891), "-1,234,567.89");
        assert_eq!(amount(-0.001), "0.00");
        assert_eq!(amount(999.5), "999.50");
    }

    #[test]
    fn test_number_formatting() {
        assert_eq!(number(0), "0");
        assert_eq!(number(1234), "1,234");
        assert_eq!(number(-1234567), "-1,234,567");
    }

    #[test]
    fn test_compact_formatting() {
        assert_eq!(compact(950.0), "$950");
        assert_eq!(compact(1500.0), "$1.5k");
        assert_eq!(compact(2000.0), "$2k");
        assert_eq!(compact(12_400.0), "$12k");
        assert_eq!(compact(2_500_000.0), "$2.5M");
        assert_eq!(compact(-1500.0), "-$1.5k");
    }

    #[test]
    fn test_compact_rounds_across_unit_boundaries() {
        assert_eq!(compact(999.4), "$999");
        assert_eq!(compact(999.6), "$1k");
        assert_eq!(compact(9_999.0), "$10k");
        assert_eq!(compact(999_499.0), "$999k");
        assert_eq!(compact(999_999.0), "$1M");
        assert_eq!(compact(-9_960.0), "-$10k");
    }
}
