//! Text helpers for quantities and optional dates in reasoning strings

use chrono::NaiveDate;

/// Format a quantity with at most two decimals and no trailing zeros
pub fn fmt_qty(value: f64) -> String {
    let s = format!("{:.2}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Format an optional date, using `fallback` when absent
pub fn fmt_date_or(date: Option<NaiveDate>, fallback: &str) -> String {
    date.map(|d| d.to_string())
        .unwrap_or_else(|| fallback.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fmt_qty() {
        assert_eq!(fmt_qty(10.0), "10");
        assert_eq!(fmt_qty(7.5), "7.5");
        assert_eq!(fmt_qty(0.126), "0.13");
        assert_eq!(fmt_qty(-2.0), "-2");
        assert_eq!(fmt_qty(-0.001), "0");
    }
}
