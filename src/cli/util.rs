use chrono::NaiveDate;
use rust_decimal::Decimal;

pub fn fmt_money(d: &Decimal) -> String {
    d.round_dp(2).to_string()
}

// Malformed input is always rejected, never coerced to zero. Callers turn
// None into an inline form error.
pub fn parse_money(s: &str) -> Option<Decimal> {
    Decimal::from_str_exact(s.trim()).ok()
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()
}

pub fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

pub fn iso(d: &NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_input_is_rejected_not_zeroed() {
        assert_eq!(parse_money("12.50"), Decimal::from_str_exact("12.50").ok());
        assert_eq!(parse_money("abc"), None);
        assert_eq!(parse_money(""), None);
        assert_eq!(parse_date("2025-02-30"), None);
        assert!(parse_date(" 2025-06-15 ").is_some());
    }
}
