//! Module handling the date bounds of a reporting run.
//!
//! Bounds are free-form expressions ("2024-02-01", "3 days ago", "yesterday", …)
//! resolved once per run and pinned to the `YYYY-MM-DD` form the API expects.
//!

use chrono::{Days, Months, NaiveDate, Utc};
use eyre::{eyre, Result};

/// Resolve one date expression into its `YYYY-MM-DD` form.
///
/// Relative expressions are resolved against the current UTC date, anything
/// else goes through `dateparser`.
///
pub fn resolve_date(expr: &str) -> Result<String> {
    let expr = expr.trim();
    if expr.is_empty() {
        return Err(eyre!("Empty date expression"));
    }
    if let Some(date) = resolve_relative(expr) {
        return Ok(date.format("%Y-%m-%d").to_string());
    }
    let date = dateparser::parse(expr).map_err(|e| eyre!("Bad date {expr}: {e}"))?;
    Ok(date.format("%Y-%m-%d").to_string())
}

/// Handle the relative forms `dateparser` does not know about:
/// `today`, `yesterday` and `N (days|weeks|months|years) ago`.
///
fn resolve_relative(expr: &str) -> Option<NaiveDate> {
    let today = Utc::now().date_naive();
    let expr = expr.to_lowercase();
    match expr.as_str() {
        "now" | "today" => return Some(today),
        "yesterday" => return today.checked_sub_days(Days::new(1)),
        _ => (),
    }

    let mut words = expr.split_whitespace();
    let n = words.next()?.parse::<u64>().ok()?;
    let unit = words.next()?;
    if words.next() != Some("ago") || words.next().is_some() {
        return None;
    }
    match unit {
        "day" | "days" => today.checked_sub_days(Days::new(n)),
        "week" | "weeks" => today.checked_sub_days(Days::new(7 * n)),
        "month" | "months" => today.checked_sub_months(Months::new(u32::try_from(n).ok()?)),
        "year" | "years" => today.checked_sub_months(Months::new(12 * u32::try_from(n).ok()?)),
        _ => None,
    }
}

/// Resolve both bounds of a reporting interval.
///
/// Resolution happens exactly once per run, every request body afterwards
/// embeds the same two strings.
///
pub fn resolve_bounds(date_from: &str, date_to: &str) -> Result<(String, String)> {
    let start = resolve_date(date_from)?;
    let end = resolve_date(date_to)?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("2024-02-01", "2024-02-01")]
    #[case("2024-02-01 12:34:56", "2024-02-01")]
    fn test_resolve_date(#[case] inp: &str, #[case] out: &str) {
        let d = resolve_date(inp).unwrap();
        assert_eq!(out, d);
    }

    #[rstest]
    #[case("")]
    #[case("   ")]
    #[case("not a date at all")]
    #[case("3 fortnights ago")]
    fn test_resolve_date_bad(#[case] inp: &str) {
        assert!(resolve_date(inp).is_err());
    }

    #[test]
    fn test_resolve_date_today() {
        let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();
        assert_eq!(today, resolve_date("today").unwrap());
        assert_eq!(today, resolve_date("now").unwrap());
    }

    #[rstest]
    #[case("yesterday", 1)]
    #[case("Yesterday", 1)]
    #[case("3 days ago", 3)]
    #[case("1 day ago", 1)]
    #[case("2 weeks ago", 14)]
    fn test_resolve_date_relative(#[case] inp: &str, #[case] days: u64) {
        let expected = (Utc::now().date_naive() - Days::new(days))
            .format("%Y-%m-%d")
            .to_string();
        assert_eq!(expected, resolve_date(inp).unwrap());
    }

    #[test]
    fn test_resolve_bounds() {
        let (b, e) = resolve_bounds("2024-02-01", "2024-03-01").unwrap();
        assert_eq!(("2024-02-01", "2024-03-01"), (b.as_str(), e.as_str()));
    }

    #[test]
    fn test_resolve_bounds_relative() {
        // Relative expressions must resolve without error and keep ordering
        // to the day.
        let (b, e) = resolve_bounds("3 days ago", "yesterday").unwrap();
        assert!(b <= e);
    }
}
