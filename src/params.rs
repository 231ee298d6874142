use serde::Deserialize;
use time::{macros::format_description, Date};

use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    50
}

impl Pagination {
    /// Limit clamped to 1..=200, offset to >= 0.
    pub fn clamped(&self) -> (i64, i64) {
        (self.limit.clamp(1, 200), self.offset.max(0))
    }
}

/// Parse a `YYYY-MM-DD` calendar date.
pub fn parse_date(raw: &str) -> Result<Date, AppError> {
    Date::parse(raw.trim(), format_description!("[year]-[month]-[day]"))
        .map_err(|_| AppError::bad_request(format!("Invalid date '{}', expected YYYY-MM-DD", raw)))
}

/// Inclusive range check with an upper bound on its length in days.
pub fn check_range(start: Date, end: Date, max_days: i64) -> Result<(), AppError> {
    if end < start {
        return Err(AppError::bad_request("End date is before start date"));
    }
    if (end - start).whole_days() + 1 > max_days {
        return Err(AppError::bad_request(format!(
            "Date range longer than {} days",
            max_days
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn parses_iso_dates() {
        assert_eq!(parse_date("2026-03-09").unwrap(), date!(2026 - 03 - 09));
        assert_eq!(parse_date(" 2026-12-31 ").unwrap(), date!(2026 - 12 - 31));
    }

    #[test]
    fn rejects_malformed_dates() {
        assert!(parse_date("09/03/2026").is_err());
        assert!(parse_date("2026-02-30").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn range_checks() {
        let a = date!(2026 - 03 - 01);
        assert!(check_range(a, a, 1).is_ok());
        assert!(check_range(a, date!(2026 - 03 - 07), 7).is_ok());
        assert!(check_range(a, date!(2026 - 03 - 08), 7).is_err());
        assert!(check_range(date!(2026 - 03 - 02), a, 7).is_err());
    }

    #[test]
    fn pagination_is_clamped() {
        let p = Pagination { limit: 10_000, offset: -4 };
        assert_eq!(p.clamped(), (200, 0));
    }
}
