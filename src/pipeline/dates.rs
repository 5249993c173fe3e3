use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::TRAIL_TIME_OF_DAY;
use crate::error::{AuditError, Result};

// day-month-year, month as abbreviation or number; anything after the year is ignored
static EXPORT_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*(\d{1,2})-([A-Za-z]{3}|\d{1,2})-(\d{4}|\d{2})\b").expect("valid date regex")
});

const MONTHS: [&str; 12] = [
    "JAN", "FEB", "MAR", "APR", "MAY", "JUN", "JUL", "AUG", "SEP", "OCT", "NOV", "DEC",
];

/// Parse an export-style date such as `16-MAY-23` or `02-11-2023`
pub fn parse_export_date(value: &str) -> Result<NaiveDate> {
    let invalid = || AuditError::InvalidDate {
        value: value.to_string(),
    };

    let caps = EXPORT_DATE.captures(value).ok_or_else(invalid)?;
    let day: u32 = caps[1].parse().map_err(|_| invalid())?;
    let month_token = &caps[2];
    let month = match month_token.parse::<u32>() {
        Ok(m) => m,
        Err(_) => {
            let upper = month_token.to_ascii_uppercase();
            MONTHS
                .iter()
                .position(|m| *m == upper)
                .map(|i| i as u32 + 1)
                .ok_or_else(invalid)?
        }
    };
    let year_token = &caps[3];
    let mut year: i32 = year_token.parse().map_err(|_| invalid())?;
    if year_token.len() == 2 {
        year += 2000;
    }

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(invalid)
}

/// `16-MAY-23` -> `2023-05-16 14:00:00`
pub fn to_timed(value: &str) -> Result<String> {
    let date = parse_export_date(value)?;
    Ok(format!("{} {}", date.format("%Y-%m-%d"), TRAIL_TIME_OF_DAY))
}

/// `16-MAY-23` -> `2023-05-16`; empty stays empty
pub fn to_untimed(value: &str) -> Result<String> {
    if value.trim().is_empty() {
        return Ok(String::new());
    }
    let date = parse_export_date(value)?;
    Ok(date.format("%Y-%m-%d").to_string())
}
