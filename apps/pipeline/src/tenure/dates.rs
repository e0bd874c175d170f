//! Date Normalizer — turns free-text employment dates into calendar points.
//!
//! Resolution order:
//! 1. "present" / "current" / "now" / "till date" (case-insensitive) → the reference date
//! 2. explicit formats, first match wins (see `DATE_FORMATS`)
//! 3. regex fallback: month name + 4-digit year (day 1), then a bare 4-digit year (Jan 1)
//!
//! Failure is a value (`DateParseError`), never a panic. Callers count it as zero months.

use chrono::{Datelike, NaiveDate, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

const PRESENT_SENTINELS: &[&str] = &["present", "current", "now", "till date"];

static MONTH_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\w+)\s+([0-9]{4})").expect("static month-year pattern"));
static BARE_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([0-9]{4})").expect("static year pattern"));

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateParseError {
    #[error("empty date token")]
    Empty,

    #[error("unrecognized date '{0}'")]
    Unrecognized(String),
}

/// A normalized calendar point. Only this module can build one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CanonicalDate {
    year: i32,
    month: u32,
    day: u32,
}

impl CanonicalDate {
    fn from_naive(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
            day: date.day(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }
}

/// An explicit format. Partial dates are padded to a full date before parsing
/// because chrono needs a day to build a `NaiveDate`.
struct DateFormat {
    pattern: &'static str,
    prefix: &'static str,
    suffix: &'static str,
}

const DATE_FORMATS: &[DateFormat] = &[
    // "February 2022"
    DateFormat { pattern: "%d %B %Y", prefix: "01 ", suffix: "" },
    // "Feb 2022"
    DateFormat { pattern: "%d %b %Y", prefix: "01 ", suffix: "" },
    // "02/2022"
    DateFormat { pattern: "%d/%m/%Y", prefix: "01/", suffix: "" },
    // "02-2022"
    DateFormat { pattern: "%d-%m-%Y", prefix: "01-", suffix: "" },
    // "2022-02"
    DateFormat { pattern: "%Y-%m-%d", prefix: "", suffix: "-01" },
    // "2022"
    DateFormat { pattern: "%Y-%m-%d", prefix: "", suffix: "-01-01" },
    // "February 15, 2022"
    DateFormat { pattern: "%B %d, %Y", prefix: "", suffix: "" },
    // "Feb 15, 2022"
    DateFormat { pattern: "%b %d, %Y", prefix: "", suffix: "" },
    // "15/02/2022"
    DateFormat { pattern: "%d/%m/%Y", prefix: "", suffix: "" },
    // "15-02-2022"
    DateFormat { pattern: "%d-%m-%Y", prefix: "", suffix: "" },
    // "2022-02-15"
    DateFormat { pattern: "%Y-%m-%d", prefix: "", suffix: "" },
];

/// Parses date tokens against a fixed reference date for "present".
#[derive(Debug, Clone, Copy)]
pub struct DateNormalizer {
    today: NaiveDate,
}

impl DateNormalizer {
    /// Resolves "present" to the moment of computation.
    pub fn current() -> Self {
        Self {
            today: Utc::now().date_naive(),
        }
    }

    pub fn with_reference_date(today: NaiveDate) -> Self {
        Self { today }
    }

    pub fn today(&self) -> CanonicalDate {
        CanonicalDate::from_naive(self.today)
    }

    pub fn parse(&self, token: &str) -> Result<CanonicalDate, DateParseError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DateParseError::Empty);
        }

        if is_present(token) {
            return Ok(self.today());
        }

        for format in DATE_FORMATS {
            let padded = format!("{}{}{}", format.prefix, token, format.suffix);
            if let Ok(date) = NaiveDate::parse_from_str(&padded, format.pattern) {
                return Ok(CanonicalDate::from_naive(date));
            }
        }

        parse_loose(token).ok_or_else(|| DateParseError::Unrecognized(token.to_string()))
    }
}

/// Parses with "present" resolved to today.
pub fn parse_date(token: &str) -> Result<CanonicalDate, DateParseError> {
    DateNormalizer::current().parse(token)
}

fn is_present(token: &str) -> bool {
    PRESENT_SENTINELS
        .iter()
        .any(|sentinel| token.eq_ignore_ascii_case(sentinel))
}

fn parse_loose(token: &str) -> Option<CanonicalDate> {
    if let Some(caps) = MONTH_YEAR.captures(token) {
        if let Some(month) = month_from_name(&caps[1]) {
            let year = caps[2].parse::<i32>().ok()?;
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, 1) {
                return Some(CanonicalDate::from_naive(date));
            }
        }
    }

    let caps = BARE_YEAR.captures(token)?;
    let year = caps[1].parse::<i32>().ok()?;
    NaiveDate::from_ymd_opt(year, 1, 1).map(CanonicalDate::from_naive)
}

/// Month number for a full or abbreviated English month name, case-insensitive.
pub fn month_from_name(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().as_str() {
        "january" | "jan" => 1,
        "february" | "feb" => 2,
        "march" | "mar" => 3,
        "april" | "apr" => 4,
        "may" => 5,
        "june" | "jun" => 6,
        "july" | "jul" => 7,
        "august" | "aug" => 8,
        "september" | "sep" | "sept" => 9,
        "october" | "oct" => 10,
        "november" | "nov" => 11,
        "december" | "dec" => 12,
        _ => return None,
    };
    Some(month)
}
