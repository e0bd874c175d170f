//! Tenure Engine — elapsed months between canonical dates and per-company totals.
//!
//! Month counting is inclusive of a trailing partial month: Jul 2019 → Jul 2020
//! counts 13 months, because the end day (1) is not before the start day (1).
//! Unparseable dates contribute zero months and are logged, never raised.

pub mod dates;
pub mod stability;

use tracing::warn;

use crate::models::candidate::{PositionStint, RawCompanyRecord, StintBreakdown};
use crate::tenure::dates::{CanonicalDate, DateNormalizer};

const EXCLUDED_TITLE_MARKERS: &[&str] = &["intern", "trainee"];

/// Total tenure at one company across all of its stints.
#[derive(Debug, Clone, PartialEq)]
pub struct CompanyTenure {
    pub company_name: String,
    pub months: i64,
    pub years: f64,
}

/// `(end.year - start.year) * 12 + (end.month - start.month)`, plus one when
/// `end.day >= start.day`, clamped at zero.
pub fn months_between(start: &CanonicalDate, end: &CanonicalDate) -> i64 {
    let mut months = i64::from(end.year() - start.year()) * 12
        + (i64::from(end.month()) - i64::from(start.month()));
    if end.day() >= start.day() {
        months += 1;
    }
    months.max(0)
}

/// Months for a single stint; zero when either end fails to parse.
pub fn stint_months(company_name: &str, stint: &PositionStint, dates: &DateNormalizer) -> i64 {
    let start = dates.parse(stint.start.as_str());
    let end = dates.parse(stint.end.as_str());
    match (start, end) {
        (Ok(start), Ok(end)) => months_between(&start, &end),
        (Err(e), _) | (_, Err(e)) => {
            warn!(
                company = company_name,
                title = stint.title.as_str(),
                start = stint.start.as_str(),
                end = stint.end.as_str(),
                "Counting stint as 0 months: {e}"
            );
            0
        }
    }
}

/// Months to years, rounded to two decimals.
pub fn months_to_years(months: i64) -> f64 {
    (months as f64 / 12.0 * 100.0).round() / 100.0
}

/// Every tenure figure for one work history, derived from a single pass over
/// the stints so each date is parsed (and each bad date logged) once.
#[derive(Debug, Clone, PartialEq)]
pub struct TenureSummary {
    pub tenure: Vec<CompanyTenure>,
    pub average_stability_years: f64,
    pub total_experience_years: f64,
    pub breakdown: Vec<StintBreakdown>,
}

pub fn summarize(records: &[RawCompanyRecord], dates: &DateNormalizer) -> TenureSummary {
    let breakdown = stint_breakdown(records, dates);
    TenureSummary {
        tenure: tenure_by_company(&breakdown),
        average_stability_years: average_stability_from(&breakdown),
        total_experience_years: total_years_from(&breakdown),
        breakdown,
    }
}

/// Per-stint months in input order. The only place stint dates are parsed.
pub fn stint_breakdown(records: &[RawCompanyRecord], dates: &DateNormalizer) -> Vec<StintBreakdown> {
    records
        .iter()
        .flat_map(|record| {
            record.positions.iter().map(move |stint| {
                let months = stint_months(&record.company_name, stint, dates);
                StintBreakdown {
                    company_name: record.company_name.clone(),
                    title: stint.title.clone(),
                    start: stint.start.clone(),
                    end: stint.end.clone(),
                    months,
                    years: months_to_years(months),
                }
            })
        })
        .collect()
}

/// Sums stint months per company. Companies are grouped by exact name and
/// returned in first-seen order.
pub fn aggregate_tenure(records: &[RawCompanyRecord], dates: &DateNormalizer) -> Vec<CompanyTenure> {
    tenure_by_company(&stint_breakdown(records, dates))
}

/// Mean per-company tenure in years, ignoring internship and trainee stints.
/// A company whose stints are all excluded does not count towards the mean.
pub fn average_stability(records: &[RawCompanyRecord], dates: &DateNormalizer) -> f64 {
    average_stability_from(&stint_breakdown(records, dates))
}

/// Total experience across every stint, in years.
pub fn total_experience_years(records: &[RawCompanyRecord], dates: &DateNormalizer) -> f64 {
    total_years_from(&stint_breakdown(records, dates))
}

pub fn tenure_by_company(breakdown: &[StintBreakdown]) -> Vec<CompanyTenure> {
    group_months(breakdown, |_| true)
        .into_iter()
        .map(|(company_name, months)| CompanyTenure {
            company_name,
            months,
            years: months_to_years(months),
        })
        .collect()
}

pub fn average_stability_from(breakdown: &[StintBreakdown]) -> f64 {
    let totals = group_months(breakdown, |stint| !is_internship(&stint.title));
    if totals.is_empty() {
        return 0.0;
    }
    let sum: f64 = totals
        .iter()
        .map(|(_, months)| *months as f64 / 12.0)
        .sum();
    ((sum / totals.len() as f64) * 100.0).round() / 100.0
}

pub fn total_years_from(breakdown: &[StintBreakdown]) -> f64 {
    months_to_years(breakdown.iter().map(|stint| stint.months).sum())
}

pub fn is_internship(title: &str) -> bool {
    let title = title.to_lowercase();
    EXCLUDED_TITLE_MARKERS
        .iter()
        .any(|marker| title.contains(marker))
}

/// Ordered (company, months) pairs over stints accepted by `include`.
/// A company only appears once at least one of its stints is included.
fn group_months(
    breakdown: &[StintBreakdown],
    include: impl Fn(&StintBreakdown) -> bool,
) -> Vec<(String, i64)> {
    let mut totals: Vec<(String, i64)> = Vec::new();
    for stint in breakdown.iter().filter(|s| include(s)) {
        match totals
            .iter_mut()
            .find(|(name, _)| *name == stint.company_name)
        {
            Some((_, total)) => *total += stint.months,
            None => totals.push((stint.company_name.clone(), stint.months)),
        }
    }
    totals
}
