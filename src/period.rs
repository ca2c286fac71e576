use crate::types::Project;
use crate::util::parse_date_safe;
use chrono::{Months, NaiveDate, NaiveDateTime, NaiveTime};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodSelector {
    All,
    OneMonth,
    TwoMonths,
    ThreeMonths,
    SixMonths,
    OneYear,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    let last = NaiveTime::from_hms_milli_opt(23, 59, 59, 999).unwrap_or(NaiveTime::MIN);
    date.and_time(last)
}

/// Resolve a selector to `[start, end]` bounds, or `None` for an
/// unbounded filter. Preset windows span "now minus N months" to "now";
/// a custom range is inclusive through the end of its last day. `Custom`
/// without a supplied range filters nothing (empty date pickers).
fn period_bounds(
    selector: PeriodSelector,
    custom: Option<&DateRange>,
    now: NaiveDateTime,
) -> Option<(NaiveDateTime, NaiveDateTime)> {
    let months = match selector {
        PeriodSelector::All => return None,
        PeriodSelector::OneMonth => 1,
        PeriodSelector::TwoMonths => 2,
        PeriodSelector::ThreeMonths => 3,
        PeriodSelector::SixMonths => 6,
        PeriodSelector::OneYear => 12,
        PeriodSelector::Custom => {
            let range = custom?;
            return Some((range.start.and_time(NaiveTime::MIN), end_of_day(range.end)));
        }
    };
    let start = now.checked_sub_months(Months::new(months)).unwrap_or(now);
    Some((start, now))
}

/// Select the projects whose inspection date falls inside the period.
///
/// A project passes a bounded filter iff its inspection date is present,
/// parses, and lands within `[start, end]` inclusive. Dateless projects
/// only pass under `All`.
pub fn filter_by_period(
    projects: &[Project],
    selector: PeriodSelector,
    custom: Option<&DateRange>,
    now: NaiveDateTime,
) -> Vec<Project> {
    let Some((start, end)) = period_bounds(selector, custom, now) else {
        return projects.to_vec();
    };
    projects
        .iter()
        .filter(|p| {
            parse_date_safe(p.inspection_date.as_deref())
                .map(|date| {
                    let inspected = date.and_time(NaiveTime::MIN);
                    start <= inspected && inspected <= end
                })
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
