//! Holiday calendar and wall-clock time handling.
//!
//! The engine bills against local wall-clock time with no timezone or
//! DST awareness, so everything here works on chrono's naive types.
//! [`HolidaySet`] holds the public-holiday calendar as date-only keys;
//! any date present in it switches that day's rule selection to the
//! `PH` pseudo-day.

use crate::error::{FeeError, Result};
use crate::models::DaySelector;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashSet;

/// A set of public-holiday dates, normalized to date-only keys.
#[derive(Debug, Clone, Default)]
pub struct HolidaySet {
    dates: HashSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            dates: dates.into_iter().collect(),
        }
    }

    /// Builds the set from raw calendar strings as stored or
    /// transmitted.  Each entry is normalized to a date-only key; full
    /// datetimes are accepted and truncated.
    pub fn from_strings(raw: &[String]) -> Result<Self> {
        let mut dates = HashSet::new();
        for entry in raw {
            dates.insert(normalize_holiday(entry)?);
        }
        Ok(Self { dates })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.dates.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }
}

/// Normalizes one holiday calendar entry to a date.
///
/// Accepts `YYYY-MM-DD` as well as ISO datetimes (`T` or space
/// separated), whose time component is discarded.
pub fn normalize_holiday(raw: &str) -> Result<NaiveDate> {
    let trimmed = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(datetime.date());
        }
    }
    Err(FeeError::BadHolidayDate(raw.to_string()))
}

/// Parses a rule's `from_time`/`to_time` field.  `HH:MM` and
/// `HH:MM:SS` are the formats existing configuration data uses.
pub fn parse_time_of_day(raw: &str) -> Result<NaiveTime> {
    let trimmed = raw.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| FeeError::BadTimeOfDay(raw.to_string()))
}

/// The selector governing rule matching on `date`: `PH` when the date
/// is a public holiday, otherwise the weekday name.
pub fn day_selector_for(date: NaiveDate, holidays: &HolidaySet) -> DaySelector {
    if holidays.contains(date) {
        DaySelector::PublicHoliday
    } else {
        DaySelector::from_weekday(date.weekday())
    }
}

/// Last representable instant of a calendar day (23:59:59.999...).
/// Chrono keeps this value internally as `NaiveTime::MAX` but does not
/// expose it, so it is reconstructed by underflowing midnight.
pub fn end_of_day_time() -> NaiveTime {
    NaiveTime::MIN
        .overflowing_sub_signed(Duration::nanoseconds(1))
        .0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn normalizes_plain_dates_and_datetimes() {
        assert_eq!(normalize_holiday("2025-12-25").unwrap(), date("2025-12-25"));
        assert_eq!(
            normalize_holiday("2025-12-25T08:30:00").unwrap(),
            date("2025-12-25")
        );
        assert_eq!(
            normalize_holiday(" 2025-12-25 00:00:00 ").unwrap(),
            date("2025-12-25")
        );
    }

    #[test]
    fn rejects_malformed_holiday_entries() {
        assert!(matches!(
            normalize_holiday("25/12/2025"),
            Err(FeeError::BadHolidayDate(_))
        ));
    }

    #[test]
    fn parses_both_time_formats() {
        let short = parse_time_of_day("18:01").unwrap();
        let long = parse_time_of_day("18:01:00").unwrap();
        assert_eq!(short, long);
        assert!(matches!(
            parse_time_of_day("24h00"),
            Err(FeeError::BadTimeOfDay(_))
        ));
    }

    #[test]
    fn holiday_overrides_weekday_selector() {
        // 2025-10-06 is a Monday.
        let holidays = HolidaySet::from_strings(&["2025-10-06".to_string()]).unwrap();
        assert_eq!(
            day_selector_for(date("2025-10-06"), &holidays),
            DaySelector::PublicHoliday
        );
        assert_eq!(
            day_selector_for(date("2025-10-13"), &holidays),
            DaySelector::Mon
        );
    }

    #[test]
    fn end_of_day_sorts_after_any_wall_clock_time() {
        let end = end_of_day_time();
        assert!(end > parse_time_of_day("23:59:59").unwrap());
        // One minute short of a full day when truncated to minutes.
        let day_span = end - NaiveTime::MIN;
        assert_eq!(day_span.num_minutes(), 1439);
    }
}
