use chrono::{Datelike, NaiveDate};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};
use crate::i18n::{self, Language};

pub const SLOTS_PER_MONTH: usize = 31;
pub const MONTHS_PER_YEAR: usize = 12;
pub const SUPPORTED_YEARS: RangeInclusive<i32> = 1..=9999;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

pub fn validate_year(year: i32) -> Result<i32> {
    if SUPPORTED_YEARS.contains(&year) {
        Ok(year)
    } else {
        Err(Error::new(
            ErrorKind::InvalidArgument,
            &format!(
                "year {} is outside {}..={}",
                year,
                SUPPORTED_YEARS.start(),
                SUPPORTED_YEARS.end()
            ),
        ))
    }
}

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days of the zero-based `month_index` in `year`.
pub fn days_of_month(year: i32, month_index: usize) -> u32 {
    match month_index {
        0 | 2 | 4 | 6 | 7 | 9 | 11 => 31,
        3 | 5 | 8 | 10 => 30,
        1 if is_leap_year(year) => 29,
        1 => 28,
        _ => panic!("month index {} out of range", month_index),
    }
}

/// Canonical `YYYY-MM-DD` join key between grid, holidays and notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, DeserializeFromStr, SerializeDisplay)]
pub struct DateKey(NaiveDate);

impl DateKey {
    pub fn date(&self) -> NaiveDate {
        self.0
    }

    pub fn year(&self) -> i32 {
        self.0.year()
    }
}

impl From<NaiveDate> for DateKey {
    fn from(date: NaiveDate) -> Self {
        DateKey(date)
    }
}

impl fmt::Display for DateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        // chrono accepts unpadded fields, the key format does not
        if s.len() != 10 {
            return Err(Error::new(
                ErrorKind::DateParse,
                &format!("'{}' is not a YYYY-MM-DD date key", s),
            ));
        }
        Ok(DateKey(NaiveDate::parse_from_str(s, DATE_KEY_FORMAT)?))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HolidayInfo {
    /// Canonical, untranslated name. Same-day holidays are already comma-joined.
    pub name: String,
    pub is_substitute: bool,
}

pub type HolidayMap = BTreeMap<DateKey, HolidayInfo>;

/// User text per day. Lives outside the grid, joined by key.
pub type NoteMap = BTreeMap<DateKey, String>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Day {
    pub key: DateKey,
    pub month_index: usize,
    pub day_of_month: u32,
    /// 0 = Sunday
    pub day_of_week: u32,
    pub is_weekend: bool,
    pub holiday: Option<HolidayInfo>,
}

impl Day {
    pub fn date(&self) -> NaiveDate {
        self.key.date()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DayCell {
    Empty { slot: u32 },
    Populated(Day),
}

impl DayCell {
    pub fn slot(&self) -> u32 {
        match self {
            DayCell::Empty { slot } => *slot,
            DayCell::Populated(day) => day.day_of_month,
        }
    }

    pub fn day(&self) -> Option<&Day> {
        match self {
            DayCell::Empty { .. } => None,
            DayCell::Populated(day) => Some(day),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, DayCell::Empty { .. })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthSlice {
    pub month_index: usize,
    pub month_name: String,
    /// Always `SLOTS_PER_MONTH` long; slots past the month's end are `Empty`.
    pub day_cells: Vec<DayCell>,
}

impl MonthSlice {
    pub fn days(&self) -> impl Iterator<Item = &Day> {
        self.day_cells.iter().filter_map(DayCell::day)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct YearGrid {
    pub year: i32,
    pub months: Vec<MonthSlice>,
}

impl YearGrid {
    pub fn cell(&self, month_index: usize, slot: u32) -> Option<&DayCell> {
        self.months
            .get(month_index)
            .and_then(|m| m.day_cells.get(slot.checked_sub(1)? as usize))
    }

    pub fn day(&self, key: &DateKey) -> Option<&Day> {
        if key.year() != self.year {
            return None;
        }
        let date = key.date();
        self.cell(date.month0() as usize, date.day())
            .and_then(DayCell::day)
    }
}

pub fn generate(year: i32, holidays: &HolidayMap, language: Language) -> YearGrid {
    assert!(
        SUPPORTED_YEARS.contains(&year),
        "year {} outside supported range",
        year
    );

    let translations = i18n::resolve(language);

    let months = (0..MONTHS_PER_YEAR)
        .map(|month_index| {
            let num_days = days_of_month(year, month_index);
            let day_cells = (1..=SLOTS_PER_MONTH as u32)
                .map(|slot| {
                    if slot > num_days {
                        return DayCell::Empty { slot };
                    }

                    let date = match NaiveDate::from_ymd_opt(year, month_index as u32 + 1, slot) {
                        Some(date) => date,
                        None => return DayCell::Empty { slot },
                    };
                    let key = DateKey(date);
                    let day_of_week = date.weekday().num_days_from_sunday();

                    DayCell::Populated(Day {
                        key,
                        month_index,
                        day_of_month: slot,
                        day_of_week,
                        is_weekend: day_of_week == 0 || day_of_week == 6,
                        holiday: holidays.get(&key).cloned(),
                    })
                })
                .collect();

            MonthSlice {
                month_index,
                month_name: translations.month_name(month_index).to_owned(),
                day_cells,
            }
        })
        .collect();

    log::debug!("generated year grid for {} ({})", year, language);

    YearGrid { year, months }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn every_month_has_31_slots() {
        for year in [1900, 2000, 2026, 2027, 2028].iter() {
            let grid = generate(*year, &HolidayMap::new(), Language::En);
            assert_eq!(grid.months.len(), 12);
            for month in grid.months.iter() {
                assert_eq!(month.day_cells.len(), SLOTS_PER_MONTH);
            }
        }
    }

    #[test]
    fn slots_past_month_end_are_empty() {
        let grid = generate(2026, &HolidayMap::new(), Language::En);
        for month in grid.months.iter() {
            let num_days = days_of_month(2026, month.month_index);
            assert_eq!(month.days().count() as u32, num_days);
            for cell in month.day_cells.iter() {
                assert_eq!(cell.is_empty(), cell.slot() > num_days);
            }
        }
    }

    #[test]
    fn february_follows_leap_year_rule() {
        let feb_days = |year| {
            generate(year, &HolidayMap::new(), Language::Ko).months[1]
                .days()
                .count()
        };
        assert_eq!(feb_days(2028), 29);
        assert_eq!(feb_days(2027), 28);
        assert_eq!(feb_days(2000), 29);
        assert_eq!(feb_days(1900), 28);
    }

    #[test]
    fn leap_rule_agrees_with_chrono() {
        for year in 1..=2500 {
            let chrono_leap = NaiveDate::from_ymd_opt(year, 2, 29).is_some();
            assert_eq!(is_leap_year(year), chrono_leap, "year {}", year);
        }
    }

    #[test]
    fn weekend_flag_matches_day_of_week() {
        let grid = generate(2026, &HolidayMap::new(), Language::En);
        for day in grid.months.iter().flat_map(MonthSlice::days) {
            assert_eq!(day.is_weekend, day.day_of_week == 0 || day.day_of_week == 6);
        }
    }

    #[test]
    fn attaches_holiday_by_exact_key() {
        let mut holidays = HolidayMap::new();
        holidays.insert(
            key("2026-01-01"),
            HolidayInfo {
                name: "신정".to_owned(),
                is_substitute: false,
            },
        );

        let grid = generate(2026, &holidays, Language::En);
        let new_year = grid.day(&key("2026-01-01")).unwrap();

        // 2026-01-01 is a Thursday
        assert_eq!(new_year.day_of_week, 4);
        assert!(!new_year.is_weekend);
        assert_eq!(new_year.holiday.as_ref().unwrap().name, "신정");
        assert!(grid.day(&key("2026-01-02")).unwrap().holiday.is_none());
        assert_eq!(
            i18n::resolve(Language::En).holiday_name(&new_year.holiday.as_ref().unwrap().name),
            "New Year's Day"
        );
    }

    #[test]
    fn month_names_follow_language() {
        let ko = generate(2026, &HolidayMap::new(), Language::Ko);
        let en = generate(2026, &HolidayMap::new(), Language::En);
        assert_eq!(ko.months[2].month_name, "3월");
        assert_eq!(en.months[2].month_name, "March");
        // keys are locale independent
        assert_eq!(
            ko.months[2].day_cells[4].day().unwrap().key,
            en.months[2].day_cells[4].day().unwrap().key
        );
    }

    #[test]
    fn generation_is_deterministic() {
        let a = generate(2024, &HolidayMap::new(), Language::Ko);
        let b = generate(2024, &HolidayMap::new(), Language::Ko);
        assert_eq!(a, b);
    }

    #[test]
    fn date_keys_are_zero_padded() {
        let k = DateKey::from(NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
        assert_eq!(k.to_string(), "2026-03-05");
        assert_eq!(key("2026-03-05"), k);
        assert!("2026-3-5".parse::<DateKey>().is_err());
        assert!("2026-02-30".parse::<DateKey>().is_err());
    }

    #[test]
    fn validates_year_range() {
        assert!(validate_year(2026).is_ok());
        assert!(validate_year(0).is_err());
        assert!(validate_year(10_000).is_err());
    }
}
