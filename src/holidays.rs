//! Public holiday lookup.
//!
//! Sources deliver raw `date -> [names]` tables; `ingest` turns them into a
//! `HolidayMap` by joining same-day names and flagging substitute holidays.
//! A failing lookup never surfaces as an error to callers of
//! [`HolidaySource::lookup`]: the calendar renders without shading instead.

use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::calendar::{DateKey, HolidayInfo, HolidayMap};
use crate::error::{Error, ErrorKind, Result};

const BUNDLED_KR: &str = include_str!("../data/holidays_kr.toml");
const SUBSTITUTE_MARKER: &str = "대체";
const NAME_SEPARATOR: &str = ", ";

type RawYear = BTreeMap<String, Vec<String>>;

#[derive(Deserialize)]
#[serde(transparent)]
struct RawDataset(BTreeMap<String, RawYear>);

pub trait HolidaySource: Send {
    fn try_lookup(&self, year: i32) -> Result<HolidayMap>;

    fn lookup(&self, year: i32) -> HolidayMap {
        match self.try_lookup(year) {
            Ok(holidays) => holidays,
            Err(err) => {
                log::warn!("No holidays for {}: {}", year, err);
                HolidayMap::new()
            }
        }
    }
}

impl<T: HolidaySource + ?Sized> HolidaySource for Box<T> {
    fn try_lookup(&self, year: i32) -> Result<HolidayMap> {
        (**self).try_lookup(year)
    }
}

pub fn ingest(year: i32, raw: RawYear) -> HolidayMap {
    raw.into_iter()
        .filter(|(_, names)| !names.is_empty())
        .filter_map(|(key, names)| match key.parse::<DateKey>() {
            Ok(key) if key.year() == year => Some((key, names)),
            Ok(key) => {
                log::warn!("Holiday {} listed under year {}, skipping", key, year);
                None
            }
            Err(err) => {
                log::warn!("Skipping holiday entry: {}", err);
                None
            }
        })
        .map(|(key, names)| {
            let info = HolidayInfo {
                name: names.join(NAME_SEPARATOR),
                is_substitute: names.iter().any(|name| name.contains(SUBSTITUTE_MARKER)),
            };
            (key, info)
        })
        .collect()
}

static BUNDLED_DATASET: Lazy<std::result::Result<RawDataset, String>> =
    Lazy::new(|| toml::from_str(BUNDLED_KR).map_err(|err| err.to_string()));

/// Korean public holidays shipped with the binary.
#[derive(Clone, Copy, Debug, Default)]
pub struct BundledHolidays;

impl HolidaySource for BundledHolidays {
    fn try_lookup(&self, year: i32) -> Result<HolidayMap> {
        let dataset = BUNDLED_DATASET
            .as_ref()
            .map_err(|msg| Error::new(ErrorKind::HolidayData, msg))?;

        match dataset.0.get(&year.to_string()) {
            Some(raw) => Ok(ingest(year, raw.clone())),
            None => {
                log::info!("Holiday data not available for year {}", year);
                Ok(HolidayMap::new())
            }
        }
    }
}

/// Directory of `{year}.toml` files, each a table of `"YYYY-MM-DD" = ["name", ...]`.
#[derive(Clone, Debug)]
pub struct HolidayDir {
    path: PathBuf,
}

impl HolidayDir {
    pub fn new(path: &Path) -> Self {
        HolidayDir {
            path: path.to_owned(),
        }
    }

    fn file_for(&self, year: i32) -> PathBuf {
        self.path.join(format!("{}.toml", year))
    }
}

impl HolidaySource for HolidayDir {
    fn try_lookup(&self, year: i32) -> Result<HolidayMap> {
        let file = self.file_for(year);
        if !file.exists() {
            log::info!("No holiday file at '{}'", file.display());
            return Ok(HolidayMap::new());
        }

        let raw: RawYear = toml::from_str(&fs::read_to_string(&file)?).map_err(|err| {
            Error::new(
                ErrorKind::HolidayData,
                &format!("'{}': {}", file.display(), err),
            )
        })?;

        Ok(ingest(year, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn bundled_data_parses() {
        assert!(BUNDLED_DATASET.is_ok());
    }

    #[test]
    fn bundled_2026_new_year() {
        let holidays = BundledHolidays.lookup(2026);
        let new_year = holidays.get(&key("2026-01-01")).unwrap();
        assert_eq!(new_year.name, "신정");
        assert!(!new_year.is_substitute);
    }

    #[test]
    fn same_day_names_are_joined() {
        let holidays = BundledHolidays.lookup(2025);
        assert_eq!(
            holidays.get(&key("2025-05-05")).unwrap().name,
            "어린이날, 부처님 오신 날"
        );
    }

    #[test]
    fn substitute_holidays_are_flagged() {
        let holidays = BundledHolidays.lookup(2026);
        assert!(holidays.get(&key("2026-03-02")).unwrap().is_substitute);
    }

    #[test]
    fn unknown_year_yields_empty_map() {
        assert!(BundledHolidays.lookup(1999).is_empty());
        assert!(BundledHolidays.try_lookup(2100).unwrap().is_empty());
    }

    #[test]
    fn ingest_drops_invalid_and_foreign_entries() {
        let mut raw = RawYear::new();
        raw.insert("2026-13-01".to_owned(), vec!["bogus".to_owned()]);
        raw.insert("2025-12-25".to_owned(), vec!["크리스마스".to_owned()]);
        raw.insert("2026-12-25".to_owned(), vec!["크리스마스".to_owned()]);
        raw.insert("2026-12-26".to_owned(), vec![]);

        let holidays = ingest(2026, raw);
        assert_eq!(holidays.len(), 1);
        assert!(holidays.contains_key(&key("2026-12-25")));
    }

    #[test]
    fn reads_year_files_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("2030.toml"),
            "\"2030-01-01\" = [\"신정\"]\n\"2030-02-04\" = [\"설날\", \"대체공휴일\"]\n",
        )
        .unwrap();

        let source = HolidayDir::new(dir.path());
        let holidays = source.lookup(2030);
        assert_eq!(holidays.len(), 2);
        let seollal = holidays.get(&key("2030-02-04")).unwrap();
        assert_eq!(seollal.name, "설날, 대체공휴일");
        assert!(seollal.is_substitute);

        assert!(source.lookup(2031).is_empty());
    }

    #[test]
    fn malformed_file_degrades_to_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("2030.toml"), "not = [valid").unwrap();

        let source = HolidayDir::new(dir.path());
        assert!(source.try_lookup(2030).is_err());
        assert!(source.lookup(2030).is_empty());
    }
}
