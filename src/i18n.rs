//! Locale-resolved strings.
//!
//! Holiday names are stored under their canonical Korean key and only
//! translated at display time, so grids and persisted data stay locale neutral.

use itertools::Itertools;
use phf::phf_map;
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, DeserializeFromStr, SerializeDisplay)]
pub enum Language {
    Ko,
    En,
}

impl Default for Language {
    fn default() -> Self {
        Language::Ko
    }
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Ko => "ko",
            Language::En => "en",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Language::Ko => Language::En,
            Language::En => Language::Ko,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ko" | "kr" | "korean" => Ok(Language::Ko),
            "en" | "english" => Ok(Language::En),
            other => Err(Error::new(
                ErrorKind::InvalidArgument,
                &format!("Language '{}' not supported, expected ko|en", other),
            )),
        }
    }
}

pub struct UiStrings {
    pub title: &'static str,
    pub first_half: &'static str,
    pub second_half: &'static str,
    pub month_header: &'static str,
    pub day_header: &'static str,
    pub export_started: &'static str,
    pub export_done: &'static str,
    pub export_failed: &'static str,
    pub export_busy: &'static str,
    pub no_note: &'static str,
}

pub struct Translations {
    pub month_names: [&'static str; 12],
    pub day_names: [&'static str; 7],
    holidays: &'static phf::Map<&'static str, &'static str>,
    pub ui: UiStrings,
}

impl Translations {
    /// Translates a holiday name. Names joined at ingestion (`"a, b"`) are
    /// translated part by part, unknown parts are kept verbatim.
    pub fn holiday_name<'a>(&self, key: &'a str) -> Cow<'a, str> {
        if let Some(name) = self.holidays.get(key) {
            return Cow::Borrowed(*name);
        }

        if key.contains(", ") {
            Cow::Owned(
                key.split(", ")
                    .map(|part| self.holidays.get(part).copied().unwrap_or(part))
                    .join(", "),
            )
        } else {
            Cow::Borrowed(key)
        }
    }

    pub fn month_name(&self, month_index: usize) -> &'static str {
        self.month_names[month_index]
    }
}

static HOLIDAYS_KO: phf::Map<&'static str, &'static str> = phf_map! {
    "신정" => "신정",
    "설날" => "설날",
    "삼일절" => "삼일절",
    "어린이날" => "어린이날",
    "부처님 오신 날" => "부처님 오신 날",
    "현충일" => "현충일",
    "광복절" => "광복절",
    "개천절" => "개천절",
    "한글날" => "한글날",
    "크리스마스" => "크리스마스",
    "대체공휴일" => "대체공휴일",
    "추석" => "추석",
    "국회의원 선거일" => "국회의원 선거일",
    "대통령 선거일" => "대통령 선거일",
    "전국동시지방선거" => "전국동시지방선거",
    "임시공휴일" => "임시공휴일",
    "국군의 날" => "국군의 날",
};

static HOLIDAYS_EN: phf::Map<&'static str, &'static str> = phf_map! {
    "신정" => "New Year's Day",
    "설날" => "Lunar New Year",
    "삼일절" => "Independence Movement Day",
    "어린이날" => "Children's Day",
    "부처님 오신 날" => "Buddha's Birthday",
    "현충일" => "Memorial Day",
    "광복절" => "Liberation Day",
    "개천절" => "National Foundation Day",
    "한글날" => "Hangeul Day",
    "크리스마스" => "Christmas",
    "대체공휴일" => "Substitute Holiday",
    "추석" => "Chuseok (Harvest Festival)",
    "국회의원 선거일" => "National Assembly Election Day",
    "대통령 선거일" => "Presidential Election Day",
    "전국동시지방선거" => "Local Election Day",
    "임시공휴일" => "Temporary Holiday",
    "국군의 날" => "Armed Forces Day",
};

static KO: Translations = Translations {
    month_names: [
        "1월", "2월", "3월", "4월", "5월", "6월", "7월", "8월", "9월", "10월", "11월", "12월",
    ],
    day_names: ["일", "월", "화", "수", "목", "금", "토"],
    holidays: &HOLIDAYS_KO,
    ui: UiStrings {
        title: "연간 캘린더",
        first_half: "1-6월",
        second_half: "7-12월",
        month_header: "월",
        day_header: "일",
        export_started: "PDF 생성 중...",
        export_done: "PDF 저장됨",
        export_failed: "PDF 생성에 실패했습니다",
        export_busy: "PDF 생성이 이미 진행 중입니다",
        no_note: "(메모 없음)",
    },
};

static EN: Translations = Translations {
    month_names: [
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December",
    ],
    day_names: ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"],
    holidays: &HOLIDAYS_EN,
    ui: UiStrings {
        title: "Yearly Calendar",
        first_half: "Jan-Jun",
        second_half: "Jul-Dec",
        month_header: "Month",
        day_header: "Day",
        export_started: "Generating PDF...",
        export_done: "PDF saved",
        export_failed: "Failed to generate PDF",
        export_busy: "Export already in progress",
        no_note: "(no note)",
    },
};

pub fn resolve(language: Language) -> &'static Translations {
    match language {
        Language::Ko => &KO,
        Language::En => &EN,
    }
}
