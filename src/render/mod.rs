//! Projection of day cells to the visual grammar shared by screen and print.

pub mod pdf;

use std::borrow::Cow;

use crate::calendar::{DayCell, NoteMap, YearGrid};
use crate::i18n::{self, Language, Translations};
use crate::layout::AxisOrientation;
use crate::pagination::PageGroup;
use crate::paper::PageLayoutMode;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellVariant {
    Empty,
    Regular,
    Weekend,
    Holiday,
}

impl CellVariant {
    pub fn of(cell: &DayCell) -> Self {
        match cell.day() {
            None => CellVariant::Empty,
            Some(day) if day.holiday.is_some() => CellVariant::Holiday,
            Some(day) if day.is_weekend => CellVariant::Weekend,
            Some(_) => CellVariant::Regular,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellView<'a> {
    pub variant: CellVariant,
    /// Omitted in the vertical axis, where the row label carries the day.
    pub day_number: Option<u32>,
    pub holiday_label: Option<Cow<'a, str>>,
    pub note: Option<&'a str>,
}

pub fn project<'a>(
    cell: &'a DayCell,
    axis: AxisOrientation,
    translations: &Translations,
    notes: &'a NoteMap,
) -> CellView<'a> {
    let variant = CellVariant::of(cell);
    let day = match cell.day() {
        Some(day) => day,
        None => {
            return CellView {
                variant,
                day_number: None,
                holiday_label: None,
                note: None,
            }
        }
    };

    CellView {
        variant,
        day_number: match axis {
            AxisOrientation::Horizontal => Some(day.day_of_month),
            AxisOrientation::Vertical => None,
        },
        holiday_label: day
            .holiday
            .as_ref()
            .map(|h| translations.holiday_name(&h.name)),
        note: notes
            .get(&day.key)
            .map(String::as_str)
            .filter(|text| !text.trim().is_empty()),
    }
}

/// Title printed in the band above the grid of a page.
pub fn page_title(
    year: i32,
    language: Language,
    mode: PageLayoutMode,
    group: &PageGroup<'_>,
) -> String {
    let ui = &i18n::resolve(language).ui;
    let base = format!("{} {}", year, ui.title);

    match (mode, group.first_month_index()) {
        (PageLayoutMode::TwoPage, Some(0)) => format!("{} - {}", base, ui.first_half),
        (PageLayoutMode::TwoPage, Some(_)) => format!("{} - {}", base, ui.second_half),
        _ => base,
    }
}

/// Output file name for an exported year.
pub fn document_file_name(year: i32) -> String {
    format!("calendar-{}.pdf", year)
}

/// Rough advance width of a glyph relative to the font size.
fn glyph_width(c: char, font_size: f32) -> f32 {
    let factor = match c {
        ' ' | 'i' | 'l' | 'j' | '.' | ',' | '\'' | '!' | '|' => 0.28,
        c if c.is_ascii_uppercase() || c == 'm' || c == 'w' => 0.72,
        c if c.is_ascii() => 0.52,
        // Hangul, CJK and other wide scripts
        _ => 1.0,
    };
    factor * font_size
}

pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(|c| glyph_width(c, font_size)).sum()
}

fn wrap(text: &str, max_width: f32, font_size: f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.trim().lines() {
        let mut current = String::new();
        let mut width = 0.0;
        for c in paragraph.chars() {
            let w = glyph_width(c, font_size);
            if width + w > max_width && !current.is_empty() {
                lines.push(current.trim_end().to_owned());
                current.clear();
                width = 0.0;
            }
            if current.is_empty() && c == ' ' {
                continue;
            }
            current.push(c);
            width += w;
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}

/// Breaks `text` into at most `max_lines` lines no wider than `max_width`.
/// Overflowing text is cut and marked with `..`.
pub fn fit_lines(text: &str, max_width: f32, font_size: f32, max_lines: usize) -> Vec<String> {
    if max_lines == 0 || max_width <= 0.0 {
        return Vec::new();
    }

    let mut lines = wrap(text, max_width, font_size);
    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            const ELLIPSIS: &str = "..";
            // too narrow for the marker, the line is only cut
            let marker = if text_width(ELLIPSIS, font_size) <= max_width {
                ELLIPSIS
            } else {
                ""
            };
            while !last.is_empty()
                && text_width(last, font_size) + text_width(marker, font_size) > max_width
            {
                last.pop();
            }
            last.push_str(marker);
        }
        lines.retain(|line| !line.is_empty());
    }

    lines
}

/// Everything a renderer needs for one year, borrowed from the store.
#[derive(Clone, Copy, Debug)]
pub struct RenderInput<'a> {
    pub grid: &'a YearGrid,
    pub notes: &'a NoteMap,
    pub language: Language,
    pub axis: AxisOrientation,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{generate, DateKey, HolidayInfo, HolidayMap};
    use crate::pagination::paginate;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn grid_with_holiday(date: &str, name: &str) -> YearGrid {
        let mut holidays = HolidayMap::new();
        holidays.insert(
            key(date),
            HolidayInfo {
                name: name.to_owned(),
                is_substitute: false,
            },
        );
        generate(2026, &holidays, Language::En)
    }

    #[test]
    fn holiday_wins_over_weekend() {
        // 2026-03-01 is a Sunday
        let grid = grid_with_holiday("2026-03-01", "삼일절");
        let cell = grid.cell(2, 1).unwrap();
        assert!(cell.day().unwrap().is_weekend);
        assert_eq!(CellVariant::of(cell), CellVariant::Holiday);
    }

    #[test]
    fn variants_cover_every_cell_kind() {
        let grid = grid_with_holiday("2026-01-01", "신정");
        assert_eq!(CellVariant::of(grid.cell(1, 30).unwrap()), CellVariant::Empty);
        assert_eq!(CellVariant::of(grid.cell(0, 1).unwrap()), CellVariant::Holiday);
        // Saturday
        assert_eq!(CellVariant::of(grid.cell(0, 3).unwrap()), CellVariant::Weekend);
        // Monday
        assert_eq!(CellVariant::of(grid.cell(0, 5).unwrap()), CellVariant::Regular);
    }

    #[test]
    fn projection_translates_holiday_and_skips_blank_notes() {
        let grid = grid_with_holiday("2026-01-01", "신정");
        let mut notes = NoteMap::new();
        notes.insert(key("2026-01-01"), "party".to_owned());
        notes.insert(key("2026-01-02"), "   ".to_owned());

        let t = i18n::resolve(Language::En);
        let first = project(grid.cell(0, 1).unwrap(), AxisOrientation::Horizontal, t, &notes);
        assert_eq!(first.day_number, Some(1));
        assert_eq!(first.holiday_label.as_deref(), Some("New Year's Day"));
        assert_eq!(first.note, Some("party"));

        let second = project(grid.cell(0, 2).unwrap(), AxisOrientation::Horizontal, t, &notes);
        assert_eq!(second.note, None);
        assert_eq!(second.holiday_label, None);
    }

    #[test]
    fn vertical_axis_drops_day_number() {
        let grid = grid_with_holiday("2026-01-01", "신정");
        let notes = NoteMap::new();
        let view = project(
            grid.cell(0, 1).unwrap(),
            AxisOrientation::Vertical,
            i18n::resolve(Language::Ko),
            &notes,
        );
        assert_eq!(view.day_number, None);
        assert_eq!(view.holiday_label.as_deref(), Some("신정"));
    }

    #[test]
    fn empty_cells_carry_nothing() {
        let grid = grid_with_holiday("2026-01-01", "신정");
        let notes = NoteMap::new();
        let view = project(
            grid.cell(1, 31).unwrap(),
            AxisOrientation::Horizontal,
            i18n::resolve(Language::En),
            &notes,
        );
        assert_eq!(view.variant, CellVariant::Empty);
        assert_eq!(view.day_number, None);
        assert_eq!(view.note, None);
    }

    #[test]
    fn titles_follow_page_group() {
        let grid = generate(2026, &HolidayMap::new(), Language::Ko);
        let pages = paginate(&grid.months, PageLayoutMode::TwoPage);
        assert_eq!(
            page_title(2026, Language::Ko, PageLayoutMode::TwoPage, &pages[0]),
            "2026 연간 캘린더 - 1-6월"
        );
        assert_eq!(
            page_title(2026, Language::En, PageLayoutMode::TwoPage, &pages[1]),
            "2026 Yearly Calendar - Jul-Dec"
        );

        let single = paginate(&grid.months, PageLayoutMode::Single);
        assert_eq!(
            page_title(2026, Language::En, PageLayoutMode::Single, &single[0]),
            "2026 Yearly Calendar"
        );
    }

    #[test]
    fn file_name_is_derived_from_year() {
        assert_eq!(document_file_name(2026), "calendar-2026.pdf");
    }

    #[test]
    fn short_text_fits_on_one_line() {
        assert_eq!(fit_lines("milk", 100.0, 5.0, 3), vec!["milk".to_owned()]);
    }

    #[test]
    fn long_text_wraps_and_truncates() {
        let lines = fit_lines("buy milk and bread and eggs", 20.0, 5.0, 2);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].ends_with(".."));
        for line in lines.iter() {
            assert!(text_width(line, 5.0) <= 20.0 + 1e-3, "{}", line);
        }
    }

    #[test]
    fn marker_is_left_out_when_it_does_not_fit() {
        // ".." is 2.8 wide at this size, each letter 1.4
        let lines = fit_lines("il il il", 2.0, 5.0, 2);
        assert_eq!(lines, vec!["i".to_owned(), "l".to_owned()]);
        for line in lines.iter() {
            assert!(text_width(line, 5.0) <= 2.0, "{}", line);
        }
    }

    #[test]
    fn no_room_yields_no_lines() {
        assert!(fit_lines("milk", 10.0, 5.0, 0).is_empty());
        assert!(fit_lines("milk", 0.0, 5.0, 2).is_empty());
    }
}
