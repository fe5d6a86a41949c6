use std::fmt::Write;

use unicode_width::UnicodeWidthStr;
use unsegen::base::style::StyleModifier;
use unsegen::base::{Cursor, Window};
use unsegen::widget::{ColDemand, Demand2D, RenderingHints, RowDemand, Widget};

use crate::calendar::{DateKey, NoteMap, YearGrid, MONTHS_PER_YEAR, SLOTS_PER_MONTH};
use crate::i18n::Translations;
use crate::layout::AxisOrientation;
use crate::render::{self, CellVariant};

use super::context::{GridCursor, Theme};

/// Terminal columns used by a single day cell.
const CELL_WIDTH: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenCell {
    pub variant: CellVariant,
    pub key: Option<DateKey>,
    pub has_note: bool,
    pub selected: bool,
    pub text: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenRow {
    pub label: String,
    pub cells: Vec<ScreenCell>,
}

/// Character grid of a year in the chosen axis, independent of any terminal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScreenGrid {
    pub corner: String,
    pub column_headers: Vec<String>,
    pub rows: Vec<ScreenRow>,
}

fn cell_text(day_number: Option<u32>, has_note: bool, note_char: char) -> String {
    let marker = if has_note { note_char } else { ' ' };
    match day_number {
        Some(n) => format!("{:>2}{}", n, marker),
        None => format!(" {} ", marker),
    }
}

fn screen_cell(
    grid: &YearGrid,
    notes: &NoteMap,
    axis: AxisOrientation,
    translations: &Translations,
    month_index: usize,
    slot: u32,
    cursor: Option<&GridCursor>,
    note_char: char,
) -> ScreenCell {
    let selected = cursor.map_or(false, |c| c.month_index == month_index && c.slot == slot);
    match grid.cell(month_index, slot) {
        Some(cell) => {
            let view = render::project(cell, axis, translations, notes);
            let has_note = view.note.is_some();
            ScreenCell {
                variant: view.variant,
                key: cell.day().map(|day| day.key),
                has_note,
                selected,
                text: cell_text(view.day_number, has_note, note_char),
            }
        }
        None => ScreenCell {
            variant: CellVariant::Empty,
            key: None,
            has_note: false,
            selected,
            text: cell_text(None, false, note_char),
        },
    }
}

fn short_month_name(translations: &Translations, month_index: usize) -> String {
    let name = translations.month_name(month_index);
    if name.is_ascii() {
        name.chars().take(3).collect()
    } else {
        name.to_owned()
    }
}

impl ScreenGrid {
    pub fn build(
        grid: &YearGrid,
        notes: &NoteMap,
        axis: AxisOrientation,
        translations: &Translations,
        cursor: Option<&GridCursor>,
        note_char: char,
    ) -> Self {
        let cell = |month_index: usize, slot: u32| {
            screen_cell(
                grid,
                notes,
                axis,
                translations,
                month_index,
                slot,
                cursor,
                note_char,
            )
        };

        match axis {
            AxisOrientation::Horizontal => ScreenGrid {
                corner: translations.ui.month_header.to_owned(),
                column_headers: (1..=SLOTS_PER_MONTH).map(|d| format!("{:>2}", d)).collect(),
                rows: (0..MONTHS_PER_YEAR)
                    .map(|m| ScreenRow {
                        label: short_month_name(translations, m),
                        cells: (1..=SLOTS_PER_MONTH as u32).map(|s| cell(m, s)).collect(),
                    })
                    .collect(),
            },
            AxisOrientation::Vertical => ScreenGrid {
                corner: translations.ui.day_header.to_owned(),
                column_headers: (0..MONTHS_PER_YEAR)
                    .map(|m| short_month_name(translations, m))
                    .collect(),
                rows: (1..=SLOTS_PER_MONTH as u32)
                    .map(|s| ScreenRow {
                        label: format!("{:>2}", s),
                        cells: (0..MONTHS_PER_YEAR).map(|m| cell(m, s)).collect(),
                    })
                    .collect(),
            },
        }
    }

    pub fn label_width(&self) -> usize {
        self.rows
            .iter()
            .map(|row| row.label.width())
            .chain(std::iter::once(self.corner.width()))
            .max()
            .unwrap_or(0)
            + 1
    }

    pub fn column_width(&self) -> usize {
        self.column_headers
            .iter()
            .map(|h| h.width() + 1)
            .max()
            .unwrap_or(0)
            .max(CELL_WIDTH)
    }

    pub fn width(&self) -> usize {
        self.label_width() + self.column_headers.len() * self.column_width()
    }

    pub fn selected(&self) -> Option<&ScreenCell> {
        self.rows
            .iter()
            .flat_map(|row| row.cells.iter())
            .find(|cell| cell.selected)
    }

    /// Undecorated rendering, one line per row, with a header line first.
    pub fn to_plain_string(&self) -> String {
        let label_width = self.label_width();
        let column_width = self.column_width();
        let mut out = String::new();

        out.push_str(&pad(&self.corner, label_width));
        for header in &self.column_headers {
            out.push_str(&pad(header, column_width));
        }
        out.push('\n');

        for row in &self.rows {
            out.push_str(&pad(&row.label, label_width));
            for cell in &row.cells {
                let text = match cell.variant {
                    CellVariant::Empty => " - ",
                    _ => &cell.text,
                };
                out.push_str(&pad(text, column_width));
            }
            out.push('\n');
        }
        out
    }
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

pub struct GridView<'a> {
    pub grid: &'a ScreenGrid,
    pub theme: &'a Theme,
}

impl GridView<'_> {
    fn cell_style(&self, cell: &ScreenCell) -> StyleModifier {
        if cell.selected {
            return self.theme.focus_style;
        }
        match cell.variant {
            CellVariant::Empty => self.theme.empty_style,
            CellVariant::Regular => self.theme.regular_style,
            CellVariant::Weekend => self.theme.weekend_style,
            CellVariant::Holiday => self.theme.holiday_style,
        }
    }
}

impl Widget for GridView<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(self.grid.width()),
            height: RowDemand::exact(self.grid.rows.len() + 1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let label_width = self.grid.label_width();
        let column_width = self.grid.column_width();
        let mut cursor = Cursor::new(&mut window);

        cursor.set_style_modifier(self.theme.header_style);
        write!(cursor, "{}", pad(&self.grid.corner, label_width)).unwrap();
        for header in &self.grid.column_headers {
            write!(cursor, "{}", pad(header, column_width)).unwrap();
        }

        for row in &self.grid.rows {
            cursor.set_style_modifier(StyleModifier::default());
            cursor.fill_and_wrap_line();
            cursor.set_style_modifier(self.theme.label_style);
            write!(cursor, "{}", pad(&row.label, label_width)).unwrap();

            for cell in &row.cells {
                cursor.set_style_modifier(self.cell_style(cell));
                write!(cursor, "{}", cell.text).unwrap();
                cursor.set_style_modifier(StyleModifier::default());
                write!(cursor, "{}", " ".repeat(column_width - CELL_WIDTH)).unwrap();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{self, HolidayMap};
    use crate::holidays::{BundledHolidays, HolidaySource};
    use crate::i18n::{self, Language};

    fn year_grid() -> YearGrid {
        let holidays: HolidayMap = BundledHolidays.lookup(2026);
        calendar::generate(2026, &holidays, Language::En)
    }

    fn notes() -> NoteMap {
        let mut notes = NoteMap::new();
        notes.insert("2026-03-05".parse().unwrap(), "buy milk".to_owned());
        notes.insert("2026-03-06".parse().unwrap(), "   ".to_owned());
        notes
    }

    #[test]
    fn horizontal_grid_has_months_as_rows() {
        let t = i18n::resolve(Language::En);
        let screen = ScreenGrid::build(
            &year_grid(),
            &notes(),
            AxisOrientation::Horizontal,
            t,
            None,
            '*',
        );
        assert_eq!(screen.rows.len(), 12);
        assert!(screen.rows.iter().all(|row| row.cells.len() == 31));
        assert_eq!(screen.rows[0].label, "Jan");
        assert_eq!(screen.column_headers[30], "31");

        let march = &screen.rows[2];
        assert_eq!(march.cells[4].text, " 5*");
        assert!(march.cells[4].has_note);
        assert!(!march.cells[5].has_note);
        assert_eq!(march.cells[0].variant, CellVariant::Holiday);
        assert_eq!(screen.rows[1].cells[30].variant, CellVariant::Empty);
    }

    #[test]
    fn vertical_grid_has_days_as_rows() {
        let t = i18n::resolve(Language::En);
        let cursor = GridCursor::new(2, 5);
        let screen = ScreenGrid::build(
            &year_grid(),
            &notes(),
            AxisOrientation::Vertical,
            t,
            Some(&cursor),
            '*',
        );
        assert_eq!(screen.rows.len(), 31);
        assert!(screen.rows.iter().all(|row| row.cells.len() == 12));
        assert_eq!(screen.rows[4].label, " 5");
        assert_eq!(screen.rows[4].cells[2].text, " * ");

        let selected = screen.selected().unwrap();
        assert_eq!(selected.key.unwrap().to_string(), "2026-03-05");
    }

    #[test]
    fn plain_rendering_marks_empty_slots() {
        let t = i18n::resolve(Language::En);
        let screen = ScreenGrid::build(
            &year_grid(),
            &NoteMap::new(),
            AxisOrientation::Horizontal,
            t,
            None,
            '*',
        );
        let text = screen.to_plain_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 13);
        assert!(lines[0].starts_with(t.ui.month_header));
        assert!(lines[2].starts_with("Feb"));
        assert!(lines[2].trim_end().ends_with('-'));
        assert!(!lines[1].trim_end().ends_with('-'));
    }
}
