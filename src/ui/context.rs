use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Instant;

use derive_more::Constructor;
use unsegen::base::style::*;
use unsegen::input::{Navigatable, OperationResult};
use unsegen::widget::builtin::{LineEdit, PromptLine};

use crate::calendar::{days_of_month, DateKey, MONTHS_PER_YEAR};
use crate::config::Config;
use crate::error::{ErrorKind, Result};
use crate::events::Event;
use crate::export::{ExportSettings, ExportSnapshot, Exporter};
use crate::i18n::{self, Language, UiStrings};
use crate::layout::AxisOrientation;
use crate::paper::{PageLayoutMode, PageOrientation, PaperSize, PaperSpec};
use crate::store::debounce::Debouncer;
use crate::store::{Action, CalendarState, InteractionStore};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Normal,
    Command,
    Edit,
}

#[derive(Clone, Debug)]
pub struct Theme {
    pub header_style: StyleModifier,
    pub label_style: StyleModifier,
    pub regular_style: StyleModifier,
    pub weekend_style: StyleModifier,
    pub holiday_style: StyleModifier,
    pub empty_style: StyleModifier,
    pub focus_style: StyleModifier,
    pub note_char: char,
    pub status_style: StyleModifier,
    pub error_style: StyleModifier,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            header_style: StyleModifier::default()
                .fg_color(Color::Yellow)
                .format(TextFormatModifier::default().bold(true)),
            label_style: StyleModifier::default().fg_color(Color::Yellow),
            regular_style: StyleModifier::default(),
            weekend_style: StyleModifier::default().fg_color(Color::Cyan),
            holiday_style: StyleModifier::default().fg_color(Color::LightRed),
            empty_style: StyleModifier::default().fg_color(Color::LightBlack),
            focus_style: StyleModifier::default().bg_color(Color::Blue),
            note_char: '•',
            status_style: StyleModifier::default().invert(true),
            error_style: StyleModifier::default().fg_color(Color::Red),
        }
    }
}

/// Selected cell, as zero-based month and one-based day slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Constructor)]
pub struct GridCursor {
    pub month_index: usize,
    pub slot: u32,
}

impl GridCursor {
    pub fn key(&self, year: i32) -> Option<DateKey> {
        chrono::NaiveDate::from_ymd_opt(year, self.month_index as u32 + 1, self.slot)
            .map(DateKey::from)
    }

    fn move_slot(&mut self, year: i32, delta: i32) -> OperationResult {
        let last = days_of_month(year, self.month_index) as i32;
        let next = self.slot as i32 + delta;
        if next < 1 || next > last {
            return Err(());
        }
        self.slot = next as u32;
        Ok(())
    }

    fn move_month(&mut self, year: i32, delta: i32) -> OperationResult {
        let next = self.month_index as i32 + delta;
        if next < 0 || next >= MONTHS_PER_YEAR as i32 {
            return Err(());
        }
        self.month_index = next as usize;
        self.slot = self.slot.min(days_of_month(year, self.month_index));
        Ok(())
    }
}

pub struct NoteEditor {
    pub key: DateKey,
    pub line: LineEdit,
    pub debounce: Debouncer<String>,
}

pub enum Status {
    Info(String),
    Error(String),
}

pub struct Context {
    store: InteractionStore,
    exporter: Exporter,
    sink: mpsc::Sender<Event>,
    pub paper: PaperSpec,
    /// Whether the page orientation was picked by the user or follows the axis.
    orientation_pinned: bool,
    pub cursor: GridCursor,
    pub mode: Mode,
    pub theme: Theme,
    pub command_line: PromptLine,
    pub editor: Option<NoteEditor>,
    pub status: Option<Status>,
    pub quit: bool,
}

impl Context {
    pub fn new(
        store: InteractionStore,
        config: &Config,
        sink: mpsc::Sender<Event>,
        today: chrono::NaiveDate,
    ) -> Self {
        use chrono::Datelike;

        let state = store.state();
        let cursor = if today.year() == state.selected_year {
            GridCursor::new(today.month0() as usize, today.day())
        } else {
            GridCursor::new(0, 1)
        };

        Context {
            paper: config.paper_spec(state.axis),
            orientation_pinned: config.export.page_orientation.is_some(),
            store,
            exporter: Exporter::new(ExportSettings::from_config(config)),
            sink,
            cursor,
            mode: Mode::Normal,
            theme: Theme::default(),
            command_line: PromptLine::with_prompt(":".to_owned()),
            editor: None,
            status: None,
            quit: false,
        }
    }

    pub fn state(&self) -> &CalendarState {
        self.store.state()
    }

    pub fn ui(&self) -> &'static UiStrings {
        &i18n::resolve(self.state().language).ui
    }

    pub fn selected_key(&self) -> Option<DateKey> {
        self.cursor.key(self.state().selected_year)
    }

    pub fn is_exporting(&self) -> bool {
        self.exporter.is_busy()
    }

    pub fn set_year(&mut self, year: i32) -> Result<()> {
        self.abort_edit();
        self.store.set_year(year)?;
        let last = days_of_month(year, self.cursor.month_index);
        self.cursor.slot = self.cursor.slot.min(last);
        Ok(())
    }

    pub fn set_language(&mut self, language: Language) {
        self.store.dispatch(Action::SetLanguage(language));
    }

    pub fn set_axis(&mut self, axis: AxisOrientation) {
        self.store.dispatch(Action::SetAxis(axis));
        if !self.orientation_pinned {
            self.paper.page_orientation = PageOrientation::suggested_for(axis);
        }
    }

    pub fn set_paper_size(&mut self, paper_size: PaperSize) {
        self.paper.paper_size = paper_size;
    }

    pub fn set_page_orientation(&mut self, orientation: PageOrientation) {
        self.paper.page_orientation = orientation;
        self.orientation_pinned = true;
    }

    pub fn set_layout_mode(&mut self, mode: PageLayoutMode) {
        self.paper.page_layout_mode = mode;
    }

    pub fn clear_year(&mut self) {
        self.abort_edit();
        self.store.dispatch(Action::ClearYear);
    }

    pub fn begin_edit(&mut self) {
        let key = match self.selected_key() {
            Some(key) => key,
            None => return,
        };
        let mut line = LineEdit::new();
        if let Some(note) = self.state().note(&key) {
            line.set(note);
        }
        self.editor = Some(NoteEditor {
            key,
            line,
            debounce: Debouncer::default(),
        });
        self.mode = Mode::Edit;
    }

    /// Restarts the debounce timer with the editor's current text.
    pub fn edit_changed(&mut self, now: Instant) {
        if let Some(editor) = self.editor.as_mut() {
            editor.debounce.schedule(editor.line.get().to_owned(), now);
        }
    }

    /// Commits the pending text now and closes the editor.
    pub fn finish_edit(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            if let Some(value) = editor.debounce.flush() {
                self.store.update_note(editor.key, value);
            }
        }
        self.mode = Mode::Normal;
    }

    /// Closes the editor, dropping whatever the debounce timer still holds.
    pub fn abort_edit(&mut self) {
        if let Some(mut editor) = self.editor.take() {
            editor.debounce.cancel();
        }
        if self.mode == Mode::Edit {
            self.mode = Mode::Normal;
        }
    }

    pub fn tick(&mut self, now: Instant) {
        let committed = self
            .editor
            .as_mut()
            .and_then(|editor| editor.debounce.poll(now).map(|value| (editor.key, value)));
        if let Some((key, value)) = committed {
            self.store.update_note(key, value);
        }
    }

    pub fn request_export(&mut self) {
        let snapshot = ExportSnapshot::of(self.state(), self.paper);
        match self.exporter.start(snapshot, self.sink.clone()) {
            Ok(()) => self.status = Some(Status::Info(self.ui().export_started.to_owned())),
            Err(err) => {
                let message = match err.kind {
                    ErrorKind::ExportBusy => self.ui().export_busy.to_owned(),
                    _ => format!("{}: {}", self.ui().export_failed, err),
                };
                self.status = Some(Status::Error(message));
            }
        }
    }

    pub fn on_export_finished(&mut self, result: Result<PathBuf>) {
        self.status = Some(match result {
            Ok(path) => Status::Info(format!("{}: {}", self.ui().export_done, path.display())),
            Err(err) => Status::Error(format!("{}: {}", self.ui().export_failed, err)),
        });
    }
}

/// Moves the cursor along the grid as it is drawn for the current axis.
pub struct CursorBehaviour<'a>(pub &'a mut Context);

impl Navigatable for CursorBehaviour<'_> {
    fn move_down(&mut self) -> OperationResult {
        let year = self.0.state().selected_year;
        match self.0.state().axis {
            AxisOrientation::Horizontal => self.0.cursor.move_month(year, 1),
            AxisOrientation::Vertical => self.0.cursor.move_slot(year, 1),
        }
    }

    fn move_left(&mut self) -> OperationResult {
        let year = self.0.state().selected_year;
        match self.0.state().axis {
            AxisOrientation::Horizontal => self.0.cursor.move_slot(year, -1),
            AxisOrientation::Vertical => self.0.cursor.move_month(year, -1),
        }
    }

    fn move_right(&mut self) -> OperationResult {
        let year = self.0.state().selected_year;
        match self.0.state().axis {
            AxisOrientation::Horizontal => self.0.cursor.move_slot(year, 1),
            AxisOrientation::Vertical => self.0.cursor.move_month(year, 1),
        }
    }

    fn move_up(&mut self) -> OperationResult {
        let year = self.0.state().selected_year;
        match self.0.state().axis {
            AxisOrientation::Horizontal => self.0.cursor.move_month(year, -1),
            AxisOrientation::Vertical => self.0.cursor.move_slot(year, -1),
        }
    }
}
