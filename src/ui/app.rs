use std::convert::TryFrom;
use std::fmt::Write;
use std::time::Instant;

use crate::events::{Dispatcher, Event};
use crate::i18n;

use super::context::{Context, CursorBehaviour, Mode, Status};
use super::grid::{GridView, ScreenGrid};

use unsegen::base::{Cursor, GraphemeCluster, Terminal, Window};
use unsegen::input::{EditBehavior, Input, Key, NavigateBehavior, ScrollBehavior};
use unsegen::widget::*;

use super::command::CommandParser;

/// One-line summary of the selected day below the grid.
struct DetailBar<'a> {
    context: &'a Context,
}

impl Widget for DetailBar<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(1),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let state = self.context.state();
        let translations = i18n::resolve(state.language);
        let key = match self.context.selected_key() {
            Some(key) => key,
            None => return,
        };

        let mut cursor = Cursor::new(&mut window);
        write!(cursor, "{}", key).unwrap();

        let grid = state.grid();
        if let Some(holiday) = grid.day(&key).and_then(|day| day.holiday.as_ref()) {
            cursor.set_style_modifier(self.context.theme.holiday_style);
            write!(cursor, "  {}", translations.holiday_name(&holiday.name)).unwrap();
            cursor.set_style_modifier(Default::default());
        }

        let note = state.note(&key).unwrap_or(translations.ui.no_note);
        write!(cursor, "  {}", note).unwrap();
    }
}

struct TitleBar<'a> {
    context: &'a Context,
}

impl Widget for TitleBar<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(1),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let state = self.context.state();
        let ui = self.context.ui();
        let paper = &self.context.paper;

        let mut cursor = Cursor::new(&mut window).style_modifier(self.context.theme.header_style);
        write!(
            cursor,
            "{} {}  [{} | {}] {} {} {}",
            state.selected_year,
            ui.title,
            state.language,
            state.axis,
            paper.paper_size,
            paper.page_orientation,
            paper.page_layout_mode,
        )
        .unwrap();
        if self.context.is_exporting() {
            write!(cursor, "  {}", ui.export_started).unwrap();
        }
    }
}

struct StatusLine<'a> {
    context: &'a Context,
}

impl Widget for StatusLine<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(1),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        let theme = &self.context.theme;
        let mut cursor = Cursor::new(&mut window);
        match &self.context.status {
            Some(Status::Info(msg)) => {
                cursor.set_style_modifier(theme.status_style);
                write!(cursor, "{}", msg).unwrap();
            }
            Some(Status::Error(msg)) => {
                cursor.set_style_modifier(theme.error_style);
                write!(cursor, "{}", msg).unwrap();
            }
            None => {}
        }
    }
}

struct Label<'a>(&'a str);

impl Widget for Label<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::exact(self.0.chars().count()),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, mut window: Window, _hints: RenderingHints) {
        write!(Cursor::new(&mut window), "{}", self.0).unwrap();
    }
}

/// Command line, note editor or status, depending on the mode.
struct BottomBar<'a> {
    context: &'a Context,
}

impl Widget for BottomBar<'_> {
    fn space_demand(&self) -> Demand2D {
        Demand2D {
            width: ColDemand::at_least(1),
            height: RowDemand::exact(1),
        }
    }

    fn draw(&self, window: Window, hints: RenderingHints) {
        match (self.context.mode, &self.context.editor) {
            (Mode::Command, _) => self.context.command_line.as_widget().draw(window, hints),
            (Mode::Edit, Some(editor)) => {
                let prompt = format!("{}>", editor.key);
                HLayout::new()
                    .separator(GraphemeCluster::try_from(' ').unwrap())
                    .widget(Label(&prompt))
                    .widget(editor.line.as_widget())
                    .draw(window, hints);
            }
            _ => StatusLine {
                context: self.context,
            }
            .draw(window, hints),
        }
    }
}

pub struct App {
    context: Context,
}

impl App {
    pub fn new(context: Context) -> App {
        App { context }
    }

    fn draw(&self, window: Window, screen: &ScreenGrid) {
        VLayout::new()
            .widget(TitleBar {
                context: &self.context,
            })
            .widget(GridView {
                grid: screen,
                theme: &self.context.theme,
            })
            .widget(DetailBar {
                context: &self.context,
            })
            .widget(BottomBar {
                context: &self.context,
            })
            .draw(window, RenderingHints::new());
    }

    fn screen(&self) -> ScreenGrid {
        let state = self.context.state();
        ScreenGrid::build(
            &state.grid(),
            &state.notes,
            state.axis,
            i18n::resolve(state.language),
            Some(&self.context.cursor),
            self.context.theme.note_char,
        )
    }

    fn handle_input(&mut self, input: Input) {
        if input.matches(Key::Esc) {
            self.context.abort_edit();
            self.context.mode = Mode::Normal;
            return;
        }

        match self.context.mode {
            Mode::Normal => {
                let mut edit = false;
                let mut export = false;
                let mut quit = false;
                input
                    .chain((Key::Char('q'), || quit = true))
                    .chain((Key::Char(':'), || self.context.mode = Mode::Command))
                    .chain((Key::Char('i'), || edit = true))
                    .chain((Key::Char('\n'), || edit = true))
                    .chain((Key::Char('e'), || export = true))
                    .chain(
                        NavigateBehavior::new(&mut CursorBehaviour(&mut self.context))
                            .down_on(Key::Char('j'))
                            .up_on(Key::Char('k'))
                            .left_on(Key::Char('h'))
                            .right_on(Key::Char('l'))
                            .down_on(Key::Down)
                            .up_on(Key::Up)
                            .left_on(Key::Left)
                            .right_on(Key::Right),
                    )
                    .finish();

                self.context.quit |= quit;
                if edit {
                    self.context.begin_edit();
                }
                if export {
                    self.context.request_export();
                }
            }
            Mode::Edit => {
                if input.matches(Key::Char('\n')) {
                    self.context.finish_edit();
                    return;
                }
                let changed = match self.context.editor.as_mut() {
                    Some(editor) => {
                        let before = editor.line.get().to_owned();
                        input
                            .chain(
                                EditBehavior::new(&mut editor.line)
                                    .delete_forwards_on(Key::Delete)
                                    .delete_backwards_on(Key::Backspace)
                                    .left_on(Key::Left)
                                    .right_on(Key::Right),
                            )
                            .finish();
                        editor.line.get() != before
                    }
                    None => false,
                };
                if changed {
                    self.context.edit_changed(Instant::now());
                }
            }
            Mode::Command => {
                input
                    .chain(
                        EditBehavior::new(&mut self.context.command_line)
                            .delete_forwards_on(Key::Delete)
                            .delete_backwards_on(Key::Backspace)
                            .left_on(Key::Left)
                            .right_on(Key::Right),
                    )
                    .chain(
                        ScrollBehavior::new(&mut self.context.command_line)
                            .backwards_on(Key::Up)
                            .forwards_on(Key::Down),
                    )
                    .chain(CommandParser::new(&mut self.context))
                    .finish();
            }
        }
    }

    pub fn run(
        &mut self,
        dispatcher: Dispatcher,
        mut term: Terminal,
    ) -> Result<(), Box<dyn std::error::Error>> {
        while !self.context.quit {
            match dispatcher.next()? {
                Event::Update => self.context.tick(Instant::now()),
                Event::Input(input) => self.handle_input(input),
                Event::Signal(signal) => log::debug!("Redrawing after {:?}", signal),
                Event::ExportFinished(result) => self.context.on_export_finished(result),
            }

            let screen = self.screen();
            let root = term.create_root_window();
            self.draw(root, &screen);
            term.present();
        }

        // an edit still waiting for its debounce is kept
        self.context.finish_edit();
        Ok(())
    }
}
