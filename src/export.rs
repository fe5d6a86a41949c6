//! Document generation off the input thread.
//!
//! An export works on an owned snapshot of the store, so nothing crosses the
//! thread boundary by reference. At most one export runs at a time; a request
//! while one is in flight is rejected with `ErrorKind::ExportBusy`.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;

use crate::calendar::{NoteMap, YearGrid};
use crate::config::Config;
use crate::error::{Error, ErrorKind, Result};
use crate::events::Event;
use crate::i18n::Language;
use crate::layout::AxisOrientation;
use crate::paper::PaperSpec;
use crate::render::{self, pdf, RenderInput};
use crate::store::CalendarState;

#[derive(Clone, Debug)]
pub struct ExportSnapshot {
    pub grid: YearGrid,
    pub notes: NoteMap,
    pub language: Language,
    pub axis: AxisOrientation,
    pub paper: PaperSpec,
}

impl ExportSnapshot {
    pub fn of(state: &CalendarState, paper: PaperSpec) -> Self {
        ExportSnapshot {
            grid: state.grid(),
            notes: state.notes.clone(),
            language: state.language,
            axis: state.axis,
            paper,
        }
    }

    pub fn render(&self, font: Option<&Path>) -> Result<Vec<u8>> {
        let input = RenderInput {
            grid: &self.grid,
            notes: &self.notes,
            language: self.language,
            axis: self.axis,
        };
        pdf::render(&input, self.paper, font)
    }

    pub fn file_name(&self) -> String {
        render::document_file_name(self.grid.year)
    }
}

#[derive(Clone, Debug)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    pub font: Option<PathBuf>,
}

impl ExportSettings {
    pub fn from_config(config: &Config) -> Self {
        ExportSettings {
            output_dir: config.export.output_dir.clone(),
            font: config.export.font.clone(),
        }
    }
}

/// Renders and writes the document, returning the written path.
pub fn export_to(snapshot: &ExportSnapshot, settings: &ExportSettings) -> Result<PathBuf> {
    let bytes = snapshot.render(settings.font.as_deref())?;
    fs::create_dir_all(&settings.output_dir)?;
    let path = settings.output_dir.join(snapshot.file_name());
    fs::write(&path, bytes)?;
    log::info!("Exported {} to '{}'", snapshot.grid.year, path.display());
    Ok(path)
}

struct InFlight(Arc<AtomicBool>);

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct Exporter {
    settings: ExportSettings,
    in_flight: Arc<AtomicBool>,
}

impl Exporter {
    pub fn new(settings: ExportSettings) -> Self {
        Exporter {
            settings,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Starts an export in the background. The outcome arrives on `sink` as
    /// `Event::ExportFinished`, after the exporter accepts requests again.
    pub fn start(&self, snapshot: ExportSnapshot, sink: mpsc::Sender<Event>) -> Result<()> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(Error::from(ErrorKind::ExportBusy));
        }

        let guard = InFlight(Arc::clone(&self.in_flight));
        let settings = self.settings.clone();

        thread::Builder::new()
            .name("almanac-export".to_owned())
            .spawn(move || {
                let result = export_to(&snapshot, &settings);
                if let Err(err) = &result {
                    log::error!("Export of {} failed: {}", snapshot.grid.year, err);
                }
                drop(guard);
                if sink.send(Event::ExportFinished(result)).is_err() {
                    log::warn!("Export finished after the event loop stopped");
                }
            })?;

        Ok(())
    }
}
