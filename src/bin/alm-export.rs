extern crate almanac as lib;

use chrono::Datelike;
use flexi_logger::{Duplicate, FileSpec, Logger};
use lib::export::{export_to, ExportSettings, ExportSnapshot};
use lib::holidays::HolidaySource;
use lib::i18n::Language;
use lib::layout::AxisOrientation;
use lib::paper::{PageLayoutMode, PageOrientation, PaperSize, PaperSpec};
use lib::store::storage::{self, FileStorage, Storage};
use lib::store::{Action, CalendarState};
use std::path::PathBuf;
use std::str::FromStr;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "alm-export",
    about = "Writes the yearly planner of the almanac suite as a PDF document."
)]
pub struct Args {
    #[structopt(
        name = "CONFIG",
        short = "c",
        long = "config",
        help = "path to config file",
        parse(from_os_str)
    )]
    pub configfile: Option<PathBuf>,

    #[structopt(short = "y", long = "year", help = "year to export")]
    pub year: Option<i32>,

    #[structopt(long = "paper", help = "A4, A3, B4 or Letter")]
    pub paper: Option<PaperSize>,

    #[structopt(long = "page-orientation", help = "portrait or landscape")]
    pub page_orientation: Option<PageOrientation>,

    #[structopt(long = "layout", help = "single or two-page")]
    pub layout: Option<PageLayoutMode>,

    #[structopt(long = "axis", help = "horizontal or vertical")]
    pub axis: Option<AxisOrientation>,

    #[structopt(long = "lang", help = "ko or en")]
    pub language: Option<Language>,

    #[structopt(
        short = "o",
        long = "output",
        help = "directory the document is written to",
        parse(from_os_str)
    )]
    pub output: Option<PathBuf>,

    #[structopt(long = "font", help = "TrueType font for the document", parse(from_os_str))]
    pub font: Option<PathBuf>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn stored_pref<T: FromStr>(store: &FileStorage, key: &str) -> Option<T> {
    match store.get(key) {
        Ok(value) => value.and_then(|value| value.parse().ok()),
        Err(err) => {
            log::warn!("Could not read '{}' from the store: {}", key, err);
            None
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    let mut logger = Logger::try_with_env_or_str("info")?.duplicate_to_stderr(Duplicate::Warn);

    if let Some(log_file) = args.log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    logger.start()?;

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;
    let defaults = config.defaults(chrono::Local::now().year());

    // storage is only read, the interactive client's preferences stay untouched
    let store = FileStorage::open_dir(&config.data_dir())?;

    let year = args
        .year
        .or_else(|| stored_pref(&store, storage::YEAR_KEY))
        .unwrap_or(defaults.year);
    let year = lib::calendar::validate_year(year)?;
    let language = args
        .language
        .or_else(|| stored_pref(&store, storage::LANGUAGE_KEY))
        .unwrap_or(defaults.language);
    let axis = args
        .axis
        .or_else(|| stored_pref(&store, storage::AXIS_KEY))
        .unwrap_or(defaults.axis);

    let mut paper: PaperSpec = config.paper_spec(axis);
    if let Some(size) = args.paper {
        paper.paper_size = size;
    }
    if let Some(orientation) = args.page_orientation {
        paper.page_orientation = orientation;
    }
    if let Some(layout) = args.layout {
        paper.page_layout_mode = layout;
    }

    let notes = match store.get(&storage::notes_key(year))? {
        Some(raw) => storage::decode_notes(&raw).unwrap_or_else(|err| {
            log::error!("Exporting {} without its unreadable notes: {}", year, err);
            Default::default()
        }),
        None => Default::default(),
    };
    let holidays = config.holiday_source().lookup(year);

    let state = CalendarState::new(year, language, axis)
        .reduce(Action::SetHolidays(holidays))
        .reduce(Action::LoadNotes(notes));

    let mut settings = ExportSettings::from_config(&config);
    if let Some(output) = args.output {
        settings.output_dir = output;
    }
    if let Some(font) = args.font {
        settings.font = Some(font);
    }

    let path = export_to(&ExportSnapshot::of(&state, paper), &settings)?;
    println!("{}", path.display());

    Ok(())
}
