extern crate almanac as lib;

use chrono::Datelike;
use flexi_logger::{FileSpec, Logger};
use lib::events::Dispatcher;
use lib::i18n;
use lib::store::storage::FileStorage;
use lib::store::{CalendarState, InteractionStore};
use lib::ui::context::Context;
use lib::ui::{App, ScreenGrid};
use nix::sys::{signal, termios};
use std::io::stdout;
use std::path::PathBuf;
use structopt::StructOpt;
use unsegen::base::Terminal;

#[derive(Debug, StructOpt)]
#[structopt(
    name = "alm",
    about = "Almanac - A yearly planner with per-day notes."
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

    #[structopt(
        short = "s",
        long = "show",
        help = "only print the year grid non-interactively"
    )]
    pub show: bool,

    #[structopt(short = "y", long = "year", help = "year to open")]
    pub year: Option<i32>,

    #[structopt(long = "log-file", help = "path to log file", parse(from_os_str))]
    pub log_file: Option<PathBuf>,
}

fn show(state: &CalendarState) {
    let translations = i18n::resolve(state.language);
    let screen = ScreenGrid::build(
        &state.grid(),
        &state.notes,
        state.axis,
        translations,
        None,
        '*',
    );

    println!("{} {}", state.selected_year, translations.ui.title);
    print!("{}", screen.to_plain_string());
    for (key, note) in &state.notes {
        println!("{}  {}", key, note);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::from_args();

    const DEFAULT_LOG_LEVEL: &str = if cfg!(debug_assertions) {
        "debug"
    } else {
        "info"
    };

    let config = lib::config::load_suitable_config(args.configfile.as_deref())?;

    let mut logger = Logger::try_with_env_or_str(DEFAULT_LOG_LEVEL)?;

    // stderr belongs to the terminal ui, so interactive runs always log to a file
    let log_file = args
        .log_file
        .clone()
        .or_else(|| config.log_file.clone())
        .or_else(|| (!args.show).then(|| config.data_dir().join("alm.log")));

    if let Some(log_file) = log_file {
        logger = logger
            .log_to_file(FileSpec::try_from(log_file)?)
            .print_message();
    }

    logger.start()?;

    let storage = FileStorage::open_dir(&config.data_dir())?;
    log::info!("Using store at '{}'", storage.path().display());

    let today = chrono::Local::now().date_naive();
    let mut store = InteractionStore::open(
        Box::new(storage),
        config.holiday_source(),
        config.defaults(today.year()),
    );

    if args.show {
        let state = match args.year {
            Some(year) => store.peek_year(year)?,
            None => store.state().clone(),
        };
        show(&state);
        return Ok(());
    }

    if let Some(year) = args.year {
        store.set_year(year)?;
    }

    const STDOUT: std::os::unix::io::RawFd = 0;
    let orig_attr = std::sync::Mutex::new(termios::tcgetattr(STDOUT)?);

    std::panic::set_hook(Box::new(move |info| {
        // Switch to main terminal screen
        println!("{}{}", termion::screen::ToMainScreen, termion::cursor::Show);

        if let Ok(attr) = orig_attr.lock() {
            let _ = termios::tcsetattr(STDOUT, termios::SetArg::TCSANOW, &attr);
        }

        println!("Almanac ran into a fatal error!");
        println!("Consider filing an issue with a log file and the backtrace below.");

        println!("{}", info);
        println!("{:?}", backtrace::Backtrace::new());
    }));

    let mut signals_to_wait = signal::SigSet::empty();
    signals_to_wait.add(signal::SIGWINCH);

    let dispatcher = Dispatcher::from_config(&config, Some(signals_to_wait));
    // Setup unsegen terminal
    let stdout = stdout();
    let term = Terminal::new(stdout.lock())?;

    let context = Context::new(store, &config, dispatcher.event_sink().clone(), today);
    let mut app = App::new(context);

    app.run(dispatcher, term)
}
