use std::io;
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use nix::sys::signal::{SigSet, Signal};
use unsegen::input::Input;

use crate::config::Config;
use crate::error::Result;

pub enum Event {
    Input(Input),
    Update,
    Signal(Signal),
    ExportFinished(Result<PathBuf>),
}

pub struct Dispatcher {
    rx: mpsc::Receiver<Event>,
    tx: mpsc::Sender<Event>,
    _input_handle: thread::JoinHandle<()>,
    _update_handle: thread::JoinHandle<()>,
    _signal_handle: Option<thread::JoinHandle<()>>,
}

impl Default for Dispatcher {
    fn default() -> Dispatcher {
        Dispatcher::from_config(&Config::default(), None)
    }
}

impl Dispatcher {
    /// `signals` are blocked for the calling thread (and every thread spawned
    /// after it) and delivered as `Event::Signal` instead.
    pub fn from_config(config: &Config, signals: Option<SigSet>) -> Dispatcher {
        let tick_rate = config.tick_rate();
        let (tx, rx) = mpsc::channel();

        let signal_handle = signals.map(|signals| {
            if let Err(err) = signals.thread_block() {
                log::error!("Could not block signals: {}", err);
            }
            let tx = tx.clone();
            thread::spawn(move || loop {
                match signals.wait() {
                    Ok(signal) => {
                        if tx.send(Event::Signal(signal)).is_err() {
                            return;
                        }
                    }
                    Err(err) => log::warn!("Waiting for signals failed: {}", err),
                }
            })
        });

        let input_handle = {
            let tx = tx.clone();
            thread::spawn(move || {
                let stdin = io::stdin();
                let stdin = stdin.lock();
                for evt in Input::read_all(stdin) {
                    match evt {
                        Ok(key) => {
                            if tx.send(Event::Input(key)).is_err() {
                                return;
                            }
                        }
                        Err(err) => log::warn!("Could not read input: {}", err),
                    }
                }
            })
        };

        let update_handle = {
            let tx = tx.clone();
            thread::spawn(move || loop {
                if tx.send(Event::Update).is_err() {
                    return;
                }
                thread::sleep(tick_rate);
            })
        };

        Dispatcher {
            rx,
            tx,
            _input_handle: input_handle,
            _update_handle: update_handle,
            _signal_handle: signal_handle,
        }
    }

    pub fn next(&self) -> std::result::Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }

    pub fn event_sink(&self) -> &mpsc::Sender<Event> {
        &self.tx
    }
}
