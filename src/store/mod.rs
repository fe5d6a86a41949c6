//! Editable calendar state.
//!
//! `CalendarState` is never mutated in place: every `Action` goes through
//! `CalendarState::reduce`, which returns the next state. `InteractionStore`
//! wraps the reducer with persistence and holiday loading.

pub mod debounce;
pub mod storage;

use std::collections::BTreeMap;
use std::str::FromStr;

use crate::calendar::{self, DateKey, HolidayMap, NoteMap, YearGrid};
use crate::error::Result;
use crate::holidays::HolidaySource;
use crate::i18n::Language;
use crate::layout::AxisOrientation;

use storage::{Storage, AXIS_KEY, LANGUAGE_KEY, SCHEMA_KEY, SCHEMA_VERSION, YEAR_KEY};

#[derive(Clone, Debug, PartialEq)]
pub struct CalendarState {
    pub selected_year: i32,
    pub notes: NoteMap,
    pub holidays: HolidayMap,
    pub language: Language,
    pub axis: AxisOrientation,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SetYear(i32),
    UpdateNote { key: DateKey, value: String },
    ClearYear,
    SetLanguage(Language),
    SetAxis(AxisOrientation),
    SetHolidays(HolidayMap),
    LoadNotes(NoteMap),
}

impl CalendarState {
    pub fn new(selected_year: i32, language: Language, axis: AxisOrientation) -> Self {
        CalendarState {
            selected_year,
            notes: NoteMap::new(),
            holidays: HolidayMap::new(),
            language,
            axis,
        }
    }

    pub fn reduce(&self, action: Action) -> CalendarState {
        match action {
            Action::SetYear(year) if year == self.selected_year => self.clone(),
            Action::SetYear(year) => CalendarState {
                selected_year: year,
                notes: NoteMap::new(),
                holidays: HolidayMap::new(),
                ..self.clone()
            },
            Action::UpdateNote { key, .. } if key.year() != self.selected_year => {
                log::warn!(
                    "Ignoring note for {} while {} is selected",
                    key,
                    self.selected_year
                );
                self.clone()
            }
            Action::UpdateNote { key, value } => {
                let mut notes = self.notes.clone();
                if value.trim().is_empty() {
                    notes.remove(&key);
                } else {
                    notes.insert(key, value);
                }
                CalendarState {
                    notes,
                    ..self.clone()
                }
            }
            Action::ClearYear => CalendarState {
                notes: NoteMap::new(),
                ..self.clone()
            },
            Action::SetLanguage(language) => CalendarState {
                language,
                ..self.clone()
            },
            Action::SetAxis(axis) => CalendarState {
                axis,
                ..self.clone()
            },
            Action::SetHolidays(holidays) => CalendarState {
                holidays,
                ..self.clone()
            },
            Action::LoadNotes(notes) => {
                let year = self.selected_year;
                CalendarState {
                    notes: notes
                        .into_iter()
                        .filter(|(key, text)| key.year() == year && !text.trim().is_empty())
                        .collect(),
                    ..self.clone()
                }
            }
        }
    }

    pub fn note(&self, key: &DateKey) -> Option<&str> {
        self.notes.get(key).map(String::as_str)
    }

    pub fn grid(&self) -> YearGrid {
        calendar::generate(self.selected_year, &self.holidays, self.language)
    }
}

/// Values used when the storage holds no preference yet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Defaults {
    pub year: i32,
    pub language: Language,
    pub axis: AxisOrientation,
}

pub struct InteractionStore {
    state: CalendarState,
    storage: Box<dyn Storage>,
    holidays: Box<dyn HolidaySource>,
    schema_written: bool,
    /// Raw notes that failed to decode, by storage key.
    unreadable_notes: BTreeMap<String, String>,
}

impl InteractionStore {
    pub fn open(
        storage: Box<dyn Storage>,
        holidays: Box<dyn HolidaySource>,
        defaults: Defaults,
    ) -> Self {
        let mut store = InteractionStore {
            state: CalendarState::new(defaults.year, defaults.language, defaults.axis),
            storage,
            holidays,
            schema_written: false,
            unreadable_notes: BTreeMap::new(),
        };

        match store.read(SCHEMA_KEY) {
            Some(version) if version == SCHEMA_VERSION => store.schema_written = true,
            Some(version) => log::warn!(
                "Store schema '{}' is unknown, reading best-effort",
                version
            ),
            None => {}
        }

        let year = store
            .read_pref(YEAR_KEY)
            .and_then(|year| calendar::validate_year(year).ok())
            .unwrap_or(defaults.year);
        let language = store.read_pref(LANGUAGE_KEY).unwrap_or(defaults.language);
        let axis = store.read_pref(AXIS_KEY).unwrap_or(defaults.axis);

        store.state = CalendarState::new(year, language, axis);
        store.load_year();

        log::info!(
            "Hydrated store for {} ({} notes, {} holidays)",
            year,
            store.state.notes.len(),
            store.state.holidays.len()
        );

        store
    }

    pub fn state(&self) -> &CalendarState {
        &self.state
    }

    pub fn grid(&self) -> YearGrid {
        self.state.grid()
    }

    pub fn dispatch(&mut self, action: Action) {
        let persist = Persist::for_action(&action);
        self.state = self.state.reduce(action);

        match persist {
            Persist::Year => {
                self.write(YEAR_KEY, &self.state.selected_year.to_string());
                self.load_year();
            }
            Persist::Notes => self.persist_notes(),
            Persist::Language => self.write(LANGUAGE_KEY, self.state.language.code()),
            Persist::Axis => self.write(AXIS_KEY, &self.state.axis.to_string()),
            Persist::Nothing => {}
        }
    }

    pub fn set_year(&mut self, year: i32) -> Result<()> {
        calendar::validate_year(year)?;
        self.dispatch(Action::SetYear(year));
        Ok(())
    }

    /// State of `year` as stored, without selecting it or writing anything.
    pub fn peek_year(&self, year: i32) -> Result<CalendarState> {
        calendar::validate_year(year)?;
        let notes = self
            .read(&storage::notes_key(year))
            .and_then(|raw| {
                storage::decode_notes(&raw)
                    .map_err(|err| log::error!("Stored notes of {} are unreadable: {}", year, err))
                    .ok()
            })
            .unwrap_or_default();

        Ok(self
            .state
            .reduce(Action::SetYear(year))
            .reduce(Action::LoadNotes(notes))
            .reduce(Action::SetHolidays(self.holidays.lookup(year))))
    }

    pub fn update_note(&mut self, key: DateKey, value: String) {
        self.dispatch(Action::UpdateNote { key, value });
    }

    fn load_year(&mut self) {
        let year = self.state.selected_year;
        let key = storage::notes_key(year);
        let notes = match self.read(&key) {
            Some(raw) => match storage::decode_notes(&raw) {
                Ok(notes) => notes,
                Err(err) => {
                    log::error!("Stored notes of {} are unreadable: {}", year, err);
                    self.unreadable_notes.insert(key, raw);
                    NoteMap::new()
                }
            },
            None => NoteMap::new(),
        };

        let holidays = self.holidays.lookup(year);
        self.state = self
            .state
            .reduce(Action::LoadNotes(notes))
            .reduce(Action::SetHolidays(holidays));
    }

    /// Moves notes that failed to decode to their backup key, so rewriting
    /// `key` loses nothing. Returns false if `key` must stay untouched.
    fn set_aside_unreadable(&mut self, key: &str) -> bool {
        let raw = match self.unreadable_notes.get(key) {
            Some(raw) => raw.clone(),
            None => return true,
        };

        let backup = storage::backup_key(key);
        match self.storage.set(&backup, &raw) {
            Ok(()) => {
                log::warn!("Moved unreadable '{}' to '{}'", key, backup);
                self.unreadable_notes.remove(key);
                true
            }
            Err(err) => {
                log::error!("Not touching unreadable '{}': {}", key, err);
                false
            }
        }
    }

    fn persist_notes(&mut self) {
        let key = storage::notes_key(self.state.selected_year);
        if !self.set_aside_unreadable(&key) {
            return;
        }
        if self.state.notes.is_empty() {
            if let Err(err) = self.storage.remove(&key) {
                log::error!("Could not remove '{}': {}", key, err);
            }
            return;
        }

        match storage::encode_notes(&self.state.notes) {
            Ok(raw) => self.write(&key, &raw),
            Err(err) => log::error!("Could not encode notes: {}", err),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        self.storage.get(key).unwrap_or_else(|err| {
            log::error!("Could not read '{}': {}", key, err);
            None
        })
    }

    fn read_pref<T: FromStr>(&self, key: &str) -> Option<T>
    where
        T::Err: std::fmt::Display,
    {
        let raw = self.read(key)?;
        raw.parse()
            .map_err(|err| log::warn!("Ignoring stored {} '{}': {}", key, raw, err))
            .ok()
    }

    fn write(&mut self, key: &str, value: &str) {
        if !self.schema_written {
            match self.storage.set(SCHEMA_KEY, SCHEMA_VERSION) {
                Ok(()) => self.schema_written = true,
                Err(err) => log::error!("Could not write schema version: {}", err),
            }
        }

        if let Err(err) = self.storage.set(key, value) {
            log::error!("Could not write '{}': {}", key, err);
        }
    }
}

enum Persist {
    Year,
    Notes,
    Language,
    Axis,
    Nothing,
}

impl Persist {
    fn for_action(action: &Action) -> Self {
        match action {
            Action::SetYear(_) => Persist::Year,
            Action::UpdateNote { .. } | Action::ClearYear => Persist::Notes,
            Action::SetLanguage(_) => Persist::Language,
            Action::SetAxis(_) => Persist::Axis,
            Action::SetHolidays(_) | Action::LoadNotes(_) => Persist::Nothing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::storage::{FileStorage, MemoryStorage};
    use super::*;
    use crate::calendar::HolidayInfo;
    use crate::error::{Error, ErrorKind};
    use crate::holidays::BundledHolidays;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    fn defaults() -> Defaults {
        Defaults {
            year: 2026,
            language: Language::Ko,
            axis: AxisOrientation::Horizontal,
        }
    }

    fn state() -> CalendarState {
        CalendarState::new(2026, Language::Ko, AxisOrientation::Horizontal)
    }

    #[test]
    fn reduce_returns_new_state() {
        let before = state();
        let after = before.reduce(Action::UpdateNote {
            key: key("2026-03-05"),
            value: "buy milk".to_owned(),
        });
        assert!(before.notes.is_empty());
        assert_eq!(after.note(&key("2026-03-05")), Some("buy milk"));
    }

    #[test]
    fn blank_note_deletes_entry() {
        let state = state()
            .reduce(Action::UpdateNote {
                key: key("2026-03-05"),
                value: "buy milk".to_owned(),
            })
            .reduce(Action::UpdateNote {
                key: key("2026-03-05"),
                value: "  \n ".to_owned(),
            });
        assert!(state.notes.is_empty());
    }

    #[test]
    fn notes_outside_selected_year_are_ignored() {
        let state = state().reduce(Action::UpdateNote {
            key: key("2025-03-05"),
            value: "old".to_owned(),
        });
        assert!(state.notes.is_empty());
    }

    #[test]
    fn changing_year_drops_previous_year_data() {
        let mut holidays = HolidayMap::new();
        holidays.insert(
            key("2026-01-01"),
            HolidayInfo {
                name: "신정".to_owned(),
                is_substitute: false,
            },
        );
        let state = state()
            .reduce(Action::SetHolidays(holidays))
            .reduce(Action::UpdateNote {
                key: key("2026-03-05"),
                value: "x".to_owned(),
            })
            .reduce(Action::SetYear(2027));
        assert_eq!(state.selected_year, 2027);
        assert!(state.notes.is_empty());
        assert!(state.holidays.is_empty());
    }

    #[test]
    fn clear_year_and_preferences() {
        let state = state()
            .reduce(Action::UpdateNote {
                key: key("2026-03-05"),
                value: "x".to_owned(),
            })
            .reduce(Action::ClearYear)
            .reduce(Action::SetLanguage(Language::En))
            .reduce(Action::SetAxis(AxisOrientation::Vertical));
        assert!(state.notes.is_empty());
        assert_eq!(state.language, Language::En);
        assert_eq!(state.axis, AxisOrientation::Vertical);
    }

    #[test]
    fn notes_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::open_dir(dir.path()).unwrap();
            let mut store =
                InteractionStore::open(Box::new(storage), Box::new(BundledHolidays), defaults());
            store.update_note(key("2026-03-05"), "buy milk".to_owned());
        }

        let storage = FileStorage::open_dir(dir.path()).unwrap();
        assert_eq!(
            storage.get(SCHEMA_KEY).unwrap().as_deref(),
            Some(SCHEMA_VERSION)
        );
        let store = InteractionStore::open(Box::new(storage), Box::new(BundledHolidays), defaults());
        let grid = store.grid();
        assert_eq!(grid.year, 2026);
        let day = grid.day(&key("2026-03-05")).unwrap();
        assert_eq!(store.state().note(&day.key), Some("buy milk"));
    }

    #[test]
    fn preferences_are_hydrated() {
        let mut storage = MemoryStorage::new();
        storage.set(YEAR_KEY, "2025").unwrap();
        storage.set(LANGUAGE_KEY, "en").unwrap();
        storage.set(AXIS_KEY, "vertical").unwrap();

        let store = InteractionStore::open(Box::new(storage), Box::new(BundledHolidays), defaults());
        let state = store.state();
        assert_eq!(state.selected_year, 2025);
        assert_eq!(state.language, Language::En);
        assert_eq!(state.axis, AxisOrientation::Vertical);
        assert!(state.holidays.contains_key(&key("2025-05-05")));
    }

    #[test]
    fn invalid_preferences_fall_back_to_defaults() {
        let mut storage = MemoryStorage::new();
        storage.set(YEAR_KEY, "0").unwrap();
        storage.set(LANGUAGE_KEY, "klingon").unwrap();

        let store = InteractionStore::open(Box::new(storage), Box::new(BundledHolidays), defaults());
        assert_eq!(store.state().selected_year, 2026);
        assert_eq!(store.state().language, Language::Ko);
    }

    #[test]
    fn year_change_loads_that_years_notes() {
        let mut store = InteractionStore::open(
            Box::new(MemoryStorage::new()),
            Box::new(BundledHolidays),
            defaults(),
        );
        store.update_note(key("2026-03-05"), "2026 note".to_owned());
        store.set_year(2025).unwrap();
        assert!(store.state().notes.is_empty());
        assert!(store.state().holidays.contains_key(&key("2025-01-01")));

        store.update_note(key("2025-07-01"), "2025 note".to_owned());
        store.set_year(2026).unwrap();
        assert_eq!(store.state().note(&key("2026-03-05")), Some("2026 note"));
        assert_eq!(store.state().notes.len(), 1);

        assert!(store.set_year(0).is_err());
        assert_eq!(store.state().selected_year, 2026);
    }

    #[test]
    fn unreadable_notes_are_kept_before_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut storage = FileStorage::open_dir(dir.path()).unwrap();
            storage.set(&storage::notes_key(2026), "buy milk").unwrap();
        }

        let storage = FileStorage::open_dir(dir.path()).unwrap();
        let mut store =
            InteractionStore::open(Box::new(storage), Box::new(BundledHolidays), defaults());
        assert!(store.state().notes.is_empty());
        store.dispatch(Action::SetLanguage(Language::En));
        store.update_note(key("2026-03-06"), "eggs".to_owned());
        drop(store);

        let storage = FileStorage::open_dir(dir.path()).unwrap();
        assert_eq!(
            storage
                .get(&storage::backup_key(&storage::notes_key(2026)))
                .unwrap()
                .as_deref(),
            Some("buy milk")
        );
        let raw = storage.get(&storage::notes_key(2026)).unwrap().unwrap();
        let notes = storage::decode_notes(&raw).unwrap();
        assert_eq!(notes.get(&key("2026-03-06")).map(String::as_str), Some("eggs"));
    }

    #[test]
    fn unreadable_notes_stay_when_backup_fails() {
        let mut storage = MemoryStorage::new();
        storage.set(&storage::notes_key(2026), "buy milk").unwrap();
        let mut store =
            InteractionStore::open(Box::new(storage), Box::new(BundledHolidays), defaults());
        store.storage = Box::new(FailingStorage);

        store.update_note(key("2026-03-06"), "eggs".to_owned());
        assert_eq!(store.state().note(&key("2026-03-06")), Some("eggs"));
        assert!(store.unreadable_notes.contains_key(&storage::notes_key(2026)));
    }

    #[test]
    fn peeking_a_year_leaves_selection_and_storage_alone() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::open_dir(dir.path()).unwrap();
            let mut store =
                InteractionStore::open(Box::new(storage), Box::new(BundledHolidays), defaults());
            store.set_year(2025).unwrap();
            store.update_note(key("2025-07-01"), "trip".to_owned());
            store.set_year(2026).unwrap();
        }

        let storage = FileStorage::open_dir(dir.path()).unwrap();
        let store = InteractionStore::open(Box::new(storage), Box::new(BundledHolidays), defaults());
        let peeked = store.peek_year(2025).unwrap();
        assert_eq!(peeked.selected_year, 2025);
        assert_eq!(peeked.note(&key("2025-07-01")), Some("trip"));
        assert!(peeked.holidays.contains_key(&key("2025-01-01")));
        assert!(store.peek_year(0).is_err());
        assert_eq!(store.state().selected_year, 2026);
        drop(store);

        let storage = FileStorage::open_dir(dir.path()).unwrap();
        assert_eq!(storage.get(YEAR_KEY).unwrap().as_deref(), Some("2026"));
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>> {
            Err(Error::new(ErrorKind::Storage, "unavailable"))
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<()> {
            Err(Error::new(ErrorKind::Storage, "unavailable"))
        }

        fn remove(&mut self, _key: &str) -> Result<()> {
            Err(Error::new(ErrorKind::Storage, "unavailable"))
        }
    }

    #[test]
    fn storage_failures_keep_memory_state() {
        let mut store =
            InteractionStore::open(Box::new(FailingStorage), Box::new(BundledHolidays), defaults());
        store.update_note(key("2026-03-05"), "buy milk".to_owned());
        store.dispatch(Action::SetLanguage(Language::En));
        assert_eq!(store.state().note(&key("2026-03-05")), Some("buy milk"));
        assert_eq!(store.state().language, Language::En);
    }
}
