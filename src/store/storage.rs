//! Key-value persistence for notes and preferences.
//!
//! Values are opaque strings. Notes are kept per year under `notes:{year}`
//! as a list of `[date, text]` pairs.

use serde::{Deserialize, Serialize};
use serde_with::serde_as;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::calendar::{DateKey, NoteMap};
use crate::error::{Error, ErrorKind, Result};

pub const SCHEMA_KEY: &str = "schema";
pub const SCHEMA_VERSION: &str = "1";
pub const YEAR_KEY: &str = "year";
pub const LANGUAGE_KEY: &str = "language";
pub const AXIS_KEY: &str = "orientation";

const STORE_FILE_NAME: &str = "store.toml";

pub fn notes_key(year: i32) -> String {
    format!("notes:{}", year)
}

/// Key an unreadable value is moved to before its own key is rewritten.
pub fn backup_key(key: &str) -> String {
    format!("{}.corrupt", key)
}

pub trait Storage: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<T: Storage + ?Sized> Storage for Box<T> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

#[serde_as]
#[derive(Debug, Default, Serialize, Deserialize)]
struct NotesRecord {
    #[serde_as(as = "Vec<(_, _)>")]
    notes: BTreeMap<DateKey, String>,
}

pub fn encode_notes(notes: &NoteMap) -> Result<String> {
    Ok(toml::to_string(&NotesRecord {
        notes: notes.clone(),
    })?)
}

pub fn decode_notes(raw: &str) -> Result<NoteMap> {
    let record: NotesRecord = toml::from_str(raw)
        .map_err(|err| Error::new(ErrorKind::Storage, &format!("corrupt notes: {}", err)))?;
    Ok(record.notes)
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: BTreeMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        MemoryStorage::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.values.remove(key);
        Ok(())
    }
}

/// A TOML table of strings in a single file, rewritten on every change.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStorage {
    pub fn open_dir(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        FileStorage::open(&dir.join(STORE_FILE_NAME))
    }

    pub fn open(path: &Path) -> Result<Self> {
        let values = if path.exists() {
            let content = fs::read_to_string(path)?;
            match toml::from_str(&content) {
                Ok(values) => values,
                Err(err) => {
                    let backup = path.with_extension(format!(
                        "toml.corrupt-{}",
                        chrono::Local::now().format("%Y%m%d%H%M%S")
                    ));
                    fs::rename(path, &backup)?;
                    log::error!(
                        "Store '{}' is corrupt, moved it to '{}' and starting empty: {}",
                        path.display(),
                        backup.display(),
                        err
                    );
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        log::debug!("Opened store '{}' with {} keys", path.display(), values.len());

        Ok(FileStorage {
            path: path.to_owned(),
            values,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn flush(&self) -> Result<()> {
        let content = toml::to_string(&self.values)?;
        let tmp = self.path.with_extension("toml.tmp");
        fs::write(&tmp, content)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_owned(), value.to_owned());
        self.flush()
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        if self.values.remove(key).is_some() {
            self.flush()
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> DateKey {
        s.parse().unwrap()
    }

    #[test]
    fn notes_key_is_scoped_by_year() {
        assert_eq!(notes_key(2026), "notes:2026");
    }

    #[test]
    fn notes_codec_keeps_text() {
        let mut notes = NoteMap::new();
        notes.insert(key("2026-03-05"), "buy milk".to_owned());
        notes.insert(key("2026-12-24"), "선물 \"포장\"\n두 줄".to_owned());

        let decoded = decode_notes(&encode_notes(&notes).unwrap()).unwrap();
        assert_eq!(decoded, notes);
    }

    #[test]
    fn notes_are_stored_as_pairs() {
        let mut notes = NoteMap::new();
        notes.insert(key("2026-03-05"), "buy milk".to_owned());
        assert_eq!(
            decode_notes("notes = [[\"2026-03-05\", \"buy milk\"]]").unwrap(),
            notes
        );
    }

    #[test]
    fn corrupt_notes_are_an_error() {
        assert!(decode_notes("notes = [[\"2026-3-5\", \"x\"]]").is_err());
        assert!(decode_notes("notes = 3").is_err());
    }

    #[test]
    fn file_storage_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut storage = FileStorage::open_dir(dir.path()).unwrap();
            storage.set(YEAR_KEY, "2026").unwrap();
            storage.set(&notes_key(2026), "notes = []").unwrap();
            storage.remove(&notes_key(2026)).unwrap();
        }

        let storage = FileStorage::open_dir(dir.path()).unwrap();
        assert_eq!(storage.get(YEAR_KEY).unwrap().as_deref(), Some("2026"));
        assert_eq!(storage.get(&notes_key(2026)).unwrap(), None);
        assert!(!storage.path().with_extension("toml.tmp").exists());
    }

    #[test]
    fn corrupt_store_file_is_kept_aside() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(STORE_FILE_NAME), "year = [").unwrap();

        let mut storage = FileStorage::open_dir(dir.path()).unwrap();
        assert_eq!(storage.get(YEAR_KEY).unwrap(), None);
        storage.set(YEAR_KEY, "2027").unwrap();
        assert_eq!(
            FileStorage::open_dir(dir.path())
                .unwrap()
                .get(YEAR_KEY)
                .unwrap()
                .as_deref(),
            Some("2027")
        );

        let backups: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .filter(|path| {
                path.file_name()
                    .unwrap()
                    .to_string_lossy()
                    .starts_with("store.toml.corrupt-")
            })
            .collect();
        assert_eq!(backups.len(), 1);
        assert_eq!(fs::read_to_string(&backups[0]).unwrap(), "year = [");
    }

    #[test]
    fn memory_storage_round_trips() {
        let mut storage = MemoryStorage::new();
        storage.set(LANGUAGE_KEY, "en").unwrap();
        assert_eq!(storage.get(LANGUAGE_KEY).unwrap().as_deref(), Some("en"));
        storage.remove(LANGUAGE_KEY).unwrap();
        assert_eq!(storage.get(LANGUAGE_KEY).unwrap(), None);
    }
}
