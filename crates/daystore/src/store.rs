//! The daily event store: one record per local calendar day, persisted as a
//! single JSON document.

use crate::atomic;
use crate::date::{Clock, DateKey, LocalClock};
use crate::document::{self, DocumentFormat};
use crate::error::{Result, StoreError};
use crate::lock::StoreLock;
use crate::record::{Entries, History, Record};
use serde_json::{Map, Value};
use std::io;
use std::path::{Path, PathBuf};

/// What [`DailyEventStore::upsert_today`] did to today's slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Upsert {
    Inserted { date: DateKey },
    Replaced { date: DateKey, previous: Record },
}

impl Upsert {
    pub fn date(&self) -> DateKey {
        match self {
            Upsert::Inserted { date } | Upsert::Replaced { date, .. } => *date,
        }
    }

    pub fn is_replacement(&self) -> bool {
        matches!(self, Upsert::Replaced { .. })
    }
}

/// In-memory history bound to its backing file.
///
/// Only [`upsert_today`](Self::upsert_today) mutates the history and only
/// [`save`](Self::save) touches the disk.
pub struct DailyEventStore<C: Clock = LocalClock> {
    path: PathBuf,
    history: History,
    format: DocumentFormat,
    clock: C,
    lock: Option<StoreLock>,
}

impl DailyEventStore<LocalClock> {
    /// Loads the store at `path`. A missing file is an empty history.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        Self::load_with_clock(path, LocalClock)
    }

    /// Like [`load`](Self::load), holding an exclusive advisory lock until the store is dropped.
    pub fn open_locked(path: impl Into<PathBuf>) -> Result<Self> {
        Self::open_locked_with_clock(path, LocalClock)
    }
}

impl<C: Clock> DailyEventStore<C> {
    pub fn load_with_clock(path: impl Into<PathBuf>, clock: C) -> Result<Self> {
        let path = path.into();
        let (history, format) = read_document(&path)?;

        tracing::debug!(
            "Loaded {} entries from {} ({:?})",
            history.len(),
            path.display(),
            format
        );

        Ok(Self {
            path,
            history,
            format,
            clock,
            lock: None,
        })
    }

    pub fn open_locked_with_clock(path: impl Into<PathBuf>, clock: C) -> Result<Self> {
        let path = path.into();
        let lock = StoreLock::acquire(&path)?;
        let mut store = Self::load_with_clock(path, clock)?;
        store.lock = Some(lock);
        Ok(store)
    }

    /// Records `record` as today's observation, replacing any earlier one from today.
    ///
    /// Fields are never merged across runs; the newest record wins in full.
    pub fn upsert_today(&mut self, record: Record) -> Upsert {
        let date = self.clock.today();
        match self.history.upsert(date, record) {
            None => {
                tracing::debug!("Inserted record for {}", date);
                Upsert::Inserted { date }
            }
            Some(previous) => {
                tracing::debug!("Replaced record for {}", date);
                Upsert::Replaced { date, previous }
            }
        }
    }

    /// Atomically replaces the backing file with the current history.
    ///
    /// On failure the file and the in-memory history are unchanged, so the
    /// call can be retried.
    pub fn save(&self) -> Result<()> {
        let text = document::encode(&self.history, self.format)
            .map_err(|e| StoreError::persistence(&self.path, io::Error::other(e)))?;

        atomic::atomic_write(&self.path, text.as_bytes())
            .map_err(|e| StoreError::persistence(&self.path, e))?;

        tracing::debug!(
            "Saved {} entries to {}",
            self.history.len(),
            self.path.display()
        );
        Ok(())
    }

    /// `(date, record)` pairs in insertion order.
    pub fn entries(&self) -> Entries<'_> {
        self.history.iter()
    }

    /// `(date, record)` pairs, oldest day first.
    pub fn entries_chronological(&self) -> Vec<(DateKey, &Record)> {
        self.history.chronological()
    }

    pub fn get(&self, date: &DateKey) -> Option<&Record> {
        self.history.get(date)
    }

    pub fn today(&self) -> Option<&Record> {
        self.history.get(&self.clock.today())
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> DocumentFormat {
        self.format
    }

    /// Selects the layout used by the next [`save`](Self::save).
    pub fn set_format(&mut self, format: DocumentFormat) {
        self.format = format;
    }

    pub fn is_locked(&self) -> bool {
        self.lock.is_some()
    }

    /// The history as a legacy-layout JSON object with dates in chronological order.
    pub fn to_json(&self) -> Value {
        let mut days = Map::new();
        for (date, record) in self.history.chronological() {
            let fields: Map<String, Value> = record
                .iter()
                .map(|(k, v)| (k.to_string(), Value::String(v.to_string())))
                .collect();
            days.insert(date.to_string(), Value::Object(fields));
        }
        Value::Object(days)
    }
}

impl<C: Clock> std::fmt::Debug for DailyEventStore<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DailyEventStore")
            .field("path", &self.path)
            .field("entries", &self.history.len())
            .field("format", &self.format)
            .field("locked", &self.lock.is_some())
            .finish()
    }
}

fn read_document(path: &Path) -> Result<(History, DocumentFormat)> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Ok((History::new(), DocumentFormat::default()));
        }
        Err(source) => {
            return Err(StoreError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let text = String::from_utf8(bytes).map_err(|e| StoreError::corrupt(path, e))?;
    document::decode(&text).map_err(|reason| StoreError::corrupt(path, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atomic::StagedWrite;
    use crate::date::FixedClock;
    use std::fs;
    use tempfile::TempDir;

    fn clock(day: u32) -> FixedClock {
        FixedClock(DateKey::from_ymd(2024, 3, day).unwrap())
    }

    #[test]
    fn test_upsert_reports_insert_and_replace() {
        let temp = TempDir::new().unwrap();
        let mut store = DailyEventStore::load_with_clock(temp.path().join("s.json"), clock(15))
            .unwrap();

        let first = store.upsert_today(Record::from([("headline", "a")]));
        assert_eq!(first, Upsert::Inserted { date: clock(15).0 });

        let second = store.upsert_today(Record::new());
        assert!(second.is_replacement());
        assert_eq!(
            second,
            Upsert::Replaced {
                date: clock(15).0,
                previous: Record::from([("headline", "a")]),
            }
        );
        assert_eq!(store.today(), Some(&Record::new()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_interrupted_save_keeps_previous_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("s.json");

        let mut store = DailyEventStore::load_with_clock(&path, clock(14)).unwrap();
        store.upsert_today(Record::from([("headline", "monday")]));
        store.save().unwrap();
        let saved = fs::read(&path).unwrap();

        let mut store = DailyEventStore::load_with_clock(&path, clock(15)).unwrap();
        store.upsert_today(Record::from([("headline", "tuesday")]));
        let text = document::encode(store.history(), store.format()).unwrap();

        // The process dies after staging the new contents but before the rename.
        let staged = StagedWrite::new(&path, text.as_bytes()).unwrap();
        std::mem::forget(staged);

        assert_eq!(fs::read(&path).unwrap(), saved);
        let reloaded = DailyEventStore::load_with_clock(&path, clock(15)).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert!(reloaded.today().is_none());
    }

    #[test]
    fn test_envelope_format_survives_save() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("s.json");
        fs::write(
            &path,
            r#"{"schema_version": 1, "history": {"2024-03-14": {"headline": "x"}}}"#,
        )
        .unwrap();

        let mut store = DailyEventStore::load_with_clock(&path, clock(15)).unwrap();
        assert_eq!(store.format(), DocumentFormat::Envelope);
        store.upsert_today(Record::from([("headline", "y")]));
        store.save().unwrap();

        let raw: Value = serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["schema_version"], 1);
        assert_eq!(raw["history"]["2024-03-15"]["headline"], "y");
    }

    #[test]
    fn test_to_json_is_chronological() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("s.json");
        fs::write(
            &path,
            r#"{"2024-03-20": {"h": "late"}, "2024-03-01": {"h": "early"}}"#,
        )
        .unwrap();

        let store = DailyEventStore::load_with_clock(&path, clock(15)).unwrap();
        let order: Vec<DateKey> = store.entries().map(|(d, _)| d).collect();
        assert_eq!(order[0].to_string(), "2024-03-20");

        let json = store.to_json();
        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["2024-03-01", "2024-03-20"]);
    }

    #[test]
    fn test_directory_path_is_a_read_error() {
        let temp = TempDir::new().unwrap();
        let err = DailyEventStore::load(temp.path()).unwrap_err();
        assert!(matches!(err, StoreError::Read { .. }));
    }
}
