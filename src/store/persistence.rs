use std::cell::Cell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use log::{debug, error, info, warn};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::models::Entry;

/// Durable byte storage the gateway writes the entries document to.
pub trait ByteStore {
    /// Human readable location, used in logs and error messages.
    fn location(&self) -> String;

    /// `Ok(None)` when nothing has been stored yet.
    fn read(&self) -> io::Result<Option<Vec<u8>>>;

    /// Replace the whole stored content.
    fn write(&self, bytes: &[u8]) -> io::Result<()>;

    /// Keep a copy of the current content aside under `tag`, returning where
    /// it went. Stores without a place for copies return `Ok(None)`.
    fn preserve(&self, _tag: &str) -> io::Result<Option<String>> {
        Ok(None)
    }
}

/// JSON file on disk, replaced atomically on every write.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileStore { path: path.into() }
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "entries.json".to_string());
        self.path.with_file_name(format!("{name}.{suffix}"))
    }
}

impl ByteStore for FileStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn read(&self) -> io::Result<Option<Vec<u8>>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn write(&self, bytes: &[u8]) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Same directory as the target so the rename stays on one filesystem.
        let tmp_path = self.sibling("tmp");
        let result = write_synced(&tmp_path, bytes).and_then(|()| fs::rename(&tmp_path, &self.path));
        if result.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        result
    }

    /// Earlier copies are never replaced: a second copy under the same tag
    /// gets a numbered suffix.
    fn preserve(&self, tag: &str) -> io::Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let mut target = self.sibling(tag);
        let mut n = 1;
        while target.exists() {
            target = self.sibling(&format!("{tag}.{n}"));
            n += 1;
        }
        fs::copy(&self.path, &target)?;
        Ok(Some(target.display().to_string()))
    }
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[derive(Serialize)]
struct EntryDocumentRef<'a> {
    entries: &'a [Entry],
}

#[derive(Deserialize)]
struct EntryDocument {
    #[serde(default)]
    entries: Vec<Entry>,
}

/// Result of a load. `problem` carries a failure that was recovered from by
/// starting empty; the caller decides how to surface it.
#[derive(Debug)]
pub struct Loaded {
    pub entries: Vec<Entry>,
    pub problem: Option<CoreError>,
}

/// Saves and loads the full entry sequence. At most one operation runs at a
/// time; an overlapping request is rejected with [`CoreError::Busy`].
///
/// A load that fails to read the store puts the gateway on hold: saves are
/// refused with [`CoreError::Unreadable`] until a copy of the stored content
/// has been kept aside.
pub struct PersistenceGateway {
    store: Box<dyn ByteStore>,
    in_flight: Cell<bool>,
    on_hold: Cell<bool>,
}

impl PersistenceGateway {
    pub fn new(store: impl ByteStore + 'static) -> Self {
        PersistenceGateway {
            store: Box::new(store),
            in_flight: Cell::new(false),
            on_hold: Cell::new(false),
        }
    }

    pub fn location(&self) -> String {
        self.store.location()
    }

    /// Overwrite the stored document with `entries`.
    pub fn save(&self, entries: &[Entry]) -> CoreResult<()> {
        let _flight = Flight::begin(&self.in_flight)?;

        if self.on_hold.get() {
            if self.preserve_unlocked("unreadable").is_none() {
                return Err(CoreError::Unreadable {
                    location: self.store.location(),
                });
            }
            info!("{} copied aside, saving again", self.store.location());
            self.on_hold.set(false);
        }

        let json = serde_json::to_vec_pretty(&EntryDocumentRef { entries })
            .map_err(CoreError::Encode)?;
        self.store.write(&json).map_err(|source| CoreError::Io {
            location: self.store.location(),
            source,
        })?;
        debug!("saved {} entries to {}", entries.len(), self.store.location());
        Ok(())
    }

    /// Read the stored document. A missing store is simply empty. A store
    /// that cannot be read or parsed also yields an empty sequence, with the
    /// failure reported in [`Loaded::problem`] and the unreadable content
    /// copied aside when the store supports it. When no copy can be made of
    /// content that could not be read, later saves are held back.
    pub fn load(&self) -> CoreResult<Loaded> {
        let _flight = Flight::begin(&self.in_flight)?;
        let location = self.store.location();

        let bytes = match self.store.read() {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                info!("no saved entries at {location}, starting fresh");
                return Ok(Loaded {
                    entries: Vec::new(),
                    problem: None,
                });
            }
            Err(source) => {
                error!("reading {location} failed: {source}");
                if self.preserve_unlocked("unreadable").is_none() {
                    warn!("holding back saves to {location} until it can be copied");
                    self.on_hold.set(true);
                }
                return Ok(Loaded {
                    entries: Vec::new(),
                    problem: Some(CoreError::Io { location, source }),
                });
            }
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            warn!("{location} is blank, treating as empty");
            return Ok(Loaded {
                entries: Vec::new(),
                problem: None,
            });
        }

        match serde_json::from_slice::<EntryDocument>(&bytes) {
            Ok(doc) => {
                let mut entries = doc.entries;
                for entry in &mut entries {
                    if entry.clamp_ratings() {
                        warn!("clamped out-of-range ratings on '{}'", entry.name);
                    }
                }
                debug!("loaded {} entries from {location}", entries.len());
                Ok(Loaded {
                    entries,
                    problem: None,
                })
            }
            Err(source) => {
                error!("parsing {location} failed: {source}");
                self.preserve_unlocked("corrupt");
                Ok(Loaded {
                    entries: Vec::new(),
                    problem: Some(CoreError::Corrupt { location, source }),
                })
            }
        }
    }

    /// Copy the current stored content aside under `tag`.
    pub fn preserve(&self, tag: &str) -> CoreResult<Option<String>> {
        let _flight = Flight::begin(&self.in_flight)?;
        Ok(self.preserve_unlocked(tag))
    }

    fn preserve_unlocked(&self, tag: &str) -> Option<String> {
        match self.store.preserve(tag) {
            Ok(Some(copy)) => {
                warn!("kept a copy of {} at {copy}", self.store.location());
                Some(copy)
            }
            Ok(None) => None,
            Err(e) => {
                error!("could not copy {} aside: {e}", self.store.location());
                None
            }
        }
    }
}

impl std::fmt::Debug for PersistenceGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceGateway")
            .field("location", &self.store.location())
            .field("in_flight", &self.in_flight.get())
            .field("on_hold", &self.on_hold.get())
            .finish()
    }
}

/// Single-flight marker, cleared on drop so an early return or error never
/// leaves the gateway stuck.
struct Flight<'a>(&'a Cell<bool>);

impl<'a> Flight<'a> {
    fn begin(flag: &'a Cell<bool>) -> CoreResult<Self> {
        if flag.replace(true) {
            warn!("persistence request rejected: another one is in flight");
            return Err(CoreError::Busy);
        }
        Ok(Flight(flag))
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{FailingStore, MemoryStore, UnreadableStore};
    use super::*;
    use crate::models::ProgressRecord;
    use chrono::{Days, NaiveDate};
    use proptest::prelude::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn sample() -> Vec<Entry> {
        let mut run = Entry::new("Run", "Run 5k", "training plan", 6, Some(day(1)));
        run.progress_records
            .push(ProgressRecord::new(day(4), 8, "long run"));
        run.progress_records
            .push(ProgressRecord::new(day(4), 5, "recovery"));
        let read = Entry::new("Read", "12 books", "one a month", 2, None);
        vec![run, read]
    }

    #[test]
    fn round_trip_preserves_order_and_fields() {
        let gateway = PersistenceGateway::new(MemoryStore::default());
        let entries = sample();
        gateway.save(&entries).unwrap();
        let loaded = gateway.load().unwrap();
        assert!(loaded.problem.is_none());
        assert_eq!(loaded.entries, entries);
    }

    #[test]
    fn document_has_named_root() {
        let store = MemoryStore::default();
        let gateway = PersistenceGateway::new(store.clone());
        gateway.save(&sample()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&store.text().unwrap()).unwrap();
        assert_eq!(value["entries"].as_array().unwrap().len(), 2);
        assert_eq!(value["entries"][0]["targetDate"], "2024-03-01");
        assert!(value["entries"][1]["targetDate"].is_null());
    }

    #[test]
    fn save_overwrites_previous_content() {
        let store = MemoryStore::default();
        let gateway = PersistenceGateway::new(store.clone());
        gateway.save(&sample()).unwrap();
        gateway.save(&[]).unwrap();
        assert!(gateway.load().unwrap().entries.is_empty());
        assert_eq!(store.writes.get(), 2);
    }

    #[test]
    fn missing_store_loads_empty_without_problem() {
        let gateway = PersistenceGateway::new(MemoryStore::default());
        let loaded = gateway.load().unwrap();
        assert!(loaded.entries.is_empty());
        assert!(loaded.problem.is_none());
    }

    #[test]
    fn corrupt_store_loads_empty_and_is_preserved() {
        let store = MemoryStore::with_text("{\"entries\": [ {\"name\": ");
        let gateway = PersistenceGateway::new(store.clone());
        let loaded = gateway.load().unwrap();
        assert!(loaded.entries.is_empty());
        assert!(matches!(loaded.problem, Some(CoreError::Corrupt { .. })));
        assert_eq!(store.copies.borrow()[0].0, "corrupt");
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let store = MemoryStore::with_text(
            r#"{"version": 3, "entries": [
                {"name":"a","goal":"b","details":"c","baseRating":4,"colour":"red",
                 "targetDate":"2024-05-06",
                 "progressRecords":[{"date":"2024-05-07","rating":6,"mood":"ok"}]}
            ]}"#,
        );
        let loaded = PersistenceGateway::new(store).load().unwrap();
        assert!(loaded.problem.is_none());
        assert_eq!(loaded.entries.len(), 1);
        assert_eq!(loaded.entries[0].progress_records[0].rating, 6);
    }

    #[test]
    fn out_of_range_ratings_are_clamped_on_load() {
        let store = MemoryStore::with_text(
            r#"{"entries":[{"name":"a","goal":"b","details":"c","baseRating":12}]}"#,
        );
        let loaded = PersistenceGateway::new(store).load().unwrap();
        assert_eq!(loaded.entries[0].base_rating, 10);
    }

    #[test]
    fn blank_store_is_empty() {
        let loaded = PersistenceGateway::new(MemoryStore::with_text("  \n"))
            .load()
            .unwrap();
        assert!(loaded.entries.is_empty());
        assert!(loaded.problem.is_none());
    }

    #[test]
    fn write_failures_propagate() {
        let gateway = PersistenceGateway::new(FailingStore::default());
        let err = gateway.save(&sample()).unwrap_err();
        assert!(matches!(err, CoreError::Io { .. }));
        assert!(err.to_string().contains("no space left"));
        // The guard is released after a failure.
        assert!(gateway.save(&[]).is_err_and(|e| !matches!(e, CoreError::Busy)));
    }

    #[test]
    fn read_failures_are_reported_not_raised() {
        let gateway = PersistenceGateway::new(FailingStore { fail_reads: true });
        let loaded = gateway.load().unwrap();
        assert!(loaded.entries.is_empty());
        assert!(matches!(loaded.problem, Some(CoreError::Io { .. })));
    }

    #[test]
    fn unreadable_store_is_not_overwritten_without_a_copy() {
        let store = UnreadableStore::default();
        let gateway = PersistenceGateway::new(store.clone());
        let loaded = gateway.load().unwrap();
        assert!(matches!(loaded.problem, Some(CoreError::Io { .. })));

        let err = gateway.save(&sample()).unwrap_err();
        assert!(matches!(err, CoreError::Unreadable { .. }));
        assert_eq!(store.writes.get(), 0);

        // Once a copy can be kept, saving goes ahead.
        store.copyable.set(true);
        gateway.save(&sample()).unwrap();
        gateway.save(&[]).unwrap();
        assert_eq!(store.copies.get(), 1);
        assert_eq!(store.writes.get(), 2);
    }

    #[test]
    fn unreadable_store_copied_at_load_saves_normally() {
        let store = UnreadableStore::default();
        store.copyable.set(true);
        let gateway = PersistenceGateway::new(store.clone());
        gateway.load().unwrap();
        assert_eq!(store.copies.get(), 1);
        gateway.save(&sample()).unwrap();
        assert_eq!(store.writes.get(), 1);
    }

    #[test]
    fn overlapping_requests_are_rejected() {
        let flag = Cell::new(false);
        let first = Flight::begin(&flag).unwrap();
        assert!(matches!(Flight::begin(&flag), Err(CoreError::Busy)));
        drop(first);
        assert!(Flight::begin(&flag).is_ok());
    }

    #[test]
    fn file_store_round_trip_is_atomic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("entries.json");
        let gateway = PersistenceGateway::new(FileStore::new(&path));

        assert!(gateway.load().unwrap().entries.is_empty());
        gateway.save(&sample()).unwrap();
        assert!(path.exists());
        assert!(!dir.path().join("nested").join("entries.json.tmp").exists());
        assert_eq!(gateway.load().unwrap().entries, sample());
    }

    #[test]
    fn file_store_keeps_corrupt_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        fs::write(&path, "not json").unwrap();

        let gateway = PersistenceGateway::new(FileStore::new(&path));
        let loaded = gateway.load().unwrap();
        assert!(loaded.problem.is_some());
        let copy = dir.path().join("entries.json.corrupt");
        assert_eq!(fs::read_to_string(copy).unwrap(), "not json");
    }

    #[test]
    fn file_store_never_replaces_an_earlier_copy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        let store = FileStore::new(&path);

        fs::write(&path, "first").unwrap();
        store.preserve("corrupt").unwrap();
        fs::write(&path, "second").unwrap();
        let copy = store.preserve("corrupt").unwrap().unwrap();

        assert!(copy.ends_with("entries.json.corrupt.1"));
        assert_eq!(fs::read_to_string(dir.path().join("entries.json.corrupt")).unwrap(), "first");
        assert_eq!(fs::read_to_string(dir.path().join("entries.json.corrupt.1")).unwrap(), "second");
    }

    #[test]
    fn failed_file_write_leaves_no_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("entries.json");
        // A directory in the way makes the final rename fail.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), "x").unwrap();

        assert!(FileStore::new(&path).write(b"{}").is_err());
        assert!(!dir.path().join("entries.json.tmp").exists());
        assert!(path.join("keep").exists());
    }

    #[test]
    fn preserve_on_missing_file_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = PersistenceGateway::new(FileStore::new(dir.path().join("entries.json")));
        assert_eq!(gateway.preserve("overflow").unwrap(), None);
    }

    fn arb_date() -> impl Strategy<Value = NaiveDate> {
        (0u64..20_000).prop_map(|d| {
            NaiveDate::from_ymd_opt(1990, 1, 1)
                .unwrap()
                .checked_add_days(Days::new(d))
                .unwrap()
        })
    }

    fn arb_record() -> impl Strategy<Value = ProgressRecord> {
        (arb_date(), 0u8..=10, "\\PC{0,16}").prop_map(|(date, rating, label)| ProgressRecord {
            date,
            rating,
            label,
        })
    }

    fn arb_entry() -> impl Strategy<Value = Entry> {
        (
            "\\PC{0,24}",
            "\\PC{0,24}",
            "\\PC{0,48}",
            0u8..=10,
            proptest::option::of(arb_date()),
            proptest::collection::vec(arb_record(), 0..6),
        )
            .prop_map(|(name, goal, details, base_rating, target_date, progress_records)| Entry {
                name,
                goal,
                details,
                base_rating,
                target_date,
                progress_records,
            })
    }

    proptest! {
        #[test]
        fn any_entry_sequence_survives_save_and_load(
            entries in proptest::collection::vec(arb_entry(), 1..8)
        ) {
            let gateway = PersistenceGateway::new(MemoryStore::default());
            gateway.save(&entries).unwrap();
            let loaded = gateway.load().unwrap();
            prop_assert!(loaded.problem.is_none());
            prop_assert_eq!(loaded.entries, entries);
        }
    }
}
