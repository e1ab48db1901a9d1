//! Persistence gateway for finished run results.
//!
//! One JSON document per composite key `{library identity}_{test group}`,
//! stored under a directory. Writes are atomic per key (temp file in the
//! same directory, then rename), so a record is either fully replaced or
//! untouched. Per-frame timing arrays are stripped before writing; they are
//! bulky and not needed downstream.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::adapter::LibraryInfo;
use crate::error::{Error, Result};
use crate::record::{ResultRecord, Run};

/// A run's results as stored: keyed, timestamped, timings stripped.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedRecord {
    /// `{library identity}_{test group name}`; uniquely determines a slot.
    pub id: String,
    pub library: String,
    pub test_group: String,
    pub results: Vec<ResultRecord>,
    pub saved_at: DateTime<Utc>,
}

/// Directory-backed keyed store for benchmark results.
pub struct ResultStore {
    dir: PathBuf,
}

impl ResultStore {
    /// Open (and create if needed) a store rooted at `dir`.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// The composite key for a library + group pair.
    #[must_use]
    pub fn key_for(library: &LibraryInfo, group_name: &str) -> String {
        format!("{}_{}", library.identity(), group_name)
    }

    /// Save a finished run, fully replacing any record under the same key.
    pub fn save(&self, library: &LibraryInfo, run: &Run) -> Result<PersistedRecord> {
        let record = PersistedRecord {
            id: Self::key_for(library, &run.group_name),
            library: library.identity(),
            test_group: run.group_name.clone(),
            results: run
                .records()
                .iter()
                .map(ResultRecord::without_frame_timings)
                .collect(),
            saved_at: Utc::now(),
        };
        self.write_record(&record)?;
        Ok(record)
    }

    fn write_record(&self, record: &PersistedRecord) -> Result<()> {
        let path = self.path_for_key(&record.id);
        let json = serde_json::to_vec_pretty(record)?;

        let mut tmp = tempfile::NamedTempFile::new_in(&self.dir)?;
        tmp.write_all(&json)?;
        tmp.persist(&path)
            .map_err(|err| Error::store(format!("atomic replace of {} failed: {}", path.display(), err.error)))?;

        debug!(id = %record.id, path = %path.display(), "persisted run results");
        Ok(())
    }

    /// Fetch one record by its composite key.
    pub fn get(&self, id: &str) -> Result<Option<PersistedRecord>> {
        let path = self.path_for_key(id);
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(read_record(&path)?))
    }

    /// Fetch all stored records. Order is unspecified.
    pub fn fetch_all(&self) -> Result<Vec<PersistedRecord>> {
        let mut records = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|ext| ext.to_str()) != Some("json") {
                continue;
            }
            match read_record(&path) {
                Ok(record) => records.push(record),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping unreadable record");
                }
            }
        }
        Ok(records)
    }

    /// Secondary lookup: all records for one library identity.
    pub fn find_by_library(&self, library: &str) -> Result<Vec<PersistedRecord>> {
        Ok(self
            .fetch_all()?
            .into_iter()
            .filter(|record| record.library == library)
            .collect())
    }

    /// Secondary lookup: all records for one test group name.
    pub fn find_by_test_group(&self, test_group: &str) -> Result<Vec<PersistedRecord>> {
        Ok(self
            .fetch_all()?
            .into_iter()
            .filter(|record| record.test_group == test_group)
            .collect())
    }

    fn path_for_key(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

fn read_record(path: &Path) -> Result<PersistedRecord> {
    let json = fs::read(path)?;
    Ok(serde_json::from_slice(&json)?)
}

/// Reduce a composite key to a safe file stem. The authoritative id lives
/// inside the record; this only names the backing file.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TestCaseConfig;
    use crate::record::CaseStatus;

    fn finished_run(group_name: &str, frames: u64) -> Run {
        let mut run = Run::new(group_name);
        let record = run.record_mut(0);
        record
            .started(TestCaseConfig::new(1, 1000), 0.0)
            .unwrap();
        record.set_library("SimChart", "1.0.0");
        record.lib_loaded(5.0).unwrap();
        record.data_generated(10.0).unwrap();
        record.data_appended(15.0).unwrap();
        record.first_frame_rendered(60.0).unwrap();
        record
            .finish(
                1015.0,
                frames,
                8.0,
                vec![16.0; frames as usize],
                false,
                CaseStatus::Ok,
                240.0,
            )
            .unwrap();
        run
    }

    fn library() -> LibraryInfo {
        LibraryInfo::new("SimChart", "1.0.0")
    }

    #[test]
    fn roundtrip_strips_frame_timings() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path()).unwrap();
        let run = finished_run("Line Test", 60);

        store.save(&library(), &run).unwrap();
        let all = store.fetch_all().unwrap();

        assert_eq!(all.len(), 1);
        let record = &all[0];
        assert_eq!(record.id, "SimChart 1.0.0_Line Test");
        assert_eq!(record.results.len(), 1);
        assert!(record.results[0].frame_timings.is_empty());
        assert_eq!(record.results[0].frame_count, 60);
        assert_eq!(record.results[0].status, CaseStatus::Ok);
    }

    #[test]
    fn resave_overwrites_the_same_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path()).unwrap();

        store.save(&library(), &finished_run("Line Test", 10)).unwrap();
        store.save(&library(), &finished_run("Line Test", 99)).unwrap();

        let all = store.fetch_all().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].results[0].frame_count, 99);
    }

    #[test]
    fn get_returns_none_for_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path()).unwrap();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn secondary_lookups_filter_on_record_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path()).unwrap();
        let other = LibraryInfo::new("OtherChart", "2.0.0");

        store.save(&library(), &finished_run("Line Test", 10)).unwrap();
        store.save(&library(), &finished_run("Scatter Test", 10)).unwrap();
        store.save(&other, &finished_run("Line Test", 10)).unwrap();

        assert_eq!(store.find_by_library("SimChart 1.0.0").unwrap().len(), 2);
        assert_eq!(store.find_by_library("OtherChart 2.0.0").unwrap().len(), 1);
        assert_eq!(store.find_by_test_group("Line Test").unwrap().len(), 2);
        assert_eq!(store.find_by_test_group("Missing").unwrap().len(), 0);
    }

    #[test]
    fn keys_with_path_hostile_characters_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let store = ResultStore::open(dir.path()).unwrap();
        let run = finished_run("FIFO / ECG Chart Performance Test", 10);

        let record = store.save(&library(), &run).unwrap();
        assert!(record.id.contains('/'));
        let fetched = store.get(&record.id).unwrap().expect("record present");
        assert_eq!(fetched.test_group, "FIFO / ECG Chart Performance Test");
    }
}
