use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use super::error::StoreError;

const IMAGES_FILE_NAME: &str = "images.json";
const LEVELS_FILE_NAME: &str = "levels.json";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelsStateRecord {
    pub unlocked_ids: BTreeSet<String>,
    pub points: BTreeMap<String, f64>,
    pub best_scores: BTreeMap<String, f64>,
}

pub trait ProgressStore: Send + Sync {
    fn load_unlocked_image_set(&self) -> Result<BTreeSet<String>, StoreError>;
    fn save_unlocked_image_set(&self, images: &BTreeSet<String>) -> Result<(), StoreError>;
    fn load_levels_state(&self) -> Result<LevelsStateRecord, StoreError>;
    fn save_levels_state(&self, state: &LevelsStateRecord) -> Result<(), StoreError>;
}

#[derive(Default, Serialize, Deserialize)]
#[serde(default)]
struct ImagesFile {
    unlocked: BTreeSet<String>,
}

// On-disk shape of `levels.json`. `levels_unlocked` is the old boolean map;
// it is merged on read and never written back.
#[derive(Default, Deserialize)]
#[serde(default)]
struct LevelsFile {
    unlocked_ids: BTreeSet<String>,
    points: BTreeMap<String, f64>,
    best_scores: BTreeMap<String, f64>,
    levels_unlocked: BTreeMap<String, bool>,
}

impl From<LevelsFile> for LevelsStateRecord {
    fn from(file: LevelsFile) -> Self {
        let mut unlocked_ids = file.unlocked_ids;
        let legacy = file
            .levels_unlocked
            .into_iter()
            .filter_map(|(id, unlocked)| unlocked.then_some(id));
        unlocked_ids.extend(legacy);
        LevelsStateRecord {
            unlocked_ids,
            points: file.points,
            best_scores: file.best_scores,
        }
    }
}

#[derive(Clone, Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, name: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.dir.join(name)) {
            Ok(raw) => Ok(Some(raw)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!("[Store] {} not found, using defaults", name);
                Ok(None)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn write_atomic(&self, name: &str, data: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(name);
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, data)?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}

impl ProgressStore for JsonFileStore {
    fn load_unlocked_image_set(&self) -> Result<BTreeSet<String>, StoreError> {
        let Some(raw) = self.read(IMAGES_FILE_NAME)? else {
            return Ok(BTreeSet::new());
        };
        let file: ImagesFile = serde_json::from_str(&raw)?;
        Ok(file.unlocked)
    }

    fn save_unlocked_image_set(&self, images: &BTreeSet<String>) -> Result<(), StoreError> {
        let file = ImagesFile {
            unlocked: images.clone(),
        };
        self.write_atomic(IMAGES_FILE_NAME, &serde_json::to_string_pretty(&file)?)
    }

    fn load_levels_state(&self) -> Result<LevelsStateRecord, StoreError> {
        let Some(raw) = self.read(LEVELS_FILE_NAME)? else {
            return Ok(LevelsStateRecord::default());
        };
        let file: LevelsFile = serde_json::from_str(&raw)?;
        if !file.levels_unlocked.is_empty() {
            warn!(
                "[Store] migrating {} legacy level unlock flags",
                file.levels_unlocked.len()
            );
        }
        Ok(file.into())
    }

    fn save_levels_state(&self, state: &LevelsStateRecord) -> Result<(), StoreError> {
        self.write_atomic(LEVELS_FILE_NAME, &serde_json::to_string_pretty(state)?)
    }
}

#[derive(Default)]
struct MemoryContents {
    images: BTreeSet<String>,
    levels: LevelsStateRecord,
}

#[derive(Default)]
pub struct MemoryStore {
    contents: Mutex<MemoryContents>,
    failing: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_levels(levels: LevelsStateRecord) -> Self {
        let store = Self::default();
        if let Ok(mut contents) = store.contents.lock() {
            contents.levels = levels;
        }
        store
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::other("memory store set to fail").into());
        }
        Ok(())
    }

    fn contents(&self) -> Result<std::sync::MutexGuard<'_, MemoryContents>, StoreError> {
        self.contents
            .lock()
            .map_err(|_| io::Error::other("memory store poisoned").into())
    }
}

impl ProgressStore for MemoryStore {
    fn load_unlocked_image_set(&self) -> Result<BTreeSet<String>, StoreError> {
        Ok(self.contents()?.images.clone())
    }

    fn save_unlocked_image_set(&self, images: &BTreeSet<String>) -> Result<(), StoreError> {
        self.check()?;
        self.contents()?.images = images.clone();
        Ok(())
    }

    fn load_levels_state(&self) -> Result<LevelsStateRecord, StoreError> {
        Ok(self.contents()?.levels.clone())
    }

    fn save_levels_state(&self, state: &LevelsStateRecord) -> Result<(), StoreError> {
        self.check()?;
        self.contents()?.levels = state.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_flags_are_merged() {
        let raw = r#"{
            "unlocked_ids": ["stage1.level1"],
            "levels_unlocked": {"stage1.level2": true, "stage1.level3": false},
            "points": {"stage1.level1": 12.5}
        }"#;
        let file: LevelsFile = serde_json::from_str(raw).unwrap();
        let record = LevelsStateRecord::from(file);
        assert_eq!(
            record.unlocked_ids,
            BTreeSet::from(["stage1.level1".to_string(), "stage1.level2".to_string()])
        );
        assert_eq!(record.points["stage1.level1"], 12.5);
        assert!(record.best_scores.is_empty());
    }

    #[test]
    fn written_record_has_no_legacy_key() {
        let record = LevelsStateRecord {
            unlocked_ids: BTreeSet::from(["a".to_string()]),
            ..Default::default()
        };
        let raw = serde_json::to_string(&record).unwrap();
        assert!(!raw.contains("levels_unlocked"));
    }

    #[test]
    fn missing_keys_default() {
        let record: LevelsStateRecord = serde_json::from_str("{}").unwrap();
        assert_eq!(record, LevelsStateRecord::default());
    }

    #[test]
    fn memory_store_can_fail_saves() {
        let store = MemoryStore::new();
        store
            .save_unlocked_image_set(&BTreeSet::from(["owl".to_string()]))
            .unwrap();
        store.set_failing(true);
        assert!(store.save_unlocked_image_set(&BTreeSet::new()).is_err());
        assert_eq!(store.load_unlocked_image_set().unwrap().len(), 1);
    }
}
