//! File-backed storage for the bank, registry, and schema.
//!
//! Artifacts live as JSON files in one data directory: `bank.json`,
//! `registry.json`, `schema.json`. Writes are atomic via the temp file +
//! rename pattern, never truncate-in-place, so concurrent readers always
//! see either the old or the new file.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{QuizError, Result};
use crate::model::{GoalRegistry, Question, SchemaDescriptor};
use crate::store::Storage;

/// Bank file name inside the data directory.
pub const BANK_FILE: &str = "bank.json";
/// Registry file name inside the data directory.
pub const REGISTRY_FILE: &str = "registry.json";
/// Schema descriptor file name inside the data directory.
pub const SCHEMA_FILE: &str = "schema.json";

/// File-backed storage rooted at a data directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    /// Create a storage rooted at `data_dir`, creating the directory if
    /// needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self> {
        let data_dir = data_dir.into();
        if !data_dir.exists() {
            fs::create_dir_all(&data_dir).map_err(|e| QuizError::persistence(&data_dir, e))?;
        }
        Ok(Self { data_dir })
    }

    /// The directory holding the three artifacts.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the bank file.
    pub fn bank_path(&self) -> PathBuf {
        self.data_dir.join(BANK_FILE)
    }

    /// Path of the registry file.
    pub fn registry_path(&self) -> PathBuf {
        self.data_dir.join(REGISTRY_FILE)
    }

    /// Path of the schema file.
    pub fn schema_path(&self) -> PathBuf {
        self.data_dir.join(SCHEMA_FILE)
    }

    fn temp_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!(".{name}.tmp"))
    }

    /// Write a value as JSON atomically using temp file + rename.
    fn atomic_write<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let final_path = self.data_dir.join(name);
        let temp_path = self.temp_path(name);

        let json = serde_json::to_string_pretty(value)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| QuizError::persistence(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| QuizError::persistence(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| QuizError::persistence(&temp_path, e))?;
        }

        // Rename is atomic on POSIX.
        fs::rename(&temp_path, &final_path).map_err(|e| QuizError::persistence(&final_path, e))?;

        Ok(())
    }

    /// Read a JSON value, returning `None` when the file does not exist.
    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let path = self.data_dir.join(name);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| QuizError::persistence(&path, e))?;
        let value = serde_json::from_str(&content)?;
        Ok(Some(value))
    }
}

impl Storage for FileStorage {
    fn read_bank(&self) -> Result<Vec<Question>> {
        Ok(self.read_json(BANK_FILE)?.unwrap_or_default())
    }

    fn write_bank(&self, questions: &[Question]) -> Result<()> {
        self.atomic_write(BANK_FILE, &questions)
    }

    fn read_registry(&self) -> Result<Option<GoalRegistry>> {
        self.read_json(REGISTRY_FILE)
    }

    fn write_registry(&self, registry: &GoalRegistry) -> Result<()> {
        self.atomic_write(REGISTRY_FILE, registry)
    }

    fn read_schema(&self) -> Result<Option<SchemaDescriptor>> {
        self.read_json(SCHEMA_FILE)
    }

    fn write_schema(&self, schema: &SchemaDescriptor) -> Result<()> {
        self.atomic_write(SCHEMA_FILE, schema)
    }
}
