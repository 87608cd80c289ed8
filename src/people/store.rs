// People persistence
// Stores the people table in a TOML file next to the binary's config

use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::sync::Mutex;

use super::Person;

/// On-disk layout of the store file
#[derive(Debug, Serialize, Deserialize, Default)]
struct PeopleFile {
    #[serde(default)]
    people: Vec<Person>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store {0} does not exist, run with --migrate first")]
    NotMigrated(PathBuf),

    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("failed to encode people table: {0}")]
    Encode(#[from] toml::ser::Error),
}

/// File-backed people table
///
/// Every operation reads the file fresh and releases it before returning. Writes
/// go through a temporary file and a rename so readers never see a torn table.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create an empty store if none exists
    ///
    /// Returns `true` when a new file was written.
    pub async fn migrate(&self) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;

        match fs::try_exists(&self.path).await {
            Ok(true) => {
                // Refuse to treat a corrupt file as migrated
                self.load().await?;
                Ok(false)
            }
            Ok(false) => {
                self.save(&PeopleFile::default()).await?;
                Ok(true)
            }
            Err(source) => Err(self.io_error(source)),
        }
    }

    /// All people in insertion order
    pub async fn all(&self) -> Result<Vec<Person>, StoreError> {
        Ok(self.load().await?.people)
    }

    pub async fn insert(&self, person: Person) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut table = self.load().await?;
        table.people.push(person);
        self.save(&table).await
    }

    async fn load(&self) -> Result<PeopleFile, StoreError> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotMigrated(self.path.clone()));
            }
            Err(e) => return Err(self.io_error(e)),
        };

        toml::from_str(&content).map_err(|source| StoreError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    async fn save(&self, table: &PeopleFile) -> Result<(), StoreError> {
        let content = toml::to_string_pretty(table)?;
        let tmp_path = self.path.with_extension("toml.tmp");

        fs::write(&tmp_path, content)
            .await
            .map_err(|e| self.io_error(e))?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|e| self.io_error(e))
    }

    fn io_error(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
