//! Task database file with XDG path support.
//!
//! The database is stored as JSON at `~/.local/share/tw/tasks.json` on Linux.
//!
//! Both synchronous and asynchronous I/O methods are provided:
//! - `save()`, `load()` - Synchronous methods using `std::fs`
//! - `save_async()`, `load_async()` - Asynchronous methods using `tokio::fs`

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use thiserror::Error;

use crate::Database;

/// Default database filename.
const DATABASE_FILENAME: &str = "tasks.json";

/// Application qualifier (for XDG paths).
const QUALIFIER: &str = "";

/// Application organization (for XDG paths).
const ORGANIZATION: &str = "";

/// Application name (for XDG paths).
const APPLICATION: &str = "tw";

/// Errors that can occur while reading or writing the database file.
#[derive(Debug, Error)]
pub enum DatabaseFileError {
    /// Failed to determine the XDG data directory.
    #[error("failed to determine data directory: no valid home directory found")]
    NoDataDir,

    /// I/O error during file read.
    #[error("failed to read database file '{path}': {source}")]
    ReadError {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file write.
    #[error("failed to write database file '{path}': {source}")]
    WriteError {
        /// The path that failed to write.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during directory creation.
    #[error("failed to create data directory '{path}': {source}")]
    CreateDirError {
        /// The directory path that failed to create.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// I/O error during file delete.
    #[error("failed to delete database file '{path}': {source}")]
    DeleteError {
        /// The path that failed to delete.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DatabaseFileError {
    /// Returns true for a read of a file that does not exist.
    fn is_not_found(&self) -> bool {
        matches!(
            self,
            DatabaseFileError::ReadError { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}

/// Result type for database file operations.
pub type Result<T> = std::result::Result<T, DatabaseFileError>;

/// On-disk location of the task database.
///
/// Writes go to a sibling `.tmp` file that is then renamed over the target,
/// so a crash mid-write leaves the previous contents intact.
///
/// # Example
///
/// ```no_run
/// use tickwise_store::{Database, DatabaseFile};
///
/// let file = DatabaseFile::new()?;
/// let db = file.load_or_default()?;
/// file.save(&db)?;
/// # Ok::<(), tickwise_store::DatabaseFileError>(())
/// ```
#[derive(Debug, Clone)]
pub struct DatabaseFile {
    path: PathBuf,
}

impl DatabaseFile {
    /// Creates a handle at the default XDG data path.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseFileError::NoDataDir` if the home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: Self::default_path()?,
        })
    }

    /// Creates a handle at a custom path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the default XDG data path for the database file.
    ///
    /// On Unix: `~/.local/share/tw/tasks.json`
    /// On macOS: `~/Library/Application Support/tw/tasks.json`
    pub fn default_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from(QUALIFIER, ORGANIZATION, APPLICATION)
            .ok_or(DatabaseFileError::NoDataDir)?;

        Ok(project_dirs.data_dir().join(DATABASE_FILENAME))
    }

    /// Returns the path to the database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns true if the database file exists on disk.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    fn temp_path(&self) -> PathBuf {
        self.path.with_extension("tmp")
    }

    fn read_error(&self, source: io::Error) -> DatabaseFileError {
        DatabaseFileError::ReadError {
            path: self.path.clone(),
            source,
        }
    }

    fn decode(contents: &str) -> Result<Database> {
        let mut db: Database = serde_json::from_str(contents)?;
        // Lookup index is not serialized
        db.rebuild_indexes();
        Ok(db)
    }

    /// Loads the database from disk.
    ///
    /// # Errors
    ///
    /// - `DatabaseFileError::ReadError` if the file cannot be read (including
    ///   a missing file; see [`load_or_default`](Self::load_or_default)).
    /// - `DatabaseFileError::Json` if the file contains invalid JSON.
    pub fn load(&self) -> Result<Database> {
        let contents = fs::read_to_string(&self.path).map_err(|e| self.read_error(e))?;
        Self::decode(&contents)
    }

    /// Loads the database, returning an empty one if the file doesn't exist.
    pub fn load_or_default(&self) -> Result<Database> {
        match self.load() {
            Err(e) if e.is_not_found() => Ok(Database::default()),
            other => other,
        }
    }

    /// Saves the database atomically, creating the parent directory.
    ///
    /// # Errors
    ///
    /// - `DatabaseFileError::CreateDirError` if the directory cannot be created.
    /// - `DatabaseFileError::WriteError` if the file cannot be written.
    pub fn save(&self, db: &Database) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| DatabaseFileError::CreateDirError {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let json = serde_json::to_string_pretty(db)?;

        let temp_path = self.temp_path();
        fs::write(&temp_path, &json).map_err(|e| DatabaseFileError::WriteError {
            path: temp_path.clone(),
            source: e,
        })?;
        fs::rename(&temp_path, &self.path).map_err(|e| DatabaseFileError::WriteError {
            path: self.path.clone(),
            source: e,
        })?;

        tracing::debug!(path = %self.path.display(), tasks = db.len(), "saved database");
        Ok(())
    }

    /// Deletes the database file. A missing file is not an error.
    pub fn delete(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DatabaseFileError::DeleteError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }

    // =========================================================================
    // Async I/O Methods
    // =========================================================================

    /// Async equivalent of [`load()`](Self::load).
    pub async fn load_async(&self) -> Result<Database> {
        let contents = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| self.read_error(e))?;
        Self::decode(&contents)
    }

    /// Async equivalent of [`load_or_default()`](Self::load_or_default).
    pub async fn load_or_default_async(&self) -> Result<Database> {
        match self.load_async().await {
            Err(e) if e.is_not_found() => Ok(Database::default()),
            other => other,
        }
    }

    /// Async equivalent of [`save()`](Self::save).
    pub async fn save_async(&self, db: &Database) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| DatabaseFileError::CreateDirError {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
        }

        let json = serde_json::to_string_pretty(db)?;

        let temp_path = self.temp_path();
        tokio::fs::write(&temp_path, &json)
            .await
            .map_err(|e| DatabaseFileError::WriteError {
                path: temp_path.clone(),
                source: e,
            })?;
        tokio::fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| DatabaseFileError::WriteError {
                path: self.path.clone(),
                source: e,
            })?;

        tracing::debug!(path = %self.path.display(), tasks = db.len(), "saved database");
        Ok(())
    }

    /// Async equivalent of [`delete()`](Self::delete).
    pub async fn delete_async(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(DatabaseFileError::DeleteError {
                path: self.path.clone(),
                source: e,
            }),
        }
    }
}
