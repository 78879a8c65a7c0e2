//! Document persistence: one `Persistence` handle over either a SQLite
//! document table or the in-process fallback store.

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use study_buddy_types::Document;

use crate::config::Config;

/// Collection names, lowercase entity names.
pub mod collections {
    pub const USER: &str = "user";
    pub const PROFILE: &str = "profile";
    pub const DOUBT: &str = "doubt";
    pub const FLASHCARD: &str = "flashcard";
    pub const QUIZ: &str = "quiz";
    pub const STUDY_PLAN: &str = "studyplan";
    pub const NOTE_SUMMARY: &str = "notesummary";
}

/// Number of collection names reported by diagnostics.
const DIAGNOSTIC_COLLECTION_LIMIT: usize = 10;

// =====================================================
// Errors
// =====================================================

#[derive(Debug)]
pub enum StoreError {
    Sqlite(rusqlite::Error),
    Serialization(serde_json::Error),
    Io(std::io::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Sqlite(e) => write!(f, "SQLite error: {}", e),
            StoreError::Serialization(e) => write!(f, "Serialization error: {}", e),
            StoreError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Sqlite(e) => Some(e),
            StoreError::Serialization(e) => Some(e),
            StoreError::Io(e) => Some(e),
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Sqlite(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e)
    }
}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        StoreError::Io(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// =====================================================
// Filters
// =====================================================

/// Equality filter: a document matches when every key is present on it
/// with an equal value. The empty filter matches everything.
#[derive(Debug, Clone, Default)]
pub struct Filter(Map<String, Value>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn eq(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn matches(&self, doc: &Document) -> bool {
        self.0.iter().all(|(key, value)| doc.get(key) == Some(value))
    }
}

// =====================================================
// Backends
// =====================================================

/// A place documents can be appended to and queried from.
pub trait DocumentStore: Send + Sync {
    /// Append `doc` to `collection`, assigning and returning its id.
    /// `now` is the instant the document was stamped with.
    fn insert(&self, collection: &str, doc: Document, now: DateTime<Utc>) -> StoreResult<String>;

    fn find(&self, collection: &str, filter: &Filter, limit: Option<usize>)
        -> StoreResult<Vec<Document>>;

    /// Names of all collections holding at least one document, sorted.
    fn collection_names(&self) -> StoreResult<Vec<String>>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreMode {
    /// Documents live in a SQLite database and survive restarts.
    Database,
    /// Documents live in process memory only.
    Fallback,
}

/// Snapshot used by the connectivity endpoint. Listing failures are kept
/// as text instead of failing the request.
#[derive(Debug)]
pub struct StoreDiagnostics {
    pub mode: StoreMode,
    pub collections: Result<Vec<String>, String>,
}

pub struct Persistence {
    backend: Box<dyn DocumentStore>,
    mode: StoreMode,
}

impl Persistence {
    /// Fallback persistence; nothing outlives the process.
    pub fn in_memory() -> Self {
        Self {
            backend: Box::new(MemoryStore::new()),
            mode: StoreMode::Fallback,
        }
    }

    pub fn database(store: SqliteStore) -> Self {
        Self {
            backend: Box::new(store),
            mode: StoreMode::Database,
        }
    }

    /// Database-backed when both the location and the name are configured,
    /// fallback otherwise.
    pub fn from_config(config: &Config) -> StoreResult<Self> {
        match config.store_location() {
            Some((url, name)) => {
                log::info!("Opening document store '{}' at {}", name, url);
                Ok(Self::database(SqliteStore::open_in(url, name)?))
            }
            None => {
                log::warn!(
                    "DATABASE_URL/DATABASE_NAME not set, using in-memory fallback store (data is lost on restart)"
                );
                Ok(Self::in_memory())
            }
        }
    }

    pub fn mode(&self) -> StoreMode {
        self.mode
    }

    /// Stamp `doc` with the current time and append it to `collection`.
    pub fn create(&self, collection: &str, mut doc: Document) -> StoreResult<String> {
        let now = Utc::now();
        doc.stamp(&now.to_rfc3339());
        let id = self.backend.insert(collection, doc, now)?;
        log::debug!("Created {} document {}", collection, id);
        Ok(id)
    }

    pub fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Document>> {
        self.backend.find(collection, filter, limit)
    }

    pub fn diagnostics(&self) -> StoreDiagnostics {
        let collections = match self.mode {
            StoreMode::Fallback => Ok(Vec::new()),
            StoreMode::Database => self
                .backend
                .collection_names()
                .map(|mut names| {
                    names.truncate(DIAGNOSTIC_COLLECTION_LIMIT);
                    names
                })
                .map_err(|e| e.to_string()),
        };
        StoreDiagnostics {
            mode: self.mode,
            collections,
        }
    }
}
