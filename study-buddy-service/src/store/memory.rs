//! In-process fallback store used when no database is configured.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use study_buddy_types::Document;

use super::{DocumentStore, Filter, StoreResult};

/// Collections kept as insertion-ordered vectors in a shared map.
///
/// Ids look like `demo-<collection>-<epoch millis>-<sequence>`. The sequence
/// is the document's 1-based position in its collection and is taken under
/// the same write lock as the append, so concurrent writers never share one.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn insert(
        &self,
        collection: &str,
        mut doc: Document,
        now: DateTime<Utc>,
    ) -> StoreResult<String> {
        let mut collections = self.collections.write();
        let docs = collections.entry(collection.to_string()).or_default();
        let id = format!(
            "demo-{}-{}-{}",
            collection,
            now.timestamp_millis(),
            docs.len() + 1
        );
        doc.set_id(&id);
        docs.push(doc);
        Ok(id)
    }

    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.collections.read();
        let Some(docs) = collections.get(collection) else {
            return Ok(Vec::new());
        };
        Ok(docs
            .iter()
            .filter(|doc| filter.matches(doc))
            .take(limit.unwrap_or(usize::MAX))
            .cloned()
            .collect())
    }

    fn collection_names(&self) -> StoreResult<Vec<String>> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        Ok(names)
    }
}
