//! SQLite-backed document store. Documents are kept as JSON text in a single
//! table and queried with SQLite's JSON functions.

use std::path::Path;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Result as SqliteResult};
use serde_json::Value;
use study_buddy_types::Document;
use uuid::Uuid;

use super::{DocumentStore, Filter, StoreResult};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn open(path: &str) -> SqliteResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(path)?
        };
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.create_tables()?;
        Ok(store)
    }

    /// Open database `name` under the directory `url`, creating the
    /// directory if needed. `:memory:` opens a private in-memory database.
    pub fn open_in(url: &str, name: &str) -> StoreResult<Self> {
        if url == ":memory:" {
            return Ok(Self::open(url)?);
        }
        std::fs::create_dir_all(url)?;
        let path = Path::new(url).join(format!("{}.db", name));
        Ok(Self::open(&path.to_string_lossy())?)
    }

    fn create_tables(&self) -> SqliteResult<()> {
        let conn = self.conn.lock();
        conn.execute(
            "CREATE TABLE IF NOT EXISTS documents (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                collection TEXT NOT NULL,
                doc_id TEXT NOT NULL UNIQUE,
                data TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq)",
            [],
        )?;
        Ok(())
    }
}

impl DocumentStore for SqliteStore {
    fn insert(
        &self,
        collection: &str,
        mut doc: Document,
        now: DateTime<Utc>,
    ) -> StoreResult<String> {
        let id = Uuid::new_v4().to_string();
        doc.set_id(&id);
        let data = serde_json::to_string(&doc)?;

        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO documents (collection, doc_id, data, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            rusqlite::params![collection, id, data, now.to_rfc3339()],
        )?;
        Ok(id)
    }

    fn find(
        &self,
        collection: &str,
        filter: &Filter,
        limit: Option<usize>,
    ) -> StoreResult<Vec<Document>> {
        let (sql, params) = build_find_query(collection, filter, limit)?;

        let conn = self.conn.lock();
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(params), |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<Vec<String>>>()?;

        let mut docs = Vec::with_capacity(rows.len());
        for data in rows {
            docs.push(serde_json::from_str(&data)?);
        }
        Ok(docs)
    }

    fn collection_names(&self) -> StoreResult<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt =
            conn.prepare("SELECT DISTINCT collection FROM documents ORDER BY collection ASC")?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<SqliteResult<Vec<String>>>()?;
        Ok(names)
    }
}

/// JSON path selecting a top-level key, quoted so any key text is accepted.
fn json_path(key: &str) -> String {
    format!("$.\"{}\"", key.replace('"', "\\\""))
}

/// Translate an equality filter into a WHERE clause over the JSON column.
/// A key missing from a document makes `json_type` NULL, which never matches.
fn build_find_query(
    collection: &str,
    filter: &Filter,
    limit: Option<usize>,
) -> StoreResult<(String, Vec<SqlValue>)> {
    let mut sql = String::from("SELECT data FROM documents WHERE collection = ?1");
    let mut params = vec![SqlValue::Text(collection.to_string())];

    for (key, value) in filter.iter() {
        params.push(SqlValue::Text(json_path(key)));
        let path = params.len();
        match value {
            Value::Null => {
                sql.push_str(&format!(" AND json_type(data, ?{}) = 'null'", path));
            }
            Value::Bool(b) => {
                sql.push_str(&format!(
                    " AND json_type(data, ?{}) = '{}'",
                    path,
                    if *b { "true" } else { "false" }
                ));
            }
            Value::Number(n) => {
                let bound = match n.as_i64() {
                    Some(i) => SqlValue::Integer(i),
                    None => SqlValue::Real(n.as_f64().unwrap_or(f64::NAN)),
                };
                params.push(bound);
                sql.push_str(&format!(
                    " AND json_type(data, ?{p}) IN ('integer', 'real') AND json_extract(data, ?{p}) = ?{v}",
                    p = path,
                    v = params.len()
                ));
            }
            Value::String(s) => {
                params.push(SqlValue::Text(s.clone()));
                sql.push_str(&format!(
                    " AND json_type(data, ?{p}) = 'text' AND json_extract(data, ?{p}) = ?{v}",
                    p = path,
                    v = params.len()
                ));
            }
            Value::Array(_) | Value::Object(_) => {
                params.push(SqlValue::Text(serde_json::to_string(value)?));
                sql.push_str(&format!(
                    " AND json_type(data, ?{p}) IN ('array', 'object') AND json_extract(data, ?{p}) = json(?{v})",
                    p = path,
                    v = params.len()
                ));
            }
        }
    }

    sql.push_str(" ORDER BY seq ASC");
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }
    Ok((sql, params))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_path_quotes_key() {
        assert_eq!(json_path("user_id"), "$.\"user_id\"");
        assert_eq!(json_path("a\"b"), "$.\"a\\\"b\"");
    }

    #[test]
    fn test_build_find_query_binds_every_value() {
        let filter = Filter::new().eq("user_id", "u1").eq("minutes", 20);
        let (sql, params) = build_find_query("studyplan", &filter, Some(5)).unwrap();
        assert!(sql.starts_with("SELECT data FROM documents WHERE collection = ?1"));
        assert!(sql.ends_with("ORDER BY seq ASC LIMIT 5"));
        // collection + (path, value) per key
        assert_eq!(params.len(), 5);
    }

    #[test]
    fn test_store_ids_are_uuids() {
        let store = SqliteStore::open(":memory:").unwrap();
        let id = store.insert("user", Document::new(), Utc::now()).unwrap();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn test_documents_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = dir.path().to_string_lossy().to_string();
        let mut doc = Document::new();
        doc.insert("user_id", "u1");

        let id = {
            let store = SqliteStore::open_in(&url, "study").unwrap();
            store.insert("doubt", doc, Utc::now()).unwrap()
        };

        let store = SqliteStore::open_in(&url, "study").unwrap();
        let found = store
            .find("doubt", &Filter::new().eq("user_id", "u1"), None)
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id(), Some(id.as_str()));
        assert_eq!(found[0].get("user_id"), Some(&json!("u1")));
        assert!(dir.path().join("study.db").exists());
    }
}
