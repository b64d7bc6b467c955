//! SQLite-backed entity store
//!
//! Documents are persisted as flat tables, one row per entity, with every
//! code list stored as JSON text. A document header carries a `generation`
//! counter; each commit bumps it with a compare-and-set so a write against a
//! stale snapshot fails with [`FmeaError::Conflict`] instead of clobbering
//! someone else's changes.

mod commit;
mod queries;
mod schema;

pub use queries::StoredEntity;

use std::fs;
use std::path::Path;

use rusqlite::Connection;
use tracing::debug;

use crate::core::document::Arena;
use crate::core::error::{FmeaError, Result};
use crate::entities::{DocumentHeader, Fault, Function, Structure};

/// Current schema version
const SCHEMA_VERSION: i64 = 1;

/// Persistence collaborator used by the document assembler
pub trait EntityStore {
    /// Header row of one document
    fn load_header(&self, code: &str) -> Result<DocumentHeader>;

    /// Every entity of one kind belonging to `document`
    fn load_entities<T: StoredEntity>(&self, document: &str) -> Result<Vec<T>>;

    /// Apply `changes` and the new header in one transaction
    ///
    /// `expected_generation` is the generation the caller loaded (0 for a
    /// document that was never stored). Returns the new generation.
    fn commit(
        &mut self,
        header: &DocumentHeader,
        expected_generation: u64,
        changes: &ChangeSet,
    ) -> Result<u64>;
}

/// Insert / update / delete partition of one entity collection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDiff<T> {
    pub inserts: Vec<T>,
    pub updates: Vec<T>,
    pub deletes: Vec<String>,
}

impl<T> Default for EntityDiff<T> {
    fn default() -> Self {
        Self {
            inserts: Vec::new(),
            updates: Vec::new(),
            deletes: Vec::new(),
        }
    }
}

impl<T: StoredEntity> EntityDiff<T> {
    /// Partition `incoming` against the persisted rows by code
    ///
    /// Rows that exist on both sides but are unchanged are left out.
    pub fn between(stored: &[T], incoming: &Arena<T>) -> Self {
        let mut diff = Self::default();
        for entity in incoming.iter() {
            match stored.iter().find(|s| s.code() == entity.code()) {
                None => diff.inserts.push(entity.clone()),
                Some(existing) if existing != entity => diff.updates.push(entity.clone()),
                Some(_) => {}
            }
        }
        diff.deletes = stored
            .iter()
            .filter(|s| !incoming.contains(s.code()))
            .map(|s| s.code().to_string())
            .collect();
        diff
    }

    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

/// All entity changes of one document write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    pub structures: EntityDiff<Structure>,
    pub functions: EntityDiff<Function>,
    pub faults: EntityDiff<Fault>,
}

impl ChangeSet {
    pub fn is_empty(&self) -> bool {
        self.structures.is_empty() && self.functions.is_empty() && self.faults.is_empty()
    }

    /// Number of inserted, updated and deleted rows
    pub fn counts(&self) -> (usize, usize, usize) {
        let inserts =
            self.structures.inserts.len() + self.functions.inserts.len() + self.faults.inserts.len();
        let updates =
            self.structures.updates.len() + self.functions.updates.len() + self.faults.updates.len();
        let deletes =
            self.structures.deletes.len() + self.functions.deletes.len() + self.faults.deletes.len();
        (inserts, updates, deletes)
    }
}

/// The SQLite store
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open or create a database file
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        // readers stay unblocked during a commit
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        debug!(path = %path.display(), "store opened");
        Self::from_connection(conn)
    }

    /// A private database that lives as long as the store
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut store = Self { conn };
        match store.schema_version()? {
            None => store.init_schema()?,
            Some(SCHEMA_VERSION) => {}
            Some(found) => {
                return Err(FmeaError::UnsupportedSchema {
                    found,
                    expected: SCHEMA_VERSION,
                })
            }
        }
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::Document;
    use crate::core::entity::EntityKind;
    use crate::entities::StructureDraft;
    use tempfile::tempdir;

    fn create_test_document() -> Document {
        let mut doc = Document::new(
            DocumentHeader::new("DOC-1", "Brake FMEA", ""),
            Structure::new("STR-1", "Vehicle"),
        );
        let mut n = 1;
        let mut codes = |kind: EntityKind| {
            n += 1;
            format!("{}-{}", kind.prefix(), n)
        };
        doc.create_child_structure("STR-1", StructureDraft::new("Brake"), &mut codes)
            .unwrap();
        doc
    }

    fn changes_for(store: &SqliteStore, doc: &Document) -> ChangeSet {
        ChangeSet {
            structures: EntityDiff::between(
                &store.load_entities::<Structure>(doc.code()).unwrap(),
                &doc.structures,
            ),
            functions: EntityDiff::between(
                &store.load_entities::<Function>(doc.code()).unwrap(),
                &doc.functions,
            ),
            faults: EntityDiff::between(
                &store.load_entities::<Fault>(doc.code()).unwrap(),
                &doc.faults,
            ),
        }
    }

    #[test]
    fn test_open_creates_file_and_reopens() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("nested").join("fmea.db");
        {
            let mut store = SqliteStore::open(&path).unwrap();
            let doc = create_test_document();
            let changes = changes_for(&store, &doc);
            store.commit(&doc.header, 0, &changes).unwrap();
        }
        assert!(path.exists());

        let store = SqliteStore::open(&path).unwrap();
        let header = store.load_header("DOC-1").unwrap();
        assert_eq!(header.generation, 1);
        assert_eq!(store.load_entities::<Structure>("DOC-1").unwrap().len(), 2);
    }

    #[test]
    fn test_diff_partitions_by_code() {
        let stored = vec![
            Structure::new("STR-1", "Vehicle"),
            Structure::new("STR-2", "Brake"),
            Structure::new("STR-3", "Steering"),
        ];
        let incoming: Arena<Structure> = vec![
            Structure::new("STR-1", "Vehicle"),
            Structure::new("STR-2", "Brake system"),
            Structure::new("STR-4", "Chassis"),
        ]
        .into_iter()
        .collect();

        let diff = EntityDiff::between(&stored, &incoming);
        assert_eq!(diff.inserts.len(), 1);
        assert_eq!(diff.inserts[0].code, "STR-4");
        assert_eq!(diff.updates.len(), 1);
        assert_eq!(diff.updates[0].long_name, "Brake system");
        assert_eq!(diff.deletes, vec!["STR-3".to_string()]);
    }

    #[test]
    fn test_empty_diff() {
        let incoming: Arena<Fault> = Arena::new();
        let diff = EntityDiff::between(&[], &incoming);
        assert!(diff.is_empty());
        assert!(ChangeSet::default().is_empty());
    }

    #[test]
    fn test_unknown_schema_version_rejected() {
        let tmp = tempdir().unwrap();
        let path = tmp.path().join("fmea.db");
        {
            let store = SqliteStore::open(&path).unwrap();
            store
                .conn
                .execute("UPDATE schema_version SET version = 99", [])
                .unwrap();
        }
        assert!(matches!(
            SqliteStore::open(&path),
            Err(FmeaError::UnsupportedSchema { found: 99, .. })
        ));
    }
}
