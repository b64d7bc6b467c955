//! Database schema initialization

use rusqlite::{params, OptionalExtension};

use super::{SqliteStore, SCHEMA_VERSION};
use crate::core::error::Result;

impl SqliteStore {
    /// Version recorded in the database, `None` for an empty database
    pub(super) fn schema_version(&self) -> Result<Option<i64>> {
        let has_table: bool = self.conn.query_row(
            "SELECT COUNT(*) > 0 FROM sqlite_master WHERE type = 'table' AND name = 'schema_version'",
            [],
            |row| row.get(0),
        )?;
        if !has_table {
            return Ok(None);
        }
        let version = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(version)
    }

    /// Create every table
    pub(super) fn init_schema(&mut self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            -- Schema version tracking
            CREATE TABLE IF NOT EXISTS schema_version (
                version INTEGER PRIMARY KEY
            );

            -- Document headers; generation is bumped on every commit
            CREATE TABLE IF NOT EXISTS documents (
                code TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                version TEXT NOT NULL,
                stage TEXT NOT NULL,
                root_structure_code TEXT NOT NULL,
                planning TEXT NOT NULL,
                team TEXT NOT NULL,
                created TEXT NOT NULL,
                updated TEXT NOT NULL,
                generation INTEGER NOT NULL
            );

            -- Structure tree nodes
            CREATE TABLE IF NOT EXISTS structures (
                document_code TEXT NOT NULL,
                code TEXT NOT NULL,
                long_name TEXT NOT NULL,
                short_name TEXT NOT NULL,
                category TEXT NOT NULL,
                seq INTEGER NOT NULL,
                level INTEGER NOT NULL,
                decomposition TEXT NOT NULL,
                functions TEXT NOT NULL,
                PRIMARY KEY (document_code, code),
                FOREIGN KEY (document_code) REFERENCES documents(code) ON DELETE CASCADE
            );

            -- Functions attached to structures
            CREATE TABLE IF NOT EXISTS functions (
                document_code TEXT NOT NULL,
                code TEXT NOT NULL,
                long_name TEXT NOT NULL,
                short_name TEXT NOT NULL,
                seq INTEGER NOT NULL,
                level INTEGER NOT NULL,
                structure_code TEXT NOT NULL,
                prerequisites TEXT NOT NULL,
                fault_refs TEXT NOT NULL,
                PRIMARY KEY (document_code, code),
                FOREIGN KEY (document_code) REFERENCES documents(code) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_functions_structure ON functions(document_code, structure_code);

            -- Faults attached to functions
            CREATE TABLE IF NOT EXISTS faults (
                document_code TEXT NOT NULL,
                code TEXT NOT NULL,
                long_name TEXT NOT NULL,
                short_name TEXT NOT NULL,
                risk_priority_factor INTEGER NOT NULL,
                seq INTEGER NOT NULL,
                level INTEGER NOT NULL,
                function_code TEXT NOT NULL,
                causes TEXT NOT NULL,
                PRIMARY KEY (document_code, code),
                FOREIGN KEY (document_code) REFERENCES documents(code) ON DELETE CASCADE
            );
            CREATE INDEX IF NOT EXISTS idx_faults_function ON faults(document_code, function_code);
            "#,
        )?;

        self.conn.execute(
            "INSERT OR REPLACE INTO schema_version (version) VALUES (?1)",
            params![SCHEMA_VERSION],
        )?;

        Ok(())
    }
}
