//! The write path: one transaction per document commit

use rusqlite::{params, params_from_iter, types::Value, OptionalExtension, Transaction};
use tracing::{debug, info};

use super::queries::{header_values, HEADER_COLUMNS};
use super::{ChangeSet, EntityDiff, EntityStore, SqliteStore, StoredEntity};
use crate::core::error::{FmeaError, Result};
use crate::entities::DocumentHeader;

impl EntityStore for SqliteStore {
    fn load_header(&self, code: &str) -> Result<DocumentHeader> {
        self.read_header(code)
    }

    fn load_entities<T: StoredEntity>(&self, document: &str) -> Result<Vec<T>> {
        self.read_entities(document)
    }

    fn commit(
        &mut self,
        header: &DocumentHeader,
        expected_generation: u64,
        changes: &ChangeSet,
    ) -> Result<u64> {
        // Dropping the transaction without commit() rolls everything back
        let tx = self.conn.transaction()?;
        let generation = expected_generation + 1;
        write_header(&tx, header, expected_generation, generation)?;

        let doc = header.code.as_str();
        upsert(&tx, doc, &changes.structures)?;
        upsert(&tx, doc, &changes.functions)?;
        upsert(&tx, doc, &changes.faults)?;
        delete(&tx, doc, &changes.faults)?;
        delete(&tx, doc, &changes.functions)?;
        delete(&tx, doc, &changes.structures)?;

        tx.commit()?;
        let (inserted, updated, deleted) = changes.counts();
        info!(document = doc, generation, inserted, updated, deleted, "document committed");
        Ok(generation)
    }
}

/// Insert a new header or bump the generation of an existing one
fn write_header(
    tx: &Transaction<'_>,
    header: &DocumentHeader,
    expected: u64,
    generation: u64,
) -> Result<()> {
    let conflict = || FmeaError::Conflict {
        code: header.code.clone(),
        expected,
    };
    let values = header_values(header, generation)?;

    if expected == 0 {
        let exists = tx
            .query_row(
                "SELECT 1 FROM documents WHERE code = ?1",
                params![header.code],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        if exists.is_some() {
            return Err(conflict());
        }
        let placeholders: Vec<String> = (1..=values.len()).map(|i| format!("?{}", i)).collect();
        tx.execute(
            &format!(
                "INSERT INTO documents ({}) VALUES ({})",
                HEADER_COLUMNS,
                placeholders.join(", ")
            ),
            params_from_iter(values.iter()),
        )?;
        return Ok(());
    }

    // Compare-and-set on the generation the caller loaded
    let assignments: Vec<String> = HEADER_COLUMNS
        .split(", ")
        .enumerate()
        .skip(1)
        .map(|(i, column)| format!("{} = ?{}", column, i + 1))
        .collect();
    let mut args: Vec<Value> = values;
    args.push(Value::Integer(expected as i64));
    let updated = tx.execute(
        &format!(
            "UPDATE documents SET {} WHERE code = ?1 AND generation = ?{}",
            assignments.join(", "),
            args.len()
        ),
        params_from_iter(args.iter()),
    )?;
    if updated == 0 {
        debug!(document = %header.code, expected, "generation mismatch");
        return Err(conflict());
    }
    Ok(())
}

fn upsert<T: StoredEntity>(tx: &Transaction<'_>, doc: &str, diff: &EntityDiff<T>) -> Result<()> {
    let table = T::KIND.table();
    let columns = T::COLUMNS;

    if !diff.inserts.is_empty() {
        let placeholders: Vec<String> = (1..=columns.len() + 1).map(|i| format!("?{}", i)).collect();
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {} (document_code, {}) VALUES ({})",
            table,
            columns.join(", "),
            placeholders.join(", ")
        ))?;
        for entity in &diff.inserts {
            stmt.execute(params_from_iter(row_args(doc, entity)?.iter()))?;
        }
    }

    if !diff.updates.is_empty() {
        // ?1 = document, ?2 = code, data columns follow
        let assignments: Vec<String> = columns
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, column)| format!("{} = ?{}", column, i + 2))
            .collect();
        let mut stmt = tx.prepare(&format!(
            "UPDATE {} SET {} WHERE document_code = ?1 AND code = ?2",
            table,
            assignments.join(", ")
        ))?;
        for entity in &diff.updates {
            stmt.execute(params_from_iter(row_args(doc, entity)?.iter()))?;
        }
    }
    Ok(())
}

fn delete<T: StoredEntity>(tx: &Transaction<'_>, doc: &str, diff: &EntityDiff<T>) -> Result<()> {
    if diff.deletes.is_empty() {
        return Ok(());
    }
    let mut stmt = tx.prepare(&format!(
        "DELETE FROM {} WHERE document_code = ?1 AND code = ?2",
        T::KIND.table()
    ))?;
    for code in &diff.deletes {
        stmt.execute(params![doc, code])?;
    }
    Ok(())
}

fn row_args<T: StoredEntity>(doc: &str, entity: &T) -> Result<Vec<Value>> {
    let mut args = vec![Value::Text(doc.to_string())];
    args.extend(entity.to_values()?);
    Ok(args)
}
