//! Row mapping and read queries

use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, OptionalExtension, Row};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::SqliteStore;
use crate::core::entity::Entity;
use crate::core::error::{FmeaError, Result};
use crate::entities::{DocumentHeader, Fault, Function, Structure};

/// An entity that maps onto one row of its kind's table
pub trait StoredEntity: Entity + PartialEq {
    /// Data columns after `document_code`; the first is always `code`
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;

    /// Column values in [`Self::COLUMNS`] order
    fn to_values(&self) -> Result<Vec<Value>>;
}

fn conversion_error(
    idx: usize,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, err.into())
}

fn json_column<T: DeserializeOwned>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T> {
    let text: String = row.get(idx)?;
    serde_json::from_str(&text).map_err(|e| conversion_error(idx, e))
}

fn datetime_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&text)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn json_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(Value::Text(serde_json::to_string(value)?))
}

fn text(value: &str) -> Value {
    Value::Text(value.to_string())
}

fn integer(value: u32) -> Value {
    Value::Integer(i64::from(value))
}

impl StoredEntity for Structure {
    const COLUMNS: &'static [&'static str] = &[
        "code",
        "long_name",
        "short_name",
        "category",
        "seq",
        "level",
        "decomposition",
        "functions",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Structure {
            code: row.get(0)?,
            long_name: row.get(1)?,
            short_name: row.get(2)?,
            category: row.get(3)?,
            seq: row.get(4)?,
            level: row.get(5)?,
            decomposition: json_column(row, 6)?,
            functions: json_column(row, 7)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.code),
            text(&self.long_name),
            text(&self.short_name),
            text(&self.category),
            integer(self.seq),
            integer(self.level),
            json_value(&self.decomposition)?,
            json_value(&self.functions)?,
        ])
    }
}

impl StoredEntity for Function {
    const COLUMNS: &'static [&'static str] = &[
        "code",
        "long_name",
        "short_name",
        "seq",
        "level",
        "structure_code",
        "prerequisites",
        "fault_refs",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Function {
            code: row.get(0)?,
            long_name: row.get(1)?,
            short_name: row.get(2)?,
            seq: row.get(3)?,
            level: row.get(4)?,
            structure_code: row.get(5)?,
            prerequisites: json_column(row, 6)?,
            fault_refs: json_column(row, 7)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.code),
            text(&self.long_name),
            text(&self.short_name),
            integer(self.seq),
            integer(self.level),
            text(&self.structure_code),
            json_value(&self.prerequisites)?,
            json_value(&self.fault_refs)?,
        ])
    }
}

impl StoredEntity for Fault {
    const COLUMNS: &'static [&'static str] = &[
        "code",
        "long_name",
        "short_name",
        "risk_priority_factor",
        "seq",
        "level",
        "function_code",
        "causes",
    ];

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Fault {
            code: row.get(0)?,
            long_name: row.get(1)?,
            short_name: row.get(2)?,
            risk_priority_factor: row.get(3)?,
            seq: row.get(4)?,
            level: row.get(5)?,
            function_code: row.get(6)?,
            causes: json_column(row, 7)?,
        })
    }

    fn to_values(&self) -> Result<Vec<Value>> {
        Ok(vec![
            text(&self.code),
            text(&self.long_name),
            text(&self.short_name),
            integer(self.risk_priority_factor),
            integer(self.seq),
            integer(self.level),
            text(&self.function_code),
            json_value(&self.causes)?,
        ])
    }
}

pub(super) const HEADER_COLUMNS: &str = "code, name, version, stage, root_structure_code, planning, team, created, updated, generation";

fn header_from_row(row: &Row<'_>) -> rusqlite::Result<DocumentHeader> {
    let stage: String = row.get(3)?;
    let generation: i64 = row.get(9)?;
    Ok(DocumentHeader {
        code: row.get(0)?,
        name: row.get(1)?,
        version: row.get(2)?,
        stage: stage.parse().map_err(|e: String| conversion_error(3, e))?,
        root_structure_code: row.get(4)?,
        planning: json_column(row, 5)?,
        team: json_column(row, 6)?,
        created: datetime_column(row, 7)?,
        updated: datetime_column(row, 8)?,
        generation: generation.max(0) as u64,
    })
}

/// Header values in [`HEADER_COLUMNS`] order, with the given generation
pub(super) fn header_values(header: &DocumentHeader, generation: u64) -> Result<Vec<Value>> {
    Ok(vec![
        text(&header.code),
        text(&header.name),
        text(&header.version),
        Value::Text(header.stage.to_string()),
        text(&header.root_structure_code),
        json_value(&header.planning)?,
        json_value(&header.team)?,
        Value::Text(header.created.to_rfc3339()),
        Value::Text(header.updated.to_rfc3339()),
        Value::Integer(generation as i64),
    ])
}

impl SqliteStore {
    pub(super) fn read_header(&self, code: &str) -> Result<DocumentHeader> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM documents WHERE code = ?1", HEADER_COLUMNS),
                params![code],
                header_from_row,
            )
            .optional()?
            .ok_or_else(|| FmeaError::DocumentNotFound(code.to_string()))
    }

    pub(super) fn read_entities<T: StoredEntity>(&self, document: &str) -> Result<Vec<T>> {
        let sql = format!(
            "SELECT {} FROM {} WHERE document_code = ?1 ORDER BY code",
            T::COLUMNS.join(", "),
            T::KIND.table()
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![document], |row| T::from_row(row))?;
        Ok(rows.collect::<rusqlite::Result<Vec<T>>>()?)
    }

    /// Every stored document header, by code
    pub fn list_headers(&self) -> Result<Vec<DocumentHeader>> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {} FROM documents ORDER BY code", HEADER_COLUMNS))?;
        let rows = stmt.query_map([], header_from_row)?;
        Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
    }

    pub fn document_exists(&self, code: &str) -> Result<bool> {
        let found = self
            .conn
            .query_row(
                "SELECT 1 FROM documents WHERE code = ?1",
                params![code],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Remove a document and all of its entities
    pub fn delete_document(&mut self, code: &str) -> Result<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM documents WHERE code = ?1", params![code])?;
        if deleted == 0 {
            return Err(FmeaError::DocumentNotFound(code.to_string()));
        }
        Ok(())
    }
}
