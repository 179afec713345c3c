//! SQLite store for the catalog: one `Category` table and one `Record` table.
//!
//! Writes go through upserts keyed on the primary key with an empty update
//! set, so loading the same rows twice leaves the tables unchanged.

use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::{CatalogError, Result};

// ── Rows ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub(crate) struct Category {
    pub(crate) id: i64,
    pub(crate) name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Record {
    pub(crate) id: i64,
    pub(crate) title: String,
    pub(crate) date: DateTime<Utc>,
    pub(crate) organization: String,
    pub(crate) link: String,
    pub(crate) summary: String,
    pub(crate) category_id: i64,
}

/// Values for a category upsert.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NewCategory<'a> {
    pub(crate) id: i64,
    pub(crate) name: &'a str,
}

/// Values for a record upsert.
#[derive(Debug, Clone, Copy)]
pub(crate) struct NewRecord<'a> {
    pub(crate) id: i64,
    pub(crate) title: &'a str,
    pub(crate) date: DateTime<Utc>,
    pub(crate) organization: &'a str,
    pub(crate) link: &'a str,
    pub(crate) summary: &'a str,
    pub(crate) category_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum UpsertOutcome {
    Created,
    Unchanged,
}

// ── Schema SQL ───────────────────────────────────────────────────────────

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS Category (
    id INTEGER PRIMARY KEY,
    name TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS Record (
    id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    organization TEXT NOT NULL,
    link TEXT NOT NULL,
    summary TEXT NOT NULL,
    categoryId INTEGER NOT NULL REFERENCES Category(id) ON DELETE RESTRICT ON UPDATE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_record_category ON Record(categoryId);
";

pub(crate) struct CatalogDb {
    conn: Connection,
}

impl CatalogDb {
    /// Open an existing database. Errors if the file doesn't exist.
    pub(crate) fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(CatalogError::DatabaseMissing {
                path: path.to_path_buf(),
            });
        }
        let db = Self {
            conn: Connection::open(path)?,
        };
        db.apply_pragmas()?;
        db.init_schema()?;
        Ok(db)
    }

    /// Open or create a database file with full schema.
    pub(crate) fn open_or_create(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Self {
            conn: Connection::open(path)?,
        };
        db.apply_pragmas()?;
        db.init_schema()?;
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let db = Self {
            conn: Connection::open_in_memory()?,
        };
        db.apply_pragmas()?;
        db.init_schema()?;
        Ok(db)
    }

    fn apply_pragmas(&self) -> Result<()> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;
             PRAGMA busy_timeout = 5000;",
        )?;
        Ok(())
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(SCHEMA_SQL)?;
        Ok(())
    }

    /// Run `f` inside a transaction; any error rolls everything back.
    pub(crate) fn transaction<T>(&mut self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        self.conn.execute_batch("BEGIN IMMEDIATE")?;
        match f(self) {
            Ok(value) => {
                self.conn.execute_batch("COMMIT")?;
                Ok(value)
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK");
                Err(err)
            }
        }
    }

    // ── Writes ───────────────────────────────────────────────────────

    pub(crate) fn upsert_category(&self, category: &NewCategory<'_>) -> Result<UpsertOutcome> {
        let inserted = self.conn.execute(
            "INSERT INTO Category (id, name) VALUES (?1, ?2)
             ON CONFLICT(id) DO NOTHING",
            params![category.id, category.name],
        )?;
        Ok(outcome(inserted))
    }

    pub(crate) fn upsert_record(&self, record: &NewRecord<'_>) -> Result<UpsertOutcome> {
        let inserted = self.conn.execute(
            "INSERT INTO Record (id, title, date, organization, link, summary, categoryId)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
             ON CONFLICT(id) DO NOTHING",
            params![
                record.id,
                record.title,
                format_date(&record.date),
                record.organization,
                record.link,
                record.summary,
                record.category_id,
            ],
        )?;
        Ok(outcome(inserted))
    }

    // ── Reads ────────────────────────────────────────────────────────

    pub(crate) fn category_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Category", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub(crate) fn record_count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM Record", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub(crate) fn category_by_id(&self, id: i64) -> Result<Option<Category>> {
        let category = self
            .conn
            .query_row(
                "SELECT id, name FROM Category WHERE id = ?",
                params![id],
                |row| {
                    Ok(Category {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(category)
    }

    pub(crate) fn record_by_id(&self, id: i64) -> Result<Option<Record>> {
        let raw = self
            .conn
            .query_row(
                "SELECT id, title, date, organization, link, summary, categoryId
                 FROM Record WHERE id = ?",
                params![id],
                RawRecord::from_row,
            )
            .optional()?;
        raw.map(RawRecord::into_record).transpose()
    }

    /// All records, newest first; ties broken by id.
    pub(crate) fn list_records(&self, category_id: Option<i64>) -> Result<Vec<Record>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, title, date, organization, link, summary, categoryId
             FROM Record
             WHERE ?1 IS NULL OR categoryId = ?1
             ORDER BY date DESC, id ASC",
        )?;
        let rows = stmt.query_map(params![category_id], RawRecord::from_row)?;
        let mut records = Vec::new();
        for row in rows {
            records.push(row?.into_record()?);
        }
        Ok(records)
    }
}

fn outcome(inserted: usize) -> UpsertOutcome {
    if inserted == 0 {
        UpsertOutcome::Unchanged
    } else {
        UpsertOutcome::Created
    }
}

pub(crate) fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub(crate) fn parse_date(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| CatalogError::InvalidDate {
            value: value.to_string(),
            reason: e.to_string(),
        })
}

/// Row as stored, before the date column is parsed.
struct RawRecord {
    id: i64,
    title: String,
    date: String,
    organization: String,
    link: String,
    summary: String,
    category_id: i64,
}

impl RawRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            date: row.get(2)?,
            organization: row.get(3)?,
            link: row.get(4)?,
            summary: row.get(5)?,
            category_id: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<Record> {
        Ok(Record {
            id: self.id,
            title: self.title,
            date: parse_date(&self.date)?,
            organization: self.organization,
            link: self.link,
            summary: self.summary,
            category_id: self.category_id,
        })
    }
}

// ── Tests ────────────────────────────────────────────────────────────────
