use crate::errors::{AppError, AppResult};
use crate::models::{TemplateMetaPatch, TemplateRecord, TemplateSummary, TemplateSummaryFields, TemplateWidget};
use crate::store::{apply_meta_patch, TemplateStore};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

const SCHEMA_SQL: &str = include_str!("schema.sql");

const RECORD_COLUMNS: &str = "t.id, t.name, t.description, t.author, t.tags_json, t.summary_json, \
     t.widgets_json, t.created_at, t.updated_at, p.data_uri";

/// SQLite-backed template storage.
#[derive(Debug)]
pub struct Database {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl Database {
    pub fn new(path: &Path) -> AppResult<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|err| AppError::Io(err.to_string()))?;
        }
        let conn = Connection::open(path).map_err(AppError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(AppError::from)?;

        Ok(Self {
            conn: Mutex::new(conn),
            db_path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn conn(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("database mutex poisoned".to_string()))
    }

    fn read_with(conn: &Connection, id: &str) -> AppResult<Option<TemplateRecord>> {
        let record = conn
            .query_row(
                &format!(
                    "SELECT {} FROM templates t
                     LEFT JOIN template_previews p ON p.template_id = t.id
                     WHERE t.id = ?1",
                    RECORD_COLUMNS
                ),
                [id],
                parse_record_row,
            )
            .optional()?;
        Ok(record)
    }
}

impl TemplateStore for Database {
    fn create(&self, record: &TemplateRecord) -> AppResult<String> {
        let tags_json = serde_json::to_string(&record.tags)?;
        let summary_json = serde_json::to_string(&record.summary)?;
        let widgets_json = serde_json::to_string(&record.widgets)?;

        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        let exists: Option<String> = tx
            .query_row("SELECT id FROM templates WHERE id = ?1", [&record.id], |row| row.get(0))
            .optional()?;
        if exists.is_some() {
            return Err(AppError::Validation(format!("Template already exists: {}", record.id)));
        }
        tx.execute(
            "INSERT INTO templates (
               id, name, description, author, tags_json, summary_json, widgets_json, created_at, updated_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id,
                record.name,
                record.description,
                record.author,
                tags_json,
                summary_json,
                widgets_json,
                record.created_at.to_rfc3339(),
                record.updated_at.to_rfc3339(),
            ],
        )?;
        if let Some(preview) = &record.preview_image {
            tx.execute(
                "INSERT INTO template_previews (template_id, data_uri, updated_at) VALUES (?1, ?2, ?3)",
                params![record.id, preview, record.updated_at.to_rfc3339()],
            )?;
        }
        tx.commit()?;
        Ok(record.id.clone())
    }

    fn read(&self, id: &str) -> AppResult<Option<TemplateRecord>> {
        let conn = self.conn()?;
        Self::read_with(&conn, id)
    }

    fn list(&self) -> AppResult<Vec<TemplateSummary>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT t.id, t.name, t.description, t.author, t.tags_json, t.summary_json,
                    t.created_at, t.updated_at, p.template_id IS NOT NULL
             FROM templates t
             LEFT JOIN template_previews p ON p.template_id = t.id
             ORDER BY t.seq ASC",
        )?;
        let rows = stmt.query_map([], parse_summary_row)?;
        let mut summaries = Vec::new();
        for row in rows {
            summaries.push(row?);
        }
        Ok(summaries)
    }

    fn update(&self, id: &str, patch: &TemplateMetaPatch) -> AppResult<Option<TemplateRecord>> {
        let conn = self.conn()?;
        let Some(mut record) = Self::read_with(&conn, id)? else {
            return Ok(None);
        };
        apply_meta_patch(&mut record, patch, Utc::now())?;
        conn.execute(
            "UPDATE templates
             SET name = ?1, description = ?2, author = ?3, tags_json = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                record.name,
                record.description,
                record.author,
                serde_json::to_string(&record.tags)?,
                record.updated_at.to_rfc3339(),
                id,
            ],
        )?;
        Ok(Some(record))
    }

    fn delete(&self, id: &str) -> AppResult<bool> {
        let conn = self.conn()?;
        conn.execute("DELETE FROM template_previews WHERE template_id = ?1", [id])?;
        let removed = conn.execute("DELETE FROM templates WHERE id = ?1", [id])?;
        Ok(removed > 0)
    }

    fn save_preview(&self, id: &str, data_uri: &str) -> AppResult<bool> {
        let conn = self.conn()?;
        let exists: Option<String> = conn
            .query_row("SELECT id FROM templates WHERE id = ?1", [id], |row| row.get(0))
            .optional()?;
        if exists.is_none() {
            return Ok(false);
        }
        conn.execute(
            "INSERT INTO template_previews (template_id, data_uri, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(template_id) DO UPDATE SET data_uri = excluded.data_uri, updated_at = excluded.updated_at",
            params![id, data_uri, Utc::now().to_rfc3339()],
        )?;
        Ok(true)
    }

    fn read_preview(&self, id: &str) -> AppResult<Option<String>> {
        let conn = self.conn()?;
        let preview = conn
            .query_row(
                "SELECT data_uri FROM template_previews WHERE template_id = ?1",
                [id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(preview)
    }
}

fn parse_record_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TemplateRecord> {
    Ok(TemplateRecord {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        author: row.get(3)?,
        tags: parse_json::<Vec<String>>(&row.get::<_, String>(4)?, 4)?,
        summary: parse_json::<TemplateSummaryFields>(&row.get::<_, String>(5)?, 5)?,
        widgets: parse_json::<Vec<TemplateWidget>>(&row.get::<_, String>(6)?, 6)?,
        created_at: parse_time(&row.get::<_, String>(7)?)?,
        updated_at: parse_time(&row.get::<_, String>(8)?)?,
        preview_image: row.get(9)?,
    })
}

fn parse_summary_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<TemplateSummary> {
    Ok(TemplateSummary {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        author: row.get(3)?,
        tags: parse_json::<Vec<String>>(&row.get::<_, String>(4)?, 4)?,
        summary: parse_json::<TemplateSummaryFields>(&row.get::<_, String>(5)?, 5)?,
        created_at: parse_time(&row.get::<_, String>(6)?)?,
        updated_at: parse_time(&row.get::<_, String>(7)?)?,
        has_preview: row.get(8)?,
    })
}

fn parse_json<T: DeserializeOwned>(raw: &str, column: usize) -> rusqlite::Result<T> {
    serde_json::from_str(raw).map_err(|error| {
        rusqlite::Error::FromSqlConversionFailure(column, rusqlite::types::Type::Text, Box::new(error))
    })
}

fn parse_time(raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|error| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, error.to_string())),
            )
        })
}
