//! Simple Record Storage
//! Mission: One uniform CRUD surface for the title/description record kinds

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The record kinds sharing the uniform title/description shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
    Course,
    Note,
    Difficulty,
    Achievement,
    Event,
    Certificate,
    FinancialReport,
}

impl RecordKind {
    pub fn as_str(&self) -> &str {
        match self {
            RecordKind::Course => "course",
            RecordKind::Note => "note",
            RecordKind::Difficulty => "difficulty",
            RecordKind::Achievement => "achievement",
            RecordKind::Event => "event",
            RecordKind::Certificate => "certificate",
            RecordKind::FinancialReport => "financial_report",
        }
    }

    pub const ALL: [RecordKind; 7] = [
        RecordKind::Course,
        RecordKind::Note,
        RecordKind::Difficulty,
        RecordKind::Achievement,
        RecordKind::Event,
        RecordKind::Certificate,
        RecordKind::FinancialReport,
    ];
}

/// A simple owned record (course, note, difficulty, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Record {
    pub id: Uuid,
    pub kind: RecordKind,
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
    pub user_id: Uuid,
    pub created_at: String,
}

/// Create request body shared across kinds.
#[derive(Debug, Deserialize)]
pub struct CreateRecordRequest {
    pub title: String,
    pub description: String,
    pub image_url: Option<String>,
}

/// Partial update body shared across kinds.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateRecordRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

fn row_to_record(row: &Row) -> rusqlite::Result<Record> {
    let kind_str: String = row.get(1)?;
    Ok(Record {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        kind: kind_from_str(&kind_str),
        title: row.get(2)?,
        description: row.get(3)?,
        image_url: row.get(4)?,
        user_id: Uuid::parse_str(&row.get::<_, String>(5)?).unwrap(),
        created_at: row.get(6)?,
    })
}

fn kind_from_str(s: &str) -> RecordKind {
    RecordKind::ALL
        .into_iter()
        .find(|k| k.as_str() == s)
        .unwrap_or(RecordKind::Course)
}

/// SQLite-backed store for all simple record kinds, discriminated by a
/// `kind` column.
pub struct RecordStore {
    db_path: String,
}

impl RecordStore {
    pub fn new(db_path: &str) -> Result<Self> {
        let store = Self {
            db_path: db_path.to_string(),
        };
        store.init_db()?;
        Ok(store)
    }

    fn init_db(&self) -> Result<()> {
        let conn = Connection::open(&self.db_path)?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS records (
                id TEXT PRIMARY KEY,
                kind TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                image_url TEXT,
                user_id TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_records_kind_user ON records(kind, user_id)",
            [],
        )?;

        Ok(())
    }

    pub fn create(
        &self,
        kind: RecordKind,
        user_id: &Uuid,
        req: &CreateRecordRequest,
    ) -> Result<Record> {
        let record = Record {
            id: Uuid::new_v4(),
            kind,
            title: req.title.clone(),
            description: req.description.clone(),
            image_url: req.image_url.clone(),
            user_id: *user_id,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO records (id, kind, title, description, image_url, user_id, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                record.id.to_string(),
                record.kind.as_str(),
                record.title,
                record.description,
                record.image_url,
                record.user_id.to_string(),
                record.created_at,
            ],
        )
        .context("Failed to insert record")?;

        Ok(record)
    }

    /// All records of one kind owned by a user.
    pub fn list(&self, kind: RecordKind, user_id: &Uuid) -> Result<Vec<Record>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, kind, title, description, image_url, user_id, created_at
             FROM records WHERE kind = ?1 AND user_id = ?2 ORDER BY created_at",
        )?;

        let records = stmt
            .query_map(params![kind.as_str(), user_id.to_string()], row_to_record)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(records)
    }

    /// Owner-scoped lookup. Missing and not-owned are indistinguishable.
    pub fn get(&self, kind: RecordKind, id: &Uuid, user_id: &Uuid) -> Result<Option<Record>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, kind, title, description, image_url, user_id, created_at
             FROM records WHERE kind = ?1 AND id = ?2 AND user_id = ?3",
        )?;

        match stmt.query_row(
            params![kind.as_str(), id.to_string(), user_id.to_string()],
            row_to_record,
        ) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Unscoped lookup used when resolving report soft foreign keys.
    pub fn get_any(&self, kind: RecordKind, id: &Uuid) -> Result<Option<Record>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, kind, title, description, image_url, user_id, created_at
             FROM records WHERE kind = ?1 AND id = ?2",
        )?;

        match stmt.query_row(params![kind.as_str(), id.to_string()], row_to_record) {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Partial update under the ownership rule.
    pub fn update(
        &self,
        kind: RecordKind,
        id: &Uuid,
        user_id: &Uuid,
        upd: &UpdateRecordRequest,
    ) -> Result<Option<Record>> {
        let Some(mut record) = self.get(kind, id, user_id)? else {
            return Ok(None);
        };

        if let Some(title) = &upd.title {
            record.title = title.clone();
        }
        if let Some(description) = &upd.description {
            record.description = description.clone();
        }
        if let Some(image_url) = &upd.image_url {
            record.image_url = Some(image_url.clone());
        }

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE records SET title = ?1, description = ?2, image_url = ?3 WHERE id = ?4",
            params![
                record.title,
                record.description,
                record.image_url,
                id.to_string()
            ],
        )
        .context("Failed to update record")?;

        Ok(Some(record))
    }

    /// Delete under the ownership rule. Returns false on miss.
    pub fn delete(&self, kind: RecordKind, id: &Uuid, user_id: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let rows = conn.execute(
            "DELETE FROM records WHERE kind = ?1 AND id = ?2 AND user_id = ?3",
            params![kind.as_str(), id.to_string(), user_id.to_string()],
        )?;

        Ok(rows > 0)
    }

    /// Count one kind for one user (profile statistics).
    pub fn count_for_user(&self, kind: RecordKind, user_id: &Uuid) -> Result<i64> {
        let conn = Connection::open(&self.db_path)?;

        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM records WHERE kind = ?1 AND user_id = ?2",
            params![kind.as_str(), user_id.to_string()],
            |row| row.get(0),
        )?;

        Ok(count)
    }
}
