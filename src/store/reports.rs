//! Student Report Storage
//! Mission: Reports with nullable soft foreign keys resolved at read time

use crate::store::records::{Record, RecordKind, RecordStore};
use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A student report. The referenced ids are soft foreign keys: nullable,
/// unenforced at creation, resolved only when reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentReport {
    pub id: Uuid,
    pub title: String,
    pub user_id: Uuid,
    pub course_id: Option<Uuid>,
    pub note_id: Option<Uuid>,
    pub difficulty_id: Option<Uuid>,
    pub achievement_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub certificate_id: Option<Uuid>,
    pub date_of_report: Option<String>,
    pub created_at: String,
}

/// A report with each soft foreign key resolved to its referent.
/// Each referent is independently nullable.
#[derive(Debug, Serialize)]
pub struct ResolvedReport {
    #[serde(flatten)]
    pub report: StudentReport,
    pub course: Option<Record>,
    pub note: Option<Record>,
    pub difficulty: Option<Record>,
    pub achievement: Option<Record>,
    pub event: Option<Record>,
    pub certificate: Option<Record>,
}

#[derive(Debug, Deserialize)]
pub struct CreateReportRequest {
    pub title: String,
    pub course_id: Option<Uuid>,
    pub note_id: Option<Uuid>,
    pub difficulty_id: Option<Uuid>,
    pub achievement_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub certificate_id: Option<Uuid>,
    pub date_of_report: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateReportRequest {
    pub title: Option<String>,
    pub course_id: Option<Uuid>,
    pub note_id: Option<Uuid>,
    pub difficulty_id: Option<Uuid>,
    pub achievement_id: Option<Uuid>,
    pub event_id: Option<Uuid>,
    pub certificate_id: Option<Uuid>,
    pub date_of_report: Option<String>,
}

fn parse_opt_uuid(v: Option<String>) -> Option<Uuid> {
    v.and_then(|s| Uuid::parse_str(&s).ok())
}

fn row_to_report(row: &Row) -> rusqlite::Result<StudentReport> {
    Ok(StudentReport {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        title: row.get(1)?,
        user_id: Uuid::parse_str(&row.get::<_, String>(2)?).unwrap(),
        course_id: parse_opt_uuid(row.get(3)?),
        note_id: parse_opt_uuid(row.get(4)?),
        difficulty_id: parse_opt_uuid(row.get(5)?),
        achievement_id: parse_opt_uuid(row.get(6)?),
        event_id: parse_opt_uuid(row.get(7)?),
        certificate_id: parse_opt_uuid(row.get(8)?),
        date_of_report: row.get(9)?,
        created_at: row.get(10)?,
    })
}

const COLUMNS: &str = "id, title, user_id, course_id, note_id, difficulty_id, achievement_id, \
     event_id, certificate_id, date_of_report, created_at";

pub struct ReportStore {
    db_path: String,
}

impl ReportStore {
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
            "CREATE TABLE IF NOT EXISTS student_reports (
                id TEXT PRIMARY KEY,
                title TEXT NOT NULL,
                user_id TEXT NOT NULL,
                course_id TEXT,
                note_id TEXT,
                difficulty_id TEXT,
                achievement_id TEXT,
                event_id TEXT,
                certificate_id TEXT,
                date_of_report TEXT,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_reports_user ON student_reports(user_id)",
            [],
        )?;

        Ok(())
    }

    pub fn create(&self, user_id: &Uuid, req: &CreateReportRequest) -> Result<StudentReport> {
        let report = StudentReport {
            id: Uuid::new_v4(),
            title: req.title.clone(),
            user_id: *user_id,
            course_id: req.course_id,
            note_id: req.note_id,
            difficulty_id: req.difficulty_id,
            achievement_id: req.achievement_id,
            event_id: req.event_id,
            certificate_id: req.certificate_id,
            date_of_report: req.date_of_report.clone(),
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO student_reports
                (id, title, user_id, course_id, note_id, difficulty_id, achievement_id,
                 event_id, certificate_id, date_of_report, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                report.id.to_string(),
                report.title,
                report.user_id.to_string(),
                report.course_id.map(|u| u.to_string()),
                report.note_id.map(|u| u.to_string()),
                report.difficulty_id.map(|u| u.to_string()),
                report.achievement_id.map(|u| u.to_string()),
                report.event_id.map(|u| u.to_string()),
                report.certificate_id.map(|u| u.to_string()),
                report.date_of_report,
                report.created_at,
            ],
        )
        .context("Failed to insert student report")?;

        Ok(report)
    }

    pub fn list(&self, user_id: &Uuid) -> Result<Vec<StudentReport>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM student_reports WHERE user_id = ?1 ORDER BY created_at"
        ))?;

        let reports = stmt
            .query_map(params![user_id.to_string()], row_to_report)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reports)
    }

    /// Intentionally unscoped listing for the admin/reporting view.
    pub fn list_all(&self) -> Result<Vec<StudentReport>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM student_reports ORDER BY created_at"
        ))?;

        let reports = stmt
            .query_map([], row_to_report)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(reports)
    }

    pub fn get(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<StudentReport>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM student_reports WHERE id = ?1 AND user_id = ?2"
        ))?;

        match stmt.query_row(params![id.to_string(), user_id.to_string()], row_to_report) {
            Ok(report) => Ok(Some(report)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Partial update, scoped by the same owner column as reads.
    pub fn update(
        &self,
        id: &Uuid,
        user_id: &Uuid,
        upd: &UpdateReportRequest,
    ) -> Result<Option<StudentReport>> {
        let Some(mut report) = self.get(id, user_id)? else {
            return Ok(None);
        };

        if let Some(title) = &upd.title {
            report.title = title.clone();
        }
        if upd.course_id.is_some() {
            report.course_id = upd.course_id;
        }
        if upd.note_id.is_some() {
            report.note_id = upd.note_id;
        }
        if upd.difficulty_id.is_some() {
            report.difficulty_id = upd.difficulty_id;
        }
        if upd.achievement_id.is_some() {
            report.achievement_id = upd.achievement_id;
        }
        if upd.event_id.is_some() {
            report.event_id = upd.event_id;
        }
        if upd.certificate_id.is_some() {
            report.certificate_id = upd.certificate_id;
        }
        if let Some(date) = &upd.date_of_report {
            report.date_of_report = Some(date.clone());
        }

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE student_reports SET title = ?1, course_id = ?2, note_id = ?3,
                difficulty_id = ?4, achievement_id = ?5, event_id = ?6, certificate_id = ?7,
                date_of_report = ?8 WHERE id = ?9",
            params![
                report.title,
                report.course_id.map(|u| u.to_string()),
                report.note_id.map(|u| u.to_string()),
                report.difficulty_id.map(|u| u.to_string()),
                report.achievement_id.map(|u| u.to_string()),
                report.event_id.map(|u| u.to_string()),
                report.certificate_id.map(|u| u.to_string()),
                report.date_of_report,
                id.to_string(),
            ],
        )
        .context("Failed to update student report")?;

        Ok(Some(report))
    }

    pub fn delete(&self, id: &Uuid, user_id: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let rows = conn.execute(
            "DELETE FROM student_reports WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string()],
        )?;

        Ok(rows > 0)
    }

    pub fn count_for_user(&self, user_id: &Uuid) -> Result<i64> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM student_reports WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Resolve each soft foreign key on a report to its referent. A dangling or
/// absent id simply yields `None` for that slot.
pub fn resolve_report(report: StudentReport, records: &RecordStore) -> Result<ResolvedReport> {
    let lookup = |kind: RecordKind, id: Option<Uuid>| -> Result<Option<Record>> {
        match id {
            Some(id) => records.get_any(kind, &id),
            None => Ok(None),
        }
    };

    Ok(ResolvedReport {
        course: lookup(RecordKind::Course, report.course_id)?,
        note: lookup(RecordKind::Note, report.note_id)?,
        difficulty: lookup(RecordKind::Difficulty, report.difficulty_id)?,
        achievement: lookup(RecordKind::Achievement, report.achievement_id)?,
        event: lookup(RecordKind::Event, report.event_id)?,
        certificate: lookup(RecordKind::Certificate, report.certificate_id)?,
        report,
    })
}
