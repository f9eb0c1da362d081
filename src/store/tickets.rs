//! Ticket Storage
//! Mission: Support tickets opened by students, optionally assigned to staff

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Ticket lifecycle states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    #[serde(rename = "Open")]
    Open,
    #[serde(rename = "In Progress")]
    InProgress,
    #[serde(rename = "Resolved")]
    Resolved,
    #[serde(rename = "Closed")]
    Closed,
}

impl TicketStatus {
    pub fn as_str(&self) -> &str {
        match self {
            TicketStatus::Open => "Open",
            TicketStatus::InProgress => "In Progress",
            TicketStatus::Resolved => "Resolved",
            TicketStatus::Closed => "Closed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Open" => Some(TicketStatus::Open),
            "In Progress" => Some(TicketStatus::InProgress),
            "Resolved" => Some(TicketStatus::Resolved),
            "Closed" => Some(TicketStatus::Closed),
            _ => None,
        }
    }
}

/// A support ticket. `updated_at` is refreshed on every save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ticket {
    pub id: Uuid,
    pub user_id: Uuid,
    pub assigned_to: Option<Uuid>,
    pub title: String,
    pub description: String,
    pub response: Option<String>,
    pub status: TicketStatus,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    pub description: String,
    pub assigned_to: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub response: Option<String>,
    pub status: Option<TicketStatus>,
    pub assigned_to: Option<Uuid>,
}

fn row_to_ticket(row: &Row) -> rusqlite::Result<Ticket> {
    let status_str: String = row.get(6)?;
    Ok(Ticket {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
        assigned_to: row
            .get::<_, Option<String>>(2)?
            .and_then(|s| Uuid::parse_str(&s).ok()),
        title: row.get(3)?,
        description: row.get(4)?,
        response: row.get(5)?,
        status: TicketStatus::from_str(&status_str).unwrap_or(TicketStatus::Open),
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

const COLUMNS: &str =
    "id, user_id, assigned_to, title, description, response, status, created_at, updated_at";

pub struct TicketStore {
    db_path: String,
}

impl TicketStore {
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
            "CREATE TABLE IF NOT EXISTS tickets (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                assigned_to TEXT,
                title TEXT NOT NULL,
                description TEXT NOT NULL,
                response TEXT,
                status TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_tickets_user ON tickets(user_id)",
            [],
        )?;

        Ok(())
    }

    pub fn create(&self, user_id: &Uuid, req: &CreateTicketRequest) -> Result<Ticket> {
        let now = Utc::now().to_rfc3339();
        let ticket = Ticket {
            id: Uuid::new_v4(),
            user_id: *user_id,
            assigned_to: req.assigned_to,
            title: req.title.clone(),
            description: req.description.clone(),
            response: None,
            status: TicketStatus::Open,
            created_at: now.clone(),
            updated_at: now,
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO tickets (id, user_id, assigned_to, title, description, response, status, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                ticket.id.to_string(),
                ticket.user_id.to_string(),
                ticket.assigned_to.map(|u| u.to_string()),
                ticket.title,
                ticket.description,
                ticket.response,
                ticket.status.as_str(),
                ticket.created_at,
                ticket.updated_at,
            ],
        )
        .context("Failed to insert ticket")?;

        Ok(ticket)
    }

    pub fn list(&self, user_id: &Uuid) -> Result<Vec<Ticket>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM tickets WHERE user_id = ?1 ORDER BY created_at"
        ))?;

        let tickets = stmt
            .query_map(params![user_id.to_string()], row_to_ticket)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tickets)
    }

    pub fn get(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Ticket>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM tickets WHERE id = ?1 AND user_id = ?2"
        ))?;

        match stmt.query_row(params![id.to_string(), user_id.to_string()], row_to_ticket) {
            Ok(ticket) => Ok(Some(ticket)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Partial update; refreshes `updated_at` on every save.
    pub fn update(
        &self,
        id: &Uuid,
        user_id: &Uuid,
        upd: &UpdateTicketRequest,
    ) -> Result<Option<Ticket>> {
        let Some(mut ticket) = self.get(id, user_id)? else {
            return Ok(None);
        };

        if let Some(title) = &upd.title {
            ticket.title = title.clone();
        }
        if let Some(description) = &upd.description {
            ticket.description = description.clone();
        }
        if let Some(response) = &upd.response {
            ticket.response = Some(response.clone());
        }
        if let Some(status) = upd.status {
            ticket.status = status;
        }
        if let Some(assigned_to) = upd.assigned_to {
            ticket.assigned_to = Some(assigned_to);
        }
        ticket.updated_at = Utc::now().to_rfc3339();

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE tickets SET assigned_to = ?1, title = ?2, description = ?3, response = ?4,
                status = ?5, updated_at = ?6 WHERE id = ?7",
            params![
                ticket.assigned_to.map(|u| u.to_string()),
                ticket.title,
                ticket.description,
                ticket.response,
                ticket.status.as_str(),
                ticket.updated_at,
                id.to_string(),
            ],
        )
        .context("Failed to update ticket")?;

        Ok(Some(ticket))
    }

    pub fn delete(&self, id: &Uuid, user_id: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let rows = conn.execute(
            "DELETE FROM tickets WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string()],
        )?;

        Ok(rows > 0)
    }

    pub fn count_for_user(&self, user_id: &Uuid) -> Result<i64> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tickets WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (TicketStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = TicketStore::new(temp_file.path().to_str().unwrap()).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_ticket_defaults_open() {
        let (store, _temp) = create_test_store();
        let user = Uuid::new_v4();

        let ticket = store
            .create(
                &user,
                &CreateTicketRequest {
                    title: "Login broken".to_string(),
                    description: "Cannot sign in".to_string(),
                    assigned_to: None,
                },
            )
            .unwrap();

        assert_eq!(ticket.status, TicketStatus::Open);
        assert!(ticket.response.is_none());
        assert_eq!(ticket.created_at, ticket.updated_at);
    }

    #[test]
    fn test_update_refreshes_updated_at() {
        let (store, _temp) = create_test_store();
        let user = Uuid::new_v4();

        let ticket = store
            .create(
                &user,
                &CreateTicketRequest {
                    title: "T".to_string(),
                    description: "D".to_string(),
                    assigned_to: None,
                },
            )
            .unwrap();

        std::thread::sleep(std::time::Duration::from_millis(5));

        let updated = store
            .update(
                &ticket.id,
                &user,
                &UpdateTicketRequest {
                    status: Some(TicketStatus::Resolved),
                    response: Some("Fixed".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.status, TicketStatus::Resolved);
        assert_eq!(updated.response.as_deref(), Some("Fixed"));
        assert!(updated.updated_at > ticket.updated_at);
        // Untouched fields survive
        assert_eq!(updated.title, "T");
    }

    #[test]
    fn test_ownership_scoping() {
        let (store, _temp) = create_test_store();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();

        let ticket = store
            .create(
                &owner,
                &CreateTicketRequest {
                    title: "Mine".to_string(),
                    description: "Private".to_string(),
                    assigned_to: None,
                },
            )
            .unwrap();

        assert!(store.get(&ticket.id, &intruder).unwrap().is_none());
        assert!(store
            .update(&ticket.id, &intruder, &UpdateTicketRequest::default())
            .unwrap()
            .is_none());
        assert!(!store.delete(&ticket.id, &intruder).unwrap());
        assert!(store.delete(&ticket.id, &owner).unwrap());
    }

    #[test]
    fn test_status_serialization() {
        let status: TicketStatus = serde_json::from_str(r#""In Progress""#).unwrap();
        assert_eq!(status, TicketStatus::InProgress);
        assert_eq!(
            serde_json::to_string(&TicketStatus::InProgress).unwrap(),
            r#""In Progress""#
        );
        assert_eq!(TicketStatus::from_str("Nope"), None);
    }
}
