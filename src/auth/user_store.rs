//! User Storage
//! Mission: Store and manage user accounts with SQLite

use crate::auth::models::{Role, UpdateUserRequest, User};
use anyhow::{Context, Result};
use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::Utc;
use rusqlite::{params, params_from_iter, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// User storage with SQLite backend
pub struct UserStore {
    db_path: String,
}

/// Query parameters for the paginated admin listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPageQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    #[serde(alias = "sortBy")]
    pub sort_by: Option<String>,
    #[serde(alias = "sortOrder")]
    pub sort_order: Option<String>,
    pub role: Option<String>,
    pub search: Option<String>,
}

/// One page of users plus pagination metadata.
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub total: i64,
    pub page: i64,
    pub pages: i64,
    pub limit: i64,
    pub data: Vec<User>,
}

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    let role_str: String = row.get(12)?;
    Ok(User {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        name: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
        phone_number: row.get(4)?,
        date_of_birth: row.get(5)?,
        gender: row.get(6)?,
        current_education_level: row.get(7)?,
        linkedin_link: row.get(8)?,
        website: row.get(9)?,
        bio: row.get(10)?,
        role: Role::from_str(&role_str).unwrap_or_default(),
        image_url: row.get(11)?,
        created_at: row.get(13)?,
    })
}

const USER_COLUMNS: &str = "id, name, email, password_hash, phone_number, date_of_birth, gender, \
     current_education_level, linkedin_link, website, bio, image_url, role, created_at";

impl UserStore {
    /// Create a new user store and initialize the schema.
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
            "CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                phone_number TEXT,
                date_of_birth TEXT,
                gender TEXT,
                current_education_level TEXT,
                linkedin_link TEXT,
                website TEXT,
                bio TEXT,
                image_url TEXT,
                role TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_users_role ON users(role)",
            [],
        )?;

        Ok(())
    }

    /// Create a new user with a freshly hashed password.
    pub fn create(&self, name: &str, email: &str, password: &str, role: Role) -> Result<User> {
        let password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;

        let user = User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            phone_number: None,
            date_of_birth: None,
            gender: None,
            current_education_level: None,
            linkedin_link: None,
            website: None,
            bio: None,
            role,
            image_url: None,
            created_at: Utc::now().to_rfc3339(),
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO users (id, name, email, password_hash, phone_number, date_of_birth,
                gender, current_education_level, linkedin_link, website, bio, image_url, role, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
            params![
                user.id.to_string(),
                user.name,
                user.email,
                user.password_hash,
                user.phone_number,
                user.date_of_birth,
                user.gender,
                user.current_education_level,
                user.linkedin_link,
                user.website,
                user.bio,
                user.image_url,
                user.role.as_str(),
                user.created_at,
            ],
        )
        .context("Failed to insert user")?;

        info!("✅ Registered user: {} ({})", user.email, user.role.as_str());

        Ok(user)
    }

    /// Get user by email.
    pub fn get_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = ?1"
        ))?;

        match stmt.query_row(params![email], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get user by id.
    pub fn get_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"))?;

        match stmt.query_row(params![id.to_string()], row_to_user) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Verify an email/password pair against the stored hash.
    pub fn verify_password(&self, email: &str, password: &str) -> Result<bool> {
        match self.get_by_email(email)? {
            Some(user) => {
                let valid =
                    verify(password, &user.password_hash).context("Failed to verify password")?;
                Ok(valid)
            }
            None => Ok(false),
        }
    }

    /// Replace a user's password hash. Returns false if the user is gone.
    pub fn update_password(&self, id: &Uuid, new_password: &str) -> Result<bool> {
        let password_hash = hash(new_password, DEFAULT_COST).context("Failed to hash password")?;

        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "UPDATE users SET password_hash = ?1 WHERE id = ?2",
            params![password_hash, id.to_string()],
        )?;

        Ok(rows > 0)
    }

    /// Apply a partial profile update. Only fields present in the request
    /// overwrite stored values; a supplied password is re-hashed.
    pub fn update_profile(&self, id: &Uuid, upd: &UpdateUserRequest) -> Result<Option<User>> {
        let Some(mut user) = self.get_by_id(id)? else {
            return Ok(None);
        };

        if let Some(name) = &upd.name {
            user.name = name.clone();
        }
        if let Some(email) = &upd.email {
            // Stored lowercased, same as signup.
            user.email = email.trim().to_lowercase();
        }
        if let Some(password) = &upd.password {
            user.password_hash = hash(password, DEFAULT_COST).context("Failed to hash password")?;
        }
        if let Some(v) = &upd.phone_number {
            user.phone_number = Some(v.clone());
        }
        if let Some(v) = &upd.date_of_birth {
            user.date_of_birth = Some(v.clone());
        }
        if let Some(v) = &upd.gender {
            user.gender = Some(v.clone());
        }
        if let Some(v) = &upd.current_education_level {
            user.current_education_level = Some(v.clone());
        }
        if let Some(v) = &upd.linkedin_link {
            user.linkedin_link = Some(v.clone());
        }
        if let Some(v) = &upd.website {
            user.website = Some(v.clone());
        }
        if let Some(v) = &upd.bio {
            user.bio = Some(v.clone());
        }
        if let Some(role) = upd.role {
            user.role = role;
        }
        if let Some(v) = &upd.image_url {
            user.image_url = Some(v.clone());
        }

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE users SET name = ?1, email = ?2, password_hash = ?3, phone_number = ?4,
                date_of_birth = ?5, gender = ?6, current_education_level = ?7, linkedin_link = ?8,
                website = ?9, bio = ?10, image_url = ?11, role = ?12
             WHERE id = ?13",
            params![
                user.name,
                user.email,
                user.password_hash,
                user.phone_number,
                user.date_of_birth,
                user.gender,
                user.current_education_level,
                user.linkedin_link,
                user.website,
                user.bio,
                user.image_url,
                user.role.as_str(),
                id.to_string(),
            ],
        )
        .context("Failed to update user")?;

        Ok(Some(user))
    }

    /// Delete a user by id. Returns false if nothing was deleted.
    pub fn delete(&self, id: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let rows = conn.execute("DELETE FROM users WHERE id = ?1", params![id.to_string()])?;

        if rows > 0 {
            info!("🗑️  Deleted user: {}", id);
        }
        Ok(rows > 0)
    }

    /// Total number of registered users.
    pub fn count(&self) -> Result<i64> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))?;
        Ok(count)
    }

    /// List every user (summary/statistics views).
    pub fn list_all(&self) -> Result<Vec<User>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY created_at"))?;

        let users = stmt
            .query_map([], row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(users)
    }

    /// Paginated listing with optional role filter and case-insensitive
    /// substring search over name/email. Sort column is whitelisted.
    pub fn list_page(&self, q: &UserPageQuery) -> Result<UserPage> {
        let page = q.page.unwrap_or(1).max(1);
        let limit = q.limit.unwrap_or(10).clamp(1, 100);
        let offset = (page - 1) * limit;

        let sort_by = match q.sort_by.as_deref() {
            Some("name") => "name",
            Some("email") => "email",
            Some("role") => "role",
            _ => "created_at",
        };
        let sort_order = match q.sort_order.as_deref() {
            Some("desc") => "DESC",
            _ => "ASC",
        };

        let mut clauses: Vec<String> = Vec::new();
        let mut bind: Vec<String> = Vec::new();

        if let Some(role) = &q.role {
            bind.push(role.clone());
            clauses.push(format!("role = ?{}", bind.len()));
        }
        if let Some(search) = &q.search {
            bind.push(format!("%{}%", search.to_lowercase()));
            let n = bind.len();
            clauses.push(format!("(LOWER(name) LIKE ?{n} OR LOWER(email) LIKE ?{n})"));
        }

        let where_sql = if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        };

        let conn = Connection::open(&self.db_path)?;

        let total: i64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM users{where_sql}"),
            params_from_iter(bind.iter()),
            |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users{where_sql}
             ORDER BY {sort_by} {sort_order} LIMIT {limit} OFFSET {offset}"
        ))?;

        let data = stmt
            .query_map(params_from_iter(bind.iter()), row_to_user)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserPage {
            total,
            page,
            pages: (total + limit - 1) / limit,
            limit,
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (UserStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let db_path = temp_file.path().to_str().unwrap();
        let store = UserStore::new(db_path).unwrap();
        (store, temp_file)
    }

    #[test]
    fn test_create_and_retrieve_user() {
        let (store, _temp) = create_test_store();

        let user = store
            .create("Aya", "aya@example.com", "passw0rd!", Role::User)
            .unwrap();
        assert_eq!(user.role, Role::User);

        let fetched = store.get_by_email("aya@example.com").unwrap().unwrap();
        assert_eq!(fetched.id, user.id);
        assert_eq!(fetched.name, "Aya");

        let by_id = store.get_by_id(&user.id).unwrap().unwrap();
        assert_eq!(by_id.email, "aya@example.com");
    }

    #[test]
    fn test_duplicate_email_rejected() {
        let (store, _temp) = create_test_store();

        store
            .create("A", "dup@example.com", "passw0rd!", Role::User)
            .unwrap();
        let second = store.create("B", "dup@example.com", "passw0rd!", Role::User);
        assert!(second.is_err());
    }

    #[test]
    fn test_password_verification() {
        let (store, _temp) = create_test_store();

        store
            .create("A", "a@example.com", "passw0rd!", Role::User)
            .unwrap();

        assert!(store.verify_password("a@example.com", "passw0rd!").unwrap());
        assert!(!store.verify_password("a@example.com", "wrong").unwrap());
        assert!(!store.verify_password("missing@example.com", "x").unwrap());
    }

    #[test]
    fn test_update_password() {
        let (store, _temp) = create_test_store();

        let user = store
            .create("A", "a@example.com", "passw0rd!", Role::User)
            .unwrap();

        assert!(store.update_password(&user.id, "newpass1!").unwrap());
        assert!(store.verify_password("a@example.com", "newpass1!").unwrap());
        assert!(!store.verify_password("a@example.com", "passw0rd!").unwrap());

        // Missing user
        assert!(!store.update_password(&Uuid::new_v4(), "x1!aaaaa").unwrap());
    }

    #[test]
    fn test_partial_profile_update() {
        let (store, _temp) = create_test_store();

        let user = store
            .create("Before", "p@example.com", "passw0rd!", Role::User)
            .unwrap();

        let upd = UpdateUserRequest {
            name: Some("After".to_string()),
            bio: Some("hello".to_string()),
            ..Default::default()
        };
        let updated = store.update_profile(&user.id, &upd).unwrap().unwrap();

        assert_eq!(updated.name, "After");
        assert_eq!(updated.bio.as_deref(), Some("hello"));
        // Untouched fields survive
        assert_eq!(updated.email, "p@example.com");
        assert_eq!(updated.role, Role::User);
    }

    #[test]
    fn test_delete_user() {
        let (store, _temp) = create_test_store();

        let user = store
            .create("A", "gone@example.com", "passw0rd!", Role::User)
            .unwrap();

        assert!(store.delete(&user.id).unwrap());
        assert!(store.get_by_id(&user.id).unwrap().is_none());
        assert!(!store.delete(&user.id).unwrap());
    }

    #[test]
    fn test_pagination_slices_and_page_count() {
        let (store, _temp) = create_test_store();

        for i in 0..25 {
            store
                .create(
                    &format!("User{i:02}"),
                    &format!("user{i:02}@example.com"),
                    "passw0rd!",
                    Role::User,
                )
                .unwrap();
        }

        let page = store
            .list_page(&UserPageQuery {
                page: Some(2),
                limit: Some(10),
                sort_by: Some("name".to_string()),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.pages, 3);
        assert_eq!(page.data.len(), 10);
        assert_eq!(page.data[0].name, "User10");
    }

    #[test]
    fn test_pagination_search_and_role_filter() {
        let (store, _temp) = create_test_store();

        store
            .create("Alice", "alice@example.com", "passw0rd!", Role::Admin)
            .unwrap();
        store
            .create("Bob", "bob@example.com", "passw0rd!", Role::User)
            .unwrap();

        let found = store
            .list_page(&UserPageQuery {
                search: Some("ALI".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(found.total, 1);
        assert_eq!(found.data[0].name, "Alice");

        let admins = store
            .list_page(&UserPageQuery {
                role: Some("Admin".to_string()),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(admins.total, 1);
        assert_eq!(admins.data[0].role, Role::Admin);
    }
}
