//! Scholarship Student Storage
//! Mission: One-to-one scholarship profiles with owner scoping

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Scholarship study profile, at most one per user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScholarshipStudent {
    pub id: Uuid,
    pub user_id: Uuid,
    pub country_of_studying: String,
    pub city: String,
    pub university: String,
    pub type_of_university: String,
    pub program_of_study: String,
    pub student_university_id: String,
    pub enrollment_year: i64,
    pub expected_graduation_year: i64,
}

/// All fields required at creation.
#[derive(Debug, Deserialize)]
pub struct CreateScholarshipRequest {
    pub country_of_studying: String,
    pub city: String,
    pub university: String,
    pub type_of_university: String,
    pub program_of_study: String,
    pub student_university_id: String,
    pub enrollment_year: i64,
    pub expected_graduation_year: i64,
}

/// Partial update.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateScholarshipRequest {
    pub country_of_studying: Option<String>,
    pub city: Option<String>,
    pub university: Option<String>,
    pub type_of_university: Option<String>,
    pub program_of_study: Option<String>,
    pub student_university_id: Option<String>,
    pub enrollment_year: Option<i64>,
    pub expected_graduation_year: Option<i64>,
}

fn row_to_student(row: &Row) -> rusqlite::Result<ScholarshipStudent> {
    Ok(ScholarshipStudent {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        user_id: Uuid::parse_str(&row.get::<_, String>(1)?).unwrap(),
        country_of_studying: row.get(2)?,
        city: row.get(3)?,
        university: row.get(4)?,
        type_of_university: row.get(5)?,
        program_of_study: row.get(6)?,
        student_university_id: row.get(7)?,
        enrollment_year: row.get(8)?,
        expected_graduation_year: row.get(9)?,
    })
}

const COLUMNS: &str = "id, user_id, country_of_studying, city, university, type_of_university, \
     program_of_study, student_university_id, enrollment_year, expected_graduation_year";

pub struct ScholarshipStore {
    db_path: String,
}

impl ScholarshipStore {
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
            "CREATE TABLE IF NOT EXISTS scholarship_students (
                id TEXT PRIMARY KEY,
                user_id TEXT UNIQUE NOT NULL,
                country_of_studying TEXT NOT NULL,
                city TEXT NOT NULL,
                university TEXT NOT NULL,
                type_of_university TEXT NOT NULL,
                program_of_study TEXT NOT NULL,
                student_university_id TEXT NOT NULL,
                enrollment_year INTEGER NOT NULL,
                expected_graduation_year INTEGER NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    /// Insert a profile. Callers must check `get_by_user` first; the UNIQUE
    /// constraint is the backstop for the one-per-user invariant.
    pub fn create(
        &self,
        user_id: &Uuid,
        req: &CreateScholarshipRequest,
    ) -> Result<ScholarshipStudent> {
        let student = ScholarshipStudent {
            id: Uuid::new_v4(),
            user_id: *user_id,
            country_of_studying: req.country_of_studying.clone(),
            city: req.city.clone(),
            university: req.university.clone(),
            type_of_university: req.type_of_university.clone(),
            program_of_study: req.program_of_study.clone(),
            student_university_id: req.student_university_id.clone(),
            enrollment_year: req.enrollment_year,
            expected_graduation_year: req.expected_graduation_year,
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO scholarship_students
                (id, user_id, country_of_studying, city, university, type_of_university,
                 program_of_study, student_university_id, enrollment_year, expected_graduation_year)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                student.id.to_string(),
                student.user_id.to_string(),
                student.country_of_studying,
                student.city,
                student.university,
                student.type_of_university,
                student.program_of_study,
                student.student_university_id,
                student.enrollment_year,
                student.expected_graduation_year,
            ],
        )
        .context("Failed to insert scholarship student")?;

        Ok(student)
    }

    pub fn get_by_user(&self, user_id: &Uuid) -> Result<Option<ScholarshipStudent>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM scholarship_students WHERE user_id = ?1"
        ))?;

        match stmt.query_row(params![user_id.to_string()], row_to_student) {
            Ok(student) => Ok(Some(student)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list(&self, user_id: &Uuid) -> Result<Vec<ScholarshipStudent>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM scholarship_students WHERE user_id = ?1"
        ))?;

        let students = stmt
            .query_map(params![user_id.to_string()], row_to_student)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(students)
    }

    pub fn get(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<ScholarshipStudent>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM scholarship_students WHERE id = ?1 AND user_id = ?2"
        ))?;

        match stmt.query_row(params![id.to_string(), user_id.to_string()], row_to_student) {
            Ok(student) => Ok(Some(student)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn update(
        &self,
        id: &Uuid,
        user_id: &Uuid,
        upd: &UpdateScholarshipRequest,
    ) -> Result<Option<ScholarshipStudent>> {
        let Some(mut student) = self.get(id, user_id)? else {
            return Ok(None);
        };

        if let Some(v) = &upd.country_of_studying {
            student.country_of_studying = v.clone();
        }
        if let Some(v) = &upd.city {
            student.city = v.clone();
        }
        if let Some(v) = &upd.university {
            student.university = v.clone();
        }
        if let Some(v) = &upd.type_of_university {
            student.type_of_university = v.clone();
        }
        if let Some(v) = &upd.program_of_study {
            student.program_of_study = v.clone();
        }
        if let Some(v) = &upd.student_university_id {
            student.student_university_id = v.clone();
        }
        if let Some(v) = upd.enrollment_year {
            student.enrollment_year = v;
        }
        if let Some(v) = upd.expected_graduation_year {
            student.expected_graduation_year = v;
        }

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE scholarship_students SET country_of_studying = ?1, city = ?2, university = ?3,
                type_of_university = ?4, program_of_study = ?5, student_university_id = ?6,
                enrollment_year = ?7, expected_graduation_year = ?8
             WHERE id = ?9",
            params![
                student.country_of_studying,
                student.city,
                student.university,
                student.type_of_university,
                student.program_of_study,
                student.student_university_id,
                student.enrollment_year,
                student.expected_graduation_year,
                id.to_string(),
            ],
        )
        .context("Failed to update scholarship student")?;

        Ok(Some(student))
    }

    pub fn delete(&self, id: &Uuid, user_id: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;

        let rows = conn.execute(
            "DELETE FROM scholarship_students WHERE id = ?1 AND user_id = ?2",
            params![id.to_string(), user_id.to_string()],
        )?;

        Ok(rows > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn create_test_store() -> (ScholarshipStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let store = ScholarshipStore::new(temp_file.path().to_str().unwrap()).unwrap();
        (store, temp_file)
    }

    fn create_req() -> CreateScholarshipRequest {
        CreateScholarshipRequest {
            country_of_studying: "Turkey".to_string(),
            city: "Ankara".to_string(),
            university: "METU".to_string(),
            type_of_university: "State".to_string(),
            program_of_study: "CS".to_string(),
            student_university_id: "e123456".to_string(),
            enrollment_year: 2021,
            expected_graduation_year: 2025,
        }
    }

    #[test]
    fn test_one_profile_per_user() {
        let (store, _temp) = create_test_store();
        let user = Uuid::new_v4();

        let first = store.create(&user, &create_req()).unwrap();
        assert!(store.get_by_user(&user).unwrap().is_some());

        // Second insert trips the UNIQUE constraint.
        assert!(store.create(&user, &create_req()).is_err());

        // Existing record unchanged.
        let still = store.get_by_user(&user).unwrap().unwrap();
        assert_eq!(still.id, first.id);
        assert_eq!(still.university, "METU");
    }

    #[test]
    fn test_partial_update_and_ownership() {
        let (store, _temp) = create_test_store();
        let user = Uuid::new_v4();
        let intruder = Uuid::new_v4();

        let student = store.create(&user, &create_req()).unwrap();

        let updated = store
            .update(
                &student.id,
                &user,
                &UpdateScholarshipRequest {
                    city: Some("Istanbul".to_string()),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert_eq!(updated.city, "Istanbul");
        assert_eq!(updated.program_of_study, "CS");

        assert!(store.get(&student.id, &intruder).unwrap().is_none());
        assert!(!store.delete(&student.id, &intruder).unwrap());
        assert!(store.delete(&student.id, &user).unwrap());
    }
}
