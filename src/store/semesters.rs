//! Semester & University Storage
//! Mission: Persist semesters with derived GPA and keep university
//! aggregates consistent when semesters disappear

use crate::aggregation::gpa;
use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

/// Letter grade attached to a course entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "AA")]
    Aa,
    #[serde(rename = "AB")]
    Ab,
    #[serde(rename = "BA")]
    Ba,
    #[serde(rename = "BB")]
    Bb,
    #[serde(rename = "CB")]
    Cb,
    #[serde(rename = "CC")]
    Cc,
    #[serde(rename = "DC")]
    Dc,
    #[serde(rename = "DD")]
    Dd,
    #[serde(rename = "FF")]
    Ff,
}

/// One course inside a semester.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CourseEntry {
    pub course_code: String,
    pub course_name: String,
    pub grade: f64,
    pub credits: f64,
    pub ects: f64,
    pub letter_grade: LetterGrade,
}

/// A semester owned by one user. `semester_gpa` is derived and recomputed
/// whenever the course list changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Semester {
    pub id: Uuid,
    pub semester_number: i64,
    pub courses: Vec<CourseEntry>,
    pub result_image: Option<String>,
    pub semester_gpa: f64,
    pub user_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct CreateSemesterRequest {
    pub semester_number: i64,
    #[serde(default)]
    pub courses: Vec<CourseEntry>,
    pub result_image: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateSemesterRequest {
    pub semester_number: Option<i64>,
    pub courses: Option<Vec<CourseEntry>>,
    pub result_image: Option<String>,
}

/// University aggregate summarizing member semesters into one GPA.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct University {
    pub id: Uuid,
    pub name: String,
    pub university_type: String,
    pub semesters: Vec<Uuid>,
    pub total_gpa: f64,
}

fn row_to_semester(row: &Row) -> rusqlite::Result<Semester> {
    let courses_json: String = row.get(2)?;
    Ok(Semester {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        semester_number: row.get(1)?,
        courses: serde_json::from_str(&courses_json).unwrap_or_default(),
        result_image: row.get(3)?,
        semester_gpa: row.get(4)?,
        user_id: Uuid::parse_str(&row.get::<_, String>(5)?).unwrap(),
    })
}

fn row_to_university(row: &Row) -> rusqlite::Result<University> {
    let semesters_json: String = row.get(3)?;
    let ids: Vec<String> = serde_json::from_str(&semesters_json).unwrap_or_default();
    Ok(University {
        id: Uuid::parse_str(&row.get::<_, String>(0)?).unwrap(),
        name: row.get(1)?,
        university_type: row.get(2)?,
        semesters: ids
            .iter()
            .filter_map(|s| Uuid::parse_str(s).ok())
            .collect(),
        total_gpa: row.get(4)?,
    })
}

/// SQLite-backed semester store.
pub struct SemesterStore {
    db_path: String,
}

impl SemesterStore {
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
            "CREATE TABLE IF NOT EXISTS semesters (
                id TEXT PRIMARY KEY,
                semester_number INTEGER NOT NULL,
                courses_json TEXT NOT NULL,
                result_image TEXT,
                semester_gpa REAL NOT NULL,
                user_id TEXT NOT NULL
            )",
            [],
        )?;

        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_semesters_user ON semesters(user_id)",
            [],
        )?;

        Ok(())
    }

    /// Create a semester; GPA is always computed server-side from the
    /// submitted course list.
    pub fn create(&self, user_id: &Uuid, req: &CreateSemesterRequest) -> Result<Semester> {
        let semester = Semester {
            id: Uuid::new_v4(),
            semester_number: req.semester_number,
            semester_gpa: gpa::weighted_gpa(&req.courses),
            courses: req.courses.clone(),
            result_image: req.result_image.clone(),
            user_id: *user_id,
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO semesters (id, semester_number, courses_json, result_image, semester_gpa, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                semester.id.to_string(),
                semester.semester_number,
                serde_json::to_string(&semester.courses)?,
                semester.result_image,
                semester.semester_gpa,
                semester.user_id.to_string(),
            ],
        )
        .context("Failed to insert semester")?;

        Ok(semester)
    }

    pub fn list(&self, user_id: &Uuid) -> Result<Vec<Semester>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, semester_number, courses_json, result_image, semester_gpa, user_id
             FROM semesters WHERE user_id = ?1 ORDER BY semester_number",
        )?;

        let semesters = stmt
            .query_map(params![user_id.to_string()], row_to_semester)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(semesters)
    }

    pub fn get(&self, id: &Uuid, user_id: &Uuid) -> Result<Option<Semester>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, semester_number, courses_json, result_image, semester_gpa, user_id
             FROM semesters WHERE id = ?1 AND user_id = ?2",
        )?;

        match stmt.query_row(params![id.to_string(), user_id.to_string()], row_to_semester) {
            Ok(semester) => Ok(Some(semester)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Unscoped lookup of a semester's stored GPA, used by the university
    /// cascade and when resolving aggregate members.
    pub fn gpa_of(&self, id: &Uuid) -> Result<Option<f64>> {
        let conn = Connection::open(&self.db_path)?;

        match conn.query_row(
            "SELECT semester_gpa FROM semesters WHERE id = ?1",
            params![id.to_string()],
            |row| row.get::<_, f64>(0),
        ) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Unscoped lookup used by the admin summary engine.
    pub fn get_any(&self, id: &Uuid) -> Result<Option<Semester>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, semester_number, courses_json, result_image, semester_gpa, user_id
             FROM semesters WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], row_to_semester) {
            Ok(semester) => Ok(Some(semester)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Partial update. A new course list triggers a GPA recompute.
    pub fn update(
        &self,
        id: &Uuid,
        user_id: &Uuid,
        upd: &UpdateSemesterRequest,
    ) -> Result<Option<Semester>> {
        let Some(mut semester) = self.get(id, user_id)? else {
            return Ok(None);
        };

        if let Some(courses) = &upd.courses {
            semester.semester_gpa = gpa::weighted_gpa(courses);
            semester.courses = courses.clone();
        }
        if let Some(number) = upd.semester_number {
            semester.semester_number = number;
        }
        if let Some(image) = &upd.result_image {
            semester.result_image = Some(image.clone());
        }

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE semesters SET semester_number = ?1, courses_json = ?2, result_image = ?3,
                semester_gpa = ?4 WHERE id = ?5",
            params![
                semester.semester_number,
                serde_json::to_string(&semester.courses)?,
                semester.result_image,
                semester.semester_gpa,
                id.to_string(),
            ],
        )
        .context("Failed to update semester")?;

        Ok(Some(semester))
    }

    fn delete_row(&self, id: &Uuid) -> Result<bool> {
        let conn = Connection::open(&self.db_path)?;
        let rows = conn.execute(
            "DELETE FROM semesters WHERE id = ?1",
            params![id.to_string()],
        )?;
        Ok(rows > 0)
    }

    pub fn count_for_user(&self, user_id: &Uuid) -> Result<i64> {
        let conn = Connection::open(&self.db_path)?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM semesters WHERE user_id = ?1",
            params![user_id.to_string()],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// SQLite-backed university aggregate store.
pub struct UniversityStore {
    db_path: String,
}

impl UniversityStore {
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
            "CREATE TABLE IF NOT EXISTS universities (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                university_type TEXT NOT NULL,
                semesters_json TEXT NOT NULL,
                total_gpa REAL NOT NULL
            )",
            [],
        )?;

        Ok(())
    }

    pub fn create(&self, name: &str, university_type: &str) -> Result<University> {
        let university = University {
            id: Uuid::new_v4(),
            name: name.to_string(),
            university_type: university_type.to_string(),
            semesters: Vec::new(),
            total_gpa: 0.0,
        };

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "INSERT INTO universities (id, name, university_type, semesters_json, total_gpa)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                university.id.to_string(),
                university.name,
                university.university_type,
                "[]",
                university.total_gpa,
            ],
        )
        .context("Failed to insert university")?;

        Ok(university)
    }

    pub fn get(&self, id: &Uuid) -> Result<Option<University>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, university_type, semesters_json, total_gpa
             FROM universities WHERE id = ?1",
        )?;

        match stmt.query_row(params![id.to_string()], row_to_university) {
            Ok(u) => Ok(Some(u)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn list_all(&self) -> Result<Vec<University>> {
        let conn = Connection::open(&self.db_path)?;

        let mut stmt = conn.prepare(
            "SELECT id, name, university_type, semesters_json, total_gpa
             FROM universities ORDER BY name",
        )?;

        let universities = stmt
            .query_map([], row_to_university)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(universities)
    }

    /// Every university whose member list contains the given semester.
    /// Aggregates are small; a scan matches the access pattern.
    pub fn find_referencing(&self, semester_id: &Uuid) -> Result<Vec<University>> {
        let all = self.list_all()?;
        Ok(all
            .into_iter()
            .filter(|u| u.semesters.contains(semester_id))
            .collect())
    }

    /// Replace a university's member list and derived GPA in one UPDATE so
    /// the reference removal and the recompute land together.
    pub fn set_membership(&self, id: &Uuid, semesters: &[Uuid], total_gpa: f64) -> Result<()> {
        let ids: Vec<String> = semesters.iter().map(|s| s.to_string()).collect();

        let conn = Connection::open(&self.db_path)?;
        conn.execute(
            "UPDATE universities SET semesters_json = ?1, total_gpa = ?2 WHERE id = ?3",
            params![serde_json::to_string(&ids)?, total_gpa, id.to_string()],
        )
        .context("Failed to update university membership")?;

        Ok(())
    }
}

/// Link a semester into a university aggregate and recompute its GPA.
pub fn attach_semester(
    semesters: &SemesterStore,
    universities: &UniversityStore,
    university_id: &Uuid,
    semester_id: &Uuid,
) -> Result<bool> {
    let Some(university) = universities.get(university_id)? else {
        return Ok(false);
    };
    if semesters.gpa_of(semester_id)?.is_none() {
        return Ok(false);
    }

    let mut members = university.semesters.clone();
    if !members.contains(semester_id) {
        members.push(*semester_id);
    }

    let total_gpa = membership_gpa(semesters, &members)?;
    universities.set_membership(university_id, &members, total_gpa)?;

    Ok(true)
}

/// Delete a semester and cascade through every university aggregate that
/// references it: drop the reference and recompute the mean GPA, one
/// aggregate at a time. The first failing aggregate aborts the rest.
pub fn delete_semester(
    semesters: &SemesterStore,
    universities: &UniversityStore,
    id: &Uuid,
    user_id: &Uuid,
) -> Result<bool> {
    if semesters.get(id, user_id)?.is_none() {
        return Ok(false);
    }

    for university in universities.find_referencing(id)? {
        let remaining: Vec<Uuid> = university
            .semesters
            .iter()
            .copied()
            .filter(|s| s != id)
            .collect();

        let total_gpa = membership_gpa(semesters, &remaining)
            .with_context(|| format!("Recompute failed for university {}", university.id))?;

        universities.set_membership(&university.id, &remaining, total_gpa)?;

        info!(
            "🎓 University {} GPA recomputed after semester removal: {:.2}",
            university.id, total_gpa
        );
    }

    semesters.delete_row(id)
}

fn membership_gpa(semesters: &SemesterStore, members: &[Uuid]) -> Result<f64> {
    let mut gpas = Vec::with_capacity(members.len());
    for member in members {
        let value = semesters
            .gpa_of(member)?
            .with_context(|| format!("Referenced semester {member} does not exist"))?;
        gpas.push(value);
    }
    Ok(gpa::mean(&gpas))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn stores() -> (SemesterStore, UniversityStore, NamedTempFile) {
        let temp_file = NamedTempFile::new().unwrap();
        let path = temp_file.path().to_str().unwrap();
        (
            SemesterStore::new(path).unwrap(),
            UniversityStore::new(path).unwrap(),
            temp_file,
        )
    }

    fn course(grade: f64, credits: f64) -> CourseEntry {
        CourseEntry {
            course_code: "CS101".to_string(),
            course_name: "Intro".to_string(),
            grade,
            credits,
            ects: credits,
            letter_grade: LetterGrade::Bb,
        }
    }

    fn semester_with(
        store: &SemesterStore,
        user: &Uuid,
        number: i64,
        courses: Vec<CourseEntry>,
    ) -> Semester {
        store
            .create(
                user,
                &CreateSemesterRequest {
                    semester_number: number,
                    courses,
                    result_image: None,
                },
            )
            .unwrap()
    }

    #[test]
    fn test_gpa_computed_on_create() {
        let (semesters, _unis, _temp) = stores();
        let user = Uuid::new_v4();

        let sem = semester_with(
            &semesters,
            &user,
            1,
            vec![course(4.0, 3.0), course(2.0, 1.0)],
        );
        // (4*3 + 2*1) / 4 = 3.5
        assert!((sem.semester_gpa - 3.5).abs() < 1e-9);

        let empty = semester_with(&semesters, &user, 2, vec![]);
        assert_eq!(empty.semester_gpa, 0.0);
    }

    #[test]
    fn test_gpa_recomputed_on_course_change() {
        let (semesters, _unis, _temp) = stores();
        let user = Uuid::new_v4();

        let sem = semester_with(&semesters, &user, 1, vec![course(3.0, 2.0)]);
        assert!((sem.semester_gpa - 3.0).abs() < 1e-9);

        let updated = semesters
            .update(
                &sem.id,
                &user,
                &UpdateSemesterRequest {
                    courses: Some(vec![course(4.0, 2.0), course(1.0, 2.0)]),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert!((updated.semester_gpa - 2.5).abs() < 1e-9);

        // Updating something else leaves GPA alone.
        let renumbered = semesters
            .update(
                &sem.id,
                &user,
                &UpdateSemesterRequest {
                    semester_number: Some(9),
                    ..Default::default()
                },
            )
            .unwrap()
            .unwrap();
        assert!((renumbered.semester_gpa - 2.5).abs() < 1e-9);
        assert_eq!(renumbered.semester_number, 9);
    }

    #[test]
    fn test_ownership_scoping() {
        let (semesters, unis, _temp) = stores();
        let owner = Uuid::new_v4();
        let intruder = Uuid::new_v4();

        let sem = semester_with(&semesters, &owner, 1, vec![course(3.0, 3.0)]);

        assert!(semesters.get(&sem.id, &intruder).unwrap().is_none());
        assert!(!delete_semester(&semesters, &unis, &sem.id, &intruder).unwrap());
        assert!(semesters.get(&sem.id, &owner).unwrap().is_some());
    }

    #[test]
    fn test_delete_cascades_to_university_gpa() {
        let (semesters, unis, _temp) = stores();
        let user = Uuid::new_v4();

        let s1 = semester_with(&semesters, &user, 1, vec![course(4.0, 3.0)]); // GPA 4.0
        let s2 = semester_with(&semesters, &user, 2, vec![course(2.0, 3.0)]); // GPA 2.0

        let uni = unis.create("METU", "State").unwrap();
        assert!(attach_semester(&semesters, &unis, &uni.id, &s1.id).unwrap());
        assert!(attach_semester(&semesters, &unis, &uni.id, &s2.id).unwrap());

        let loaded = unis.get(&uni.id).unwrap().unwrap();
        assert!((loaded.total_gpa - 3.0).abs() < 1e-9);

        assert!(delete_semester(&semesters, &unis, &s1.id, &user).unwrap());

        let after = unis.get(&uni.id).unwrap().unwrap();
        assert!(!after.semesters.contains(&s1.id));
        assert_eq!(after.semesters, vec![s2.id]);
        assert!((after.total_gpa - 2.0).abs() < 1e-9);

        assert!(semesters.get(&s1.id, &user).unwrap().is_none());
    }

    #[test]
    fn test_delete_last_member_zeroes_aggregate() {
        let (semesters, unis, _temp) = stores();
        let user = Uuid::new_v4();

        let s1 = semester_with(&semesters, &user, 1, vec![course(3.5, 3.0)]);
        let uni = unis.create("Bilkent", "Private").unwrap();
        attach_semester(&semesters, &unis, &uni.id, &s1.id).unwrap();

        delete_semester(&semesters, &unis, &s1.id, &user).unwrap();

        let after = unis.get(&uni.id).unwrap().unwrap();
        assert!(after.semesters.is_empty());
        assert_eq!(after.total_gpa, 0.0);
    }

    #[test]
    fn test_cascade_touches_every_referencing_university() {
        let (semesters, unis, _temp) = stores();
        let user = Uuid::new_v4();

        let shared = semester_with(&semesters, &user, 1, vec![course(4.0, 2.0)]);
        let other = semester_with(&semesters, &user, 2, vec![course(2.0, 2.0)]);

        let uni_a = unis.create("A", "State").unwrap();
        let uni_b = unis.create("B", "State").unwrap();
        attach_semester(&semesters, &unis, &uni_a.id, &shared.id).unwrap();
        attach_semester(&semesters, &unis, &uni_b.id, &shared.id).unwrap();
        attach_semester(&semesters, &unis, &uni_b.id, &other.id).unwrap();

        delete_semester(&semesters, &unis, &shared.id, &user).unwrap();

        let a = unis.get(&uni_a.id).unwrap().unwrap();
        let b = unis.get(&uni_b.id).unwrap().unwrap();
        assert!(a.semesters.is_empty());
        assert_eq!(a.total_gpa, 0.0);
        assert_eq!(b.semesters, vec![other.id]);
        assert!((b.total_gpa - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_cascade_aborts_on_dangling_member() {
        let (semesters, unis, _temp) = stores();
        let user = Uuid::new_v4();

        let victim = semester_with(&semesters, &user, 1, vec![course(4.0, 2.0)]);
        let uni = unis.create("Ghost U", "State").unwrap();
        attach_semester(&semesters, &unis, &uni.id, &victim.id).unwrap();

        // Sneak a dangling reference into the aggregate.
        let dangling = Uuid::new_v4();
        unis.set_membership(&uni.id, &[victim.id, dangling], 4.0)
            .unwrap();

        let result = delete_semester(&semesters, &unis, &victim.id, &user);
        assert!(result.is_err());
        // The semester itself is untouched because the cascade aborted first.
        assert!(semesters.get(&victim.id, &user).unwrap().is_some());
    }
}
