//! Per-Category Summaries
//! Mission: Join users to their owned records for admin reporting views

use crate::auth::models::User;
use crate::auth::UserStore;
use crate::store::records::{RecordKind, RecordStore};
use crate::store::reports::{resolve_report, ReportStore};
use crate::store::semesters::{Semester, SemesterStore, UniversityStore};
use crate::store::tickets::TicketStore;
use anyhow::Result;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use uuid::Uuid;

/// The categories the admin summary endpoint understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryCategory {
    Courses,
    Certificates,
    Difficulties,
    Events,
    FinancialReports,
    Semesters,
    Reports,
    Tickets,
    Achievements,
}

impl SummaryCategory {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "courses" => Some(SummaryCategory::Courses),
            "certificates" => Some(SummaryCategory::Certificates),
            "difficulties" => Some(SummaryCategory::Difficulties),
            "events" => Some(SummaryCategory::Events),
            "financialReports" => Some(SummaryCategory::FinancialReports),
            "semesters" => Some(SummaryCategory::Semesters),
            "reports" => Some(SummaryCategory::Reports),
            "tickets" => Some(SummaryCategory::Tickets),
            "achievements" => Some(SummaryCategory::Achievements),
            _ => None,
        }
    }

    fn record_kind(self) -> Option<RecordKind> {
        match self {
            SummaryCategory::Courses => Some(RecordKind::Course),
            SummaryCategory::Certificates => Some(RecordKind::Certificate),
            SummaryCategory::Difficulties => Some(RecordKind::Difficulty),
            SummaryCategory::Events => Some(RecordKind::Event),
            SummaryCategory::FinancialReports => Some(RecordKind::FinancialReport),
            SummaryCategory::Achievements => Some(RecordKind::Achievement),
            SummaryCategory::Semesters | SummaryCategory::Reports | SummaryCategory::Tickets => {
                None
            }
        }
    }
}

/// Per-user record counts shown on the profile page.
#[derive(Debug, Serialize)]
pub struct ProfileStatistics {
    pub certificates: i64,
    pub courses: i64,
    pub events: i64,
    pub achievements: i64,
    #[serde(rename = "financialReports")]
    pub financial_reports: i64,
    pub notes: i64,
    pub semesters: i64,
    pub tickets: i64,
    #[serde(rename = "studentReports")]
    pub student_reports: i64,
}

pub fn profile_statistics(
    user_id: &Uuid,
    records: &RecordStore,
    semesters: &SemesterStore,
    tickets: &TicketStore,
    reports: &ReportStore,
) -> Result<ProfileStatistics> {
    Ok(ProfileStatistics {
        certificates: records.count_for_user(RecordKind::Certificate, user_id)?,
        courses: records.count_for_user(RecordKind::Course, user_id)?,
        events: records.count_for_user(RecordKind::Event, user_id)?,
        achievements: records.count_for_user(RecordKind::Achievement, user_id)?,
        financial_reports: records.count_for_user(RecordKind::FinancialReport, user_id)?,
        notes: records.count_for_user(RecordKind::Note, user_id)?,
        semesters: semesters.count_for_user(user_id)?,
        tickets: tickets.count_for_user(user_id)?,
        student_reports: reports.count_for_user(user_id)?,
    })
}

/// Group users by role with a sanitized member list, for the admin stats
/// endpoint.
pub fn role_statistics(users: &[User]) -> BTreeMap<String, Value> {
    let mut groups: BTreeMap<String, Vec<Value>> = BTreeMap::new();

    for user in users {
        groups
            .entry(user.role.as_str().to_string())
            .or_default()
            .push(json!({
                "name": user.name,
                "email": user.email,
                "createdAt": user.created_at,
            }));
    }

    groups
        .into_iter()
        .map(|(role, members)| {
            let value = json!({ "count": members.len(), "users": members });
            (role, value)
        })
        .collect()
}

/// Join every user (or university, for the semesters category) to their
/// owned records of the requested category, attaching records and a count.
pub fn users_summary(
    category: SummaryCategory,
    users: &UserStore,
    records: &RecordStore,
    reports: &ReportStore,
    tickets: &TicketStore,
    semesters: &SemesterStore,
    universities: &UniversityStore,
) -> Result<Value> {
    if category == SummaryCategory::Semesters {
        return university_semester_summary(semesters, universities);
    }

    let mut result = Vec::new();

    for user in users.list_all()? {
        let entry = match category {
            SummaryCategory::Reports => {
                let resolved = reports
                    .list(&user.id)?
                    .into_iter()
                    .map(|r| resolve_report(r, records))
                    .collect::<Result<Vec<_>>>()?;
                let count = resolved.len();
                json!({
                    "id": user.id,
                    "name": user.name,
                    "email": user.email,
                    "reports": resolved,
                    "count": count,
                })
            }
            SummaryCategory::Tickets => {
                let owned = tickets.list(&user.id)?;
                let count = owned.len();
                json!({
                    "id": user.id,
                    "name": user.name,
                    "email": user.email,
                    "tickets": owned,
                    "count": count,
                })
            }
            other => match other.record_kind() {
                Some(kind) => {
                    let owned = records.list(kind, &user.id)?;
                    let count = owned.len();
                    json!({
                        "id": user.id,
                        "name": user.name,
                        "email": user.email,
                        "records": owned,
                        "count": count,
                    })
                }
                None => continue,
            },
        };
        result.push(entry);
    }

    Ok(Value::Array(result))
}

fn university_semester_summary(
    semesters: &SemesterStore,
    universities: &UniversityStore,
) -> Result<Value> {
    let mut result = Vec::new();

    for university in universities.list_all()? {
        let mut members: Vec<Semester> = Vec::new();
        for id in &university.semesters {
            // Dangling references are skipped rather than failing the view.
            if let Some(semester) = semesters.get_any(id)? {
                members.push(semester);
            }
        }

        let count = members.len();
        result.push(json!({
            "id": university.id,
            "name": university.name,
            "universityType": university.university_type,
            "totalGpa": university.total_gpa,
            "semesters": members,
            "count": count,
        }));
    }

    Ok(Value::Array(result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::models::Role;
    use crate::store::records::CreateRecordRequest;
    use crate::store::reports::CreateReportRequest;
    use crate::store::semesters::{attach_semester, CourseEntry, CreateSemesterRequest, LetterGrade};
    use crate::store::tickets::CreateTicketRequest;
    use tempfile::NamedTempFile;

    struct Fixture {
        users: UserStore,
        records: RecordStore,
        reports: ReportStore,
        tickets: TicketStore,
        semesters: SemesterStore,
        universities: UniversityStore,
        _temp: NamedTempFile,
    }

    fn fixture() -> Fixture {
        let temp = NamedTempFile::new().unwrap();
        let path = temp.path().to_str().unwrap();
        Fixture {
            users: UserStore::new(path).unwrap(),
            records: RecordStore::new(path).unwrap(),
            reports: ReportStore::new(path).unwrap(),
            tickets: TicketStore::new(path).unwrap(),
            semesters: SemesterStore::new(path).unwrap(),
            universities: UniversityStore::new(path).unwrap(),
            _temp: temp,
        }
    }

    #[test]
    fn test_category_parsing() {
        assert_eq!(
            SummaryCategory::from_str("financialReports"),
            Some(SummaryCategory::FinancialReports)
        );
        assert_eq!(SummaryCategory::from_str("tickets"), Some(SummaryCategory::Tickets));
        assert_eq!(SummaryCategory::from_str("bogus"), None);
    }

    #[test]
    fn test_record_category_counts_per_user() {
        let f = fixture();

        let alice = f
            .users
            .create("Alice", "alice@example.com", "passw0rd!", Role::User)
            .unwrap();
        f.users
            .create("Bob", "bob@example.com", "passw0rd!", Role::User)
            .unwrap();

        for title in ["C1", "C2"] {
            f.records
                .create(
                    RecordKind::Course,
                    &alice.id,
                    &CreateRecordRequest {
                        title: title.to_string(),
                        description: "d".to_string(),
                        image_url: None,
                    },
                )
                .unwrap();
        }

        let value = users_summary(
            SummaryCategory::Courses,
            &f.users,
            &f.records,
            &f.reports,
            &f.tickets,
            &f.semesters,
            &f.universities,
        )
        .unwrap();

        let entries = value.as_array().unwrap();
        assert_eq!(entries.len(), 2);

        let alice_entry = entries
            .iter()
            .find(|e| e["email"] == "alice@example.com")
            .unwrap();
        assert_eq!(alice_entry["count"], 2);

        let bob_entry = entries
            .iter()
            .find(|e| e["email"] == "bob@example.com")
            .unwrap();
        assert_eq!(bob_entry["count"], 0);
    }

    #[test]
    fn test_reports_category_resolves_soft_keys() {
        let f = fixture();

        let user = f
            .users
            .create("A", "a@example.com", "passw0rd!", Role::User)
            .unwrap();

        let course = f
            .records
            .create(
                RecordKind::Course,
                &user.id,
                &CreateRecordRequest {
                    title: "Algo".to_string(),
                    description: "d".to_string(),
                    image_url: None,
                },
            )
            .unwrap();

        f.reports
            .create(
                &user.id,
                &CreateReportRequest {
                    title: "Week".to_string(),
                    course_id: Some(course.id),
                    note_id: None,
                    difficulty_id: None,
                    achievement_id: None,
                    event_id: None,
                    certificate_id: None,
                    date_of_report: None,
                },
            )
            .unwrap();

        let value = users_summary(
            SummaryCategory::Reports,
            &f.users,
            &f.records,
            &f.reports,
            &f.tickets,
            &f.semesters,
            &f.universities,
        )
        .unwrap();

        let entry = &value.as_array().unwrap()[0];
        assert_eq!(entry["count"], 1);
        assert_eq!(entry["reports"][0]["course"]["title"], "Algo");
        assert!(entry["reports"][0]["note"].is_null());
    }

    #[test]
    fn test_semesters_category_joins_universities() {
        let f = fixture();
        let user = Uuid::new_v4();

        let sem = f
            .semesters
            .create(
                &user,
                &CreateSemesterRequest {
                    semester_number: 1,
                    courses: vec![CourseEntry {
                        course_code: "CS".to_string(),
                        course_name: "Intro".to_string(),
                        grade: 4.0,
                        credits: 3.0,
                        ects: 5.0,
                        letter_grade: LetterGrade::Aa,
                    }],
                    result_image: None,
                },
            )
            .unwrap();

        let uni = f.universities.create("METU", "State").unwrap();
        attach_semester(&f.semesters, &f.universities, &uni.id, &sem.id).unwrap();

        let value = users_summary(
            SummaryCategory::Semesters,
            &f.users,
            &f.records,
            &f.reports,
            &f.tickets,
            &f.semesters,
            &f.universities,
        )
        .unwrap();

        let entry = &value.as_array().unwrap()[0];
        assert_eq!(entry["name"], "METU");
        assert_eq!(entry["count"], 1);
        assert!((entry["totalGpa"].as_f64().unwrap() - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_profile_statistics_counts() {
        let f = fixture();
        let user = Uuid::new_v4();

        f.records
            .create(
                RecordKind::Note,
                &user,
                &CreateRecordRequest {
                    title: "n".to_string(),
                    description: "d".to_string(),
                    image_url: None,
                },
            )
            .unwrap();
        f.tickets
            .create(
                &user,
                &CreateTicketRequest {
                    title: "t".to_string(),
                    description: "d".to_string(),
                    assigned_to: None,
                },
            )
            .unwrap();

        let stats =
            profile_statistics(&user, &f.records, &f.semesters, &f.tickets, &f.reports).unwrap();
        assert_eq!(stats.notes, 1);
        assert_eq!(stats.tickets, 1);
        assert_eq!(stats.courses, 0);
        assert_eq!(stats.semesters, 0);
    }

    #[test]
    fn test_role_statistics_groups() {
        let f = fixture();
        f.users
            .create("A", "a@example.com", "passw0rd!", Role::Admin)
            .unwrap();
        f.users
            .create("B", "b@example.com", "passw0rd!", Role::User)
            .unwrap();
        f.users
            .create("C", "c@example.com", "passw0rd!", Role::User)
            .unwrap();

        let stats = role_statistics(&f.users.list_all().unwrap());
        assert_eq!(stats["Admin"]["count"], 1);
        assert_eq!(stats["User"]["count"], 2);
        assert!(stats.get("Employee").is_none());
    }
}
