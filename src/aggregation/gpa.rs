//! GPA Arithmetic
//! Mission: Credit-weighted semester GPA and aggregate means

use crate::store::semesters::CourseEntry;

/// Credit-weighted grade average: (Σ credits·grade) / (Σ credits).
/// Zero total credits yields 0.
pub fn weighted_gpa(courses: &[CourseEntry]) -> f64 {
    let total_credits: f64 = courses.iter().map(|c| c.credits).sum();
    if total_credits == 0.0 {
        return 0.0;
    }

    let total_points: f64 = courses.iter().map(|c| c.credits * c.grade).sum();
    total_points / total_credits
}

/// Arithmetic mean, 0 for an empty slice.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::semesters::LetterGrade;

    fn course(grade: f64, credits: f64) -> CourseEntry {
        CourseEntry {
            course_code: "X".to_string(),
            course_name: "X".to_string(),
            grade,
            credits,
            ects: credits,
            letter_grade: LetterGrade::Cc,
        }
    }

    #[test]
    fn test_empty_course_list_is_zero() {
        assert_eq!(weighted_gpa(&[]), 0.0);
    }

    #[test]
    fn test_zero_credit_courses_are_zero() {
        let courses = vec![course(4.0, 0.0), course(3.0, 0.0)];
        assert_eq!(weighted_gpa(&courses), 0.0);
    }

    #[test]
    fn test_weighting_by_credits() {
        let courses = vec![course(4.0, 3.0), course(2.0, 1.0)];
        assert!((weighted_gpa(&courses) - 3.5).abs() < 1e-9);

        // Equal credits degenerate to the plain average.
        let equal = vec![course(4.0, 2.0), course(2.0, 2.0)];
        assert!((weighted_gpa(&equal) - 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_gpa_stable_under_course_edits() {
        // Adding then removing a course restores the original GPA.
        let mut courses = vec![course(3.0, 3.0), course(4.0, 2.0)];
        let before = weighted_gpa(&courses);

        courses.push(course(1.0, 4.0));
        assert!((weighted_gpa(&courses) - before).abs() > 1e-9);

        courses.pop();
        assert!((weighted_gpa(&courses) - before).abs() < 1e-9);
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), 0.0);
        assert!((mean(&[2.0, 4.0]) - 3.0).abs() < 1e-9);
        assert!((mean(&[1.5]) - 1.5).abs() < 1e-9);
    }
}
