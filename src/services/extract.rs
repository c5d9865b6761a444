use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::models::{Course, RecommendedCourse};

static COURSE_REFERENCE: OnceLock<Regex> = OnceLock::new();

/// Uppercase letters, digits, then a colon: "CS101:". An optional single space between
/// the letters and digits is tolerated and removed on normalization.
fn course_reference_pattern() -> &'static Regex {
    COURSE_REFERENCE
        .get_or_init(|| Regex::new(r"[A-Z]+ ?[0-9]+:").expect("Invalid course reference regex"))
}

fn normalize(code: &str) -> String {
    code.chars()
        .filter(|c| !c.is_whitespace() && *c != ':')
        .collect()
}

/// Candidate course codes in order of first appearance, deduplicated.
///
/// Best effort only: any "WORD123:" is a candidate and codes written another way are missed.
pub fn extract_course_codes(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    course_reference_pattern()
        .find_iter(text)
        .map(|m| normalize(m.as_str()))
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

/// Resolves the codes mentioned in `text` against `catalog`; unknown codes are dropped.
/// Returns `None` when nothing resolves.
pub fn resolve_course_references(text: &str, catalog: &[Course]) -> Option<Vec<RecommendedCourse>> {
    let courses: Vec<RecommendedCourse> = extract_course_codes(text)
        .iter()
        .filter_map(|code| catalog.iter().find(|c| normalize(&c.code) == *code))
        .map(Course::summary)
        .collect();

    if courses.is_empty() { None } else { Some(courses) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CourseLevel;

    fn course(code: &str, name: &str) -> Course {
        Course {
            code: code.to_string(),
            name: name.to_string(),
            description: format!("{} description", name),
            credits: 3,
            prerequisites: vec![],
            department: "Computer Science".to_string(),
            level: CourseLevel::Intermediate,
            terms: vec!["Fall".to_string()],
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn test_extract_in_order_without_duplicates() {
        let text = "Start with CS201: Data Structures, then CS101: intro.\nCS201: again. ECON 101: econ.";
        assert_eq!(extract_course_codes(text), vec!["CS201", "CS101", "ECON101"]);
    }

    #[test]
    fn test_extract_ignores_codes_without_colon() {
        assert!(extract_course_codes("Take CS101 and cs201: later").is_empty());
    }

    #[test]
    fn test_unknown_codes_are_dropped() {
        let catalog = vec![course("CS101", "Introduction to Computer Science")];
        let reply = "CS101: great intro\nCS999: unknown";

        let resolved = resolve_course_references(reply, &catalog).expect("one match");
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].code, "CS101");
        assert_eq!(resolved[0].name, "Introduction to Computer Science");
    }

    #[test]
    fn test_no_matches_yields_none() {
        let catalog = vec![course("CS101", "Introduction to Computer Science")];
        assert_eq!(resolve_course_references("Consider a writing seminar.", &catalog), None);
        assert_eq!(resolve_course_references("NOTE: CS999: nothing", &catalog), None);
    }
}
