use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::RecommendedCourse;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "PascalCase")]
pub enum CourseLevel {
    Introductory,
    #[default]
    Intermediate,
    Advanced,
    Graduate,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Introductory => "Introductory",
            CourseLevel::Intermediate => "Intermediate",
            CourseLevel::Advanced => "Advanced",
            CourseLevel::Graduate => "Graduate",
        }
    }
}

impl fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CourseLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "introductory" => Ok(CourseLevel::Introductory),
            "intermediate" => Ok(CourseLevel::Intermediate),
            "advanced" => Ok(CourseLevel::Advanced),
            "graduate" => Ok(CourseLevel::Graduate),
            other => Err(format!("Unknown course level: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub code: String,
    pub name: String,
    pub description: String,
    pub credits: i32,
    #[sqlx(json)]
    pub prerequisites: Vec<String>,
    pub department: String,
    pub level: CourseLevel,
    #[sqlx(json)]
    pub terms: Vec<String>,
    pub created_at: String,
}

impl Course {
    /// One catalog line as it appears in the recommendation prompt.
    pub fn catalog_line(&self) -> String {
        format!(
            "{}: {} - {} (Level: {}, Department: {})",
            self.code, self.name, self.description, self.level, self.department
        )
    }

    pub fn summary(&self) -> RecommendedCourse {
        RecommendedCourse {
            code: self.code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
        }
    }
}

fn default_credits() -> i32 {
    3
}

fn default_terms() -> Vec<String> {
    vec!["Fall".to_string(), "Spring".to_string()]
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCourseRequest {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default = "default_credits")]
    pub credits: i32,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub department: String,
    #[serde(default)]
    pub level: CourseLevel,
    #[serde(default = "default_terms")]
    pub terms: Vec<String>,
}

impl NewCourseRequest {
    /// Minimal request with the schema defaults for everything but the required fields.
    pub fn new(
        code: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        department: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            description: description.into(),
            credits: default_credits(),
            prerequisites: Vec::new(),
            department: department.into(),
            level: CourseLevel::default(),
            terms: default_terms(),
        }
    }

    pub fn with_level(mut self, level: CourseLevel) -> Self {
        self.level = level;
        self
    }

    pub fn with_prerequisites(mut self, prerequisites: &[&str]) -> Self {
        self.prerequisites = prerequisites.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn with_terms(mut self, terms: &[&str]) -> Self {
        self.terms = terms.iter().map(|t| t.to_string()).collect();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_line_format() {
        let course = Course {
            code: "CS101".to_string(),
            name: "Introduction to Computer Science".to_string(),
            description: "Fundamental concepts of programming and computer science.".to_string(),
            credits: 3,
            prerequisites: vec![],
            department: "Computer Science".to_string(),
            level: CourseLevel::Introductory,
            terms: default_terms(),
            created_at: "2025-01-01T00:00:00+00:00".to_string(),
        };

        assert_eq!(
            course.catalog_line(),
            "CS101: Introduction to Computer Science - Fundamental concepts of programming and computer science. (Level: Introductory, Department: Computer Science)"
        );
    }

    #[test]
    fn test_new_course_request_defaults() {
        let req: NewCourseRequest = serde_json::from_str(
            r#"{"code":"MATH111","name":"College Algebra","description":"Functions.","department":"Mathematics"}"#,
        )
        .expect("valid request");

        assert_eq!(req.credits, 3);
        assert_eq!(req.level, CourseLevel::Intermediate);
        assert_eq!(req.terms, vec!["Fall", "Spring"]);
        assert!(req.prerequisites.is_empty());
    }

    #[test]
    fn test_level_parse_is_case_insensitive() {
        assert_eq!("advanced".parse::<CourseLevel>(), Ok(CourseLevel::Advanced));
        assert_eq!(" Graduate ".parse::<CourseLevel>(), Ok(CourseLevel::Graduate));
        assert!("expert".parse::<CourseLevel>().is_err());
    }
}
