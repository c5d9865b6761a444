use std::collections::HashSet;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::db::course_repository;
use crate::error::AppError;
use crate::models::{Course, RecommendationQuery, RecommendationResult, RecommendedCourse};
use crate::services::recommendation::RecommendationProvider;

pub const MAX_FALLBACK_COURSES: usize = 5;

const STOP_WORDS: [&str; 7] = ["what", "which", "should", "could", "would", "take", "recommend"];

pub const COMPUTER_SCIENCE: &str = "Computer Science";
pub const ECONOMICS: &str = "Economics";
pub const ENGLISH: &str = "English";

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty())
}

/// Maps a free-text major onto a catalog department.
pub fn department_for_major(major: &str) -> Option<&'static str> {
    let major = major.to_lowercase();
    let has_word = |w: &str| words(&major).any(|t| t == w);

    if major.contains("computer science") || has_word("cs") {
        Some(COMPUTER_SCIENCE)
    } else if major.contains("econ") {
        Some(ECONOMICS)
    } else if major.contains("english") || major.contains("writing") {
        Some(ENGLISH)
    } else {
        None
    }
}

/// Comma-separated interests followed by the significant words of the question.
pub fn fallback_keywords(interests: Option<&str>, query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let from_interests = interests
        .into_iter()
        .flat_map(|i| i.split(','))
        .map(|i| i.trim().to_string());

    let lowered = query.to_lowercase();
    let from_query = lowered
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| w.chars().count() > 3 && !STOP_WORDS.contains(&w.as_str()))
        .collect::<Vec<_>>();

    from_interests
        .chain(from_query)
        .filter(|k| !k.is_empty())
        .filter(|k| seen.insert(k.to_lowercase()))
        .collect()
}

fn push_unique(into: &mut Vec<Course>, seen: &mut HashSet<String>, courses: Vec<Course>) {
    for course in courses {
        if seen.insert(course.code.clone()) {
            into.push(course);
        }
    }
}

/// Catalog-grounded answer built from the student's department or keywords.
pub struct CatalogFallback {
    db: SqlitePool,
}

impl CatalogFallback {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn find_courses(&self, query: &RecommendationQuery) -> Result<Vec<Course>, AppError> {
        let mut courses = Vec::new();

        if let Some(department) = query.major.as_deref().and_then(department_for_major) {
            debug!(department, "catalog fallback by department");
            courses = course_repository::list_courses_by_department(&self.db, department).await?;
        }

        if courses.is_empty() {
            let keywords = fallback_keywords(query.interests.as_deref(), &query.query);
            debug!(?keywords, "catalog fallback by keyword");
            let mut seen = HashSet::new();
            for keyword in &keywords {
                let found = course_repository::search_courses(&self.db, keyword).await?;
                push_unique(&mut courses, &mut seen, found);
            }
        }

        courses.truncate(MAX_FALLBACK_COURSES);
        Ok(courses)
    }
}

fn catalog_message(query: &RecommendationQuery) -> String {
    let major = query
        .major
        .as_deref()
        .map(|m| format!("{} major and ", m))
        .unwrap_or_default();
    format!(
        "Based on your {}interest in {}, here are some recommended courses that might help with your query: \"{}\"",
        major,
        query.interests.as_deref().unwrap_or("various subjects"),
        query.query
    )
}

#[async_trait]
impl RecommendationProvider for CatalogFallback {
    fn name(&self) -> &'static str {
        "catalog"
    }

    async fn try_generate(&self, query: &RecommendationQuery) -> Option<RecommendationResult> {
        let courses = match self.find_courses(query).await {
            Ok(courses) => courses,
            Err(e) => {
                warn!("catalog fallback failed: {}", e);
                return None;
            }
        };

        if courses.is_empty() {
            return None;
        }

        Some(RecommendationResult {
            message: catalog_message(query),
            courses: Some(courses.iter().map(Course::summary).collect()),
        })
    }
}

/// Last resort: a fixed list keyed by major and interests. Never fails.
pub struct StaticFallback;

impl StaticFallback {
    pub fn courses_for(&self, query: &RecommendationQuery) -> Vec<RecommendedCourse> {
        let mut courses = match query.major.as_deref().and_then(department_for_major) {
            Some(COMPUTER_SCIENCE) => vec![
                RecommendedCourse::new(
                    "CS101",
                    "Introduction to Computer Science",
                    "Fundamental concepts of programming and computer science.",
                ),
                RecommendedCourse::new(
                    "CS201",
                    "Data Structures",
                    "Implementation and analysis of data structures.",
                ),
                RecommendedCourse::new(
                    "CS230",
                    "Discrete Math for Computer Science",
                    "Mathematical foundations of computer science.",
                ),
            ],
            Some(ECONOMICS) => vec![
                RecommendedCourse::new(
                    "ECON101",
                    "Introduction to Economics",
                    "Basic principles of microeconomics and macroeconomics.",
                ),
                RecommendedCourse::new(
                    "ECON201",
                    "Intermediate Microeconomics",
                    "Analysis of consumer and producer behavior.",
                ),
                RecommendedCourse::new(
                    "ECON210",
                    "Economic Statistics",
                    "Statistical methods for economic data analysis.",
                ),
            ],
            _ => vec![
                RecommendedCourse::new(
                    "WRITING101",
                    "Academic Writing",
                    "Fundamentals of academic writing and research.",
                ),
                RecommendedCourse::new(
                    "MATH111",
                    "College Algebra",
                    "Algebraic expressions, equations, and functions.",
                ),
                RecommendedCourse::new(
                    "HIST101",
                    "World History",
                    "Survey of major historical events and developments.",
                ),
            ],
        };

        if let Some(interests) = query.interests.as_deref() {
            let interests = interests.to_lowercase();
            if words(&interests).any(|w| w == "ai") || interests.contains("machine learning") {
                courses.push(RecommendedCourse::new(
                    "CS370",
                    "Introduction to AI",
                    "Fundamentals of artificial intelligence and machine learning.",
                ));
            }
            if interests.contains("data") || interests.contains("statistics") {
                courses.push(RecommendedCourse::new(
                    "STATS210",
                    "Regression Analysis",
                    "Statistical modeling and data analysis techniques.",
                ));
            }
        }

        courses
    }

    pub fn generate(&self, query: &RecommendationQuery) -> RecommendationResult {
        RecommendationResult {
            message: format!(
                "Based on your {}, here are some recommended courses:",
                query.major.as_deref().unwrap_or("interests")
            ),
            courses: Some(self.courses_for(query)),
        }
    }
}

#[async_trait]
impl RecommendationProvider for StaticFallback {
    fn name(&self) -> &'static str {
        "static"
    }

    async fn try_generate(&self, query: &RecommendationQuery) -> Option<RecommendationResult> {
        Some(self.generate(query))
    }
}
