use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendedCourse {
    pub code: String,
    pub name: String,
    pub description: String,
}

impl RecommendedCourse {
    pub fn new(code: &str, name: &str, description: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Body of `POST /api/query`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QueryRequest {
    pub major: Option<String>,
    pub interests: Option<String>,
    pub query: Option<String>,
}

impl QueryRequest {
    /// Rejects a missing or blank question. Blank major/interests are treated as not given.
    pub fn validate(self) -> Result<RecommendationQuery, AppError> {
        let query = self
            .query
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| AppError::Validation("Query is required".to_string()))?;

        Ok(RecommendationQuery {
            major: non_blank(self.major),
            interests: non_blank(self.interests),
            query,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationQuery {
    pub major: Option<String>,
    pub interests: Option<String>,
    pub query: String,
}

impl RecommendationQuery {
    pub fn new(major: Option<&str>, interests: Option<&str>, query: &str) -> Self {
        Self {
            major: major.map(str::to_string),
            interests: interests.map(str::to_string),
            query: query.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub message: String,
    pub courses: Option<Vec<RecommendedCourse>>,
}

impl RecommendationResult {
    pub fn course_codes(&self) -> Vec<&str> {
        self.courses
            .iter()
            .flatten()
            .map(|c| c.code.as_str())
            .collect()
    }
}
