use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::RecommendedCourse;

pub const DEFAULT_MAJOR: &str = "Undecided";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct UserPreference {
    pub user_id: String,
    pub major: String,
    #[sqlx(json)]
    pub interests: Vec<String>,
    #[sqlx(json)]
    pub completed_courses: Vec<String>,
    #[sqlx(skip)]
    pub saved_recommendations: Vec<SavedRecommendation>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct SavedRecommendation {
    pub id: String,
    pub query: String,
    #[sqlx(json)]
    pub courses: Vec<RecommendedCourse>,
    pub timestamp: String,
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePreferencesRequest {
    pub major: Option<String>,
    pub interests: Option<Vec<String>>,
    pub completed_courses: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRecommendationRequest {
    pub query: Option<String>,
    pub courses: Option<Vec<RecommendedCourse>>,
}
