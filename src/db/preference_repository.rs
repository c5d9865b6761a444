use chrono::Utc;
use sqlx::SqlitePool;
use sqlx::types::Json;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::preference::DEFAULT_MAJOR;
use crate::models::{RecommendedCourse, SavedRecommendation, UpdatePreferencesRequest, UserPreference};

pub async fn find_preferences(
    db: &SqlitePool,
    user_id: &str,
) -> Result<Option<UserPreference>, AppError> {
    let user_id = user_id.trim();
    let mut preference = match sqlx::query_as::<_, UserPreference>(
        r#"
        SELECT user_id, major, interests, completed_courses, created_at, updated_at
        FROM user_preferences
        WHERE user_id = ?1
        "#,
    )
    .bind(user_id)
    .fetch_optional(db)
    .await?
    {
        Some(p) => p,
        None => return Ok(None),
    };

    preference.saved_recommendations = sqlx::query_as::<_, SavedRecommendation>(
        r#"
        SELECT id, query, courses, timestamp
        FROM saved_recommendations
        WHERE user_id = ?1
        ORDER BY seq ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    Ok(Some(preference))
}

/// Creates the record on first use; afterwards only the supplied fields are overwritten.
///
/// A single `INSERT .. ON CONFLICT` statement, so concurrent first writes for the same user
/// resolve as last writer wins.
pub async fn upsert_preferences(
    db: &SqlitePool,
    user_id: &str,
    req: UpdatePreferencesRequest,
) -> Result<UserPreference, AppError> {
    let user_id = required_user_id(user_id)?;

    let major = req
        .major
        .map(|m| m.trim().to_string())
        .filter(|m| !m.is_empty());
    let now = Utc::now().to_rfc3339();

    sqlx::query(
        r#"
        INSERT INTO user_preferences
            (user_id, major, interests, completed_courses, created_at, updated_at)
        VALUES (?1, COALESCE(?2, ?5), COALESCE(?3, '[]'), COALESCE(?4, '[]'), ?6, ?6)
        ON CONFLICT(user_id) DO UPDATE SET
            major = COALESCE(?2, major),
            interests = COALESCE(?3, interests),
            completed_courses = COALESCE(?4, completed_courses),
            updated_at = ?6
        "#,
    )
    .bind(user_id)
    .bind(major)
    .bind(req.interests.as_ref().map(Json))
    .bind(req.completed_courses.as_ref().map(Json))
    .bind(DEFAULT_MAJOR)
    .bind(&now)
    .execute(db)
    .await?;

    find_preferences(db, user_id)
        .await?
        .ok_or_else(|| AppError::Internal(format!("preferences for {} vanished after upsert", user_id)))
}

pub async fn append_recommendation(
    db: &SqlitePool,
    user_id: &str,
    query: &str,
    courses: &[RecommendedCourse],
) -> Result<UserPreference, AppError> {
    let user_id = required_user_id(user_id)?;
    let now = Utc::now().to_rfc3339();
    let mut tx = db.begin().await?;

    let exists: Option<String> =
        sqlx::query_scalar("SELECT user_id FROM user_preferences WHERE user_id = ?1")
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?;
    if exists.is_none() {
        return Err(AppError::NotFound("User preferences not found".to_string()));
    }

    sqlx::query(
        r#"
        INSERT INTO saved_recommendations (id, user_id, query, courses, timestamp)
        VALUES (?1, ?2, ?3, ?4, ?5)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(user_id)
    .bind(query)
    .bind(Json(courses))
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    sqlx::query("UPDATE user_preferences SET updated_at = ?1 WHERE user_id = ?2")
        .bind(&now)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    find_preferences(db, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User preferences not found".to_string()))
}

fn required_user_id(user_id: &str) -> Result<&str, AppError> {
    let trimmed = user_id.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("User ID is required".to_string()));
    }
    Ok(trimmed)
}
