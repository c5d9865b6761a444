use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};

use super::{DataResponse, data};
use crate::db::preference_repository;
use crate::error::AppError;
use crate::models::{SaveRecommendationRequest, UpdatePreferencesRequest, UserPreference};
use crate::state::AppState;

pub async fn get_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<DataResponse<UserPreference>>, AppError> {
    let preferences = preference_repository::find_preferences(&state.db, &user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User preferences not found".to_string()))?;
    Ok(data(preferences))
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<UpdatePreferencesRequest>, JsonRejection>,
) -> Result<Json<DataResponse<UserPreference>>, AppError> {
    let Json(req) = payload?;
    let preferences = preference_repository::upsert_preferences(&state.db, &user_id, req).await?;
    Ok(data(preferences))
}

pub async fn save_recommendation(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    payload: Result<Json<SaveRecommendationRequest>, JsonRejection>,
) -> Result<Json<DataResponse<UserPreference>>, AppError> {
    let Json(req) = payload?;
    let (query, courses) = match (req.query, req.courses) {
        (Some(query), Some(courses)) if !query.trim().is_empty() => (query, courses),
        _ => {
            return Err(AppError::Validation(
                "Query and courses are required".to_string(),
            ));
        }
    };

    let preferences =
        preference_repository::append_recommendation(&state.db, &user_id, &query, &courses).await?;
    Ok(data(preferences))
}
