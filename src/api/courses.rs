use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::Deserialize;

use super::{DataResponse, data, list};
use crate::db::course_repository;
use crate::error::AppError;
use crate::models::{Course, CourseLevel, NewCourseRequest};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CourseFilter {
    department: Option<String>,
    level: Option<String>,
    search: Option<String>,
}

pub async fn list_courses(
    State(state): State<AppState>,
    Query(filter): Query<CourseFilter>,
) -> Result<Json<DataResponse<Vec<Course>>>, AppError> {
    let courses = if let Some(department) = filter.department {
        course_repository::list_courses_by_department(&state.db, &department).await?
    } else if let Some(level) = filter.level {
        let level: CourseLevel = level.parse().map_err(AppError::Validation)?;
        course_repository::list_courses_by_level(&state.db, level).await?
    } else if let Some(keyword) = filter.search {
        course_repository::search_courses(&state.db, &keyword).await?
    } else {
        course_repository::list_courses(&state.db).await?
    };
    Ok(list(courses))
}

pub async fn get_course(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<DataResponse<Course>>, AppError> {
    let course = course_repository::find_course_by_code(&state.db, &code)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    Ok(data(course))
}

pub async fn create_course(
    State(state): State<AppState>,
    payload: Result<Json<NewCourseRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Course>>), AppError> {
    let Json(req) = payload?;
    let course = course_repository::insert_course(&state.db, req).await?;
    Ok((StatusCode::CREATED, data(course)))
}
