mod courses;
mod preferences;
mod query;
mod ui;

use axum::http::{HeaderValue, Method, header};
use axum::routing::post;
use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(ui::serve_index))
        .route("/static/app.js", get(ui::serve_app_js))
        .route("/api/health", get(health))
        .route("/api/courses", get(courses::list_courses).post(courses::create_course))
        .route("/api/courses/{code}", get(courses::get_course))
        .route("/api/query", post(query::process_query))
        .route("/api/completion/check", get(query::check_completion))
        .route(
            "/api/users/{user_id}/preferences",
            get(preferences::get_preferences).put(preferences::update_preferences),
        )
        .route(
            "/api/users/{user_id}/recommendations",
            post(preferences::save_recommendation),
        )
        .with_state(state)
}

/// Allows `frontend_origin` only, or any origin when none is configured.
pub fn cors_layer(frontend_origin: Option<&str>) -> CorsLayer {
    let origin = match frontend_origin.map(HeaderValue::from_str) {
        Some(Ok(value)) => AllowOrigin::exact(value),
        Some(Err(e)) => {
            warn!("ignoring invalid FRONTEND_URL: {}", e);
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

#[derive(Debug, Serialize)]
pub struct DataResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    pub data: T,
}

fn data<T: Serialize>(data: T) -> Json<DataResponse<T>> {
    Json(DataResponse {
        success: true,
        count: None,
        data,
    })
}

fn list<T: Serialize>(items: Vec<T>) -> Json<DataResponse<Vec<T>>> {
    Json(DataResponse {
        success: true,
        count: Some(items.len()),
        data: items,
    })
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub message: &'static str,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("select 1").execute(&state.db).await?;
    Ok(Json(HealthResponse {
        status: "ok",
        message: "Server is running",
    }))
}
