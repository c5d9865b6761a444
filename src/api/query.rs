use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde::Serialize;
use tracing::debug;

use crate::completion::Prompt;
use crate::error::AppError;
use crate::models::{QueryRequest, RecommendedCourse};
use crate::state::AppState;

const PROBE_PROMPT: &str = "Hello, can you recommend a course?";
const PROBE_MAX_TOKENS: u32 = 100;

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub success: bool,
    pub message: String,
    pub courses: Option<Vec<RecommendedCourse>>,
}

pub async fn process_query(
    State(state): State<AppState>,
    payload: Result<Json<QueryRequest>, JsonRejection>,
) -> Result<Json<QueryResponse>, AppError> {
    let Json(req) = payload?;
    debug!(major = ?req.major, interests = ?req.interests, "received query");

    let result = state.recommender.recommend(req).await?;
    Ok(Json(QueryResponse {
        success: true,
        message: result.message,
        courses: result.courses,
    }))
}

#[derive(Debug, Serialize)]
pub struct CheckResponse {
    pub success: bool,
    pub message: &'static str,
    pub data: String,
}

pub async fn check_completion(State(state): State<AppState>) -> Result<Json<CheckResponse>, AppError> {
    let prompt = Prompt::user(PROBE_PROMPT).with_max_tokens(PROBE_MAX_TOKENS);
    let reply = state.completion.complete(&prompt).await?;
    Ok(Json(CheckResponse {
        success: true,
        message: "Completion API test successful",
        data: reply,
    }))
}
