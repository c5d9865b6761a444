use std::sync::Arc;

use async_trait::async_trait;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::completion::{CompletionClient, Prompt};
use crate::config::CompletionConfig;
use crate::db::course_repository;
use crate::error::AppError;
use crate::models::{Course, QueryRequest, RecommendationQuery, RecommendationResult};
use crate::services::extract;
use crate::services::fallback::{CatalogFallback, StaticFallback};

pub const SYSTEM_INSTRUCTION: &str = "You are a helpful course advisor for university students. \
Recommend courses only from the course list the student provides. \
When you mention a course, write its code followed by a colon, for example \"CS101: Introduction to Computer Science\".";

/// One tier of the recommendation chain. `None` hands the query to the next tier.
#[async_trait]
pub trait RecommendationProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn try_generate(&self, query: &RecommendationQuery) -> Option<RecommendationResult>;
}

pub fn build_prompt(query: &RecommendationQuery, catalog: &[Course]) -> String {
    let course_list = catalog
        .iter()
        .map(Course::catalog_line)
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "I am a {} major.\n\
         My academic interests include: {}.\n\
         \n\
         {}\n\
         \n\
         Here are the courses available in the catalog:\n\
         \n\
         {}\n\
         \n\
         Please recommend courses from this list and share any other advice you think would be helpful.",
        query.major.as_deref().unwrap_or("undecided"),
        query.interests.as_deref().unwrap_or("various subjects"),
        query.query,
        course_list
    )
}

/// Live tier: asks the completion API, grounded in the full catalog.
pub struct CompletionProvider {
    db: SqlitePool,
    client: Arc<dyn CompletionClient>,
    max_tokens: u32,
    temperature: f32,
}

impl CompletionProvider {
    pub fn new(db: SqlitePool, client: Arc<dyn CompletionClient>, config: &CompletionConfig) -> Self {
        Self {
            db,
            client,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }
}

#[async_trait]
impl RecommendationProvider for CompletionProvider {
    fn name(&self) -> &'static str {
        "completion"
    }

    async fn try_generate(&self, query: &RecommendationQuery) -> Option<RecommendationResult> {
        let catalog = match course_repository::list_courses(&self.db).await {
            Ok(catalog) => catalog,
            Err(e) => {
                warn!("could not load catalog for prompt: {}", e);
                return None;
            }
        };

        let prompt = Prompt::user(build_prompt(query, &catalog))
            .with_system(SYSTEM_INSTRUCTION)
            .with_max_tokens(self.max_tokens)
            .with_temperature(self.temperature);

        match self.client.complete(&prompt).await {
            Ok(message) => {
                let courses = extract::resolve_course_references(&message, &catalog);
                Some(RecommendationResult { message, courses })
            }
            Err(e) => {
                warn!("completion tier failed, falling back: {}", e);
                None
            }
        }
    }
}

pub struct RecommendationService {
    providers: Vec<Box<dyn RecommendationProvider>>,
}

impl RecommendationService {
    /// Live completion, then catalog fallback, then the static list.
    pub fn new(db: SqlitePool, client: Arc<dyn CompletionClient>, config: &CompletionConfig) -> Self {
        Self::with_providers(vec![
            Box::new(CompletionProvider::new(db.clone(), client, config)),
            Box::new(CatalogFallback::new(db)),
            Box::new(StaticFallback),
        ])
    }

    /// Catalog fallback and static list only.
    pub fn offline(db: SqlitePool) -> Self {
        Self::with_providers(vec![
            Box::new(CatalogFallback::new(db)),
            Box::new(StaticFallback),
        ])
    }

    pub fn with_providers(providers: Vec<Box<dyn RecommendationProvider>>) -> Self {
        Self { providers }
    }

    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Validates the request before any provider runs, then returns the first tier's answer.
    pub async fn recommend(&self, req: QueryRequest) -> Result<RecommendationResult, AppError> {
        let query = req.validate()?;

        for provider in &self.providers {
            if let Some(result) = provider.try_generate(&query).await {
                info!(
                    provider = provider.name(),
                    courses = result.courses.as_ref().map_or(0, Vec::len),
                    "recommendation generated"
                );
                return Ok(result);
            }
            debug!(provider = provider.name(), "no recommendation, trying next tier");
        }

        Err(AppError::Internal(
            "no recommendation provider produced a result".to_string(),
        ))
    }
}
