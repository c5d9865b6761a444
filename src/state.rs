use std::sync::Arc;

use sqlx::SqlitePool;

use crate::completion::{CompletionClient, HttpCompletionClient, OfflineCompletionClient};
use crate::config::{AppConfig, CompletionConfig};
use crate::error::AppError;
use crate::services::RecommendationService;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub completion: Arc<dyn CompletionClient>,
    pub recommender: Arc<RecommendationService>,
}

impl AppState {
    pub fn from_config(db: SqlitePool, config: &AppConfig) -> Result<Self, AppError> {
        if config.offline {
            return Ok(Self {
                recommender: Arc::new(RecommendationService::offline(db.clone())),
                completion: Arc::new(OfflineCompletionClient),
                db,
            });
        }

        let client = HttpCompletionClient::new(config.completion.clone())?;
        Ok(Self::with_client(db, Arc::new(client), &config.completion))
    }

    pub fn with_client(
        db: SqlitePool,
        completion: Arc<dyn CompletionClient>,
        config: &CompletionConfig,
    ) -> Self {
        let recommender = RecommendationService::new(db.clone(), completion.clone(), config);
        Self {
            db,
            completion,
            recommender: Arc::new(recommender),
        }
    }
}
