pub mod extract;
pub mod fallback;
pub mod recommendation;

pub use fallback::{CatalogFallback, StaticFallback};
pub use recommendation::{
    CompletionProvider, RecommendationProvider, RecommendationService, build_prompt,
};
