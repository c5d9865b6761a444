pub mod course;
pub mod preference;
pub mod recommendation;

pub use course::{Course, CourseLevel, NewCourseRequest};
pub use preference::{
    SaveRecommendationRequest, SavedRecommendation, UpdatePreferencesRequest, UserPreference,
};
pub use recommendation::{
    QueryRequest, RecommendationQuery, RecommendationResult, RecommendedCourse,
};
