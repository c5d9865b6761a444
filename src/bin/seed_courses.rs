//! Replaces the course catalog with the bundled sample courses.
//!
//! Runs as a dry run unless `--apply` is given.

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use course_advisor::config::DEFAULT_DATABASE_URL;
use course_advisor::db;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "seed_courses=info,course_advisor=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let apply = std::env::args().any(|arg| arg == "--apply");
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());

    let catalog = db::seed::sample_catalog();
    for course in &catalog {
        info!(
            "{} {} ({}, {})",
            course.code, course.name, course.department, course.level
        );
    }

    if !apply {
        info!(
            "dry run: {} courses would replace the catalog in {}. Re-run with --apply to write.",
            catalog.len(),
            database_url
        );
        return Ok(());
    }

    let pool = db::connect(&database_url).await?;
    let inserted = db::seed::replace_catalog(&pool).await?;
    info!("catalog replaced with {} courses", inserted);

    Ok(())
}
