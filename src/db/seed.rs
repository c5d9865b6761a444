use sqlx::{SqliteConnection, SqlitePool};
use tracing::info;

use crate::db::course_repository;
use crate::error::AppError;
use crate::models::{CourseLevel, NewCourseRequest};

pub fn sample_catalog() -> Vec<NewCourseRequest> {
    vec![
        NewCourseRequest::new(
            "CS101",
            "Introduction to Computer Science",
            "Fundamental concepts of programming and computer science.",
            "Computer Science",
        )
        .with_level(CourseLevel::Introductory),
        NewCourseRequest::new(
            "CS201",
            "Data Structures",
            "Implementation and analysis of data structures.",
            "Computer Science",
        )
        .with_prerequisites(&["CS101"]),
        NewCourseRequest::new(
            "CS230",
            "Discrete Math for Computer Science",
            "Mathematical foundations of computer science.",
            "Computer Science",
        )
        .with_prerequisites(&["CS101"])
        .with_terms(&["Fall"]),
        NewCourseRequest::new(
            "CS370",
            "Introduction to AI",
            "Fundamentals of artificial intelligence and machine learning.",
            "Computer Science",
        )
        .with_level(CourseLevel::Advanced)
        .with_prerequisites(&["CS201", "CS230"])
        .with_terms(&["Spring"]),
        NewCourseRequest::new(
            "ECON101",
            "Introduction to Economics",
            "Basic principles of microeconomics and macroeconomics.",
            "Economics",
        )
        .with_level(CourseLevel::Introductory),
        NewCourseRequest::new(
            "ECON201",
            "Intermediate Microeconomics",
            "Analysis of consumer and producer behavior.",
            "Economics",
        )
        .with_prerequisites(&["ECON101"])
        .with_terms(&["Fall"]),
        NewCourseRequest::new(
            "ECON210",
            "Economic Statistics",
            "Statistical methods for economic data analysis.",
            "Economics",
        )
        .with_prerequisites(&["ECON101"])
        .with_terms(&["Spring"]),
        NewCourseRequest::new(
            "WRITING101",
            "Academic Writing",
            "Fundamentals of academic writing and research.",
            "English",
        )
        .with_level(CourseLevel::Introductory),
    ]
}

/// Inserts the sample catalog when the course table is empty. Returns the number inserted.
pub async fn seed_if_empty(db: &SqlitePool) -> Result<usize, AppError> {
    if course_repository::count_courses(db).await? > 0 {
        return Ok(0);
    }

    let mut tx = db.begin().await?;
    let inserted = insert_all(&mut tx).await?;
    tx.commit().await?;
    Ok(inserted)
}

/// Deletes every course and inserts the sample catalog in one transaction.
pub async fn replace_catalog(db: &SqlitePool) -> Result<usize, AppError> {
    let mut tx = db.begin().await?;

    let deleted = sqlx::query("DELETE FROM courses")
        .execute(&mut *tx)
        .await?
        .rows_affected();
    info!("deleted {} existing courses", deleted);
    let inserted = insert_all(&mut tx).await?;

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_all(conn: &mut SqliteConnection) -> Result<usize, AppError> {
    let mut inserted = 0;
    for req in sample_catalog() {
        course_repository::insert_course(&mut *conn, req).await?;
        inserted += 1;
    }
    info!("seeded {} courses", inserted);
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    #[tokio::test]
    async fn test_seed_if_empty_runs_once() {
        let pool = connect_in_memory().await.expect("db");

        assert_eq!(seed_if_empty(&pool).await.expect("seed"), 8);
        assert_eq!(seed_if_empty(&pool).await.expect("seed"), 0);
        assert_eq!(course_repository::count_courses(&pool).await.expect("count"), 8);
    }

    #[tokio::test]
    async fn test_replace_catalog_resets_courses() {
        let pool = connect_in_memory().await.expect("db");

        course_repository::insert_course(
            &pool,
            NewCourseRequest::new("HIST101", "World History", "Survey.", "History"),
        )
        .await
        .expect("insert");

        assert_eq!(replace_catalog(&pool).await.expect("replace"), 8);
        assert!(
            course_repository::find_course_by_code(&pool, "HIST101")
                .await
                .expect("query")
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_replace_catalog_rolls_back_on_failure() {
        let pool = connect_in_memory().await.expect("db");
        seed_if_empty(&pool).await.expect("seed");

        // Any sample insert now fails, so the delete must be undone.
        sqlx::query(
            "CREATE TRIGGER reject_inserts BEFORE INSERT ON courses \
             BEGIN SELECT RAISE(ABORT, 'inserts disabled'); END",
        )
        .execute(&pool)
        .await
        .expect("create trigger");

        assert!(replace_catalog(&pool).await.is_err());
        assert_eq!(course_repository::count_courses(&pool).await.expect("count"), 8);
    }
}
