use chrono::Utc;
use sqlx::{SqliteExecutor, SqlitePool};
use sqlx::types::Json;

use crate::error::AppError;
use crate::models::{Course, CourseLevel, NewCourseRequest};

pub async fn list_courses(db: &SqlitePool) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT code, name, description, credits, prerequisites, department, level, terms, created_at
        FROM courses
        ORDER BY code ASC
        "#,
    )
    .fetch_all(db)
    .await?;

    Ok(courses)
}

pub async fn find_course_by_code(db: &SqlitePool, code: &str) -> Result<Option<Course>, AppError> {
    let course = sqlx::query_as::<_, Course>(
        r#"
        SELECT code, name, description, credits, prerequisites, department, level, terms, created_at
        FROM courses
        WHERE code = ?1
        "#,
    )
    .bind(code.trim())
    .fetch_optional(db)
    .await?;

    Ok(course)
}

pub async fn list_courses_by_department(
    db: &SqlitePool,
    department: &str,
) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT code, name, description, credits, prerequisites, department, level, terms, created_at
        FROM courses
        WHERE department = ?1
        ORDER BY code ASC
        "#,
    )
    .bind(department)
    .fetch_all(db)
    .await?;

    Ok(courses)
}

pub async fn list_courses_by_level(
    db: &SqlitePool,
    level: CourseLevel,
) -> Result<Vec<Course>, AppError> {
    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT code, name, description, credits, prerequisites, department, level, terms, created_at
        FROM courses
        WHERE level = ?1
        ORDER BY code ASC
        "#,
    )
    .bind(level)
    .fetch_all(db)
    .await?;

    Ok(courses)
}

/// Case-insensitive match of `keyword` against name or description.
pub async fn search_courses(db: &SqlitePool, keyword: &str) -> Result<Vec<Course>, AppError> {
    let keyword = keyword.trim();
    if keyword.is_empty() {
        return Ok(Vec::new());
    }
    let pattern = format!("%{}%", escape_like(keyword));

    let courses = sqlx::query_as::<_, Course>(
        r#"
        SELECT code, name, description, credits, prerequisites, department, level, terms, created_at
        FROM courses
        WHERE name LIKE ?1 ESCAPE '\' OR description LIKE ?1 ESCAPE '\'
        ORDER BY code ASC
        "#,
    )
    .bind(pattern)
    .fetch_all(db)
    .await?;

    Ok(courses)
}

pub async fn count_courses(db: &SqlitePool) -> Result<i64, AppError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM courses")
        .fetch_one(db)
        .await?;
    Ok(count)
}

pub async fn insert_course<'e, E>(db: E, req: NewCourseRequest) -> Result<Course, AppError>
where
    E: SqliteExecutor<'e>,
{
    let course = Course {
        code: required("code", &req.code)?,
        name: required("name", &req.name)?,
        description: required("description", &req.description)?,
        credits: req.credits,
        prerequisites: req
            .prerequisites
            .iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect(),
        department: required("department", &req.department)?,
        level: req.level,
        terms: req.terms,
        created_at: Utc::now().to_rfc3339(),
    };

    let result = sqlx::query(
        r#"
        INSERT INTO courses
            (code, name, description, credits, prerequisites, department, level, terms, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&course.code)
    .bind(&course.name)
    .bind(&course.description)
    .bind(course.credits)
    .bind(Json(&course.prerequisites))
    .bind(&course.department)
    .bind(course.level)
    .bind(Json(&course.terms))
    .bind(&course.created_at)
    .execute(db)
    .await;

    match result {
        Ok(_) => Ok(course),
        Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => Err(
            AppError::DuplicateKey(format!("Course with code {} already exists", course.code)),
        ),
        Err(e) => Err(e.into()),
    }
}

fn required(field: &str, value: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("Course {} is required", field)));
    }
    Ok(trimmed.to_string())
}

fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connect_in_memory;

    async fn setup_test_db() -> SqlitePool {
        connect_in_memory().await.expect("Failed to create test db")
    }

    fn cs101() -> NewCourseRequest {
        NewCourseRequest::new(
            "CS101",
            "Introduction to Computer Science",
            "Fundamental concepts of programming and computer science.",
            "Computer Science",
        )
        .with_level(CourseLevel::Introductory)
    }

    #[tokio::test]
    async fn test_insert_and_fetch_course() {
        let pool = setup_test_db().await;

        let mut req = cs101();
        req.code = "  CS101 ".to_string();
        let course = insert_course(&pool, req).await.expect("Failed to insert course");
        assert_eq!(course.code, "CS101");
        assert_eq!(course.credits, 3);
        assert_eq!(course.terms, vec!["Fall", "Spring"]);

        let found = find_course_by_code(&pool, "CS101")
            .await
            .expect("Failed to fetch course")
            .expect("Course not found");
        assert_eq!(found.name, "Introduction to Computer Science");
        assert_eq!(found.level, CourseLevel::Introductory);

        let missing = find_course_by_code(&pool, "CS999").await.expect("query failed");
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_courses_sorted_by_code() {
        let pool = setup_test_db().await;

        for code in ["ECON201", "CS230", "WRITING101", "CS101", "ECON101"] {
            insert_course(
                &pool,
                NewCourseRequest::new(code, format!("{} name", code), "desc", "Dept"),
            )
            .await
            .expect("Failed to insert course");
        }

        let codes: Vec<String> = list_courses(&pool)
            .await
            .expect("Failed to list courses")
            .into_iter()
            .map(|c| c.code)
            .collect();

        let mut sorted = codes.clone();
        sorted.sort();
        assert_eq!(codes, sorted);
        assert_eq!(codes.len(), 5);
    }

    #[tokio::test]
    async fn test_duplicate_code_is_rejected_and_original_kept() {
        let pool = setup_test_db().await;

        insert_course(&pool, cs101()).await.expect("first insert");

        let duplicate = NewCourseRequest::new("CS101", "Imposter", "Other text", "History");
        let err = insert_course(&pool, duplicate).await.expect_err("duplicate insert");
        assert!(matches!(err, AppError::DuplicateKey(_)));

        let kept = find_course_by_code(&pool, "CS101")
            .await
            .expect("query failed")
            .expect("course missing");
        assert_eq!(kept.name, "Introduction to Computer Science");
        assert_eq!(kept.department, "Computer Science");
        assert_eq!(list_courses(&pool).await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn test_insert_requires_core_fields() {
        let pool = setup_test_db().await;

        let err = insert_course(&pool, NewCourseRequest::new("CS101", " ", "desc", "Dept"))
            .await
            .expect_err("blank name");
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(count_courses(&pool).await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_filters_by_department_and_level() {
        let pool = setup_test_db().await;

        insert_course(&pool, cs101()).await.expect("insert");
        insert_course(
            &pool,
            NewCourseRequest::new("CS201", "Data Structures", "Implementation.", "Computer Science"),
        )
        .await
        .expect("insert");
        insert_course(
            &pool,
            NewCourseRequest::new("ECON101", "Introduction to Economics", "Basics.", "Economics")
                .with_level(CourseLevel::Introductory),
        )
        .await
        .expect("insert");

        let cs = list_courses_by_department(&pool, "Computer Science")
            .await
            .expect("by department");
        assert_eq!(
            cs.iter().map(|c| c.code.as_str()).collect::<Vec<_>>(),
            vec!["CS101", "CS201"]
        );

        let intro = list_courses_by_level(&pool, CourseLevel::Introductory)
            .await
            .expect("by level");
        assert_eq!(
            intro.iter().map(|c| c.code.as_str()).collect::<Vec<_>>(),
            vec!["CS101", "ECON101"]
        );

        assert!(
            list_courses_by_department(&pool, "computer science")
                .await
                .expect("by department")
                .is_empty()
        );
    }

    #[tokio::test]
    async fn test_search_matches_name_or_description_case_insensitively() {
        let pool = setup_test_db().await;

        insert_course(&pool, cs101()).await.expect("insert");
        insert_course(
            &pool,
            NewCourseRequest::new(
                "CS370",
                "Introduction to AI",
                "Fundamentals of artificial intelligence and machine learning.",
                "Computer Science",
            ),
        )
        .await
        .expect("insert");

        let by_description = search_courses(&pool, "MACHINE LEARNING").await.expect("search");
        assert_eq!(by_description.len(), 1);
        assert_eq!(by_description[0].code, "CS370");

        let by_name = search_courses(&pool, "introduction").await.expect("search");
        assert_eq!(
            by_name.iter().map(|c| c.code.as_str()).collect::<Vec<_>>(),
            vec!["CS101", "CS370"]
        );

        assert!(search_courses(&pool, "100%").await.expect("search").is_empty());
        assert!(search_courses(&pool, "  ").await.expect("search").is_empty());
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("plain"), "plain");
    }
}
