use sqlx::PgPool;

use crate::error::{AppError, AppResult};

/// Initialize the academic schema for PostgreSQL.
///
/// Mirrors the SQLite schema: case-insensitive uniqueness via unique
/// expression indexes, qualified subjects in the `teacher_subjects` join table.
pub async fn init_schema(pool: &PgPool) -> AppResult<()> {
    let subjects_sql = r#"
        CREATE TABLE IF NOT EXISTS subjects (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            code TEXT NOT NULL,
            description TEXT,
            credits BIGINT NOT NULL,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#;

    sqlx::query(subjects_sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create subjects table: {}", e)))?;

    let teachers_sql = r#"
        CREATE TABLE IF NOT EXISTS teachers (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT NOT NULL,
            department TEXT NOT NULL,
            qualification TEXT,
            experience BIGINT NOT NULL DEFAULT 0,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#;

    sqlx::query(teachers_sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create teachers table: {}", e)))?;

    let teacher_subjects_sql = r#"
        CREATE TABLE IF NOT EXISTS teacher_subjects (
            id BIGSERIAL PRIMARY KEY,
            teacher_id TEXT NOT NULL REFERENCES teachers (id),
            subject_id TEXT NOT NULL REFERENCES subjects (id),
            created_at TIMESTAMPTZ NOT NULL,
            UNIQUE(teacher_id, subject_id)
        )
        "#;

    sqlx::query(teacher_subjects_sql)
        .execute(pool)
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to create teacher_subjects table: {}", e))
        })?;

    let courses_sql = r#"
        CREATE TABLE IF NOT EXISTS courses (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            code TEXT NOT NULL,
            description TEXT,
            teacher_id TEXT NOT NULL REFERENCES teachers (id),
            subject_id TEXT NOT NULL REFERENCES subjects (id),
            schedule_day TEXT,
            schedule_time TEXT,
            schedule_room TEXT,
            max_students BIGINT NOT NULL DEFAULT 30,
            active BOOLEAN NOT NULL DEFAULT TRUE,
            created_at TIMESTAMPTZ NOT NULL,
            updated_at TIMESTAMPTZ NOT NULL
        )
        "#;

    sqlx::query(courses_sql)
        .execute(pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to create courses table: {}", e)))?;

    create_indexes(pool).await?;

    Ok(())
}

async fn create_indexes(pool: &PgPool) -> AppResult<()> {
    let indexes = vec![
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_subjects_code ON subjects (UPPER(code))",
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_subjects_name ON subjects (LOWER(name))",
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_teachers_email ON teachers (LOWER(email))",
        "CREATE UNIQUE INDEX IF NOT EXISTS uq_courses_code ON courses (UPPER(code))",
        "CREATE INDEX IF NOT EXISTS idx_teacher_subjects_teacher_id ON teacher_subjects (teacher_id)",
        "CREATE INDEX IF NOT EXISTS idx_teacher_subjects_subject_id ON teacher_subjects (subject_id)",
        "CREATE INDEX IF NOT EXISTS idx_courses_teacher_id ON courses (teacher_id)",
        "CREATE INDEX IF NOT EXISTS idx_courses_subject_id ON courses (subject_id)",
    ];

    for sql in indexes {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to create index: {}", e)))?;
    }

    Ok(())
}

/// Drop the schema (for cleanup/testing)
#[allow(dead_code)]
pub async fn drop_schema(pool: &PgPool) -> AppResult<()> {
    for table in ["courses", "teacher_subjects", "teachers", "subjects"] {
        let sql = format!("DROP TABLE IF EXISTS {} CASCADE", table);
        sqlx::query(&sql)
            .execute(pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to drop table {}: {}", table, e)))?;
    }

    Ok(())
}
