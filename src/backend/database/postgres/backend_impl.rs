use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

use super::super::{map_database_error, DatabaseBackendConfig};
use super::schema;
use crate::backend::{Backend, CourseBackend, SubjectBackend, TeacherBackend};
use crate::error::{AppError, AppResult};
use crate::models::{
    Course, CourseFilter, CourseUpdate, Schedule, Subject, SubjectUpdate, Teacher, TeacherUpdate,
    Weekday,
};

const SUBJECT_COLUMNS: &str = "id, name, code, description, credits, active, created_at, updated_at";
const TEACHER_COLUMNS: &str =
    "id, name, email, department, qualification, experience, active, created_at, updated_at";
const COURSE_COLUMNS: &str = "id, title, code, description, teacher_id, subject_id, schedule_day, schedule_time, schedule_room, max_students, active, created_at, updated_at";

/// PostgreSQL database backend.
pub struct PostgresBackend {
    pool: PgPool,
}

impl PostgresBackend {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_subject(row: &PgRow) -> Subject {
        Subject {
            id: row.get("id"),
            name: row.get("name"),
            code: row.get("code"),
            description: row.get("description"),
            credits: row.get("credits"),
            is_active: row.get("active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_teacher(row: &PgRow, subjects: Vec<String>) -> Teacher {
        Teacher {
            id: row.get("id"),
            name: row.get("name"),
            email: row.get("email"),
            department: row.get("department"),
            subjects,
            qualification: row.get("qualification"),
            experience: row.get("experience"),
            is_active: row.get("active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    fn row_to_course(row: &PgRow) -> Course {
        let day: Option<String> = row.get("schedule_day");
        let time: Option<String> = row.get("schedule_time");
        let room: Option<String> = row.get("schedule_room");
        let schedule = if day.is_some() || time.is_some() || room.is_some() {
            Some(Schedule {
                day: day.as_deref().and_then(Weekday::parse),
                time,
                room,
            })
        } else {
            None
        };

        Course {
            id: row.get("id"),
            title: row.get("title"),
            code: row.get("code"),
            description: row.get("description"),
            teacher_id: row.get("teacher_id"),
            subject_id: row.get("subject_id"),
            schedule,
            max_students: row.get("max_students"),
            is_active: row.get("active"),
            created_at: row.get("created_at"),
            updated_at: row.get("updated_at"),
        }
    }

    async fn fetch_teacher_subjects(&self, teacher_id: &str) -> AppResult<Vec<String>> {
        let rows = sqlx::query(
            "SELECT subject_id FROM teacher_subjects WHERE teacher_id = $1 ORDER BY created_at, id",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::Database(format!("Failed to fetch teacher subjects: {}", e)))?;

        Ok(rows.iter().map(|row| row.get("subject_id")).collect())
    }
}

#[async_trait]
impl Backend for PostgresBackend {
    async fn connect(config: &DatabaseBackendConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(&config.connection_url)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to PostgreSQL: {}", e)))?;

        Ok(Self::new(pool))
    }

    async fn health_check(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("PostgreSQL health check failed: {}", e)))?;
        Ok(())
    }

    async fn init_schema(&self) -> AppResult<()> {
        schema::init_schema(&self.pool).await
    }

    async fn cleanup(&self) -> AppResult<()> {
        self.pool.close().await;
        Ok(())
    }
}

#[async_trait]
impl SubjectBackend for PostgresBackend {
    async fn create_subject(&self, subject: &Subject) -> AppResult<Subject> {
        let sql = "INSERT INTO subjects (id, name, code, description, credits, active, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";

        sqlx::query(sql)
            .bind(&subject.id)
            .bind(&subject.name)
            .bind(&subject.code)
            .bind(&subject.description)
            .bind(subject.credits)
            .bind(subject.is_active)
            .bind(subject.created_at)
            .bind(subject.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_database_error(e, "Failed to create subject"))?;

        Ok(subject.clone())
    }

    async fn find_subject_by_id(&self, id: &str) -> AppResult<Option<Subject>> {
        let sql = format!("SELECT {} FROM subjects WHERE id = $1", SUBJECT_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find subject: {}", e)))?;

        Ok(row.map(|row| Self::row_to_subject(&row)))
    }

    async fn find_subject_by_code(&self, code: &str) -> AppResult<Option<Subject>> {
        let sql = format!(
            "SELECT {} FROM subjects WHERE UPPER(code) = UPPER($1)",
            SUBJECT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find subject by code: {}", e)))?;

        Ok(row.map(|row| Self::row_to_subject(&row)))
    }

    async fn find_subject_by_name(&self, name: &str) -> AppResult<Option<Subject>> {
        let sql = format!(
            "SELECT {} FROM subjects WHERE LOWER(name) = LOWER($1)",
            SUBJECT_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find subject by name: {}", e)))?;

        Ok(row.map(|row| Self::row_to_subject(&row)))
    }

    async fn find_all_subjects(&self, active_only: bool) -> AppResult<Vec<Subject>> {
        let sql = if active_only {
            format!(
                "SELECT {} FROM subjects WHERE active = TRUE ORDER BY name",
                SUBJECT_COLUMNS
            )
        } else {
            format!("SELECT {} FROM subjects ORDER BY name", SUBJECT_COLUMNS)
        };

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch subjects: {}", e)))?;

        Ok(rows.iter().map(Self::row_to_subject).collect())
    }

    async fn update_subject(
        &self,
        id: &str,
        update: &SubjectUpdate,
    ) -> AppResult<Option<Subject>> {
        let Some(mut subject) = self.find_subject_by_id(id).await? else {
            return Ok(None);
        };
        subject.apply(update);

        let sql = "UPDATE subjects SET name = $1, code = $2, description = $3, credits = $4, active = $5, updated_at = $6 WHERE id = $7";
        sqlx::query(sql)
            .bind(&subject.name)
            .bind(&subject.code)
            .bind(&subject.description)
            .bind(subject.credits)
            .bind(subject.is_active)
            .bind(subject.updated_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_database_error(e, "Failed to update subject"))?;

        Ok(Some(subject))
    }

    async fn deactivate_subject(&self, id: &str) -> AppResult<Option<Subject>> {
        let result =
            sqlx::query("UPDATE subjects SET active = FALSE, updated_at = $1 WHERE id = $2")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Database(format!("Failed to deactivate subject: {}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_subject_by_id(id).await
    }
}

#[async_trait]
impl TeacherBackend for PostgresBackend {
    async fn create_teacher(&self, teacher: &Teacher) -> AppResult<Teacher> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let sql = "INSERT INTO teachers (id, name, email, department, qualification, experience, active, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)";
        sqlx::query(sql)
            .bind(&teacher.id)
            .bind(&teacher.name)
            .bind(&teacher.email)
            .bind(&teacher.department)
            .bind(&teacher.qualification)
            .bind(teacher.experience)
            .bind(teacher.is_active)
            .bind(teacher.created_at)
            .bind(teacher.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_database_error(e, "Failed to create teacher"))?;

        for subject_id in &teacher.subjects {
            sqlx::query(
                "INSERT INTO teacher_subjects (teacher_id, subject_id, created_at) VALUES ($1, $2, $3)",
            )
            .bind(&teacher.id)
            .bind(subject_id)
            .bind(teacher.created_at)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_database_error(e, "Failed to assign subject"))?;
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(teacher.clone())
    }

    async fn find_teacher_by_id(&self, id: &str) -> AppResult<Option<Teacher>> {
        let sql = format!("SELECT {} FROM teachers WHERE id = $1", TEACHER_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find teacher: {}", e)))?;

        match row {
            Some(row) => {
                let teacher_id: String = row.get("id");
                let subjects = self.fetch_teacher_subjects(&teacher_id).await?;
                Ok(Some(Self::row_to_teacher(&row, subjects)))
            }
            None => Ok(None),
        }
    }

    async fn find_teacher_by_email(&self, email: &str) -> AppResult<Option<Teacher>> {
        let sql = "SELECT id FROM teachers WHERE LOWER(email) = LOWER($1)";
        let row = sqlx::query(sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find teacher by email: {}", e)))?;

        match row {
            Some(row) => {
                let id: String = row.get("id");
                self.find_teacher_by_id(&id).await
            }
            None => Ok(None),
        }
    }

    async fn find_all_teachers(&self, active_only: bool) -> AppResult<Vec<Teacher>> {
        let sql = if active_only {
            format!(
                "SELECT {} FROM teachers WHERE active = TRUE ORDER BY name",
                TEACHER_COLUMNS
            )
        } else {
            format!("SELECT {} FROM teachers ORDER BY name", TEACHER_COLUMNS)
        };

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch teachers: {}", e)))?;

        let mut teachers = Vec::with_capacity(rows.len());
        for row in rows {
            let teacher_id: String = row.get("id");
            let subjects = self.fetch_teacher_subjects(&teacher_id).await?;
            teachers.push(Self::row_to_teacher(&row, subjects));
        }

        Ok(teachers)
    }

    async fn update_teacher(
        &self,
        id: &str,
        update: &TeacherUpdate,
    ) -> AppResult<Option<Teacher>> {
        let Some(mut teacher) = self.find_teacher_by_id(id).await? else {
            return Ok(None);
        };
        teacher.apply(update);

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let sql = "UPDATE teachers SET name = $1, email = $2, department = $3, qualification = $4, experience = $5, active = $6, updated_at = $7 WHERE id = $8";
        sqlx::query(sql)
            .bind(&teacher.name)
            .bind(&teacher.email)
            .bind(&teacher.department)
            .bind(&teacher.qualification)
            .bind(teacher.experience)
            .bind(teacher.is_active)
            .bind(teacher.updated_at)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_database_error(e, "Failed to update teacher"))?;

        if update.subjects.is_some() {
            sqlx::query("DELETE FROM teacher_subjects WHERE teacher_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| AppError::Database(format!("Failed to clear subjects: {}", e)))?;

            for subject_id in &teacher.subjects {
                sqlx::query(
                    "INSERT INTO teacher_subjects (teacher_id, subject_id, created_at) VALUES ($1, $2, $3)",
                )
                .bind(id)
                .bind(subject_id)
                .bind(teacher.updated_at)
                .execute(&mut *tx)
                .await
                .map_err(|e| map_database_error(e, "Failed to assign subject"))?;
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::Database(format!("Failed to commit transaction: {}", e)))?;

        Ok(Some(teacher))
    }

    async fn deactivate_teacher(&self, id: &str) -> AppResult<Option<Teacher>> {
        let result =
            sqlx::query("UPDATE teachers SET active = FALSE, updated_at = $1 WHERE id = $2")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Database(format!("Failed to deactivate teacher: {}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_teacher_by_id(id).await
    }
}

#[async_trait]
impl CourseBackend for PostgresBackend {
    async fn create_course(&self, course: &Course) -> AppResult<Course> {
        let (day, time, room) = schedule_columns(&course.schedule);

        let sql = "INSERT INTO courses (id, title, code, description, teacher_id, subject_id, schedule_day, schedule_time, schedule_room, max_students, active, created_at, updated_at) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)";
        sqlx::query(sql)
            .bind(&course.id)
            .bind(&course.title)
            .bind(&course.code)
            .bind(&course.description)
            .bind(&course.teacher_id)
            .bind(&course.subject_id)
            .bind(day)
            .bind(time)
            .bind(room)
            .bind(course.max_students)
            .bind(course.is_active)
            .bind(course.created_at)
            .bind(course.updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| map_database_error(e, "Failed to create course"))?;

        Ok(course.clone())
    }

    async fn find_course_by_id(&self, id: &str) -> AppResult<Option<Course>> {
        let sql = format!("SELECT {} FROM courses WHERE id = $1", COURSE_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find course: {}", e)))?;

        Ok(row.map(|row| Self::row_to_course(&row)))
    }

    async fn find_course_by_code(&self, code: &str) -> AppResult<Option<Course>> {
        let sql = format!(
            "SELECT {} FROM courses WHERE UPPER(code) = UPPER($1)",
            COURSE_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to find course by code: {}", e)))?;

        Ok(row.map(|row| Self::row_to_course(&row)))
    }

    async fn find_courses(&self, filter: &CourseFilter) -> AppResult<Vec<Course>> {
        let mut conditions: Vec<String> = Vec::new();
        let mut binds: Vec<String> = Vec::new();

        if filter.active_only {
            conditions.push("active = TRUE".to_string());
        }
        if let Some(teacher_id) = &filter.teacher_id {
            binds.push(teacher_id.clone());
            conditions.push(format!("teacher_id = ${}", binds.len()));
        }
        if let Some(subject_id) = &filter.subject_id {
            binds.push(subject_id.clone());
            conditions.push(format!("subject_id = ${}", binds.len()));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };
        let sql = format!(
            "SELECT {} FROM courses{} ORDER BY code",
            COURSE_COLUMNS, where_clause
        );

        let mut query = sqlx::query(&sql);
        for bind in &binds {
            query = query.bind(bind);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::Database(format!("Failed to fetch courses: {}", e)))?;

        Ok(rows.iter().map(Self::row_to_course).collect())
    }

    async fn update_course(&self, id: &str, update: &CourseUpdate) -> AppResult<Option<Course>> {
        let Some(mut course) = self.find_course_by_id(id).await? else {
            return Ok(None);
        };
        course.apply(update);

        let (day, time, room) = schedule_columns(&course.schedule);

        let sql = "UPDATE courses SET title = $1, code = $2, description = $3, teacher_id = $4, subject_id = $5, schedule_day = $6, schedule_time = $7, schedule_room = $8, max_students = $9, active = $10, updated_at = $11 WHERE id = $12";
        sqlx::query(sql)
            .bind(&course.title)
            .bind(&course.code)
            .bind(&course.description)
            .bind(&course.teacher_id)
            .bind(&course.subject_id)
            .bind(day)
            .bind(time)
            .bind(room)
            .bind(course.max_students)
            .bind(course.is_active)
            .bind(course.updated_at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_database_error(e, "Failed to update course"))?;

        Ok(Some(course))
    }

    async fn deactivate_course(&self, id: &str) -> AppResult<Option<Course>> {
        let result =
            sqlx::query("UPDATE courses SET active = FALSE, updated_at = $1 WHERE id = $2")
                .bind(Utc::now())
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(|e| AppError::Database(format!("Failed to deactivate course: {}", e)))?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_course_by_id(id).await
    }
}

fn schedule_columns(
    schedule: &Option<Schedule>,
) -> (Option<String>, Option<String>, Option<String>) {
    match schedule {
        Some(s) => (
            s.day.map(|d| d.as_str().to_string()),
            s.time.clone(),
            s.room.clone(),
        ),
        None => (None, None, None),
    }
}
