// src/store/postgres.rs

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::types::Json;
use sqlx::{PgPool, Row};

use crate::error::AppError;
use crate::models::assessment::Assessment;
use crate::models::course::Course;
use crate::models::enrollment::{EnrollmentRecord, EnrollmentStatus, LetterGrade, Progress};
use crate::models::question::Question;
use crate::store::{AssessmentStore, CourseStore, EnrollmentStore};

/// Postgres-backed implementation of all three collaborator stores.
/// Question lists and the progress sub-document live in JSONB columns,
/// so each record loads and saves as one document.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn enrollment_from_row(row: &PgRow) -> Result<EnrollmentRecord, AppError> {
    let status: String = row.try_get("status")?;
    let status = EnrollmentStatus::parse(&status).ok_or_else(|| {
        AppError::InternalServerError(format!("Unknown enrollment status '{}'", status))
    })?;

    let grade: Option<String> = row.try_get("grade")?;
    let grade = match grade {
        Some(g) => Some(LetterGrade::parse(&g).ok_or_else(|| {
            AppError::InternalServerError(format!("Unknown letter grade '{}'", g))
        })?),
        None => None,
    };

    let Json(progress): Json<Progress> = row.try_get("progress")?;

    Ok(EnrollmentRecord {
        id: row.try_get("id")?,
        student_id: row.try_get("student_id")?,
        course_id: row.try_get("course_id")?,
        status,
        grade,
        enrolled_at: row.try_get("enrolled_at")?,
        completion_date: row.try_get("completion_date")?,
        progress,
        version: row.try_get("version")?,
    })
}

#[async_trait]
impl CourseStore for PgStore {
    async fn find_course(&self, id: i64) -> Result<Option<Course>, AppError> {
        let row = sqlx::query(
            "SELECT id, title, published, capacity, enrolled_count, content_ids
             FROM courses WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Json(content_ids): Json<Vec<i64>> = row.try_get("content_ids")?;
        let assessment_ids: Vec<i64> =
            sqlx::query_scalar("SELECT id FROM assessments WHERE course_id = $1 ORDER BY id")
                .bind(id)
                .fetch_all(&self.pool)
                .await?;

        Ok(Some(Course {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            published: row.try_get("published")?,
            capacity: row.try_get("capacity")?,
            enrolled_count: row.try_get("enrolled_count")?,
            content_ids,
            assessment_ids,
        }))
    }

    async fn adjust_enrolled_count(&self, id: i64, delta: i64) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE courses SET enrolled_count = GREATEST(0, enrolled_count + $2) WHERE id = $1",
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[async_trait]
impl AssessmentStore for PgStore {
    async fn find_assessment(&self, id: i64) -> Result<Option<Assessment>, AppError> {
        let row = sqlx::query(
            "SELECT id, course_id, title, questions, passing_score, max_attempts,
                    time_limit, published, start_date, end_date
             FROM assessments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let Json(questions): Json<Vec<Question>> = row.try_get("questions")?;
        let passing_score: i32 = row.try_get("passing_score")?;
        let max_attempts: i32 = row.try_get("max_attempts")?;
        let time_limit: Option<i32> = row.try_get("time_limit")?;

        Ok(Some(Assessment {
            id: row.try_get("id")?,
            course_id: row.try_get("course_id")?,
            title: row.try_get("title")?,
            questions,
            passing_score: passing_score.max(0) as u32,
            max_attempts: max_attempts.max(0) as u32,
            time_limit: time_limit.map(|t| t.max(0) as u32),
            published: row.try_get("published")?,
            start_date: row.try_get("start_date")?,
            end_date: row.try_get("end_date")?,
        }))
    }
}

#[async_trait]
impl EnrollmentStore for PgStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<EnrollmentRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, student_id, course_id, status, grade, enrolled_at,
                    completion_date, progress, version
             FROM enrollments WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(enrollment_from_row).transpose()
    }

    async fn find_by_student_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<EnrollmentRecord>, AppError> {
        let row = sqlx::query(
            "SELECT id, student_id, course_id, status, grade, enrolled_at,
                    completion_date, progress, version
             FROM enrollments WHERE student_id = $1 AND course_id = $2",
        )
        .bind(student_id)
        .bind(course_id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(enrollment_from_row).transpose()
    }

    async fn insert(&self, mut record: EnrollmentRecord) -> Result<EnrollmentRecord, AppError> {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO enrollments
                 (student_id, course_id, status, grade, enrolled_at, completion_date, progress, version)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING id",
        )
        .bind(record.student_id)
        .bind(record.course_id)
        .bind(record.status.as_str())
        .bind(record.grade.map(|g| g.as_str()))
        .bind(record.enrolled_at)
        .bind(record.completion_date)
        .bind(Json(&record.progress))
        .bind(record.version)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Postgres error code for unique violation is 23505
            if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
                AppError::Conflict("Already enrolled in this course".to_string())
            } else {
                tracing::error!("Failed to insert enrollment: {:?}", e);
                AppError::from(e)
            }
        })?;

        record.id = id;
        Ok(record)
    }

    async fn save(&self, record: &mut EnrollmentRecord) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE enrollments
             SET status = $1, grade = $2, completion_date = $3, progress = $4,
                 version = version + 1
             WHERE id = $5 AND version = $6",
        )
        .bind(record.status.as_str())
        .bind(record.grade.map(|g| g.as_str()))
        .bind(record.completion_date)
        .bind(Json(&record.progress))
        .bind(record.id)
        .bind(record.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::Conflict(
                "Enrollment was modified concurrently, retry the request".to_string(),
            ));
        }
        record.version += 1;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM enrollments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
