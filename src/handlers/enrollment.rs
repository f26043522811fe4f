// src/handlers/enrollment.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    error::AppError,
    models::enrollment::{EnrollmentRecord, EnrollmentStatus},
    state::AppState,
    utils::jwt::Claims,
};

/// Enrolls the caller in a course.
///
/// One record per (student, course) pair; a second enrollment returns
/// 409. Increments the course's enrolled counter.
pub async fn enroll(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id();

    let course = state
        .courses
        .find_course(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    if !course.published {
        return Err(AppError::NotFound("Course not found".to_string()));
    }
    if course.is_full() {
        return Err(AppError::Conflict("Course is at capacity".to_string()));
    }

    let record = EnrollmentRecord::new(student_id, course_id, Utc::now());
    let record = state.enrollments.insert(record).await?;
    state.courses.adjust_enrolled_count(course_id, 1).await?;

    tracing::info!("Student {} enrolled in course {}", student_id, course_id);
    Ok((StatusCode::CREATED, Json(record)))
}

/// Removes the caller's enrollment and decrements the course counter.
pub async fn unenroll(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let student_id = claims.user_id();

    let record = state
        .enrollments
        .find_by_student_course(student_id, course_id)
        .await?
        .ok_or_else(|| AppError::NotEnrolled("Not enrolled in this course".to_string()))?;

    state.enrollments.delete(record.id).await?;
    state.courses.adjust_enrolled_count(course_id, -1).await?;

    tracing::info!("Student {} unenrolled from course {}", student_id, course_id);
    Ok(StatusCode::NO_CONTENT)
}

/// Fetches one enrollment record. Owner or staff only.
pub async fn get_enrollment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(enrollment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .enrollments
        .find_by_id(enrollment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

    if record.student_id != claims.user_id() && !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Not allowed to view this enrollment".to_string(),
        ));
    }

    Ok(Json(record))
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: EnrollmentStatus,
}

/// Explicit status transition. Students may drop their own
/// enrollment; staff may perform any guarded transition. Entering
/// Completed finalizes the letter grade.
pub async fn update_status(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(enrollment_id): Path<i64>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut record = state
        .enrollments
        .find_by_id(enrollment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

    let is_owner = record.student_id == claims.user_id();
    if !is_owner && !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Not allowed to modify this enrollment".to_string(),
        ));
    }
    if !claims.is_staff() && req.status != EnrollmentStatus::Dropped {
        return Err(AppError::Forbidden(
            "Students may only drop their own enrollment".to_string(),
        ));
    }

    record.transition(req.status, Utc::now())?;
    state.enrollments.save(&mut record).await?;

    tracing::info!(
        "Enrollment {} transitioned to '{}'",
        record.id,
        record.status.as_str()
    );
    Ok(Json(record))
}
