// src/handlers/progress.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::{
    error::AppError,
    grading::progress,
    models::enrollment::{AssessmentProgress, ContentCompletion, EnrollmentStatus},
    state::AppState,
    utils::jwt::Claims,
};

/// Returns the caller's progress sub-document for one course.
pub async fn get_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(course_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let record = state
        .enrollments
        .find_by_student_course(claims.user_id(), course_id)
        .await?
        .ok_or_else(|| AppError::NotEnrolled("Not enrolled in this course".to_string()))?;

    Ok(Json(record.progress))
}

#[derive(Debug, Deserialize)]
pub struct CompleteContentRequest {
    /// Seconds spent on the content item, self-reported.
    pub time_spent: Option<u32>,
}

/// Marks one content item complete for the caller.
/// Duplicate completions return 409 rather than merging silently.
pub async fn complete_content(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((course_id, content_id)): Path<(i64, i64)>,
    Json(req): Json<CompleteContentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let course = state
        .courses
        .find_course(course_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Course not found".to_string()))?;
    if !course.has_content(content_id) {
        return Err(AppError::NotFound(
            "Content not found in this course".to_string(),
        ));
    }

    let mut record = state
        .enrollments
        .find_by_student_course(claims.user_id(), course_id)
        .await?
        .ok_or_else(|| AppError::NotEnrolled("Not enrolled in this course".to_string()))?;

    if record.status != EnrollmentStatus::Active {
        return Err(AppError::Forbidden(format!(
            "Enrollment is '{}', not active",
            record.status.as_str()
        )));
    }

    progress::mark_content_complete(
        &mut record.progress,
        content_id,
        req.time_spent,
        &course.totals(),
        Utc::now(),
    )?;
    state.enrollments.save(&mut record).await?;

    Ok(Json(record.progress))
}

#[derive(Debug, Deserialize, Validate)]
pub struct OverrideProgressRequest {
    /// Explicit overall value from a trusted upstream computation;
    /// wins over the recompute when present.
    #[validate(range(max = 100))]
    pub progress: Option<u8>,
    pub completed_content: Option<Vec<ContentCompletion>>,
    pub completed_assessments: Option<Vec<AssessmentProgress>>,
}

/// Staff-only trusted overwrite of the progress sub-document.
/// Provided lists replace the stored ones wholesale; without an
/// explicit overall value the percentage is recomputed from course
/// totals.
pub async fn override_progress(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(enrollment_id): Path<i64>,
    Json(req): Json<OverrideProgressRequest>,
) -> Result<impl IntoResponse, AppError> {
    if !claims.is_staff() {
        return Err(AppError::Forbidden(
            "Only staff may overwrite progress".to_string(),
        ));
    }
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut record = state
        .enrollments
        .find_by_id(enrollment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;

    if let Some(content) = req.completed_content {
        record.progress.completed_content = content;
    }
    if let Some(assessments) = req.completed_assessments {
        record.progress.completed_assessments = assessments;
    }

    match req.progress {
        Some(value) => {
            progress::apply_override(&mut record.progress, value);
        }
        None => {
            if let Some(course) = state.courses.find_course(record.course_id).await? {
                progress::recompute(&mut record.progress, &course.totals());
            }
        }
    }
    record.progress.last_activity = Some(Utc::now());

    state.enrollments.save(&mut record).await?;

    tracing::info!(
        "Progress for enrollment {} overwritten by user {}",
        record.id,
        claims.user_id()
    );
    Ok(Json(record.progress))
}
