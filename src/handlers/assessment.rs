// src/handlers/assessment.rs

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::AppError,
    grading::{attempt, progress},
    models::enrollment::EnrollmentStatus,
    models::question::SubmittedAnswer,
    state::AppState,
    utils::jwt::Claims,
};

/// Returns the assessment with answer keys stripped.
/// Only students enrolled in the owning course may fetch it.
pub async fn get_assessment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(assessment_id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let assessment = state
        .assessments
        .find_assessment(assessment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;

    if !claims.is_staff() {
        state
            .enrollments
            .find_by_student_course(claims.user_id(), assessment.course_id)
            .await?
            .ok_or_else(|| {
                AppError::NotEnrolled("Not enrolled in this assessment's course".to_string())
            })?;
    }

    Ok(Json(assessment.view()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAssessmentRequest {
    #[validate(length(min = 1, message = "No answers submitted"))]
    pub answers: Vec<AnswerPayload>,
    /// Seconds the student spent, self-reported by the client.
    pub time_spent: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnswerPayload {
    pub question_id: i64,
    pub answer: SubmittedAnswer,
}

/// Submits a graded attempt.
///
/// Checks enrollment and attempt eligibility, grades every answer,
/// appends the attempt to the enrollment's progress, recomputes the
/// overall completion and saves the record with a version check.
/// Either the whole update commits or nothing does.
pub async fn submit_assessment(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(assessment_id): Path<i64>,
    Json(req): Json<SubmitAssessmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = req.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let assessment = state
        .assessments
        .find_assessment(assessment_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Assessment not found".to_string()))?;

    let mut record = state
        .enrollments
        .find_by_student_course(claims.user_id(), assessment.course_id)
        .await?
        .ok_or_else(|| {
            AppError::NotEnrolled("Not enrolled in this assessment's course".to_string())
        })?;

    if record.status != EnrollmentStatus::Active {
        return Err(AppError::Forbidden(format!(
            "Enrollment is '{}', not active",
            record.status.as_str()
        )));
    }

    let answers: HashMap<i64, SubmittedAnswer> = req
        .answers
        .into_iter()
        .map(|a| (a.question_id, a.answer))
        .collect();

    let now = Utc::now();
    let outcome = attempt::record_attempt(
        &mut record.progress,
        &assessment,
        &answers,
        req.time_spent,
        now,
    )?;

    if let Some(course) = state.courses.find_course(assessment.course_id).await? {
        progress::recompute(&mut record.progress, &course.totals());
    }

    state.enrollments.save(&mut record).await?;

    tracing::info!(
        "Attempt {} on assessment {} by student {}: {}/{} ({}%)",
        outcome.attempt_number,
        assessment.id,
        record.student_id,
        outcome.score,
        outcome.max_score,
        outcome.percentage
    );
    Ok(Json(outcome))
}
