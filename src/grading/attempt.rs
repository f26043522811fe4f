// src/grading/attempt.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::AppError;
use crate::grading::answer;
use crate::models::assessment::Assessment;
use crate::models::enrollment::{AssessmentProgress, AttemptRecord, Progress};
use crate::models::question::SubmittedAnswer;

/// Result of one graded submission, echoed back to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptOutcome {
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed: bool,
    pub attempt_number: u32,
}

/// Checks the availability window and the attempt limit for one
/// (enrollment, assessment) pair.
pub fn can_attempt(
    entry: Option<&AssessmentProgress>,
    assessment: &Assessment,
    now: DateTime<Utc>,
) -> Result<(), AppError> {
    if !assessment.is_available_at(now) {
        return Err(AppError::AssessmentUnavailable(
            "Assessment is not currently available".to_string(),
        ));
    }
    let prior_attempts = entry.map_or(0, |e| e.attempts.len());
    if prior_attempts as u32 >= assessment.max_attempts {
        return Err(AppError::AttemptLimitExceeded(format!(
            "Maximum of {} attempts reached",
            assessment.max_attempts
        )));
    }
    Ok(())
}

/// Grades a full submission and appends the attempt to the
/// enrollment's progress.
///
/// Unanswered questions contribute no points and no graded entry, but
/// their points still count toward `max_score`. The per-assessment
/// `passed` flag never reverts once set, even if a later attempt
/// fails.
pub fn record_attempt(
    progress: &mut Progress,
    assessment: &Assessment,
    answers: &HashMap<i64, SubmittedAnswer>,
    time_spent: Option<u32>,
    now: DateTime<Utc>,
) -> Result<AttemptOutcome, AppError> {
    can_attempt(progress.assessment_entry(assessment.id), assessment, now)?;

    let max_score = assessment.total_score();
    let mut score = 0u32;
    let mut graded = Vec::new();
    for question in &assessment.questions {
        let Some(submitted) = answers.get(&question.id) else {
            continue;
        };
        let result = answer::grade(question, submitted)?;
        score += result.earned_points;
        graded.push(result);
    }

    // An assessment with no point-bearing questions grades as 0%, not NaN.
    let percentage = if max_score == 0 {
        0
    } else {
        (score as f64 / max_score as f64 * 100.0).round() as u32
    };
    let passed = percentage >= assessment.passing_score;

    let entry = progress.ensure_assessment_entry(assessment.id, now);
    let attempt_number = entry.attempts.len() as u32 + 1;
    entry.attempts.push(AttemptRecord {
        attempt_number,
        score,
        max_score,
        percentage,
        passed,
        answers: graded,
        time_spent,
        submitted_at: now,
    });
    entry.best_score = entry.best_score.max(score);
    if passed {
        entry.passed = true;
    }
    entry.score = score;
    entry.max_score = max_score;
    entry.completed_at = now;
    progress.last_activity = Some(now);

    Ok(AttemptOutcome {
        score,
        max_score,
        percentage,
        passed,
        attempt_number,
    })
}
