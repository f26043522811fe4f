// src/grading/progress.rs

use chrono::{DateTime, Utc};

use crate::error::AppError;
use crate::models::course::CourseTotals;
use crate::models::enrollment::{ContentCompletion, Progress};

/// Weighting of the two completion components, in percent.
const CONTENT_WEIGHT: f64 = 70.0;
const ASSESSMENT_WEIGHT: f64 = 30.0;

/// Recomputes the weighted overall completion percentage.
///
/// Content completion counts for 70%, passed assessments for 30%.
/// When both totals are zero the course structure was not loaded, so
/// the stored value is kept rather than reset.
pub fn recompute(progress: &mut Progress, totals: &CourseTotals) -> u8 {
    if totals.content == 0 && totals.assessments == 0 {
        return progress.overall_progress;
    }

    let content_fraction = if totals.content == 0 {
        0.0
    } else {
        progress.completed_content.len() as f64 / totals.content as f64
    };
    let assessment_fraction = if totals.assessments == 0 {
        0.0
    } else {
        progress.passed_assessment_count() as f64 / totals.assessments as f64
    };

    let overall =
        (content_fraction * CONTENT_WEIGHT + assessment_fraction * ASSESSMENT_WEIGHT).round();
    progress.overall_progress = (overall as u8).min(100);
    progress.overall_progress
}

/// Applies an explicit progress value from a trusted upstream
/// computation. Always wins over a recompute in the same update.
pub fn apply_override(progress: &mut Progress, value: u8) -> u8 {
    progress.overall_progress = value.min(100);
    progress.overall_progress
}

/// Marks one content item complete and recomputes. A second completion
/// of the same id is rejected, not silently merged.
pub fn mark_content_complete(
    progress: &mut Progress,
    content_id: i64,
    time_spent: Option<u32>,
    totals: &CourseTotals,
    now: DateTime<Utc>,
) -> Result<u8, AppError> {
    if progress.has_completed_content(content_id) {
        return Err(AppError::AlreadyCompleted(format!(
            "Content {} is already completed",
            content_id
        )));
    }
    progress.completed_content.push(ContentCompletion {
        content_id,
        completed_at: now,
        time_spent,
    });
    progress.last_activity = Some(now);
    Ok(recompute(progress, totals))
}
