// src/models/assessment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::question::{Question, QuestionView};

/// A graded unit attached to a course. Questions are embedded so the
/// whole answer key loads in one fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub questions: Vec<Question>,

    /// Percentage threshold (0-100) a single attempt must reach to pass.
    pub passing_score: u32,

    /// Cap on submission attempts per student.
    pub max_attempts: u32,

    /// Minutes, informational for the client-side timer.
    pub time_limit: Option<u32>,

    pub published: bool,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl Assessment {
    /// Sum of all question points.
    pub fn total_score(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    /// Available iff published and `now` falls inside the window.
    pub fn is_available_at(&self, now: DateTime<Utc>) -> bool {
        if !self.published {
            return false;
        }
        if let Some(start) = self.start_date {
            if now < start {
                return false;
            }
        }
        if let Some(end) = self.end_date {
            if now > end {
                return false;
            }
        }
        true
    }

    pub fn view(&self) -> AssessmentView {
        AssessmentView {
            id: self.id,
            course_id: self.course_id,
            title: self.title.clone(),
            passing_score: self.passing_score,
            max_attempts: self.max_attempts,
            time_limit: self.time_limit,
            total_score: self.total_score(),
            questions: self.questions.iter().map(Question::view).collect(),
        }
    }
}

/// DTO sent to enrolled students (answer keys stripped).
#[derive(Debug, Serialize)]
pub struct AssessmentView {
    pub id: i64,
    pub course_id: i64,
    pub title: String,
    pub passing_score: u32,
    pub max_attempts: u32,
    pub time_limit: Option<u32>,
    pub total_score: u32,
    pub questions: Vec<QuestionView>,
}
