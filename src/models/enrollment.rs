// src/models/enrollment.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::question::SubmittedAnswer;

/// One student's relationship to one course, unique per
/// (student, course) pair. Exclusively owns its progress sub-document;
/// nothing else mutates it directly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrollmentRecord {
    pub id: i64,
    pub student_id: i64,
    pub course_id: i64,
    pub status: EnrollmentStatus,

    /// Letter grade, set only by the explicit Completed transition.
    pub grade: Option<LetterGrade>,

    pub enrolled_at: DateTime<Utc>,
    pub completion_date: Option<DateTime<Utc>>,

    pub progress: Progress,

    /// Bumped on every successful save; guards the read-modify-write
    /// cycle against lost updates.
    pub version: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnrollmentStatus {
    Active,
    Completed,
    Dropped,
    Suspended,
}

impl EnrollmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnrollmentStatus::Active => "active",
            EnrollmentStatus::Completed => "completed",
            EnrollmentStatus::Dropped => "dropped",
            EnrollmentStatus::Suspended => "suspended",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(EnrollmentStatus::Active),
            "completed" => Some(EnrollmentStatus::Completed),
            "dropped" => Some(EnrollmentStatus::Dropped),
            "suspended" => Some(EnrollmentStatus::Suspended),
            _ => None,
        }
    }

    /// Completed and Dropped are terminal; re-taking a course goes
    /// through unenroll + re-enroll instead.
    pub fn can_transition(self, next: EnrollmentStatus) -> bool {
        use EnrollmentStatus::*;
        matches!(
            (self, next),
            (Active, Completed)
                | (Active, Dropped)
                | (Active, Suspended)
                | (Suspended, Active)
                | (Suspended, Dropped)
        )
    }
}

/// Letter grade with the standard percentage cutoffs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LetterGrade {
    #[serde(rename = "A+")]
    APlus,
    #[serde(rename = "A")]
    A,
    #[serde(rename = "A-")]
    AMinus,
    #[serde(rename = "B+")]
    BPlus,
    #[serde(rename = "B")]
    B,
    #[serde(rename = "B-")]
    BMinus,
    #[serde(rename = "C+")]
    CPlus,
    #[serde(rename = "C")]
    C,
    #[serde(rename = "C-")]
    CMinus,
    #[serde(rename = "D+")]
    DPlus,
    #[serde(rename = "D")]
    D,
    #[serde(rename = "F")]
    F,
}

impl LetterGrade {
    pub fn from_percentage(pct: f64) -> Self {
        match pct {
            p if p >= 97.0 => LetterGrade::APlus,
            p if p >= 93.0 => LetterGrade::A,
            p if p >= 90.0 => LetterGrade::AMinus,
            p if p >= 87.0 => LetterGrade::BPlus,
            p if p >= 83.0 => LetterGrade::B,
            p if p >= 80.0 => LetterGrade::BMinus,
            p if p >= 77.0 => LetterGrade::CPlus,
            p if p >= 73.0 => LetterGrade::C,
            p if p >= 70.0 => LetterGrade::CMinus,
            p if p >= 67.0 => LetterGrade::DPlus,
            p if p >= 63.0 => LetterGrade::D,
            _ => LetterGrade::F,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LetterGrade::APlus => "A+",
            LetterGrade::A => "A",
            LetterGrade::AMinus => "A-",
            LetterGrade::BPlus => "B+",
            LetterGrade::B => "B",
            LetterGrade::BMinus => "B-",
            LetterGrade::CPlus => "C+",
            LetterGrade::C => "C",
            LetterGrade::CMinus => "C-",
            LetterGrade::DPlus => "D+",
            LetterGrade::D => "D",
            LetterGrade::F => "F",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "A+" => Some(LetterGrade::APlus),
            "A" => Some(LetterGrade::A),
            "A-" => Some(LetterGrade::AMinus),
            "B+" => Some(LetterGrade::BPlus),
            "B" => Some(LetterGrade::B),
            "B-" => Some(LetterGrade::BMinus),
            "C+" => Some(LetterGrade::CPlus),
            "C" => Some(LetterGrade::C),
            "C-" => Some(LetterGrade::CMinus),
            "D+" => Some(LetterGrade::DPlus),
            "D" => Some(LetterGrade::D),
            "F" => Some(LetterGrade::F),
            _ => None,
        }
    }
}

/// The progress sub-document stored inside the enrollment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Progress {
    #[serde(default)]
    pub completed_content: Vec<ContentCompletion>,
    #[serde(default)]
    pub completed_assessments: Vec<AssessmentProgress>,
    /// Weighted completion percentage, 0-100.
    #[serde(default)]
    pub overall_progress: u8,
    #[serde(default)]
    pub last_activity: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentCompletion {
    pub content_id: i64,
    pub completed_at: DateTime<Utc>,
    pub time_spent: Option<u32>,
}

/// One entry per assessment ever attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentProgress {
    pub assessment_id: i64,
    /// Ordered, append-only.
    pub attempts: Vec<AttemptRecord>,
    /// Max score across attempts.
    pub best_score: u32,
    /// Monotonic: stays true once any attempt clears the passing score.
    pub passed: bool,
    /// Latest attempt's values.
    pub score: u32,
    pub max_score: u32,
    pub completed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptRecord {
    pub attempt_number: u32,
    pub score: u32,
    pub max_score: u32,
    pub percentage: u32,
    pub passed: bool,
    pub answers: Vec<GradedAnswer>,
    pub time_spent: Option<u32>,
    pub submitted_at: DateTime<Utc>,
}

/// Per-question grading result kept inside an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradedAnswer {
    pub question_id: i64,
    pub answer: SubmittedAnswer,
    pub is_correct: bool,
    pub earned_points: u32,
}

impl Progress {
    pub fn assessment_entry(&self, assessment_id: i64) -> Option<&AssessmentProgress> {
        self.completed_assessments
            .iter()
            .find(|e| e.assessment_id == assessment_id)
    }

    /// Existing entry for the assessment, or a fresh one appended to
    /// the list.
    pub fn ensure_assessment_entry(
        &mut self,
        assessment_id: i64,
        now: DateTime<Utc>,
    ) -> &mut AssessmentProgress {
        let idx = match self
            .completed_assessments
            .iter()
            .position(|e| e.assessment_id == assessment_id)
        {
            Some(i) => i,
            None => {
                self.completed_assessments.push(AssessmentProgress {
                    assessment_id,
                    attempts: Vec::new(),
                    best_score: 0,
                    passed: false,
                    score: 0,
                    max_score: 0,
                    completed_at: now,
                });
                self.completed_assessments.len() - 1
            }
        };
        &mut self.completed_assessments[idx]
    }

    pub fn has_completed_content(&self, content_id: i64) -> bool {
        self.completed_content
            .iter()
            .any(|c| c.content_id == content_id)
    }

    /// Counts assessments whose `passed` flag is set, not merely
    /// attempted ones.
    pub fn passed_assessment_count(&self) -> usize {
        self.completed_assessments.iter().filter(|e| e.passed).count()
    }
}

impl EnrollmentRecord {
    /// Fresh active record; the store assigns the id on insert.
    pub fn new(student_id: i64, course_id: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: 0,
            student_id,
            course_id,
            status: EnrollmentStatus::Active,
            grade: None,
            enrolled_at: now,
            completion_date: None,
            progress: Progress::default(),
            version: 1,
        }
    }

    /// Derived check; deliberately independent of `status`, which only
    /// becomes Completed via the explicit transition.
    pub fn is_completed(&self) -> bool {
        self.progress.overall_progress >= 100
    }

    /// Explicit status transition. Entering Completed stamps the
    /// completion date and finalizes the letter grade.
    pub fn transition(
        &mut self,
        next: EnrollmentStatus,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        if !self.status.can_transition(next) {
            return Err(AppError::Conflict(format!(
                "Cannot transition enrollment from '{}' to '{}'",
                self.status.as_str(),
                next.as_str()
            )));
        }
        if next == EnrollmentStatus::Completed {
            self.completion_date = Some(now);
            self.grade = self.final_grade();
        }
        self.status = next;
        Ok(())
    }

    /// Weighted average over ALL attempted assessments (passed or not):
    /// sum of best scores over sum of max scores. None when nothing was
    /// attempted or no assessment carried points.
    pub fn final_grade(&self) -> Option<LetterGrade> {
        let entries = &self.progress.completed_assessments;
        if entries.is_empty() {
            return None;
        }
        let max: u32 = entries.iter().map(|e| e.max_score).sum();
        if max == 0 {
            return None;
        }
        let best: u32 = entries.iter().map(|e| e.best_score).sum();
        Some(LetterGrade::from_percentage(best as f64 / max as f64 * 100.0))
    }
}
