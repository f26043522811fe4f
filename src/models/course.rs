// src/models/course.rs

use serde::{Deserialize, Serialize};

/// Read-side course summary. Owned by the course-authoring subsystem;
/// this service only consumes it for enrollment gating and progress
/// totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub title: String,
    pub published: bool,

    /// None means unlimited seats.
    pub capacity: Option<i64>,
    pub enrolled_count: i64,

    pub content_ids: Vec<i64>,
    pub assessment_ids: Vec<i64>,
}

/// Denominators for the weighted progress recompute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CourseTotals {
    pub content: usize,
    pub assessments: usize,
}

impl Course {
    pub fn totals(&self) -> CourseTotals {
        CourseTotals {
            content: self.content_ids.len(),
            assessments: self.assessment_ids.len(),
        }
    }

    pub fn has_content(&self, content_id: i64) -> bool {
        self.content_ids.contains(&content_id)
    }

    pub fn is_full(&self) -> bool {
        match self.capacity {
            Some(cap) => self.enrolled_count >= cap,
            None => false,
        }
    }
}
