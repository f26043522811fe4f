// src/store/mod.rs

use async_trait::async_trait;

use crate::error::AppError;
use crate::models::assessment::Assessment;
use crate::models::course::Course;
use crate::models::enrollment::EnrollmentRecord;

pub mod memory;
pub mod postgres;

/// Read-side course catalog, owned by the course-authoring subsystem.
#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn find_course(&self, id: i64) -> Result<Option<Course>, AppError>;

    /// Adjusts the enrolled counter by `delta`, clamped at zero.
    async fn adjust_enrolled_count(&self, id: i64, delta: i64) -> Result<(), AppError>;
}

/// Answer keys, attempt limits and availability windows.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    async fn find_assessment(&self, id: i64) -> Result<Option<Assessment>, AppError>;
}

/// Enrollment persistence. The record is the unit of atomicity: every
/// update is one load, a pure transform, and one optimistic save.
#[async_trait]
pub trait EnrollmentStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Option<EnrollmentRecord>, AppError>;

    async fn find_by_student_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<EnrollmentRecord>, AppError>;

    /// Inserts a fresh record and returns it with its assigned id.
    /// Conflict when the (student, course) pair already exists.
    async fn insert(&self, record: EnrollmentRecord) -> Result<EnrollmentRecord, AppError>;

    /// Optimistic write: fails with Conflict when the stored version
    /// has moved since the record was loaded. Bumps `record.version`
    /// on success.
    async fn save(&self, record: &mut EnrollmentRecord) -> Result<(), AppError>;

    async fn delete(&self, id: i64) -> Result<(), AppError>;
}
