// src/store/memory.rs

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::AppError;
use crate::models::assessment::Assessment;
use crate::models::course::Course;
use crate::models::enrollment::EnrollmentRecord;
use crate::store::{AssessmentStore, CourseStore, EnrollmentStore};

/// In-memory implementation of the collaborator stores, with the same
/// optimistic-versioning semantics as the Postgres one. Used by the
/// integration tests and for running the service without a database.
pub struct MemoryStore {
    courses: RwLock<HashMap<i64, Course>>,
    assessments: RwLock<HashMap<i64, Assessment>>,
    enrollments: RwLock<HashMap<i64, EnrollmentRecord>>,
    next_enrollment_id: AtomicI64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            courses: RwLock::new(HashMap::new()),
            assessments: RwLock::new(HashMap::new()),
            enrollments: RwLock::new(HashMap::new()),
            next_enrollment_id: AtomicI64::new(1),
        }
    }

    pub async fn insert_course(&self, course: Course) {
        self.courses.write().await.insert(course.id, course);
    }

    pub async fn insert_assessment(&self, assessment: Assessment) {
        self.assessments
            .write()
            .await
            .insert(assessment.id, assessment);
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CourseStore for MemoryStore {
    async fn find_course(&self, id: i64) -> Result<Option<Course>, AppError> {
        Ok(self.courses.read().await.get(&id).cloned())
    }

    async fn adjust_enrolled_count(&self, id: i64, delta: i64) -> Result<(), AppError> {
        if let Some(course) = self.courses.write().await.get_mut(&id) {
            course.enrolled_count = (course.enrolled_count + delta).max(0);
        }
        Ok(())
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    async fn find_assessment(&self, id: i64) -> Result<Option<Assessment>, AppError> {
        Ok(self.assessments.read().await.get(&id).cloned())
    }
}

#[async_trait]
impl EnrollmentStore for MemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<EnrollmentRecord>, AppError> {
        Ok(self.enrollments.read().await.get(&id).cloned())
    }

    async fn find_by_student_course(
        &self,
        student_id: i64,
        course_id: i64,
    ) -> Result<Option<EnrollmentRecord>, AppError> {
        Ok(self
            .enrollments
            .read()
            .await
            .values()
            .find(|r| r.student_id == student_id && r.course_id == course_id)
            .cloned())
    }

    async fn insert(&self, mut record: EnrollmentRecord) -> Result<EnrollmentRecord, AppError> {
        let mut enrollments = self.enrollments.write().await;
        let duplicate = enrollments
            .values()
            .any(|r| r.student_id == record.student_id && r.course_id == record.course_id);
        if duplicate {
            return Err(AppError::Conflict(
                "Already enrolled in this course".to_string(),
            ));
        }
        record.id = self.next_enrollment_id.fetch_add(1, Ordering::Relaxed);
        record.version = 1;
        enrollments.insert(record.id, record.clone());
        Ok(record)
    }

    async fn save(&self, record: &mut EnrollmentRecord) -> Result<(), AppError> {
        let mut enrollments = self.enrollments.write().await;
        let stored = enrollments
            .get(&record.id)
            .ok_or_else(|| AppError::NotFound("Enrollment not found".to_string()))?;
        if stored.version != record.version {
            return Err(AppError::Conflict(
                "Enrollment was modified concurrently, retry the request".to_string(),
            ));
        }
        record.version += 1;
        enrollments.insert(record.id, record.clone());
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), AppError> {
        self.enrollments.write().await.remove(&id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn save_rejects_stale_versions() {
        let store = MemoryStore::new();
        let record = EnrollmentRecord::new(1, 1, Utc::now());
        let inserted = store.insert(record).await.unwrap();

        // Two readers load the same version.
        let mut first = store.find_by_id(inserted.id).await.unwrap().unwrap();
        let mut second = store.find_by_id(inserted.id).await.unwrap().unwrap();

        store.save(&mut first).await.unwrap();
        let stale = store.save(&mut second).await;
        assert!(matches!(stale, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn duplicate_enrollment_conflicts() {
        let store = MemoryStore::new();
        store
            .insert(EnrollmentRecord::new(1, 1, Utc::now()))
            .await
            .unwrap();
        let dup = store.insert(EnrollmentRecord::new(1, 1, Utc::now())).await;
        assert!(matches!(dup, Err(AppError::Conflict(_))));
    }
}
