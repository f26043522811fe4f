// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::store::{AssessmentStore, CourseStore, EnrollmentStore};

/// Shared application state: the injected collaborator stores plus
/// configuration.
#[derive(Clone)]
pub struct AppState {
    pub courses: Arc<dyn CourseStore>,
    pub assessments: Arc<dyn AssessmentStore>,
    pub enrollments: Arc<dyn EnrollmentStore>,
    pub config: Config,
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}
