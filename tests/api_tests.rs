// tests/api_tests.rs

use std::sync::Arc;

use lms_backend::config::Config;
use lms_backend::models::assessment::Assessment;
use lms_backend::models::course::Course;
use lms_backend::models::question::{AnswerKey, ChoiceOption, Question};
use lms_backend::routes;
use lms_backend::state::AppState;
use lms_backend::store::memory::MemoryStore;
use lms_backend::utils::jwt::sign_jwt;

const JWT_SECRET: &str = "test_secret_for_integration_tests";

fn mc_question(id: i64, points: u32, correct: &str, wrong: &str) -> Question {
    Question {
        id,
        prompt: format!("Question {}", id),
        points,
        key: AnswerKey::MultipleChoice {
            options: vec![
                ChoiceOption {
                    text: correct.to_string(),
                    is_correct: true,
                },
                ChoiceOption {
                    text: wrong.to_string(),
                    is_correct: false,
                },
            ],
        },
    }
}

/// Seeds one published course (2 content items, 1 assessment with two
/// 10-point questions, passing score 70) into a fresh in-memory store.
async fn seed_store(max_attempts: u32) -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .insert_course(Course {
            id: 1,
            title: "Intro to Testing".to_string(),
            published: true,
            capacity: None,
            enrolled_count: 0,
            content_ids: vec![101, 102],
            assessment_ids: vec![10],
        })
        .await;
    store
        .insert_assessment(Assessment {
            id: 10,
            course_id: 1,
            title: "Module Quiz".to_string(),
            questions: vec![mc_question(1, 10, "A", "B"), mc_question(2, 10, "C", "D")],
            passing_score: 70,
            max_attempts,
            time_limit: None,
            published: true,
            start_date: None,
            end_date: None,
        })
        .await;
    store
}

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
async fn spawn_app(store: Arc<MemoryStore>) -> String {
    let config = Config {
        database_url: String::new(),
        jwt_secret: JWT_SECRET.to_string(),
        rust_log: "error".to_string(),
    };

    let state = AppState {
        courses: store.clone(),
        assessments: store.clone(),
        enrollments: store,
        config,
    };

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

fn student_token(id: i64) -> String {
    sign_jwt(id, "student", JWT_SECRET, 600).unwrap()
}

fn instructor_token(id: i64) -> String {
    sign_jwt(id, "instructor", JWT_SECRET, 600).unwrap()
}

#[tokio::test]
async fn requests_require_a_token() {
    let address = spawn_app(seed_store(3).await).await;
    let client = reqwest::Client::new();

    let response = client
        .get(format!("{}/api/courses/1/progress", address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn full_course_flow() {
    let address = spawn_app(seed_store(3).await).await;
    let client = reqwest::Client::new();
    let token = student_token(7);

    // Enroll
    let response = client
        .post(format!("{}/api/courses/1/enroll", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 201);

    // Complete both content items
    for content_id in [101, 102] {
        let response = client
            .post(format!(
                "{}/api/courses/1/content/{}/complete",
                address, content_id
            ))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "time_spent": 300 }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), 200);
    }

    // Re-completing the same content is rejected
    let response = client
        .post(format!("{}/api/courses/1/content/102/complete", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 409);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "already_completed");

    // Submit with one correct, one incorrect answer
    let response = client
        .post(format!("{}/api/assessments/10/submit", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "answers": [
                { "question_id": 1, "answer": "A" },
                { "question_id": 2, "answer": "D" }
            ],
            "time_spent": 120
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let outcome: serde_json::Value = response.json().await.unwrap();
    assert_eq!(outcome["score"], 10);
    assert_eq!(outcome["max_score"], 20);
    assert_eq!(outcome["percentage"], 50);
    assert_eq!(outcome["passed"], false);
    assert_eq!(outcome["attempt_number"], 1);

    // All content done, assessment not passed: round(100*0.7 + 0*0.3) = 70
    let response = client
        .get(format!("{}/api/courses/1/progress", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
    let progress: serde_json::Value = response.json().await.unwrap();
    assert_eq!(progress["overall_progress"], 70);
    assert_eq!(progress["completed_content"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn duplicate_enrollment_conflicts() {
    let address = spawn_app(seed_store(3).await).await;
    let client = reqwest::Client::new();
    let token = student_token(7);

    let first = client
        .post(format!("{}/api/courses/1/enroll", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(first.status().as_u16(), 201);

    let second = client
        .post(format!("{}/api/courses/1/enroll", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn unenroll_releases_the_seat() {
    let store = seed_store(3).await;
    let address = spawn_app(store.clone()).await;
    let client = reqwest::Client::new();
    let token = student_token(7);

    client
        .post(format!("{}/api/courses/1/enroll", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let response = client
        .delete(format!("{}/api/courses/1/enroll", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 204);

    use lms_backend::store::CourseStore;
    let course = store.find_course(1).await.unwrap().unwrap();
    assert_eq!(course.enrolled_count, 0);
}

#[tokio::test]
async fn attempt_limit_is_enforced_over_http() {
    let address = spawn_app(seed_store(2).await).await;
    let client = reqwest::Client::new();
    let token = student_token(7);

    client
        .post(format!("{}/api/courses/1/enroll", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let submission = serde_json::json!({
        "answers": [{ "question_id": 1, "answer": "A" }]
    });

    for expected in [200, 200, 403] {
        let response = client
            .post(format!("{}/api/assessments/10/submit", address))
            .bearer_auth(&token)
            .json(&submission)
            .send()
            .await
            .unwrap();
        assert_eq!(response.status().as_u16(), expected);
    }
}

#[tokio::test]
async fn submission_requires_enrollment() {
    let address = spawn_app(seed_store(3).await).await;
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/assessments/10/submit", address))
        .bearer_auth(student_token(99))
        .json(&serde_json::json!({
            "answers": [{ "question_id": 1, "answer": "A" }]
        }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 403);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["kind"], "not_enrolled");
}

#[tokio::test]
async fn assessment_view_hides_answer_keys() {
    let address = spawn_app(seed_store(3).await).await;
    let client = reqwest::Client::new();
    let token = student_token(7);

    client
        .post(format!("{}/api/courses/1/enroll", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();

    let response = client
        .get(format!("{}/api/assessments/10", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);

    let view: serde_json::Value = response.json().await.unwrap();
    assert_eq!(view["total_score"], 20);
    let question = &view["questions"][0];
    assert_eq!(question["type"], "multiple-choice");
    assert_eq!(question["options"], serde_json::json!(["A", "B"]));
    assert!(question.get("correct_answer").is_none());
    assert!(question["options"][0].is_string(), "is_correct must not leak");
}

#[tokio::test]
async fn staff_can_override_progress_students_cannot() {
    let address = spawn_app(seed_store(3).await).await;
    let client = reqwest::Client::new();
    let token = student_token(7);

    let response = client
        .post(format!("{}/api/courses/1/enroll", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let record: serde_json::Value = response.json().await.unwrap();
    let enrollment_id = record["id"].as_i64().unwrap();

    let denied = client
        .put(format!("{}/api/enrollments/{}/progress", address, enrollment_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "progress": 55 }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 403);

    let allowed = client
        .put(format!("{}/api/enrollments/{}/progress", address, enrollment_id))
        .bearer_auth(instructor_token(2))
        .json(&serde_json::json!({ "progress": 55 }))
        .send()
        .await
        .unwrap();
    assert_eq!(allowed.status().as_u16(), 200);
    let progress: serde_json::Value = allowed.json().await.unwrap();
    assert_eq!(progress["overall_progress"], 55);
}

#[tokio::test]
async fn completion_transition_finalizes_the_grade() {
    let address = spawn_app(seed_store(3).await).await;
    let client = reqwest::Client::new();
    let token = student_token(7);

    let response = client
        .post(format!("{}/api/courses/1/enroll", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let record: serde_json::Value = response.json().await.unwrap();
    let enrollment_id = record["id"].as_i64().unwrap();

    // Perfect attempt: 20/20.
    client
        .post(format!("{}/api/assessments/10/submit", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "answers": [
                { "question_id": 1, "answer": "A" },
                { "question_id": 2, "answer": "C" }
            ]
        }))
        .send()
        .await
        .unwrap();

    // Students may not complete their own enrollment.
    let denied = client
        .put(format!("{}/api/enrollments/{}/status", address, enrollment_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(denied.status().as_u16(), 403);

    let completed = client
        .put(format!("{}/api/enrollments/{}/status", address, enrollment_id))
        .bearer_auth(instructor_token(2))
        .json(&serde_json::json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(completed.status().as_u16(), 200);
    let record: serde_json::Value = completed.json().await.unwrap();
    assert_eq!(record["status"], "completed");
    assert_eq!(record["grade"], "A+");
    assert!(record["completion_date"].is_string());

    // Completed is terminal.
    let reopened = client
        .put(format!("{}/api/enrollments/{}/status", address, enrollment_id))
        .bearer_auth(instructor_token(2))
        .json(&serde_json::json!({ "status": "active" }))
        .send()
        .await
        .unwrap();
    assert_eq!(reopened.status().as_u16(), 409);
}

#[tokio::test]
async fn students_can_drop_their_own_enrollment() {
    let address = spawn_app(seed_store(3).await).await;
    let client = reqwest::Client::new();
    let token = student_token(7);

    let response = client
        .post(format!("{}/api/courses/1/enroll", address))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    let record: serde_json::Value = response.json().await.unwrap();
    let enrollment_id = record["id"].as_i64().unwrap();

    let dropped = client
        .put(format!("{}/api/enrollments/{}/status", address, enrollment_id))
        .bearer_auth(&token)
        .json(&serde_json::json!({ "status": "dropped" }))
        .send()
        .await
        .unwrap();
    assert_eq!(dropped.status().as_u16(), 200);
    let record: serde_json::Value = dropped.json().await.unwrap();
    assert_eq!(record["status"], "dropped");

    // Dropped enrollments cannot submit attempts.
    let response = client
        .post(format!("{}/api/assessments/10/submit", address))
        .bearer_auth(&token)
        .json(&serde_json::json!({
            "answers": [{ "question_id": 1, "answer": "A" }]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 403);
}
