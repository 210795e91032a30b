// End-to-end tests against a running taskmill-api server
// Run with: cargo test --test integration_test -- --ignored

use std::time::Duration;

use serde_json::json;
use taskmill_contracts::{Task, TaskStatus};

const API_BASE_URL: &str = "http://localhost:8080";

#[tokio::test]
#[ignore] // needs a running server and database
async fn submitted_task_eventually_completes() {
    let client = reqwest::Client::new();

    // Submit a high-priority task
    let response = client
        .post(format!("{}/v1/tasks", API_BASE_URL))
        .json(&json!({
            "priority": "high",
            "payload": {"action": "send_email"}
        }))
        .send()
        .await
        .expect("Failed to submit task");
    assert_eq!(response.status(), 202);

    let task: Task = response.json().await.expect("Failed to parse task");
    assert!(!task.id.is_nil());
    assert_eq!(task.status, TaskStatus::Pending);

    // Poll until a worker has run it
    let mut status = task.status;
    for _ in 0..30 {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let fetched: Task = client
            .get(format!("{}/v1/tasks/{}", API_BASE_URL, task.id))
            .send()
            .await
            .expect("Failed to fetch task")
            .json()
            .await
            .expect("Failed to parse task");
        status = fetched.status;
        if status == TaskStatus::Completed {
            break;
        }
    }
    assert_eq!(status, TaskStatus::Completed);
}

#[tokio::test]
#[ignore] // needs a running server
async fn invalid_priority_is_rejected() {
    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/v1/tasks", API_BASE_URL))
        .json(&json!({"priority": "urgent", "payload": {}}))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), 400);
}
