use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::errors::app_error::AppResult;
use crate::queue::QueueKey;
use crate::state::AppState;

/// Health check handler
/// Returns a simple JSON response indicating the server is running
pub async fn health_check() -> Result<Json<Value>, StatusCode> {
    Ok(Json(json!({
        "status": "OK"
    })))
}

/// Read-only snapshot of a queue
///
/// Returns the waiting list, the patient currently in consultation and the
/// active flag. 404 when the queue was never started.
pub async fn queue_snapshot(
    State(state): State<Arc<AppState>>,
    Path((doctor_id, hospital_id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    let key = QueueKey::new(doctor_id, hospital_id);
    let snapshot = state.queues.snapshot(&key).await?;
    Ok(Json(json!({
        "doctorId": key.doctor_id,
        "hospitalId": key.hospital_id,
        "queue": snapshot.waiting,
        "current": snapshot.current,
        "isActive": snapshot.is_active,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_health_check() {
        let result = health_check().await;
        assert!(result.is_ok());
        let json = result.unwrap();
        assert_eq!(json.0["status"], "OK");
    }
}
