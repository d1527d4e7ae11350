// HTTP request handlers
use crate::application::message_service::SubmitError;
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// `POST /message?message=...`
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub message: Option<String>,
}

/// `POST /message` with `{"message": "..."}`
#[derive(Debug, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct MessageAck {
    pub message: &'static str,
    /// Text as queued, after truncation
    pub text: String,
    pub received_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Queue a message for the display. The query parameter wins over the body.
pub async fn post_message(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MessageQuery>,
    body: Option<Json<MessageBody>>,
) -> Response {
    let text = query.message.or(body.map(|Json(body)| body.message));
    let Some(text) = text else {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, "missing message text");
    };

    match state.message_service.submit(&text) {
        Ok(message) => Json(MessageAck {
            message: "Received",
            text: message.text,
            received_at: message.received_at,
        })
        .into_response(),
        Err(e) => {
            tracing::warn!("Rejected message: {}", e);
            let status = match e {
                SubmitError::Empty => StatusCode::UNPROCESSABLE_ENTITY,
                SubmitError::QueueFull | SubmitError::Closed => StatusCode::SERVICE_UNAVAILABLE,
            };
            error_response(status, &e.to_string())
        }
    }
}

fn error_response(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: error.to_string(),
        }),
    )
        .into_response()
}
