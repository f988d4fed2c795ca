pub mod progress;
pub mod review;

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  routing::{get, post},
  Json, Router,
};
use serde_json::json;

use crate::db::DbPool;
use crate::error::LeitnerError;

pub use progress::{card_stats, learning_streak, review_history, topic_progress, topic_statistics, user_overview};
pub use review::{check_answer, due_cards, reset_card, review_session, submit_review};

/// JSON API over the shared connection
pub fn router(pool: DbPool) -> Router {
  Router::new()
    .route("/reviews", post(submit_review))
    .route("/due", get(due_cards))
    .route("/check-answer", post(check_answer))
    .route("/cards/{id}/stats", get(card_stats))
    .route("/cards/{id}/reset", post(reset_card))
    .route("/topics/{topic_id}/progress", get(topic_progress))
    .route("/users/{id}/session", get(review_session))
    .route("/users/{id}/overview", get(user_overview))
    .route("/users/{id}/history", get(review_history))
    .route("/users/{id}/topics", get(topic_statistics))
    .route("/users/{id}/streak", get(learning_streak))
    .with_state(pool)
}

/// Handler error rendered as `{"error": message}`
#[derive(Debug)]
pub struct ApiError(LeitnerError);

impl From<LeitnerError> for ApiError {
  fn from(err: LeitnerError) -> Self {
    Self(err)
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self.0 {
      LeitnerError::NotFound(_) | LeitnerError::UnknownUser(_) => StatusCode::NOT_FOUND,
      LeitnerError::Validation(_) | LeitnerError::InvalidBox(_) | LeitnerError::DateOutOfRange(..) => {
        StatusCode::BAD_REQUEST
      }
      LeitnerError::Database(_) | LeitnerError::Lock => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
      tracing::error!("request failed: {}", self.0);
    }
    (status, Json(json!({ "error": self.0.to_string() }))).into_response()
  }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;
