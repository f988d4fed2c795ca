use axum::{
  extract::{Path, Query, State},
  Json,
};
use serde::{Deserialize, Serialize};

use crate::db::{self, try_lock, DbPool};
use crate::domain::{Flashcard, ReviewOrder, Transition};
use crate::error::LeitnerError;
#[cfg(feature = "profiling")]
use crate::profiling::EventType;
use crate::srs;
use crate::validation::{self, Strictness};

use super::ApiResult;

#[derive(Deserialize)]
pub struct ReviewRequest {
  pub flashcard_id: i64,
  pub user_id: i64,
  pub was_correct: bool,
  pub time_spent_seconds: Option<i64>,
}

pub async fn submit_review(State(pool): State<DbPool>, Json(req): Json<ReviewRequest>) -> ApiResult<Transition> {
  let conn = try_lock(&pool)?;
  let transition = db::process_review_now(
    &conn,
    req.flashcard_id,
    req.user_id,
    req.was_correct,
    req.time_spent_seconds,
  )?;
  Ok(Json(transition))
}

#[derive(Deserialize)]
pub struct DueQuery {
  pub topic_id: Option<i64>,
  pub user_id: Option<i64>,
  pub order: Option<String>,
}

fn parse_order(order: Option<&str>) -> Result<ReviewOrder, LeitnerError> {
  match order {
    None => Ok(ReviewOrder::default()),
    Some(s) => ReviewOrder::from_str(s)
      .ok_or_else(|| LeitnerError::validation(format!("unknown review order: {s}"))),
  }
}

pub async fn due_cards(State(pool): State<DbPool>, Query(query): Query<DueQuery>) -> ApiResult<Vec<Flashcard>> {
  let order = parse_order(query.order.as_deref())?;
  let conn = try_lock(&pool)?;
  let cards = db::get_due_cards_today(&conn, query.topic_id, query.user_id, order)?;
  Ok(Json(cards))
}

#[derive(Deserialize)]
pub struct SessionQuery {
  pub topic_id: Option<i64>,
}

pub async fn review_session(
  State(pool): State<DbPool>,
  Path(user_id): Path<i64>,
  Query(query): Query<SessionQuery>,
) -> ApiResult<Vec<Flashcard>> {
  let conn = try_lock(&pool)?;
  let cards = db::build_review_session_today(&conn, user_id, query.topic_id)?;
  Ok(Json(cards))
}

#[derive(Serialize)]
pub struct ResetResponse {
  pub reset: bool,
}

pub async fn reset_card(State(pool): State<DbPool>, Path(flashcard_id): Path<i64>) -> ApiResult<ResetResponse> {
  let conn = try_lock(&pool)?;
  let reset = db::reset_card(&conn, flashcard_id, srs::today())?;
  Ok(Json(ResetResponse { reset }))
}

#[derive(Deserialize)]
pub struct CheckAnswerRequest {
  pub user_answer: String,
  pub correct_answer: String,
  pub strictness: Option<String>,
}

#[derive(Serialize)]
pub struct CheckAnswerResponse {
  pub correct: bool,
  pub similarity: f64,
}

pub async fn check_answer(Json(req): Json<CheckAnswerRequest>) -> ApiResult<CheckAnswerResponse> {
  let strictness = match req.strictness.as_deref() {
    None => Strictness::default(),
    Some(s) => Strictness::from_str(s)
      .ok_or_else(|| LeitnerError::validation(format!("unknown strictness: {s}")))?,
  };

  let correct = validation::check_answer(&req.user_answer, &req.correct_answer, strictness);

  #[cfg(feature = "profiling")]
  crate::profile_log!(EventType::AnswerCheck {
    strictness: strictness.as_str().into(),
    is_correct: correct,
  });

  Ok(Json(CheckAnswerResponse {
    correct,
    similarity: validation::similarity(&req.user_answer, &req.correct_answer),
  }))
}
