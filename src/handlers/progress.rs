use axum::{
  extract::{Path, Query, State},
  response::{IntoResponse, Response},
  Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::config;
use crate::db::{self, try_lock, DbPool, LearningStreak, ReviewSeries, TopicProgress, TopicStatistics, UserOverview};

use super::{ApiError, ApiResult};

/// Card statistics, or `{}` when the card has no review state
pub async fn card_stats(State(pool): State<DbPool>, Path(flashcard_id): Path<i64>) -> Result<Response, ApiError> {
  let conn = try_lock(&pool)?;
  let response = match db::card_statistics(&conn, flashcard_id)? {
    Some(stats) => Json(stats).into_response(),
    None => Json(json!({})).into_response(),
  };
  Ok(response)
}

#[derive(Deserialize)]
pub struct UserQuery {
  pub user_id: i64,
}

pub async fn topic_progress(
  State(pool): State<DbPool>,
  Path(topic_id): Path<i64>,
  Query(query): Query<UserQuery>,
) -> ApiResult<TopicProgress> {
  let conn = try_lock(&pool)?;
  Ok(Json(db::topic_progress_today(&conn, topic_id, query.user_id)?))
}

pub async fn user_overview(State(pool): State<DbPool>, Path(user_id): Path<i64>) -> ApiResult<UserOverview> {
  let conn = try_lock(&pool)?;
  let overview = crate::profile_scope!("user_overview", { db::user_overview_today(&conn, user_id) })?;
  Ok(Json(overview))
}

#[derive(Deserialize)]
pub struct HistoryQuery {
  pub days: Option<i64>,
}

pub async fn review_history(
  State(pool): State<DbPool>,
  Path(user_id): Path<i64>,
  Query(query): Query<HistoryQuery>,
) -> ApiResult<ReviewSeries> {
  let days = query.days.unwrap_or(config::DEFAULT_HISTORY_DAYS);
  let conn = try_lock(&pool)?;
  Ok(Json(db::review_history_series_today(&conn, user_id, days)?))
}

pub async fn topic_statistics(State(pool): State<DbPool>, Path(user_id): Path<i64>) -> ApiResult<Vec<TopicStatistics>> {
  let conn = try_lock(&pool)?;
  Ok(Json(db::topic_statistics(&conn, user_id)?))
}

pub async fn learning_streak(State(pool): State<DbPool>, Path(user_id): Path<i64>) -> ApiResult<LearningStreak> {
  let conn = try_lock(&pool)?;
  Ok(Json(db::learning_streak_today(&conn, user_id)?))
}
