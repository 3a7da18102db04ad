//! Handlers for `/activities` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/activities` | Every node, flat |
//! | `POST` | `/activities` | Body: `{"name":"Meat","parent_id":"<uuid>"}`; 400 past depth 3 |
//! | `GET`  | `/activities/{id}` | 404 if not found |

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use orgdir_core::{
  activity::{Activity, NewActivity},
  store::DirectoryStore,
  taxonomy,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{JsonBody, Path},
};

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /activities`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Activity>>, ApiError>
where
  S: DirectoryStore,
{
  let activities = taxonomy::list_activities(state.index.store()).await?;
  Ok(Json(activities))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:      String,
  #[serde(default)]
  pub parent_id: Option<Uuid>,
}

/// `POST /activities`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
{
  let input = NewActivity { name: body.name, parent_id: body.parent_id };
  let activity = taxonomy::create_activity(state.index.store(), input).await?;
  Ok((StatusCode::CREATED, Json(activity)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /activities/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Activity>, ApiError>
where
  S: DirectoryStore,
{
  let activity = taxonomy::get_activity(state.index.store(), id).await?;
  Ok(Json(activity))
}
