//! Handlers for `/buildings` endpoints.

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use orgdir_core::{
  building::{self, Building, NewBuilding},
  store::DirectoryStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{JsonBody, Path},
};

/// `GET /buildings`
pub async fn list<S>(State(state): State<ApiState<S>>) -> Result<Json<Vec<Building>>, ApiError>
where
  S: DirectoryStore,
{
  Ok(Json(building::list_buildings(state.index.store()).await?))
}

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub address:   String,
  pub latitude:  f64,
  pub longitude: f64,
}

/// `POST /buildings` with body `{"address":"…","latitude":55.75,"longitude":37.61}`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
{
  let input = NewBuilding {
    address:   body.address,
    latitude:  body.latitude,
    longitude: body.longitude,
  };
  let building = building::create_building(state.index.store(), input).await?;
  Ok((StatusCode::CREATED, Json(building)))
}

/// `GET /buildings/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Building>, ApiError>
where
  S: DirectoryStore,
{
  Ok(Json(building::get_building(state.index.store(), id).await?))
}
