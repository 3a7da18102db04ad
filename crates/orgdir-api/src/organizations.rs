//! Handlers for `/organizations` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/organizations` | Optional `?name=<substring>` |
//! | `POST` | `/organizations` | Body: name, building_id, phone_numbers, activity_ids |
//! | `GET`  | `/organizations/{id}` | 404 if not found |
//! | `GET`  | `/organizations/by-building/{id}` | |
//! | `GET`  | `/organizations/by-activity/{id}` | Optional `?with_children=true` |
//! | `GET`  | `/organizations/by-radius` | `?latitude=&longitude=&radius_km=` |
//!
//! Whether an empty result on the lookup routes is a 404 follows the
//! configured [`orgdir_core::index::EmptyResultPolicy`].

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use orgdir_core::{
  geo::GeoPoint,
  index::{ActivityScope, OrganizationFacet},
  organization::{NewOrganization, Organization},
  store::DirectoryStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
  ApiState,
  error::ApiError,
  extract::{JsonBody, Path, Query},
};

// ─── List / search ────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub name: Option<String>,
}

/// `GET /organizations[?name=<substring>]`
pub async fn list<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Organization>>, ApiError>
where
  S: DirectoryStore,
{
  let facet = match params.name {
    Some(name) if !name.trim().is_empty() => OrganizationFacet::Name(name),
    _ => OrganizationFacet::All,
  };
  Ok(Json(state.index.resolve(&facet).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name:          String,
  pub building_id:   Uuid,
  #[serde(default)]
  pub phone_numbers: Vec<String>,
  #[serde(default)]
  pub activity_ids:  Vec<Uuid>,
}

/// `POST /organizations`
pub async fn create<S>(
  State(state): State<ApiState<S>>,
  JsonBody(body): JsonBody<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DirectoryStore,
{
  let organization = state
    .index
    .create_organization(NewOrganization {
      name:          body.name,
      building_id:   body.building_id,
      phone_numbers: body.phone_numbers,
      activity_ids:  body.activity_ids,
    })
    .await?;
  Ok((StatusCode::CREATED, Json(organization)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /organizations/{id}`
pub async fn get_one<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Organization>, ApiError>
where
  S: DirectoryStore,
{
  Ok(Json(state.index.get_organization(id).await?))
}

// ─── Facets ───────────────────────────────────────────────────────────────────

/// `GET /organizations/by-building/{id}`
pub async fn by_building<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<Vec<Organization>>, ApiError>
where
  S: DirectoryStore,
{
  Ok(Json(state.index.resolve(&OrganizationFacet::Building(id)).await?))
}

#[derive(Debug, Deserialize)]
pub struct ActivityParams {
  #[serde(default)]
  pub with_children: bool,
}

/// `GET /organizations/by-activity/{id}[?with_children=true]`
pub async fn by_activity<S>(
  State(state): State<ApiState<S>>,
  Path(id): Path<Uuid>,
  Query(params): Query<ActivityParams>,
) -> Result<Json<Vec<Organization>>, ApiError>
where
  S: DirectoryStore,
{
  let facet = OrganizationFacet::Activity {
    id,
    scope: ActivityScope::from_flag(params.with_children),
  };
  Ok(Json(state.index.resolve(&facet).await?))
}

#[derive(Debug, Deserialize)]
pub struct RadiusParams {
  pub latitude:  f64,
  pub longitude: f64,
  pub radius_km: f64,
}

/// `GET /organizations/by-radius?latitude=&longitude=&radius_km=`
pub async fn by_radius<S>(
  State(state): State<ApiState<S>>,
  Query(params): Query<RadiusParams>,
) -> Result<Json<Vec<Organization>>, ApiError>
where
  S: DirectoryStore,
{
  let center = GeoPoint::new(params.latitude, params.longitude)?;
  let facet = OrganizationFacet::Radius { center, radius_km: params.radius_km };
  Ok(Json(state.index.resolve(&facet).await?))
}
