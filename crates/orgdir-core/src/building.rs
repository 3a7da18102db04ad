//! Buildings: the physical locations organizations are housed in.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::{
  Entity, Error, Result,
  geo::GeoPoint,
  store::DirectoryStore,
  validate,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Building {
  pub id:          Uuid,
  pub address:     String,
  pub latitude:    f64,
  pub longitude:   f64,
  pub created_at:  DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
}

impl Building {
  /// The stored coordinates. They were range-checked on insert.
  pub fn location(&self) -> GeoPoint {
    GeoPoint { latitude: self.latitude, longitude: self.longitude }
  }
}

/// Input to [`create_building`].
#[derive(Debug, Clone)]
pub struct NewBuilding {
  pub address:   String,
  pub latitude:  f64,
  pub longitude: f64,
}

/// Validate the address and coordinates, then persist the building.
pub async fn create_building<S>(store: &S, input: NewBuilding) -> Result<Building>
where
  S: DirectoryStore,
{
  validate::building_address(&input.address)?;
  GeoPoint::new(input.latitude, input.longitude)?;

  let building = store
    .insert_building(input)
    .await
    .map_err(Error::persistence)?;
  info!(id = %building.id, address = %building.address, "created building");
  Ok(building)
}

pub async fn get_building<S>(store: &S, id: Uuid) -> Result<Building>
where
  S: DirectoryStore,
{
  store
    .get_building(id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| Error::not_found(Entity::Building, id))
}

pub async fn list_buildings<S>(store: &S) -> Result<Vec<Building>>
where
  S: DirectoryStore,
{
  store.list_buildings().await.map_err(Error::persistence)
}
