//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings and coordinates as `REAL`.

use chrono::{DateTime, Utc};
use orgdir_core::{
  activity::Activity,
  building::Building,
  organization::{Organization, Phone},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_uuids(ids: &[Uuid]) -> Vec<String> {
  ids.iter().copied().map(encode_uuid).collect()
}

// ─── DateTime<Utc> ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Names ───────────────────────────────────────────────────────────────────

/// Case-folded form used for substring search.
pub fn fold_name(name: &str) -> String { name.to_lowercase() }

/// Encode `ids` as one JSON array, bound as a single parameter and expanded
/// in SQL with `json_each`. Keeps set queries clear of SQLite's bound
/// variable limit.
pub fn id_list(ids: &[String]) -> String {
  serde_json::Value::from(ids.to_vec()).to_string()
}

/// SQL fragment selecting the members of a list built by [`id_list`].
pub const IN_ID_LIST: &str = "IN (SELECT value FROM json_each(?1))";

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from an `activities` row.
#[derive(Debug)]
pub struct RawActivity {
  pub id:          String,
  pub name:        String,
  pub parent_id:   Option<String>,
  pub created_at:  String,
  pub modified_at: String,
}

impl RawActivity {
  pub const COLUMNS: &'static str = "id, name, parent_id, created_at, modified_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Self::from_row_at(row, 0)
  }

  /// Read the five activity columns starting at `offset`.
  pub fn from_row_at(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(offset)?,
      name:        row.get(offset + 1)?,
      parent_id:   row.get(offset + 2)?,
      created_at:  row.get(offset + 3)?,
      modified_at: row.get(offset + 4)?,
    })
  }

  pub fn into_activity(self) -> Result<Activity> {
    Ok(Activity {
      id:          decode_uuid(&self.id)?,
      name:        self.name,
      parent_id:   self.parent_id.as_deref().map(decode_uuid).transpose()?,
      created_at:  decode_dt(&self.created_at)?,
      modified_at: decode_dt(&self.modified_at)?,
    })
  }
}

/// Raw values read directly from a `buildings` row.
#[derive(Debug)]
pub struct RawBuilding {
  pub id:          String,
  pub address:     String,
  pub latitude:    f64,
  pub longitude:   f64,
  pub created_at:  String,
  pub modified_at: String,
}

impl RawBuilding {
  pub const COLUMNS: &'static str =
    "id, address, latitude, longitude, created_at, modified_at";

  /// Read the six building columns starting at `offset`.
  pub fn from_row_at(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      id:          row.get(offset)?,
      address:     row.get(offset + 1)?,
      latitude:    row.get(offset + 2)?,
      longitude:   row.get(offset + 3)?,
      created_at:  row.get(offset + 4)?,
      modified_at: row.get(offset + 5)?,
    })
  }

  pub fn into_building(self) -> Result<Building> {
    Ok(Building {
      id:          decode_uuid(&self.id)?,
      address:     self.address,
      latitude:    self.latitude,
      longitude:   self.longitude,
      created_at:  decode_dt(&self.created_at)?,
      modified_at: decode_dt(&self.modified_at)?,
    })
  }
}

/// An `organizations` row together with its joined building, phones and
/// activities.
#[derive(Debug)]
pub struct RawOrganization {
  pub id:          String,
  pub name:        String,
  pub created_at:  String,
  pub modified_at: String,
  pub building:    RawBuilding,
  pub phones:      Vec<(String, String)>,
  pub activities:  Vec<RawActivity>,
}

impl RawOrganization {
  pub fn into_organization(self) -> Result<Organization> {
    let phones = self
      .phones
      .into_iter()
      .map(|(id, phone)| Ok(Phone { id: decode_uuid(&id)?, phone }))
      .collect::<Result<Vec<_>>>()?;

    let activities = self
      .activities
      .into_iter()
      .map(RawActivity::into_activity)
      .collect::<Result<Vec<_>>>()?;

    Ok(Organization {
      id: decode_uuid(&self.id)?,
      name: self.name,
      building: self.building.into_building()?,
      phones,
      activities,
      created_at: decode_dt(&self.created_at)?,
      modified_at: decode_dt(&self.modified_at)?,
    })
  }
}
