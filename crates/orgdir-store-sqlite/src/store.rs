//! [`SqliteStore`]: the SQLite implementation of [`DirectoryStore`].

use std::{collections::HashMap, path::Path};

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use tracing::debug;
use uuid::Uuid;

use orgdir_core::{
  activity::Activity,
  building::{Building, NewBuilding},
  geo::BoundingBox,
  organization::{NewOrganization, Organization},
  store::DirectoryStore,
};

use crate::{
  Result,
  encode::{
    IN_ID_LIST, RawActivity, RawBuilding, RawOrganization, encode_dt, encode_uuid,
    encode_uuids, fold_name, id_list,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A directory store backed by a single SQLite file.
///
/// Cloning is cheap: the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Select distinct organization ids with `filter` (a SQL fragment following
  /// `FROM organizations o`) and load each match in full.
  async fn organizations_where(
    &self,
    filter: String,
    params: Vec<String>,
  ) -> Result<Vec<Organization>> {
    let raws: Vec<RawOrganization> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT DISTINCT o.id FROM organizations o {filter}");
        let ids = {
          let mut stmt = conn.prepare(&sql)?;
          stmt
            .query_map(rusqlite::params_from_iter(params.iter()), |row| {
              row.get::<_, String>(0)
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?
        };
        Ok(load_organizations(conn, &ids)?)
      })
      .await?;

    debug!(matches = raws.len(), "loaded organizations");
    raws.into_iter().map(RawOrganization::into_organization).collect()
  }

  async fn query_activities(
    &self,
    filter: &'static str,
    params: Vec<String>,
  ) -> Result<Vec<Activity>> {
    let raws: Vec<RawActivity> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM activities {filter}", RawActivity::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), RawActivity::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawActivity::into_activity).collect()
  }

  async fn query_buildings(
    &self,
    filter: &'static str,
    params: Vec<rusqlite::types::Value>,
  ) -> Result<Vec<Building>> {
    let raws: Vec<RawBuilding> = self
      .conn
      .call(move |conn| {
        let sql = format!("SELECT {} FROM buildings {filter}", RawBuilding::COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            RawBuilding::from_row_at(row, 0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawBuilding::into_building).collect()
  }
}

// ─── Row loaders ─────────────────────────────────────────────────────────────

/// Load organizations by id with their building, phones and activities.
/// Ids with no matching row are skipped.
///
/// Issues three statements regardless of how many ids are requested: one per
/// table, each bound to the whole id list.
fn load_organizations(
  conn: &rusqlite::Connection,
  ids: &[String],
) -> rusqlite::Result<Vec<RawOrganization>> {
  if ids.is_empty() {
    return Ok(Vec::new());
  }
  let list = id_list(ids);

  let mut org_stmt = conn.prepare_cached(&format!(
    "SELECT o.id, o.name, o.created_at, o.modified_at,
            b.id, b.address, b.latitude, b.longitude, b.created_at, b.modified_at
     FROM organizations o
     JOIN buildings b ON b.id = o.building_id
     WHERE o.id {IN_ID_LIST}"
  ))?;
  let mut organizations = org_stmt
    .query_map([&list], |row| {
      Ok(RawOrganization {
        id:          row.get(0)?,
        name:        row.get(1)?,
        created_at:  row.get(2)?,
        modified_at: row.get(3)?,
        building:    RawBuilding::from_row_at(row, 4)?,
        phones:      Vec::new(),
        activities:  Vec::new(),
      })
    })?
    .collect::<rusqlite::Result<Vec<_>>>()?;

  let mut phones: HashMap<String, Vec<(String, String)>> = HashMap::new();
  let mut phone_stmt = conn.prepare_cached(&format!(
    "SELECT organization_id, id, phone FROM organization_phones
     WHERE organization_id {IN_ID_LIST}
     ORDER BY rowid"
  ))?;
  let mut rows = phone_stmt.query([&list])?;
  while let Some(row) = rows.next()? {
    phones
      .entry(row.get(0)?)
      .or_default()
      .push((row.get(1)?, row.get(2)?));
  }

  let mut activities: HashMap<String, Vec<RawActivity>> = HashMap::new();
  let mut activity_stmt = conn.prepare_cached(&format!(
    "SELECT oa.organization_id,
            a.id, a.name, a.parent_id, a.created_at, a.modified_at
     FROM activities a
     JOIN organization_activities oa ON oa.activity_id = a.id
     WHERE oa.organization_id {IN_ID_LIST}
     ORDER BY a.name, a.id"
  ))?;
  let mut rows = activity_stmt.query([&list])?;
  while let Some(row) = rows.next()? {
    activities
      .entry(row.get(0)?)
      .or_default()
      .push(RawActivity::from_row_at(row, 1)?);
  }

  for org in &mut organizations {
    org.phones = phones.remove(&org.id).unwrap_or_default();
    org.activities = activities.remove(&org.id).unwrap_or_default();
  }
  Ok(organizations)
}

// ─── DirectoryStore impl ─────────────────────────────────────────────────────

impl DirectoryStore for SqliteStore {
  type Error = crate::Error;

  // ── Activities ────────────────────────────────────────────────────────────

  async fn fetch_parent_id(&self, activity_id: Uuid) -> Result<Option<Uuid>> {
    let id_str = encode_uuid(activity_id);

    let parent: Option<Option<String>> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT parent_id FROM activities WHERE id = ?1",
              rusqlite::params![id_str],
              |row| row.get(0),
            )
            .optional()?,
        )
      })
      .await?;

    parent
      .flatten()
      .map(|s| Uuid::parse_str(&s))
      .transpose()
      .map_err(Into::into)
  }

  async fn fetch_children(&self, activity_id: Uuid) -> Result<Vec<Activity>> {
    self
      .query_activities(
        "WHERE parent_id = ?1 ORDER BY name, id",
        vec![encode_uuid(activity_id)],
      )
      .await
  }

  async fn insert_activity(
    &self,
    name: String,
    parent_id: Option<Uuid>,
  ) -> Result<Activity> {
    let now = Utc::now();
    let activity = Activity {
      id: Uuid::new_v4(),
      name,
      parent_id,
      created_at: now,
      modified_at: now,
    };

    let id_str     = encode_uuid(activity.id);
    let name       = activity.name.clone();
    let parent_str = parent_id.map(encode_uuid);
    let at_str     = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO activities (id, name, parent_id, created_at, modified_at)
           VALUES (?1, ?2, ?3, ?4, ?4)",
          rusqlite::params![id_str, name, parent_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(activity)
  }

  async fn get_activity(&self, id: Uuid) -> Result<Option<Activity>> {
    let mut found = self
      .query_activities("WHERE id = ?1", vec![encode_uuid(id)])
      .await?;
    Ok(found.pop())
  }

  async fn list_activities(&self) -> Result<Vec<Activity>> {
    self.query_activities("ORDER BY name, id", Vec::new()).await
  }

  // ── Buildings ─────────────────────────────────────────────────────────────

  async fn insert_building(&self, input: NewBuilding) -> Result<Building> {
    let now = Utc::now();
    let building = Building {
      id:          Uuid::new_v4(),
      address:     input.address,
      latitude:    input.latitude,
      longitude:   input.longitude,
      created_at:  now,
      modified_at: now,
    };

    let id_str  = encode_uuid(building.id);
    let address = building.address.clone();
    let (lat, lon) = (building.latitude, building.longitude);
    let at_str  = encode_dt(now);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO buildings (id, address, latitude, longitude, created_at, modified_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, address, lat, lon, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(building)
  }

  async fn get_building(&self, id: Uuid) -> Result<Option<Building>> {
    let mut found = self
      .query_buildings("WHERE id = ?1", vec![encode_uuid(id).into()])
      .await?;
    Ok(found.pop())
  }

  async fn list_buildings(&self) -> Result<Vec<Building>> {
    self.query_buildings("ORDER BY address, id", Vec::new()).await
  }

  async fn fetch_buildings_in_box(&self, bbox: BoundingBox) -> Result<Vec<Building>> {
    self
      .query_buildings(
        "WHERE latitude  BETWEEN ?1 AND ?2
           AND longitude BETWEEN ?3 AND ?4",
        vec![
          bbox.min_lat.into(),
          bbox.max_lat.into(),
          bbox.min_lon.into(),
          bbox.max_lon.into(),
        ],
      )
      .await
  }

  // ── Organizations ─────────────────────────────────────────────────────────

  async fn insert_organization(&self, input: NewOrganization) -> Result<Organization> {
    let id_str       = encode_uuid(Uuid::new_v4());
    let at_str       = encode_dt(Utc::now());
    let folded       = fold_name(&input.name);
    let name         = input.name;
    let building_str = encode_uuid(input.building_id);
    let activity_ids = encode_uuids(&input.activity_ids);
    let phones: Vec<(String, String)> = input
      .phone_numbers
      .into_iter()
      .map(|phone| (encode_uuid(Uuid::new_v4()), phone))
      .collect();

    let raw: RawOrganization = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        tx.execute(
          "INSERT INTO organizations (id, name, name_folded, building_id, created_at, modified_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
          rusqlite::params![id_str, name, folded, building_str, at_str],
        )?;
        for (phone_id, phone) in &phones {
          tx.execute(
            "INSERT INTO organization_phones (id, organization_id, phone, created_at, modified_at)
             VALUES (?1, ?2, ?3, ?4, ?4)",
            rusqlite::params![phone_id, id_str, phone, at_str],
          )?;
        }
        for activity_id in &activity_ids {
          tx.execute(
            "INSERT OR IGNORE INTO organization_activities (organization_id, activity_id)
             VALUES (?1, ?2)",
            rusqlite::params![id_str, activity_id],
          )?;
        }
        tx.commit()?;

        let raw = load_organizations(conn, std::slice::from_ref(&id_str))?
          .pop()
          .ok_or(rusqlite::Error::QueryReturnedNoRows)?;
        Ok(raw)
      })
      .await?;

    raw.into_organization()
  }

  async fn get_organization(&self, id: Uuid) -> Result<Option<Organization>> {
    let mut found = self
      .organizations_where("WHERE o.id = ?1".to_owned(), vec![encode_uuid(id)])
      .await?;
    Ok(found.pop())
  }

  async fn list_organizations(&self) -> Result<Vec<Organization>> {
    self.organizations_where(String::new(), Vec::new()).await
  }

  async fn fetch_organizations_by_activity_set(
    &self,
    activity_ids: Vec<Uuid>,
  ) -> Result<Vec<Organization>> {
    if activity_ids.is_empty() {
      return Ok(Vec::new());
    }
    let filter = format!(
      "JOIN organization_activities oa ON oa.organization_id = o.id
       WHERE oa.activity_id {IN_ID_LIST}"
    );
    let list = id_list(&encode_uuids(&activity_ids));
    self.organizations_where(filter, vec![list]).await
  }

  async fn fetch_organizations_by_building_set(
    &self,
    building_ids: Vec<Uuid>,
  ) -> Result<Vec<Organization>> {
    if building_ids.is_empty() {
      return Ok(Vec::new());
    }
    let filter = format!("WHERE o.building_id {IN_ID_LIST}");
    let list = id_list(&encode_uuids(&building_ids));
    self.organizations_where(filter, vec![list]).await
  }

  async fn fetch_organizations_by_name_substring(
    &self,
    text: String,
  ) -> Result<Vec<Organization>> {
    self
      .organizations_where(
        "WHERE instr(o.name_folded, ?1) > 0".to_owned(),
        vec![fold_name(&text)],
      )
      .await
  }
}
