//! Demo data: a small taxonomy, three buildings and eight organizations.
//!
//! Everything goes through the validating core operations, so the data obeys
//! the same depth and format rules as API input.

use std::collections::HashMap;

use orgdir_core::{
  Result,
  activity::NewActivity,
  building::{self, NewBuilding},
  index::OrganizationIndex,
  organization::NewOrganization,
  store::DirectoryStore,
  taxonomy,
};
use tracing::info;
use uuid::Uuid;

/// `(name, parent name)` in insertion order. Parents must precede children.
const ACTIVITIES: &[(&str, Option<&str>)] = &[
  ("Еда", None),
  ("Мясная продукция", Some("Еда")),
  ("Птица", Some("Мясная продукция")),
  ("Полуфабрикаты", Some("Мясная продукция")),
  ("Молочная продукция", Some("Еда")),
  ("Автомобили", None),
  ("Грузовые", Some("Автомобили")),
  ("Легковые", None),
  ("Запчасти", Some("Легковые")),
  ("Аксессуары", Some("Легковые")),
];

const BUILDINGS: &[(&str, f64, f64)] = &[
  ("ул. Пушкина, д.1", 55.751244, 37.618423),
  ("пр. Ленина, д.10", 59.934280, 30.335099),
  ("ул. Чехова, д.5", 56.838011, 60.597465),
];

struct SeedOrganization {
  name:       &'static str,
  building:   usize,
  activities: &'static [&'static str],
  phones:     &'static [&'static str],
}

const ORGANIZATIONS: &[SeedOrganization] = &[
  SeedOrganization {
    name:       "Магазин Еда",
    building:   0,
    activities: &["Еда"],
    phones:     &["8-900-999-00-11"],
  },
  SeedOrganization {
    name:       "Мясной магазин Птица",
    building:   0,
    activities: &["Птица"],
    phones:     &["8-900-111-22-33", "8-900-111-22-34"],
  },
  SeedOrganization {
    name:       "Полуфабрикаты и Молочка",
    building:   0,
    activities: &["Полуфабрикаты", "Молочная продукция"],
    phones:     &["8-900-222-33-44"],
  },
  SeedOrganization {
    name:       "Грузовые Автозапчасти",
    building:   1,
    activities: &["Грузовые"],
    phones:     &["8-910-555-66-77"],
  },
  SeedOrganization {
    name:       "Легковые Запчасти",
    building:   2,
    activities: &["Запчасти"],
    phones:     &["8-920-333-44-55"],
  },
  SeedOrganization {
    name:       "Автомобильные Аксессуары",
    building:   2,
    activities: &["Аксессуары"],
    phones:     &["8-921-444-55-66", "8-921-444-55-67"],
  },
  SeedOrganization {
    name:       "Авторынок",
    building:   1,
    activities: &["Автомобили"],
    phones:     &["8-910-999-00-22", "8-910-999-00-23"],
  },
  SeedOrganization {
    name:       "Автосалон Лада",
    building:   2,
    activities: &["Легковые"],
    phones:     &["8-920-999-00-33"],
  },
];

/// Insert the demo data unless the store already holds activities.
///
/// Returns whether anything was written.
pub async fn seed_if_empty<S>(index: &OrganizationIndex<S>) -> Result<bool>
where
  S: DirectoryStore,
{
  let store = index.store();
  if !taxonomy::list_activities(store).await?.is_empty() {
    info!("store already populated, skipping seed");
    return Ok(false);
  }

  let mut activity_ids: HashMap<&str, Uuid> = HashMap::new();
  for (name, parent) in ACTIVITIES {
    let parent_id = parent.map(|p| activity_ids[p]);
    let activity = taxonomy::create_activity(store, NewActivity {
      name: (*name).to_string(),
      parent_id,
    })
    .await?;
    activity_ids.insert(*name, activity.id);
  }

  let mut building_ids = Vec::with_capacity(BUILDINGS.len());
  for (address, latitude, longitude) in BUILDINGS {
    let b = building::create_building(store, NewBuilding {
      address:   (*address).to_string(),
      latitude:  *latitude,
      longitude: *longitude,
    })
    .await?;
    building_ids.push(b.id);
  }

  for org in ORGANIZATIONS {
    let linked = org.activities.iter().map(|name| activity_ids[name]).collect();
    index
      .create_organization(NewOrganization {
        name: org.name.to_string(),
        building_id: building_ids[org.building],
        phone_numbers: org.phones.iter().map(|p| p.to_string()).collect(),
        activity_ids: linked,
      })
      .await?;
  }

  info!(
    activities = ACTIVITIES.len(),
    buildings = BUILDINGS.len(),
    organizations = ORGANIZATIONS.len(),
    "seeded demo data"
  );
  Ok(true)
}

#[cfg(test)]
mod tests {
  use std::sync::Arc;

  use orgdir_core::{
    geo::GeoPoint,
    index::{ActivityScope, IndexOptions},
  };
  use orgdir_store_sqlite::SqliteStore;

  use super::*;

  async fn seeded() -> OrganizationIndex<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let index = OrganizationIndex::new(Arc::new(store), IndexOptions::default());
    assert!(seed_if_empty(&index).await.unwrap());
    index
  }

  fn activity_id(name: &str, all: &[orgdir_core::activity::Activity]) -> Uuid {
    all.iter().find(|a| a.name == name).unwrap().id
  }

  #[tokio::test]
  async fn seeding_twice_is_a_no_op() {
    let index = seeded().await;
    assert!(!seed_if_empty(&index).await.unwrap());
    let all = taxonomy::list_activities(index.store()).await.unwrap();
    assert_eq!(all.len(), ACTIVITIES.len());
  }

  #[tokio::test]
  async fn seeded_taxonomy_respects_depth() {
    let index = seeded().await;
    let all = taxonomy::list_activities(index.store()).await.unwrap();
    let poultry = activity_id("Птица", &all);
    assert_eq!(taxonomy::depth_of(index.store(), poultry).await.unwrap(), 3);
  }

  #[tokio::test]
  async fn food_closure_covers_three_shops() {
    let index = seeded().await;
    let all = taxonomy::list_activities(index.store()).await.unwrap();
    let food = activity_id("Еда", &all);

    let orgs = index
      .by_activity(food, ActivityScope::WithDescendants)
      .await
      .unwrap();
    let mut names: Vec<&str> = orgs.iter().map(|o| o.name.as_str()).collect();
    names.sort();
    assert_eq!(names, vec![
      "Магазин Еда",
      "Мясной магазин Птица",
      "Полуфабрикаты и Молочка",
    ]);
  }

  #[tokio::test]
  async fn radius_around_first_building() {
    let index = seeded().await;
    let center = GeoPoint::new(55.751244, 37.618423).unwrap();
    let orgs = index.by_radius(center, 1.0).await.unwrap();
    assert_eq!(orgs.len(), 3);
    assert!(orgs.iter().all(|o| o.building.address == "ул. Пушкина, д.1"));
  }
}
