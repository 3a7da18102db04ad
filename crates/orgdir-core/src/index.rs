//! `OrganizationIndex`: resolves organization queries by facet.
//!
//! Every facet produces a set of organizations (returned de-duplicated and
//! ordered by name, then id). Whether an empty set is an answer or a
//! "not found" is decided per facet by [`EmptyResultPolicy`], not by the
//! lookup itself.

use std::{collections::HashSet, fmt, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Entity, Error, Result,
  geo::{self, GeoPoint, RadiusMode},
  organization::{NewOrganization, Organization},
  store::DirectoryStore,
  taxonomy, validate,
};

// ─── Facets ──────────────────────────────────────────────────────────────────

/// Whether an activity query also matches descendant activities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityScope {
  /// Only organizations linked to the activity itself.
  #[default]
  Direct,
  /// The activity and everything below it, within the depth budget.
  WithDescendants,
}

impl ActivityScope {
  pub fn from_flag(with_children: bool) -> Self {
    if with_children { Self::WithDescendants } else { Self::Direct }
  }
}

/// One way of selecting organizations.
#[derive(Debug, Clone, PartialEq)]
pub enum OrganizationFacet {
  All,
  Building(Uuid),
  Activity { id: Uuid, scope: ActivityScope },
  Radius { center: GeoPoint, radius_km: f64 },
  /// Case-insensitive substring of the organization name.
  Name(String),
}

impl OrganizationFacet {
  pub fn kind(&self) -> FacetKind {
    match self {
      Self::All => FacetKind::All,
      Self::Building(_) => FacetKind::Building,
      Self::Activity { .. } => FacetKind::Activity,
      Self::Radius { .. } => FacetKind::Radius,
      Self::Name(_) => FacetKind::Name,
    }
  }
}

/// The discriminant of an [`OrganizationFacet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetKind {
  All,
  Building,
  Activity,
  Radius,
  Name,
}

impl fmt::Display for FacetKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::All => "listing",
      Self::Building => "building",
      Self::Activity => "activity",
      Self::Radius => "radius",
      Self::Name => "name",
    })
  }
}

// ─── Options ─────────────────────────────────────────────────────────────────

/// What an empty result means for one facet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmptyResult {
  /// An empty list is a valid answer.
  Allow,
  /// An empty list is reported as [`Error::NoMatches`].
  NotFound,
}

/// Per-facet empty-result handling.
///
/// The default treats the unfiltered listing and the name search as plain
/// listings, and the building / activity / radius lookups as lookups by
/// criterion that fail when nothing matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmptyResultPolicy {
  pub all:         EmptyResult,
  pub by_building: EmptyResult,
  pub by_activity: EmptyResult,
  pub by_radius:   EmptyResult,
  pub by_name:     EmptyResult,
}

impl Default for EmptyResultPolicy {
  fn default() -> Self {
    Self {
      all:         EmptyResult::Allow,
      by_building: EmptyResult::NotFound,
      by_activity: EmptyResult::NotFound,
      by_radius:   EmptyResult::NotFound,
      by_name:     EmptyResult::Allow,
    }
  }
}

impl EmptyResultPolicy {
  /// Every facet returns empty lists instead of failing.
  pub fn lenient() -> Self {
    Self {
      all:         EmptyResult::Allow,
      by_building: EmptyResult::Allow,
      by_activity: EmptyResult::Allow,
      by_radius:   EmptyResult::Allow,
      by_name:     EmptyResult::Allow,
    }
  }

  pub fn for_facet(&self, kind: FacetKind) -> EmptyResult {
    match kind {
      FacetKind::All => self.all,
      FacetKind::Building => self.by_building,
      FacetKind::Activity => self.by_activity,
      FacetKind::Radius => self.by_radius,
      FacetKind::Name => self.by_name,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexOptions {
  pub empty_results: EmptyResultPolicy,
  pub radius_mode:   RadiusMode,
}

// ─── Index ───────────────────────────────────────────────────────────────────

/// Read-side composition over a [`DirectoryStore`].
///
/// Cloning is cheap; the store is shared.
pub struct OrganizationIndex<S> {
  store:   Arc<S>,
  options: IndexOptions,
}

impl<S> Clone for OrganizationIndex<S> {
  fn clone(&self) -> Self {
    Self { store: Arc::clone(&self.store), options: self.options }
  }
}

impl<S> OrganizationIndex<S>
where
  S: DirectoryStore,
{
  pub fn new(store: Arc<S>, options: IndexOptions) -> Self { Self { store, options } }

  pub fn store(&self) -> &S { &self.store }

  pub fn options(&self) -> &IndexOptions { &self.options }

  /// Resolve `facet` to its raw set. An empty set is never an error here.
  pub async fn lookup(&self, facet: &OrganizationFacet) -> Result<Vec<Organization>> {
    let store = self.store.as_ref();
    let organizations = match facet {
      OrganizationFacet::All => {
        store.list_organizations().await.map_err(Error::persistence)?
      }
      OrganizationFacet::Building(id) => store
        .fetch_organizations_by_building_set(vec![*id])
        .await
        .map_err(Error::persistence)?,
      OrganizationFacet::Activity { id, scope } => {
        return self.by_activity(*id, *scope).await;
      }
      OrganizationFacet::Radius { center, radius_km } => {
        return self.by_radius(*center, *radius_km).await;
      }
      OrganizationFacet::Name(text) => store
        .fetch_organizations_by_name_substring(text.clone())
        .await
        .map_err(Error::persistence)?,
    };
    Ok(taxonomy::dedup_by_id(organizations))
  }

  /// [`lookup`](Self::lookup), then apply the configured
  /// [`EmptyResultPolicy`].
  pub async fn resolve(&self, facet: &OrganizationFacet) -> Result<Vec<Organization>> {
    let kind = facet.kind();
    let organizations = self.lookup(facet).await?;
    if organizations.is_empty()
      && self.options.empty_results.for_facet(kind) == EmptyResult::NotFound
    {
      return Err(Error::NoMatches(kind));
    }
    Ok(organizations)
  }

  /// Organizations linked to `id`, or to anything in its closure when
  /// `scope` is [`ActivityScope::WithDescendants`]. Both scopes go through
  /// the same set join.
  pub async fn by_activity(
    &self,
    id: Uuid,
    scope: ActivityScope,
  ) -> Result<Vec<Organization>> {
    let store = self.store.as_ref();
    let activity_ids: Vec<Uuid> = match scope {
      ActivityScope::Direct => vec![id],
      ActivityScope::WithDescendants => {
        taxonomy::activity_closure(store, id).await?.into_iter().collect()
      }
    };
    taxonomy::organizations_for_activities(store, activity_ids).await
  }

  /// Organizations housed in buildings within `radius_km` of `center`.
  ///
  /// Buildings are pre-filtered by [`geo::bounding_box`]. With
  /// [`RadiusMode::Haversine`] the survivors are checked against the true
  /// circle. No organization lookup is issued if no building qualifies.
  pub async fn by_radius(
    &self,
    center: GeoPoint,
    radius_km: f64,
  ) -> Result<Vec<Organization>> {
    let bbox = geo::bounding_box(center, radius_km)?;
    let store = self.store.as_ref();

    let mut buildings = store
      .fetch_buildings_in_box(bbox)
      .await
      .map_err(Error::persistence)?;
    if self.options.radius_mode == RadiusMode::Haversine {
      buildings.retain(|b| geo::haversine_km(center, b.location()) <= radius_km);
    }
    debug!(?bbox, candidates = buildings.len(), "radius pre-filter");

    if buildings.is_empty() {
      return Ok(Vec::new());
    }

    let building_ids = buildings.into_iter().map(|b| b.id).collect();
    let organizations = store
      .fetch_organizations_by_building_set(building_ids)
      .await
      .map_err(Error::persistence)?;
    Ok(taxonomy::dedup_by_id(organizations))
  }

  pub async fn get_organization(&self, id: Uuid) -> Result<Organization> {
    self
      .store
      .get_organization(id)
      .await
      .map_err(Error::persistence)?
      .ok_or_else(|| Error::not_found(Entity::Organization, id))
  }

  /// Validate and persist a new organization.
  ///
  /// The building and every referenced activity must exist. Repeated
  /// activity ids are collapsed, keeping first-seen order.
  pub async fn create_organization(
    &self,
    mut input: NewOrganization,
  ) -> Result<Organization> {
    validate::organization_name(&input.name)?;
    for number in &input.phone_numbers {
      validate::phone(number)?;
    }

    let store = self.store.as_ref();
    if store
      .get_building(input.building_id)
      .await
      .map_err(Error::persistence)?
      .is_none()
    {
      return Err(Error::UnknownBuilding(input.building_id));
    }

    let mut seen = HashSet::new();
    input.activity_ids.retain(|id| seen.insert(*id));
    for id in &input.activity_ids {
      if store
        .get_activity(*id)
        .await
        .map_err(Error::persistence)?
        .is_none()
      {
        return Err(Error::UnknownActivity(*id));
      }
    }

    let organization = store
      .insert_organization(input)
      .await
      .map_err(Error::persistence)?;
    info!(id = %organization.id, name = %organization.name, "created organization");
    Ok(organization)
  }
}
