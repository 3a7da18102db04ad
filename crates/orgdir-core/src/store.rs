//! The `DirectoryStore` trait: the persistence surface the directory core
//! runs against.
//!
//! The trait is implemented by storage backends (e.g. `orgdir-store-sqlite`).
//! The taxonomy rules, closure expansion and radius filtering in this crate
//! are written against this abstraction only; backends just answer set
//! lookups and never enforce the depth rule themselves.

use std::future::Future;

use uuid::Uuid;

use crate::{
  activity::Activity,
  building::{Building, NewBuilding},
  geo::BoundingBox,
  organization::{NewOrganization, Organization},
};

/// Abstraction over a directory store backend.
///
/// Every method returns a `Send` future so the store can be shared across a
/// multi-threaded runtime (e.g. tokio under `axum`). Set-valued lookups may
/// return rows in any order; callers must not rely on it.
pub trait DirectoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Activities ────────────────────────────────────────────────────────

  /// The parent key of `activity_id`. `None` for roots and for unknown ids.
  fn fetch_parent_id(
    &self,
    activity_id: Uuid,
  ) -> impl Future<Output = Result<Option<Uuid>, Self::Error>> + Send + '_;

  /// Direct children of `activity_id` (one level only).
  fn fetch_children(
    &self,
    activity_id: Uuid,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;

  /// Persist a new activity under a freshly generated id. No depth check is
  /// performed here.
  fn insert_activity(
    &self,
    name: String,
    parent_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Activity, Self::Error>> + Send + '_;

  fn get_activity(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + '_;

  fn list_activities(
    &self,
  ) -> impl Future<Output = Result<Vec<Activity>, Self::Error>> + Send + '_;

  // ── Buildings ─────────────────────────────────────────────────────────

  fn insert_building(
    &self,
    input: NewBuilding,
  ) -> impl Future<Output = Result<Building, Self::Error>> + Send + '_;

  fn get_building(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Building>, Self::Error>> + Send + '_;

  fn list_buildings(
    &self,
  ) -> impl Future<Output = Result<Vec<Building>, Self::Error>> + Send + '_;

  /// Buildings whose coordinates fall inside `bbox`, bounds inclusive.
  fn fetch_buildings_in_box(
    &self,
    bbox: BoundingBox,
  ) -> impl Future<Output = Result<Vec<Building>, Self::Error>> + Send + '_;

  // ── Organizations ─────────────────────────────────────────────────────

  /// Insert the organization with all of its phones and activity links
  /// atomically. Referenced ids are assumed to exist.
  fn insert_organization(
    &self,
    input: NewOrganization,
  ) -> impl Future<Output = Result<Organization, Self::Error>> + Send + '_;

  fn get_organization(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Organization>, Self::Error>> + Send + '_;

  fn list_organizations(
    &self,
  ) -> impl Future<Output = Result<Vec<Organization>, Self::Error>> + Send + '_;

  /// Organizations linked to at least one of `activity_ids`, each once.
  fn fetch_organizations_by_activity_set(
    &self,
    activity_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<Organization>, Self::Error>> + Send + '_;

  /// Organizations housed in any of `building_ids`.
  fn fetch_organizations_by_building_set(
    &self,
    building_ids: Vec<Uuid>,
  ) -> impl Future<Output = Result<Vec<Organization>, Self::Error>> + Send + '_;

  /// Organizations whose name contains `text`, ignoring case.
  fn fetch_organizations_by_name_substring(
    &self,
    text: String,
  ) -> impl Future<Output = Result<Vec<Organization>, Self::Error>> + Send + '_;
}
