//! Organizations and their owned phone numbers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{activity::Activity, building::Building};

/// A phone number owned by exactly one organization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phone {
  pub id:    Uuid,
  pub phone: String,
}

/// The read model of an organization, with its building, phones and
/// activities resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
  pub id:          Uuid,
  pub name:        String,
  pub building:    Building,
  pub phones:      Vec<Phone>,
  /// Referenced, not owned: deleting an organization never touches these.
  pub activities:  Vec<Activity>,
  pub created_at:  DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
}

/// Input to [`crate::index::OrganizationIndex::create_organization`].
///
/// The organization, its phones and its activity links are written in one
/// atomic step.
#[derive(Debug, Clone)]
pub struct NewOrganization {
  pub name:          String,
  pub building_id:   Uuid,
  pub phone_numbers: Vec<String>,
  pub activity_ids:  Vec<Uuid>,
}
