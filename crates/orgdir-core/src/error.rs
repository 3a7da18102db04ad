//! Error types for `orgdir-core`.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::index::FacetKind;

/// The kind of record a lookup failed to find.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
  Activity,
  Building,
  Organization,
}

impl fmt::Display for Entity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Self::Activity => "activity",
      Self::Building => "building",
      Self::Organization => "organization",
    })
  }
}

/// Coarse classification of an [`Error`]; outer layers map this onto their
/// own status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
  /// Malformed input. Never retried.
  Validation,
  /// A requested entity (or any match for a criterion) does not exist.
  NotFound,
  /// The storage backend failed.
  Persistence,
}

#[derive(Debug, Error)]
pub enum Error {
  // ── Validation ──────────────────────────────────────────────────────────
  #[error("{field} must not be empty")]
  EmptyField { field: &'static str },

  #[error("{field} must be at most {max} characters")]
  FieldTooLong { field: &'static str, max: usize },

  #[error("invalid phone number: {0:?}")]
  InvalidPhone(String),

  #[error("latitude {0} is outside [-90, 90]")]
  LatitudeOutOfRange(f64),

  #[error("longitude {0} is outside [-180, 180]")]
  LongitudeOutOfRange(f64),

  #[error("radius must be a positive number of kilometres, got {0}")]
  InvalidRadius(f64),

  #[error("maximum nesting depth of {max} exceeded under parent {parent}")]
  DepthExceeded { parent: Uuid, max: u8 },

  #[error("parent activity {0} does not exist")]
  UnknownParent(Uuid),

  #[error("building {0} does not exist")]
  UnknownBuilding(Uuid),

  #[error("activity {0} does not exist")]
  UnknownActivity(Uuid),

  // ── Not found ───────────────────────────────────────────────────────────
  #[error("{entity} not found: {id}")]
  NotFound { entity: Entity, id: Uuid },

  #[error("no organizations found by {0}")]
  NoMatches(FacetKind),

  // ── Storage ─────────────────────────────────────────────────────────────
  #[error("persistence error: {0}")]
  Persistence(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error without altering it.
  pub fn persistence<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Persistence(Box::new(err))
  }

  pub fn not_found(entity: Entity, id: Uuid) -> Self {
    Self::NotFound { entity, id }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      Self::NotFound { .. } | Self::NoMatches(_) => ErrorKind::NotFound,
      Self::Persistence(_) => ErrorKind::Persistence,
      _ => ErrorKind::Validation,
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
