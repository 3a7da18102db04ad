//! Activity: a node in the classification taxonomy.
//!
//! Nodes reference their parent by key only. Children are never stored on the
//! parent; they are discovered through
//! [`DirectoryStore::fetch_children`](crate::store::DirectoryStore::fetch_children).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
  pub id:          Uuid,
  pub name:        String,
  /// `None` for a taxonomy root.
  pub parent_id:   Option<Uuid>,
  pub created_at:  DateTime<Utc>,
  pub modified_at: DateTime<Utc>,
}

impl Activity {
  pub fn is_root(&self) -> bool { self.parent_id.is_none() }
}

/// Input to [`crate::taxonomy::create_activity`].
#[derive(Debug, Clone)]
pub struct NewActivity {
  pub name:      String,
  pub parent_id: Option<Uuid>,
}

impl NewActivity {
  pub fn root(name: impl Into<String>) -> Self {
    Self { name: name.into(), parent_id: None }
  }

  pub fn child(name: impl Into<String>, parent_id: Uuid) -> Self {
    Self { name: name.into(), parent_id: Some(parent_id) }
  }
}
