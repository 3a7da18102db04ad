//! Activity taxonomy: depth-limited creation and descendant closure.
//!
//! The taxonomy is a forest of at most [`MAX_DEPTH`] levels. Depth is counted
//! from the node itself (a root has depth 1) by following parent keys upward.
//! The rule is checked when a node is created; nothing re-checks it later
//! because no operation ever moves a node.

use std::collections::{BTreeMap, HashSet};

use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::{
  Entity, Error, Result,
  activity::{Activity, NewActivity},
  organization::Organization,
  store::DirectoryStore,
  validate,
};

/// Deepest level an activity may sit at (root = 1).
pub const MAX_DEPTH: u8 = 3;

// ─── Depth ───────────────────────────────────────────────────────────────────

/// Depth of `activity_id`, counting the node itself as 1.
///
/// The walk stops as soon as the running depth passes [`MAX_DEPTH`], so it
/// issues at most `MAX_DEPTH` parent lookups and returns at most
/// `MAX_DEPTH + 1`, even if the stored parent chain loops. An unknown id has
/// no parent and therefore reports depth 1.
pub async fn depth_of<S>(store: &S, activity_id: Uuid) -> Result<u8>
where
  S: DirectoryStore,
{
  let mut depth = 1;
  let mut current = activity_id;

  while let Some(parent) = store
    .fetch_parent_id(current)
    .await
    .map_err(Error::persistence)?
  {
    depth += 1;
    current = parent;
    if depth > MAX_DEPTH {
      break;
    }
  }

  Ok(depth)
}

// ─── Creation ────────────────────────────────────────────────────────────────

/// Create an activity, refusing to place it below [`MAX_DEPTH`].
///
/// A parent that does not exist is rejected with [`Error::UnknownParent`]. A
/// parent already at depth `MAX_DEPTH` is rejected with
/// [`Error::DepthExceeded`]. Nothing is written when either check fails.
pub async fn create_activity<S>(store: &S, input: NewActivity) -> Result<Activity>
where
  S: DirectoryStore,
{
  validate::activity_name(&input.name)?;

  if let Some(parent) = input.parent_id {
    if store
      .get_activity(parent)
      .await
      .map_err(Error::persistence)?
      .is_none()
    {
      return Err(Error::UnknownParent(parent));
    }

    let depth = depth_of(store, parent).await?;
    if depth >= MAX_DEPTH {
      warn!(%parent, depth, "rejected activity below maximum depth");
      return Err(Error::DepthExceeded { parent, max: MAX_DEPTH });
    }
  }

  let activity = store
    .insert_activity(input.name, input.parent_id)
    .await
    .map_err(Error::persistence)?;

  info!(id = %activity.id, parent = ?activity.parent_id, "created activity");
  Ok(activity)
}

pub async fn get_activity<S>(store: &S, id: Uuid) -> Result<Activity>
where
  S: DirectoryStore,
{
  store
    .get_activity(id)
    .await
    .map_err(Error::persistence)?
    .ok_or_else(|| Error::not_found(Entity::Activity, id))
}

pub async fn list_activities<S>(store: &S) -> Result<Vec<Activity>>
where
  S: DirectoryStore,
{
  store.list_activities().await.map_err(Error::persistence)
}

// ─── Closure ─────────────────────────────────────────────────────────────────

/// The ids of `root` and its descendants, bounded to [`MAX_DEPTH`] levels
/// counted from `root` itself.
///
/// Expansion is level by level: each round adds the children of the previous
/// round's new ids. It stops when a round adds nothing or the level budget is
/// spent. An unknown `root` yields just `{root}`.
pub async fn activity_closure<S>(store: &S, root: Uuid) -> Result<HashSet<Uuid>>
where
  S: DirectoryStore,
{
  let mut closure = HashSet::from([root]);
  let mut frontier = vec![root];
  let mut level = 1;

  while level < MAX_DEPTH && !frontier.is_empty() {
    let mut next = Vec::new();
    for id in &frontier {
      let children = store
        .fetch_children(*id)
        .await
        .map_err(Error::persistence)?;
      for child in children {
        if closure.insert(child.id) {
          next.push(child.id);
        }
      }
    }
    frontier = next;
    level += 1;
  }

  debug!(%root, size = closure.len(), "resolved activity closure");
  Ok(closure)
}

/// Organizations linked to any activity in `activity_ids`, each appearing
/// once.
pub(crate) async fn organizations_for_activities<S>(
  store: &S,
  activity_ids: Vec<Uuid>,
) -> Result<Vec<Organization>>
where
  S: DirectoryStore,
{
  let organizations = store
    .fetch_organizations_by_activity_set(activity_ids)
    .await
    .map_err(Error::persistence)?;
  Ok(dedup_by_id(organizations))
}

/// Organizations reachable through the closure of `root`.
pub async fn organizations_in_closure<S>(
  store: &S,
  root: Uuid,
) -> Result<Vec<Organization>>
where
  S: DirectoryStore,
{
  let closure = activity_closure(store, root).await?;
  organizations_for_activities(store, closure.into_iter().collect()).await
}

/// Collapse duplicates and order by name, then id.
pub(crate) fn dedup_by_id(organizations: Vec<Organization>) -> Vec<Organization> {
  let unique: BTreeMap<Uuid, Organization> = organizations
    .into_iter()
    .map(|org| (org.id, org))
    .collect();
  let mut out: Vec<Organization> = unique.into_values().collect();
  out.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
  out
}
