//! SQL schema for the directory SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Taxonomy nodes reference their parent by key. The foreign key has no
-- cascade, so a parent with children cannot be deleted out from under them.
CREATE TABLE IF NOT EXISTS activities (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    parent_id   TEXT REFERENCES activities(id),
    created_at  TEXT NOT NULL,
    modified_at TEXT NOT NULL,
    CHECK (parent_id IS NULL OR parent_id != id)
);

CREATE TABLE IF NOT EXISTS buildings (
    id          TEXT PRIMARY KEY,
    address     TEXT NOT NULL,
    latitude    REAL NOT NULL CHECK (latitude  BETWEEN -90  AND 90),
    longitude   REAL NOT NULL CHECK (longitude BETWEEN -180 AND 180),
    created_at  TEXT NOT NULL,
    modified_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organizations (
    id          TEXT PRIMARY KEY,
    name        TEXT NOT NULL,
    name_folded TEXT NOT NULL,   -- lower-cased in Rust; SQLite lower() is ASCII-only
    building_id TEXT NOT NULL REFERENCES buildings(id),
    created_at  TEXT NOT NULL,
    modified_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organization_phones (
    id              TEXT PRIMARY KEY,
    organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    phone           TEXT NOT NULL,
    created_at      TEXT NOT NULL,
    modified_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS organization_activities (
    organization_id TEXT NOT NULL REFERENCES organizations(id) ON DELETE CASCADE,
    activity_id     TEXT NOT NULL REFERENCES activities(id),
    PRIMARY KEY (organization_id, activity_id)
);

CREATE INDEX IF NOT EXISTS activities_parent_idx       ON activities(parent_id);
CREATE INDEX IF NOT EXISTS buildings_location_idx      ON buildings(latitude, longitude);
CREATE INDEX IF NOT EXISTS organizations_building_idx  ON organizations(building_id);
CREATE INDEX IF NOT EXISTS phones_organization_idx     ON organization_phones(organization_id);
CREATE INDEX IF NOT EXISTS org_activities_activity_idx ON organization_activities(activity_id);

PRAGMA user_version = 1;
";
