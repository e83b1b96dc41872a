//! SQL schema for the Lighthouse SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on the `PRAGMA user_version` number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- One row per ingested match. Written at most once per activity_id and
-- never updated; deleting a row cascades through every child table.
CREATE TABLE IF NOT EXISTS activity (
    activity_id            INTEGER PRIMARY KEY,
    period                 TEXT NOT NULL,      -- ISO 8601 UTC
    mode                   INTEGER NOT NULL,
    director_activity_hash INTEGER NOT NULL,
    reference_id           INTEGER NOT NULL    -- map
);

CREATE TABLE IF NOT EXISTS character_activity_stats (
    id                  INTEGER PRIMARY KEY AUTOINCREMENT,
    activity            INTEGER NOT NULL
                        REFERENCES activity(activity_id) ON DELETE CASCADE,
    character           INTEGER NOT NULL,
    membership_id       INTEGER NOT NULL,
    membership_type     INTEGER NOT NULL,
    light_level         INTEGER NOT NULL,
    kills               INTEGER NOT NULL,
    deaths              INTEGER NOT NULL,
    opponents_defeated  INTEGER NOT NULL,
    time_played_seconds INTEGER NOT NULL,
    precision_kills     INTEGER NOT NULL DEFAULT 0,
    weapon_kills_super  INTEGER NOT NULL DEFAULT 0,
    UNIQUE (activity, character)
);

CREATE TABLE IF NOT EXISTS weapons (
    id              INTEGER PRIMARY KEY AUTOINCREMENT,
    activity        INTEGER NOT NULL
                    REFERENCES activity(activity_id) ON DELETE CASCADE,
    character       INTEGER NOT NULL,
    reference_id    INTEGER NOT NULL,
    kills           INTEGER NOT NULL,
    precision_kills INTEGER NOT NULL DEFAULT 0,
    precision_ratio REAL NOT NULL DEFAULT 0,
    UNIQUE (activity, character, reference_id)
);

-- Static per-weapon lookup, filled lazily on first encounter of a
-- reference id.
CREATE TABLE IF NOT EXISTS weapons_manifest (
    weapon_reference_id INTEGER PRIMARY KEY,
    weapon_type         INTEGER,
    ammo_type           INTEGER
);

CREATE INDEX IF NOT EXISTS cas_activity_idx     ON character_activity_stats(activity);
CREATE INDEX IF NOT EXISTS cas_character_idx    ON character_activity_stats(character);
CREATE INDEX IF NOT EXISTS weapons_activity_idx ON weapons(activity);
CREATE INDEX IF NOT EXISTS weapons_ref_idx      ON weapons(reference_id);

PRAGMA user_version = 1;
";
