//! [`SqliteStore`] — the SQLite implementation of [`ActivityStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::OptionalExtension as _;

use lighthouse_core::{
  activity::{Activity, ActivityRecord, WeaponDefinition},
  store::ActivityStore,
};

use crate::{Error, Result, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A match archive backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
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
}

fn encode_period(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339()
}

fn decode_period(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── ActivityStore impl ──────────────────────────────────────────────────────

impl ActivityStore for SqliteStore {
  type Error = Error;

  async fn contains_activity(&self, activity_id: i64) -> Result<bool> {
    let present: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM activity WHERE activity_id = ?1",
              rusqlite::params![activity_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(present)
  }

  async fn get_activity(&self, activity_id: i64) -> Result<Option<Activity>> {
    let raw: Option<(i64, String, i64, i64, i64)> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT activity_id, period, mode, director_activity_hash, reference_id
               FROM activity WHERE activity_id = ?1",
              rusqlite::params![activity_id],
              |row| {
                Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw
      .map(|(activity_id, period, mode, director_activity_hash, reference_id)| {
        Ok(Activity {
          activity_id,
          period: decode_period(&period)?,
          mode,
          director_activity_hash,
          reference_id,
        })
      })
      .transpose()
  }

  async fn insert_record(&self, record: ActivityRecord) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        // One transaction per logical ingestion: the header, every stat
        // row and every weapon row commit together or not at all.
        let tx = conn.transaction()?;

        let a = &record.activity;
        tx.execute(
          "INSERT INTO activity
             (activity_id, period, mode, director_activity_hash, reference_id)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            a.activity_id,
            encode_period(a.period),
            a.mode,
            a.director_activity_hash,
            a.reference_id,
          ],
        )?;

        for s in &record.stats {
          tx.execute(
            "INSERT INTO character_activity_stats
               (activity, character, membership_id, membership_type,
                light_level, kills, deaths, opponents_defeated,
                time_played_seconds, precision_kills, weapon_kills_super)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            rusqlite::params![
              s.activity_id,
              s.character_id,
              s.membership_id,
              s.membership_type,
              s.light_level,
              s.kills,
              s.deaths,
              s.opponents_defeated,
              s.time_played_seconds,
              s.precision_kills,
              s.weapon_kills_super,
            ],
          )?;
        }

        for w in &record.weapons {
          tx.execute(
            "INSERT INTO weapons
               (activity, character, reference_id, kills,
                precision_kills, precision_ratio)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
              w.activity_id,
              w.character_id,
              w.reference_id,
              w.kills,
              w.precision_kills,
              w.precision_ratio,
            ],
          )?;
        }

        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn contains_weapon(&self, reference_id: i64) -> Result<bool> {
    let present: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM weapons_manifest WHERE weapon_reference_id = ?1",
              rusqlite::params![reference_id],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(present)
  }

  async fn insert_weapon(&self, definition: WeaponDefinition) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        // Best-effort: a concurrent backfill of the same reference id
        // must not surface as an error.
        conn.execute(
          "INSERT OR IGNORE INTO weapons_manifest
             (weapon_reference_id, weapon_type, ammo_type)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![
            definition.reference_id,
            definition.weapon_type,
            definition.ammo_type,
          ],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}
