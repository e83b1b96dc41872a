//! Integration tests for `SqliteStore` against an in-memory database.

use chrono::{TimeZone, Utc};
use lighthouse_core::{
  activity::{
    Activity, ActivityRecord, CharacterActivityStat, TRIALS_MODE,
    WeaponDefinition, WeaponUsage,
  },
  store::ActivityStore,
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn activity(activity_id: i64) -> Activity {
  Activity {
    activity_id,
    period: Utc.with_ymd_and_hms(2026, 2, 14, 18, 0, 0).unwrap(),
    mode: TRIALS_MODE,
    director_activity_hash: 1166905690,
    reference_id: 3847433434,
  }
}

fn stat(activity_id: i64, character_id: i64) -> CharacterActivityStat {
  CharacterActivityStat {
    activity_id,
    character_id,
    membership_id: 4611686018467000000 + character_id,
    membership_type: 3,
    light_level: 1810,
    kills: 12,
    deaths: 4,
    opponents_defeated: 14,
    time_played_seconds: 540,
    precision_kills: 6,
    weapon_kills_super: 2,
  }
}

fn weapon(activity_id: i64, character_id: i64, reference_id: i64) -> WeaponUsage {
  WeaponUsage {
    activity_id,
    character_id,
    reference_id,
    kills: 8,
    precision_kills: 2,
    precision_ratio: 0.25,
  }
}

fn record(activity_id: i64, characters: &[i64]) -> ActivityRecord {
  ActivityRecord {
    activity: activity(activity_id),
    stats:    characters.iter().map(|&c| stat(activity_id, c)).collect(),
    weapons:  characters
      .iter()
      .map(|&c| weapon(activity_id, c, 1363886209))
      .collect(),
  }
}

async fn table_count(s: &SqliteStore, table: &str, activity_id: i64) -> i64 {
  let sql = format!("SELECT COUNT(*) FROM {table} WHERE activity = ?1");
  s.conn
    .call(move |conn| {
      Ok(conn.query_row(&sql, rusqlite::params![activity_id], |row| row.get(0))?)
    })
    .await
    .unwrap()
}

// ─── Activity ingestion ──────────────────────────────────────────────────────

#[tokio::test]
async fn insert_and_read_back_activity() {
  let s = store().await;
  s.insert_record(record(9000, &[100])).await.unwrap();

  let a = s.get_activity(9000).await.unwrap().expect("activity present");
  assert_eq!(a, activity(9000));
}

#[tokio::test]
async fn contains_activity_reflects_ingestion() {
  let s = store().await;
  assert!(!s.contains_activity(9000).await.unwrap());

  s.insert_record(record(9000, &[100])).await.unwrap();
  assert!(s.contains_activity(9000).await.unwrap());
  assert!(!s.contains_activity(9001).await.unwrap());
}

#[tokio::test]
async fn one_stat_row_per_participant() {
  let s = store().await;
  s.insert_record(record(9000, &[100, 200, 300, 400])).await.unwrap();

  assert_eq!(table_count(&s, "character_activity_stats", 9000).await, 4);
  assert_eq!(table_count(&s, "weapons", 9000).await, 4);
}

#[tokio::test]
async fn duplicate_activity_insert_is_rejected() {
  let s = store().await;
  s.insert_record(record(9000, &[100])).await.unwrap();

  // The unique activity_id constraint backs up the dedup check.
  assert!(s.insert_record(record(9000, &[100])).await.is_err());

  let a = s.get_activity(9000).await.unwrap().expect("activity present");
  assert_eq!(a.activity_id, 9000);
  assert_eq!(table_count(&s, "character_activity_stats", 9000).await, 1);
}

#[tokio::test]
async fn failed_ingestion_writes_nothing() {
  let s = store().await;

  // Duplicate (activity, character) pair violates a unique constraint
  // partway through the transaction; the header must roll back too.
  let bad = record(9000, &[100, 100]);
  assert!(s.insert_record(bad).await.is_err());

  assert!(!s.contains_activity(9000).await.unwrap());
  assert_eq!(table_count(&s, "character_activity_stats", 9000).await, 0);
  assert_eq!(table_count(&s, "weapons", 9000).await, 0);
}

// ─── Weapon manifest ─────────────────────────────────────────────────────────

#[tokio::test]
async fn weapon_manifest_roundtrip() {
  let s = store().await;
  assert!(!s.contains_weapon(1363886209).await.unwrap());

  s.insert_weapon(WeaponDefinition {
    reference_id: 1363886209,
    weapon_type:  Some(9),
    ammo_type:    Some(1),
  })
  .await
  .unwrap();

  assert!(s.contains_weapon(1363886209).await.unwrap());
}

#[tokio::test]
async fn duplicate_weapon_insert_is_a_noop() {
  let s = store().await;
  let def = WeaponDefinition {
    reference_id: 1363886209,
    weapon_type:  Some(9),
    ammo_type:    Some(1),
  };

  s.insert_weapon(def.clone()).await.unwrap();
  // Second insert must neither error nor overwrite.
  s.insert_weapon(WeaponDefinition { ammo_type: Some(3), ..def })
    .await
    .unwrap();

  let ammo: Option<i64> = s
    .conn
    .call(|conn| {
      Ok(conn.query_row(
        "SELECT ammo_type FROM weapons_manifest WHERE weapon_reference_id = 1363886209",
        [],
        |row| row.get(0),
      )?)
    })
    .await
    .unwrap();
  assert_eq!(ammo, Some(1));
}
