//! Normalized rows produced from one carnage report.
//!
//! These are the shapes the store persists. One report decomposes into a
//! single [`Activity`] header, one [`CharacterActivityStat`] per
//! participant, and zero or more [`WeaponUsage`] rows.

use chrono::{DateTime, Utc};

/// The activity-mode code for Trials matches. Reports with any other
/// mode are discarded before they reach the store.
pub const TRIALS_MODE: i64 = 84;

/// One completed match instance. Written at most once per
/// `activity_id`; never updated.
#[derive(Debug, Clone, PartialEq)]
pub struct Activity {
  pub activity_id:            i64,
  pub period:                 DateTime<Utc>,
  pub mode:                   i64,
  pub director_activity_hash: i64,
  pub reference_id:           i64,
}

/// One participant's performance within one activity.
#[derive(Debug, Clone, PartialEq)]
pub struct CharacterActivityStat {
  pub activity_id:         i64,
  pub character_id:        i64,
  pub membership_id:       i64,
  pub membership_type:     i64,
  pub light_level:         i64,
  pub kills:               i64,
  pub deaths:              i64,
  pub opponents_defeated:  i64,
  pub time_played_seconds: i64,
  /// 0 when the report carries no extended stats block.
  pub precision_kills:     i64,
  /// 0 when the report carries no extended stats block.
  pub weapon_kills_super:  i64,
}

/// One weapon's usage within one participant's activity record.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponUsage {
  pub activity_id:     i64,
  pub character_id:    i64,
  pub reference_id:    i64,
  pub kills:           i64,
  pub precision_kills: i64,
  /// Computed locally as `precision_kills / kills`; never trusted from
  /// the source.
  pub precision_ratio: f64,
}

/// Static lookup row for a weapon, populated lazily from the item
/// manifest on first encounter of a reference id.
#[derive(Debug, Clone, PartialEq)]
pub struct WeaponDefinition {
  pub reference_id: i64,
  pub weapon_type:  Option<i64>,
  pub ammo_type:    Option<i64>,
}

/// The full set of rows for one activity. Persisted atomically: either
/// every row commits or none do.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
  pub activity: Activity,
  pub stats:    Vec<CharacterActivityStat>,
  pub weapons:  Vec<WeaponUsage>,
}

impl ActivityRecord {
  /// Distinct weapon reference ids across all participants, in
  /// ascending order. Used to drive manifest backfill.
  pub fn weapon_references(&self) -> Vec<i64> {
    let mut refs: Vec<i64> = self.weapons.iter().map(|w| w.reference_id).collect();
    refs.sort_unstable();
    refs.dedup();
    refs
  }
}
