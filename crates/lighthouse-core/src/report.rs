//! Typed schema of the post-game carnage report API payload.
//!
//! Only the fields the harvester consumes are modelled. Required fields
//! are plain members, so a report missing one fails at deserialisation
//! rather than deep inside ingestion; everything the remote treats as
//! optional is an `Option` or defaulted.

use chrono::{DateTime, Utc};
use serde::Deserialize;

/// Top-level envelope of a carnage-report response.
#[derive(Debug, Clone, Deserialize)]
pub struct CarnageReport {
  #[serde(rename = "Response")]
  pub response: ReportBody,

  /// Server-supplied hint that the client should slow down, in seconds.
  /// Zero means no throttling requested.
  #[serde(rename = "ThrottleSeconds", default)]
  pub throttle_seconds: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBody {
  pub period:           DateTime<Utc>,
  pub activity_details: ActivityDetails,
  pub entries:          Vec<ParticipantEntry>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityDetails {
  pub mode:                   i64,
  pub director_activity_hash: i64,
  pub reference_id:           i64,
}

/// One participant in the match.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantEntry {
  /// Transmitted as a decimal string by the remote API.
  pub character_id: String,
  pub player:       Player,
  pub values:       StatBlock,
  #[serde(default)]
  pub extended:     Option<ExtendedStats>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
  pub destiny_user_info: UserInfo,
  #[serde(default)]
  pub light_level:       i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
  /// Transmitted as a decimal string by the remote API.
  pub membership_id:   String,
  #[serde(default)]
  pub membership_type: i64,
}

/// The always-present per-participant counters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBlock {
  pub kills:               Stat,
  pub deaths:              Stat,
  pub opponents_defeated:  Stat,
  pub time_played_seconds: Stat,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stat {
  pub basic: BasicValue,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasicValue {
  pub value:         f64,
  #[serde(default)]
  pub display_value: String,
}

/// The optional extended block: precision/super counters plus the
/// per-weapon breakdown.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedStats {
  #[serde(default)]
  pub values:  ExtendedValues,
  #[serde(default)]
  pub weapons: Vec<WeaponEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtendedValues {
  #[serde(default)]
  pub precision_kills:    Option<Stat>,
  #[serde(default)]
  pub weapon_kills_super: Option<Stat>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponEntry {
  pub reference_id: i64,
  pub values:       WeaponValues,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeaponValues {
  pub unique_weapon_kills:           Stat,
  #[serde(default)]
  pub unique_weapon_precision_kills: Option<Stat>,
}

// ─── Item manifest ───────────────────────────────────────────────────────────

/// Envelope of an inventory-item definition lookup.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemDefinitionResponse {
  #[serde(rename = "Response")]
  pub response: ItemDefinition,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemDefinition {
  #[serde(default)]
  pub item_sub_type:   Option<i64>,
  #[serde(default)]
  pub equipping_block: Option<EquippingBlock>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EquippingBlock {
  pub ammo_type: i64,
}
