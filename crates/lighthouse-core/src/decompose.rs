//! Decomposition of one carnage report into normalized rows.

use crate::{
  Error, Result,
  activity::{
    Activity, ActivityRecord, CharacterActivityStat, TRIALS_MODE, WeaponUsage,
  },
  report::{CarnageReport, ParticipantEntry, Stat},
};

/// Outcome of decomposing one report.
#[derive(Debug, Clone, PartialEq)]
pub enum Decomposed {
  /// A Trials match; carries the full row set ready for persistence.
  Trials(ActivityRecord),
  /// Any other activity mode; nothing to persist.
  Skipped { mode: i64 },
}

/// Map a parsed carnage report onto normalized rows.
///
/// Reports whose mode is not [`TRIALS_MODE`] come back as
/// [`Decomposed::Skipped`]. A missing or unparseable required field is a
/// [`Error::MalformedReport`]; optional extended statistics default to
/// zero instead of failing the record.
pub fn decompose(activity_id: i64, report: &CarnageReport) -> Result<Decomposed> {
  let details = &report.response.activity_details;
  if details.mode != TRIALS_MODE {
    return Ok(Decomposed::Skipped { mode: details.mode });
  }

  let activity = Activity {
    activity_id,
    period: report.response.period,
    mode: details.mode,
    director_activity_hash: details.director_activity_hash,
    reference_id: details.reference_id,
  };

  let mut stats = Vec::with_capacity(report.response.entries.len());
  let mut weapons = Vec::new();

  for entry in &report.response.entries {
    let character_id = parse_handle(activity_id, &entry.character_id, "characterId")?;
    stats.push(participant_stat(activity_id, character_id, entry)?);

    let Some(extended) = &entry.extended else { continue };
    for weapon in &extended.weapons {
      // The remote reports weapon kills through the display string; the
      // float value is a rounded duplicate we fall back on.
      let kills = weapon
        .values
        .unique_weapon_kills
        .basic
        .display_value
        .parse::<i64>()
        .unwrap_or_else(|_| count(&weapon.values.unique_weapon_kills));
      let precision_kills = weapon
        .values
        .unique_weapon_precision_kills
        .as_ref()
        .map(count)
        .unwrap_or(0);

      weapons.push(WeaponUsage {
        activity_id,
        character_id,
        reference_id: weapon.reference_id,
        kills,
        precision_kills,
        precision_ratio: precision_ratio(kills, precision_kills),
      });
    }
  }

  Ok(Decomposed::Trials(ActivityRecord { activity, stats, weapons }))
}

fn participant_stat(
  activity_id: i64,
  character_id: i64,
  entry: &ParticipantEntry,
) -> Result<CharacterActivityStat> {
  let membership_id = parse_handle(
    activity_id,
    &entry.player.destiny_user_info.membership_id,
    "membershipId",
  )?;

  let (precision_kills, weapon_kills_super) = match &entry.extended {
    Some(ext) => (
      ext.values.precision_kills.as_ref().map(count).unwrap_or(0),
      ext.values.weapon_kills_super.as_ref().map(count).unwrap_or(0),
    ),
    None => (0, 0),
  };

  Ok(CharacterActivityStat {
    activity_id,
    character_id,
    membership_id,
    membership_type: entry.player.destiny_user_info.membership_type,
    light_level: entry.player.light_level,
    kills: count(&entry.values.kills),
    deaths: count(&entry.values.deaths),
    opponents_defeated: count(&entry.values.opponents_defeated),
    time_played_seconds: count(&entry.values.time_played_seconds),
    precision_kills,
    weapon_kills_super,
  })
}

/// Parse one of the remote's stringly-typed numeric handles.
fn parse_handle(activity_id: i64, raw: &str, field: &'static str) -> Result<i64> {
  raw
    .parse()
    .map_err(|_| Error::MalformedReport { activity_id, field })
}

/// Counters arrive as floats; they are integral in practice.
fn count(stat: &Stat) -> i64 {
  stat.basic.value.round() as i64
}

fn precision_ratio(kills: i64, precision_kills: i64) -> f64 {
  if kills > 0 {
    precision_kills as f64 / kills as f64
  } else {
    0.0
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  fn entry(character_id: &str, extended: serde_json::Value) -> serde_json::Value {
    let mut e = json!({
      "characterId": character_id,
      "player": {
        "destinyUserInfo": { "membershipId": "4611686018467000001", "membershipType": 3 },
        "lightLevel": 1810,
      },
      "values": {
        "kills":             { "basic": { "value": 12.0, "displayValue": "12" } },
        "deaths":            { "basic": { "value": 4.0,  "displayValue": "4" } },
        "opponentsDefeated": { "basic": { "value": 14.0, "displayValue": "14" } },
        "timePlayedSeconds": { "basic": { "value": 540.0, "displayValue": "9m 0s" } },
      },
    });
    if !extended.is_null() {
      e["extended"] = extended;
    }
    e
  }

  fn report(mode: i64, entries: Vec<serde_json::Value>) -> CarnageReport {
    serde_json::from_value(json!({
      "Response": {
        "period": "2026-02-14T18:00:00Z",
        "activityDetails": {
          "mode": mode,
          "directorActivityHash": 1166905690_i64,
          "referenceId": 3847433434_i64,
        },
        "entries": entries,
      },
      "ThrottleSeconds": 0,
    }))
    .expect("valid report fixture")
  }

  #[test]
  fn non_trials_mode_is_skipped() {
    let r = report(5, vec![entry("100", serde_json::Value::Null)]);
    assert_eq!(decompose(9000, &r).unwrap(), Decomposed::Skipped { mode: 5 });
  }

  #[test]
  fn trials_report_yields_one_stat_row_per_entry() {
    let r = report(84, vec![
      entry("100", serde_json::Value::Null),
      entry("200", serde_json::Value::Null),
      entry("300", serde_json::Value::Null),
    ]);
    let Decomposed::Trials(record) = decompose(9000, &r).unwrap() else {
      panic!("expected Trials decomposition");
    };
    assert_eq!(record.activity.activity_id, 9000);
    assert_eq!(record.stats.len(), 3);
    assert!(record.weapons.is_empty());
  }

  #[test]
  fn missing_extended_block_defaults_to_zero() {
    let r = report(84, vec![entry("100", serde_json::Value::Null)]);
    let Decomposed::Trials(record) = decompose(9000, &r).unwrap() else {
      panic!("expected Trials decomposition");
    };
    assert_eq!(record.stats[0].precision_kills, 0);
    assert_eq!(record.stats[0].weapon_kills_super, 0);
  }

  #[test]
  fn extended_stats_and_weapons_are_extracted() {
    let extended = json!({
      "values": {
        "precisionKills":   { "basic": { "value": 6.0, "displayValue": "6" } },
        "weaponKillsSuper": { "basic": { "value": 2.0, "displayValue": "2" } },
      },
      "weapons": [{
        "referenceId": 1363886209_i64,
        "values": {
          "uniqueWeaponKills":          { "basic": { "value": 8.0, "displayValue": "8" } },
          "uniqueWeaponPrecisionKills": { "basic": { "value": 2.0, "displayValue": "2" } },
        },
      }],
    });
    let r = report(84, vec![entry("100", extended)]);
    let Decomposed::Trials(record) = decompose(9000, &r).unwrap() else {
      panic!("expected Trials decomposition");
    };

    assert_eq!(record.stats[0].precision_kills, 6);
    assert_eq!(record.stats[0].weapon_kills_super, 2);

    assert_eq!(record.weapons.len(), 1);
    let w = &record.weapons[0];
    assert_eq!(w.reference_id, 1363886209);
    assert_eq!(w.kills, 8);
    assert_eq!(w.precision_kills, 2);
    assert!((w.precision_ratio - 0.25).abs() < f64::EPSILON);
  }

  #[test]
  fn weapon_without_precision_stat_defaults_to_zero() {
    let extended = json!({
      "weapons": [{
        "referenceId": 1363886209_i64,
        "values": {
          "uniqueWeaponKills": { "basic": { "value": 5.0, "displayValue": "5" } },
        },
      }],
    });
    let r = report(84, vec![entry("100", extended)]);
    let Decomposed::Trials(record) = decompose(9000, &r).unwrap() else {
      panic!("expected Trials decomposition");
    };
    assert_eq!(record.weapons[0].precision_kills, 0);
    assert_eq!(record.weapons[0].precision_ratio, 0.0);
  }

  #[test]
  fn unparseable_character_id_is_malformed() {
    let r = report(84, vec![entry("not-a-number", serde_json::Value::Null)]);
    let err = decompose(9000, &r).unwrap_err();
    assert!(matches!(
      err,
      Error::MalformedReport { activity_id: 9000, field: "characterId" }
    ));
  }

  #[test]
  fn weapon_references_deduplicates_across_entries() {
    let extended = json!({
      "weapons": [{
        "referenceId": 77_i64,
        "values": {
          "uniqueWeaponKills": { "basic": { "value": 3.0, "displayValue": "3" } },
        },
      }],
    });
    let r = report(84, vec![
      entry("100", extended.clone()),
      entry("200", extended),
    ]);
    let Decomposed::Trials(record) = decompose(9000, &r).unwrap() else {
      panic!("expected Trials decomposition");
    };
    assert_eq!(record.weapon_references(), vec![77]);
  }
}
