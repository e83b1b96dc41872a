//! The `ActivityStore` trait.
//!
//! Implemented by storage backends (e.g. `lighthouse-store-sqlite`).
//! The harvester depends on this abstraction, not on any concrete
//! backend.

use std::future::Future;

use crate::activity::{Activity, ActivityRecord, WeaponDefinition};

/// Abstraction over the match archive backend.
///
/// All methods return `Send` futures so the trait can be used from
/// spawned tokio tasks.
pub trait ActivityStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Point lookup: has this activity id already been ingested?
  ///
  /// Called before any write for the id, making ingestion idempotent.
  fn contains_activity(
    &self,
    activity_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Fetch a previously ingested activity header, if any.
  fn get_activity(
    &self,
    activity_id: i64,
  ) -> impl Future<Output = Result<Option<Activity>, Self::Error>> + Send + '_;

  /// Persist the full row set for one activity in a single transaction.
  ///
  /// Either every row commits or none do.
  fn insert_record(
    &self,
    record: ActivityRecord,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Point lookup: is this weapon reference id already in the manifest?
  fn contains_weapon(
    &self,
    reference_id: i64,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Insert a weapon manifest row. Inserting an already-known reference
  /// id is a no-op, not an error.
  fn insert_weapon(
    &self,
    definition: WeaponDefinition,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}
