//! Error types for `lighthouse-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was missing or unparseable in an otherwise
  /// well-formed carnage report.
  #[error("malformed report for activity {activity_id}: bad {field}")]
  MalformedReport {
    activity_id: i64,
    field:       &'static str,
  },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
