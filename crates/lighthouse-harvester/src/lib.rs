//! Fetch-and-ingest pipeline for Trials match reports.
//!
//! Wires the API client, rate gate, retry pool and sweep loop around a
//! [`lighthouse_core::store::ActivityStore`] backend.

pub mod client;
pub mod error;
pub mod retry;
pub mod sweep;

pub use error::{Error, Result};

use std::{path::PathBuf, time::Duration};

use serde::Deserialize;

use lighthouse_core::policy::Backoff;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration, deserialised from `config.toml` and the
/// `LIGHTHOUSE_*` environment. Every field has a default so a bare
/// invocation works.
#[derive(Debug, Clone, Deserialize)]
pub struct HarvesterConfig {
  #[serde(default = "defaults::api_base")]
  pub api_base: String,

  #[serde(default = "defaults::store_path")]
  pub store_path: PathBuf,

  /// Rate-gate capacity, and the size of each sweep round.
  #[serde(default = "defaults::concurrency")]
  pub concurrency: usize,

  /// Seconds between retry-pool sweeps.
  #[serde(default = "defaults::retry_sweep_secs")]
  pub retry_sweep_secs: u64,

  /// Per-request timeout in seconds.
  #[serde(default = "defaults::request_timeout_secs")]
  pub request_timeout_secs: u64,

  #[serde(default = "defaults::max_attempts")]
  pub max_attempts: u32,

  #[serde(default = "defaults::backoff_base_ms")]
  pub backoff_base_ms: u64,

  #[serde(default = "defaults::backoff_multiplier")]
  pub backoff_multiplier: u32,
}

impl Default for HarvesterConfig {
  fn default() -> Self {
    Self {
      api_base:             defaults::api_base(),
      store_path:           defaults::store_path(),
      concurrency:          defaults::concurrency(),
      retry_sweep_secs:     defaults::retry_sweep_secs(),
      request_timeout_secs: defaults::request_timeout_secs(),
      max_attempts:         defaults::max_attempts(),
      backoff_base_ms:      defaults::backoff_base_ms(),
      backoff_multiplier:   defaults::backoff_multiplier(),
    }
  }
}

impl HarvesterConfig {
  pub fn backoff(&self) -> Backoff {
    Backoff {
      max_attempts: self.max_attempts,
      base_delay:   Duration::from_millis(self.backoff_base_ms),
      multiplier:   self.backoff_multiplier,
    }
  }

  pub fn request_timeout(&self) -> Duration {
    Duration::from_secs(self.request_timeout_secs)
  }

  pub fn retry_interval(&self) -> Duration {
    Duration::from_secs(self.retry_sweep_secs)
  }
}

mod defaults {
  use std::path::PathBuf;

  pub fn api_base() -> String {
    "https://www.bungie.net/Platform/Destiny2".to_string()
  }
  pub fn store_path() -> PathBuf {
    PathBuf::from("lighthouse.sqlite")
  }
  pub fn concurrency() -> usize {
    40
  }
  pub fn retry_sweep_secs() -> u64 {
    60
  }
  pub fn request_timeout_secs() -> u64 {
    30
  }
  pub fn max_attempts() -> u32 {
    5
  }
  pub fn backoff_base_ms() -> u64 {
    1000
  }
  pub fn backoff_multiplier() -> u32 {
    2
  }
}
