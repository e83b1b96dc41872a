//! Async HTTP client for the remote game-statistics API.

use std::{future::Future, time::Duration};

use reqwest::Client;
use tokio::time::sleep;
use tracing::{debug, warn};

use lighthouse_core::{
  activity::WeaponDefinition,
  policy::Backoff,
  report::{CarnageReport, ItemDefinitionResponse},
};

use crate::Result;

// ─── Fetch outcomes ──────────────────────────────────────────────────────────

/// Terminal result of one carnage-report fetch, retries included.
///
/// Nothing here is an `Err`: every way a fetch can end is an expected
/// condition the sweep loop routes differently.
#[derive(Debug, Clone)]
pub enum FetchOutcome {
  /// A 200 response that parsed as a carnage report.
  Report(Box<CarnageReport>),
  /// Non-success statuses (or connection errors) past the retry budget.
  /// The id belongs in the retry pool.
  Exhausted { status: Option<u16> },
  /// The request timed out. Terminal for this attempt; no in-call retry.
  TimedOut,
  /// A 200 response whose body did not decode. Skipped, never retried.
  Malformed,
}

/// The seam between the sweep loop and the network.
///
/// [`ApiClient`] is the production implementation; tests substitute a
/// scripted fake.
pub trait ReportApi: Send + Sync {
  /// Fetch the carnage report for one activity id.
  fn fetch_report(
    &self,
    activity_id: i64,
  ) -> impl Future<Output = FetchOutcome> + Send + '_;

  /// Look up the manifest definition for a weapon reference id.
  /// `None` means the lookup failed; the caller treats it as skippable.
  fn fetch_weapon(
    &self,
    reference_id: i64,
  ) -> impl Future<Output = Option<WeaponDefinition>> + Send + '_;
}

// ─── Client ──────────────────────────────────────────────────────────────────

enum GetOutcome {
  Body(reqwest::Response),
  Exhausted { status: Option<u16> },
  TimedOut,
}

/// Cheap to clone — the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Clone)]
pub struct ApiClient {
  http:     Client,
  base_url: String,
  api_key:  String,
  backoff:  Backoff,
}

impl ApiClient {
  pub fn new(
    base_url: &str,
    api_key: String,
    timeout: Duration,
    backoff: Backoff,
  ) -> Result<Self> {
    let http = Client::builder().timeout(timeout).build()?;
    Ok(Self {
      http,
      base_url: base_url.trim_end_matches('/').to_string(),
      api_key,
      backoff,
    })
  }

  fn report_url(&self, activity_id: i64) -> String {
    format!(
      "{}/Stats/PostGameCarnageReport/{activity_id}/",
      self.base_url
    )
  }

  fn item_url(&self, reference_id: i64) -> String {
    format!(
      "{}/Manifest/DestinyInventoryItemDefinition/{reference_id}/",
      self.base_url
    )
  }

  /// GET `url` with the API-key header, retrying non-success statuses
  /// and connection errors under the backoff policy. Timeouts are
  /// terminal immediately.
  async fn get(&self, url: &str) -> GetOutcome {
    let mut failures = 0u32;
    loop {
      let result = self
        .http
        .get(url)
        .header("X-API-Key", &self.api_key)
        .send()
        .await;

      match result {
        Ok(resp) if resp.status().is_success() => return GetOutcome::Body(resp),
        Ok(resp) => {
          let status = resp.status().as_u16();
          failures += 1;
          if self.backoff.exhausted(failures) {
            return GetOutcome::Exhausted { status: Some(status) };
          }
          debug!(url, status, failures, "request failed, backing off");
          sleep(self.backoff.delay(failures)).await;
        }
        Err(err) if err.is_timeout() => return GetOutcome::TimedOut,
        Err(err) => {
          // Connection refused/reset retries like a bad status.
          failures += 1;
          if self.backoff.exhausted(failures) {
            return GetOutcome::Exhausted { status: None };
          }
          debug!(url, %err, failures, "connection error, backing off");
          sleep(self.backoff.delay(failures)).await;
        }
      }
    }
  }
}

impl ReportApi for ApiClient {
  async fn fetch_report(&self, activity_id: i64) -> FetchOutcome {
    match self.get(&self.report_url(activity_id)).await {
      GetOutcome::Body(resp) => match resp.json::<CarnageReport>().await {
        Ok(report) => {
          if report.throttle_seconds > 0.0 {
            // Recognised but not acted on; whether to honour the wait
            // is an open item recorded in DESIGN.md.
            warn!(
              activity_id,
              throttle_seconds = report.throttle_seconds,
              "server sent a throttle directive"
            );
          }
          FetchOutcome::Report(Box::new(report))
        }
        Err(err) => {
          warn!(activity_id, %err, "undecodable carnage report");
          FetchOutcome::Malformed
        }
      },
      GetOutcome::Exhausted { status } => FetchOutcome::Exhausted { status },
      GetOutcome::TimedOut => FetchOutcome::TimedOut,
    }
  }

  async fn fetch_weapon(&self, reference_id: i64) -> Option<WeaponDefinition> {
    match self.get(&self.item_url(reference_id)).await {
      GetOutcome::Body(resp) => match resp.json::<ItemDefinitionResponse>().await {
        Ok(item) => Some(WeaponDefinition {
          reference_id,
          weapon_type: item.response.item_sub_type,
          ammo_type:   item.response.equipping_block.map(|b| b.ammo_type),
        }),
        Err(err) => {
          warn!(reference_id, %err, "undecodable item definition");
          None
        }
      },
      GetOutcome::Exhausted { status } => {
        warn!(reference_id, ?status, "manifest lookup failed");
        None
      }
      GetOutcome::TimedOut => {
        warn!(reference_id, "manifest lookup timed out");
        None
      }
    }
  }
}
