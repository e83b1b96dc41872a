//! The sweep loop: bounded-concurrency fetch-and-ingest coordination.
//!
//! Two concurrent regions share the store and the retry pool: the
//! primary scan walks a monotonically increasing id cursor in rounds of
//! `batch` ingestions, and the retry sweep re-drives previously failed
//! ids on a timer. Neither region lets a per-id failure escape; the
//! only way out of [`Harvester::run`] is the shutdown signal.

use std::{sync::Arc, time::Duration};

use tokio::{
  sync::{Semaphore, watch},
  time::interval,
};
use tracing::{debug, info, warn};

use lighthouse_core::{
  decompose::{Decomposed, decompose},
  report::CarnageReport,
  store::ActivityStore,
};

use crate::{
  client::{FetchOutcome, ReportApi},
  retry::RetryPool,
};

pub struct Harvester<A, S> {
  api:   Arc<A>,
  store: S,
  /// Rate gate: at most `batch` requests in flight at once.
  gate: Arc<Semaphore>,
  pub(crate) pool: RetryPool,
  batch:           usize,
  retry_interval:  Duration,
}

// Manual impl: `A` itself need not be `Clone` behind the `Arc`.
impl<A, S: Clone> Clone for Harvester<A, S> {
  fn clone(&self) -> Self {
    Self {
      api:            Arc::clone(&self.api),
      store:          self.store.clone(),
      gate:           Arc::clone(&self.gate),
      pool:           self.pool.clone(),
      batch:          self.batch,
      retry_interval: self.retry_interval,
    }
  }
}

impl<A, S> Harvester<A, S>
where
  A: ReportApi + 'static,
  S: ActivityStore + Clone + Send + Sync + 'static,
{
  pub fn new(api: A, store: S, concurrency: usize, retry_interval: Duration) -> Self {
    Self {
      api: Arc::new(api),
      store,
      gate: Arc::new(Semaphore::new(concurrency)),
      pool: RetryPool::new(),
      batch: concurrency,
      retry_interval,
    }
  }

  /// Run the primary scan from `start` until `shutdown` flips to true.
  ///
  /// The in-flight round drains before exit; so does the retry task.
  pub async fn run(&self, start: i64, shutdown: watch::Receiver<bool>) {
    let retry_task = {
      let this = self.clone();
      let shutdown = shutdown.clone();
      tokio::spawn(async move { this.retry_loop(shutdown).await })
    };

    let mut cursor = start;
    while !*shutdown.borrow() {
      debug!(cursor, batch = self.batch, "starting sweep round");
      self.round(cursor).await;
      cursor += self.batch as i64;
    }
    info!(cursor, "sweep loop stopped");

    if let Err(err) = retry_task.await {
      warn!(%err, "retry task failed");
    }
  }

  /// Issue one round: `batch` consecutive ids, ingested concurrently,
  /// awaited to completion.
  pub(crate) async fn round(&self, cursor: i64) {
    let handles: Vec<_> = (cursor..cursor + self.batch as i64)
      .map(|activity_id| {
        let this = self.clone();
        tokio::spawn(async move { this.ingest(activity_id).await })
      })
      .collect();

    for handle in handles {
      if let Err(err) = handle.await {
        warn!(%err, "ingest task panicked");
      }
    }
  }

  async fn retry_loop(&self, mut shutdown: watch::Receiver<bool>) {
    if *shutdown.borrow() {
      return;
    }
    let mut ticker = interval(self.retry_interval);
    ticker.tick().await; // the first tick completes immediately
    loop {
      tokio::select! {
        _ = ticker.tick() => self.drive_retries().await,
        changed = shutdown.changed() => {
          if changed.is_err() || *shutdown.borrow() {
            return;
          }
        }
      }
    }
  }

  /// Drain the retry pool and re-submit every drained id as a fresh
  /// ingestion. The pool is cleared before the batch is awaited, so
  /// failures during the batch repopulate it for the next cycle.
  pub(crate) async fn drive_retries(&self) {
    let ids = self.pool.drain().await;
    if ids.is_empty() {
      return;
    }
    info!(count = ids.len(), "re-driving retry pool");

    let handles: Vec<_> = ids
      .into_iter()
      .map(|activity_id| {
        let this = self.clone();
        tokio::spawn(async move { this.ingest(activity_id).await })
      })
      .collect();

    for handle in handles {
      if let Err(err) = handle.await {
        warn!(%err, "retry ingest task panicked");
      }
    }
  }

  /// Fetch and ingest one activity id. Never fails: every per-id
  /// outcome is contained here, logged, and optionally queued for
  /// retry.
  pub(crate) async fn ingest(&self, activity_id: i64) {
    let outcome = {
      // Permit released on every path out of the fetch, panic included.
      let Ok(_permit) = self.gate.acquire().await else {
        return;
      };
      self.api.fetch_report(activity_id).await
    };

    match outcome {
      FetchOutcome::Report(report) => self.ingest_report(activity_id, &report).await,
      FetchOutcome::Exhausted { status } => {
        warn!(activity_id, ?status, "fetch failed, queueing for retry");
        self.pool.push(activity_id).await;
      }
      FetchOutcome::TimedOut => {
        // The original dropped timed-out ids on the floor; queueing
        // them is a deliberate deviation (see DESIGN.md).
        warn!(activity_id, "fetch timed out, queueing for retry");
        self.pool.push(activity_id).await;
      }
      FetchOutcome::Malformed => {
        warn!(activity_id, "unparseable response, skipping");
      }
    }
  }

  async fn ingest_report(&self, activity_id: i64, report: &CarnageReport) {
    match decompose(activity_id, report) {
      Ok(Decomposed::Skipped { mode }) => {
        debug!(activity_id, mode, "not a Trials match");
      }
      Ok(Decomposed::Trials(record)) => {
        match self.store.contains_activity(activity_id).await {
          Ok(true) => {
            debug!(activity_id, "already ingested");
            return;
          }
          Ok(false) => {}
          Err(err) => {
            warn!(activity_id, %err, "dedup check failed");
            return;
          }
        }

        let weapon_refs = record.weapon_references();
        info!(
          activity_id,
          participants = record.stats.len(),
          "found Trials activity"
        );

        if let Err(err) = self.store.insert_record(record).await {
          warn!(activity_id, %err, "failed to persist record");
          return;
        }

        for reference_id in weapon_refs {
          self.backfill_weapon(reference_id).await;
        }
      }
      Err(err) => {
        warn!(activity_id, %err, "malformed report, skipping");
      }
    }
  }

  /// Populate the weapon manifest for a reference id seen in an
  /// ingested record. A prior existence check makes the remote lookup a
  /// once-per-weapon event.
  async fn backfill_weapon(&self, reference_id: i64) {
    match self.store.contains_weapon(reference_id).await {
      Ok(true) => return,
      Ok(false) => {}
      Err(err) => {
        warn!(reference_id, %err, "manifest existence check failed");
        return;
      }
    }

    let definition = {
      let Ok(_permit) = self.gate.acquire().await else {
        return;
      };
      self.api.fetch_weapon(reference_id).await
    };
    let Some(definition) = definition else {
      return;
    };

    debug!(reference_id, "adding weapon to manifest");
    if let Err(err) = self.store.insert_weapon(definition).await {
      warn!(reference_id, %err, "failed to persist weapon definition");
    }
  }
}
