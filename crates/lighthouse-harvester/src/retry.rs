//! The retry pool: activity ids awaiting the next retry sweep.

use std::sync::Arc;

use tokio::sync::Mutex;

/// An unordered, in-memory collection of activity ids whose fetch
/// failed with a retryable outcome.
///
/// Owned by the sweep loop; ingest tasks append through a clone. Push
/// and drain each hold the lock for a single synchronous operation, so
/// no suspension point can interleave an append with a drain.
#[derive(Clone, Default)]
pub struct RetryPool {
  ids: Arc<Mutex<Vec<i64>>>,
}

impl RetryPool {
  pub fn new() -> Self {
    Self::default()
  }

  pub async fn push(&self, activity_id: i64) {
    self.ids.lock().await.push(activity_id);
  }

  /// Take the entire pool, leaving it empty. Failures that occur while
  /// the drained batch is re-driven land in the fresh pool.
  pub async fn drain(&self) -> Vec<i64> {
    std::mem::take(&mut *self.ids.lock().await)
  }

  pub async fn len(&self) -> usize {
    self.ids.lock().await.len()
  }

  pub async fn is_empty(&self) -> bool {
    self.ids.lock().await.is_empty()
  }
}
