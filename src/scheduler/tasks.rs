//! Background timers and the reminder worker.
//!
//! Owned by whoever spawns them; dropping `BackgroundTasks` stops everything.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::mpsc;
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use super::ReviewScheduler;
use crate::config::{CACHE_INVALIDATION_INTERVAL_SECS, QUEUE_TICK_SECS};
use crate::domain::ReviewReminder;

pub struct BackgroundTasks {
  scheduler: Arc<ReviewScheduler>,
  handles: Vec<JoinHandle<()>>,
}

impl BackgroundTasks {
  /// Cache invalidation every 5 minutes, queue tick every 60 seconds, plus the worker
  pub fn spawn(scheduler: Arc<ReviewScheduler>) -> Self {
    Self::spawn_with_periods(
      scheduler,
      Duration::from_secs(CACHE_INVALIDATION_INTERVAL_SECS),
      Duration::from_secs(QUEUE_TICK_SECS),
    )
  }

  pub fn spawn_with_periods(
    scheduler: Arc<ReviewScheduler>,
    cache_period: Duration,
    queue_period: Duration,
  ) -> Self {
    let handles = vec![
      tokio::spawn(cache_invalidation_loop(scheduler.clone(), cache_period)),
      tokio::spawn(notification_queue_loop(scheduler.clone(), queue_period)),
      spawn_reminder_worker(scheduler.clone()),
    ];
    tracing::info!(
      "background tasks started (cache every {:?}, queue every {:?})",
      cache_period,
      queue_period
    );

    Self { scheduler, handles }
  }

  pub fn is_running(&self) -> bool {
    self.handles.iter().any(|h| !h.is_finished())
  }

  /// Stop timers and worker. Reminders already queued stay queued.
  pub fn shutdown(&mut self) {
    if self.handles.is_empty() {
      return;
    }
    self.scheduler.detach_worker();
    for handle in self.handles.drain(..) {
      handle.abort();
    }
    tracing::info!("background tasks stopped");
  }
}

impl Drop for BackgroundTasks {
  fn drop(&mut self) {
    self.shutdown();
  }
}

async fn cache_invalidation_loop(scheduler: Arc<ReviewScheduler>, period: Duration) {
  let mut ticker = interval_at(Instant::now() + period, period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  loop {
    ticker.tick().await;
    scheduler.invalidate_cache();
  }
}

async fn notification_queue_loop(scheduler: Arc<ReviewScheduler>, period: Duration) {
  let mut ticker = interval_at(Instant::now() + period, period);
  ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
  loop {
    ticker.tick().await;
    let delivered = scheduler.process_notification_queue();
    if delivered > 0 {
      tracing::debug!("delivered {} reminders", delivered);
    }
  }
}

/// Attach a worker that sleeps until each reminder's time and delivers it.
///
/// Timed deliveries live in a JoinSet owned by the worker, so aborting the
/// worker cancels them too.
fn spawn_reminder_worker(scheduler: Arc<ReviewScheduler>) -> JoinHandle<()> {
  let (sender, mut receiver) = mpsc::unbounded_channel::<ReviewReminder>();
  scheduler.attach_worker(sender);

  tokio::spawn(async move {
    let mut pending = JoinSet::new();
    loop {
      tokio::select! {
        message = receiver.recv() => match message {
          Some(reminder) => {
            pending.spawn(deliver_at(scheduler.clone(), reminder));
          }
          None => break,
        },
        Some(_) = pending.join_next(), if !pending.is_empty() => {}
      }
    }
  })
}

async fn deliver_at(scheduler: Arc<ReviewScheduler>, reminder: ReviewReminder) {
  let wait = (reminder.scheduled_at - Utc::now())
    .to_std()
    .unwrap_or(Duration::ZERO);
  tokio::time::sleep(wait).await;

  if scheduler.deliver_if_pending(&reminder.id, Utc::now()) {
    tracing::debug!("worker delivered reminder {}", reminder.id);
  }
}
