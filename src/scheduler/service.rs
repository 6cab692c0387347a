//! The review scheduler: cached schedules, reminder queue, delivery.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Duration, FixedOffset, Utc};
use tokio::sync::mpsc::UnboundedSender;

use super::buckets::{build_schedule, next_daily_occurrence, next_weekly_occurrence};
use super::notifier::{Notification, Notifier};
use super::source::CardStateSource;
use super::store;
use super::SchedulerError;
use crate::config::{REMINDER_MAX_AGE_HOURS, SCHEDULE_FETCH_LIMIT, WEEKLY_PROGRESS_HOUR};
use crate::db::{self, DbPool, LogOnError};
use crate::domain::{
  NotificationSettings, ReminderKind, ReviewReminder, ReviewSchedule, ScheduledReview,
};

/// Per-user schedule cache. Cleared wholesale, never per entry.
///
/// Entries may lag writes made elsewhere until the next clear.
#[derive(Debug, Default)]
pub struct ScheduleCache {
  entries: Mutex<HashMap<String, ReviewSchedule>>,
}

impl ScheduleCache {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn get(&self, user_id: &str) -> Option<ReviewSchedule> {
    self.entries.lock().ok()?.get(user_id).cloned()
  }

  pub fn insert(&self, schedule: ReviewSchedule) {
    if let Ok(mut entries) = self.entries.lock() {
      entries.insert(schedule.user_id.clone(), schedule);
    }
  }

  pub fn clear(&self) {
    if let Ok(mut entries) = self.entries.lock() {
      entries.clear();
    }
  }

  pub fn len(&self) -> usize {
    self.entries.lock().map(|e| e.len()).unwrap_or(0)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

pub struct ReviewScheduler {
  pool: DbPool,
  source: Arc<dyn CardStateSource>,
  notifier: Arc<dyn Notifier>,
  cache: Arc<ScheduleCache>,
  offset: FixedOffset,
  queue: Mutex<Vec<ReviewReminder>>,
  worker: Mutex<Option<UnboundedSender<ReviewReminder>>>,
}

impl ReviewScheduler {
  pub fn new(
    pool: DbPool,
    source: Arc<dyn CardStateSource>,
    notifier: Arc<dyn Notifier>,
    cache: Arc<ScheduleCache>,
    offset: FixedOffset,
  ) -> Self {
    Self {
      pool,
      source,
      notifier,
      cache,
      offset,
      queue: Mutex::new(Vec::new()),
      worker: Mutex::new(None),
    }
  }

  pub fn source_name(&self) -> &str {
    self.source.name()
  }

  pub fn offset(&self) -> FixedOffset {
    self.offset
  }

  // ==================== Worker ====================

  /// Forward every newly queued reminder to a background worker
  pub fn attach_worker(&self, sender: UnboundedSender<ReviewReminder>) {
    if let Ok(mut worker) = self.worker.lock() {
      *worker = Some(sender);
    }
  }

  pub fn detach_worker(&self) {
    if let Ok(mut worker) = self.worker.lock() {
      worker.take();
    }
  }

  pub fn has_worker(&self) -> bool {
    self.worker.lock().map(|w| w.is_some()).unwrap_or(false)
  }

  // ==================== Schedule ====================

  /// Bucketed schedule for a user, from cache unless `force_refresh`
  pub async fn get_review_schedule(
    &self,
    user_id: &str,
    force_refresh: bool,
  ) -> Result<ReviewSchedule, SchedulerError> {
    if !force_refresh {
      if let Some(cached) = self.cache.get(user_id) {
        tracing::debug!("schedule cache hit for {}", user_id);
        return Ok(cached);
      }
    }

    let states = self.source.card_states(user_id, SCHEDULE_FETCH_LIMIT).await?;
    let schedule = build_schedule(user_id, &states, Utc::now(), self.offset);
    tracing::debug!(
      user = user_id,
      overdue = schedule.overdue.len(),
      today = schedule.today.len(),
      upcoming = schedule.upcoming.len(),
      "built review schedule from {} source",
      self.source.name()
    );

    self.cache.insert(schedule.clone());
    Ok(schedule)
  }

  pub fn cached_schedules(&self) -> usize {
    self.cache.len()
  }

  pub fn invalidate_cache(&self) {
    let cleared = self.cache.len();
    self.cache.clear();
    if cleared > 0 {
      tracing::debug!("invalidated {} cached schedules", cleared);
    }
  }

  // ==================== Settings ====================

  pub fn settings(&self) -> Result<NotificationSettings, SchedulerError> {
    let conn = db::try_lock(&self.pool)?;
    Ok(store::load_notification_settings(&conn))
  }

  pub fn update_settings(&self, settings: &NotificationSettings) -> Result<(), SchedulerError> {
    let conn = db::try_lock(&self.pool)?;
    store::save_notification_settings(&conn, settings)?;
    Ok(())
  }

  // ==================== Reminders ====================

  /// Next daily reminder carrying the current due count
  pub async fn schedule_daily_reminder(&self, user_id: &str) -> Result<Option<ReviewReminder>, SchedulerError> {
    let settings = self.settings()?;
    if !settings.daily_reminder_enabled {
      return Ok(None);
    }
    let Some(time) = settings.daily_time() else {
      tracing::warn!("daily reminder time {:?} is malformed", settings.daily_reminder_time);
      return Ok(None);
    };

    let schedule = self.get_review_schedule(user_id, false).await?;
    let due = schedule.total_due;
    let body = if due > 0 {
      format!("오늘 복습할 헝가리어 카드가 {due}장 있어요.")
    } else {
      "오늘의 헝가리어 단어를 복습해 보세요.".to_string()
    };

    let reminder = ReviewReminder::new(
      user_id,
      ReminderKind::DailyReminder,
      "헝가리어 단어 복습 시간이에요".to_string(),
      body,
      next_daily_occurrence(Utc::now(), time, self.offset),
      due,
    );
    Ok(Some(self.enqueue(reminder)))
  }

  /// Alert `upcoming_alert_minutes` before a review comes due
  pub fn schedule_upcoming_review_alert(
    &self,
    user_id: &str,
    review: &ScheduledReview,
  ) -> Result<Option<ReviewReminder>, SchedulerError> {
    let settings = self.settings()?;
    if !settings.upcoming_alert_enabled {
      return Ok(None);
    }

    let now = Utc::now();
    let lead = Duration::minutes(settings.upcoming_alert_minutes as i64);
    let alert_at = review.next_review - lead;
    let word = review
      .hungarian
      .clone()
      .unwrap_or_else(|| format!("카드 #{}", review.card_id));

    // Too late for the full lead time: alert now with the real remaining time
    let body = if alert_at >= now {
      format!("'{}' 복습이 {}분 후 예정되어 있어요.", word, settings.upcoming_alert_minutes)
    } else if review.next_review > now {
      let minutes = (review.next_review - now).num_minutes().max(1);
      format!("'{}' 복습이 {}분 후 예정되어 있어요.", word, minutes)
    } else {
      format!("'{}' 복습 시간이 되었어요.", word)
    };

    let reminder = ReviewReminder::new(
      user_id,
      ReminderKind::UpcomingReview,
      "곧 복습할 단어가 있어요".to_string(),
      body,
      alert_at.max(now),
      1,
    )
    .with_card(review.card_id);
    Ok(Some(self.enqueue(reminder)))
  }

  /// Immediate alert when anything is overdue (checked against fresh data)
  pub async fn check_overdue_reviews(&self, user_id: &str) -> Result<Option<ReviewReminder>, SchedulerError> {
    let settings = self.settings()?;
    if !settings.overdue_alert_enabled {
      return Ok(None);
    }

    let schedule = self.get_review_schedule(user_id, true).await?;
    let overdue = schedule.overdue.len();
    if overdue == 0 {
      return Ok(None);
    }

    let urgent = schedule
      .overdue
      .iter()
      .filter(|r| r.priority == crate::domain::ReviewPriority::High)
      .count();
    let mut body = format!("복습 기한이 지난 카드가 {overdue}장 있어요.");
    if urgent > 0 {
      body.push_str(&format!(" 그중 {urgent}장은 잊어버리기 직전이에요."));
    }

    let reminder = ReviewReminder::new(
      user_id,
      ReminderKind::OverdueReview,
      "밀린 복습이 있어요".to_string(),
      body,
      Utc::now(),
      overdue,
    );
    Ok(Some(self.enqueue(reminder)))
  }

  /// Weekly summary on the configured day at 19:00 local time
  pub async fn schedule_weekly_progress(&self, user_id: &str) -> Result<Option<ReviewReminder>, SchedulerError> {
    let settings = self.settings()?;
    if !settings.weekly_progress_enabled {
      return Ok(None);
    }

    let schedule = self.get_review_schedule(user_id, false).await?;
    let total = schedule.weekly_total();
    let busiest = schedule
      .weekly_load
      .iter()
      .filter(|d| d.count > 0)
      .max_by_key(|d| d.count);

    let mut body = format!("앞으로 7일 동안 복습할 카드가 {total}장 있어요.");
    if let Some(day) = busiest {
      body.push_str(&format!(" 가장 많은 날은 {} ({}장)이에요.", day.date.format("%m/%d"), day.count));
    }

    let reminder = ReviewReminder::new(
      user_id,
      ReminderKind::WeeklyProgress,
      "이번 주 헝가리어 학습 계획".to_string(),
      body,
      next_weekly_occurrence(
        Utc::now(),
        settings.weekly_progress_day,
        WEEKLY_PROGRESS_HOUR,
        self.offset,
      ),
      total,
    );
    Ok(Some(self.enqueue(reminder)))
  }

  /// Queue in memory, append to storage, hand to the worker if one is attached.
  ///
  /// A failed storage write is logged and the queued reminder stays.
  fn enqueue(&self, reminder: ReviewReminder) -> ReviewReminder {
    if let Ok(mut queue) = self.queue.lock() {
      queue.push(reminder.clone());
    }

    db::try_lock(&self.pool)
      .map_err(SchedulerError::from)
      .and_then(|conn| Ok(store::save_reminder_to_storage(&conn, &reminder)?))
      .log_error("Failed to persist reminder");

    match self.worker.lock().ok().and_then(|w| w.clone()) {
      Some(sender) => {
        if sender.send(reminder.clone()).is_err() {
          tracing::debug!("reminder worker gone; falling back to queue-only delivery");
          self.detach_worker();
        }
      }
      None => tracing::debug!("no reminder worker attached; queue-only delivery"),
    }

    tracing::info!(
      user = %reminder.user_id,
      kind = reminder.kind.as_str(),
      scheduled_at = %reminder.scheduled_at,
      "queued reminder"
    );
    reminder
  }

  pub fn stored_reminders(&self, user_id: &str) -> Result<Vec<ReviewReminder>, SchedulerError> {
    let conn = db::try_lock(&self.pool)?;
    Ok(store::load_reminders(&conn, user_id)?)
  }

  /// Snapshot of the in-memory queue
  pub fn pending_reminders(&self) -> Vec<ReviewReminder> {
    self.queue.lock().map(|q| q.clone()).unwrap_or_default()
  }

  // ==================== Delivery ====================

  pub fn process_notification_queue(&self) -> usize {
    self.process_notification_queue_at(Utc::now())
  }

  /// Deliver every due, unsent reminder and drop reminders scheduled more than
  /// 24h before `now`. Returns how many were delivered.
  pub fn process_notification_queue_at(&self, now: DateTime<Utc>) -> usize {
    let settings = match self.settings() {
      Ok(settings) => settings,
      Err(e) => {
        tracing::error!("Skipping notification tick: {}", e);
        return 0;
      }
    };

    let cutoff = now - Duration::hours(REMINDER_MAX_AGE_HOURS);
    let due: Vec<ReviewReminder> = match self.queue.lock() {
      Ok(mut queue) => {
        queue.retain(|r| r.scheduled_at >= cutoff);
        if !settings.enabled {
          return 0;
        }
        queue
          .iter_mut()
          .filter(|r| r.is_due(now))
          .map(|r| {
            r.sent = true;
            r.clone()
          })
          .collect()
      }
      Err(_) => return 0,
    };

    for reminder in &due {
      self.deliver(reminder, &settings);
    }
    due.len()
  }

  /// Deliver one reminder if it's still queued and unsent.
  ///
  /// The check-and-mark happens under the queue lock, so the worker and the
  /// queue tick never both deliver the same reminder.
  pub fn deliver_if_pending(&self, reminder_id: &str, now: DateTime<Utc>) -> bool {
    let Ok(settings) = self.settings() else {
      return false;
    };
    if !settings.enabled {
      return false;
    }

    let reminder = match self.queue.lock() {
      Ok(mut queue) => match queue.iter_mut().find(|r| r.id == reminder_id && r.is_due(now)) {
        Some(r) => {
          r.sent = true;
          r.clone()
        }
        None => return false,
      },
      Err(_) => return false,
    };

    self.deliver(&reminder, &settings);
    true
  }

  fn deliver(&self, reminder: &ReviewReminder, settings: &NotificationSettings) {
    let notification = Notification::from_reminder(reminder, settings);
    if let Err(e) = self.notifier.notify(&notification) {
      tracing::error!("Failed to deliver reminder {}: {}", reminder.id, e);
    }

    db::try_lock(&self.pool)
      .map_err(SchedulerError::from)
      .and_then(|conn| Ok(store::mark_reminder_sent(&conn, &reminder.user_id, &reminder.id)?))
      .log_error("Failed to mark stored reminder sent");
  }
}
