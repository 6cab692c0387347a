//! Pure scheduling math: priorities, day boundaries, schedule buckets.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveTime, TimeZone, Utc, Weekday};

use crate::config::WEEKLY_LOAD_DAYS;
use crate::domain::{CardState, DailyLoad, ReviewPriority, ReviewSchedule, ScheduledReview};

/// Fixed three-tier rule over retrievability and lapses.
///
/// NaN retrievability is treated as 0 so every input maps to exactly one tier.
pub fn calculate_priority(state: &CardState) -> ReviewPriority {
  let retrievability = if state.retrievability.is_nan() {
    0.0
  } else {
    state.retrievability
  };

  if retrievability < 0.5 || state.lapses > 2 {
    ReviewPriority::High
  } else if retrievability < 0.8 || state.lapses > 0 {
    ReviewPriority::Medium
  } else {
    ReviewPriority::Low
  }
}

/// Local midnight (in `offset`) of the day containing `now`, as UTC
pub fn local_day_start(now: DateTime<Utc>, offset: FixedOffset) -> DateTime<Utc> {
  local_at(now, offset, 0, NaiveTime::MIN)
}

/// `time` on the local day `days` after the one containing `now`, as UTC
fn local_at(now: DateTime<Utc>, offset: FixedOffset, days: i64, time: NaiveTime) -> DateTime<Utc> {
  let date = now.with_timezone(&offset).date_naive() + Duration::days(days);
  // Fixed offsets have no gaps or folds, so this is always single
  offset
    .from_local_datetime(&date.and_time(time))
    .single()
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or(now)
}

/// Next occurrence of a local wall-clock time, strictly after `now`
pub fn next_daily_occurrence(now: DateTime<Utc>, time: NaiveTime, offset: FixedOffset) -> DateTime<Utc> {
  let today = local_at(now, offset, 0, time);
  if today > now {
    today
  } else {
    local_at(now, offset, 1, time)
  }
}

/// Next `weekday` at `hour:00` local time, strictly after `now`
pub fn next_weekly_occurrence(
  now: DateTime<Utc>,
  weekday: Weekday,
  hour: u32,
  offset: FixedOffset,
) -> DateTime<Utc> {
  let time = NaiveTime::from_hms_opt(hour.min(23), 0, 0).unwrap_or(NaiveTime::MIN);
  let current = now.with_timezone(&offset).weekday();
  let days_ahead =
    (weekday.num_days_from_monday() as i64 - current.num_days_from_monday() as i64).rem_euclid(7);

  let candidate = local_at(now, offset, days_ahead, time);
  if candidate > now {
    candidate
  } else {
    local_at(now, offset, days_ahead + 7, time)
  }
}

/// Bucket card states against the local day boundaries of `now`.
///
/// - overdue: `next_review < today`
/// - today: `today <= next_review < tomorrow`
/// - upcoming: `tomorrow <= next_review < today + 7d`
///
/// States further out land in no bucket. Input order is kept within each bucket.
/// `weekly_load[i]` counts states due on local day `today + i`; overdue states
/// are not counted.
pub fn build_schedule(
  user_id: &str,
  states: &[CardState],
  now: DateTime<Utc>,
  offset: FixedOffset,
) -> ReviewSchedule {
  let today = local_day_start(now, offset);
  let tomorrow = today + Duration::days(1);
  let next_week = today + Duration::days(WEEKLY_LOAD_DAYS);

  let mut overdue = Vec::new();
  let mut due_today = Vec::new();
  let mut upcoming = Vec::new();
  let mut counts = vec![0usize; WEEKLY_LOAD_DAYS as usize];

  for state in states {
    let next_review = state.next_review;
    let review = || ScheduledReview::from_state(state, calculate_priority(state));

    if next_review < today {
      overdue.push(review());
      continue;
    }
    if next_review >= next_week {
      continue;
    }

    let day = (next_review - today).num_days() as usize;
    if let Some(count) = counts.get_mut(day) {
      *count += 1;
    }

    if next_review < tomorrow {
      due_today.push(review());
    } else {
      upcoming.push(review());
    }
  }

  let local_today = today.with_timezone(&offset).date_naive();
  let weekly_load = counts
    .into_iter()
    .enumerate()
    .map(|(i, count)| {
      let date = local_today + Duration::days(i as i64);
      DailyLoad {
        date,
        weekday: date.weekday(),
        count,
      }
    })
    .collect();

  ReviewSchedule {
    user_id: user_id.to_string(),
    generated_at: now,
    total_due: overdue.len() + due_today.len(),
    overdue,
    today: due_today,
    upcoming,
    weekly_load,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kst() -> FixedOffset {
    FixedOffset::east_opt(9 * 3600).unwrap()
  }

  /// Local KST wall-clock time as UTC
  fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    kst()
      .with_ymd_and_hms(y, m, d, h, min, 0)
      .single()
      .unwrap()
      .with_timezone(&Utc)
  }

  fn state(card_id: i64, next_review: DateTime<Utc>, retrievability: f64, lapses: u32) -> CardState {
    let mut s = CardState::new("u1", card_id, next_review);
    s.retrievability = retrievability;
    s.lapses = lapses;
    s
  }

  // Priority tests

  #[test]
  fn test_priority_tiers() {
    let now = Utc::now();
    assert_eq!(calculate_priority(&state(1, now, 0.3, 0)), ReviewPriority::High);
    assert_eq!(calculate_priority(&state(1, now, 0.95, 3)), ReviewPriority::High);
    assert_eq!(calculate_priority(&state(1, now, 0.7, 0)), ReviewPriority::Medium);
    assert_eq!(calculate_priority(&state(1, now, 0.95, 1)), ReviewPriority::Medium);
    assert_eq!(calculate_priority(&state(1, now, 0.8, 0)), ReviewPriority::Low);
    assert_eq!(calculate_priority(&state(1, now, 0.5, 0)), ReviewPriority::Medium);
  }

  #[test]
  fn test_priority_nan_is_high() {
    assert_eq!(
      calculate_priority(&state(1, Utc::now(), f64::NAN, 0)),
      ReviewPriority::High
    );
  }

  #[test]
  fn test_priority_is_monotonic() {
    let now = Utc::now();
    let grid: Vec<f64> = (0..=100).map(|i| i as f64 / 100.0).collect();
    for lapses in 0..6u32 {
      for pair in grid.windows(2) {
        let (lower, higher) = (pair[0], pair[1]);
        // Lower retrievability never lowers priority
        assert!(
          calculate_priority(&state(1, now, lower, lapses))
            >= calculate_priority(&state(1, now, higher, lapses))
        );
      }
      for &r in &grid {
        // More lapses never lowers priority
        assert!(
          calculate_priority(&state(1, now, r, lapses + 1))
            >= calculate_priority(&state(1, now, r, lapses))
        );
      }
    }
  }

  // Boundary tests

  #[test]
  fn test_local_day_start_uses_offset() {
    // 2026-10-18 01:00 KST is still 2026-10-17 in UTC
    let now = at(2026, 10, 18, 1, 0);
    assert_eq!(local_day_start(now, kst()), at(2026, 10, 18, 0, 0));
  }

  #[test]
  fn test_next_daily_occurrence() {
    let nine = NaiveTime::from_hms_opt(9, 0, 0).unwrap();
    assert_eq!(
      next_daily_occurrence(at(2026, 10, 18, 8, 30), nine, kst()),
      at(2026, 10, 18, 9, 0)
    );
    assert_eq!(
      next_daily_occurrence(at(2026, 10, 18, 9, 0), nine, kst()),
      at(2026, 10, 19, 9, 0)
    );
  }

  #[test]
  fn test_next_weekly_occurrence() {
    // 2026-10-18 is a Sunday
    let sunday_morning = at(2026, 10, 18, 10, 0);
    assert_eq!(
      next_weekly_occurrence(sunday_morning, Weekday::Sun, 19, kst()),
      at(2026, 10, 18, 19, 0)
    );
    let sunday_night = at(2026, 10, 18, 20, 0);
    assert_eq!(
      next_weekly_occurrence(sunday_night, Weekday::Sun, 19, kst()),
      at(2026, 10, 25, 19, 0)
    );
    assert_eq!(
      next_weekly_occurrence(sunday_night, Weekday::Tue, 19, kst()),
      at(2026, 10, 20, 19, 0)
    );
  }

  // Schedule tests

  #[test]
  fn test_three_card_scenario() {
    let now = at(2026, 10, 18, 9, 0);
    let states = vec![
      state(1, at(2026, 10, 17, 10, 0), 0.9, 0), // yesterday
      state(2, at(2026, 10, 18, 8, 0), 0.9, 0),  // earlier today
      state(3, at(2026, 10, 20, 10, 0), 0.9, 0), // next Tuesday
    ];

    let schedule = build_schedule("u1", &states, now, kst());
    assert_eq!(schedule.overdue.iter().map(|r| r.card_id).collect::<Vec<_>>(), vec![1]);
    assert_eq!(schedule.today.iter().map(|r| r.card_id).collect::<Vec<_>>(), vec![2]);
    assert_eq!(schedule.upcoming.iter().map(|r| r.card_id).collect::<Vec<_>>(), vec![3]);
    assert_eq!(schedule.weekly_load.len(), 7);
    assert_eq!(schedule.weekly_load[0].count, 1);
    assert_eq!(schedule.weekly_load[0].weekday, Weekday::Sun);
    assert_eq!(schedule.weekly_load[2].count, 1);
    assert_eq!(schedule.total_due, 2);
    assert_eq!(schedule.weekly_total(), 2);
  }

  #[test]
  fn test_bucket_boundaries_are_half_open() {
    let now = at(2026, 10, 18, 12, 0);
    let today = at(2026, 10, 18, 0, 0);
    let states = vec![
      state(1, today - Duration::seconds(1), 0.9, 0),
      state(2, today, 0.9, 0),
      state(3, today + Duration::days(1) - Duration::seconds(1), 0.9, 0),
      state(4, today + Duration::days(1), 0.9, 0),
      state(5, today + Duration::days(7) - Duration::seconds(1), 0.9, 0),
      state(6, today + Duration::days(7), 0.9, 0),
    ];

    let schedule = build_schedule("u1", &states, now, kst());
    let ids = |v: &Vec<ScheduledReview>| v.iter().map(|r| r.card_id).collect::<Vec<_>>();
    assert_eq!(ids(&schedule.overdue), vec![1]);
    assert_eq!(ids(&schedule.today), vec![2, 3]);
    assert_eq!(ids(&schedule.upcoming), vec![4, 5]);
    assert_eq!(schedule.weekly_load[0].count, 2);
    assert_eq!(schedule.weekly_load[1].count, 1);
    assert_eq!(schedule.weekly_load[6].count, 1);
    assert_eq!(schedule.weekly_total(), 4);
  }

  #[test]
  fn test_overdue_never_lands_in_other_buckets() {
    let now = at(2026, 10, 18, 9, 0);
    let today = at(2026, 10, 18, 0, 0);
    let states: Vec<CardState> = (1..=200)
      .map(|i| state(i, today - Duration::minutes(i * 37), 0.9, 0))
      .collect();

    let schedule = build_schedule("u1", &states, now, kst());
    assert_eq!(schedule.overdue.len(), 200);
    assert!(schedule.today.is_empty());
    assert!(schedule.upcoming.is_empty());
    assert_eq!(schedule.weekly_total(), 0);
  }

  #[test]
  fn test_every_state_in_today_window_is_today() {
    let now = at(2026, 10, 18, 23, 59);
    let today = at(2026, 10, 18, 0, 0);
    let states: Vec<CardState> = (0..(24 * 60))
      .step_by(7)
      .map(|m| state(m as i64, today + Duration::minutes(m as i64), 0.9, 0))
      .collect();

    let schedule = build_schedule("u1", &states, now, kst());
    assert_eq!(schedule.today.len(), states.len());
    assert!(schedule.overdue.is_empty());
    assert!(schedule.upcoming.is_empty());
  }

  #[test]
  fn test_bucket_order_and_priorities_follow_input() {
    let now = at(2026, 10, 18, 9, 0);
    let states = vec![
      state(10, at(2026, 10, 16, 9, 0), 0.2, 0),
      state(11, at(2026, 10, 17, 9, 0), 0.9, 1),
    ];
    let schedule = build_schedule("u1", &states, now, kst());
    assert_eq!(schedule.overdue[0].card_id, 10);
    assert_eq!(schedule.overdue[0].priority, ReviewPriority::High);
    assert_eq!(schedule.overdue[1].priority, ReviewPriority::Medium);
    assert_eq!(schedule.high_priority_due(), 1);
  }

  #[test]
  fn test_empty_input() {
    let schedule = build_schedule("u1", &[], Utc::now(), kst());
    assert_eq!(schedule.total_due, 0);
    assert_eq!(schedule.weekly_load.len(), 7);
    assert!(schedule.weekly_load.iter().all(|d| d.count == 0));
  }
}
