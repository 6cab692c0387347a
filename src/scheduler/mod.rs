//! Review scheduling: bucket card states by due date, queue reminders,
//! deliver notifications.

pub mod buckets;
pub mod error;
pub mod notifier;
pub mod service;
pub mod source;
pub mod store;
pub mod tasks;

pub use buckets::{build_schedule, calculate_priority, local_day_start};
pub use error::SchedulerError;
pub use notifier::{Notification, Notifier, NotifyError, RecordingNotifier, TracingNotifier};
pub use service::{ReviewScheduler, ScheduleCache};
pub use source::{CardStateSource, LocalCardStates};
pub use store::{
  load_notification_settings, load_reminders, mark_reminder_sent, save_notification_settings,
  save_reminder_to_storage,
};
pub use tasks::BackgroundTasks;
