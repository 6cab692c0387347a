pub mod card;
pub mod card_state;
pub mod reminder;
pub mod schedule;
pub mod settings;

pub use card::{CardExample, CefrLevel, VocabularyCard};
pub use card_state::{CardState, MemoryState};
pub use reminder::{ReminderAction, ReminderKind, ReviewReminder};
pub use schedule::{DailyLoad, ReviewPriority, ReviewSchedule, ScheduledReview};
pub use settings::{NotificationSettings, SettingsError};
