//! Typed clients for the upstream vocabulary and admin REST APIs.

pub mod admin;
pub mod cache;
pub mod client;
pub mod error;
pub mod types;

pub use admin::AdminApiClient;
pub use cache::TtlCache;
pub use client::VocabularyApiClient;
pub use error::ApiError;
pub use types::{
  AdminStats, CardQuery, CardsPage, ContentSummary, ReviewRating, ReviewResponse, ReviewSession,
  SessionSummary, StartSessionRequest, UserStatistics,
};
