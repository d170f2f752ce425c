//! Dripfeed library
//!
//! Watches a trending-posts page and forwards the first not-yet-seen post
//! to a Slack incoming webhook, recording delivered post ids in a small
//! persistent store with a rolling retention window.

pub mod config;
pub mod notifier;
pub mod scrape;
pub mod seen_store;

// Re-export commonly used types for convenience
pub use notifier::{FailureReason, Notifier, Outcome, SlackWebhook, WebhookSender};
pub use scrape::Candidate;
pub use seen_store::{InMemorySeenStore, JsonFileSeenStore, SeenStore};
