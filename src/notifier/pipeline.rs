//! Notification pipeline.
//!
//! Coordinates at-most-once (per retention window) delivery for a single
//! candidate: membership check, payload formatting, webhook delivery, then
//! committing the id to the seen store. Delivery happens strictly before
//! the store commit, so a failed delivery never marks a post as seen; the
//! reverse gap (delivered but not recorded) is surfaced as its own, more
//! severe failure.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, warn};

use super::payload::SlackPayload;
use super::webhook::{WebhookError, WebhookSender};
use crate::scrape::Candidate;
use crate::seen_store::{SeenStore, StoreError};

#[derive(Debug, Error)]
pub enum FailureReason {
    #[error("Invalid candidate: {0}")]
    InvalidCandidate(String),

    #[error("Delivery failed: {0}")]
    Delivery(#[source] WebhookError),

    #[error("Notification delivered but not recorded, it may repeat: {0}")]
    Persistence(#[source] StoreError),

    #[error("Cannot evaluate duplicate status: {0}")]
    StoreUnavailable(#[source] StoreError),
}

/// Result of one pipeline invocation. No outcome is retried automatically;
/// each invocation is a single attempt.
#[derive(Debug)]
pub enum Outcome {
    Delivered,
    SkippedDuplicate,
    Failed(FailureReason),
}

pub struct Notifier {
    store: Arc<dyn SeenStore>,
    sender: Arc<dyn WebhookSender>,
}

impl Notifier {
    pub fn new(store: Arc<dyn SeenStore>, sender: Arc<dyn WebhookSender>) -> Self {
        Self { store, sender }
    }

    /// Process a single candidate.
    pub async fn process(&self, candidate: &Candidate) -> Outcome {
        if candidate.id.trim().is_empty() {
            warn!("Discarding candidate with empty id");
            return Outcome::Failed(FailureReason::InvalidCandidate(
                "candidate id is empty".to_string(),
            ));
        }

        match self.store.contains(&candidate.id) {
            Ok(true) => {
                info!("Post {} was already notified recently, skipping", candidate.id);
                return Outcome::SkippedDuplicate;
            }
            Ok(false) => {}
            Err(e) => {
                error!(
                    "Seen store unavailable, refusing to notify without a duplicate check: {}",
                    e
                );
                return Outcome::Failed(FailureReason::StoreUnavailable(e));
            }
        }

        let payload = SlackPayload::for_candidate(candidate);
        if let Err(e) = self.sender.deliver(&payload).await {
            warn!("Failed to deliver notification for post {}: {}", candidate.id, e);
            return Outcome::Failed(FailureReason::Delivery(e));
        }

        if let Err(e) = self.store.record_and_prune(&candidate.id, Utc::now()) {
            error!(
                "Notification for post {} was delivered but could not be recorded: {}",
                candidate.id, e
            );
            return Outcome::Failed(FailureReason::Persistence(e));
        }

        info!("Delivered notification for post {}", candidate.id);
        Outcome::Delivered
    }

    /// Process at most the first not-yet-seen candidate of one page run.
    ///
    /// This is a deliberate contract, not an optimization: one invocation
    /// notifies at most one post, and later candidates are left untouched
    /// for future runs. An empty or fully-seen batch is a skip.
    pub async fn process_first_new(&self, candidates: &[Candidate]) -> Outcome {
        for candidate in candidates {
            match self.store.contains(&candidate.id) {
                Ok(true) => continue,
                Ok(false) => return self.process(candidate).await,
                Err(e) => {
                    error!(
                        "Seen store unavailable while scanning candidates: {}",
                        e
                    );
                    return Outcome::Failed(FailureReason::StoreUnavailable(e));
                }
            }
        }

        Outcome::SkippedDuplicate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seen_store::InMemorySeenStore;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct RecordingSender {
        deliveries: AtomicUsize,
        fail_with_status: Option<u16>,
    }

    impl RecordingSender {
        fn ok() -> Self {
            Self {
                deliveries: AtomicUsize::new(0),
                fail_with_status: None,
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                deliveries: AtomicUsize::new(0),
                fail_with_status: Some(status),
            }
        }

        fn delivery_count(&self) -> usize {
            self.deliveries.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl WebhookSender for RecordingSender {
        async fn deliver(&self, _payload: &SlackPayload) -> Result<(), WebhookError> {
            self.deliveries.fetch_add(1, Ordering::SeqCst);
            match self.fail_with_status {
                Some(status) => Err(WebhookError::Status {
                    status,
                    body: String::new(),
                }),
                None => Ok(()),
            }
        }
    }

    struct BrokenStore;

    impl SeenStore for BrokenStore {
        fn contains(&self, _id: &str) -> Result<bool, StoreError> {
            Err(StoreError::Io {
                path: "broken.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }

        fn record_and_prune(
            &self,
            _id: &str,
            _seen_at: chrono::DateTime<Utc>,
        ) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: "broken.json".into(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
            })
        }
    }

    fn notifier(
        store: Arc<InMemorySeenStore>,
        sender: Arc<RecordingSender>,
    ) -> Notifier {
        Notifier::new(store as Arc<dyn SeenStore>, sender as Arc<dyn WebhookSender>)
    }

    #[tokio::test]
    async fn test_seen_candidate_is_skipped_without_delivery() {
        let store = Arc::new(InMemorySeenStore::new(7));
        store.record_and_prune("screenshot-1", Utc::now()).unwrap();
        let sender = Arc::new(RecordingSender::ok());
        let notifier = notifier(store, sender.clone());

        let outcome = notifier.process(&Candidate::new("screenshot-1")).await;

        assert!(matches!(outcome, Outcome::SkippedDuplicate));
        assert_eq!(sender.delivery_count(), 0);
    }

    #[tokio::test]
    async fn test_new_candidate_is_recorded_after_delivery() {
        let store = Arc::new(InMemorySeenStore::new(7));
        let sender = Arc::new(RecordingSender::ok());
        let notifier = notifier(store.clone(), sender.clone());

        let outcome = notifier.process(&Candidate::new("screenshot-2")).await;

        assert!(matches!(outcome, Outcome::Delivered));
        assert_eq!(sender.delivery_count(), 1);
        assert!(store.contains("screenshot-2").unwrap());
    }

    #[tokio::test]
    async fn test_delivery_failure_leaves_store_untouched() {
        let store = Arc::new(InMemorySeenStore::new(7));
        let sender = Arc::new(RecordingSender::failing(500));
        let notifier = notifier(store.clone(), sender.clone());

        let outcome = notifier.process(&Candidate::new("X")).await;

        assert!(matches!(
            outcome,
            Outcome::Failed(FailureReason::Delivery(_))
        ));
        assert_eq!(sender.delivery_count(), 1);
        assert!(!store.contains("X").unwrap());
    }

    #[tokio::test]
    async fn test_empty_id_is_invalid_and_makes_no_calls() {
        let store = Arc::new(InMemorySeenStore::new(7));
        let sender = Arc::new(RecordingSender::ok());
        let notifier = notifier(store.clone(), sender.clone());

        let outcome = notifier.process(&Candidate::new("  ")).await;

        assert!(matches!(
            outcome,
            Outcome::Failed(FailureReason::InvalidCandidate(_))
        ));
        assert_eq!(sender.delivery_count(), 0);
        assert!(store.records().is_empty());
    }

    #[tokio::test]
    async fn test_store_unavailable_blocks_notification() {
        let sender = Arc::new(RecordingSender::ok());
        let notifier = Notifier::new(
            Arc::new(BrokenStore) as Arc<dyn SeenStore>,
            sender.clone() as Arc<dyn WebhookSender>,
        );

        let outcome = notifier.process(&Candidate::new("X")).await;

        assert!(matches!(
            outcome,
            Outcome::Failed(FailureReason::StoreUnavailable(_))
        ));
        assert_eq!(sender.delivery_count(), 0);
    }

    #[tokio::test]
    async fn test_only_first_new_candidate_is_processed() {
        let store = Arc::new(InMemorySeenStore::new(7));
        let sender = Arc::new(RecordingSender::ok());
        let notifier = notifier(store.clone(), sender.clone());
        let candidates = vec![Candidate::new("first-new"), Candidate::new("second-new")];

        let outcome = notifier.process_first_new(&candidates).await;

        assert!(matches!(outcome, Outcome::Delivered));
        assert_eq!(sender.delivery_count(), 1);
        assert!(store.contains("first-new").unwrap());
        // The second eligible candidate is never delivered nor recorded.
        assert!(!store.contains("second-new").unwrap());
    }

    #[tokio::test]
    async fn test_seen_candidates_are_skipped_before_first_new() {
        let store = Arc::new(InMemorySeenStore::new(7));
        store.record_and_prune("old-1", Utc::now()).unwrap();
        store.record_and_prune("old-2", Utc::now()).unwrap();
        let sender = Arc::new(RecordingSender::ok());
        let notifier = notifier(store.clone(), sender.clone());
        let candidates = vec![
            Candidate::new("old-1"),
            Candidate::new("old-2"),
            Candidate::new("fresh"),
        ];

        let outcome = notifier.process_first_new(&candidates).await;

        assert!(matches!(outcome, Outcome::Delivered));
        assert_eq!(sender.delivery_count(), 1);
        assert!(store.contains("fresh").unwrap());
    }

    #[tokio::test]
    async fn test_all_seen_batch_is_a_skip() {
        let store = Arc::new(InMemorySeenStore::new(7));
        store.record_and_prune("only", Utc::now()).unwrap();
        let sender = Arc::new(RecordingSender::ok());
        let notifier = notifier(store, sender.clone());

        let outcome = notifier
            .process_first_new(&[Candidate::new("only")])
            .await;

        assert!(matches!(outcome, Outcome::SkippedDuplicate));
        assert_eq!(sender.delivery_count(), 0);
    }

    #[tokio::test]
    async fn test_empty_batch_is_a_skip() {
        let store = Arc::new(InMemorySeenStore::new(7));
        let sender = Arc::new(RecordingSender::ok());
        let notifier = notifier(store, sender.clone());

        let outcome = notifier.process_first_new(&[]).await;

        assert!(matches!(outcome, Outcome::SkippedDuplicate));
        assert_eq!(sender.delivery_count(), 0);
    }
}
