//! Notifier pipeline: duplicate check, payload formatting, webhook
//! delivery and store commit.

mod payload;
mod pipeline;
mod webhook;

pub use payload::{Attachment, SlackPayload, SITE_BASE_URL};
pub use pipeline::{FailureReason, Notifier, Outcome};
pub use webhook::{SlackWebhook, WebhookError, WebhookSender};
