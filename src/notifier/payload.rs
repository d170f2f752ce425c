//! Slack webhook payload shapes.
//!
//! Two shapes exist on purpose: posts with an image get a rich attachment
//! with a summary block, posts without one fall back to a plain text
//! message that lets Slack unfurl whatever the text contains.

use serde::Serialize;

use crate::scrape::Candidate;

/// Base URL prepended to relative post links in the summary block.
pub const SITE_BASE_URL: &str = "https://dribbble.com";

const FALLBACK_TITLE: &str = "New trending shot";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attachment {
    pub text: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SlackPayload {
    Rich {
        text: String,
        attachments: Vec<Attachment>,
    },
    Plain {
        text: String,
        unfurl_media: bool,
    },
}

impl SlackPayload {
    pub fn for_candidate(candidate: &Candidate) -> Self {
        let title = candidate
            .title
            .clone()
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        match &candidate.image_url {
            Some(image_url) => SlackPayload::Rich {
                text: title,
                attachments: vec![Attachment {
                    text: summary_block(candidate),
                    image_url: image_url.clone(),
                }],
            },
            None => SlackPayload::Plain {
                text: title,
                unfurl_media: true,
            },
        }
    }
}

/// Multi-line author/likes/comments/link summary for the rich attachment.
fn summary_block(candidate: &Candidate) -> String {
    let mut lines = vec![
        format!("Author: {}", display_field(&candidate.author)),
        format!("Likes: {}", display_field(&candidate.likes)),
        format!("Comments: {}", display_field(&candidate.comments)),
    ];
    if let Some(link) = &candidate.link {
        lines.push(format!("{}{}", SITE_BASE_URL, link));
    }
    lines.join("\n")
}

fn display_field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("-")
}
