//! Fetches the trending page and extracts candidate posts from its HTML.

use anyhow::{Context, Result};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use super::models::Candidate;

/// Fetch the trending page body.
///
/// The page serves the full listing only to XHR-style requests, so the
/// `X-Requested-With` header is always sent.
pub async fn fetch_page(client: &reqwest::Client, url: &str) -> Result<String> {
    let response = client
        .get(url)
        .header("X-Requested-With", "XMLHttpRequest")
        .send()
        .await
        .context("Failed to fetch trending page")?;

    let status = response.status();
    if !status.is_success() {
        anyhow::bail!("Trending page request failed with status: {}", status);
    }

    response
        .text()
        .await
        .context("Failed to read trending page body")
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow::anyhow!("Invalid selector {:?}: {}", css, e))
}

/// First matching element's text, whitespace-trimmed, empty mapped to None.
fn select_text(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" ").trim().to_string())
        .filter(|text| !text.is_empty())
}

/// First matching element's attribute value.
fn select_attr(item: ElementRef<'_>, selector: &Selector, attr: &str) -> Option<String> {
    item.select(selector)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Extract candidate posts from the trending page, in page order.
///
/// List items without an `id` attribute cannot be deduplicated and are
/// dropped here rather than surfacing as invalid candidates.
pub fn extract_candidates(html: &str) -> Result<Vec<Candidate>> {
    let item_selector = parse_selector("li.shot-thumbnail")?;
    let title_selector = parse_selector(".shot-title")?;
    let author_selector = parse_selector(".display-name")?;
    let likes_selector = parse_selector(".js-shot-likes-count")?;
    let comments_selector = parse_selector(".js-shot-comments-count")?;
    let image_selector = parse_selector("picture source")?;
    let link_selector = parse_selector("a")?;

    let document = Html::parse_document(html);
    let mut candidates = Vec::new();

    for item in document.select(&item_selector) {
        let Some(id) = item.value().attr("id").map(str::to_string) else {
            debug!("Skipping thumbnail without an id attribute");
            continue;
        };

        candidates.push(Candidate {
            id,
            title: select_text(item, &title_selector),
            author: select_text(item, &author_selector),
            likes: select_text(item, &likes_selector),
            comments: select_text(item, &comments_selector),
            image_url: select_attr(item, &image_selector, "srcset"),
            link: select_attr(item, &link_selector, "href"),
        });
    }

    Ok(candidates)
}
