//! Trending-page collaborator: page fetch and candidate extraction.

mod models;
mod page;

pub use models::Candidate;
pub use page::{extract_candidates, fetch_page};
