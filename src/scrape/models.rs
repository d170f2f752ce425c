/// One trending post extracted from the page.
///
/// `id` uniquely identifies the post and drives deduplication; every other
/// field is display-only and feeds payload formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub id: String,
    pub title: Option<String>,
    pub author: Option<String>,
    pub likes: Option<String>,
    pub comments: Option<String>,
    pub image_url: Option<String>,
    pub link: Option<String>,
}

impl Candidate {
    /// Candidate with only the id set.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            author: None,
            likes: None,
            comments: None,
            image_url: None,
            link: None,
        }
    }
}
