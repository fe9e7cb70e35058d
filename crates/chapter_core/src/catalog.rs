use url::Url;

/// One catalog entry: display title plus the absolute page address.
///
/// Resume identity is the *title*, not the locator. The archive scanner
/// recovers titles, so a title already present in the archive is never
/// fetched again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRef {
    pub title: String,
    pub locator: Url,
}

impl ChapterRef {
    /// Builds a reference with a trimmed title. Titles that are empty
    /// after trimming yield `None`.
    pub fn new(title: &str, locator: Url) -> Option<Self> {
        let title = title.trim();
        if title.is_empty() {
            return None;
        }
        Some(Self {
            title: title.to_string(),
            locator,
        })
    }
}

/// Applies the site's presentation order. Catalogs that list newest
/// chapters first set `reverse` so processing runs oldest-first.
pub fn order_for_processing(mut chapters: Vec<ChapterRef>, reverse: bool) -> Vec<ChapterRef> {
    if reverse {
        chapters.reverse();
    }
    chapters
}
