use std::collections::HashSet;

use chapter_core::ChapterRef;
use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};
use url::Url;

/// Per-site extraction hooks the engine depends on but does not implement.
///
/// The run loop drives any implementation honoring this contract and makes
/// no assumption about particular markup.
pub trait SiteAdapter: Send + Sync {
    fn name(&self) -> &str;
    fn catalog_url(&self) -> &Url;
    /// Catalog lists newest chapters first; process oldest-first.
    fn reverse_order(&self) -> bool {
        false
    }
    /// Site serves chapter bodies only to a logged-in session.
    fn requires_auth(&self) -> bool {
        false
    }
    /// Chapter list in site presentation order.
    fn parse_catalog(&self, html: &str, base: &Url) -> Vec<ChapterRef>;
    /// Chapter body text, or `None` when the page holds no recognizable
    /// content.
    fn parse_content(&self, html: &str) -> Option<String>;
}

/// Containers template novel sites commonly put the chapter body in,
/// tried in order.
const CONTENT_SELECTORS: &[&str] = &["#content", ".read-content", ".chapter-content", ".novelcontent"];

/// Subtrees dropped from the body: scripts, styling, nested ad blocks,
/// navigation links and injected ad tags.
const SKIPPED_TAGS: &[&str] = &["script", "style", "div", "iframe", "a", "ins"];

/// Selector-list adapter that covers most template novel sites: chapter
/// links share a path fragment, the body sits in one of a few well-known
/// containers.
pub struct GenericSite {
    name: String,
    catalog: Url,
    link_fragment: String,
    reverse_order: bool,
    requires_auth: bool,
}

impl GenericSite {
    pub fn new(name: impl Into<String>, catalog: Url) -> Self {
        Self {
            name: name.into(),
            catalog,
            link_fragment: "/book/".to_string(),
            reverse_order: false,
            requires_auth: false,
        }
    }

    /// Substring a reader-page href must contain to count as a chapter link.
    pub fn with_link_fragment(mut self, fragment: impl Into<String>) -> Self {
        self.link_fragment = fragment.into();
        self
    }

    pub fn newest_first(mut self) -> Self {
        self.reverse_order = true;
        self
    }

    pub fn authenticated(mut self) -> Self {
        self.requires_auth = true;
        self
    }
}

impl SiteAdapter for GenericSite {
    fn name(&self) -> &str {
        &self.name
    }

    fn catalog_url(&self) -> &Url {
        &self.catalog
    }

    fn reverse_order(&self) -> bool {
        self.reverse_order
    }

    fn requires_auth(&self) -> bool {
        self.requires_auth
    }

    fn parse_catalog(&self, html: &str, base: &Url) -> Vec<ChapterRef> {
        let doc = Html::parse_document(html);
        let Ok(anchors) = Selector::parse("a") else {
            return Vec::new();
        };

        let mut seen = HashSet::new();
        let mut chapters = Vec::new();
        for link in doc.select(&anchors) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if !href.contains(&self.link_fragment) {
                continue;
            }
            let title: String = link.text().collect();
            if title.trim().chars().count() <= 1 {
                continue;
            }
            let Ok(resolved) = base.join(href) else {
                continue;
            };
            // First occurrence wins when a catalog repeats a link.
            if !seen.insert(resolved.to_string()) {
                continue;
            }
            if let Some(chapter) = ChapterRef::new(&title, resolved) {
                chapters.push(chapter);
            }
        }
        chapters
    }

    fn parse_content(&self, html: &str) -> Option<String> {
        let doc = Html::parse_document(html);
        for selector in CONTENT_SELECTORS {
            let Ok(sel) = Selector::parse(selector) else {
                continue;
            };
            let Some(container) = doc.select(&sel).next() else {
                continue;
            };
            let mut parts = Vec::new();
            collect_text(&container, &mut parts);
            if !parts.is_empty() {
                return Some(parts.join("\n\n"));
            }
        }
        None
    }
}

/// Collects visible text under `node` with paragraph breaks at element
/// boundaries, skipping noise subtrees.
fn collect_text(node: &NodeRef<'_, Node>, out: &mut Vec<String>) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    out.push(trimmed.to_string());
                }
            }
            Node::Element(element) => {
                if SKIPPED_TAGS.contains(&element.name()) {
                    continue;
                }
                collect_text(&child, out);
            }
            _ => {}
        }
    }
}
