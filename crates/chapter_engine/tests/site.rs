use std::sync::Once;

use chapter_engine::{GenericSite, SiteAdapter};
use pretty_assertions::assert_eq;
use url::Url;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chapter_logging::initialize_for_tests);
}

fn catalog_url() -> Url {
    Url::parse("https://example.com/chapters/id/49606.html").expect("test url")
}

#[test]
fn catalog_keeps_reader_links_and_drops_the_rest() {
    init_logging();
    let html = r#"<html><body>
        <a href="/book/1.html">第一章 起點</a>
        <a href="https://example.com/book/2.html">第二章 山路</a>
        <a href="/about.html">關於本站</a>
        <a href="/book/3.html">A</a>
        <a href="/book/1.html">第一章 起點（重複）</a>
        <a>第四章 無連結</a>
    </body></html>"#;

    let site = GenericSite::new("example", catalog_url());
    let chapters = site.parse_catalog(html, &catalog_url());

    let titles: Vec<&str> = chapters.iter().map(|c| c.title.as_str()).collect();
    // The one-character title and the non-reader links are filtered; the
    // repeated href keeps its first occurrence.
    assert_eq!(titles, vec!["第一章 起點", "第二章 山路"]);
    assert_eq!(
        chapters[0].locator.as_str(),
        "https://example.com/book/1.html"
    );
    assert_eq!(
        chapters[1].locator.as_str(),
        "https://example.com/book/2.html"
    );
}

#[test]
fn custom_link_fragment_selects_other_path_shapes() {
    init_logging();
    let html = r#"<a href="/read/42">章節四十二</a><a href="/book/1.html">第一章</a>"#;
    let site = GenericSite::new("example", catalog_url()).with_link_fragment("/read/");
    let chapters = site.parse_catalog(html, &catalog_url());
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].title, "章節四十二");
}

#[test]
fn content_comes_from_the_first_matching_container() {
    init_logging();
    let html = r#"<html><body>
        <div class="read-content">
            <p>他說，</p>
            <p>今天天氣很好。</p>
            <script>var ad = 1;</script>
            <div class="ad">買一送一</div>
            <a href="/next">下一章</a>
        </div>
    </body></html>"#;

    let site = GenericSite::new("example", catalog_url());
    let content = site.parse_content(html).expect("content found");
    // Script, nested ad block and navigation link are dropped; paragraphs
    // keep their breaks.
    assert_eq!(content, "他說，\n\n今天天氣很好。");
}

#[test]
fn id_selector_takes_precedence() {
    init_logging();
    let html = r#"<div id="content">正文在此。</div><div class="read-content">別的</div>"#;
    let site = GenericSite::new("example", catalog_url());
    assert_eq!(site.parse_content(html).as_deref(), Some("正文在此。"));
}

#[test]
fn missing_content_container_yields_none() {
    init_logging();
    let html = "<html><body><p>nothing to see</p></body></html>";
    let site = GenericSite::new("example", catalog_url());
    assert!(site.parse_content(html).is_none());
}

#[test]
fn builder_flags_surface_through_the_adapter_contract() {
    init_logging();
    let plain = GenericSite::new("example", catalog_url());
    assert!(!plain.reverse_order());
    assert!(!plain.requires_auth());

    let tuned = GenericSite::new("example", catalog_url())
        .newest_first()
        .authenticated();
    assert!(tuned.reverse_order());
    assert!(tuned.requires_auth());
    assert_eq!(tuned.name(), "example");
    assert_eq!(tuned.catalog_url(), &catalog_url());
}
