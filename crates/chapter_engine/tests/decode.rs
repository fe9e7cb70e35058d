use std::sync::Once;

use chapter_engine::decode_page;
use pretty_assertions::assert_eq;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(chapter_logging::initialize_for_tests);
}

#[test]
fn declared_charset_is_honored() {
    init_logging();
    // "中文" in GBK.
    let bytes = [0xD6, 0xD0, 0xCE, 0xC4];
    let html = decode_page(&bytes, Some("text/html; charset=gbk"));
    assert_eq!(html, "中文");
}

#[test]
fn suspect_latin1_default_falls_back_to_detection() {
    init_logging();
    // UTF-8 bytes served with the lying default charset many servers emit.
    let bytes = "今天天氣很好。今天天氣很好。".as_bytes();
    let html = decode_page(bytes, Some("text/html; charset=ISO-8859-1"));
    assert_eq!(html, "今天天氣很好。今天天氣很好。");
}

#[test]
fn bom_wins_over_the_declared_charset() {
    init_logging();
    let mut bytes = vec![0xEF, 0xBB, 0xBF];
    bytes.extend_from_slice("第一章".as_bytes());
    let html = decode_page(&bytes, Some("text/html; charset=gbk"));
    assert_eq!(html, "第一章");
}

#[test]
fn missing_content_type_still_decodes() {
    init_logging();
    let html = decode_page("plain ascii".as_bytes(), None);
    assert_eq!(html, "plain ascii");
}

#[test]
fn quoted_charset_parameter_is_unwrapped() {
    init_logging();
    let html = decode_page("ok".as_bytes(), Some("text/html; charset=\"utf-8\""));
    assert_eq!(html, "ok");
}
