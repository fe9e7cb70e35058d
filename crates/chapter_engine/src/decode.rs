use chardetng::EncodingDetector;
use encoding_rs::Encoding;

/// Charset labels some servers declare by default no matter what the body
/// really contains. A declared label from this list is ignored in favor of
/// detection.
const SUSPECT_LABELS: &[&str] = &["iso-8859-1", "latin1", "us-ascii"];

/// Decode a fetched body into UTF-8 using: BOM -> trusted Content-Type
/// charset -> chardetng detection.
///
/// Decoding is lossy on malformed sequences; a garbled character beats
/// aborting a whole chapter.
pub fn decode_page(bytes: &[u8], content_type: Option<&str>) -> String {
    // 1) BOM aware decode using encoding_rs helper
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return decode_with(bytes, encoding);
    }

    // 2) Content-Type header charset, unless it is a known-wrong default
    if let Some(label) = content_type.and_then(extract_charset) {
        let suspect = SUSPECT_LABELS.iter().any(|s| label.eq_ignore_ascii_case(s));
        if !suspect {
            if let Some(enc) = Encoding::for_label(label.as_bytes()) {
                return decode_with(bytes, enc);
            }
        }
    }

    // 3) chardetng detection over the full body
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    decode_with(bytes, detector.guess(None, true))
}

fn extract_charset(content_type: &str) -> Option<String> {
    content_type.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim_matches([' ', '"', '\''].as_ref()).to_string())
        } else {
            None
        }
    })
}

fn decode_with(bytes: &[u8], enc: &'static Encoding) -> String {
    let (text, _, _) = enc.decode(bytes);
    text.into_owned()
}
