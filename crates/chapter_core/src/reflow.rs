/// Punctuation sets driving the paragraph-boundary heuristic.
///
/// The defaults are tuned for CJK prose; other scripts supply their own
/// sets through [`normalize_with`].
#[derive(Debug, Clone, Copy)]
pub struct BoundaryChars {
    /// A buffered line ending in one of these completes a sentence.
    pub terminal: &'static [char],
    /// A line opening with one of these starts fresh dialogue or an aside.
    pub opening: &'static [char],
}

pub const CJK_BOUNDARIES: BoundaryChars = BoundaryChars {
    terminal: &['。', '！', '？', '!', '?', '…', '」', '”'],
    opening: &['【', '[', '(', '「', '“'],
};

/// Zero-width code points some sites inject as anti-copy watermarks.
const INVISIBLE_MARKS: &[char] = &['\u{200b}', '\u{200c}', '\u{200d}', '\u{feff}'];

/// Rejoins hard-wrapped lines into paragraphs and strips invisible marks.
pub fn normalize(raw: &str) -> String {
    normalize_with(raw, &CJK_BOUNDARIES)
}

/// [`normalize`] with caller-supplied boundary sets.
///
/// Lines are trimmed and folded into paragraph buffers: a buffer is flushed
/// when it already ends in terminal punctuation or when the next line opens
/// with a bracket/quote; otherwise the next line is a wrapped continuation
/// and is appended with no separator. Paragraphs are joined by blank lines.
pub fn normalize_with(raw: &str, bounds: &BoundaryChars) -> String {
    let text: String = raw
        .chars()
        .filter(|c| !INVISIBLE_MARKS.contains(c))
        .collect();

    let mut paragraphs: Vec<String> = Vec::new();
    let mut buffer = String::new();
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if buffer.is_empty() {
            buffer.push_str(line);
            continue;
        }
        let ends_sentence = buffer
            .chars()
            .last()
            .is_some_and(|c| bounds.terminal.contains(&c));
        let opens_fresh = line
            .chars()
            .next()
            .is_some_and(|c| bounds.opening.contains(&c));
        if ends_sentence || opens_fresh {
            paragraphs.push(std::mem::take(&mut buffer));
        }
        buffer.push_str(line);
    }
    if !buffer.is_empty() {
        paragraphs.push(buffer);
    }
    paragraphs.join("\n\n")
}
