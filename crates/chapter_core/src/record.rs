use std::collections::BTreeSet;

/// Width of the `=` delimiter line framing each chapter title.
pub const MARKER_WIDTH: usize = 20;

fn marker() -> String {
    "=".repeat(MARKER_WIDTH)
}

/// Renders one completed chapter record exactly as the archive stores it:
/// blank separation, marker line, title line, marker line, blank line, body.
///
/// [`scan_titles`] parses this exact shape; the two must stay in lockstep
/// or resume breaks.
pub fn render_chapter(title: &str, body: &str) -> String {
    let marker = marker();
    format!("\n\n{marker}\n{title}\n{marker}\n\n{body}")
}

/// Renders the placeholder for a chapter that could not be retrieved.
///
/// The placeholder deliberately avoids the marker framing so a resume scan
/// does not count the chapter as completed; the next run retries it.
pub fn render_failure(title: &str) -> String {
    format!("\n\n[FAILED] {title}\n\n")
}

/// Recovers every chapter title framed as marker/title/marker.
///
/// Tolerant of anything else in the input, including truncated trailing
/// records; never fails.
pub fn scan_titles(text: &str) -> BTreeSet<String> {
    let marker = marker();
    let lines: Vec<&str> = text.lines().collect();
    let mut titles = BTreeSet::new();
    let mut i = 0;
    while i + 2 < lines.len() {
        if lines[i] == marker && lines[i + 2] == marker {
            let title = lines[i + 1].trim();
            if !title.is_empty() {
                titles.insert(title.to_string());
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    titles
}
