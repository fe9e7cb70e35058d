//! Chapter harvest core: pure catalog, retry, reflow and record logic.
mod catalog;
mod record;
mod reflow;
mod retry;

pub use catalog::{order_for_processing, ChapterRef};
pub use record::{render_chapter, render_failure, scan_titles, MARKER_WIDTH};
pub use reflow::{normalize, normalize_with, BoundaryChars, CJK_BOUNDARIES};
pub use retry::{RetryPolicy, RetrySchedule};
